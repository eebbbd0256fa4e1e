/// Pipeline stage a scrape failure is attributed to
///
/// Stored on every ScrapeError record so operators can tell transport
/// problems apart from template drift in the company or personnel blocks.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorStage {
    /// Company block could not be extracted, or the company could not be stored
    Company,

    /// Personnel table could not be extracted, or the persons could not be stored
    Personnel,

    /// The page never arrived (transport failure)
    Unknown,
}

impl ErrorStage {
    pub const ALL: [ErrorStage; 3] = [Self::Company, Self::Personnel, Self::Unknown];

    /// Converts the stage to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Personnel => "personnel",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a stage from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "company" => Some(Self::Company),
            "personnel" => Some(Self::Personnel),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
