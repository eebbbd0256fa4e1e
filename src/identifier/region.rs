//! Registry regions
//!
//! The registry is partitioned into six regions, each with its own
//! independent sequence space.

use crate::IdentifierError;
use std::fmt;
use std::str::FromStr;

/// One of the six fixed registry partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Beirut,
    MountLebanon,
    NorthLebanon,
    Bekaa,
    SouthLebanon,
    Nabatieh,
}

impl Region {
    /// All regions in code order
    pub const ALL: [Region; 6] = [
        Self::Beirut,
        Self::MountLebanon,
        Self::NorthLebanon,
        Self::Bekaa,
        Self::SouthLebanon,
        Self::Nabatieh,
    ];

    /// The single-digit code used as the identifier prefix
    pub fn code(&self) -> u8 {
        match self {
            Self::Beirut => 1,
            Self::MountLebanon => 2,
            Self::NorthLebanon => 3,
            Self::Bekaa => 4,
            Self::SouthLebanon => 5,
            Self::Nabatieh => 6,
        }
    }

    /// Looks up a region by its code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    /// Human-readable region name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beirut => "Beirut",
            Self::MountLebanon => "Mount Lebanon",
            Self::NorthLebanon => "North Lebanon",
            Self::Bekaa => "Bekaa",
            Self::SouthLebanon => "South Lebanon",
            Self::Nabatieh => "Nabatieh",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl TryFrom<u8> for Region {
    type Error = IdentifierError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(IdentifierError::UnknownRegion(code))
    }
}

impl FromStr for Region {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| IdentifierError::Malformed(s.to_string()))?;
        Self::try_from(code)
    }
}
