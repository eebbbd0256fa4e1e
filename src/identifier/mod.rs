//! Identifier space for registry records
//!
//! A record is addressed by a region and a per-region sequence number. The
//! canonical string form is the region digit followed by the sequence
//! zero-padded to nine digits, e.g. region 3, sequence 42 -> `3000000042`.

mod region;

pub use region::Region;

use crate::storage::{Storage, StorageResult};
use crate::IdentifierError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Width of the zero-padded sequence part of the canonical form
pub const SEQUENCE_WIDTH: usize = 9;

/// Largest sequence representable in the canonical form
pub const MAX_SEQUENCE: u32 = 999_999_999;

/// Composite (region, sequence) record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    region: Region,
    sequence: u32,
}

impl Identifier {
    /// Builds an identifier
    ///
    /// Fails only for a zero sequence or one wider than nine digits.
    pub fn new(region: Region, sequence: u32) -> Result<Self, IdentifierError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(IdentifierError::SequenceOutOfRange(sequence));
        }
        Ok(Self { region, sequence })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the canonical zero-padded string form
    pub fn canonical_form(&self) -> String {
        self.to_string()
    }

    /// Builds the source locator `<base-url>?id=<canonical>`
    pub fn locator(&self, base_url: &Url) -> Url {
        let mut url = base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("id", &self.canonical_form());
        url
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.region.code(),
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SEQUENCE_WIDTH + 1 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentifierError::Malformed(s.to_string()));
        }

        let (region_part, sequence_part) = s.split_at(1);
        let region = region_part.parse::<Region>()?;
        let sequence = sequence_part
            .parse::<u32>()
            .map_err(|_| IdentifierError::Malformed(s.to_string()))?;

        Self::new(region, sequence)
    }
}

/// Returns the sequence the next crawl of `region` should start at
///
/// This is the maximum persisted sequence for the region plus one, or 1 when
/// nothing has been persisted for it yet.
pub fn next_sequence(storage: &dyn Storage, region: Region) -> StorageResult<u32> {
    let highest = storage.highest_sequence_for_region(region)?;
    Ok(highest.map_or(1, |seq| seq.saturating_add(1)))
}
