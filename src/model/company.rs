use crate::identifier::{Identifier, Region};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

/// A company record parsed from one registry page
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub identifier: Identifier,

    /// Page the record was scraped from
    pub source_url: String,

    pub registration_number: u64,
    pub name: String,
    pub additional_name: String,

    /// Registration time in the configured canonical zone
    pub registration_date: DateTime<FixedOffset>,

    pub record_type: String,
    pub status: String,
    pub duration: String,
    pub legal_form: String,

    /// Exact amount with two fractional digits
    pub capital: Decimal,

    pub title: String,
    pub description: String,

    /// True iff the page had no relationship table
    pub missing_personnel_data: bool,
}

impl Company {
    pub fn region(&self) -> Region {
        self.identifier.region()
    }

    pub fn sequence(&self) -> u32 {
        self.identifier.sequence()
    }

    /// Canonical identifier string (`cr_id`)
    pub fn cr_id(&self) -> String {
        self.identifier.canonical_form()
    }
}
