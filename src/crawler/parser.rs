//! Record parser for registry pages
//!
//! Turns one fetched page into a `Company` and, when the page carries a
//! relationship table, the company's merged personnel.
//!
//! # Page template
//!
//! | Element id               | Field               | Type      |
//! |--------------------------|---------------------|-----------|
//! | `DataList1_Label1_0`     | registration number | integer   |
//! | `DataList1_Label2_0`     | name                | text      |
//! | `DataList1_Label3_0`     | additional name     | text      |
//! | `DataList1_Label5_0`     | registration date   | timestamp |
//! | `DataList1_Label6_0`     | record type         | text      |
//! | `DataList1_Label7_0`     | status              | text      |
//! | `DataList1_Label8_0`     | duration            | text      |
//! | `DataList1_Label9_0`     | legal form          | text      |
//! | `DataList1_Label10_0`    | capital             | decimal   |
//! | `DataList1_Label11_0`    | title               | text      |
//! | `DataList1_Label12_0`    | description         | text      |
//!
//! `DataList1_Label4_0` is present on the template but unused.

use crate::crawler::extractor::{id_selector, ExtractError, FieldExtractor};
use crate::crawler::merge::{PersonMerger, RelationshipRow};
use crate::identifier::Identifier;
use crate::model::{Company, Person};
use scraper::{ElementRef, Html, Selector};

const REGISTRATION_NUMBER: &str = "DataList1_Label1_0";
const NAME: &str = "DataList1_Label2_0";
const ADDITIONAL_NAME: &str = "DataList1_Label3_0";
const REGISTRATION_DATE: &str = "DataList1_Label5_0";
const RECORD_TYPE: &str = "DataList1_Label6_0";
const STATUS: &str = "DataList1_Label7_0";
const DURATION: &str = "DataList1_Label8_0";
const LEGAL_FORM: &str = "DataList1_Label9_0";
const CAPITAL: &str = "DataList1_Label10_0";
const TITLE: &str = "DataList1_Label11_0";
const DESCRIPTION: &str = "DataList1_Label12_0";

/// Header row of the relationship table; its absence means no personnel data
pub const PERSONNEL_ANCHOR: &str = "Relations_ListView_Tr1";

const PERSON_NAME: &str = "Relations_ListView_desigLabel";
const PERSON_NATIONALITY: &str = "Relations_ListView_countryLabel";
const PERSON_RELATIONSHIP: &str = "Relations_ListView_relLabel";
const PERSON_STOCK: &str = "Relations_ListView_a_valLabel";
const PERSON_QUOTA: &str = "Relations_ListView_s_valLabel";
const PERSON_RATIO: &str = "Relations_ListView_r_valLabel";

/// Field id of a relationship-table cell for the given data row
fn row_field(base: &str, index: usize) -> String {
    format!("{}_{}", base, index)
}

/// Result of parsing one page
///
/// Company extraction either succeeds as a whole or the page yields no
/// record at all. Personnel extraction is all-or-nothing per company and is
/// reported separately so the company can still be stored.
#[derive(Debug)]
pub struct ParsedRecord {
    pub company: Company,
    pub personnel: Result<Vec<Person>, ExtractError>,
}

/// Parses registry pages into entities
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    extractor: FieldExtractor,
}

impl RecordParser {
    pub fn new(extractor: FieldExtractor) -> Self {
        Self { extractor }
    }

    /// Parses raw page HTML into a company and its personnel
    pub fn parse_page(
        &self,
        body: &str,
        identifier: Identifier,
        locator: &str,
    ) -> Result<ParsedRecord, ExtractError> {
        let document = Html::parse_document(body);
        let company = self.parse_company(&document, identifier, locator)?;
        let personnel = self.parse_personnel(&document, &company);
        Ok(ParsedRecord { company, personnel })
    }

    /// Extracts the company block
    ///
    /// Any missing or miscast field fails the whole company.
    pub fn parse_company(
        &self,
        document: &Html,
        identifier: Identifier,
        locator: &str,
    ) -> Result<Company, ExtractError> {
        let ex = &self.extractor;

        Ok(Company {
            identifier,
            source_url: locator.to_string(),
            registration_number: ex.integer(document, REGISTRATION_NUMBER)?,
            name: ex.text(document, NAME)?,
            additional_name: ex.text(document, ADDITIONAL_NAME)?,
            registration_date: ex.timestamp(document, REGISTRATION_DATE)?,
            record_type: ex.text(document, RECORD_TYPE)?,
            status: ex.text(document, STATUS)?,
            duration: ex.text(document, DURATION)?,
            legal_form: ex.text(document, LEGAL_FORM)?,
            capital: ex.decimal(document, CAPITAL)?,
            title: ex.text(document, TITLE)?,
            description: ex.text(document, DESCRIPTION)?,
            missing_personnel_data: personnel_anchor(document).is_none(),
        })
    }

    /// Extracts and merges the relationship table
    ///
    /// Returns an empty set when the company has no personnel data. Rows are
    /// read in document order after the header row; a failure on any row
    /// discards the whole batch.
    pub fn parse_personnel(
        &self,
        document: &Html,
        company: &Company,
    ) -> Result<Vec<Person>, ExtractError> {
        if company.missing_personnel_data {
            return Ok(Vec::new());
        }

        let Some(anchor) = personnel_anchor(document) else {
            return Ok(Vec::new());
        };

        let mut merger = PersonMerger::new();
        for (index, row) in table_rows(anchor).into_iter().skip(1).enumerate() {
            merger.add(self.parse_row(&row, index)?);
        }

        Ok(merger.into_persons())
    }

    fn parse_row(&self, row: &ElementRef<'_>, index: usize) -> Result<RelationshipRow, ExtractError> {
        let ex = &self.extractor;

        Ok(RelationshipRow {
            name: ex.text(row, &row_field(PERSON_NAME, index))?,
            nationality: ex.text(row, &row_field(PERSON_NATIONALITY, index))?,
            relationship: ex.text(row, &row_field(PERSON_RELATIONSHIP, index))?,
            stock: ex.integer(row, &row_field(PERSON_STOCK, index))?,
            quota: ex.integer(row, &row_field(PERSON_QUOTA, index))?,
            ratio: ex.integer(row, &row_field(PERSON_RATIO, index))?,
        })
    }
}

fn personnel_anchor(document: &Html) -> Option<ElementRef<'_>> {
    let selector = id_selector(PERSONNEL_ANCHOR)?;
    document
        .select(&selector)
        .find(|element| element.value().name() == "tr")
}

/// All `tr` elements under the anchor's parent, header row included
fn table_rows(anchor: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Some(parent) = anchor.parent().and_then(ElementRef::wrap) else {
        return vec![anchor];
    };

    match Selector::parse("tr") {
        Ok(selector) => parent.select(&selector).collect(),
        Err(_) => vec![anchor],
    }
}
