//! Field extraction from registry pages
//!
//! Every value on the record template lives in an element with a fixed `id`.
//! The extractor finds that element inside a page or a table row and casts
//! its first text node to the requested type.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Source format of registration timestamps, e.g. `5/17/2010 2:30:00 PM`
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Target type of an extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Timestamp,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
        };
        write!(f, "{}", s)
    }
}

/// A typed extracted value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(u64),
    Decimal(Decimal),
    Timestamp(DateTime<FixedOffset>),
}

/// Errors raised while extracting a field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Field not found: {field}")]
    FieldNotFound { field: String },

    #[error("Cannot cast field {field} to {target}: {value:?}")]
    CastError {
        field: String,
        target: FieldType,
        value: String,
    },
}

impl ExtractError {
    fn cast(field: &str, target: FieldType, value: &str) -> Self {
        Self::CastError {
            field: field.to_string(),
            target,
            value: value.to_string(),
        }
    }
}

/// Anything fields can be looked up in: a whole page or one table row
pub trait FieldScope {
    fn find_first<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>>;
}

impl FieldScope for Html {
    fn find_first<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }
}

impl FieldScope for ElementRef<'_> {
    fn find_first<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }
}

/// Builds a selector matching the element whose `id` is exactly `field_id`
pub fn id_selector(field_id: &str) -> Option<Selector> {
    Selector::parse(&format!("[id=\"{}\"]", field_id)).ok()
}

/// Extracts and casts fields, normalising timestamps into one canonical zone
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    timezone: FixedOffset,
}

impl FieldExtractor {
    pub fn new(timezone: FixedOffset) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    /// Extracts `field_id` from `scope` as `field_type`
    pub fn extract<S: FieldScope + ?Sized>(
        &self,
        scope: &S,
        field_id: &str,
        field_type: FieldType,
    ) -> Result<FieldValue, ExtractError> {
        let raw = raw_text(scope, field_id)?;
        match field_type {
            FieldType::Text => Ok(FieldValue::Text(raw.unwrap_or_default())),
            FieldType::Integer => cast_integer(field_id, raw.as_deref()).map(FieldValue::Integer),
            FieldType::Decimal => cast_decimal(field_id, raw.as_deref()).map(FieldValue::Decimal),
            FieldType::Timestamp => self
                .cast_timestamp(field_id, raw.as_deref())
                .map(FieldValue::Timestamp),
        }
    }

    pub fn text<S: FieldScope + ?Sized>(
        &self,
        scope: &S,
        field_id: &str,
    ) -> Result<String, ExtractError> {
        Ok(raw_text(scope, field_id)?.unwrap_or_default())
    }

    pub fn integer<S: FieldScope + ?Sized>(
        &self,
        scope: &S,
        field_id: &str,
    ) -> Result<u64, ExtractError> {
        cast_integer(field_id, raw_text(scope, field_id)?.as_deref())
    }

    pub fn decimal<S: FieldScope + ?Sized>(
        &self,
        scope: &S,
        field_id: &str,
    ) -> Result<Decimal, ExtractError> {
        cast_decimal(field_id, raw_text(scope, field_id)?.as_deref())
    }

    pub fn timestamp<S: FieldScope + ?Sized>(
        &self,
        scope: &S,
        field_id: &str,
    ) -> Result<DateTime<FixedOffset>, ExtractError> {
        self.cast_timestamp(field_id, raw_text(scope, field_id)?.as_deref())
    }

    /// Parses the source format as wall-clock time in the canonical zone
    ///
    /// An empty element has no meaningful zero timestamp and fails the cast.
    fn cast_timestamp(
        &self,
        field_id: &str,
        raw: Option<&str>,
    ) -> Result<DateTime<FixedOffset>, ExtractError> {
        let value = raw.unwrap_or_default().trim();
        let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map_err(|_| ExtractError::cast(field_id, FieldType::Timestamp, value))?;

        self.timezone
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| ExtractError::cast(field_id, FieldType::Timestamp, value))
    }
}

/// Returns the element's first text node, `None` if the element is empty
fn raw_text<S: FieldScope + ?Sized>(
    scope: &S,
    field_id: &str,
) -> Result<Option<String>, ExtractError> {
    let not_found = || ExtractError::FieldNotFound {
        field: field_id.to_string(),
    };

    let selector = id_selector(field_id).ok_or_else(not_found)?;
    let element = scope.find_first(&selector).ok_or_else(not_found)?;

    Ok(element.text().next().map(str::to_string))
}

fn cast_integer(field_id: &str, raw: Option<&str>) -> Result<u64, ExtractError> {
    let value = raw.unwrap_or_default().trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u64>()
        .map_err(|_| ExtractError::cast(field_id, FieldType::Integer, value))
}

/// Parses an exact amount, accepting `,` thousands separators, scaled to 2 places
fn cast_decimal(field_id: &str, raw: Option<&str>) -> Result<Decimal, ExtractError> {
    let value = raw.unwrap_or_default().trim();
    if value.is_empty() {
        return Ok(Decimal::new(0, 2));
    }

    let mut amount = Decimal::from_str(&value.replace(',', ""))
        .map_err(|_| ExtractError::cast(field_id, FieldType::Decimal, value))?;
    amount.rescale(2);
    Ok(amount)
}
