//! Person merge engine
//!
//! The relationship table lists one row per (person, role). A person holding
//! several roles appears on several rows; those rows collapse into a single
//! `Person` per company.

use crate::model::Person;
use std::collections::HashMap;

/// Separator placed between merged relationship labels
pub const RELATIONSHIP_SEPARATOR: &str = " \\ ";

/// One row of the relationship table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRow {
    pub name: String,
    pub nationality: String,
    pub relationship: String,
    pub stock: u64,
    pub quota: u64,
    pub ratio: u64,
}

impl From<RelationshipRow> for Person {
    fn from(row: RelationshipRow) -> Self {
        Person {
            name: row.name,
            nationality: row.nationality,
            relationship: row.relationship,
            stock: row.stock,
            quota: row.quota,
            ratio: row.ratio,
        }
    }
}

/// Merge state for the personnel of one company
///
/// Scoped to a single parse; nothing is shared across companies.
#[derive(Debug, Default)]
pub struct PersonMerger {
    persons: Vec<Person>,
    by_name: HashMap<String, usize>,
}

impl PersonMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row, merging it into an earlier row with the same name
    ///
    /// On a repeat sighting the relationship labels are joined in first-seen
    /// order, and each of stock/quota/ratio only takes the new value while it
    /// is still zero.
    pub fn add(&mut self, row: RelationshipRow) {
        match self.by_name.get(&row.name) {
            Some(&index) => {
                let person = &mut self.persons[index];
                person.relationship.push_str(RELATIONSHIP_SEPARATOR);
                person.relationship.push_str(&row.relationship);
                fill_if_zero(&mut person.stock, row.stock);
                fill_if_zero(&mut person.quota, row.quota);
                fill_if_zero(&mut person.ratio, row.ratio);
            }
            None => {
                self.by_name.insert(row.name.clone(), self.persons.len());
                self.persons.push(row.into());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Consumes the merger, yielding one person per distinct name
    pub fn into_persons(self) -> Vec<Person> {
        self.persons
    }
}

fn fill_if_zero(current: &mut u64, candidate: u64) {
    if *current == 0 {
        *current = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, relationship: &str, stock: u64, quota: u64, ratio: u64) -> RelationshipRow {
        RelationshipRow {
            name: name.to_string(),
            nationality: "Lebanon".to_string(),
            relationship: relationship.to_string(),
            stock,
            quota,
            ratio,
        }
    }

    #[test]
    fn test_distinct_names_stay_separate() {
        let mut merger = PersonMerger::new();
        merger.add(row("A", "Partner", 0, 0, 0));
        merger.add(row("B", "Manager", 0, 0, 0));
        assert_eq!(merger.len(), 2);
    }

    #[test]
    fn test_repeat_name_joins_relationships_in_order() {
        let mut merger = PersonMerger::new();
        merger.add(row("A", "Partner", 0, 0, 0));
        merger.add(row("B", "Auditor", 0, 0, 0));
        merger.add(row("A", "Manager", 0, 0, 0));
        merger.add(row("A", "Chairman", 0, 0, 0));

        let persons = merger.into_persons();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].name, "A");
        assert_eq!(persons[0].relationship, "Partner \\ Manager \\ Chairman");
    }

    #[test]
    fn test_zero_is_filled_by_later_row() {
        let mut merger = PersonMerger::new();
        merger.add(row("A", "Partner", 0, 0, 0));
        merger.add(row("A", "Manager", 300, 20, 5));

        let person = &merger.into_persons()[0];
        assert_eq!((person.stock, person.quota, person.ratio), (300, 20, 5));
    }

    #[test]
    fn test_first_non_zero_wins() {
        let mut merger = PersonMerger::new();
        merger.add(row("A", "Partner", 100, 0, 0));
        merger.add(row("A", "Manager", 300, 20, 0));
        merger.add(row("A", "Chairman", 999, 999, 7));

        let person = &merger.into_persons()[0];
        assert_eq!(person.stock, 100);
        assert_eq!(person.quota, 20);
        assert_eq!(person.ratio, 7);
    }

    #[test]
    fn test_nationality_keeps_first_sighting() {
        let mut merger = PersonMerger::new();
        merger.add(row("A", "Partner", 0, 0, 0));
        let mut second = row("A", "Manager", 0, 0, 0);
        second.nationality = "France".to_string();
        merger.add(second);

        assert_eq!(merger.into_persons()[0].nationality, "Lebanon");
    }

    #[test]
    fn test_empty() {
        let merger = PersonMerger::new();
        assert!(merger.is_empty());
        assert!(merger.into_persons().is_empty());
    }
}
