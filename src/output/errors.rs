//! Scrape error listing for operators

use crate::state::ErrorStage;
use crate::storage::{ScrapeErrorRecord, Storage};
use crate::RegistryError;

/// Loads recorded scrape errors, optionally for one stage only
pub fn load_errors(
    storage: &dyn Storage,
    stage: Option<ErrorStage>,
) -> Result<Vec<ScrapeErrorRecord>, RegistryError> {
    Ok(storage.list_errors(stage)?)
}

/// Prints scrape errors to stdout, one per line
pub fn print_errors(errors: &[ScrapeErrorRecord]) {
    if errors.is_empty() {
        println!("No scrape errors recorded");
        return;
    }

    println!("=== Scrape Errors ({}) ===\n", errors.len());
    for error in errors {
        println!(
            "{}  {:<9}  attempts={}  last={}  {}",
            error.cr_id,
            error.stage.to_db_string(),
            error.attempts,
            error.updated_at,
            error.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_load_errors_filters_by_stage() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .record_error("2000000010", ErrorStage::Personnel, "bad row")
            .unwrap();
        storage
            .record_error("2000000011", ErrorStage::Company, "no name")
            .unwrap();

        assert_eq!(load_errors(&storage, None).unwrap().len(), 2);

        let personnel = load_errors(&storage, Some(ErrorStage::Personnel)).unwrap();
        assert_eq!(personnel.len(), 1);
        assert_eq!(personnel[0].cr_id, "2000000010");
    }
}
