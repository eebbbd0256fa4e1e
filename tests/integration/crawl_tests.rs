//! End-to-end crawl tests

use crate::common::{create_test_config, record_page, RECORD_PATH};
use registry_crawler::config::RegionEntry;
use registry_crawler::crawler::crawl;
use registry_crawler::storage::{RunStatus, SqliteStorage, Storage};
use registry_crawler::{ErrorStage, Region, RegistryError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_record(server: &MockServer, cr_id: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .and(query_param("id", cr_id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(record_page(Some(name), None))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_of_one_region() {
    let server = MockServer::start().await;
    mount_record(&server, "3000000001", "First").await;
    mount_record(&server, "3000000002", "Second").await;
    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .and(query_param("id", "3000000003"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_record(&server, "3000000004", "Fourth").await;
    mount_record(&server, "3000000005", "Fifth").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("registry.db");
    let config = create_test_config(
        &server.uri(),
        &db_path,
        vec![RegionEntry { id: 3, ceiling: 5 }],
    );

    let report = crawl(config, "hash-1", None).await.expect("crawl succeeds");
    assert_eq!(report.dispatched(), 5);
    // request-limit 2: pauses before the 3rd and 5th dispatch
    assert_eq!(report.regions[0].pauses, 2);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(
        storage
            .count_companies_by_region()
            .unwrap()
            .get(&Region::NorthLebanon),
        Some(&4)
    );
    assert_eq!(
        storage.get_error("3000000003").unwrap().unwrap().stage,
        ErrorStage::Unknown
    );

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, report.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.dispatched, 5);
    assert_eq!(run.config_hash, "hash-1");
}

#[tokio::test]
async fn test_second_crawl_resumes_after_highest_record() {
    let server = MockServer::start().await;
    mount_record(&server, "1000000001", "One").await;
    mount_record(&server, "1000000002", "Two").await;
    mount_record(&server, "1000000003", "Three").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("registry.db");

    let first = create_test_config(
        &server.uri(),
        &db_path,
        vec![RegionEntry { id: 1, ceiling: 2 }],
    );
    assert_eq!(crawl(first, "h", None).await.unwrap().dispatched(), 2);

    let second = create_test_config(
        &server.uri(),
        &db_path,
        vec![RegionEntry { id: 1, ceiling: 3 }],
    );
    let report = crawl(second, "h", None).await.unwrap();
    assert_eq!(report.regions[0].start, 3);
    assert_eq!(report.dispatched(), 1);

    // Nothing left below the ceiling
    let third = create_test_config(
        &server.uri(),
        &db_path,
        vec![RegionEntry { id: 1, ceiling: 3 }],
    );
    assert_eq!(crawl(third, "h", None).await.unwrap().dispatched(), 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert!(storage.list_errors(None).unwrap().is_empty());
}

#[tokio::test]
async fn test_region_filter() {
    let server = MockServer::start().await;
    mount_record(&server, "2000000001", "Mount").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("registry.db");
    let config = create_test_config(
        &server.uri(),
        &db_path,
        vec![
            RegionEntry { id: 1, ceiling: 1 },
            RegionEntry { id: 2, ceiling: 1 },
        ],
    );

    let report = crawl(config, "h", Some(Region::MountLebanon)).await.unwrap();
    assert_eq!(report.regions.len(), 1);
    assert_eq!(report.regions[0].region, Region::MountLebanon);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert!(storage.get_company("2000000001").unwrap().is_some());
    assert!(storage.get_company("1000000001").unwrap().is_none());
}

#[tokio::test]
async fn test_unconfigured_region_filter_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("registry.db");
    let config = create_test_config(
        "http://127.0.0.1:9",
        &db_path,
        vec![RegionEntry { id: 1, ceiling: 1 }],
    );

    let err = crawl(config, "h", Some(Region::Bekaa)).await.unwrap_err();
    assert!(matches!(err, RegistryError::RegionNotConfigured(Region::Bekaa)));
}
