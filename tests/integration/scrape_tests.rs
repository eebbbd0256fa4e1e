//! Scrape unit tests against a mock registry

use crate::common::{create_test_context, record_page, PersonRow, RECORD_PATH};
use registry_crawler::crawler::{ScrapeFailure, ScrapeUnit};
use registry_crawler::storage::{self, Storage};
use registry_crawler::{ErrorStage, Identifier, Region};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, cr_id: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .and(query_param("id", cr_id))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_record_is_stored() {
    let server = MockServer::start().await;
    let rows = [
        PersonRow {
            name: "Nadim Haddad",
            relationship: "Partner",
            stock: "",
        },
        PersonRow {
            name: "Rima Khoury",
            relationship: "Auditor",
            stock: "",
        },
        PersonRow {
            name: "Nadim Haddad",
            relationship: "Manager",
            stock: "400",
        },
    ];
    mount_page(
        &server,
        "1000000007",
        200,
        record_page(Some("Cedar Trading SAL"), Some(rows.as_slice())),
    )
    .await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::Beirut, 7).unwrap();

    let outcome = ScrapeUnit::new(id, context).run().await.expect("unit succeeds");
    assert_eq!(outcome.persons, 2);

    let storage = storage::lock(&storage).unwrap();
    let stored = storage.get_company("1000000007").unwrap().expect("company stored");
    let company = &stored.company;
    assert_eq!(company.name, "Cedar Trading SAL");
    assert_eq!(company.registration_number, 70412);
    assert_eq!(company.capital.to_string(), "30000000.00");
    assert_eq!(
        company.registration_date.to_rfc3339(),
        "2004-11-02T16:05:00+02:00"
    );
    assert!(company.source_url.ends_with("/search/result.aspx?id=1000000007"));
    assert!(!company.missing_personnel_data);

    let persons = storage.get_persons(stored.id).unwrap();
    assert_eq!(persons.len(), 2);
    assert_eq!(persons[0].person.name, "Nadim Haddad");
    assert_eq!(persons[0].person.relationship, "Partner \\ Manager");
    assert_eq!(persons[0].person.stock, 400);
    assert_eq!(persons[1].person.name, "Rima Khoury");

    assert!(storage.get_error("1000000007").unwrap().is_none());
}

#[tokio::test]
async fn test_page_without_relationship_table() {
    let server = MockServer::start().await;
    mount_page(&server, "5000000003", 200, record_page(Some("Sole Trader"), None)).await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::SouthLebanon, 3).unwrap();

    let outcome = ScrapeUnit::new(id, context).run().await.unwrap();
    assert_eq!(outcome.persons, 0);

    let storage = storage::lock(&storage).unwrap();
    let stored = storage.get_company("5000000003").unwrap().unwrap();
    assert!(stored.company.missing_personnel_data);
    assert!(storage.find_unreconciled_companies().unwrap().is_empty());
    assert!(storage.get_error("5000000003").unwrap().is_none());
}

#[tokio::test]
async fn test_missing_name_records_company_error() {
    let server = MockServer::start().await;
    mount_page(&server, "2000000011", 200, record_page(None, None)).await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::MountLebanon, 11).unwrap();

    let failure = ScrapeUnit::new(id, context).run().await.unwrap_err();
    assert!(matches!(failure, ScrapeFailure::CompanyExtraction(_)));

    let storage = storage::lock(&storage).unwrap();
    assert!(storage.get_company("2000000011").unwrap().is_none());

    let error = storage.get_error("2000000011").unwrap().expect("error recorded");
    assert_eq!(error.stage, ErrorStage::Company);
    assert!(error.message.contains("DataList1_Label2_0"));
}

#[tokio::test]
async fn test_server_error_records_unknown_stage() {
    let server = MockServer::start().await;
    mount_page(&server, "3000000001", 500, String::new()).await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::NorthLebanon, 1).unwrap();

    let failure = ScrapeUnit::new(id, context).run().await.unwrap_err();
    assert!(matches!(failure, ScrapeFailure::Transport(_)));

    let storage = storage::lock(&storage).unwrap();
    let error = storage.get_error("3000000001").unwrap().unwrap();
    assert_eq!(error.stage, ErrorStage::Unknown);
    assert!(storage.get_company("3000000001").unwrap().is_none());
}

#[tokio::test]
async fn test_bad_personnel_row_keeps_company() {
    let server = MockServer::start().await;
    let rows = [
        PersonRow {
            name: "Nadim Haddad",
            relationship: "Partner",
            stock: "100",
        },
        PersonRow {
            name: "Rima Khoury",
            relationship: "Manager",
            stock: "n/a",
        },
    ];
    mount_page(
        &server,
        "4000000020",
        200,
        record_page(Some("Bekaa Mills"), Some(rows.as_slice())),
    )
    .await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::Bekaa, 20).unwrap();

    let failure = ScrapeUnit::new(id, context).run().await.unwrap_err();
    assert_eq!(failure.stage(), ErrorStage::Personnel);

    let storage = storage::lock(&storage).unwrap();
    let stored = storage.get_company("4000000020").unwrap().expect("company kept");
    assert!(storage.get_persons(stored.id).unwrap().is_empty());

    let error = storage.get_error("4000000020").unwrap().unwrap();
    assert_eq!(error.stage, ErrorStage::Personnel);

    // Expected personnel never arrived, so the company is flagged for reconciliation
    assert_eq!(
        storage.find_unreconciled_companies().unwrap(),
        vec!["4000000020".to_string()]
    );
}

#[tokio::test]
async fn test_duplicate_dispatch_is_a_conflict() {
    let server = MockServer::start().await;
    mount_page(&server, "6000000002", 200, record_page(Some("Nabatieh Oil"), None)).await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::Nabatieh, 2).unwrap();

    ScrapeUnit::new(id, context.clone()).run().await.unwrap();
    let failure = ScrapeUnit::new(id, context).run().await.unwrap_err();
    assert!(matches!(
        failure,
        ScrapeFailure::PersistenceConflict {
            stage: ErrorStage::Company,
            ..
        }
    ));

    let storage = storage::lock(&storage).unwrap();
    assert_eq!(
        storage.count_companies_by_region().unwrap().get(&Region::Nabatieh),
        Some(&1)
    );
    let error = storage.get_error("6000000002").unwrap().unwrap();
    assert_eq!(error.stage, ErrorStage::Company);
}

#[tokio::test]
async fn test_repeated_failure_updates_error() {
    let server = MockServer::start().await;
    mount_page(&server, "1000000099", 503, String::new()).await;

    let (context, storage) = create_test_context(&server.uri());
    let id = Identifier::new(Region::Beirut, 99).unwrap();

    let _ = ScrapeUnit::new(id, context.clone()).run().await;
    let _ = ScrapeUnit::new(id, context).run().await;

    let storage = storage::lock(&storage).unwrap();
    let error = storage.get_error("1000000099").unwrap().unwrap();
    assert_eq!(error.attempts, 2);
    assert_eq!(storage.list_errors(None).unwrap().len(), 1);
}
