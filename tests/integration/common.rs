//! Shared fixtures: configuration, record pages and scrape contexts

use registry_crawler::config::{
    Config, CrawlerConfig, OutputConfig, RegionEntry, RegistryConfig, UserAgentConfig,
};
use registry_crawler::crawler::{build_http_client, FieldExtractor, RecordParser, ScrapeContext};
use registry_crawler::storage::{self, SharedStorage, SqliteStorage};
use std::path::Path;
use std::sync::Arc;
use url::Url;

pub const RECORD_PATH: &str = "/search/result.aspx";

/// Creates a test configuration against the mock registry
pub fn create_test_config(server_uri: &str, db_path: &Path, regions: Vec<RegionEntry>) -> Config {
    Config {
        registry: RegistryConfig {
            base_url: format!("{}{}", server_uri, RECORD_PATH),
            timezone: "+02:00".to_string(),
        },
        crawler: CrawlerConfig {
            request_limit: 2,
            pause_ms: 5, // Very short for testing
            max_concurrent_units: 2,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.display().to_string(),
        },
        regions,
    }
}

/// Builds a scrape context backed by in-memory storage
pub fn create_test_context(server_uri: &str) -> (Arc<ScrapeContext>, SharedStorage) {
    let storage = storage::shared(SqliteStorage::new_in_memory().expect("in-memory storage"));
    let config = create_test_config(server_uri, Path::new(":memory:"), vec![]);

    let client = build_http_client(&config.user_agent, 5).expect("http client");
    let timezone = chrono::FixedOffset::east_opt(2 * 3600).expect("offset");
    let context = ScrapeContext::new(
        client,
        storage.clone(),
        RecordParser::new(FieldExtractor::new(timezone)),
        Url::parse(&config.registry.base_url).expect("base url"),
    );

    (Arc::new(context), storage)
}

/// One relationship-table data row
pub struct PersonRow {
    pub name: &'static str,
    pub relationship: &'static str,
    pub stock: &'static str,
}

/// Renders a record page in the registry's template
///
/// `name: None` drops the name element; `rows: None` drops the relationship
/// table entirely.
pub fn record_page(name: Option<&str>, rows: Option<&[PersonRow]>) -> String {
    let name_cell = name
        .map(|n| format!(r#"<span id="DataList1_Label2_0">{}</span>"#, n))
        .unwrap_or_default();

    let relations = match rows {
        Some(rows) => {
            let mut html = String::from(
                r#"<table><tr id="Relations_ListView_Tr1">
                   <th>Name</th><th>Nationality</th><th>Relation</th>
                   <th>Stock</th><th>Quota</th><th>Ratio</th></tr>"#,
            );
            for (i, row) in rows.iter().enumerate() {
                html.push_str(&format!(
                    r#"<tr>
                       <td><span id="Relations_ListView_desigLabel_{i}">{name}</span></td>
                       <td><span id="Relations_ListView_countryLabel_{i}">Lebanon</span></td>
                       <td><span id="Relations_ListView_relLabel_{i}">{rel}</span></td>
                       <td><span id="Relations_ListView_a_valLabel_{i}">{stock}</span></td>
                       <td><span id="Relations_ListView_s_valLabel_{i}"></span></td>
                       <td><span id="Relations_ListView_r_valLabel_{i}"></span></td>
                       </tr>"#,
                    i = i,
                    name = row.name,
                    rel = row.relationship,
                    stock = row.stock,
                ));
            }
            html.push_str("</table>");
            html
        }
        None => String::new(),
    };

    format!(
        r#"<html><head><title>Commercial Register</title></head><body>
        <table>
          <tr><td><span id="DataList1_Label1_0">70412</span></td></tr>
          <tr><td>{name_cell}</td></tr>
          <tr><td><span id="DataList1_Label3_0">Cedar Holdings</span></td></tr>
          <tr><td><span id="DataList1_Label4_0"></span></td></tr>
          <tr><td><span id="DataList1_Label5_0">11/2/2004 4:05:00 PM</span></td></tr>
          <tr><td><span id="DataList1_Label6_0">Main register</span></td></tr>
          <tr><td><span id="DataList1_Label7_0">Active</span></td></tr>
          <tr><td><span id="DataList1_Label8_0">Unlimited</span></td></tr>
          <tr><td><span id="DataList1_Label9_0">Joint stock</span></td></tr>
          <tr><td><span id="DataList1_Label10_0">30,000,000.00</span></td></tr>
          <tr><td><span id="DataList1_Label11_0">Cedar</span></td></tr>
          <tr><td><span id="DataList1_Label12_0">Trading</span></td></tr>
        </table>
        {relations}
        </body></html>"#
    )
}
