//! Integration tests for the two-phase harvest
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end: country discovery, listing pagination, user
//! deduplication, and collection fetching.
//!
//! Country-page mocks carry query matchers and are mounted before the
//! bare directory-root mock, since the first matching mock answers.

use meeple_harvest::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use meeple_harvest::crawler::Coordinator;
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at a mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            request_delay_ms: 1, // Very short for testing
            max_fetch_attempts: 2,
            max_concurrent_fetches: 5,
            country_limit: 2,
        },
        site: SiteConfig {
            users_url: format!("{}/users", base_url),
            collection_url: format!("{}/xmlapi2/collection", base_url),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            ratings_path: "./test_ratings.csv".to_string(),
        },
    }
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn directory_root(countries: &[&str]) -> String {
    let options: String = countries
        .iter()
        .map(|country| format!("<option>{}</option>", country))
        .collect();
    format!(
        r#"<html><body><select id="avatars-country"><option value=""></option>{}</select></body></html>"#,
        options
    )
}

fn listing_page(usernames: &[&str], last_page: Option<u32>) -> String {
    let users: String = usernames
        .iter()
        .map(|name| format!(r#"<div class="username">({})</div>"#, name))
        .collect();
    let marker = match last_page {
        Some(n) => format!(r#"<a href="/users/page/{n}" title="last page">[{n}]</a>"#),
        None => String::new(),
    };
    format!("<html><body>{}{}</body></html>", users, marker)
}

fn collection_xml(item_id: &str, rating: f64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<items totalitems="1">
    <item objectid="{}" subtype="boardgame">
        <stats minplayers="2" maxplayers="4">
            <rating value="{}"><average value="6.5"/></rating>
        </stats>
    </item>
</items>"#,
        item_id, rating
    )
}

async fn mount_collection(server: &MockServer, username: &str, xml: String) {
    Mock::given(method("GET"))
        .and(path("/xmlapi2/collection"))
        .and(query_param("username", username))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml)
                .insert_header("content-type", "text/xml"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_two_countries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Country A: one page with alice and bob
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "A"))
        .respond_with(html_response(listing_page(&["alice", "bob"], None)))
        .mount(&mock_server)
        .await;

    // Country B: two pages; bob appears again and must deduplicate
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "B"))
        .respond_with(html_response(listing_page(&["bob", "carol"], Some(2))))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/page/2"))
        .and(query_param("country", "B"))
        .respond_with(html_response(listing_page(&["dave"], Some(2))))
        .mount(&mock_server)
        .await;

    // Directory root, mounted after the country pages
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(html_response(directory_root(&["A", "B"])))
        .mount(&mock_server)
        .await;

    // One rated game per user
    mount_collection(&mock_server, "alice", collection_xml("100", 7.5)).await;
    mount_collection(&mock_server, "bob", collection_xml("200", 8.0)).await;
    mount_collection(&mock_server, "carol", collection_xml("300", 6.5)).await;
    mount_collection(&mock_server, "dave", collection_xml("400", 9.0)).await;

    let config = create_test_config(&base_url);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await.expect("Harvest failed");

    // bob deduplicated: four users, one item each
    assert_eq!(result.users_discovered, 4);
    assert_eq!(result.items.len(), 4);
    assert!(result.failed_users.is_empty());

    let owners: HashSet<&str> = result.items.iter().map(|i| i.owner.as_str()).collect();
    assert_eq!(owners, ["alice", "bob", "carol", "dave"].into());

    let alice_item = result
        .items
        .iter()
        .find(|i| i.owner == "alice")
        .expect("missing alice's item");
    assert_eq!(alice_item.item_id, "100");
    assert_eq!(alice_item.rating, 7.5);
}

#[tokio::test]
async fn test_failed_user_does_not_abort_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "A"))
        .respond_with(html_response(listing_page(
            &["alice", "bob", "mallory"],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(html_response(directory_root(&["A"])))
        .mount(&mock_server)
        .await;

    mount_collection(&mock_server, "alice", collection_xml("100", 7.5)).await;
    mount_collection(&mock_server, "bob", collection_xml("200", 8.0)).await;

    // mallory's collection always fails
    Mock::given(method("GET"))
        .and(path("/xmlapi2/collection"))
        .and(query_param("username", "mallory"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await.expect("Harvest failed");

    // The two healthy users survive; exactly one failure is reported
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.failed_users, vec!["mallory".to_string()]);

    let owners: HashSet<&str> = result.items.iter().map(|i| i.owner.as_str()).collect();
    assert_eq!(owners, ["alice", "bob"].into());
}

#[tokio::test]
async fn test_country_limit_caps_partitions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "A"))
        .respond_with(html_response(listing_page(&["alice"], None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "B"))
        .respond_with(html_response(listing_page(&["bob"], None)))
        .mount(&mock_server)
        .await;

    // Country C is beyond the limit of 2 and must never be fetched
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "C"))
        .respond_with(html_response(listing_page(&["carol"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(html_response(directory_root(&["A", "B", "C"])))
        .mount(&mock_server)
        .await;

    mount_collection(&mock_server, "alice", collection_xml("100", 7.5)).await;
    mount_collection(&mock_server, "bob", collection_xml("200", 8.0)).await;

    let config = create_test_config(&base_url);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await.expect("Harvest failed");

    assert_eq!(result.users_discovered, 2);
    let owners: HashSet<&str> = result.items.iter().map(|i| i.owner.as_str()).collect();
    assert_eq!(owners, ["alice", "bob"].into());

    // Wiremock verifies the expect(0) on country C when the server drops
}

#[tokio::test]
async fn test_no_countries_discovered() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A root page without the country select
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(html_response(
            "<html><body><p>maintenance</p></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    // Phase 2 must never start
    Mock::given(method("GET"))
        .and(path("/xmlapi2/collection"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await.expect("Harvest failed");

    assert!(result.is_empty());
    assert_eq!(result.users_discovered, 0);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("country", "A"))
        .respond_with(html_response(listing_page(&["alice", "bob"], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(html_response(directory_root(&["A"])))
        .mount(&mock_server)
        .await;

    mount_collection(&mock_server, "alice", collection_xml("100", 7.5)).await;
    mount_collection(&mock_server, "bob", collection_xml("200", 8.0)).await;

    let first = Coordinator::new(create_test_config(&base_url))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("First harvest failed");
    let second = Coordinator::new(create_test_config(&base_url))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Second harvest failed");

    // Ordering may differ between runs, the set of records may not
    let as_set = |result: &meeple_harvest::CrawlResult| -> HashSet<(String, String)> {
        result
            .items
            .iter()
            .map(|i| (i.owner.clone(), i.item_id.clone()))
            .collect()
    };
    assert_eq!(as_set(&first), as_set(&second));
    assert_eq!(first.failed_users, second.failed_users);
}
