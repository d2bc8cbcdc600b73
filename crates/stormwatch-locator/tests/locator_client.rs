//! Integration tests for `LocatorClient` using wiremock HTTP mocks.

use stormwatch_core::StoreStatus;
use stormwatch_locator::{write_csv, LocatorClient, LocatorError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(locations: &serde_json::Value) -> String {
    let payload = serde_json::json!({
        "props": { "pageProps": { "locations": locations } },
        "page": "/"
    });
    format!(
        r#"<!DOCTYPE html><html><head>
        <script type="application/ld+json">{{"@context":"https://schema.org"}}</script>
        </head><body><div id="__next"></div>
        <script id="__NEXT_DATA__" type="application/json">{payload}</script>
        </body></html>"#
    )
}

#[tokio::test]
async fn fetch_locations_parses_embedded_payload() {
    let server = MockServer::start().await;
    let body = page(&serde_json::json!([
        {
            "storeCode": "1402",
            "businessName": "Waffle House",
            "addressLines": ["3210 Dauphin St"],
            "city": "Mobile",
            "state": "AL",
            "postalCode": "36606",
            "latitude": 30.6954,
            "longitude": -88.1012,
            "_status": "c"
        },
        {
            "storeCode": "1403",
            "businessName": "Waffle House",
            "latitude": null,
            "longitude": null,
            "_status": "A"
        }
    ]));

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = LocatorClient::new(format!("{}/", server.uri()), 5, "stormwatch-test/0.1")
        .expect("client");
    let locations = client.fetch_locations().await.expect("locations");

    assert_eq!(locations.len(), 1, "record without coordinates is skipped");
    assert_eq!(locations[0].store_code, "1402");
    assert_eq!(locations[0].status, StoreStatus::Closed);
    assert!(locations[0].last_changed.is_none());
}

#[tokio::test]
async fn fetch_locations_reports_missing_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"))
        .mount(&server)
        .await;

    let client = LocatorClient::new(format!("{}/", server.uri()), 5, "stormwatch-test/0.1")
        .expect("client");
    let result = client.fetch_locations().await;
    assert!(matches!(result, Err(LocatorError::MissingPayload { .. })));
}

#[tokio::test]
async fn fetch_locations_retries_then_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = LocatorClient::new(format!("{}/", server.uri()), 5, "stormwatch-test/0.1")
        .expect("client");
    let result = client.fetch_locations().await;
    assert!(matches!(result, Err(LocatorError::AllAttemptsFailed { .. })));
}

#[tokio::test]
async fn fetch_locations_recovers_after_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&serde_json::json!([
            { "storeCode": 9, "latitude": 33.7, "longitude": -84.4, "_status": "A" }
        ]))))
        .mount(&server)
        .await;

    let client = LocatorClient::new(format!("{}/", server.uri()), 5, "stormwatch-test/0.1")
        .expect("client");
    let locations = client.fetch_locations().await.expect("second attempt succeeds");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].store_code, "9");
}

#[tokio::test]
async fn fetch_store_records_keeps_every_object_and_exports_csv() {
    let server = MockServer::start().await;
    let body = page(&serde_json::json!([
        {
            "storeCode": "1402",
            "businessName": "Waffle House",
            "addressLines": ["3210 Dauphin St"],
            "city": "Mobile",
            "state": "AL",
            "country": "US",
            "custom": { "operated_by": "WH Inc" },
            "latitude": 30.6954,
            "longitude": -88.1012,
            "phoneNumbers": ["(251) 555-0100"],
            "_status": "c"
        },
        { "storeCode": "1403", "latitude": null, "_status": "A" },
        "garbage"
    ]));
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = LocatorClient::new(format!("{}/", server.uri()), 5, "stormwatch-test/0.1")
        .expect("client");
    let records = client.fetch_store_records().await.expect("records");

    assert_eq!(records.len(), 2, "stores without coordinates are still listed");
    assert_eq!(records[0].operated_by, "WH Inc");
    assert_eq!(records[0].online_order_link, "N/A");
    assert_eq!(records[0].status, "c");
    assert_eq!(records[1].latitude, "N/A");

    let mut out = Vec::new();
    write_csv(&records, &mut out).expect("csv");
    let csv = String::from_utf8(out).expect("utf8");
    let rows: Vec<&str> = csv.split_terminator("\r\n").collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("Store Code,Business Name,Address,City,State,Country,"));
    assert!(rows[1].starts_with("1402,Waffle House,3210 Dauphin St,Mobile,AL,US,WH Inc,N/A,N/A,30.6954,-88.1012,"));
    assert!(rows[2].starts_with("1403,N/A,"));
}
