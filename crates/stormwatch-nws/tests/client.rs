//! Integration tests for `NwsClient` using wiremock HTTP mocks.

use stormwatch_nws::{NwsClient, NwsError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NwsClient {
    NwsClient::with_base_url(base_url, "stormwatch-test/0.1", 5, 0, 0)
        .expect("client construction should not fail")
}

fn alerts_body() -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "id": "https://api.weather.gov/alerts/urn:oid:1",
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-88.2, 30.5], [-87.9, 30.5], [-87.9, 30.8], [-88.2, 30.5]]]
                },
                "properties": {
                    "event": "Tornado Warning",
                    "headline": "Tornado Warning issued for Mobile County",
                    "expires": "2025-06-01T18:00:00-05:00",
                    "affectedZones": []
                }
            },
            {
                "id": "https://api.weather.gov/alerts/urn:oid:2",
                "type": "Feature",
                "geometry": null,
                "properties": {
                    "event": "Flood Warning",
                    "affectedZones": ["https://api.weather.gov/zones/forecast/ALZ263"]
                }
            },
            {
                "id": "https://api.weather.gov/alerts/urn:oid:3",
                "type": "Feature",
                "geometry": null,
                "properties": { "headline": "missing event field" }
            }
        ]
    })
}

#[tokio::test]
async fn fetch_active_alerts_decodes_features_and_skips_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .and(query_param("status", "actual"))
        .and(query_param("message_type", "alert"))
        .and(header("accept", "application/geo+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let alerts = client
        .fetch_active_alerts()
        .await
        .expect("should parse alerts");

    assert_eq!(alerts.len(), 2, "feature without an event is skipped");
    assert_eq!(alerts[0].event(), "Tornado Warning");
    assert!(alerts[0].has_polygonal_geometry());
    assert_eq!(alerts[1].event(), "Flood Warning");
    assert!(alerts[1].geometry.is_none());
    assert_eq!(
        alerts[1].properties.affected_zones,
        vec!["https://api.weather.gov/zones/forecast/ALZ263".to_string()]
    );
}

#[tokio::test]
async fn fetch_active_alerts_surfaces_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_active_alerts().await;

    assert!(
        matches!(result, Err(NwsError::UnexpectedStatus { status: 502, .. })),
        "expected UnexpectedStatus(502), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_active_alerts_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .mount(&server)
        .await;

    let client = NwsClient::with_base_url(&server.uri(), "stormwatch-test/0.1", 5, 2, 0)
        .expect("client");
    let alerts = client
        .fetch_active_alerts()
        .await
        .expect("second attempt should succeed");
    assert_eq!(alerts.len(), 2);
}

#[tokio::test]
async fn fetch_active_alerts_rejects_non_collection_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_active_alerts().await;
    assert!(matches!(result, Err(NwsError::Deserialize { .. })));
}

#[tokio::test]
async fn fetch_zone_geometry_returns_zone_polygon() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "https://api.weather.gov/zones/forecast/ALZ263",
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-88.4, 30.4], [-88.0, 30.4], [-88.0, 30.9], [-88.4, 30.4]]]
        },
        "properties": { "id": "ALZ263", "name": "Mobile Inland" }
    });

    Mock::given(method("GET"))
        .and(path("/zones/forecast/ALZ263"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let geometry = client
        .fetch_zone_geometry("https://api.weather.gov/zones/forecast/ALZ263")
        .await
        .expect("zone lookup should succeed")
        .expect("zone has geometry");

    assert!(stormwatch_nws::is_polygonal(&geometry));
}

#[tokio::test]
async fn fetch_zone_geometry_returns_none_for_null_geometry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones/county/ALC097"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "geometry": null, "properties": {} })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let geometry = client
        .fetch_zone_geometry("https://api.weather.gov/zones/county/ALC097")
        .await
        .expect("lookup should succeed");
    assert!(geometry.is_none());
}

#[tokio::test]
async fn fetch_zone_geometry_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones/forecast/XXZ999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .fetch_zone_geometry("https://api.weather.gov/zones/forecast/XXZ999")
        .await;
    assert!(matches!(result, Err(NwsError::NotFound { .. })));
}
