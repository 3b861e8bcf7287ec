use std::time::Duration;

use cheapo_core::{Page, SearchQuery};
use cheapo_engine::{CatalogSearch, FailureKind, FetchSettings, ReqwestFetcher, StoreLocator};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        stores_url: format!("{}/stores", server.uri()),
        search_url: format!("{}/search", server.uri()),
        ..FetchSettings::default()
    })
    .expect("client")
}

fn query(page: u32) -> SearchQuery {
    SearchQuery::new(Some("1039"), None, Some("drill"), Page::new(page).unwrap()).unwrap()
}

#[tokio::test]
async fn lookup_sends_coordinates_and_builds_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .and(query_param("latitude", "40.7"))
        .and(query_param("longitude", "-73.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stores": [{
                "storeId": "1039",
                "name": "Flushing",
                "address": {"city": "Queens", "state": "NY"},
                "coordinates": {"lat": 40.76, "lng": -73.83}
            }]
        })))
        .mount(&server)
        .await;

    let stores = fetcher_for(&server)
        .nearby_stores(40.7, -73.9)
        .await
        .expect("lookup ok");

    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].id, "1039");
    assert_eq!(stores[0].label, "Queens, NY - Flushing - #1039");
    assert_eq!((stores[0].lat, stores[0].lon), (40.76, -73.83));
}

#[tokio::test]
async fn search_requests_the_page_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("storeId", "1039"))
        .and(query_param("categoryId", ""))
        .and(query_param("keyword", "drill"))
        .and(query_param("startIndex", "96"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchReport": {"totalProducts": 100},
            "skus": [{
                "itemId": "205",
                "productUrl": "p/drill/205",
                "info": {"imageUrl": "https://img/205_<SIZE>.jpg", "brandName": "DEWALT", "productLabel": "Drill"},
                "storeSku": {
                    "pricing": {"specialPrice": 79.5, "percentageOff": 20},
                    "inventory": [{"sellableQty": 3}]
                }
            }]
        })))
        .mount(&server)
        .await;

    let payload = fetcher_for(&server)
        .search(&query(3))
        .await
        .expect("search ok");

    assert_eq!(payload.total_products, 100);
    let record = &payload.products[0];
    assert_eq!(record.item_id, "205");
    assert_eq!(record.brand_name.as_deref(), Some("DEWALT"));
    assert_eq!(record.special_price, 79.5);
    assert_eq!(record.percentage_off, 20.0);
    assert_eq!(record.sellable_qty, Some(3));
}

#[tokio::test]
async fn http_errors_are_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).search(&query(1)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"skus\": [", "application/json"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).search(&query(1)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"stores": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        stores_url: format!("{}/stores", server.uri()),
        request_timeout: Duration::from_millis(100),
        ..FetchSettings::default()
    })
    .expect("client");

    let err = fetcher.nearby_stores(1.0, 2.0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    let padding = "x".repeat(2048);
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stores": [], "pad": padding})))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        stores_url: format!("{}/stores", server.uri()),
        max_bytes: 1024,
        ..FetchSettings::default()
    })
    .expect("client");

    let err = fetcher.nearby_stores(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 1024, .. }));
}

#[tokio::test]
async fn html_responses_are_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).nearby_stores(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::UnsupportedContentType { .. }));
}
