//! Integration tests for the Freshservice API client using wiremock.
//!
//! These tests cover authentication, pagination parameters and `Link`
//! handling, rate-limit headers and the mapping of error statuses.

mod common;

use common::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xavyo_connector::annotations::RateLimitStatus;
use xavyo_connector::traits::Connector;
use xavyo_connector_freshservice::{FreshserviceConnector, FreshserviceError, PageOptions};

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_requests_use_api_key_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .and(header("authorization", TEST_BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agents": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = client.list_agents(PageOptions::default()).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"code": "invalid_credentials", "message": "You have to be logged in"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .list_agents(PageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FreshserviceError::Unauthorized(ref m) if m == "You have to be logged in"));

    let connector_err: xavyo_connector::error::ConnectorError = err.into();
    assert_eq!(connector_err.error_code(), "AUTH_FAILED");
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_page_size_is_clamped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agents": []})))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server)
        .list_agents(PageOptions::new(0, 150))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_next_page_comes_from_link_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("groups")))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next_link(&server, "groups", 2).as_str())
                .set_body_json(json!({"groups": [create_test_group(1, "Ops", &[1, 2])]})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("groups")))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"groups": [create_test_group(2, "Network", &[])]})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let first = client.list_agent_groups(PageOptions::default()).await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.next_page, Some(2));

    let second = client
        .list_agent_groups(PageOptions::new(2, 100))
        .await
        .unwrap();
    assert_eq!(second.items[0].name, "Network");
    assert_eq!(second.next_page, None);
}

#[tokio::test]
async fn test_category_filter_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("service_catalog/items")))
        .and(query_param("category_id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"service_items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = xavyo_connector_freshservice::FreshserviceConfig::builder()
        .api_key(TEST_API_KEY)
        .domain("acme")
        .ticketing(true)
        .category_id("9")
        .api_base_url(format!("{}{}", server.uri(), API_PREFIX))
        .build()
        .unwrap();
    let client = xavyo_connector_freshservice::FreshserviceClient::new(&config).unwrap();
    client
        .list_service_items(PageOptions::default())
        .await
        .unwrap();
}

// =============================================================================
// Rate limits and soft errors
// =============================================================================

#[tokio::test]
async fn test_rate_limit_headers_are_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("roles")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Total", "140")
                .insert_header("X-RateLimit-Remaining", "12")
                .set_body_json(json!({"roles": [create_test_role(3, "Admin")]})),
        )
        .mount(&server)
        .await;

    let page = test_client(&server)
        .list_roles(PageOptions::default())
        .await
        .unwrap();
    let rate_limit = page.rate_limit.unwrap();
    assert_eq!(rate_limit.status, RateLimitStatus::Ok);
    assert_eq!(rate_limit.limit, 140);
    assert_eq!(rate_limit.remaining, 12);
}

#[tokio::test]
async fn test_429_is_surfaced_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("requesters")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .list_requesters(PageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FreshserviceError::RateLimited {
            retry_after_secs: Some(30)
        }
    ));
}

#[tokio::test]
async fn test_request_timeout_yields_empty_final_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    let page = test_client(&server)
        .list_agents(PageOptions::default())
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn test_server_error_is_hard_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .list_agents(PageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FreshserviceError::Api { status: 500, .. }));

    let connector_err: xavyo_connector::error::ConnectorError = err.into();
    assert!(connector_err.is_transient());
}

#[tokio::test]
async fn test_validation_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("groups/5")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "description": "Validation failed",
            "errors": [{"field": "members", "message": "Invalid agent id", "code": "invalid_value"}]
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .update_agent_group_members(5, vec![999])
        .await
        .unwrap_err();
    match err {
        FreshserviceError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Validation failed (members: Invalid agent id)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents/404")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server).get_agent(404).await.unwrap_err();
    assert!(matches!(err, FreshserviceError::NotFound(_)));
}

// =============================================================================
// Decoding
// =============================================================================

#[tokio::test]
async fn test_missing_envelope_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .list_agents(PageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FreshserviceError::Json(_)));
}

#[tokio::test]
async fn test_record_without_id_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"agents": [{"first_name": "No", "email": "no@acme.test"}]})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .list_agents(PageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FreshserviceError::Json(_)));
}

// =============================================================================
// Connector validation
// =============================================================================

#[tokio::test]
async fn test_connector_validate_lists_one_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Total", "100")
                .insert_header("X-RateLimit-Remaining", "99")
                .set_body_json(json!({"agents": [create_test_agent(1, "Ada", "Lovelace")]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let connector = FreshserviceConnector::new(test_config(&server)).unwrap();
    let annotations = connector.validate().await.unwrap();
    assert_eq!(annotations.rate_limit().unwrap().remaining, 99);
}

#[tokio::test]
async fn test_connector_validate_reports_bad_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("agents")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let connector = FreshserviceConnector::new(test_config(&server)).unwrap();
    let err = connector.validate().await.unwrap_err();
    assert_eq!(err.error_code(), "AUTH_FAILED");
}
