//! Common test utilities for xavyo-connector-freshservice integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::MockServer;
use xavyo_connector_freshservice::{FreshserviceClient, FreshserviceConfig};

/// API key used by every test config.
pub const TEST_API_KEY: &str = "test-key";

/// `Authorization` header for `test-key:X`.
pub const TEST_BASIC_AUTH: &str = "Basic dGVzdC1rZXk6WA==";

/// Base path every mocked endpoint lives under.
pub const API_PREFIX: &str = "/api/v2";

/// Config pointing at the mock server.
pub fn test_config(server: &MockServer) -> FreshserviceConfig {
    test_config_builder(server).build().unwrap()
}

/// Same as [`test_config`] with ticketing switched on.
pub fn test_ticketing_config(server: &MockServer) -> FreshserviceConfig {
    test_config_builder(server).ticketing(true).build().unwrap()
}

fn test_config_builder(server: &MockServer) -> xavyo_connector_freshservice::FreshserviceConfigBuilder {
    FreshserviceConfig::builder()
        .api_key(TEST_API_KEY)
        .domain("acme")
        .api_base_url(format!("{}{}", server.uri(), API_PREFIX))
}

pub fn test_client(server: &MockServer) -> Arc<FreshserviceClient> {
    Arc::new(FreshserviceClient::new(&test_config(server)).unwrap())
}

/// Full mock path for an API path such as `agents`.
pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}/{path}")
}

/// `Link` header pointing at `page` of `path`.
pub fn next_link(server: &MockServer, path: &str, page: u32) -> String {
    format!(
        "<{}{}/{}?page={}&per_page=100>; rel=\"next\"",
        server.uri(),
        API_PREFIX,
        path,
        page
    )
}

/// Test data factory for agents in the flat shape.
pub fn create_test_agent(id: u64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": last_name,
        "email": format!("{}@acme.test", first_name.to_lowercase()),
        "active": true,
        "job_title": "Support Engineer",
        "roles": [],
        "last_login_at": "2024-03-01T09:30:00Z"
    })
}

/// Agent holding the given roles with helpdesk-wide scope.
pub fn create_agent_with_roles(id: u64, first_name: &str, role_ids: &[u64]) -> Value {
    let mut agent = create_test_agent(id, first_name, "Tester");
    agent["roles"] = Value::Array(
        role_ids
            .iter()
            .map(|r| json!({"role_id": r, "assignment_scope": "entire_helpdesk"}))
            .collect(),
    );
    agent
}

pub fn create_test_requester(id: u64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": last_name,
        "primary_email": format!("{}@customer.test", first_name.to_lowercase()),
        "active": true,
        "is_agent": false,
        "job_title": null,
        "mobile_phone_number": null
    })
}

pub fn create_test_group(id: u64, name: &str, members: &[u64]) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Test group: {name}"),
        "members": members
    })
}

pub fn create_test_role(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Test role: {name}"),
        "role_type": 1
    })
}

pub fn create_test_requester_group(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Test requester group: {name}"),
        "type": "manual"
    })
}

pub fn create_test_member(id: u64, first_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": "Member",
        "primary_email": format!("{}@customer.test", first_name.to_lowercase())
    })
}

/// Catalog item with a text, a dropdown and an unsupported decimal field.
pub fn create_test_service_item(id: u64, display_id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "display_id": display_id,
        "name": name,
        "category_id": 9,
        "deleted": false,
        "visibility": 2,
        "custom_fields": [
            {
                "name": "reason",
                "label": "Business reason",
                "field_type": "custom_text",
                "required": true,
                "choices": []
            },
            {
                "name": "model",
                "label": "Model",
                "field_type": "custom_dropdown",
                "required": false,
                "choices": [["Air", "Air"], ["Pro", "Pro"]]
            },
            {
                "name": "budget",
                "label": "Budget",
                "field_type": "custom_decimal",
                "required": false
            }
        ]
    })
}

pub fn create_test_ticket(id: u64, subject: &str) -> Value {
    json!({
        "id": id,
        "subject": subject,
        "description": format!("<div>{subject}</div>"),
        "description_text": subject,
        "status": 2,
        "tags": [],
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z"
    })
}
