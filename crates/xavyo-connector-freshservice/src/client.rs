//! Freshservice REST API client.
//!
//! One method per endpoint; every call issues exactly one HTTP request and
//! returns the decoded payload together with the rate-limit state reported
//! by the response. Nothing is retried.

use reqwest::header::{ACCEPT, LINK};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use secrecy::{ExposeSecret, SecretString};
use xavyo_connector::annotations::RateLimitDescription;

use crate::config::{FreshserviceConfig, API_KEY_PASSWORD};
use crate::error::{FreshserviceError, FreshserviceResult};
use crate::models::{
    Agent, AgentGroup, AgentRole, RequesterGroupMember, Requester, RequesterGroup, Role,
    ServiceItem, ServiceRequestPayload, TicketDetails, TicketUpdatePayload, UpdateAgentRoles,
    UpdateGroupMembers,
};
use crate::pagination::{next_page_from_link, PageOptions};
use crate::rate_limit::{extract_rate_limit, retry_after_secs};

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the `Link` header has no `rel="next"`.
    pub next_page: Option<u32>,
    pub rate_limit: Option<RateLimitDescription>,
}

impl<T> Page<T> {
    /// A final page with no items.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page: None,
            rate_limit: None,
        }
    }

    /// Next page number as a page-state token; empty when done.
    #[must_use]
    pub fn next_token(&self) -> String {
        self.next_page.map(|p| p.to_string()).unwrap_or_default()
    }
}

/// Result of a single-record call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub rate_limit: Option<RateLimitDescription>,
}

/// Error body returned by Freshservice.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn summary(&self) -> Option<String> {
        let head = self.description.as_deref().or(self.message.as_deref())?;
        let details: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| match (&e.field, &e.message) {
                (Some(field), Some(message)) => Some(format!("{field}: {message}")),
                (None, Some(message)) => Some(message.clone()),
                _ => None,
            })
            .collect();
        if details.is_empty() {
            Some(head.to_string())
        } else {
            Some(format!("{head} ({})", details.join("; ")))
        }
    }
}

/// Freshservice API client.
#[derive(Debug)]
pub struct FreshserviceClient {
    http_client: reqwest::Client,
    base_url: String,
    subdomain: String,
    api_key: SecretString,
    category_id: Option<String>,
}

impl FreshserviceClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &FreshserviceConfig) -> FreshserviceResult<Self> {
        let base_url = config.base_url();
        url::Url::parse(&base_url)?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connection.connection_timeout())
            .timeout(config.connection.read_timeout())
            .build()
            .map_err(|e| FreshserviceError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            subdomain: config.subdomain().to_string(),
            api_key: SecretString::from(config.api_key().expose_secret().to_owned()),
            category_id: config.category_id.clone(),
        })
    }

    /// Returns the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Account subdomain.
    #[must_use]
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    // Agents

    #[instrument(skip(self))]
    pub async fn list_agents(&self, page: PageOptions) -> FreshserviceResult<Page<Agent>> {
        self.list("agents", "agents", page, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_agent(&self, agent_id: u64) -> FreshserviceResult<ApiResponse<Agent>> {
        self.get(&format!("agents/{agent_id}"), "agent").await
    }

    /// The agent owning the API key.
    #[instrument(skip(self))]
    pub async fn get_current_agent(&self) -> FreshserviceResult<ApiResponse<Agent>> {
        self.get("agents/me", "agent").await
    }

    /// Replace the agent's whole role list.
    #[instrument(skip(self))]
    pub async fn update_agent_roles(
        &self,
        agent_id: u64,
        roles: Vec<AgentRole>,
    ) -> FreshserviceResult<ApiResponse<Agent>> {
        self.send(
            Method::PUT,
            &format!("agents/{agent_id}"),
            "agent",
            &UpdateAgentRoles { roles },
        )
        .await
    }

    // Requesters

    #[instrument(skip(self))]
    pub async fn list_requesters(&self, page: PageOptions) -> FreshserviceResult<Page<Requester>> {
        self.list("requesters", "requesters", page, &[]).await
    }

    // Agent groups

    #[instrument(skip(self))]
    pub async fn list_agent_groups(
        &self,
        page: PageOptions,
    ) -> FreshserviceResult<Page<AgentGroup>> {
        self.list("groups", "groups", page, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_agent_group(
        &self,
        group_id: u64,
    ) -> FreshserviceResult<ApiResponse<AgentGroup>> {
        self.get(&format!("groups/{group_id}"), "group").await
    }

    /// Replace the group's whole member list.
    #[instrument(skip(self))]
    pub async fn update_agent_group_members(
        &self,
        group_id: u64,
        members: Vec<u64>,
    ) -> FreshserviceResult<ApiResponse<AgentGroup>> {
        self.send(
            Method::PUT,
            &format!("groups/{group_id}"),
            "group",
            &UpdateGroupMembers { members },
        )
        .await
    }

    // Roles

    #[instrument(skip(self))]
    pub async fn list_roles(&self, page: PageOptions) -> FreshserviceResult<Page<Role>> {
        self.list("roles", "roles", page, &[]).await
    }

    // Requester groups

    #[instrument(skip(self))]
    pub async fn list_requester_groups(
        &self,
        page: PageOptions,
    ) -> FreshserviceResult<Page<RequesterGroup>> {
        self.list("requester_groups", "requester_groups", page, &[])
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_requester_group_members(
        &self,
        group_id: u64,
        page: PageOptions,
    ) -> FreshserviceResult<Page<RequesterGroupMember>> {
        self.list(
            &format!("requester_groups/{group_id}/members"),
            "requesters",
            page,
            &[],
        )
        .await
    }

    /// Member page read ahead of a membership write.
    ///
    /// Unlike [`list_requester_group_members`](Self::list_requester_group_members),
    /// a 408 is returned as [`FreshserviceError::RequestTimeout`].
    #[instrument(skip(self))]
    pub async fn requester_group_members_strict(
        &self,
        group_id: u64,
        page: PageOptions,
    ) -> FreshserviceResult<Page<RequesterGroupMember>> {
        self.fetch_page(
            &format!("requester_groups/{group_id}/members"),
            "requesters",
            page,
            &[],
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn add_requester_to_group(
        &self,
        group_id: u64,
        requester_id: u64,
    ) -> FreshserviceResult<ApiResponse<()>> {
        self.send_no_content(
            Method::POST,
            &format!("requester_groups/{group_id}/members/{requester_id}"),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_requester_from_group(
        &self,
        group_id: u64,
        requester_id: u64,
    ) -> FreshserviceResult<ApiResponse<()>> {
        self.send_no_content(
            Method::DELETE,
            &format!("requester_groups/{group_id}/members/{requester_id}"),
        )
        .await
    }

    // Service catalog and tickets

    /// List catalog items, restricted to the configured category if any.
    #[instrument(skip(self))]
    pub async fn list_service_items(
        &self,
        page: PageOptions,
    ) -> FreshserviceResult<Page<ServiceItem>> {
        let filter: Vec<(&'static str, String)> = self
            .category_id
            .iter()
            .map(|id| ("category_id", id.clone()))
            .collect();
        self.list("service_catalog/items", "service_items", page, &filter)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_service_item(
        &self,
        display_id: u64,
    ) -> FreshserviceResult<ApiResponse<ServiceItem>> {
        self.get(
            &format!("service_catalog/items/{display_id}"),
            "service_item",
        )
        .await
    }

    #[instrument(skip(self, payload))]
    pub async fn place_service_request(
        &self,
        display_id: u64,
        payload: &ServiceRequestPayload,
    ) -> FreshserviceResult<ApiResponse<TicketDetails>> {
        self.send(
            Method::POST,
            &format!("service_catalog/items/{display_id}/place_request"),
            "service_request",
            payload,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_ticket(&self, ticket_id: u64) -> FreshserviceResult<ApiResponse<TicketDetails>> {
        self.get(&format!("tickets/{ticket_id}"), "ticket").await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_ticket(
        &self,
        ticket_id: u64,
        payload: &TicketUpdatePayload,
    ) -> FreshserviceResult<ApiResponse<TicketDetails>> {
        self.send(Method::PUT, &format!("tickets/{ticket_id}"), "ticket", payload)
            .await
    }

    // Plumbing

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(self.api_key.expose_secret(), Some(API_KEY_PASSWORD))
    }

    /// Issues one request and maps non-success statuses to errors.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> FreshserviceResult<reqwest::Response> {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending Freshservice request");

        let mut request = self
            .authorize(self.http_client.request(method, &url))
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::error_from(path, response).await)
    }

    async fn error_from(path: &str, response: reqwest::Response) -> FreshserviceError {
        let status = response.status();
        let retry_after = retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.summary())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        match status {
            StatusCode::UNAUTHORIZED => FreshserviceError::Unauthorized(message),
            StatusCode::FORBIDDEN => FreshserviceError::Forbidden(format!("{path}: {message}")),
            StatusCode::NOT_FOUND => FreshserviceError::NotFound(path.to_string()),
            StatusCode::REQUEST_TIMEOUT => FreshserviceError::RequestTimeout(message),
            StatusCode::TOO_MANY_REQUESTS => FreshserviceError::RateLimited {
                retry_after_secs: retry_after,
            },
            _ => FreshserviceError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Reads the body and pulls the record out of its envelope key.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        key: &str,
    ) -> FreshserviceResult<T> {
        let body = response.text().await?;
        let mut envelope: Value = serde_json::from_str(&body)?;
        let inner = envelope
            .get_mut(key)
            .map(Value::take)
            .ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "missing '{key}' in response"
                ))
            })?;
        Ok(serde_json::from_value(inner)?)
    }

    /// List call where a 408 ends pagination with an empty final page.
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        page: PageOptions,
        filter: &[(&'static str, String)],
    ) -> FreshserviceResult<Page<T>> {
        match self.fetch_page(path, key, page, filter).await {
            Err(e) if e.is_soft() => {
                warn!(path, page = page.page, error = %e, "Freshservice list timed out, ending pagination");
                Ok(Page::empty())
            }
            result => result,
        }
    }

    /// One page of a list endpoint; every error is returned as is.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        page: PageOptions,
        filter: &[(&'static str, String)],
    ) -> FreshserviceResult<Page<T>> {
        let mut query = page.query().to_vec();
        query.extend_from_slice(filter);

        let response = self.execute(Method::GET, path, &query, None::<&()>).await?;
        let rate_limit = extract_rate_limit(response.headers(), response.status());
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_from_link);
        let items: Vec<T> = Self::decode(response, key).await?;

        info!(
            path,
            page = page.page,
            count = items.len(),
            has_next = next_page.is_some(),
            "Fetched Freshservice page"
        );
        Ok(Page {
            items,
            next_page,
            rate_limit,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> FreshserviceResult<ApiResponse<T>> {
        let response = self.execute(Method::GET, path, &[], None::<&()>).await?;
        let rate_limit = extract_rate_limit(response.headers(), response.status());
        let data = Self::decode(response, key).await?;
        Ok(ApiResponse { data, rate_limit })
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        key: &str,
        body: &B,
    ) -> FreshserviceResult<ApiResponse<T>> {
        let response = self.execute(method, path, &[], Some(body)).await?;
        let rate_limit = extract_rate_limit(response.headers(), response.status());
        let data = Self::decode(response, key).await?;
        Ok(ApiResponse { data, rate_limit })
    }

    async fn send_no_content(
        &self,
        method: Method,
        path: &str,
    ) -> FreshserviceResult<ApiResponse<()>> {
        let response = self.execute(method, path, &[], None::<&()>).await?;
        let rate_limit = extract_rate_limit(response.headers(), response.status());
        Ok(ApiResponse {
            data: (),
            rate_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(domain: &str) -> FreshserviceConfig {
        FreshserviceConfig::builder()
            .api_key("key")
            .domain(domain)
            .build()
            .unwrap()
    }

    #[test]
    fn test_base_url_from_subdomain() {
        let client = FreshserviceClient::new(&config("acme")).unwrap();
        assert_eq!(client.base_url(), "https://acme.freshservice.com/api/v2");
        assert_eq!(client.url("/agents"), "https://acme.freshservice.com/api/v2/agents");
        assert_eq!(client.subdomain(), "acme");
    }

    #[test]
    fn test_error_body_summary() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"description":"Validation failed","errors":[{"field":"email","message":"It should be a valid email","code":"invalid_value"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.summary().unwrap(),
            "Validation failed (email: It should be a valid email)"
        );

        let body: ErrorBody =
            serde_json::from_str(r#"{"code":"access_denied","message":"You are not authorized"}"#)
                .unwrap();
        assert_eq!(body.summary().unwrap(), "You are not authorized");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = FreshserviceConfig::builder()
            .api_key("very-secret-key")
            .domain("acme")
            .build()
            .unwrap();
        let client = FreshserviceClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("very-secret-key"));
    }

    #[test]
    fn test_page_next_token() {
        let mut page: Page<u32> = Page::empty();
        assert_eq!(page.next_token(), "");
        page.next_page = Some(4);
        assert_eq!(page.next_token(), "4");
    }
}
