//! Freshservice connector configuration.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use xavyo_connector::config::{AuthConfig, ConnectionSettings, ConnectorConfig};
use xavyo_connector::error::{ConnectorError, ConnectorResult};

use crate::error::{FreshserviceError, FreshserviceResult};

/// Host every Freshservice account lives under.
pub const FRESHSERVICE_HOST: &str = "freshservice.com";

/// Password sent alongside the API key in Basic auth.
pub(crate) const API_KEY_PASSWORD: &str = "X";

/// Configuration for one Freshservice account.
pub struct FreshserviceConfig {
    api_key: SecretString,
    subdomain: String,
    /// Only list catalog items from this category.
    pub category_id: Option<String>,
    /// Expose the ticketing adapter.
    pub ticketing: bool,
    /// Overrides `https://{subdomain}.freshservice.com/api/v2`.
    pub api_base_url: Option<String>,
    pub connection: ConnectionSettings,
}

impl fmt::Debug for FreshserviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreshserviceConfig")
            .field("api_key", &"***REDACTED***")
            .field("subdomain", &self.subdomain)
            .field("category_id", &self.category_id)
            .field("ticketing", &self.ticketing)
            .field("api_base_url", &self.api_base_url)
            .field("connection", &self.connection)
            .finish()
    }
}

impl FreshserviceConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> FreshserviceConfigBuilder {
        FreshserviceConfigBuilder::default()
    }

    /// Load the configuration from `FRESHSERVICE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> FreshserviceResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> FreshserviceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| FreshserviceError::Config(format!("{name} is not set")))
        };

        let mut builder = Self::builder()
            .api_key(required("FRESHSERVICE_API_KEY")?)
            .domain(required("FRESHSERVICE_DOMAIN")?);

        if let Some(category) = lookup("FRESHSERVICE_CATEGORY_ID").filter(|v| !v.is_empty()) {
            builder = builder.category_id(category);
        }
        if let Some(flag) = lookup("FRESHSERVICE_TICKETING") {
            builder = builder.ticketing(parse_flag("FRESHSERVICE_TICKETING", &flag)?);
        }
        if let Some(base) = lookup("FRESHSERVICE_API_BASE_URL").filter(|v| !v.is_empty()) {
            builder = builder.api_base_url(base);
        }

        builder.build()
    }

    /// The API key.
    #[must_use]
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Account subdomain, e.g. `acme` for `acme.freshservice.com`.
    #[must_use]
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}/api/v2", self.subdomain, FRESHSERVICE_HOST),
        }
    }

    /// Agent-portal URL of a ticket.
    #[must_use]
    pub fn ticket_url(&self, ticket_id: u64) -> String {
        ticket_url(&self.subdomain, ticket_id)
    }

    fn check(&self) -> FreshserviceResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(FreshserviceError::Config("api_key is required".to_string()));
        }
        extract_subdomain(&self.subdomain)?;
        if self.category_id.is_some() && !self.ticketing {
            return Err(FreshserviceError::Config(
                "category_id requires ticketing to be enabled".to_string(),
            ));
        }
        if let Some(base) = &self.api_base_url {
            let url = url::Url::parse(base)?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(FreshserviceError::Config(format!(
                    "api_base_url must be an http(s) URL with a host, got '{base}'"
                )));
            }
        }
        Ok(())
    }
}

impl ConnectorConfig for FreshserviceConfig {
    fn connector_name() -> &'static str {
        "freshservice"
    }

    fn validate(&self) -> ConnectorResult<()> {
        self.check().map_err(ConnectorError::from)
    }

    fn auth(&self) -> AuthConfig {
        AuthConfig::basic(self.api_key.expose_secret(), API_KEY_PASSWORD)
    }

    fn connection(&self) -> &ConnectionSettings {
        &self.connection
    }
}

/// Builder for [`FreshserviceConfig`].
#[derive(Default)]
pub struct FreshserviceConfigBuilder {
    api_key: Option<SecretString>,
    domain: Option<String>,
    category_id: Option<String>,
    ticketing: bool,
    api_base_url: Option<String>,
    connection: ConnectionSettings,
}

impl FreshserviceConfigBuilder {
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Accepts `acme`, `acme.freshservice.com` or `https://acme.freshservice.com/`.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub fn ticketing(mut self, enabled: bool) -> Self {
        self.ticketing = enabled;
        self
    }

    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `FreshserviceError::Config` when the key or domain is missing
    /// or invalid.
    pub fn build(self) -> FreshserviceResult<FreshserviceConfig> {
        let api_key = self
            .api_key
            .ok_or_else(|| FreshserviceError::Config("api_key is required".to_string()))?;
        let domain = self
            .domain
            .ok_or_else(|| FreshserviceError::Config("domain is required".to_string()))?;

        let config = FreshserviceConfig {
            api_key,
            subdomain: extract_subdomain(&domain)?,
            category_id: self.category_id,
            ticketing: self.ticketing,
            api_base_url: self.api_base_url,
            connection: self.connection,
        };
        config.check()?;
        Ok(config)
    }
}

/// Agent-portal URL of a ticket on the account `subdomain`.
#[must_use]
pub fn ticket_url(subdomain: &str, ticket_id: u64) -> String {
    format!("https://{subdomain}.{FRESHSERVICE_HOST}/a/tickets/{ticket_id}")
}

/// Extract the account subdomain from whatever the user typed as domain.
///
/// # Errors
///
/// Returns `FreshserviceError::Config` when no usable subdomain remains.
pub fn extract_subdomain(domain: &str) -> FreshserviceResult<String> {
    let trimmed = domain.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    let subdomain = without_scheme.split('.').next().unwrap_or_default();

    let valid = !subdomain.is_empty()
        && subdomain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(FreshserviceError::Config(format!(
            "invalid domain '{domain}': expected an account subdomain such as 'acme'"
        )));
    }

    Ok(subdomain.to_ascii_lowercase())
}

fn parse_flag(name: &str, value: &str) -> FreshserviceResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(FreshserviceError::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
