//! Freshservice connector entry point.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use xavyo_connector::annotations::Annotations;
use xavyo_connector::config::ConnectorConfig;
use xavyo_connector::error::ConnectorResult;
use xavyo_connector::traits::{Connector, ConnectorMetadata, ResourceSyncer, TicketManager};

use crate::agent_groups::AgentGroupSyncer;
use crate::agents::AgentSyncer;
use crate::client::FreshserviceClient;
use crate::config::FreshserviceConfig;
use crate::pagination::PageOptions;
use crate::requester_groups::RequesterGroupSyncer;
use crate::requesters::RequesterSyncer;
use crate::roles::RoleSyncer;
use crate::ticketing::FreshserviceTicketing;

/// Freshservice connector.
#[derive(Debug)]
pub struct FreshserviceConnector {
    config: FreshserviceConfig,
    client: Arc<FreshserviceClient>,
    ticketing: Option<FreshserviceTicketing>,
}

impl FreshserviceConnector {
    /// Creates a new connector.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: FreshserviceConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let client = Arc::new(FreshserviceClient::new(&config)?);
        let ticketing = config
            .ticketing
            .then(|| FreshserviceTicketing::new(Arc::clone(&client)));

        info!(
            subdomain = %config.subdomain(),
            ticketing = config.ticketing,
            "Freshservice connector created"
        );

        Ok(Self {
            config,
            client,
            ticketing,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FreshserviceConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &FreshserviceClient {
        &self.client
    }
}

#[async_trait]
impl Connector for FreshserviceConnector {
    fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Freshservice Connector".to_string(),
            description:
                "Connector syncing users, groups, roles and requester groups from Freshservice."
                    .to_string(),
        }
    }

    /// Lists a single agent to prove the key and subdomain work.
    #[instrument(skip(self), fields(subdomain = %self.config.subdomain()))]
    async fn validate(&self) -> ConnectorResult<Annotations> {
        let page = self.client.list_agents(PageOptions::new(1, 1)).await?;
        info!("Freshservice credentials validated");
        Ok(Annotations::new().with_rate_limit(page.rate_limit))
    }

    fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        vec![
            Box::new(AgentSyncer::new(Arc::clone(&self.client))),
            Box::new(RequesterSyncer::new(Arc::clone(&self.client))),
            Box::new(AgentGroupSyncer::new(Arc::clone(&self.client))),
            Box::new(RoleSyncer::new(Arc::clone(&self.client))),
            Box::new(RequesterGroupSyncer::new(Arc::clone(&self.client))),
        ]
    }

    fn ticketing(&self) -> Option<&dyn TicketManager> {
        self.ticketing
            .as_ref()
            .map(|t| t as &dyn TicketManager)
    }
}
