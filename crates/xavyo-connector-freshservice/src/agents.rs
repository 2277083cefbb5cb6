//! Agent sync.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use xavyo_connector::annotations::Annotations;
use xavyo_connector::entitlement::{Entitlement, Grant};
use xavyo_connector::error::ConnectorResult;
use xavyo_connector::pagination::{Bag, PageToken, SyncPage};
use xavyo_connector::traits::ResourceSyncer;
use xavyo_connector::types::{Resource, ResourceId, ResourceType};

use crate::client::FreshserviceClient;
use crate::pagination::{advance, current_page};
use crate::resource_types::{self, AGENT};
use crate::resources::agent_resource;

/// Lists agents as users. Agents hold entitlements but offer none.
#[derive(Debug, Clone)]
pub struct AgentSyncer {
    client: Arc<FreshserviceClient>,
}

impl AgentSyncer {
    pub fn new(client: Arc<FreshserviceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for AgentSyncer {
    fn resource_type(&self) -> ResourceType {
        resource_types::agent()
    }

    #[instrument(skip(self, _parent))]
    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        let bag = Bag::resume(&token.token, AGENT)?;
        let page = self
            .client
            .list_agents(current_page(&bag, token.size)?)
            .await?;

        let resources: Vec<Resource> = page.items.iter().map(agent_resource).collect();
        debug!(count = resources.len(), "Mapped agents");

        let next = advance(bag, page.next_page)?;
        Ok(SyncPage::new(
            resources,
            next,
            Annotations::new().with_rate_limit(page.rate_limit),
        ))
    }

    async fn entitlements(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>> {
        Ok(SyncPage::empty())
    }

    async fn grants(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        Ok(SyncPage::empty())
    }
}
