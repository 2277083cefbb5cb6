//! Agent group sync and membership changes.
//!
//! A group's `members` array is the only record of its membership, so
//! grant and revoke read the group, edit the list and `PUT` all of it back.
//! Freshservice offers no version check on that write; two writers racing
//! on the same group can lose one of the updates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use xavyo_connector::annotations::{Annotation, Annotations};
use xavyo_connector::entitlement::{Entitlement, Grant};
use xavyo_connector::error::ConnectorResult;
use xavyo_connector::pagination::{Bag, PageToken, SyncPage};
use xavyo_connector::traits::ResourceSyncer;
use xavyo_connector::types::{Resource, ResourceId, ResourceType};

use crate::client::FreshserviceClient;
use crate::pagination::{advance, current_page};
use crate::principal::ensure_principal;
use crate::resource_types::{self, AGENT, AGENT_GROUP};
use crate::resources::{agent_group_resource, parse_id};

/// Entitlement slug for group membership.
pub const MEMBER: &str = "member";

/// The `member` entitlement of an agent group.
#[must_use]
pub fn member_entitlement(group: &Resource) -> Entitlement {
    Entitlement::assignment(group, MEMBER)
        .with_display_name(format!("{} Group member", group.display_name))
        .with_description(format!(
            "Access to {} group in Freshservice",
            group.display_name
        ))
        .grantable_to(AGENT)
}

#[derive(Debug, Clone)]
pub struct AgentGroupSyncer {
    client: Arc<FreshserviceClient>,
}

impl AgentGroupSyncer {
    pub fn new(client: Arc<FreshserviceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for AgentGroupSyncer {
    fn resource_type(&self) -> ResourceType {
        resource_types::agent_group()
    }

    #[instrument(skip(self, _parent))]
    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        let bag = Bag::resume(&token.token, AGENT_GROUP)?;
        let page = self
            .client
            .list_agent_groups(current_page(&bag, token.size)?)
            .await?;

        let resources: Vec<Resource> = page.items.iter().map(agent_group_resource).collect();
        debug!(count = resources.len(), "Mapped agent groups");

        let next = advance(bag, page.next_page)?;
        Ok(SyncPage::new(
            resources,
            next,
            Annotations::new().with_rate_limit(page.rate_limit),
        ))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>> {
        Ok(SyncPage::new(
            vec![member_entitlement(resource)],
            String::new(),
            Annotations::new(),
        ))
    }

    /// One grant per member id; the whole list comes in a single call.
    #[instrument(skip(self, resource, _token), fields(group = %resource.id))]
    async fn grants(
        &self,
        resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        let group_id = parse_id(&resource.id)?;
        let response = self.client.get_agent_group(group_id).await?;

        let entitlement = member_entitlement(resource);
        let grants: Vec<Grant> = response
            .data
            .members
            .iter()
            .map(|member| Grant::new(&entitlement, ResourceId::new(AGENT, member.to_string())))
            .collect();
        debug!(count = grants.len(), "Listed agent group members");

        Ok(SyncPage::new(
            grants,
            String::new(),
            Annotations::new().with_rate_limit(response.rate_limit),
        ))
    }

    #[instrument(skip(self, principal, entitlement), fields(principal = %principal.id, entitlement = %entitlement.id))]
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> ConnectorResult<Annotations> {
        ensure_principal(&principal.id, AGENT, "granted group membership")?;
        let group_id = parse_id(&entitlement.resource.id)?;
        let agent_id = parse_id(&principal.id)?;

        let group = self.client.get_agent_group(group_id).await?;
        let mut members = group.data.members;
        if members.contains(&agent_id) {
            debug!(group_id, agent_id, "Agent already in group");
            let mut annotations = Annotations::new().with_rate_limit(group.rate_limit);
            annotations.push(Annotation::GrantAlreadyExists);
            return Ok(annotations);
        }

        members.push(agent_id);
        let updated = self
            .client
            .update_agent_group_members(group_id, members)
            .await?;
        info!(group_id, agent_id, "Added agent to group");
        Ok(Annotations::new().with_rate_limit(updated.rate_limit))
    }

    #[instrument(skip(self, grant), fields(grant = %grant.id))]
    async fn revoke(&self, grant: &Grant) -> ConnectorResult<Annotations> {
        ensure_principal(&grant.principal, AGENT, "revoked group membership")?;
        let group_id = parse_id(&grant.entitlement.resource.id)?;
        let agent_id = parse_id(&grant.principal)?;

        let group = self.client.get_agent_group(group_id).await?;
        let mut members = group.data.members;
        if !members.contains(&agent_id) {
            debug!(group_id, agent_id, "Agent not in group");
            let mut annotations = Annotations::new().with_rate_limit(group.rate_limit);
            annotations.push(Annotation::GrantAlreadyRevoked);
            return Ok(annotations);
        }

        members.retain(|id| *id != agent_id);
        let updated = self
            .client
            .update_agent_group_members(group_id, members)
            .await?;
        info!(group_id, agent_id, "Removed agent from group");
        Ok(Annotations::new().with_rate_limit(updated.rate_limit))
    }
}
