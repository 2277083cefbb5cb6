//! Role sync and role assignment.
//!
//! Role holders are not listed by Freshservice; they are found by scanning
//! every agent (and every agent group on accounts that still expose
//! `role_ids`) for the role id. The scan runs one vendor page per call,
//! tracked by [`RoleGrantCursor`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use xavyo_connector::annotations::{Annotation, Annotations};
use xavyo_connector::entitlement::{Entitlement, Grant};
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::pagination::{Bag, PageToken, SyncPage};
use xavyo_connector::traits::ResourceSyncer;
use xavyo_connector::types::{Resource, ResourceId, ResourceType};

use crate::client::FreshserviceClient;
use crate::models::AgentRole;
use crate::pagination::{advance, current_page, PageOptions};
use crate::principal::ensure_principal;
use crate::resource_types::{self, AGENT, AGENT_GROUP, ROLE};
use crate::resources::{parse_id, role_resource};

/// Entitlement slug for a role assignment.
pub const ASSIGNED: &str = "assigned";

/// The `assigned` entitlement of a role.
///
/// Only agents can be granted it. Grant listing also reports agent groups
/// holding the role through `role_ids`; those grants are read-only and
/// [`RoleSyncer::grant`] / [`RoleSyncer::revoke`] reject them.
#[must_use]
pub fn assigned_entitlement(role: &Resource) -> Entitlement {
    Entitlement::assignment(role, ASSIGNED)
        .with_display_name(format!("{} role assigned", role.display_name))
        .with_description(format!("Assigned to {} role", role.display_name))
        .grantable_to(AGENT)
}

/// Position of a role-grant scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoleGrantCursor {
    /// Scanning agent pages.
    AwaitingUsers { page: u32 },
    /// Scanning agent group pages.
    AwaitingGroups { page: u32 },
    Done,
}

impl Default for RoleGrantCursor {
    fn default() -> Self {
        RoleGrantCursor::AwaitingUsers { page: 1 }
    }
}

impl RoleGrantCursor {
    /// Decode a grant token; the empty token starts a new scan.
    pub fn from_token(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(token).map_err(|e| ConnectorError::InvalidPageToken {
            message: format!("bad role grant cursor: {e}"),
        })
    }

    /// Encode as a grant token; `Done` is the empty token.
    pub fn to_token(self) -> ConnectorResult<String> {
        match self {
            RoleGrantCursor::Done => Ok(String::new()),
            cursor => Ok(serde_json::to_string(&cursor)?),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleSyncer {
    client: Arc<FreshserviceClient>,
}

impl RoleSyncer {
    pub fn new(client: Arc<FreshserviceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> ResourceType {
        resource_types::role()
    }

    #[instrument(skip(self, _parent))]
    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        let bag = Bag::resume(&token.token, ROLE)?;
        let page = self
            .client
            .list_roles(current_page(&bag, token.size)?)
            .await?;

        let resources: Vec<Resource> = page.items.iter().map(role_resource).collect();
        debug!(count = resources.len(), "Mapped roles");

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
            vec![assigned_entitlement(resource)],
            String::new(),
            Annotations::new(),
        ))
    }

    #[instrument(skip(self, resource, token), fields(role = %resource.id, token = %token.token))]
    async fn grants(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        let role_id = parse_id(&resource.id)?;
        let entitlement = assigned_entitlement(resource);

        let (grants, next, rate_limit) = match RoleGrantCursor::from_token(&token.token)? {
            RoleGrantCursor::AwaitingUsers { page } => {
                let agents = self
                    .client
                    .list_agents(PageOptions::new(page, token.size))
                    .await?;
                let grants: Vec<Grant> = agents
                    .items
                    .iter()
                    .filter(|agent| agent.has_role(role_id))
                    .map(|agent| Grant::new(&entitlement, ResourceId::new(AGENT, agent.id.to_string())))
                    .collect();
                let next = match agents.next_page {
                    Some(page) => RoleGrantCursor::AwaitingUsers { page },
                    None => RoleGrantCursor::AwaitingGroups { page: 1 },
                };
                (grants, next, agents.rate_limit)
            }
            RoleGrantCursor::AwaitingGroups { page } => {
                let groups = self
                    .client
                    .list_agent_groups(PageOptions::new(page, token.size))
                    .await?;
                let grants: Vec<Grant> = groups
                    .items
                    .iter()
                    .filter(|group| group.has_role(role_id))
                    .map(|group| {
                        Grant::new(&entitlement, ResourceId::new(AGENT_GROUP, group.id.to_string()))
                    })
                    .collect();
                let next = match groups.next_page {
                    Some(page) => RoleGrantCursor::AwaitingGroups { page },
                    None => RoleGrantCursor::Done,
                };
                (grants, next, groups.rate_limit)
            }
            RoleGrantCursor::Done => return Ok(SyncPage::empty()),
        };

        debug!(count = grants.len(), next = ?next, "Scanned for role holders");
        Ok(SyncPage::new(
            grants,
            next.to_token()?,
            Annotations::new().with_rate_limit(rate_limit),
        ))
    }

    #[instrument(skip(self, principal, entitlement), fields(principal = %principal.id, entitlement = %entitlement.id))]
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> ConnectorResult<Annotations> {
        ensure_principal(&principal.id, AGENT, "granted roles")?;
        let role_id = parse_id(&entitlement.resource.id)?;
        let agent_id = parse_id(&principal.id)?;

        let agent = self.client.get_agent(agent_id).await?;
        if agent.data.has_role(role_id) {
            debug!(agent_id, role_id, "Role already assigned");
            let mut annotations = Annotations::new().with_rate_limit(agent.rate_limit);
            annotations.push(Annotation::GrantAlreadyExists);
            return Ok(annotations);
        }

        let mut roles = agent.data.roles;
        roles.push(AgentRole::new(role_id));
        let updated = self.client.update_agent_roles(agent_id, roles).await?;
        info!(agent_id, role_id, "Assigned role");
        Ok(Annotations::new().with_rate_limit(updated.rate_limit))
    }

    #[instrument(skip(self, grant), fields(grant = %grant.id))]
    async fn revoke(&self, grant: &Grant) -> ConnectorResult<Annotations> {
        ensure_principal(&grant.principal, AGENT, "revoked roles")?;
        let role_id = parse_id(&grant.entitlement.resource.id)?;
        let agent_id = parse_id(&grant.principal)?;

        let agent = self.client.get_agent(agent_id).await?;
        if !agent.data.has_role(role_id) {
            debug!(agent_id, role_id, "Role not assigned");
            let mut annotations = Annotations::new().with_rate_limit(agent.rate_limit);
            annotations.push(Annotation::GrantAlreadyRevoked);
            return Ok(annotations);
        }

        let mut roles = agent.data.roles;
        roles.retain(|r| r.role_id != role_id);
        let updated = self.client.update_agent_roles(agent_id, roles).await?;
        info!(agent_id, role_id, "Unassigned role");
        Ok(Annotations::new().with_rate_limit(updated.rate_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_cursor_tokens() {
        assert_eq!(
            RoleGrantCursor::from_token("").unwrap(),
            RoleGrantCursor::AwaitingUsers { page: 1 }
        );
        assert_eq!(RoleGrantCursor::Done.to_token().unwrap(), "");

        let token = RoleGrantCursor::AwaitingGroups { page: 3 }.to_token().unwrap();
        assert_eq!(token, r#"{"phase":"awaiting_groups","page":3}"#);
        assert_eq!(
            RoleGrantCursor::from_token(&token).unwrap(),
            RoleGrantCursor::AwaitingGroups { page: 3 }
        );
    }

    #[test]
    fn test_bad_cursor() {
        let err = RoleGrantCursor::from_token("page-2").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PAGE_TOKEN");
    }

    #[test]
    fn test_assigned_entitlement() {
        let role = Resource::role(ResourceId::new(ROLE, "3"), "Admin", Map::new());
        let entitlement = assigned_entitlement(&role);
        assert_eq!(entitlement.id, "role:3:assigned");
        assert_eq!(entitlement.display_name, "Admin role assigned");
        assert_eq!(entitlement.description.as_deref(), Some("Assigned to Admin role"));
        assert_eq!(entitlement.grantable_to, vec![AGENT.to_string()]);
    }
}
