//! Requester group sync and membership changes.
//!
//! Requester groups expose their members on a paged sub-resource and take
//! single-member `POST`/`DELETE` calls instead of a full-list replace.
//! Rule-based groups reject manual changes; the API error is passed on.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use xavyo_connector::annotations::{Annotation, Annotations, RateLimitDescription};
use xavyo_connector::entitlement::{Entitlement, Grant};
use xavyo_connector::error::ConnectorResult;
use xavyo_connector::pagination::{Bag, PageToken, SyncPage};
use xavyo_connector::traits::ResourceSyncer;
use xavyo_connector::types::{Resource, ResourceId, ResourceType};

use crate::agent_groups::MEMBER;
use crate::client::FreshserviceClient;
use crate::error::FreshserviceResult;
use crate::pagination::{advance, current_page, PageOptions};
use crate::principal::ensure_principal;
use crate::resource_types::{self, REQUESTER, REQUESTER_GROUP};
use crate::resources::{parse_id, requester_group_resource};

/// The `member` entitlement of a requester group.
#[must_use]
pub fn member_entitlement(group: &Resource) -> Entitlement {
    Entitlement::assignment(group, MEMBER)
        .with_display_name(format!("{} Requester Group member", group.display_name))
        .with_description(format!(
            "Access to {} requester group in Freshservice",
            group.display_name
        ))
        .grantable_to(REQUESTER)
}

#[derive(Debug, Clone)]
pub struct RequesterGroupSyncer {
    client: Arc<FreshserviceClient>,
}

impl RequesterGroupSyncer {
    pub fn new(client: Arc<FreshserviceClient>) -> Self {
        Self { client }
    }

    /// Walk the member pages looking for `requester_id`.
    ///
    /// Every error aborts the scan, a 408 included. A `Link` that does not
    /// move forward ends it.
    async fn is_member(
        &self,
        group_id: u64,
        requester_id: u64,
    ) -> FreshserviceResult<(bool, Option<RateLimitDescription>)> {
        let mut options = PageOptions::default();
        loop {
            let page = self
                .client
                .requester_group_members_strict(group_id, options)
                .await?;
            if page.items.iter().any(|m| m.id == requester_id) {
                return Ok((true, page.rate_limit));
            }
            match page.next_page {
                Some(next) if next > options.page => {
                    options = PageOptions::new(next, options.per_page);
                }
                Some(next) => {
                    warn!(group_id, page = options.page, next, "Member pagination did not advance");
                    return Ok((false, page.rate_limit));
                }
                None => return Ok((false, page.rate_limit)),
            }
        }
    }
}

#[async_trait]
impl ResourceSyncer for RequesterGroupSyncer {
    fn resource_type(&self) -> ResourceType {
        resource_types::requester_group()
    }

    #[instrument(skip(self, _parent))]
    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>> {
        let bag = Bag::resume(&token.token, REQUESTER_GROUP)?;
        let page = self
            .client
            .list_requester_groups(current_page(&bag, token.size)?)
            .await?;

        let resources: Vec<Resource> = page
            .items
            .iter()
            .map(requester_group_resource)
            .collect();
        debug!(count = resources.len(), "Mapped requester groups");

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

    /// One page of members per call.
    #[instrument(skip(self, resource, token), fields(group = %resource.id, token = %token.token))]
    async fn grants(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Grant>> {
        let group_id = parse_id(&resource.id)?;
        let bag = Bag::resume(&token.token, REQUESTER)?;
        let page = self
            .client
            .list_requester_group_members(group_id, current_page(&bag, token.size)?)
            .await?;

        let entitlement = member_entitlement(resource);
        let grants: Vec<Grant> = page
            .items
            .iter()
            .map(|member| {
                Grant::new(&entitlement, ResourceId::new(REQUESTER, member.id.to_string()))
            })
            .collect();
        debug!(count = grants.len(), "Listed requester group members");

        let next = advance(bag, page.next_page)?;
        Ok(SyncPage::new(
            grants,
            next,
            Annotations::new().with_rate_limit(page.rate_limit),
        ))
    }

    #[instrument(skip(self, principal, entitlement), fields(principal = %principal.id, entitlement = %entitlement.id))]
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> ConnectorResult<Annotations> {
        ensure_principal(&principal.id, REQUESTER, "granted requester group membership")?;
        let group_id = parse_id(&entitlement.resource.id)?;
        let requester_id = parse_id(&principal.id)?;

        let (present, rate_limit) = self.is_member(group_id, requester_id).await?;
        if present {
            debug!(group_id, requester_id, "Requester already in group");
            let mut annotations = Annotations::new().with_rate_limit(rate_limit);
            annotations.push(Annotation::GrantAlreadyExists);
            return Ok(annotations);
        }

        let response = self
            .client
            .add_requester_to_group(group_id, requester_id)
            .await?;
        info!(group_id, requester_id, "Added requester to group");
        Ok(Annotations::new().with_rate_limit(response.rate_limit))
    }

    #[instrument(skip(self, grant), fields(grant = %grant.id))]
    async fn revoke(&self, grant: &Grant) -> ConnectorResult<Annotations> {
        ensure_principal(&grant.principal, REQUESTER, "revoked requester group membership")?;
        let group_id = parse_id(&grant.entitlement.resource.id)?;
        let requester_id = parse_id(&grant.principal)?;

        let (present, rate_limit) = self.is_member(group_id, requester_id).await?;
        if !present {
            debug!(group_id, requester_id, "Requester not in group");
            let mut annotations = Annotations::new().with_rate_limit(rate_limit);
            annotations.push(Annotation::GrantAlreadyRevoked);
            return Ok(annotations);
        }

        let response = self
            .client
            .remove_requester_from_group(group_id, requester_id)
            .await?;
        info!(group_id, requester_id, "Removed requester from group");
        Ok(Annotations::new().with_rate_limit(response.rate_limit))
    }
}
