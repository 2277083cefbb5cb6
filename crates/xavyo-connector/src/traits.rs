//! Connector Framework traits
//!
//! A connector exposes one [`ResourceSyncer`] per resource type it
//! synchronizes and, optionally, a [`TicketManager`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::entitlement::{Entitlement, Grant};
use crate::error::{ConnectorError, ConnectorResult};
use crate::pagination::{PageToken, SyncPage};
use crate::ticket::{Ticket, TicketRequest, TicketResult, TicketSchema};
use crate::types::{Resource, ResourceId, ResourceType};

/// Human-facing description of a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Display name and description.
    fn metadata(&self) -> ConnectorMetadata;

    /// Check that the configured credentials work against the target.
    ///
    /// Returns the annotations of the probe request (rate-limit state).
    async fn validate(&self) -> ConnectorResult<Annotations>;

    /// One syncer per resource type, in sync order.
    fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>>;

    /// Ticketing support, when enabled.
    fn ticketing(&self) -> Option<&dyn TicketManager> {
        None
    }
}

/// Synchronizes one resource type.
///
/// Every listing call returns one page and an opaque token; the caller
/// passes the token back until it comes back empty.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The resource type this syncer produces.
    fn resource_type(&self) -> ResourceType;

    /// List one page of resources.
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Resource>>;

    /// List one page of entitlements offered by `resource`.
    async fn entitlements(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<Entitlement>>;

    /// List one page of grants on `resource`.
    async fn grants(&self, resource: &Resource, token: &PageToken)
        -> ConnectorResult<SyncPage<Grant>>;

    /// Give `principal` the entitlement.
    async fn grant(
        &self,
        _principal: &Resource,
        _entitlement: &Entitlement,
    ) -> ConnectorResult<Annotations> {
        Err(ConnectorError::not_supported(
            "grant",
            self.resource_type().id,
        ))
    }

    /// Take the entitlement away from the grant's principal.
    async fn revoke(&self, _grant: &Grant) -> ConnectorResult<Annotations> {
        Err(ConnectorError::not_supported(
            "revoke",
            self.resource_type().id,
        ))
    }
}

/// Ticket creation and lookup.
#[async_trait]
pub trait TicketManager: Send + Sync {
    /// List one page of ticket schemas.
    async fn list_ticket_schemas(&self, token: &PageToken)
        -> ConnectorResult<SyncPage<TicketSchema>>;

    async fn get_ticket_schema(&self, id: &str) -> ConnectorResult<(TicketSchema, Annotations)>;

    /// Create a ticket following `schema`.
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        schema: &TicketSchema,
    ) -> ConnectorResult<(Ticket, Annotations)>;

    async fn get_ticket(&self, id: &str) -> ConnectorResult<(Ticket, Annotations)>;

    /// Create several tickets one after the other.
    ///
    /// A failing item is reported in its own result and does not stop the
    /// batch.
    async fn bulk_create_tickets(
        &self,
        requests: &[TicketRequest],
    ) -> ConnectorResult<Vec<TicketResult>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = match self.create_ticket(&request.ticket, &request.schema).await {
                Ok((ticket, annos)) => TicketResult::ok(ticket, annos),
                Err(e) => TicketResult::failed(&e),
            };
            results.push(result);
        }
        Ok(results)
    }

    /// Fetch several tickets one after the other.
    async fn bulk_get_tickets(&self, ids: &[String]) -> ConnectorResult<Vec<TicketResult>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = match self.get_ticket(id).await {
                Ok((ticket, annos)) => TicketResult::ok(ticket, annos),
                Err(e) => TicketResult::failed(&e),
            };
            results.push(result);
        }
        Ok(results)
    }
}
