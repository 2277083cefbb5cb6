//! # Connector Framework
//!
//! Core abstractions for synchronizing identities and access from external
//! systems into xavyo.
//!
//! A connector publishes resource types (users, groups, roles), lists their
//! resources page by page, describes the entitlements each resource offers
//! and the grants that bind principals to them, and can push grant/revoke
//! decisions back to the target system.
//!
//! ## Architecture
//!
//! - [`Connector`] - Metadata, credential validation, the syncer list
//! - [`ResourceSyncer`] - List / entitlements / grants for one resource type,
//!   plus optional grant and revoke
//! - [`TicketManager`] - Ticket schemas and ticket creation
//!
//! Sync is pull-based and stateless: every call takes a [`PageToken`] and
//! returns a [`SyncPage`] whose `next_token` is empty once the listing is
//! done. Connectors keep their cursor in a [`Bag`] serialized into the token.
//!
//! ## Crate Organization
//!
//! - [`types`] - Resource types, resources and trait data
//! - [`entitlement`] - Entitlements and grants
//! - [`annotations`] - Typed metadata (rate limits, grant markers)
//! - [`pagination`] - Page tokens and the page-state bag
//! - [`ticket`] - Ticket schemas, tickets and validation
//! - [`error`] - Error types with transient/permanent classification
//! - [`traits`] - Connector traits
//! - [`config`] - Configuration types and traits
//!
//! [`Connector`]: traits::Connector
//! [`ResourceSyncer`]: traits::ResourceSyncer
//! [`TicketManager`]: traits::TicketManager
//! [`PageToken`]: pagination::PageToken
//! [`SyncPage`]: pagination::SyncPage
//! [`Bag`]: pagination::Bag

pub mod annotations;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod pagination;
pub mod ticket;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_connector::prelude::*;
/// ```
pub mod prelude {
    // Resource model
    pub use crate::types::{
        GroupTrait, Resource, ResourceId, ResourceTraits, ResourceType, RoleTrait, TraitKind,
        UserEmail, UserStatus, UserTrait,
    };
    pub use crate::entitlement::{Entitlement, EntitlementPurpose, Grant};

    // Annotations
    pub use crate::annotations::{Annotation, Annotations, RateLimitDescription, RateLimitStatus};

    // Pagination
    pub use crate::pagination::{Bag, PageState, PageToken, SyncPage};

    // Tickets
    pub use crate::ticket::{
        validate_ticket, CustomFieldKind, CustomFieldValue, Ticket, TicketCustomField,
        TicketRequest, TicketResult, TicketSchema, TicketStatus,
    };

    // Error handling
    pub use crate::error::{ConnectorError, ConnectorResult};

    // Traits
    pub use crate::traits::{Connector, ConnectorMetadata, ResourceSyncer, TicketManager};

    // Configuration
    pub use crate::config::{AuthConfig, ConnectionSettings, ConnectorConfig};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _rt = ResourceType::new("agent", "Agent").with_trait(TraitKind::User);
        let _id = ResourceId::new("agent", "1");
        let _status = UserStatus::Enabled;
        let _token = PageToken::default();
        let _bag = Bag::new();
        let _auth = AuthConfig::basic("key", "X");
        let _settings = ConnectionSettings::default();
    }
}
