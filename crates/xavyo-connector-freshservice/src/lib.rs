//! Freshservice Connector for xavyo
//!
//! This crate implements the xavyo-connector traits for Freshservice,
//! synchronizing agents, requesters, agent groups, roles and requester
//! groups through the Freshservice REST API v2 and writing group and role
//! membership back.
//!
//! # Features
//!
//! - Page-at-a-time sync driven by opaque page tokens
//! - Rate-limit headers reported as annotations, never retried
//! - Group membership and role assignment grants and revokes
//! - Optional ticketing through the service catalog
//!
//! # Example
//!
//! ```no_run
//! use xavyo_connector::pagination::PageToken;
//! use xavyo_connector::traits::Connector;
//! use xavyo_connector_freshservice::{FreshserviceConfig, FreshserviceConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FreshserviceConfig::builder()
//!     .api_key("your-api-key")
//!     .domain("acme.freshservice.com")
//!     .build()?;
//!
//! let connector = FreshserviceConnector::new(config)?;
//! connector.validate().await?;
//!
//! for syncer in connector.resource_syncers() {
//!     let mut token = PageToken::default();
//!     loop {
//!         let page = syncer.list(None, &token).await?;
//!         if page.is_last() {
//!             break;
//!         }
//!         token = PageToken::new(page.next_token);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod agent_groups;
mod agents;
mod client;
mod config;
mod connector;
mod error;
mod models;
mod pagination;
mod principal;
mod rate_limit;
mod requester_groups;
mod requesters;
pub mod resource_types;
mod resources;
mod roles;
mod ticketing;

// Re-exports
pub use agent_groups::AgentGroupSyncer;
pub use agents::AgentSyncer;
pub use client::{ApiResponse, FreshserviceClient, Page};
pub use config::{extract_subdomain, FreshserviceConfig, FreshserviceConfigBuilder};
pub use connector::FreshserviceConnector;
pub use error::{FreshserviceError, FreshserviceResult};
pub use models::{
    Agent, AgentContact, AgentGroup, AgentRole, CustomField, Requester, RequesterGroup,
    RequesterGroupMember, Role, ServiceItem, TicketDetails,
};
pub use pagination::{clamp_page_size, PageOptions, MAX_PAGE_SIZE};
pub use rate_limit::extract_rate_limit;
pub use requester_groups::RequesterGroupSyncer;
pub use requesters::RequesterSyncer;
pub use resources::{
    agent_group_resource, agent_resource, requester_group_resource, requester_resource,
    role_resource,
};
pub use roles::{assigned_entitlement, RoleGrantCursor, RoleSyncer};
pub use ticketing::{custom_field, service_item_schema, FreshserviceTicketing};
