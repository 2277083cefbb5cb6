//! Resource types published by the Freshservice connector.

use xavyo_connector::annotations::Annotation;
use xavyo_connector::types::{ResourceType, TraitKind};

pub const AGENT: &str = "agent";
pub const REQUESTER: &str = "requester";
pub const AGENT_GROUP: &str = "agent_group";
pub const ROLE: &str = "role";
pub const REQUESTER_GROUP: &str = "requester_group";

#[must_use]
pub fn agent() -> ResourceType {
    ResourceType::new(AGENT, "Agent")
        .with_description("Agent users of Freshservice")
        .with_trait(TraitKind::User)
}

/// Requesters are listed but carry no entitlements or grants of their own.
#[must_use]
pub fn requester() -> ResourceType {
    ResourceType::new(REQUESTER, "Requester")
        .with_description("Requester users of Freshservice")
        .with_trait(TraitKind::User)
        .with_annotation(Annotation::SkipEntitlementsAndGrants)
}

#[must_use]
pub fn agent_group() -> ResourceType {
    ResourceType::new(AGENT_GROUP, "Agent Group")
        .with_description("Agent groups of Freshservice")
        .with_trait(TraitKind::Group)
}

#[must_use]
pub fn role() -> ResourceType {
    ResourceType::new(ROLE, "Role")
        .with_description("Agent roles of Freshservice")
        .with_trait(TraitKind::Role)
}

#[must_use]
pub fn requester_group() -> ResourceType {
    ResourceType::new(REQUESTER_GROUP, "Requester Group")
        .with_description("Requester groups of Freshservice")
        .with_trait(TraitKind::Group)
}
