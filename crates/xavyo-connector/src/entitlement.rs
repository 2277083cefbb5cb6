//! Entitlements and grants
//!
//! An entitlement is a grantable capability on a resource ("member of group
//! X"); a grant binds one principal to one entitlement.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::types::{Resource, ResourceId};

/// How the entitlement is consumed by the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementPurpose {
    /// Membership style, e.g. group member or assigned role.
    #[default]
    Assignment,
    /// A permission on the resource.
    Permission,
}

/// A grantable capability on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// `resourceType:resourceId:slug`.
    pub id: String,
    pub resource: Resource,
    pub slug: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub purpose: EntitlementPurpose,
    /// Resource type ids of principals that may hold this entitlement.
    #[serde(default)]
    pub grantable_to: Vec<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Entitlement {
    /// Build an assignment entitlement on `resource`.
    pub fn assignment(resource: &Resource, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: entitlement_id(&resource.id, &slug),
            display_name: format!("{} {}", resource.display_name, slug),
            resource: resource.clone(),
            slug,
            description: None,
            purpose: EntitlementPurpose::Assignment,
            grantable_to: Vec::new(),
            annotations: Annotations::default(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn grantable_to(mut self, resource_type_id: impl Into<String>) -> Self {
        self.grantable_to.push(resource_type_id.into());
        self
    }
}

/// A principal holding an entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// `entitlementId:principalType:principalId`.
    pub id: String,
    pub entitlement: Entitlement,
    pub principal: ResourceId,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Grant {
    pub fn new(entitlement: &Entitlement, principal: ResourceId) -> Self {
        Self {
            id: grant_id(&entitlement.id, &principal),
            entitlement: entitlement.clone(),
            principal,
            annotations: Annotations::default(),
        }
    }
}

/// Compose an entitlement id.
pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}

/// Compose a grant id.
pub fn grant_id(entitlement_id: &str, principal: &ResourceId) -> String {
    format!(
        "{}:{}:{}",
        entitlement_id, principal.resource_type, principal.resource
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_entitlement_id_format() {
        let group = Resource::group(ResourceId::new("agent_group", "7"), "Ops", Map::new());
        let ent = Entitlement::assignment(&group, "member").grantable_to("agent");

        assert_eq!(ent.id, "agent_group:7:member");
        assert_eq!(ent.display_name, "Ops member");
        assert_eq!(ent.grantable_to, vec!["agent".to_string()]);
        assert_eq!(ent.purpose, EntitlementPurpose::Assignment);
    }

    #[test]
    fn test_grant_id_format() {
        let role = Resource::role(ResourceId::new("role", "3"), "Admin", Map::new());
        let ent = Entitlement::assignment(&role, "assigned");
        let grant = Grant::new(&ent, ResourceId::new("agent", "42"));

        assert_eq!(grant.id, "role:3:assigned:agent:42");
        assert_eq!(grant.principal.resource, "42");
    }
}
