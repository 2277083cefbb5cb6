//! Resource model
//!
//! Resource types, resources and the user/group/role trait data a connector
//! attaches to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::annotations::{Annotation, Annotations};

/// Capability a resource type advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitKind {
    /// Principals that can receive grants.
    User,
    /// Collections of principals.
    Group,
    /// Permission bundles.
    Role,
}

impl TraitKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitKind::User => "user",
            TraitKind::Group => "group",
            TraitKind::Role => "role",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TraitKind {
    type Err = ParseTraitKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TraitKind::User),
            "group" => Ok(TraitKind::Group),
            "role" => Ok(TraitKind::Role),
            _ => Err(ParseTraitKindError(s.to_string())),
        }
    }
}

/// Error parsing a trait kind from string.
#[derive(Debug, Clone)]
pub struct ParseTraitKindError(String);

impl fmt::Display for ParseTraitKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid trait kind '{}', expected one of: user, group, role",
            self.0
        )
    }
}

impl std::error::Error for ParseTraitKindError {}

/// A kind of object the connector synchronizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Stable identifier, e.g. `agent`.
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub traits: Vec<TraitKind>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl ResourceType {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: None,
            traits: Vec::new(),
            annotations: Annotations::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_trait(mut self, kind: TraitKind) -> Self {
        if !self.traits.contains(&kind) {
            self.traits.push(kind);
        }
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Whether this type advertises the given trait.
    #[must_use]
    pub fn has_trait(&self, kind: TraitKind) -> bool {
        self.traits.contains(&kind)
    }
}

/// Identity of a resource: its type plus the target-side id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status of a user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Enabled,
    #[default]
    Disabled,
}

impl UserStatus {
    /// `Enabled` when `active`, `Disabled` otherwise.
    #[must_use]
    pub fn from_active(active: bool) -> Self {
        if active {
            UserStatus::Enabled
        } else {
            UserStatus::Disabled
        }
    }
}

/// An email address attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// User trait data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserTrait {
    #[serde(default)]
    pub profile: Map<String, Value>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default)]
    pub emails: Vec<UserEmail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserTrait {
    pub fn new(profile: Map<String, Value>, status: UserStatus) -> Self {
        Self {
            profile,
            status,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, address: impl Into<String>, is_primary: bool) -> Self {
        self.emails.push(UserEmail {
            address: address.into(),
            is_primary,
        });
        self
    }

    #[must_use]
    pub fn with_last_login(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_login = at;
        self
    }

    /// Look up a string profile value.
    #[must_use]
    pub fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }
}

/// Group trait data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupTrait {
    #[serde(default)]
    pub profile: Map<String, Value>,
}

/// Role trait data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleTrait {
    #[serde(default)]
    pub profile: Map<String, Value>,
}

/// Trait data carried by a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceTraits {
    User(UserTrait),
    Group(GroupTrait),
    Role(RoleTrait),
}

/// A synchronized object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<ResourceTraits>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Resource {
    pub fn new(id: ResourceId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            parent: None,
            traits: None,
            annotations: Annotations::default(),
        }
    }

    /// Build a user resource.
    pub fn user(id: ResourceId, display_name: impl Into<String>, user: UserTrait) -> Self {
        Self::new(id, display_name).with_traits(ResourceTraits::User(user))
    }

    /// Build a group resource.
    pub fn group(id: ResourceId, display_name: impl Into<String>, profile: Map<String, Value>) -> Self {
        Self::new(id, display_name).with_traits(ResourceTraits::Group(GroupTrait { profile }))
    }

    /// Build a role resource.
    pub fn role(id: ResourceId, display_name: impl Into<String>, profile: Map<String, Value>) -> Self {
        Self::new(id, display_name).with_traits(ResourceTraits::Role(RoleTrait { profile }))
    }

    #[must_use]
    pub fn with_traits(mut self, traits: ResourceTraits) -> Self {
        self.traits = Some(traits);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: ResourceId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// User trait data, if this is a user.
    #[must_use]
    pub fn user_trait(&self) -> Option<&UserTrait> {
        match &self.traits {
            Some(ResourceTraits::User(user)) => Some(user),
            _ => None,
        }
    }

    /// Group trait data, if this is a group.
    #[must_use]
    pub fn group_trait(&self) -> Option<&GroupTrait> {
        match &self.traits {
            Some(ResourceTraits::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Role trait data, if this is a role.
    #[must_use]
    pub fn role_trait(&self) -> Option<&RoleTrait> {
        match &self.traits {
            Some(ResourceTraits::Role(role)) => Some(role),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trait_kind_roundtrip() {
        for kind in [TraitKind::User, TraitKind::Group, TraitKind::Role] {
            let parsed: TraitKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("printer".parse::<TraitKind>().is_err());
    }

    #[test]
    fn test_resource_type_builder() {
        let rt = ResourceType::new("agent", "Agent")
            .with_trait(TraitKind::User)
            .with_trait(TraitKind::User)
            .with_annotation(Annotation::SkipEntitlementsAndGrants);

        assert_eq!(rt.traits, vec![TraitKind::User]);
        assert!(rt.has_trait(TraitKind::User));
        assert!(!rt.has_trait(TraitKind::Group));
        assert!(rt.annotations.skips_entitlements_and_grants());
    }

    #[test]
    fn test_resource_id_display() {
        let id = ResourceId::new("agent", "42");
        assert_eq!(id.to_string(), "agent:42");
    }

    #[test]
    fn test_user_status_from_active() {
        assert_eq!(UserStatus::from_active(true), UserStatus::Enabled);
        assert_eq!(UserStatus::from_active(false), UserStatus::Disabled);
    }

    #[test]
    fn test_resource_trait_accessors() {
        let mut profile = Map::new();
        profile.insert("email".to_string(), json!("jane@example.com"));
        let user = UserTrait::new(profile, UserStatus::Enabled).with_login("jane@example.com");
        let resource = Resource::user(ResourceId::new("agent", "1"), "Jane", user);

        let user = resource.user_trait().unwrap();
        assert_eq!(user.login.as_deref(), Some("jane@example.com"));
        assert_eq!(user.profile_str("email"), Some("jane@example.com"));
        assert!(resource.group_trait().is_none());
        assert!(resource.role_trait().is_none());

        let group = Resource::group(ResourceId::new("agent_group", "7"), "Ops", Map::new());
        assert!(group.group_trait().is_some());
        assert!(group.user_trait().is_none());
    }

    #[test]
    fn test_resource_serialization_tags_traits() {
        let resource = Resource::role(ResourceId::new("role", "3"), "Admin", Map::new());
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["traits"]["kind"], "role");
        assert_eq!(json["id"]["resource_type"], "role");
    }
}
