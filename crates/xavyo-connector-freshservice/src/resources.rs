//! Mapping of Freshservice records onto connector resources.
//!
//! These functions never fail: missing optional vendor fields end up as
//! JSON `null` in the profile.

use serde_json::{Map, Value};
use xavyo_connector::types::{Resource, ResourceId, UserStatus, UserTrait};

use crate::error::{FreshserviceError, FreshserviceResult};
use crate::models::{Agent, AgentGroup, Requester, RequesterGroup, Role};
use crate::resource_types::{AGENT, AGENT_GROUP, REQUESTER, REQUESTER_GROUP, ROLE};

/// Map an agent to a user resource.
#[must_use]
pub fn agent_resource(agent: &Agent) -> Resource {
    let (first_name, last_name) = agent.names();
    let email = agent.email();

    let mut profile = user_profile(agent.id, &first_name, &last_name, email);
    profile.insert("job_title".into(), optional(agent.job_title()));
    profile.insert("mobile_phone".into(), optional(agent.mobile_phone()));
    profile.insert("work_phone".into(), optional(agent.work_phone()));
    profile.insert("address".into(), optional(agent.address.as_deref()));

    let user = finish_user(
        UserTrait::new(profile, UserStatus::from_active(agent.is_active())),
        email,
    )
    .with_last_login(agent.last_login());

    Resource::user(
        ResourceId::new(AGENT, agent.id.to_string()),
        display_name(agent.id, &first_name, &last_name, email),
        user,
    )
}

/// Map a requester to a user resource.
#[must_use]
pub fn requester_resource(requester: &Requester) -> Resource {
    let first_name = requester.first_name.as_deref().unwrap_or_default();
    let last_name = requester.last_name.as_deref().unwrap_or_default();
    let email = requester
        .primary_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let mut profile = user_profile(requester.id, first_name, last_name, email);
    profile.insert("job_title".into(), optional(requester.job_title.as_deref()));
    profile.insert(
        "mobile_phone".into(),
        optional(requester.mobile_phone_number.as_deref()),
    );
    profile.insert(
        "work_phone".into(),
        optional(requester.work_phone_number.as_deref()),
    );
    profile.insert("address".into(), optional(requester.address.as_deref()));
    profile.insert(
        "is_agent".into(),
        Value::Bool(requester.is_agent.unwrap_or(false)),
    );

    let user = finish_user(
        UserTrait::new(
            profile,
            UserStatus::from_active(requester.active.unwrap_or(false)),
        ),
        email,
    );

    Resource::user(
        ResourceId::new(REQUESTER, requester.id.to_string()),
        display_name(requester.id, first_name, last_name, email),
        user,
    )
}

/// Map an agent group to a group resource.
#[must_use]
pub fn agent_group_resource(group: &AgentGroup) -> Resource {
    Resource::group(
        ResourceId::new(AGENT_GROUP, group.id.to_string()),
        group.name.clone(),
        group_profile(
            group.id,
            &group.name,
            group.description.as_deref(),
            Some("agent_group"),
        ),
    )
}

/// Map a requester group to a group resource.
#[must_use]
pub fn requester_group_resource(group: &RequesterGroup) -> Resource {
    Resource::group(
        ResourceId::new(REQUESTER_GROUP, group.id.to_string()),
        group.name.clone(),
        group_profile(
            group.id,
            &group.name,
            group.description.as_deref(),
            group.group_type.as_deref(),
        ),
    )
}

/// Map a role to a role resource.
#[must_use]
pub fn role_resource(role: &Role) -> Resource {
    let mut profile = Map::new();
    profile.insert("role_id".into(), Value::String(role.id.to_string()));
    profile.insert("role_name".into(), Value::String(role.name.clone()));
    profile.insert("description".into(), optional(role.description.as_deref()));
    profile.insert(
        "role_type".into(),
        role.role_type.map_or(Value::Null, Value::from),
    );

    Resource::role(
        ResourceId::new(ROLE, role.id.to_string()),
        role.name.clone(),
        profile,
    )
}

/// Numeric Freshservice id behind a resource id.
pub(crate) fn parse_id(id: &ResourceId) -> FreshserviceResult<u64> {
    id.resource
        .parse::<u64>()
        .map_err(|_| FreshserviceError::InvalidId(id.to_string()))
}

/// "First Last", the email when both names are blank, the id as a last resort.
fn display_name(id: u64, first_name: &str, last_name: &str, email: Option<&str>) -> String {
    let full = format!("{} {}", first_name.trim(), last_name.trim());
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }
    email.map_or_else(|| id.to_string(), str::to_string)
}

fn user_profile(id: u64, first_name: &str, last_name: &str, email: Option<&str>) -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("login".into(), optional(email));
    profile.insert("first_name".into(), Value::String(first_name.to_string()));
    profile.insert("last_name".into(), Value::String(last_name.to_string()));
    profile.insert("email".into(), optional(email));
    profile.insert("user_id".into(), Value::String(id.to_string()));
    profile
}

fn finish_user(user: UserTrait, email: Option<&str>) -> UserTrait {
    match email {
        Some(email) => user.with_login(email).with_email(email, true),
        None => user,
    }
}

fn group_profile(
    id: u64,
    name: &str,
    description: Option<&str>,
    group_type: Option<&str>,
) -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("group_id".into(), Value::String(id.to_string()));
    profile.insert("group_name".into(), Value::String(name.to_string()));
    profile.insert("description".into(), optional(description));
    profile.insert("group_type".into(), optional(group_type));
    profile
}

fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}
