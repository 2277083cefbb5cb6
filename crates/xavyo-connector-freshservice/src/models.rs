//! Freshservice API record types.
//!
//! Optional vendor fields are `Option<_>`; `id` is required everywhere and a
//! record without one fails to decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Scope given to role assignments created by this connector.
pub const DEFAULT_ASSIGNMENT_SCOPE: &str = "entire_helpdesk";

/// `visibility` value of a catalog item that is still a draft.
pub const VISIBILITY_DRAFT: u8 = 1;

/// Decode `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each custom field on its own, dropping the ones that do not parse.
fn lenient_custom_fields<'de, D>(deserializer: D) -> Result<Vec<CustomField>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(raw
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CustomField>(item) {
            Ok(field) => Some(field),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable custom field");
                None
            }
        })
        .collect())
}

/// Choice pairs with scalar elements turned into strings; anything else is dropped.
fn lenient_choices<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(raw
        .iter()
        .filter_map(Value::as_array)
        .map(|pair| pair.iter().filter_map(scalar_string).collect::<Vec<_>>())
        .filter(|pair| !pair.is_empty())
        .collect())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A staff user.
///
/// Older API versions nest the person under `contact`; newer ones are flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<AgentRole>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub mobile_phone_number: Option<String>,
    #[serde(default)]
    pub work_phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact: Option<AgentContact>,
    #[serde(default)]
    pub deactivated: Option<bool>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub agent_type: Option<String>,
}

/// Nested person data of the older agent shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Agent {
    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
            .or_else(|| non_blank(self.contact.as_ref()?.email.as_deref()))
    }

    /// First and last name; the nested shape's full name is split on the first space.
    pub fn names(&self) -> (String, String) {
        let first = non_blank(self.first_name.as_deref());
        let last = non_blank(self.last_name.as_deref());
        if first.is_some() || last.is_some() {
            return (
                first.unwrap_or_default().to_string(),
                last.unwrap_or_default().to_string(),
            );
        }

        let full = self
            .contact
            .as_ref()
            .and_then(|c| non_blank(c.name.as_deref()))
            .unwrap_or_default();
        match full.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (full.to_string(), String::new()),
        }
    }

    /// Active unless flagged inactive or deactivated.
    pub fn is_active(&self) -> bool {
        let active = self
            .active
            .or_else(|| self.contact.as_ref()?.active)
            .unwrap_or(true);
        active && !self.deactivated.unwrap_or(false)
    }

    pub fn job_title(&self) -> Option<&str> {
        non_blank(self.job_title.as_deref())
            .or_else(|| non_blank(self.contact.as_ref()?.job_title.as_deref()))
    }

    pub fn mobile_phone(&self) -> Option<&str> {
        non_blank(self.mobile_phone_number.as_deref())
            .or_else(|| non_blank(self.contact.as_ref()?.mobile.as_deref()))
    }

    pub fn work_phone(&self) -> Option<&str> {
        non_blank(self.work_phone_number.as_deref())
            .or_else(|| non_blank(self.contact.as_ref()?.phone.as_deref()))
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
            .or_else(|| self.contact.as_ref()?.last_login_at)
            .or(self.last_active_at)
    }

    /// Whether the agent holds `role_id`, whatever the scope.
    pub fn has_role(&self, role_id: u64) -> bool {
        self.roles.iter().any(|r| r.role_id == role_id)
    }
}

/// Role held by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    pub role_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<u64>>,
}

impl AgentRole {
    /// A helpdesk-wide assignment.
    pub fn new(role_id: u64) -> Self {
        Self {
            role_id,
            assignment_scope: Some(DEFAULT_ASSIGNMENT_SCOPE.to_string()),
            groups: None,
        }
    }
}

/// A customer-facing user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub is_agent: Option<bool>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub mobile_phone_number: Option<String>,
    #[serde(default)]
    pub work_phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// An agent group. `members` is the full membership list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<u64>,
    /// Only returned by older API variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<u64>>,
}

impl AgentGroup {
    pub fn has_role(&self, role_id: u64) -> bool {
        self.role_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(&role_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role_type: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequesterGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `manual` or `rule_based`.
    #[serde(default, rename = "type")]
    pub group_type: Option<String>,
}

/// Entry of `/requester_groups/{id}/members`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequesterGroupMember {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, alias = "primary_email")]
    pub email: Option<String>,
}

/// A service catalog item; each one is a ticket form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub display_id: u64,
    #[serde(default, deserialize_with = "lenient_custom_fields")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub deleted: bool,
    /// 1 = draft, 2 = published.
    #[serde(default)]
    pub visibility: Option<u8>,
}

impl ServiceItem {
    pub fn is_draft(&self) -> bool {
        self.visibility == Some(VISIBILITY_DRAFT)
    }
}

/// Custom field of a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    /// Pairs; the first element is the value shown and submitted.
    #[serde(default, deserialize_with = "lenient_choices")]
    pub choices: Vec<Vec<String>>,
    #[serde(default)]
    pub deleted: bool,
}

impl CustomField {
    pub fn choice_values(&self) -> Vec<String> {
        self.choices
            .iter()
            .filter_map(|pair| pair.first().cloned())
            .collect()
    }
}

/// A ticket or service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDetails {
    pub id: u64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_text: Option<String>,
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /service_catalog/items/{display_id}/place_request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRequestPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_for: Option<String>,
    pub email: String,
    pub quantity: u32,
    pub custom_fields: Map<String, Value>,
}

/// Body of `PUT /tickets/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TicketUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PUT /agents/{id}`; replaces every role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateAgentRoles {
    pub roles: Vec<AgentRole>,
}

/// Body of `PUT /groups/{id}`; replaces every member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateGroupMembers {
    pub members: Vec<u64>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
