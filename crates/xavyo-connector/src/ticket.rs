//! Ticket model
//!
//! Ticket schemas describe which custom fields a ticket form accepts;
//! [`validate_ticket`] checks a ticket against its schema before it is sent
//! to the target system.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};
use crate::types::Resource;

/// Value type accepted by a custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomFieldKind {
    String,
    Strings,
    Bool,
    Timestamp,
    /// One value out of `allowed`.
    PickString { allowed: Vec<String> },
    /// Any subset of `allowed`.
    PickMultipleStrings { allowed: Vec<String> },
}

/// A custom field declared by a ticket schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCustomField {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub kind: CustomFieldKind,
}

impl TicketCustomField {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: CustomFieldKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: None,
            required: false,
            kind,
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A value set on a ticket's custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomFieldValue {
    String(String),
    Strings(Vec<String>),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    PickString(String),
    PickMultipleStrings(Vec<String>),
}

impl CustomFieldValue {
    /// Plain JSON value sent to the target system.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CustomFieldValue::String(s) | CustomFieldValue::PickString(s) => {
                serde_json::Value::String(s.clone())
            }
            CustomFieldValue::Strings(v) | CustomFieldValue::PickMultipleStrings(v) => {
                serde_json::Value::from(v.clone())
            }
            CustomFieldValue::Bool(b) => serde_json::Value::Bool(*b),
            CustomFieldValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        }
    }
}

/// A ticket lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatus {
    pub id: String,
    pub display_name: String,
}

impl TicketStatus {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A ticket form: its custom fields and possible statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TicketSchema {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, TicketCustomField>,
    #[serde(default)]
    pub statuses: Vec<TicketStatus>,
}

/// A ticket in the target system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Ticket {
    /// Empty until the target system assigned one.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
    /// The user the request is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_for: Option<Resource>,
    /// The user filing the request; the connector's own account when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<Resource>,
}

/// A ticket to create together with the schema it follows.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRequest {
    pub ticket: Ticket,
    pub schema: TicketSchema,
}

/// Per-item outcome of a bulk ticket call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TicketResult {
    pub ticket: Option<Ticket>,
    pub annotations: Annotations,
    pub error: Option<String>,
}

impl TicketResult {
    pub fn ok(ticket: Ticket, annotations: Annotations) -> Self {
        Self {
            ticket: Some(ticket),
            annotations,
            error: None,
        }
    }

    pub fn failed(error: &ConnectorError) -> Self {
        let ticket = match error {
            ConnectorError::TicketIncomplete { ticket, .. } => Some(ticket.as_ref().clone()),
            _ => None,
        };
        Self {
            ticket,
            annotations: Annotations::default(),
            error: Some(error.to_string()),
        }
    }
}

/// Check `ticket` against `schema`.
///
/// Every required field must be present and non-empty, every present value
/// must match its field's kind, and pick values must come from the allowed
/// set. Values for fields the schema does not declare are ignored.
pub fn validate_ticket(schema: &TicketSchema, ticket: &Ticket) -> ConnectorResult<()> {
    for (id, field) in &schema.custom_fields {
        let Some(value) = ticket.custom_fields.get(id) else {
            if field.required {
                return Err(ConnectorError::invalid_data(format!(
                    "missing required field '{id}'"
                )));
            }
            continue;
        };

        match (&field.kind, value) {
            (CustomFieldKind::String, CustomFieldValue::String(s)) => {
                if field.required && s.is_empty() {
                    return Err(empty_required(id));
                }
            }
            (CustomFieldKind::Strings, CustomFieldValue::Strings(v)) => {
                if field.required && v.is_empty() {
                    return Err(empty_required(id));
                }
            }
            (CustomFieldKind::Bool, CustomFieldValue::Bool(_))
            | (CustomFieldKind::Timestamp, CustomFieldValue::Timestamp(_)) => {}
            (CustomFieldKind::PickString { allowed }, CustomFieldValue::PickString(s)) => {
                if s.is_empty() {
                    if field.required {
                        return Err(empty_required(id));
                    }
                } else if !allowed.contains(s) {
                    return Err(ConnectorError::invalid_data(format!(
                        "value '{s}' is not allowed for field '{id}'"
                    )));
                }
            }
            (
                CustomFieldKind::PickMultipleStrings { allowed },
                CustomFieldValue::PickMultipleStrings(values),
            ) => {
                if field.required && values.is_empty() {
                    return Err(empty_required(id));
                }
                if let Some(bad) = values.iter().find(|v| !allowed.contains(v)) {
                    return Err(ConnectorError::invalid_data(format!(
                        "value '{bad}' is not allowed for field '{id}'"
                    )));
                }
            }
            (kind, _) => {
                return Err(ConnectorError::invalid_data(format!(
                    "field '{id}' expects a value of type {kind:?}"
                )));
            }
        }
    }

    Ok(())
}

fn empty_required(id: &str) -> ConnectorError {
    ConnectorError::invalid_data(format!("required field '{id}' is empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TicketSchema {
        let mut custom_fields = BTreeMap::new();
        custom_fields.insert(
            "reason".to_string(),
            TicketCustomField::new("reason", "Reason", CustomFieldKind::String).required(true),
        );
        custom_fields.insert(
            "urgency".to_string(),
            TicketCustomField::new(
                "urgency",
                "Urgency",
                CustomFieldKind::PickString {
                    allowed: vec!["low".to_string(), "high".to_string()],
                },
            ),
        );
        custom_fields.insert(
            "apps".to_string(),
            TicketCustomField::new(
                "apps",
                "Apps",
                CustomFieldKind::PickMultipleStrings {
                    allowed: vec!["vpn".to_string(), "crm".to_string()],
                },
            ),
        );
        TicketSchema {
            id: "12".to_string(),
            display_name: "Access request".to_string(),
            custom_fields,
            statuses: vec![TicketStatus::new("2", "Open")],
        }
    }

    fn ticket_with(fields: Vec<(&str, CustomFieldValue)>) -> Ticket {
        Ticket {
            custom_fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_ticket() {
        let ticket = ticket_with(vec![
            ("reason", CustomFieldValue::String("onboarding".to_string())),
            ("urgency", CustomFieldValue::PickString("high".to_string())),
            (
                "apps",
                CustomFieldValue::PickMultipleStrings(vec!["vpn".to_string()]),
            ),
        ]);
        assert!(validate_ticket(&schema(), &ticket).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let ticket = ticket_with(vec![]);
        let err = validate_ticket(&schema(), &ticket).unwrap_err();
        assert!(err.to_string().contains("missing required field 'reason'"));
    }

    #[test]
    fn test_empty_required_string() {
        let ticket = ticket_with(vec![("reason", CustomFieldValue::String(String::new()))]);
        assert!(validate_ticket(&schema(), &ticket).is_err());
    }

    #[test]
    fn test_wrong_value_type() {
        let ticket = ticket_with(vec![("reason", CustomFieldValue::Bool(true))]);
        let err = validate_ticket(&schema(), &ticket).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_pick_outside_allowed_set() {
        let ticket = ticket_with(vec![
            ("reason", CustomFieldValue::String("x".to_string())),
            ("urgency", CustomFieldValue::PickString("medium".to_string())),
        ]);
        assert!(validate_ticket(&schema(), &ticket).is_err());

        let ticket = ticket_with(vec![
            ("reason", CustomFieldValue::String("x".to_string())),
            (
                "apps",
                CustomFieldValue::PickMultipleStrings(vec!["vpn".to_string(), "erp".to_string()]),
            ),
        ]);
        assert!(validate_ticket(&schema(), &ticket).is_err());
    }

    #[test]
    fn test_undeclared_fields_ignored() {
        let ticket = ticket_with(vec![
            ("reason", CustomFieldValue::String("x".to_string())),
            ("extra", CustomFieldValue::Bool(false)),
        ]);
        assert!(validate_ticket(&schema(), &ticket).is_ok());
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(
            CustomFieldValue::Strings(vec!["a".to_string()]).to_json(),
            serde_json::json!(["a"])
        );
        assert_eq!(CustomFieldValue::Bool(true).to_json(), serde_json::json!(true));
    }

    #[test]
    fn test_failed_result_keeps_incomplete_ticket() {
        let err = ConnectorError::TicketIncomplete {
            ticket: Box::new(Ticket {
                id: "55".to_string(),
                ..Default::default()
            }),
            message: "update failed".to_string(),
        };
        let result = TicketResult::failed(&err);
        assert_eq!(result.ticket.unwrap().id, "55");
        assert!(result.error.unwrap().contains("ticket 55 created"));
    }
}
