//! Ticketing through the Freshservice service catalog.
//!
//! Each catalog item is a ticket schema. A ticket is created by placing a
//! service request against its item and then updating the resulting ticket
//! with subject, description and tags, which `place_request` does not take.
//! The two calls are not atomic: when the update fails the ticket exists
//! with default content and [`ConnectorError::TicketIncomplete`] carries it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use xavyo_connector::annotations::Annotations;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::pagination::{PageToken, SyncPage};
use xavyo_connector::ticket::{
    validate_ticket, CustomFieldKind, Ticket, TicketCustomField, TicketSchema, TicketStatus,
};
use xavyo_connector::traits::TicketManager;
use xavyo_connector::types::Resource;

use crate::client::FreshserviceClient;
use crate::config::ticket_url;
use crate::error::FreshserviceError;
use crate::models::{
    CustomField, ServiceItem, ServiceRequestPayload, TicketDetails, TicketUpdatePayload,
};
use crate::pagination::PageOptions;

/// Ticket statuses every Freshservice account has.
const STATUSES: [(u32, &str); 4] = [(2, "Open"), (3, "Pending"), (4, "Resolved"), (5, "Closed")];

#[must_use]
pub fn ticket_statuses() -> Vec<TicketStatus> {
    STATUSES
        .iter()
        .map(|(id, name)| TicketStatus::new(id.to_string(), *name))
        .collect()
}

fn status_for(code: u32) -> Option<TicketStatus> {
    STATUSES
        .iter()
        .find(|(id, _)| *id == code)
        .map(|(id, name)| TicketStatus::new(id.to_string(), *name))
}

/// Translate a custom field; `None` for types the ticket model cannot carry.
#[must_use]
pub fn custom_field(field: &CustomField) -> Option<TicketCustomField> {
    let kind = match field.field_type.as_str() {
        "custom_text" | "custom_paragraph" | "custom_url" | "custom_lookup_bigint" => {
            CustomFieldKind::String
        }
        "custom_date" => CustomFieldKind::Timestamp,
        "custom_checkbox" => CustomFieldKind::Bool,
        "custom_dropdown" => CustomFieldKind::PickString {
            allowed: field.choice_values(),
        },
        "custom_multi_select_dropdown" => CustomFieldKind::PickMultipleStrings {
            allowed: field.choice_values(),
        },
        "custom_multi_lookup" => CustomFieldKind::Strings,
        "custom_decimal" | "custom_number" | "custom_static_rich_text" | "nested_field" => {
            warn!(
                field = %field.name,
                field_type = %field.field_type,
                "Skipping unsupported custom field type"
            );
            return None;
        }
        other => {
            warn!(field = %field.name, field_type = other, "Skipping unknown custom field type");
            return None;
        }
    };

    let label = if field.label.is_empty() {
        &field.name
    } else {
        &field.label
    };
    Some(TicketCustomField::new(&field.name, label, kind).required(field.required))
}

/// Ticket schema of a catalog item. Deleted fields are left out.
#[must_use]
pub fn service_item_schema(item: &ServiceItem) -> TicketSchema {
    let custom_fields: BTreeMap<String, TicketCustomField> = item
        .custom_fields
        .iter()
        .filter(|f| !f.deleted)
        .filter_map(custom_field)
        .map(|f| (f.id.clone(), f))
        .collect();

    TicketSchema {
        id: item.display_id.to_string(),
        display_name: item.name.clone(),
        custom_fields,
        statuses: ticket_statuses(),
    }
}

/// The login of a user principal; its primary email when no login is set.
fn principal_login(principal: &Resource) -> ConnectorResult<String> {
    let user = principal.user_trait().ok_or_else(|| {
        ConnectorError::invalid_data(format!("ticket principal {} is not a user", principal.id))
    })?;
    user.login
        .clone()
        .or_else(|| {
            user.emails
                .iter()
                .find(|e| e.is_primary)
                .or_else(|| user.emails.first())
                .map(|e| e.address.clone())
        })
        .ok_or_else(|| {
            ConnectorError::invalid_data(format!("ticket principal {} has no login", principal.id))
        })
}

fn parse_numeric(id: &str) -> ConnectorResult<u64> {
    id.parse::<u64>()
        .map_err(|_| FreshserviceError::InvalidId(id.to_string()).into())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// [`TicketManager`] backed by the service catalog.
#[derive(Debug, Clone)]
pub struct FreshserviceTicketing {
    client: Arc<FreshserviceClient>,
}

impl FreshserviceTicketing {
    pub fn new(client: Arc<FreshserviceClient>) -> Self {
        Self { client }
    }

    fn ticket_from_details(&self, details: &TicketDetails) -> Ticket {
        Ticket {
            id: details.id.to_string(),
            display_name: details.subject.clone().unwrap_or_default(),
            description: details
                .description_text
                .clone()
                .or_else(|| details.description.clone())
                .unwrap_or_default(),
            status: details.status.and_then(status_for),
            labels: details.tags.clone(),
            url: Some(ticket_url(self.client.subdomain(), details.id)),
            created_at: details.created_at,
            updated_at: details.updated_at,
            ..Default::default()
        }
    }

    /// Email the request is filed by: the reporter, else the key's own agent.
    async fn requested_by(&self, ticket: &Ticket) -> ConnectorResult<(String, Annotations)> {
        if let Some(reporter) = &ticket.reporter {
            return Ok((principal_login(reporter)?, Annotations::new()));
        }

        let me = self.client.get_current_agent().await?;
        let email = me.data.email().map(str::to_string).ok_or_else(|| {
            ConnectorError::invalid_data("the API key's agent has no email address")
        })?;
        Ok((email, Annotations::new().with_rate_limit(me.rate_limit)))
    }
}

#[async_trait]
impl TicketManager for FreshserviceTicketing {
    /// One page of catalog items; drafts and deleted items are skipped.
    #[instrument(skip(self))]
    async fn list_ticket_schemas(
        &self,
        token: &PageToken,
    ) -> ConnectorResult<SyncPage<TicketSchema>> {
        let page = self
            .client
            .list_service_items(PageOptions::from_token(&token.token, token.size)?)
            .await?;
        let next = page.next_token();
        let mut rate_limit = page.rate_limit;

        let mut schemas = Vec::with_capacity(page.items.len());
        for item in page.items {
            if item.deleted || item.is_draft() {
                debug!(display_id = item.display_id, "Skipping deleted or draft catalog item");
                continue;
            }
            let detail = self.client.get_service_item(item.display_id).await?;
            rate_limit = detail.rate_limit.or(rate_limit);
            schemas.push(service_item_schema(&detail.data));
        }

        Ok(SyncPage::new(
            schemas,
            next,
            Annotations::new().with_rate_limit(rate_limit),
        ))
    }

    #[instrument(skip(self))]
    async fn get_ticket_schema(&self, id: &str) -> ConnectorResult<(TicketSchema, Annotations)> {
        let item = self.client.get_service_item(parse_numeric(id)?).await?;
        Ok((
            service_item_schema(&item.data),
            Annotations::new().with_rate_limit(item.rate_limit),
        ))
    }

    #[instrument(skip(self, ticket, schema), fields(schema = %schema.id))]
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        schema: &TicketSchema,
    ) -> ConnectorResult<(Ticket, Annotations)> {
        validate_ticket(schema, ticket)?;
        let display_id = parse_numeric(&schema.id)?;

        let custom_fields: Map<String, Value> = ticket
            .custom_fields
            .iter()
            .filter(|(id, _)| schema.custom_fields.contains_key(*id))
            .map(|(id, value)| (id.clone(), value.to_json()))
            .collect();
        let requested_for = ticket
            .requested_for
            .as_ref()
            .map(principal_login)
            .transpose()?;
        let (email, mut annotations) = self.requested_by(ticket).await?;

        let payload = ServiceRequestPayload {
            requested_for,
            email,
            quantity: 1,
            custom_fields,
        };
        let created = self
            .client
            .place_service_request(display_id, &payload)
            .await?;
        annotations = annotations.with_rate_limit(created.rate_limit);
        let ticket_id = created.data.id;
        info!(ticket_id, display_id, "Placed service request");

        let update = TicketUpdatePayload {
            description: non_empty(&ticket.description),
            subject: non_empty(&ticket.display_name),
            tags: ticket.labels.clone(),
        };
        match self.client.update_ticket(ticket_id, &update).await {
            Ok(updated) => Ok((
                self.ticket_from_details(&updated.data),
                annotations.with_rate_limit(updated.rate_limit),
            )),
            Err(e) => {
                warn!(ticket_id, error = %e, "Service request placed but ticket update failed");
                Err(ConnectorError::TicketIncomplete {
                    ticket: Box::new(self.ticket_from_details(&created.data)),
                    message: e.to_string(),
                })
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, id: &str) -> ConnectorResult<(Ticket, Annotations)> {
        let ticket = self.client.get_ticket(parse_numeric(id)?).await?;
        Ok((
            self.ticket_from_details(&ticket.data),
            Annotations::new().with_rate_limit(ticket.rate_limit),
        ))
    }
}
