//! Sync pagination
//!
//! Page tokens are opaque to the orchestrator. Connectors keep a [`Bag`]
//! of page states inside the token so a sync can be resumed from any point
//! without server-side state.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};

/// Opaque cursor handed in by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageToken {
    /// Empty on the first call.
    #[serde(default)]
    pub token: String,
    /// Requested page size; 0 lets the connector choose.
    #[serde(default)]
    pub size: u32,
}

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            size: 0,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Whether this is the first call of a sync.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.token.is_empty()
    }
}

/// One page of sync output.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPage<T> {
    pub items: Vec<T>,
    /// Empty when the sync is complete.
    pub next_token: String,
    pub annotations: Annotations,
}

impl<T> SyncPage<T> {
    pub fn new(items: Vec<T>, next_token: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            items,
            next_token: next_token.into(),
            annotations,
        }
    }

    /// A final page with no items.
    pub fn empty() -> Self {
        Self::new(Vec::new(), String::new(), Annotations::default())
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_token.is_empty()
    }
}

/// Position within one resource type's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub resource_type_id: String,
    /// Vendor-side page cursor; empty means "first page".
    #[serde(default)]
    pub token: String,
}

/// Stack of page states serialized into a page token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bag {
    #[serde(default)]
    states: Vec<PageState>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a bag from a page token. An empty token yields an empty bag.
    pub fn unmarshal(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(token).map_err(|e| ConnectorError::InvalidPageToken {
            message: e.to_string(),
        })
    }

    /// Encode the bag as a page token. An empty bag yields the empty token.
    pub fn marshal(&self) -> ConnectorResult<String> {
        if self.states.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(self)?)
    }

    pub fn push(&mut self, state: PageState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Option<PageState> {
        self.states.pop()
    }

    #[must_use]
    pub fn current(&self) -> Option<&PageState> {
        self.states.last()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Advance the current state to `next_token`; an empty token pops it.
    pub fn next(&mut self, next_token: &str) {
        if next_token.is_empty() {
            self.states.pop();
            return;
        }
        if let Some(current) = self.states.last_mut() {
            current.token = next_token.to_string();
        }
    }

    /// Load a bag from `token`, seeding it with `resource_type_id` when the
    /// sync is just starting.
    pub fn resume(token: &str, resource_type_id: &str) -> ConnectorResult<Self> {
        let mut bag = Self::unmarshal(token)?;
        if bag.current().is_none() {
            bag.push(PageState {
                resource_type_id: resource_type_id.to_string(),
                token: String::new(),
            });
        }
        Ok(bag)
    }
}
