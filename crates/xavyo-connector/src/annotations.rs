//! Annotations
//!
//! Typed metadata attached to resource types, resources and sync results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the target considered the caller over its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitStatus {
    #[default]
    Unspecified,
    Ok,
    Overlimit,
}

/// Rate-limit state reported by the target system on a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RateLimitDescription {
    pub status: RateLimitStatus,
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// When the window resets, if the target said so.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// One piece of metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    RateLimit(RateLimitDescription),
    /// The grant was already in place; nothing was written.
    GrantAlreadyExists,
    /// The grant was already absent; nothing was written.
    GrantAlreadyRevoked,
    /// Resources of this type never carry entitlements or grants.
    SkipEntitlementsAndGrants,
}

/// An ordered collection of annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// Append a rate-limit annotation when one was reported.
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitDescription>) -> Self {
        if let Some(desc) = rate_limit {
            self.push(Annotation::RateLimit(desc));
        }
        self
    }

    #[must_use]
    pub fn contains(&self, annotation: &Annotation) -> bool {
        self.0.contains(annotation)
    }

    /// The last reported rate-limit description, if any.
    #[must_use]
    pub fn rate_limit(&self) -> Option<&RateLimitDescription> {
        self.0.iter().rev().find_map(|a| match a {
            Annotation::RateLimit(desc) => Some(desc),
            _ => None,
        })
    }

    #[must_use]
    pub fn skips_entitlements_and_grants(&self) -> bool {
        self.contains(&Annotation::SkipEntitlementsAndGrants)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }
}

impl From<Vec<Annotation>> for Annotations {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self(annotations)
    }
}

impl Extend<Annotation> for Annotations {
    fn extend<T: IntoIterator<Item = Annotation>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}
