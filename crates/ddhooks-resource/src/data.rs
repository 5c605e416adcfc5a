//! Engine-side state of a webhooks integration resource.

use ddhooks_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::WebhooksRecord;

/// Attribute values keyed by attribute name.
pub type Attributes = Map<String, Value>;

/// Relationship between local tracking and the remote integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Tracking {
    /// No local identifier is recorded.
    #[default]
    Untracked,
    /// The identifier is assumed to refer to a live remote integration.
    Tracked(String),
    /// The identifier is recorded but the remote integration is gone.
    Orphaned(String),
}

impl Tracking {
    /// Returns the local identifier, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Untracked => None,
            Self::Tracked(id) | Self::Orphaned(id) => Some(id),
        }
    }
}

/// A resource instance as held by the declarative engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    tracking: Tracking,
    #[serde(default)]
    attributes: Attributes,
}

impl ResourceData {
    /// Creates untracked data holding the given attributes.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            tracking: Tracking::Untracked,
            attributes,
        }
    }

    /// Creates data tracking a live remote integration.
    pub fn tracked(id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            tracking: Tracking::Tracked(id.into()),
            attributes,
        }
    }

    /// Returns the tracking state.
    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    /// Returns the local identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.tracking.id()
    }

    /// Returns all attribute values.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns a single attribute value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Parses the attributes into a typed record.
    pub fn record(&self) -> Result<WebhooksRecord> {
        WebhooksRecord::from_attributes(&self.attributes)
    }

    pub(crate) fn set_tracking(&mut self, tracking: Tracking) {
        self.tracking = tracking;
    }

    pub(crate) fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// Forgets the remote integration and every attribute.
    pub(crate) fn clear(&mut self) {
        self.tracking = Tracking::Untracked;
        self.attributes.clear();
    }
}
