//! Desired-state record of the webhooks integration.

use ddhooks_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Attributes, WEBHOOKS_SCHEMA};

/// A named webhook endpoint as declared by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct HookEntry {
    /// Name of the webhook.
    pub name: String,
    /// URL the webhook posts to.
    pub url: String,
}

impl HookEntry {
    /// Creates a new hook entry.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Typed view of the resource attributes.
///
/// Optional attributes default to `false` or the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct WebhooksRecord {
    /// Name of the integration.
    pub name: String,
    /// Legacy single webhook URL.
    pub url: String,
    /// Send `custom_payload` instead of the default body.
    #[serde(default)]
    pub use_custom_payload: bool,
    /// Payload template for outgoing requests.
    #[serde(default)]
    pub custom_payload: String,
    /// Form-encode outgoing bodies instead of sending JSON.
    #[serde(default)]
    pub encode_as_form: bool,
    /// Serialized headers attached to outgoing requests.
    #[serde(default)]
    pub headers: String,
    /// Named webhook endpoints, in declaration order.
    #[serde(default)]
    pub hooks: Vec<HookEntry>,
}

impl WebhooksRecord {
    /// Creates a record with the required attributes.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parses and validates attribute values.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        WEBHOOKS_SCHEMA.validate(attributes)?;

        let set: Attributes = attributes
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        serde_json::from_value(Value::Object(set)).map_err(|e| {
            Error::translation()
                .with_message(format!("invalid desired state: {e}"))
                .with_source(e)
        })
    }

    /// Renders every attribute, including defaulted ones.
    pub fn to_attributes(&self) -> Attributes {
        let hooks = self
            .hooks
            .iter()
            .map(|hook| {
                let mut block = Attributes::new();
                block.insert("name".into(), Value::from(hook.name.as_str()));
                block.insert("url".into(), Value::from(hook.url.as_str()));
                Value::Object(block)
            })
            .collect();

        let mut attributes = Attributes::new();
        attributes.insert("name".into(), Value::from(self.name.as_str()));
        attributes.insert("url".into(), Value::from(self.url.as_str()));
        attributes.insert("use_custom_payload".into(), Value::Bool(self.use_custom_payload));
        attributes.insert("custom_payload".into(), Value::from(self.custom_payload.as_str()));
        attributes.insert("encode_as_form".into(), Value::Bool(self.encode_as_form));
        attributes.insert("headers".into(), Value::from(self.headers.as_str()));
        attributes.insert("hooks".into(), Value::Array(hooks));
        attributes
    }

    /// Appends a hook entry.
    #[must_use]
    pub fn with_hook(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.hooks.push(HookEntry::new(name, url));
        self
    }

    /// Sets the custom payload flag and template.
    #[must_use]
    pub fn with_custom_payload(mut self, enabled: bool, payload: impl Into<String>) -> Self {
        self.use_custom_payload = enabled;
        self.custom_payload = payload.into();
        self
    }

    /// Sets the form-encoding flag.
    #[must_use]
    pub fn with_encode_as_form(mut self, enabled: bool) -> Self {
        self.encode_as_form = enabled;
        self
    }

    /// Sets the serialized headers.
    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }
}
