//! Remote configuration of the account-wide webhooks integration.

use serde::{Deserialize, Serialize};

/// A named webhook endpoint configured on the remote integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Webhook {
    /// Name used to reference the hook from monitor notifications.
    pub name: String,
    /// Endpoint the hook posts to.
    pub url: String,
}

impl Webhook {
    /// Creates a new webhook entry.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The webhooks integration as stored by the remote service.
///
/// There is exactly one per account. The option toggles are kept as
/// `Option` so that an unset flag can be told apart from one explicitly
/// set to `false`, and so that a payload template may be stored while the
/// flag enabling it is off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct IntegrationConfig {
    /// Canonical name of the integration.
    pub name: String,
    /// Legacy single endpoint.
    pub url: String,
    /// Whether outgoing bodies use `custom_payload` instead of the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_custom_payload: Option<bool>,
    /// Payload template sent when the custom payload is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_payload: Option<String>,
    /// Whether outgoing bodies are form-encoded rather than JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode_as_form: Option<bool>,
    /// Serialized header set attached to outgoing requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    /// Configured hook endpoints, in the order the service returns them.
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
}

impl IntegrationConfig {
    /// Creates a configuration with the required fields and no hooks.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Returns whether the custom payload flag is set.
    pub fn uses_custom_payload(&self) -> bool {
        self.use_custom_payload.unwrap_or_default()
    }

    /// Returns the stored payload template, or an empty string.
    pub fn custom_payload(&self) -> &str {
        self.custom_payload.as_deref().unwrap_or_default()
    }

    /// Returns whether the form-encoding flag is set.
    pub fn encodes_as_form(&self) -> bool {
        self.encode_as_form.unwrap_or_default()
    }

    /// Returns the serialized header set, or an empty string.
    pub fn headers(&self) -> &str {
        self.headers.as_deref().unwrap_or_default()
    }

    /// Appends a hook endpoint.
    #[must_use]
    pub fn with_webhook(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.webhooks.push(Webhook::new(name, url));
        self
    }

    /// Sets the custom payload flag and template.
    #[must_use]
    pub fn with_custom_payload(mut self, enabled: bool, payload: impl Into<String>) -> Self {
        self.use_custom_payload = Some(enabled);
        self.custom_payload = Some(payload.into());
        self
    }

    /// Sets the form-encoding flag.
    #[must_use]
    pub fn with_encode_as_form(mut self, enabled: bool) -> Self {
        self.encode_as_form = Some(enabled);
        self
    }

    /// Sets the serialized header set.
    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = Some(headers.into());
        self
    }
}
