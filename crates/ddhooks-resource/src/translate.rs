//! Mapping between the desired-state record and the remote configuration.
//!
//! Both directions are pure. Malformed input is rejected earlier, by
//! [`WebhooksRecord::from_attributes`], so the functions here cannot fail.

use ddhooks_core::{IntegrationConfig, Webhook};

use crate::{HookEntry, WebhooksRecord};

/// Builds the complete remote configuration for a record.
///
/// Empty optional strings are sent as unset rather than as `""`.
pub fn to_remote(record: &WebhooksRecord) -> IntegrationConfig {
    IntegrationConfig {
        name: record.name.clone(),
        url: record.url.clone(),
        use_custom_payload: Some(record.use_custom_payload),
        custom_payload: non_empty(&record.custom_payload),
        encode_as_form: Some(record.encode_as_form),
        headers: non_empty(&record.headers),
        webhooks: record
            .hooks
            .iter()
            .map(|hook| Webhook::new(&hook.name, &hook.url))
            .collect(),
    }
}

/// Rebuilds the record from the remote configuration.
///
/// Hooks keep the order the service returned them in. The custom payload
/// flag and the stored template are read independently.
pub fn from_remote(config: &IntegrationConfig) -> WebhooksRecord {
    WebhooksRecord {
        name: config.name.clone(),
        url: config.url.clone(),
        use_custom_payload: config.uses_custom_payload(),
        custom_payload: config.custom_payload().to_owned(),
        encode_as_form: config.encodes_as_form(),
        headers: config.headers().to_owned(),
        hooks: config
            .webhooks
            .iter()
            .map(|webhook| HookEntry::new(&webhook.name, &webhook.url))
            .collect(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}
