//! Lifecycle controller of the webhooks integration resource.
//!
//! The remote integration exists at most once per account and has no key
//! the caller chooses. The controller therefore
//!
//! - adopts the name the service reports after a create as the local
//!   identifier, instead of trusting the requested one,
//! - always rebuilds local state from a fresh remote read, and
//! - runs create, update and delete behind the process-wide
//!   [`MutationSerializer`](crate::MutationSerializer).
//!
//! A missing remote integration is expected drift: read and exists report
//! it as absence, delete treats it as success.

use ddhooks_core::{Error, ErrorKind, IntegrationConfig, IntegrationService, Result};

use crate::translate::{from_remote, to_remote};
use crate::{
    Attributes, Mutation, ProviderContext, ResourceData, ResourceSchema, Tracking,
    WEBHOOKS_SCHEMA, WebhooksRecord,
};

/// Tracing target for lifecycle operations.
pub const TRACING_TARGET: &str = "ddhooks_resource::lifecycle";

/// Resource handler for the account-wide webhooks integration.
#[derive(Debug, Clone)]
pub struct WebhooksResource {
    context: ProviderContext,
}

impl WebhooksResource {
    /// Creates a handler bound to the given provider context.
    pub fn new(context: ProviderContext) -> Self {
        Self { context }
    }

    /// Returns the schema of the resource.
    pub fn schema(&self) -> &'static ResourceSchema {
        &WEBHOOKS_SCHEMA
    }

    /// Creates the remote integration and starts tracking it.
    ///
    /// The returned data is tracked under the name the service reports
    /// back. On failure nothing is tracked.
    pub async fn create(&self, desired: Attributes) -> Result<ResourceData> {
        let _guard = self.context.serializer().acquire(Mutation::Create).await;

        let record = WebhooksRecord::from_attributes(&desired)?;
        let config = to_remote(&record);

        self.client().create(&config).await.map_err(|e| {
            Error::operation(ErrorKind::Create, "failed to create webhooks integration", e)
        })?;

        let created = self.client().get().await.map_err(|e| {
            Error::operation(
                ErrorKind::Create,
                "failed to retrieve webhooks integration after create",
                e,
            )
        })?;

        if created.name.is_empty() {
            return Err(Error::new(ErrorKind::Create)
                .with_message("service returned a webhooks integration without a name"));
        }

        tracing::info!(
            target: TRACING_TARGET,
            id = %created.name,
            requested = %record.name,
            hooks = record.hooks.len(),
            "Created webhooks integration"
        );

        Ok(ResourceData::tracked(created.name, record.to_attributes()))
    }

    /// Refreshes every attribute from the remote integration.
    ///
    /// Returns `None` and marks the data as orphaned if the integration no
    /// longer exists. Orphaned data whose integration has reappeared is
    /// tracked again. Untracked data, such as data that was deleted, reads
    /// as absent without a remote call.
    pub async fn read(&self, data: &mut ResourceData) -> Result<Option<WebhooksRecord>> {
        let Some(id) = data.id().map(str::to_owned) else {
            tracing::debug!(target: TRACING_TARGET, "Nothing tracked, reporting absence");
            return Ok(None);
        };

        let fetched = self
            .fetch()
            .await
            .map_err(|e| e.with_context("reading webhooks integration"))?;

        let Some(config) = fetched else {
            tracing::warn!(
                target: TRACING_TARGET,
                id = %id,
                "Webhooks integration is gone, marking as orphaned"
            );
            data.set_tracking(Tracking::Orphaned(id));
            return Ok(None);
        };

        let record = from_remote(&config);

        tracing::debug!(
            target: TRACING_TARGET,
            id = %id,
            hooks = record.hooks.len(),
            "Refreshed webhooks integration"
        );

        data.set_tracking(Tracking::Tracked(id));
        data.set_attributes(record.to_attributes());
        Ok(Some(record))
    }

    /// Returns whether the remote integration exists.
    ///
    /// Uses the same absence check as [`read`](Self::read).
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let exists = self
            .fetch()
            .await
            .map_err(|e| e.with_context("checking webhooks integration"))?
            .is_some();

        tracing::debug!(target: TRACING_TARGET, id = %id, exists, "Checked webhooks integration");
        Ok(exists)
    }

    /// Replaces the remote integration with the desired attributes.
    ///
    /// The whole configuration is written in one call. The data keeps its
    /// previous attributes if the call fails.
    pub async fn update(&self, data: &mut ResourceData, desired: Attributes) -> Result<()> {
        let id = data.id().ok_or_else(|| {
            Error::invalid_input()
                .with_message("cannot update a webhooks integration that is not tracked")
        })?;
        let id = id.to_owned();
        let _guard = self.context.serializer().acquire(Mutation::Update).await;

        let record = WebhooksRecord::from_attributes(&desired)?;
        let config = to_remote(&record);

        self.client().update(&config).await.map_err(|e| {
            Error::operation(ErrorKind::Update, "failed to update webhooks integration", e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            id = %id,
            hooks = record.hooks.len(),
            "Updated webhooks integration"
        );

        data.set_tracking(Tracking::Tracked(id));
        data.set_attributes(record.to_attributes());
        Ok(())
    }

    /// Deletes the remote integration and stops tracking it.
    ///
    /// An integration that is already gone counts as deleted. Untracked
    /// data is left as is.
    pub async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_owned) else {
            tracing::debug!(target: TRACING_TARGET, "Nothing tracked, skipping delete");
            return Ok(());
        };

        let _guard = self.context.serializer().acquire(Mutation::Delete).await;

        match self.client().delete().await {
            Ok(()) => {
                tracing::info!(target: TRACING_TARGET, id = %id, "Deleted webhooks integration");
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    id = %id,
                    "Webhooks integration already absent"
                );
            }
            Err(e) => {
                return Err(Error::operation(
                    ErrorKind::Delete,
                    "failed to delete webhooks integration",
                    e,
                ));
            }
        }

        data.clear();
        Ok(())
    }

    /// Starts tracking an integration created outside the provider.
    ///
    /// Nothing is written remotely. The data is tracked under the name the
    /// service reports, like after [`create`](Self::create).
    pub async fn import(&self, raw_id: &str) -> Result<ResourceData> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return Err(Error::new(ErrorKind::Import)
                .with_message("import identifier must not be empty"));
        }

        let config = match self.client().get().await {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                return Err(Error::operation(
                    ErrorKind::Import,
                    "no webhooks integration exists to import",
                    e,
                ));
            }
            Err(e) => {
                return Err(Error::operation(
                    ErrorKind::Import,
                    "failed to import webhooks integration",
                    e,
                ));
            }
        };

        let record = from_remote(&config);
        let id = if config.name.is_empty() {
            raw_id.to_owned()
        } else {
            config.name
        };

        tracing::info!(
            target: TRACING_TARGET,
            id = %id,
            raw_id = %raw_id,
            hooks = record.hooks.len(),
            "Imported webhooks integration"
        );

        Ok(ResourceData::tracked(id, record.to_attributes()))
    }

    fn client(&self) -> &IntegrationService {
        self.context.client()
    }

    async fn fetch(&self) -> Result<Option<IntegrationConfig>> {
        match self.client().get().await {
            Ok(config) => Ok(Some(config)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ddhooks_core::mock::MockClient;
    use ddhooks_core::{Operation, Webhook};
    use serde_json::{Value, json};

    use super::*;

    fn attributes(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn github() -> Attributes {
        attributes(json!({
            "name": "github",
            "url": "https://x/hook",
            "hooks": [{ "name": "pr", "url": "https://x/pr" }],
        }))
    }

    fn resource(client: &MockClient) -> WebhooksResource {
        WebhooksResource::new(ProviderContext::new(client.clone()))
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let client = MockClient::default();
        let resource = resource(&client);

        let mut data = resource.create(github()).await.unwrap();
        assert_eq!(data.tracking(), &Tracking::Tracked("github".into()));

        let remote = client.remote().unwrap();
        assert_eq!(remote.webhooks, vec![Webhook::new("pr", "https://x/pr")]);

        let record = resource.read(&mut data).await.unwrap().unwrap();
        assert_eq!(record.hooks.len(), 1);
        assert_eq!(record.hooks[0].name, "pr");
        assert_eq!(record.hooks[0].url, "https://x/pr");
        assert_eq!(data.record().unwrap(), record);
    }

    #[tokio::test]
    async fn test_create_adopts_canonical_name() {
        let client = MockClient::with_canonical_name("webhooks");
        let data = resource(&client).create(github()).await.unwrap();

        assert_eq!(data.id(), Some("webhooks"));
        assert_eq!(client.calls(), vec![Operation::Create, Operation::Get]);
    }

    #[tokio::test]
    async fn test_create_failure_tracks_nothing() {
        let client = MockClient::default();
        client.fail_next(Operation::Create, ErrorKind::Timeout);

        let error = resource(&client).create(github()).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Create);
        assert!(error.to_string().contains("failed to create webhooks integration"));
        assert!(error.to_string().contains("timeout"));
        assert!(client.remote().is_none());
    }

    #[tokio::test]
    async fn test_create_fails_when_readback_fails() {
        let client = MockClient::default();
        client.fail_next(Operation::Get, ErrorKind::ServiceUnavailable);

        let error = resource(&client).create(github()).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Create);
        assert!(error.to_string().contains("after create"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_without_remote_calls() {
        let client = MockClient::default();
        let desired = attributes(json!({ "name": "github" }));

        let error = resource(&client).create(desired).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Translation);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_reflects_outside_changes() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        let changed = client
            .remote()
            .unwrap()
            .with_webhook("deploy", "https://x/deploy")
            .with_encode_as_form(true);
        client.set_remote(Some(changed));

        let record = resource.read(&mut data).await.unwrap().unwrap();
        assert_eq!(record.hooks.len(), 2);
        assert!(record.encode_as_form);
        assert_eq!(data.get("encode_as_form"), Some(&json!(true)));
        assert_eq!(data.get("hooks").and_then(Value::as_array).map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_read_and_exists_agree_on_absence() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();
        let before = data.attributes().clone();

        client.set_remote(None);

        assert_eq!(resource.read(&mut data).await.unwrap(), None);
        assert!(!resource.exists("github").await.unwrap());
        assert_eq!(data.tracking(), &Tracking::Orphaned("github".into()));
        assert_eq!(data.attributes(), &before);
    }

    #[tokio::test]
    async fn test_read_retracks_reappeared_integration() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();
        let remote = client.remote();

        client.set_remote(None);
        resource.read(&mut data).await.unwrap();
        client.set_remote(remote);

        assert!(resource.read(&mut data).await.unwrap().is_some());
        assert!(resource.exists("github").await.unwrap());
        assert_eq!(data.tracking(), &Tracking::Tracked("github".into()));
    }

    #[tokio::test]
    async fn test_read_surfaces_transport_errors() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        client.fail_next(Operation::Get, ErrorKind::NetworkError);
        let error = resource.read(&mut data).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::NetworkError);
        assert_eq!(error.context.as_deref(), Some("reading webhooks integration"));
        assert_eq!(data.tracking(), &Tracking::Tracked("github".into()));
    }

    #[tokio::test]
    async fn test_untracked_data_reads_absent_but_cannot_be_updated() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = ResourceData::new(github());
        let before = data.clone();

        assert_eq!(resource.read(&mut data).await.unwrap(), None);
        assert_eq!(data, before);

        let error = resource.update(&mut data, github()).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_whole_configuration() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        let desired = attributes(json!({
            "name": "github",
            "url": "https://x/other",
            "headers": "{\"X-Token\":\"abc\"}",
            "hooks": [{ "name": "deploy", "url": "https://x/deploy" }],
        }));
        resource.update(&mut data, desired.clone()).await.unwrap();

        let expected = to_remote(&WebhooksRecord::from_attributes(&desired).unwrap());
        assert_eq!(client.remote(), Some(expected));
        assert_eq!(data.get("url"), Some(&json!("https://x/other")));
        assert_eq!(client.call_count(Operation::Update), 1);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_previous_state() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();
        let before = data.clone();
        let remote_before = client.remote();

        client.fail_next(Operation::Update, ErrorKind::RateLimited);
        let mut desired = github();
        desired.insert("url".into(), json!("https://x/other"));

        let error = resource.update(&mut data, desired.clone()).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Update);
        assert_eq!(data, before);
        assert_eq!(client.remote(), remote_before);

        // The gate was released on the error path.
        assert!(resource.update(&mut data, desired).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_input() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        let mut desired = github();
        desired.insert("hooks".into(), json!([{ "name": "pr", "url": "" }]));

        let error = resource.update(&mut data, desired).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Translation);
        assert_eq!(client.call_count(Operation::Update), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();
        let mut stale = data.clone();

        resource.delete(&mut data).await.unwrap();
        assert_eq!(data.tracking(), &Tracking::Untracked);
        assert!(client.remote().is_none());

        resource.delete(&mut stale).await.unwrap();
        assert_eq!(stale.tracking(), &Tracking::Untracked);
        assert_eq!(client.call_count(Operation::Delete), 2);

        resource.delete(&mut data).await.unwrap();
        assert_eq!(client.call_count(Operation::Delete), 2);

        assert_eq!(resource.read(&mut data).await.unwrap(), None);
        assert!(!resource.exists("github").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_and_exists_agree_after_delete() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        resource.delete(&mut data).await.unwrap();

        assert!(!resource.exists("github").await.unwrap());
        assert_eq!(resource.read(&mut data).await.unwrap(), None);
        assert_eq!(data.tracking(), &Tracking::Untracked);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_tracking() {
        let client = MockClient::default();
        let resource = resource(&client);
        let mut data = resource.create(github()).await.unwrap();

        client.fail_next(Operation::Delete, ErrorKind::Authorization);
        let error = resource.delete(&mut data).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Delete);
        assert_eq!(data.tracking(), &Tracking::Tracked("github".into()));
        assert!(client.remote().is_some());
    }

    #[tokio::test]
    async fn test_import_adopts_existing_integration() {
        let client = MockClient::default();
        client.set_remote(Some(
            IntegrationConfig::new("webhooks", "https://x/hook")
                .with_webhook("pr", "https://x/pr")
                .with_custom_payload(false, "template"),
        ));

        let data = resource(&client).import("anything").await.unwrap();
        assert_eq!(data.id(), Some("webhooks"));

        let record = data.record().unwrap();
        assert_eq!(record.hooks.len(), 1);
        assert!(!record.use_custom_payload);
        assert_eq!(record.custom_payload, "template");
        assert_eq!(client.calls(), vec![Operation::Get]);
    }

    #[tokio::test]
    async fn test_import_missing_integration_fails() {
        let client = MockClient::default();
        let resource = resource(&client);

        let error = resource.import("webhooks").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Import);
        assert!(error.to_string().contains("no webhooks integration exists"));

        let error = resource.import("  ").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Import);
    }

    #[tokio::test]
    async fn test_import_falls_back_to_raw_id_without_remote_name() {
        let client = MockClient::default();
        client.set_remote(Some(
            IntegrationConfig::new("", "https://x/hook").with_webhook("pr", "https://x/pr"),
        ));

        let data = resource(&client).import("  webhooks ").await.unwrap();
        assert_eq!(data.id(), Some("webhooks"));
        assert_eq!(data.get("hooks").and_then(Value::as_array).map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_import_surfaces_transport_errors() {
        let client = MockClient::default();
        client.set_remote(Some(IntegrationConfig::new("webhooks", "https://x/hook")));
        client.fail_next(Operation::Get, ErrorKind::Authentication);

        let error = resource(&client).import("webhooks").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Import);
        assert!(error.to_string().contains("failed to import webhooks integration"));
        assert!(error.to_string().contains("authentication"));
    }

    #[tokio::test]
    async fn test_exists_surfaces_transport_errors() {
        let client = MockClient::default();
        client.set_remote(Some(IntegrationConfig::new("webhooks", "https://x/hook")));
        client.fail_next(Operation::Get, ErrorKind::ServiceUnavailable);

        let resource = resource(&client);
        let error = resource.exists("webhooks").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(error.context.as_deref(), Some("checking webhooks integration"));

        assert!(resource.exists("webhooks").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_do_not_interleave() {
        let client = MockClient::with_staged_updates(Duration::from_millis(25));
        let context = ProviderContext::new(client.clone());
        let data = WebhooksResource::new(context.clone())
            .create(github())
            .await
            .unwrap();

        let first = attributes(json!({
            "name": "github",
            "url": "https://x/first",
            "hooks": [{ "name": "first", "url": "https://x/1" }],
        }));
        let second = attributes(json!({
            "name": "github",
            "url": "https://x/second",
            "encode_as_form": true,
            "hooks": [
                { "name": "second", "url": "https://x/2" },
                { "name": "second-b", "url": "https://x/2b" },
            ],
        }));

        let tasks = [first.clone(), second.clone()].map(|desired| {
            let resource = WebhooksResource::new(context.clone());
            let mut data = data.clone();
            tokio::spawn(async move { resource.update(&mut data, desired).await })
        });

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let remote = client.remote().unwrap();
        let candidates = [first, second]
            .map(|desired| to_remote(&WebhooksRecord::from_attributes(&desired).unwrap()));

        assert!(candidates.contains(&remote), "interleaved result: {remote:?}");
        assert_eq!(client.peak_concurrent_mutations(), 1);
    }
}
