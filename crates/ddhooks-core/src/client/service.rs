//! Integration client wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{IntegrationClient, Operation, TRACING_TARGET};
use crate::{IntegrationConfig, Result};

/// Integration client wrapper with observability.
///
/// This wrapper adds structured logging to any [`IntegrationClient`]
/// implementation. The inner client is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct IntegrationService {
    inner: Arc<dyn IntegrationClient>,
}

impl fmt::Debug for IntegrationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationService").finish_non_exhaustive()
    }
}

impl IntegrationService {
    /// Creates a new integration service wrapper.
    pub fn new<C>(client: C) -> Self
    where
        C: IntegrationClient + 'static,
    {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Fetches the current configuration.
    pub async fn get(&self) -> Result<IntegrationConfig> {
        let started_at = Instant::now();
        let result = self.inner.get().await;

        if let Ok(config) = &result {
            tracing::debug!(
                target: TRACING_TARGET,
                name = %config.name,
                hooks = config.webhooks.len(),
                elapsed_ms = started_at.elapsed().as_millis(),
                "Fetched webhooks integration"
            );
        }

        Self::log_failure(Operation::Get, started_at, result)
    }

    /// Creates the configuration.
    pub async fn create(&self, config: &IntegrationConfig) -> Result<()> {
        let started_at = Instant::now();
        let result = self.inner.create(config).await;
        Self::log_mutation(Operation::Create, config, started_at, result)
    }

    /// Replaces the configuration wholesale.
    pub async fn update(&self, config: &IntegrationConfig) -> Result<()> {
        let started_at = Instant::now();
        let result = self.inner.update(config).await;
        Self::log_mutation(Operation::Update, config, started_at, result)
    }

    /// Removes the configuration.
    pub async fn delete(&self) -> Result<()> {
        let started_at = Instant::now();
        let result = self.inner.delete().await;

        if result.is_ok() {
            tracing::debug!(
                target: TRACING_TARGET,
                operation = %Operation::Delete,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Remote call completed"
            );
        }

        Self::log_failure(Operation::Delete, started_at, result)
    }

    fn log_mutation(
        operation: Operation,
        config: &IntegrationConfig,
        started_at: Instant,
        result: Result<()>,
    ) -> Result<()> {
        if result.is_ok() {
            tracing::debug!(
                target: TRACING_TARGET,
                operation = %operation,
                name = %config.name,
                hooks = config.webhooks.len(),
                elapsed_ms = started_at.elapsed().as_millis(),
                "Remote call completed"
            );
        }

        Self::log_failure(operation, started_at, result)
    }

    fn log_failure<T>(operation: Operation, started_at: Instant, result: Result<T>) -> Result<T> {
        match &result {
            Err(error) if error.is_not_found() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    operation = %operation,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "Webhooks integration not found"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    operation = %operation,
                    error = %error,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "Remote call failed"
                );
            }
            Ok(_) => {}
        }

        result
    }
}
