//! In-memory integration client for testing.
//!
//! [`MockClient`] keeps the account-wide integration in memory and behaves
//! like the remote service: a second create is rejected, update and delete
//! of a missing integration report `NotFound`. Clones share the same state,
//! so a test can hand one clone to the code under test and keep another to
//! inspect calls or to change the remote configuration behind its back.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! ddhooks-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Operation;
use crate::{
    ClientCredentials, ClientParams, Error, ErrorKind, IntegrationClient, IntegrationConfig,
    IntoClient, Result,
};

/// Configuration for the mock client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    /// Name the service assigns on create, replacing the requested one.
    #[serde(default)]
    pub canonical_name: Option<String>,

    /// Simulated latency of every remote call.
    #[serde(default)]
    pub latency: Duration,

    /// Apply updates in two steps with the latency in between, so that
    /// overlapping updates would leave a mix of both configurations.
    #[serde(default)]
    pub staged_updates: bool,
}

#[derive(Debug, Default)]
struct MockState {
    remote: Option<IntegrationConfig>,
    calls: Vec<Operation>,
    failures: HashMap<Operation, ErrorKind>,
}

#[derive(Debug, Default)]
struct MockInner {
    config: MockConfig,
    state: Mutex<MockState>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// In-memory stand-in for the remote integration client.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    inner: Arc<MockInner>,
}

/// Decrements the in-flight counter when a mutating call returns.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockClient {
    /// Creates a new mock client with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        Self {
            inner: Arc::new(MockInner {
                config,
                ..Default::default()
            }),
        }
    }

    /// Creates a mock client whose service renames the integration on create.
    pub fn with_canonical_name(name: impl Into<String>) -> Self {
        Self::new(MockConfig {
            canonical_name: Some(name.into()),
            ..Default::default()
        })
    }

    /// Creates a mock client with simulated latency and staged updates.
    pub fn with_staged_updates(latency: Duration) -> Self {
        Self::new(MockConfig {
            latency,
            staged_updates: true,
            ..Default::default()
        })
    }

    /// Returns a snapshot of the remote configuration.
    pub fn remote(&self) -> Option<IntegrationConfig> {
        self.state().remote.clone()
    }

    /// Replaces the remote configuration without going through the client
    /// API, as an actor outside the provider would.
    pub fn set_remote(&self, config: Option<IntegrationConfig>) {
        self.state().remote = config;
    }

    /// Makes the next call of `operation` fail with `kind`.
    pub fn fail_next(&self, operation: Operation, kind: ErrorKind) {
        self.state().failures.insert(operation, kind);
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state().calls.clone()
    }

    /// Returns how many calls of `operation` were received.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state().calls.iter().filter(|op| **op == operation).count()
    }

    /// Returns the highest number of mutating calls observed running at once.
    pub fn peak_concurrent_mutations(&self) -> usize {
        self.inner.peak_in_flight.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and returns the injected failure, if any.
    fn begin(&self, operation: Operation) -> Result<()> {
        let mut state = self.state();
        state.calls.push(operation);

        match state.failures.remove(&operation) {
            Some(kind) => Err(Error::new(kind).with_message(format!("injected {operation} failure"))),
            None => Ok(()),
        }
    }

    /// Counts a mutating call as in flight until the returned guard drops.
    fn enter(&self, operation: Operation) -> Option<InFlight<'_>> {
        if !operation.is_mutation() {
            return None;
        }

        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .peak_in_flight
            .fetch_max(current, Ordering::SeqCst);
        Some(InFlight(&self.inner.in_flight))
    }

    async fn pause(&self) {
        if !self.inner.config.latency.is_zero() {
            tokio::time::sleep(self.inner.config.latency).await;
        }
    }

    fn missing() -> Error {
        Error::not_found().with_message("webhooks integration does not exist")
    }
}

#[async_trait::async_trait]
impl IntegrationClient for MockClient {
    async fn get(&self) -> Result<IntegrationConfig> {
        let _in_flight = self.enter(Operation::Get);
        self.begin(Operation::Get)?;
        self.pause().await;
        self.remote().ok_or_else(Self::missing)
    }

    async fn create(&self, config: &IntegrationConfig) -> Result<()> {
        let _in_flight = self.enter(Operation::Create);
        self.begin(Operation::Create)?;
        self.pause().await;

        let mut state = self.state();
        if state.remote.is_some() {
            return Err(Error::external_error()
                .with_message("webhooks integration already exists for this account"));
        }

        let mut stored = config.clone();
        if let Some(name) = &self.inner.config.canonical_name {
            stored.name = name.clone();
        }
        state.remote = Some(stored);

        Ok(())
    }

    async fn update(&self, config: &IntegrationConfig) -> Result<()> {
        let _in_flight = self.enter(Operation::Update);
        self.begin(Operation::Update)?;

        if !self.inner.config.staged_updates {
            self.pause().await;
            let mut state = self.state();
            let remote = state.remote.as_mut().ok_or_else(Self::missing)?;
            *remote = config.clone();
            return Ok(());
        }

        // Scalars first, hooks after the pause.
        {
            let mut state = self.state();
            let remote = state.remote.as_mut().ok_or_else(Self::missing)?;
            let webhooks = std::mem::take(&mut remote.webhooks);
            *remote = IntegrationConfig {
                webhooks,
                ..config.clone()
            };
        }

        self.pause().await;

        let mut state = self.state();
        let remote = state.remote.as_mut().ok_or_else(Self::missing)?;
        remote.webhooks = config.webhooks.clone();

        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        let _in_flight = self.enter(Operation::Delete);
        self.begin(Operation::Delete)?;
        self.pause().await;

        match self.state().remote.take() {
            Some(_) => Ok(()),
            None => Err(Self::missing()),
        }
    }
}

#[async_trait::async_trait]
impl IntoClient for MockClient {
    async fn connect(_params: ClientParams, _credentials: ClientCredentials) -> Result<Self> {
        Ok(Self::default())
    }
}
