//! Remote integration client abstraction.
//!
//! The client talks to the remote monitoring service. It is implemented
//! outside this workspace (an HTTP client with its own auth, retry and
//! timeout handling); the lifecycle code only sees [`IntegrationClient`].

mod service;

use strum::{AsRefStr, Display, IntoStaticStr};

pub use service::IntegrationService;

use crate::{IntegrationConfig, Result};

/// Tracing target for remote client calls.
pub const TRACING_TARGET: &str = "ddhooks_core::client";

/// The four calls the remote service exposes for the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Fetch the current configuration.
    Get,
    /// Create the configuration.
    Create,
    /// Replace the configuration wholesale.
    Update,
    /// Remove the configuration.
    Delete,
}

impl Operation {
    /// Returns `true` if the call changes remote state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// Access to the account-wide webhooks integration.
///
/// Implementations report a missing integration with
/// [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) and any other failure
/// with the kind that best describes it.
#[async_trait::async_trait]
pub trait IntegrationClient: Send + Sync {
    /// Fetches the current configuration.
    async fn get(&self) -> Result<IntegrationConfig>;

    /// Creates the configuration.
    async fn create(&self, config: &IntegrationConfig) -> Result<()>;

    /// Replaces the configuration wholesale.
    async fn update(&self, config: &IntegrationConfig) -> Result<()>;

    /// Removes the configuration.
    async fn delete(&self) -> Result<()>;
}
