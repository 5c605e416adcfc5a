//! Runtime context shared by every resource handler of a provider process.

use ddhooks_core::{IntegrationClient, IntegrationService, IntoClient, ProviderConfig, Result};

use crate::MutationSerializer;
use crate::lifecycle::TRACING_TARGET;

/// Remote client and mutation gate of one provider process.
///
/// Create one context per process and clone it into every handler so they
/// all share the same [`MutationSerializer`].
#[derive(Debug, Clone)]
pub struct ProviderContext {
    client: IntegrationService,
    serializer: MutationSerializer,
}

impl ProviderContext {
    /// Creates a context around an already built client.
    pub fn new<C>(client: C) -> Self
    where
        C: IntegrationClient + 'static,
    {
        Self::from_service(IntegrationService::new(client))
    }

    /// Creates a context around an existing service wrapper.
    pub fn from_service(client: IntegrationService) -> Self {
        Self {
            client,
            serializer: MutationSerializer::new(),
        }
    }

    /// Validates the configuration and builds the client from it.
    pub async fn connect<C>(config: ProviderConfig) -> Result<Self>
    where
        C: IntoClient + 'static,
    {
        config.validate()?;

        tracing::info!(
            target: TRACING_TARGET,
            api_url = %config.params.api_url,
            timeout_secs = config.params.effective_timeout().as_secs(),
            "Connecting webhooks integration client"
        );

        let client = C::connect(config.params, config.credentials).await?;
        Ok(Self::new(client))
    }

    /// Returns the remote client.
    pub fn client(&self) -> &IntegrationService {
        &self.client
    }

    /// Returns the process-wide mutation gate.
    pub fn serializer(&self) -> &MutationSerializer {
        &self.serializer
    }
}
