//! Process-wide serialization of mutating calls.
//!
//! The remote integration is a singleton, so every create, update and
//! delete issued by this process targets the same object. They are run one
//! at a time behind a single mutex. Reads do not take it.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use strum::{AsRefStr, Display, IntoStaticStr};
use tokio::sync::{Mutex, MutexGuard};

/// Tracing target for serializer operations.
pub const TRACING_TARGET: &str = "ddhooks_resource::serializer";

/// A mutating lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Mutation {
    /// Creating the integration.
    Create,
    /// Replacing the integration.
    Update,
    /// Deleting the integration.
    Delete,
}

/// Mutual-exclusion gate for mutating operations.
///
/// Clones share the same gate. Acquisition waits without a timeout; a
/// stuck remote call blocks every later mutation until it returns.
#[derive(Clone, Default)]
pub struct MutationSerializer {
    gate: Arc<Mutex<()>>,
}

impl fmt::Debug for MutationSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationSerializer")
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl MutationSerializer {
    /// Creates a new, unlocked serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other mutation is running and claims the gate.
    ///
    /// The gate is released when the returned guard is dropped.
    pub async fn acquire(&self, mutation: Mutation) -> MutationGuard<'_> {
        let started_at = Instant::now();
        let guard = self.gate.lock().await;

        tracing::trace!(
            target: TRACING_TARGET,
            mutation = %mutation,
            waited_ms = started_at.elapsed().as_millis(),
            "Mutation gate acquired"
        );

        MutationGuard {
            _guard: guard,
            mutation,
            acquired_at: Instant::now(),
        }
    }

    /// Returns `true` while a mutation holds the gate.
    pub fn is_locked(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}

/// Scoped claim on the [`MutationSerializer`].
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct MutationGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    mutation: Mutation,
    acquired_at: Instant,
}

impl MutationGuard<'_> {
    /// Returns the mutation holding the gate.
    pub fn mutation(&self) -> Mutation {
        self.mutation
    }
}

impl fmt::Debug for MutationGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationGuard")
            .field("mutation", &self.mutation)
            .finish_non_exhaustive()
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        tracing::trace!(
            target: TRACING_TARGET,
            mutation = %self.mutation,
            held_ms = self.acquired_at.elapsed().as_millis(),
            "Releasing mutation gate"
        );
    }
}
