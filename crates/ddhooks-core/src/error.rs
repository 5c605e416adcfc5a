//! Structured error handling for the webhooks integration.

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while reconciling the integration.
///
/// The first group classifies failures reported by a client implementation.
/// The second group names the lifecycle operation that failed and is only
/// produced by the resource controller when it wraps a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed.
    InvalidInput,
    /// Network-related error occurred.
    NetworkError,
    /// Authentication failed.
    Authentication,
    /// Authorization failed.
    Authorization,
    /// Rate limit exceeded.
    RateLimited,
    /// Service temporarily unavailable.
    ServiceUnavailable,
    /// Internal error.
    InternalError,
    /// The remote service rejected the request.
    ExternalError,
    /// Configuration error.
    Configuration,
    /// The remote integration does not exist.
    NotFound,
    /// Timeout occurred.
    Timeout,
    /// Serialization/deserialization error.
    Serialization,

    /// Desired state could not be translated into a remote configuration.
    Translation,
    /// Creating the remote integration failed.
    Create,
    /// Replacing the remote integration failed.
    Update,
    /// Deleting the remote integration failed.
    Delete,
    /// Adopting an existing remote integration failed.
    Import,

    /// Unknown error occurred.
    #[default]
    Unknown,
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<HipStr<'static>>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    /// Wraps an error under a lifecycle operation kind.
    ///
    /// The message reads `"{action}: {cause}"` so the operation and the
    /// underlying failure are both visible in the rendered error.
    pub fn operation(kind: ErrorKind, action: &'static str, cause: Error) -> Self {
        Self::new(kind)
            .with_message(format!("{action}: {cause}"))
            .with_source(cause)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new external error.
    pub fn external_error() -> Self {
        Self::new(ErrorKind::ExternalError)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new translation error.
    pub fn translation() -> Self {
        Self::new(ErrorKind::Translation)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<HipStr<'static>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if the remote integration was reported absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Unknown);
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert!(error.message.is_none());
        assert!(error.source.is_none());
        assert!(error.context.is_none());
    }

    #[test]
    fn test_error_builder_pattern() {
        let error = Error::new(ErrorKind::Configuration)
            .with_message("bad config")
            .with_context("additional context");

        assert_eq!(error.kind, ErrorKind::Configuration);
        assert_eq!(error.message.as_deref(), Some("bad config"));
        assert_eq!(error.context.as_deref(), Some("additional context"));
    }

    #[test]
    fn test_error_display() {
        let error = Error::translation().with_message("missing required attribute `name`");

        let display_str = error.to_string();
        assert_eq!(display_str, "[translation]: missing required attribute `name`");
    }

    #[test]
    fn test_operation_keeps_cause() {
        let cause = Error::network_error().with_message("connection reset");
        let error = Error::operation(ErrorKind::Create, "failed to create webhooks integration", cause);

        assert_eq!(error.kind(), ErrorKind::Create);
        assert_eq!(
            error.to_string(),
            "[create]: failed to create webhooks integration: [network_error]: connection reset"
        );

        let source = error.source().expect("source is kept");
        assert_eq!(source.to_string(), "[network_error]: connection reset");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found().is_not_found());
        assert!(!Error::network_error().is_not_found());
    }

    #[test]
    fn test_default() {
        assert_eq!(ErrorKind::default(), ErrorKind::Unknown);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(ErrorKind::from_str("not_found").unwrap(), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_str("delete").unwrap(), ErrorKind::Delete);
        assert!(ErrorKind::from_str("invalid").is_err());
    }
}
