#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod types;

pub mod client;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use client::{IntegrationClient, IntegrationService, Operation};
pub use config::{
    ClientCredentials, ClientParams, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, IntoClient,
    ProviderConfig,
};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use types::{IntegrationConfig, Webhook};
