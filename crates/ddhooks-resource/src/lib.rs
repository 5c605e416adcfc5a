#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod context;
mod data;
mod record;
mod schema;
mod serializer;
mod translate;

pub mod lifecycle;

pub use context::ProviderContext;
pub use data::{Attributes, ResourceData, Tracking};
pub use lifecycle::WebhooksResource;
pub use record::{HookEntry, WebhooksRecord};
pub use schema::{Attribute, AttributeType, HOOK_ATTRIBUTES, ResourceSchema, WEBHOOKS_SCHEMA};
pub use serializer::{Mutation, MutationGuard, MutationSerializer};
pub use translate::{from_remote, to_remote};
