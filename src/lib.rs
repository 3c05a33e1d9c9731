//! Crate entrypoint wiring together the metadata catalog, zone model,
//! PowerDNS client, and the reconciliation engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod powerdns;
pub mod validation;
pub mod zone;

pub use engine::{Reconciler, RequestedState, ZoneReport};
pub use error::ZoneError;
pub use metadata::registry::MetadataRegistry;
pub use powerdns::ZoneApi;
pub use powerdns::client::PowerDnsClient;
pub use zone::desired::{DesiredProperties, DesiredSpec};
pub use zone::{ZoneKind, ZoneSnapshot};
