//! PowerDNS Authoritative HTTP API: the operations the reconciler needs
//! and the reqwest-backed client implementing them.

pub mod client;
pub mod types;

use async_trait::async_trait;
use types::*;

#[derive(Debug, thiserror::Error)]
pub enum PdnsError {
    #[error("PowerDNS {0}: not found")]
    NotFound(&'static str),

    #[error("PowerDNS {op} failed with {status}: {body}")]
    Status {
        op: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("PowerDNS request failed")]
    Http(#[from] reqwest::Error),

    #[error("invalid PowerDNS API URL: {0}")]
    InvalidUrl(String),
}

/// Zone management surface of the PowerDNS API, scoped to one server.
///
/// Implementations do one round-trip per call and never retry; the
/// reconciler decides what to call and in which order.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// Zones whose name matches `zone` exactly (zero or one expected).
    async fn list_zones(&self, zone: &str) -> Result<Vec<PdnsZoneSummary>, PdnsError>;

    async fn list_zone(&self, zone_id: &str) -> Result<PdnsZone, PdnsError>;

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> Result<PdnsZoneSummary, PdnsError>;

    async fn put_zone(&self, zone_id: &str, patch: &PdnsZonePatch) -> Result<(), PdnsError>;

    async fn delete_zone(&self, zone_id: &str) -> Result<(), PdnsError>;

    async fn notify_zone(&self, zone_id: &str) -> Result<(), PdnsError>;

    async fn axfr_retrieve_zone(&self, zone_id: &str) -> Result<(), PdnsError>;

    async fn list_metadata(&self, zone_id: &str) -> Result<Vec<PdnsMetadata>, PdnsError>;

    /// Replace all records of `kind` with `metadata`.
    async fn modify_metadata(
        &self,
        zone_id: &str,
        kind: &str,
        metadata: &[String],
    ) -> Result<(), PdnsError>;

    async fn delete_metadata(&self, zone_id: &str, kind: &str) -> Result<(), PdnsError>;
}
