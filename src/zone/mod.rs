//! In-memory view of a zone: what the server reports and what the user wants.

pub mod desired;
pub mod diff;
pub mod reader;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::metadata::MetadataValue;
pub use crate::powerdns::types::ZoneKind;

/// Zone-info fields PowerDNS reports on the zone itself that are presented
/// alongside metadata but are not managed through the metadata API.
pub const SERVER_REPORTED_KEYS: [&str; 5] = [
    "api_rectify",
    "nsec3narrow",
    "nsec3param",
    "soa_edit",
    "soa_edit_api",
];

/// Properties of a zone that exists on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneState {
    #[serde(skip)]
    pub id: String,
    pub kind: ZoneKind,
    pub serial: u64,
    pub account: String,
    pub dnssec: bool,
    pub masters: Vec<String>,
    /// Every registered metadata key plus [`SERVER_REPORTED_KEYS`].
    pub metadata: BTreeMap<String, MetadataValue>,
}

/// A zone at one point in time. Rebuilt from the server after every
/// mutation, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSnapshot {
    pub name: String,
    pub exists: bool,
    #[serde(flatten)]
    pub state: Option<ZoneState>,
}

impl ZoneSnapshot {
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: false,
            state: None,
        }
    }

    pub fn present(name: impl Into<String>, state: ZoneState) -> Self {
        Self {
            name: name.into(),
            exists: true,
            state: Some(state),
        }
    }

    pub fn kind(&self) -> Option<ZoneKind> {
        self.state.as_ref().map(|s| s.kind)
    }
}
