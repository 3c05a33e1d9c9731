use serde::{Deserialize, Serialize};
use std::fmt;

/// Replication role of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ZoneKind {
    Native,
    Master,
    Slave,
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ZoneKind::Native => "Native",
            ZoneKind::Master => "Master",
            ZoneKind::Slave => "Slave",
        };
        f.write_str(s)
    }
}

// Entry of GET /zones?zone=...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsZoneSummary {
    pub id: String,   // "example.com."
    pub name: String, // "example.com."
}

// GET /zones/{zone_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsZone {
    pub id: String,
    pub name: String,
    pub kind: ZoneKind,
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default)]
    pub api_rectify: bool,
    #[serde(default)]
    pub nsec3narrow: bool,
    #[serde(default)]
    pub nsec3param: String,
    #[serde(default)]
    pub soa_edit: String,
    #[serde(default)]
    pub soa_edit_api: String,
}

// Used when creating a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsZoneCreate {
    pub name: String, // "d2.example."
    pub kind: ZoneKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>, // ["ns1.example."], non-Slave only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>, // ["192.0.2.1"], Slave only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

// Body of PUT /zones/{zone_id}; only the fields that changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsZonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ZoneKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl PdnsZonePatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.masters.is_none() && self.account.is_none()
    }
}

// GET /zones/{zone_id}/metadata, PUT /zones/{zone_id}/metadata/{kind}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsMetadata {
    pub kind: String,
    #[serde(default)]
    pub metadata: Vec<String>,
}
