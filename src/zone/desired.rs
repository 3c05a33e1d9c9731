//! The user-declared target state of a zone.
//!
//! Each field distinguishes "not specified" (`None`, left untouched) from an
//! explicit value. Metadata is all-or-nothing: when the map is given, keys
//! missing from it are reset to their defaults on update.
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::ZoneKind;
use crate::metadata::MetadataValue;
use crate::metadata::registry::MetadataRegistry;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredProperties {
    pub kind: Option<ZoneKind>,
    pub account: Option<String>,
    /// SOA nameservers; used when creating non-Slave zones.
    pub nameservers: Option<Vec<String>>,
    /// Master addresses; only meaningful for Slave zones.
    pub masters: Option<Vec<String>>,
}

impl DesiredProperties {
    /// Desired account, `None` when unspecified or empty.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref().filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredSpec {
    pub properties: DesiredProperties,
    /// `None` leaves metadata unmanaged.
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
}

// On-disk layout of a desired-state file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DesiredDocument {
    #[serde(default)]
    properties: DesiredProperties,
    metadata: Option<Map<String, Value>>,
}

impl DesiredSpec {
    pub fn from_json_str(
        input: &str,
        registry: &MetadataRegistry,
    ) -> Result<Self, ValidationError> {
        let doc: DesiredDocument = serde_json::from_str(input)?;
        let metadata = doc
            .metadata
            .map(|raw| registry.parse_desired(&raw))
            .transpose()?;
        Ok(Self {
            properties: doc.properties,
            metadata,
        })
    }

    pub fn load(path: &Path, registry: &MetadataRegistry) -> anyhow::Result<Self> {
        use anyhow::Context;

        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read desired state {}", path.display()))?;
        Self::from_json_str(&input, registry)
            .with_context(|| format!("invalid desired state {}", path.display()))
    }
}
