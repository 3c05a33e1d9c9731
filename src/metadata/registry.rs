//! Catalog of the metadata kinds this crate manages.
use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use super::{MetadataAction, MetadataValue, MetadataVariant};
use crate::validation::ValidationError;

/// Kinds managed on every zone, in PowerDNS wire spelling.
pub const POWERDNS_METADATA: &[(&str, MetadataVariant)] = &[
    ("ALLOW-AXFR-FROM", MetadataVariant::ListValue),
    ("ALLOW-DNSUPDATE-FROM", MetadataVariant::ListValue),
    ("ALSO-NOTIFY", MetadataVariant::ListValue),
    ("AXFR-MASTER-TSIG", MetadataVariant::StringValue),
    ("AXFR-SOURCE", MetadataVariant::StringValue),
    ("FORWARD-DNSUPDATE", MetadataVariant::BinaryPresence),
    ("GSS-ACCEPTOR-PRINCIPAL", MetadataVariant::StringValue),
    ("GSS-ALLOW-AXFR-PRINCIPAL", MetadataVariant::StringValue),
    ("IXFR", MetadataVariant::BinaryValue),
    ("LUA-AXFR-SCRIPT", MetadataVariant::StringValue),
    ("NOTIFY-DNSUPDATE", MetadataVariant::BinaryValue),
    ("PUBLISH-CDNSKEY", MetadataVariant::BinaryValue),
    ("PUBLISH-CDS", MetadataVariant::ListValue),
    ("SLAVE-RENOTIFY", MetadataVariant::TernaryValue),
    ("SOA-EDIT-DNSUPDATE", MetadataVariant::StringValue),
    ("TSIG-ALLOW-AXFR", MetadataVariant::ListValue),
    ("TSIG-ALLOW-DNSUPDATE", MetadataVariant::ListValue),
];

/// Kinds whose string value must be one of a fixed set (empty means unset).
const VALUE_CHOICES: &[(&str, &[&str], &str)] = &[(
    "SOA-EDIT-DNSUPDATE",
    &["DEFAULT", "INCREASE", "EPOCH", "SOA-EDIT", "SOA-EDIT-INCREASE"],
    "one of DEFAULT, INCREASE, EPOCH, SOA-EDIT, SOA-EDIT-INCREASE",
)];

lazy_static::lazy_static! {
    static ref STANDARD: MetadataRegistry =
        MetadataRegistry::new(POWERDNS_METADATA.iter().copied())
            .expect("built-in metadata table has unique kinds");
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("metadata kind '{0}' registered twice")]
    DuplicateKind(String),
    #[error("metadata key '{0}' registered twice")]
    DuplicateWireKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDescriptor {
    /// Kind name as the API spells it, e.g. `ALLOW-AXFR-FROM`.
    pub kind: String,
    /// Key used in desired state and reports, e.g. `allow_axfr_from`.
    pub wire_key: String,
    pub variant: MetadataVariant,
}

/// One pending metadata call produced by planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataChange {
    pub kind: String,
    pub wire_key: String,
    pub action: MetadataAction,
}

/// Immutable table of metadata descriptors, indexed both ways.
#[derive(Debug)]
pub struct MetadataRegistry {
    descriptors: Vec<MetadataDescriptor>,
    by_kind: HashMap<String, usize>,
    by_wire_key: HashMap<String, usize>,
}

/// `ALLOW-AXFR-FROM` -> `allow_axfr_from`
pub fn wire_key_for(kind: &str) -> String {
    kind.to_ascii_lowercase().replace('-', "_")
}

impl MetadataRegistry {
    pub fn new<'a, I>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'a str, MetadataVariant)>,
    {
        let mut registry = MetadataRegistry {
            descriptors: Vec::new(),
            by_kind: HashMap::new(),
            by_wire_key: HashMap::new(),
        };
        for (kind, variant) in entries {
            registry.register(kind, variant)?;
        }
        Ok(registry)
    }

    /// The process-wide table of PowerDNS kinds.
    pub fn standard() -> &'static MetadataRegistry {
        &STANDARD
    }

    fn register(&mut self, kind: &str, variant: MetadataVariant) -> Result<(), RegistryError> {
        let wire_key = wire_key_for(kind);
        if self.by_kind.contains_key(kind) {
            return Err(RegistryError::DuplicateKind(kind.to_string()));
        }
        if self.by_wire_key.contains_key(&wire_key) {
            return Err(RegistryError::DuplicateWireKey(wire_key));
        }

        let idx = self.descriptors.len();
        self.by_kind.insert(kind.to_string(), idx);
        self.by_wire_key.insert(wire_key.clone(), idx);
        self.descriptors.push(MetadataDescriptor {
            kind: kind.to_string(),
            wire_key,
            variant,
        });
        Ok(())
    }

    pub fn lookup_by_kind(&self, kind: &str) -> Option<&MetadataDescriptor> {
        self.by_kind.get(kind).map(|&i| &self.descriptors[i])
    }

    pub fn lookup_by_wire_key(&self, key: &str) -> Option<&MetadataDescriptor> {
        self.by_wire_key.get(key).map(|&i| &self.descriptors[i])
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &MetadataDescriptor> {
        self.descriptors.iter()
    }

    /// Every registered key at its default value.
    pub fn all_defaults(&self) -> BTreeMap<String, MetadataValue> {
        self.descriptors
            .iter()
            .map(|d| (d.wire_key.clone(), d.variant.default_value()))
            .collect()
    }

    /// Changes needed to move an existing zone from `old` to `new`.
    ///
    /// Walks every registered kind, not just the keys in `new`: a key missing
    /// from `new` is reset to its default.
    pub fn plan_update(
        &self,
        old: &BTreeMap<String, MetadataValue>,
        new: &BTreeMap<String, MetadataValue>,
    ) -> Vec<MetadataChange> {
        let mut changes = Vec::new();
        for d in &self.descriptors {
            let default = d.variant.default_value();
            let old_value = old.get(&d.wire_key).unwrap_or(&default);
            let new_value = new.get(&d.wire_key).unwrap_or(&default);

            let action = d.variant.encode_for_update(old_value, new_value);
            if action == MetadataAction::NoOp {
                continue;
            }
            debug!(kind = %d.kind, ?action, "metadata differs");
            changes.push(MetadataChange {
                kind: d.kind.clone(),
                wire_key: d.wire_key.clone(),
                action,
            });
        }
        changes
    }

    /// Writes needed to apply `new` to a freshly created zone. Never deletes.
    pub fn plan_set(&self, new: &BTreeMap<String, MetadataValue>) -> Vec<MetadataChange> {
        self.descriptors
            .iter()
            .filter_map(|d| {
                let value = new.get(&d.wire_key)?;
                let payload = d.variant.encode_for_set(value)?;
                Some(MetadataChange {
                    kind: d.kind.clone(),
                    wire_key: d.wire_key.clone(),
                    action: MetadataAction::Modify(payload),
                })
            })
            .collect()
    }

    /// Parse a user-supplied `{wire_key: value}` object against the table.
    pub fn parse_desired(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<BTreeMap<String, MetadataValue>, ValidationError> {
        raw.iter()
            .map(|(key, value)| -> Result<(String, MetadataValue), ValidationError> {
                let d = self
                    .lookup_by_wire_key(key)
                    .ok_or_else(|| ValidationError::UnknownMetadata(key.clone()))?;
                let parsed = d.variant.parse_json(value).map_err(|expected| {
                    ValidationError::InvalidMetadataValue {
                        key: key.clone(),
                        expected,
                    }
                })?;
                check_choice(&d.kind, &parsed).map_err(|expected| {
                    ValidationError::InvalidMetadataValue {
                        key: key.clone(),
                        expected,
                    }
                })?;
                Ok((key.clone(), parsed))
            })
            .collect()
    }
}

fn check_choice(kind: &str, value: &MetadataValue) -> Result<(), &'static str> {
    let MetadataValue::String(s) = value else {
        return Ok(());
    };
    match VALUE_CHOICES.iter().find(|(k, _, _)| *k == kind) {
        Some((_, allowed, expected)) if !s.is_empty() && !allowed.contains(&s.as_str()) => {
            Err(*expected)
        }
        _ => Ok(()),
    }
}
