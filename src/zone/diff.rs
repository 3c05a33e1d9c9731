//! Pure comparison of desired and observed zone state.
use tracing::debug;

use super::desired::{DesiredProperties, DesiredSpec};
use super::{ZoneKind, ZoneState};
use crate::metadata::registry::{MetadataChange, MetadataRegistry};
use crate::metadata::same_members;
use crate::powerdns::types::{PdnsZoneCreate, PdnsZonePatch};
use crate::validation::ValidationError;

/// Everything that has to be sent to converge an existing zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub properties: PdnsZonePatch,
    pub metadata: Vec<MetadataChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.metadata.is_empty()
    }
}

/// Body for creating `name` from the desired properties.
///
/// `nameservers` is only sent for non-Slave kinds and `masters` only for
/// Slave, whatever else was supplied.
pub fn creation_payload(
    name: &str,
    props: &DesiredProperties,
) -> Result<PdnsZoneCreate, ValidationError> {
    let kind = props.kind.ok_or(ValidationError::MissingKind)?;

    let (nameservers, masters) = match kind {
        ZoneKind::Slave => {
            let masters = props
                .masters
                .clone()
                .filter(|m| !m.is_empty())
                .ok_or(ValidationError::MissingMasters)?;
            (None, Some(masters))
        }
        ZoneKind::Native | ZoneKind::Master => {
            (Some(props.nameservers.clone().unwrap_or_default()), None)
        }
    };

    Ok(PdnsZoneCreate {
        name: name.to_string(),
        kind,
        nameservers,
        masters,
        account: props.account().map(str::to_string),
    })
}

/// Partial zone update for an existing zone; empty when nothing differs.
///
/// Masters are compared as sets and only considered when the target kind
/// (desired, or the current one if unspecified) is Slave.
pub fn property_patch(
    props: &DesiredProperties,
    observed: &ZoneState,
) -> Result<PdnsZonePatch, ValidationError> {
    let mut patch = PdnsZonePatch::default();
    let target_kind = props.kind.unwrap_or(observed.kind);

    if target_kind != observed.kind {
        patch.kind = Some(target_kind);
    }

    if target_kind == ZoneKind::Slave {
        match &props.masters {
            Some(masters) if masters.is_empty() => return Err(ValidationError::MissingMasters),
            Some(masters) => {
                if !same_members(masters, &observed.masters) {
                    patch.masters = Some(masters.clone());
                }
            }
            None if observed.kind != ZoneKind::Slave && observed.masters.is_empty() => {
                return Err(ValidationError::MissingMasters);
            }
            None => {}
        }
    }

    if let Some(account) = props.account() {
        if account != observed.account {
            patch.account = Some(account.to_string());
        }
    }

    debug!(?patch, "computed property patch");
    Ok(patch)
}

/// Full change set for converging an existing zone to `desired`.
pub fn plan_changes(
    registry: &MetadataRegistry,
    desired: &DesiredSpec,
    observed: &ZoneState,
) -> Result<ChangeSet, ValidationError> {
    let properties = property_patch(&desired.properties, observed)?;
    let metadata = match &desired.metadata {
        Some(new) => registry.plan_update(&observed.metadata, new),
        None => Vec::new(),
    };
    Ok(ChangeSet {
        properties,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MetadataAction, MetadataValue};
    use std::collections::BTreeMap;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn observed(kind: ZoneKind, masters: &[&str]) -> ZoneState {
        ZoneState {
            id: "d1.example.".into(),
            kind,
            serial: 1,
            account: String::new(),
            dnssec: false,
            masters: strings(masters),
            metadata: MetadataRegistry::standard().all_defaults(),
        }
    }

    fn props(kind: ZoneKind) -> DesiredProperties {
        DesiredProperties {
            kind: Some(kind),
            ..Default::default()
        }
    }

    #[test]
    fn native_creation_carries_nameservers_only() {
        let mut p = props(ZoneKind::Native);
        p.nameservers = Some(strings(&["ns1.example."]));
        p.masters = Some(strings(&["192.0.2.1"]));
        let payload = creation_payload("d2.example.", &p).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "name": "d2.example.",
                "kind": "Native",
                "nameservers": ["ns1.example."],
            })
        );
    }

    #[test]
    fn slave_creation_carries_masters_only() {
        let mut p = props(ZoneKind::Slave);
        p.nameservers = Some(strings(&["ns1.example."]));
        p.masters = Some(strings(&["1.1.1.1", "::1"]));
        p.account = Some("ops".into());
        let payload = creation_payload("d3.example.", &p).unwrap();
        assert_eq!(payload.nameservers, None);
        assert_eq!(payload.masters, Some(strings(&["1.1.1.1", "::1"])));
        assert_eq!(payload.account.as_deref(), Some("ops"));
    }

    #[test]
    fn creation_requires_kind_and_slave_masters() {
        assert!(matches!(
            creation_payload("d.example.", &DesiredProperties::default()),
            Err(ValidationError::MissingKind)
        ));
        assert!(matches!(
            creation_payload("d.example.", &props(ZoneKind::Slave)),
            Err(ValidationError::MissingMasters)
        ));
    }

    #[test]
    fn kind_change_only() {
        let patch = property_patch(&props(ZoneKind::Master), &observed(ZoneKind::Native, &[]))
            .unwrap();
        assert_eq!(
            patch,
            PdnsZonePatch {
                kind: Some(ZoneKind::Master),
                ..Default::default()
            }
        );
    }

    #[test]
    fn masters_compare_as_sets() {
        let mut p = props(ZoneKind::Slave);
        p.masters = Some(strings(&["A", "B"]));
        let patch = property_patch(&p, &observed(ZoneKind::Slave, &["B", "A"])).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn changed_masters_on_slave_are_patched() {
        let mut p = props(ZoneKind::Slave);
        p.masters = Some(strings(&["192.0.2.2"]));
        let patch = property_patch(&p, &observed(ZoneKind::Slave, &["192.0.2.1"])).unwrap();
        assert_eq!(patch.masters, Some(strings(&["192.0.2.2"])));
        assert_eq!(patch.kind, None);
    }

    #[test]
    fn masters_ignored_for_non_slave_target() {
        let mut p = props(ZoneKind::Master);
        p.masters = Some(strings(&["192.0.2.1"]));
        p.nameservers = Some(strings(&["ns1.example."]));
        let patch = property_patch(&p, &observed(ZoneKind::Slave, &["192.0.2.9"])).unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"kind": "Master"})
        );
    }

    #[test]
    fn switching_to_slave_needs_masters() {
        let err = property_patch(&props(ZoneKind::Slave), &observed(ZoneKind::Master, &[]));
        assert!(matches!(err, Err(ValidationError::MissingMasters)));

        let mut p = props(ZoneKind::Slave);
        p.masters = Some(Vec::new());
        let err = property_patch(&p, &observed(ZoneKind::Slave, &["192.0.2.1"]));
        assert!(matches!(err, Err(ValidationError::MissingMasters)));

        p.masters = Some(strings(&["192.0.2.1"]));
        p.nameservers = Some(strings(&["ns1.example."]));
        let patch = property_patch(&p, &observed(ZoneKind::Master, &[])).unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"kind": "Slave", "masters": ["192.0.2.1"]})
        );
    }

    #[test]
    fn unspecified_kind_keeps_current() {
        let p = DesiredProperties {
            masters: Some(strings(&["192.0.2.1"])),
            ..Default::default()
        };
        let patch = property_patch(&p, &observed(ZoneKind::Slave, &["192.0.2.1"])).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn account_patched_only_when_non_empty_and_different() {
        let mut p = props(ZoneKind::Native);
        let obs = observed(ZoneKind::Native, &[]);
        p.account = Some(String::new());
        assert!(property_patch(&p, &obs).unwrap().is_empty());
        p.account = Some("ops".into());
        assert_eq!(
            property_patch(&p, &obs).unwrap().account.as_deref(),
            Some("ops")
        );
    }

    #[test]
    fn metadata_untouched_when_unmanaged() {
        let reg = MetadataRegistry::standard();
        let mut obs = observed(ZoneKind::Native, &[]);
        obs.metadata.insert("ixfr".into(), MetadataValue::Bool(true));
        let desired = DesiredSpec {
            properties: props(ZoneKind::Native),
            metadata: None,
        };
        assert!(plan_changes(reg, &desired, &obs).unwrap().is_empty());

        let desired = DesiredSpec {
            properties: props(ZoneKind::Native),
            metadata: Some(BTreeMap::new()),
        };
        let changes = plan_changes(reg, &desired, &obs).unwrap();
        assert_eq!(changes.metadata.len(), 1);
        assert_eq!(changes.metadata[0].action, MetadataAction::Delete);
    }
}
