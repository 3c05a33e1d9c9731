//! Builds [`ZoneSnapshot`]s from raw API responses.
use tracing::{debug, warn};

use super::{ZoneSnapshot, ZoneState};
use crate::metadata::MetadataValue;
use crate::metadata::registry::MetadataRegistry;
use crate::powerdns::types::{PdnsMetadata, PdnsZone};
use crate::powerdns::{PdnsError, ZoneApi};

/// Merge zone info and metadata records into a snapshot.
///
/// Starts from the registry defaults so every registered key is present;
/// kinds the registry does not know are skipped.
pub fn build_snapshot(
    registry: &MetadataRegistry,
    info: PdnsZone,
    records: &[PdnsMetadata],
) -> ZoneSnapshot {
    let mut metadata = registry.all_defaults();
    metadata.insert("api_rectify".into(), MetadataValue::Bool(info.api_rectify));
    metadata.insert("nsec3narrow".into(), MetadataValue::Bool(info.nsec3narrow));
    metadata.insert("nsec3param".into(), MetadataValue::String(info.nsec3param));
    metadata.insert("soa_edit".into(), MetadataValue::String(info.soa_edit));
    metadata.insert("soa_edit_api".into(), MetadataValue::String(info.soa_edit_api));

    for record in records {
        match registry.lookup_by_kind(&record.kind) {
            Some(d) => {
                metadata.insert(d.wire_key.clone(), d.variant.decode(&record.metadata));
            }
            None => warn!(kind = %record.kind, "ignoring unmanaged metadata kind"),
        }
    }

    ZoneSnapshot::present(
        info.name,
        ZoneState {
            id: info.id,
            kind: info.kind,
            serial: info.serial,
            account: info.account,
            dnssec: info.dnssec,
            masters: info.masters,
            metadata,
        },
    )
}

/// Fetch a zone and its metadata. A zone id the server does not know
/// surfaces as [`PdnsError::NotFound`].
pub async fn read_zone<A: ZoneApi + ?Sized>(
    api: &A,
    registry: &MetadataRegistry,
    zone_id: &str,
) -> Result<ZoneSnapshot, PdnsError> {
    let info = api.list_zone(zone_id).await?;
    let records = api.list_metadata(zone_id).await?;
    debug!(zone_id, kinds = records.len(), "read zone");
    Ok(build_snapshot(registry, info, &records))
}

/// Resolve a zone name to the id the API uses in paths.
pub async fn resolve_zone_id<A: ZoneApi + ?Sized>(
    api: &A,
    name: &str,
) -> Result<Option<String>, PdnsError> {
    let zones = api.list_zones(name).await?;
    let id = zones
        .into_iter()
        .find(|z| z.name.eq_ignore_ascii_case(name))
        .map(|z| z.id);
    debug!(zone = name, ?id, "resolved zone id");
    Ok(id)
}
