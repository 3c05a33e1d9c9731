//! In-memory PowerDNS double recording every mutating call.
#![allow(dead_code)]

use async_trait::async_trait;
use pdns_auth_zone::ZoneApi;
use pdns_auth_zone::powerdns::PdnsError;
use pdns_auth_zone::powerdns::types::*;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mutating call issued against the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateZone(PdnsZoneCreate),
    PutZone(String, PdnsZonePatch),
    DeleteZone(String),
    NotifyZone(String),
    AxfrRetrieveZone(String),
    ModifyMetadata(String, String, Vec<String>),
    DeleteMetadata(String, String),
}

struct FakeZone {
    info: PdnsZone,
    metadata: BTreeMap<String, Vec<String>>,
}

#[derive(Default)]
pub struct FakeZoneApi {
    zones: Mutex<BTreeMap<String, FakeZone>>,
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<(&'static str, reqwest::StatusCode)>>,
    reads: AtomicUsize,
}

pub fn zone_info(name: &str, kind: ZoneKind) -> PdnsZone {
    PdnsZone {
        id: name.to_string(),
        name: name.to_string(),
        kind,
        serial: 1,
        account: String::new(),
        dnssec: false,
        masters: Vec::new(),
        api_rectify: false,
        nsec3narrow: false,
        nsec3param: String::new(),
        soa_edit: String::new(),
        soa_edit_api: "DEFAULT".into(),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FakeZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, info: PdnsZone) -> Self {
        self.zones.lock().unwrap().insert(
            info.id.clone(),
            FakeZone {
                info,
                metadata: BTreeMap::new(),
            },
        );
        self
    }

    pub fn with_metadata(self, zone_id: &str, kind: &str, values: &[&str]) -> Self {
        self.zones
            .lock()
            .unwrap()
            .get_mut(zone_id)
            .expect("zone seeded before metadata")
            .metadata
            .insert(kind.to_string(), strings(values));
        self
    }

    /// Make the next call of `op` fail with a 500.
    pub fn fail_on(&self, op: &'static str) {
        self.fail_with(op, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Make the next call of `op` answer with `status`.
    pub fn fail_with(&self, op: &'static str, status: reqwest::StatusCode) {
        *self.fail_on.lock().unwrap() = Some((op, status));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of `list_zone` round-trips served.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn has_zone(&self, zone_id: &str) -> bool {
        self.zones.lock().unwrap().contains_key(zone_id)
    }

    pub fn metadata(&self, zone_id: &str) -> BTreeMap<String, Vec<String>> {
        self.zones.lock().unwrap()[zone_id].metadata.clone()
    }

    fn check(&self, op: &'static str) -> Result<(), PdnsError> {
        let mut fail = self.fail_on.lock().unwrap();
        let Some((failing, status)) = *fail else {
            return Ok(());
        };
        if failing != op {
            return Ok(());
        }
        *fail = None;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PdnsError::NotFound(op));
        }
        Err(PdnsError::Status {
            op,
            status,
            body: "injected failure".into(),
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_existing<T>(
        &self,
        op: &'static str,
        zone_id: &str,
        f: impl FnOnce(&mut FakeZone) -> T,
    ) -> Result<T, PdnsError> {
        let mut zones = self.zones.lock().unwrap();
        let zone = zones.get_mut(zone_id).ok_or(PdnsError::NotFound(op))?;
        Ok(f(zone))
    }
}

#[async_trait]
impl ZoneApi for FakeZoneApi {
    async fn list_zones(&self, zone: &str) -> Result<Vec<PdnsZoneSummary>, PdnsError> {
        self.check("list_zones")?;
        Ok(self
            .zones
            .lock()
            .unwrap()
            .values()
            .filter(|z| z.info.name == zone)
            .map(|z| PdnsZoneSummary {
                id: z.info.id.clone(),
                name: z.info.name.clone(),
            })
            .collect())
    }

    async fn list_zone(&self, zone_id: &str) -> Result<PdnsZone, PdnsError> {
        self.check("list_zone")?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.with_existing("list_zone", zone_id, |z| z.info.clone())
    }

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> Result<PdnsZoneSummary, PdnsError> {
        self.check("create_zone")?;
        self.record(Call::CreateZone(zone.clone()));

        let mut info = zone_info(&zone.name, zone.kind);
        info.masters = zone.masters.clone().unwrap_or_default();
        info.account = zone.account.clone().unwrap_or_default();
        self.zones.lock().unwrap().insert(
            info.id.clone(),
            FakeZone {
                info,
                metadata: BTreeMap::new(),
            },
        );
        Ok(PdnsZoneSummary {
            id: zone.name.clone(),
            name: zone.name.clone(),
        })
    }

    async fn put_zone(&self, zone_id: &str, patch: &PdnsZonePatch) -> Result<(), PdnsError> {
        self.check("put_zone")?;
        self.record(Call::PutZone(zone_id.to_string(), patch.clone()));
        self.with_existing("put_zone", zone_id, |z| {
            if let Some(kind) = patch.kind {
                z.info.kind = kind;
            }
            if let Some(masters) = &patch.masters {
                z.info.masters = masters.clone();
            }
            if let Some(account) = &patch.account {
                z.info.account = account.clone();
            }
            z.info.serial += 1;
        })
    }

    async fn delete_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        self.check("delete_zone")?;
        self.record(Call::DeleteZone(zone_id.to_string()));
        self.zones
            .lock()
            .unwrap()
            .remove(zone_id)
            .map(|_| ())
            .ok_or(PdnsError::NotFound("delete_zone"))
    }

    async fn notify_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        self.check("notify_zone")?;
        self.record(Call::NotifyZone(zone_id.to_string()));
        self.with_existing("notify_zone", zone_id, |_| ())
    }

    async fn axfr_retrieve_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        self.check("axfr_retrieve_zone")?;
        self.record(Call::AxfrRetrieveZone(zone_id.to_string()));
        self.with_existing("axfr_retrieve_zone", zone_id, |_| ())
    }

    async fn list_metadata(&self, zone_id: &str) -> Result<Vec<PdnsMetadata>, PdnsError> {
        self.check("list_metadata")?;
        self.with_existing("list_metadata", zone_id, |z| {
            z.metadata
                .iter()
                .map(|(kind, values)| PdnsMetadata {
                    kind: kind.clone(),
                    metadata: values.clone(),
                })
                .collect()
        })
    }

    async fn modify_metadata(
        &self,
        zone_id: &str,
        kind: &str,
        metadata: &[String],
    ) -> Result<(), PdnsError> {
        self.check("modify_metadata")?;
        self.record(Call::ModifyMetadata(
            zone_id.to_string(),
            kind.to_string(),
            metadata.to_vec(),
        ));
        self.with_existing("modify_metadata", zone_id, |z| {
            z.metadata.insert(kind.to_string(), metadata.to_vec());
        })
    }

    async fn delete_metadata(&self, zone_id: &str, kind: &str) -> Result<(), PdnsError> {
        self.check("delete_metadata")?;
        self.record(Call::DeleteMetadata(zone_id.to_string(), kind.to_string()));
        self.with_existing("delete_metadata", zone_id, |z| {
            z.metadata.remove(kind);
        })
    }
}
