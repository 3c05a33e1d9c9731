//! Runs one requested state against one zone, start to finish.
//!
//! Every call to the API is issued sequentially; a failure aborts the run
//! with nothing rolled back. Re-running the same request converges.
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::error::ZoneError;
use crate::metadata::MetadataAction;
use crate::metadata::registry::{MetadataChange, MetadataRegistry};
use crate::powerdns::{PdnsError, ZoneApi};
use crate::validation::normalize_zone_name;
use crate::zone::desired::DesiredSpec;
use crate::zone::diff::{creation_payload, plan_changes};
use crate::zone::reader::{read_zone, resolve_zone_id};
use crate::zone::{ZoneKind, ZoneSnapshot};

/// Lifecycle verb requested for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RequestedState {
    /// Create the zone or update it to match the desired state.
    #[default]
    Present,
    /// Delete the zone if it exists.
    Absent,
    /// Only report whether the zone exists.
    Exists,
    /// Send NOTIFY for a Master zone, or refresh a Slave zone.
    Notify,
    /// Pull a Slave zone from its master via AXFR.
    Retrieve,
}

impl fmt::Display for RequestedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestedState::Present => "present",
            RequestedState::Absent => "absent",
            RequestedState::Exists => "exists",
            RequestedState::Notify => "notify",
            RequestedState::Retrieve => "retrieve",
        };
        f.write_str(s)
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneReport {
    pub changed: bool,
    pub zone: ZoneSnapshot,
}

pub struct Reconciler<'a, A: ZoneApi + ?Sized> {
    api: &'a A,
    registry: &'a MetadataRegistry,
    dry_run: bool,
}

impl<'a, A: ZoneApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A, registry: &'a MetadataRegistry) -> Self {
        Self {
            api,
            registry,
            dry_run: false,
        }
    }

    /// Plan and report without issuing any mutating call.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(
        &self,
        zone: &str,
        state: RequestedState,
        desired: &DesiredSpec,
    ) -> Result<ZoneReport, ZoneError> {
        let name = normalize_zone_name(zone).map_err(|e| ZoneError::validation(zone, e))?;
        let ctx = Ctx { name: &name, state };

        let zone_id = resolve_zone_id(self.api, &name)
            .await
            .map_err(|e| ctx.err(e))?;
        let observed = match zone_id {
            Some(id) => {
                let snapshot = self.read(&ctx, &id).await?;
                Some((id, snapshot))
            }
            None => None,
        };

        match (state, observed) {
            (RequestedState::Exists, observed) => {
                Ok(unchanged(&name, observed.map(|(_, snapshot)| snapshot)))
            }
            (RequestedState::Absent, None) => Ok(unchanged(&name, None)),
            (RequestedState::Notify | RequestedState::Retrieve, None) => {
                Err(ZoneError::NotFound {
                    zone: name.clone(),
                    state,
                })
            }
            (RequestedState::Absent, Some((id, snapshot))) => {
                self.delete(&ctx, &id, snapshot).await
            }
            (RequestedState::Notify, Some((id, snapshot))) => {
                self.notify(&ctx, &id, snapshot).await
            }
            (RequestedState::Retrieve, Some((id, snapshot))) => {
                self.retrieve(&ctx, &id, snapshot).await
            }
            (RequestedState::Present, None) => self.create(&ctx, desired).await,
            (RequestedState::Present, Some((id, snapshot))) => {
                self.update(&ctx, &id, snapshot, desired).await
            }
        }
    }

    async fn read(&self, ctx: &Ctx<'_>, zone_id: &str) -> Result<ZoneSnapshot, ZoneError> {
        read_zone(self.api, self.registry, zone_id)
            .await
            .map_err(|e| ZoneError::zone_read(ctx.name, ctx.state, e))
    }

    async fn delete(
        &self,
        ctx: &Ctx<'_>,
        id: &str,
        snapshot: ZoneSnapshot,
    ) -> Result<ZoneReport, ZoneError> {
        info!(zone = ctx.name, dry_run = self.dry_run, "deleting zone");
        if !self.dry_run {
            self.api.delete_zone(id).await.map_err(|e| ctx.err(e))?;
        }
        Ok(ZoneReport {
            changed: true,
            zone: snapshot,
        })
    }

    async fn notify(
        &self,
        ctx: &Ctx<'_>,
        id: &str,
        snapshot: ZoneSnapshot,
    ) -> Result<ZoneReport, ZoneError> {
        if snapshot.kind() == Some(ZoneKind::Native) {
            return Err(ZoneError::invalid_operation(
                ctx.name,
                ctx.state,
                "NOTIFY cannot be requested for Native zones",
            ));
        }
        info!(zone = ctx.name, dry_run = self.dry_run, "sending NOTIFY");
        if !self.dry_run {
            self.api.notify_zone(id).await.map_err(|e| ctx.err(e))?;
        }
        Ok(ZoneReport {
            changed: true,
            zone: snapshot,
        })
    }

    async fn retrieve(
        &self,
        ctx: &Ctx<'_>,
        id: &str,
        snapshot: ZoneSnapshot,
    ) -> Result<ZoneReport, ZoneError> {
        if snapshot.kind() != Some(ZoneKind::Slave) {
            return Err(ZoneError::invalid_operation(
                ctx.name,
                ctx.state,
                "retrieval can only be requested for Slave zones",
            ));
        }
        info!(zone = ctx.name, dry_run = self.dry_run, "retrieving zone from master");
        if !self.dry_run {
            self.api
                .axfr_retrieve_zone(id)
                .await
                .map_err(|e| ctx.err(e))?;
        }
        Ok(ZoneReport {
            changed: true,
            zone: snapshot,
        })
    }

    async fn create(&self, ctx: &Ctx<'_>, desired: &DesiredSpec) -> Result<ZoneReport, ZoneError> {
        let payload = creation_payload(ctx.name, &desired.properties)
            .map_err(|e| ZoneError::validation(ctx.name, e))?;
        let metadata = desired
            .metadata
            .as_ref()
            .map(|m| self.registry.plan_set(m))
            .unwrap_or_default();

        info!(zone = ctx.name, kind = %payload.kind, dry_run = self.dry_run, "creating zone");
        if self.dry_run {
            log_metadata_plan(ctx.name, &metadata);
            return Ok(ZoneReport {
                changed: true,
                zone: ZoneSnapshot::absent(ctx.name),
            });
        }

        self.api.create_zone(&payload).await.map_err(|e| ctx.err(e))?;

        // id is assigned by the server
        let id = resolve_zone_id(self.api, ctx.name)
            .await
            .map_err(|e| ctx.err(e))?
            .ok_or_else(|| ZoneError::NotFound {
                zone: ctx.name.to_string(),
                state: ctx.state,
            })?;

        self.apply_metadata(ctx, &id, &metadata).await?;

        Ok(ZoneReport {
            changed: true,
            zone: self.read(ctx, &id).await?,
        })
    }

    async fn update(
        &self,
        ctx: &Ctx<'_>,
        id: &str,
        snapshot: ZoneSnapshot,
        desired: &DesiredSpec,
    ) -> Result<ZoneReport, ZoneError> {
        let Some(observed) = snapshot.state.as_ref() else {
            return Ok(unchanged(ctx.name, Some(snapshot)));
        };
        let changes = plan_changes(self.registry, desired, observed)
            .map_err(|e| ZoneError::validation(ctx.name, e))?;

        if changes.is_empty() {
            debug!(zone = ctx.name, "zone already converged");
            return Ok(unchanged(ctx.name, Some(snapshot)));
        }
        if self.dry_run {
            info!(zone = ctx.name, patch = ?changes.properties, "would update zone");
            log_metadata_plan(ctx.name, &changes.metadata);
            return Ok(ZoneReport {
                changed: true,
                zone: snapshot,
            });
        }

        if !changes.properties.is_empty() {
            info!(zone = ctx.name, patch = ?changes.properties, "updating zone properties");
            self.api
                .put_zone(id, &changes.properties)
                .await
                .map_err(|e| ctx.err(e))?;
        }
        self.apply_metadata(ctx, id, &changes.metadata).await?;

        Ok(ZoneReport {
            changed: true,
            zone: self.read(ctx, id).await?,
        })
    }

    async fn apply_metadata(
        &self,
        ctx: &Ctx<'_>,
        zone_id: &str,
        changes: &[MetadataChange],
    ) -> Result<(), ZoneError> {
        for change in changes {
            match &change.action {
                MetadataAction::NoOp => {}
                MetadataAction::Modify(payload) => {
                    info!(zone = ctx.name, kind = %change.kind, ?payload, "setting metadata");
                    self.api
                        .modify_metadata(zone_id, &change.kind, payload)
                        .await
                        .map_err(|e| ctx.err(e))?;
                }
                MetadataAction::Delete => {
                    info!(zone = ctx.name, kind = %change.kind, "deleting metadata");
                    self.api
                        .delete_metadata(zone_id, &change.kind)
                        .await
                        .map_err(|e| ctx.err(e))?;
                }
            }
        }
        Ok(())
    }
}

struct Ctx<'n> {
    name: &'n str,
    state: RequestedState,
}

impl Ctx<'_> {
    fn err(&self, source: PdnsError) -> ZoneError {
        ZoneError::remote(self.name, self.state, source)
    }
}

fn unchanged(name: &str, observed: Option<ZoneSnapshot>) -> ZoneReport {
    ZoneReport {
        changed: false,
        zone: observed.unwrap_or_else(|| ZoneSnapshot::absent(name)),
    }
}

fn log_metadata_plan(zone: &str, changes: &[MetadataChange]) {
    for change in changes {
        info!(zone, kind = %change.kind, action = ?change.action, "would change metadata");
    }
}
