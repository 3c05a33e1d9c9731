// src/error.rs
use thiserror::Error;

use crate::engine::RequestedState;
use crate::powerdns::PdnsError;
use crate::validation::ValidationError;

/// Terminal failure of a single reconciliation run.
///
/// Every variant names the zone and the requested state so the caller can
/// tell what was being attempted without reading logs.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("zone {zone} not found (state={state})")]
    NotFound { zone: String, state: RequestedState },

    #[error("state={state} is not applicable to zone {zone}: {reason}")]
    InvalidOperation {
        zone: String,
        state: RequestedState,
        reason: String,
    },

    #[error("PowerDNS request failed for zone {zone} (state={state})")]
    Remote {
        zone: String,
        state: RequestedState,
        #[source]
        source: PdnsError,
    },

    #[error("invalid desired state for zone {zone}: {source}")]
    Validation {
        zone: String,
        #[source]
        source: ValidationError,
    },
}

impl ZoneError {
    pub fn invalid_operation(
        zone: impl Into<String>,
        state: RequestedState,
        reason: impl Into<String>,
    ) -> Self {
        ZoneError::InvalidOperation {
            zone: zone.into(),
            state,
            reason: reason.into(),
        }
    }

    pub fn validation(zone: impl Into<String>, source: ValidationError) -> Self {
        ZoneError::Validation {
            zone: zone.into(),
            source,
        }
    }

    pub fn remote(zone: impl Into<String>, state: RequestedState, source: PdnsError) -> Self {
        ZoneError::Remote {
            zone: zone.into(),
            state,
            source,
        }
    }

    /// Error from reading a zone by its resolved id. A 404 there means the
    /// zone disappeared between lookup and read.
    pub fn zone_read(zone: impl Into<String>, state: RequestedState, source: PdnsError) -> Self {
        match source {
            PdnsError::NotFound(_) => ZoneError::NotFound {
                zone: zone.into(),
                state,
            },
            source => ZoneError::remote(zone, state, source),
        }
    }
}
