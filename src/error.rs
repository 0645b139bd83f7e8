//! Recoverable simulation errors
//!
//! None of these abort the tick loop; callers log and carry on.

use thiserror::Error;

use crate::sim::{AnchorZoneId, AreaId, HiveId, PlantId};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown blob hive {0:?}")]
    UnknownHive(HiveId),
    #[error("blob {blob} out of range for hive {hive:?}")]
    UnknownBlob { hive: HiveId, blob: usize },
    #[error("unknown reset plant {0:?}")]
    UnknownPlant(PlantId),
    #[error("unknown camera anchor zone {0:?}")]
    UnknownAnchorZone(AnchorZoneId),
    #[error("no parallax layers configured for area {0:?}")]
    MissingParallaxArea(AreaId),
    #[error("a reset is already in progress")]
    ResetInProgress,
    #[error("unsupported save version {0}")]
    UnsupportedSaveVersion(u32),
    #[error("parse error")]
    Serde(#[from] serde_json::Error),
}
