//! Save/load of player progress
//!
//! Progress is the current spawn point plus the dash-regain flag, stored as
//! a versioned JSON envelope. Restoring applies the values verbatim; the
//! spawn point takes effect when its level is next loaded.

use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::sim::SpawnPointId;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Spawn point the player last reached
    pub spawn_point: Option<SpawnPointId>,
    #[serde(default)]
    pub regain_dash_on_ground_contact: bool,
}

impl SaveData {
    pub fn new(spawn_point: Option<SpawnPointId>, regain_dash_on_ground_contact: bool) -> Self {
        Self {
            version: SAVE_VERSION,
            spawn_point,
            regain_dash_on_ground_contact,
        }
    }
}

pub fn encode(data: &SaveData) -> Result<String, SimError> {
    Ok(serde_json::to_string(data)?)
}

pub fn decode(json: &str) -> Result<SaveData, SimError> {
    let data: SaveData = serde_json::from_str(json)?;
    if data.version != SAVE_VERSION {
        log::warn!("Rejecting save with version {}", data.version);
        return Err(SimError::UnsupportedSaveVersion(data.version));
    }
    Ok(data)
}
