//! Per-tick simulation module
//!
//! Everything that runs once per frame lives here:
//! - `camera`: player-following camera with anchor zones, zoom and shake
//! - `parallax`: background layers positioned from the camera
//! - `world`: game flow, spawn points, resettable entities and the reset sequence
//! - `tick`: the frame driver that owns the three and routes their events
//!
//! Engine objects (player, colliders, sprites) are reached only through the
//! `Player` and `SpatialQuery` traits and plain ids.

pub mod anchor;
pub mod camera;
pub mod entities;
pub mod events;
pub mod parallax;
pub mod reset;
pub mod shake;
pub mod spatial;
pub mod state;
pub mod tick;
pub mod world;

pub use anchor::{AnchorFraming, AnchorZone, AnchorZones};
pub use camera::{CameraController, CameraDebugInfo};
pub use entities::{LevelData, PlatformData};
pub use events::{EventBus, GameEvent, SoundCue};
pub use parallax::{LayerSizing, ParallaxAreaConfig, ParallaxLayer, ParallaxLayerConfig, ParallaxRenderer};
pub use reset::{LightRamp, ResetSequence, ResetStep};
pub use shake::Shake;
pub use spatial::{Aabb, BoxWorld, LayerMask, RaycastHit, SpatialQuery};
pub use state::{
    AnchorZoneId, AreaId, CameraMode, ColliderId, GameState, HiveId, LevelId, PlantId, PlatformId,
    Player, PlayerStatus, PuppetPlayer, SpawnPointId, SpawnerId, SpriteId,
};
pub use tick::{Simulation, TickInput};
pub use world::{CameraView, LevelLoadOptions, LoadedLevel, WorldManager};
