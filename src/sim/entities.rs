//! World entities owned by the world manager
//!
//! Spawn points, temporary platforms, blob hives and reset plants, plus the
//! level-data descriptors they are created from. Each entity type owns its
//! own timer logic; the world manager decides when to run it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::spatial::Aabb;
use super::state::{AreaId, HiveId, LevelId, PlantId, PlatformId, SpawnPointId, SpawnerId};

// ============================================================================
// Level data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPointSpec {
    pub index: i32,
    pub area: AreaId,
    pub position: Vec2,
    /// Player inside this region makes the spawn point current
    pub region: Aabb,
    /// Shows the save fire effect when reached
    #[serde(default)]
    pub visualized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveSpec {
    pub position: Vec2,
    pub blob_count: usize,
    /// Turns off for good once every blob is popped
    #[serde(default)]
    pub deactivatable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSpec {
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerSpec {
    pub position: Vec2,
    pub interval_ticks: u32,
    pub plant_velocity: Vec2,
    /// Ticks a spawned plant lives before despawning
    pub plant_lifetime: Option<u32>,
}

/// Everything the world manager tracks for one level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub spawn_points: Vec<SpawnPointSpec>,
    pub hives: Vec<HiveSpec>,
    pub plants: Vec<PlantSpec>,
    pub spawners: Vec<SpawnerSpec>,
}

// ============================================================================
// Spawn points
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub id: SpawnPointId,
    pub area: AreaId,
    pub position: Vec2,
    pub region: Aabb,
    pub visualized: bool,
}

impl SpawnPoint {
    pub fn from_spec(level: LevelId, spec: &SpawnPointSpec) -> Self {
        Self {
            id: SpawnPointId::new(level, spec.index),
            area: spec.area,
            position: spec.position,
            region: spec.region,
            visualized: spec.visualized,
        }
    }

    pub fn level(&self) -> LevelId {
        self.id.level
    }

    pub fn collides_with(&self, position: Vec2, radius: f32) -> bool {
        self.region.overlaps_circle(position, radius)
    }
}

// ============================================================================
// Platforms
// ============================================================================

/// A platform created by the player (e.g. by a dash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformData {
    pub remaining_ticks: u32,
    /// Collision outline handed to the host
    pub vertices: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: PlatformId,
    pub data: PlatformData,
}

impl Platform {
    /// Count down one tick; true once the platform has expired
    pub fn tick(&mut self) -> bool {
        self.data.remaining_ticks = self.data.remaining_ticks.saturating_sub(1);
        self.data.remaining_ticks == 0
    }
}

// ============================================================================
// Hives
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlobState {
    #[default]
    Default,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blob {
    pub state: BlobState,
    /// Ticks until the blob regrows (0 = not popped)
    pub pop_timer: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hive {
    pub id: HiveId,
    pub level: LevelId,
    pub position: Vec2,
    pub blobs: Vec<Blob>,
    pub deactivatable: bool,
    /// Inactive hives are not ticked until the next reset
    pub active: bool,
    pub related_objects_active: bool,
    /// Animation phase for blob movement
    pub movement_ticks: u32,
}

impl Hive {
    pub fn from_spec(id: HiveId, level: LevelId, spec: &HiveSpec) -> Self {
        Self {
            id,
            level,
            position: spec.position,
            blobs: vec![Blob::default(); spec.blob_count],
            deactivatable: spec.deactivatable,
            active: true,
            related_objects_active: true,
            movement_ticks: 0,
        }
    }

    pub fn tick(&mut self, events: &mut Vec<GameEvent>) {
        if !self.active {
            return;
        }

        self.movement_ticks = self.movement_ticks.wrapping_add(1);

        for (index, blob) in self.blobs.iter_mut().enumerate() {
            if blob.pop_timer > 0 {
                blob.pop_timer -= 1;
            }
            if blob.pop_timer == 0 && blob.state == BlobState::Destroyed {
                blob.state = BlobState::Default;
                events.push(GameEvent::BlobStateChanged {
                    hive: self.id,
                    blob: index,
                    state: BlobState::Default,
                });
                if !self.related_objects_active {
                    self.related_objects_active = true;
                    events.push(GameEvent::HiveRelatedObjectsActive {
                        hive: self.id,
                        active: true,
                    });
                }
            }
        }
    }

    /// Pop one blob; returns true if this deactivated the hive
    ///
    /// The caller validates `index`.
    pub(crate) fn pop(&mut self, index: usize, popped_for: u32, events: &mut Vec<GameEvent>) -> bool {
        let blob = &mut self.blobs[index];
        blob.pop_timer = popped_for;
        blob.state = BlobState::Destroyed;
        events.push(GameEvent::BlobStateChanged {
            hive: self.id,
            blob: index,
            state: BlobState::Destroyed,
        });

        if self.deactivatable && self.blobs.iter().all(|b| b.pop_timer != 0) {
            self.active = false;
            self.related_objects_active = false;
            events.push(GameEvent::HiveRelatedObjectsActive {
                hive: self.id,
                active: false,
            });
            return true;
        }
        false
    }

    pub fn reset(&mut self, events: &mut Vec<GameEvent>) {
        for (index, blob) in self.blobs.iter_mut().enumerate() {
            if blob.state != BlobState::Default {
                events.push(GameEvent::BlobStateChanged {
                    hive: self.id,
                    blob: index,
                    state: BlobState::Default,
                });
            }
            *blob = Blob::default();
        }
        if !self.related_objects_active {
            events.push(GameEvent::HiveRelatedObjectsActive {
                hive: self.id,
                active: true,
            });
        }
        self.related_objects_active = true;
        self.active = true;
        self.movement_ticks = 0;
    }
}

// ============================================================================
// Reset plants
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlantState {
    #[default]
    Default,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetPlant {
    pub id: PlantId,
    pub level: LevelId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub state: PlantState,
    /// Ticks until the plant regrows; `NOT_POPPED` when idle
    pub pop_timer: i32,
    /// Placed plants respawn; spawner plants are removed when popped
    pub respawns: bool,
    /// Remaining ticks for spawner plants
    pub lifetime: Option<u32>,
}

impl ResetPlant {
    pub const NOT_POPPED: i32 = -1;

    pub fn placed(id: PlantId, level: LevelId, spec: &PlantSpec) -> Self {
        Self {
            id,
            level,
            position: spec.position,
            velocity: Vec2::ZERO,
            state: PlantState::Default,
            pop_timer: Self::NOT_POPPED,
            respawns: true,
            lifetime: None,
        }
    }

    pub fn spawned(id: PlantId, spawn: &PlantSpawn) -> Self {
        Self {
            id,
            level: spawn.level,
            position: spawn.position,
            velocity: spawn.velocity,
            state: PlantState::Default,
            pop_timer: Self::NOT_POPPED,
            respawns: false,
            lifetime: spawn.lifetime,
        }
    }

    /// Move one tick; true if the plant wants to be removed
    pub fn tick_movement(&mut self) -> bool {
        self.position += self.velocity;
        match self.lifetime.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            None => false,
        }
    }

    /// Count the pop timer down; true when the plant regrew this tick
    pub fn tick_pop_timer(&mut self) -> bool {
        if self.pop_timer > 0 {
            self.pop_timer -= 1;
        }
        if self.pop_timer != 0 {
            return false;
        }

        self.pop_timer = Self::NOT_POPPED;
        if self.state == PlantState::Default {
            return false;
        }
        self.state = PlantState::Default;
        true
    }
}

/// A plant a spawner wants created
#[derive(Debug, Clone, PartialEq)]
pub struct PlantSpawn {
    pub level: LevelId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub lifetime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetPlantSpawner {
    pub id: SpawnerId,
    pub level: LevelId,
    pub position: Vec2,
    pub interval_ticks: u32,
    pub timer: u32,
    pub plant_velocity: Vec2,
    pub plant_lifetime: Option<u32>,
}

impl ResetPlantSpawner {
    pub fn from_spec(id: SpawnerId, level: LevelId, spec: &SpawnerSpec) -> Self {
        let interval = spec.interval_ticks.max(1);
        Self {
            id,
            level,
            position: spec.position,
            interval_ticks: interval,
            timer: interval,
            plant_velocity: spec.plant_velocity,
            plant_lifetime: spec.plant_lifetime,
        }
    }

    pub fn tick(&mut self) -> Option<PlantSpawn> {
        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return None;
        }
        self.timer = self.interval_ticks;
        Some(PlantSpawn {
            level: self.level,
            position: self.position,
            velocity: self.plant_velocity,
            lifetime: self.plant_lifetime,
        })
    }

    pub fn reset_spawn_timer(&mut self) {
        self.timer = self.interval_ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hive(count: usize, deactivatable: bool) -> Hive {
        Hive::from_spec(
            HiveId(0),
            LevelId(1),
            &HiveSpec {
                position: Vec2::ZERO,
                blob_count: count,
                deactivatable,
            },
        )
    }

    #[test]
    fn test_platform_expires_on_third_tick() {
        let mut platform = Platform {
            id: PlatformId(0),
            data: PlatformData {
                remaining_ticks: 3,
                vertices: Vec::new(),
            },
        };
        assert!(!platform.tick());
        assert!(!platform.tick());
        assert!(platform.tick());
    }

    #[test]
    fn test_blob_regrows_when_timer_hits_zero() {
        let mut hive = hive(2, false);
        let mut events = Vec::new();
        hive.pop(1, 3, &mut events);
        assert_eq!(hive.blobs[1].state, BlobState::Destroyed);
        events.clear();

        hive.tick(&mut events);
        hive.tick(&mut events);
        assert_eq!(hive.blobs[1].state, BlobState::Destroyed);
        assert!(events.is_empty());

        hive.tick(&mut events);
        assert_eq!(hive.blobs[1].state, BlobState::Default);
        assert_eq!(
            events,
            vec![GameEvent::BlobStateChanged {
                hive: HiveId(0),
                blob: 1,
                state: BlobState::Default,
            }]
        );
    }

    #[test]
    fn test_deactivatable_hive_turns_off_when_all_popped() {
        let mut hive = hive(2, true);
        let mut events = Vec::new();
        assert!(!hive.pop(0, 100, &mut events));
        assert!(hive.pop(1, 100, &mut events));
        assert!(!hive.active);
        assert!(!hive.related_objects_active);

        // Inactive hives do not count down
        hive.tick(&mut events);
        assert_eq!(hive.blobs[0].pop_timer, 100);

        events.clear();
        hive.reset(&mut events);
        assert!(hive.active && hive.related_objects_active);
        assert!(hive.blobs.iter().all(|b| *b == Blob::default()));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_plant_pop_timer() {
        let mut plant = ResetPlant::placed(PlantId(0), LevelId(0), &PlantSpec { position: Vec2::ZERO });
        assert!(!plant.tick_pop_timer());
        assert_eq!(plant.pop_timer, ResetPlant::NOT_POPPED);

        plant.state = PlantState::Destroyed;
        plant.pop_timer = 2;
        assert!(!plant.tick_pop_timer());
        assert!(plant.tick_pop_timer());
        assert_eq!(plant.state, PlantState::Default);
        assert_eq!(plant.pop_timer, ResetPlant::NOT_POPPED);
    }

    #[test]
    fn test_spawned_plant_lifetime() {
        let spawn = PlantSpawn {
            level: LevelId(0),
            position: Vec2::ZERO,
            velocity: Vec2::new(0.5, 0.0),
            lifetime: Some(2),
        };
        let mut plant = ResetPlant::spawned(PlantId(3), &spawn);
        assert!(!plant.respawns);
        assert!(!plant.tick_movement());
        assert!(plant.tick_movement());
        assert_eq!(plant.position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_spawner_interval_and_reset() {
        let mut spawner = ResetPlantSpawner::from_spec(
            SpawnerId(0),
            LevelId(0),
            &SpawnerSpec {
                position: Vec2::ONE,
                interval_ticks: 3,
                plant_velocity: Vec2::ZERO,
                plant_lifetime: None,
            },
        );
        assert!(spawner.tick().is_none());
        assert!(spawner.tick().is_none());
        assert!(spawner.tick().is_some());
        assert!(spawner.tick().is_none());
        spawner.reset_spawn_timer();
        assert_eq!(spawner.timer, 3);
    }
}
