//! Notification bus
//!
//! Components never call each other directly: they push events here and the
//! frame driver routes them once per frame. Anything the host cares about
//! (audio cues, despawns, gameplay milestones) is also published here.

use std::collections::VecDeque;

use glam::Vec2;

use super::entities::{BlobState, PlantState};
use super::state::{
    AnchorZoneId, AreaId, HiveId, LevelId, PlantId, PlatformId, SpawnPointId,
};

/// Audio cues the core asks the host to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Save-point fire lit
    FirePlant,
    /// Previous save-point fire put out
    StopFirePlant,
    /// Blob or plant popped
    SmallBlop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    // === Consumed and emitted by the core ===
    /// The player died; starts a reset
    PlayerDeath,
    /// The player was placed at a spawn position; re-frames the camera
    PlayerReset,

    // === Emitted ===
    SpawnPointReached { spawn: SpawnPointId, area: AreaId },
    /// First input on the title screen; the host should start the intro
    IntroStarted,
    GameplayStarted,
    ResetStarted,
    ResetFinished,
    /// Ask the camera to shake
    AddTrauma(f32),
    PlaySound { cue: SoundCue, at: Vec2 },
    /// Match ambience to the area of the current spawn point
    AmbienceArea(AreaId),
    /// Save effect moved to a new spawn point (light ramp starts)
    SaveEffectPlaced { at: Vec2 },
    PlatformDestroyed(PlatformId),
    BlobStateChanged { hive: HiveId, blob: usize, state: BlobState },
    HiveRelatedObjectsActive { hive: HiveId, active: bool },
    PlantStateChanged { plant: PlantId, state: PlantState },
    PlantSpawned { plant: PlantId, at: Vec2 },
    PlantDestroyed(PlantId),
    /// Enable or disable an anchor zone's camera colliders
    AnchorCollidersActive { zone: AnchorZoneId, active: bool },
    LevelLoaded(LevelId),
    LevelUnloaded(LevelId),
}

/// FIFO queue of pending events
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        log::trace!("event: {:?}", event);
        self.queue.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut bus = EventBus::new();
        bus.push(GameEvent::PlayerDeath);
        bus.push(GameEvent::PlayerReset);
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.pop(), Some(GameEvent::PlayerDeath));
        assert_eq!(bus.drain(), vec![GameEvent::PlayerReset]);
        assert!(bus.is_empty());
    }
}
