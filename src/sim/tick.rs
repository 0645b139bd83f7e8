//! Frame driver
//!
//! Owns the camera controller, the parallax renderer and the world manager
//! together with their collaborators (player and spatial world) and runs
//! them in order once per frame, routing notifications between them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::SimError;
use crate::persistence::SaveData;
use crate::settings::Settings;
use crate::tuning::Tuning;

use super::anchor::AnchorZone;
use super::camera::CameraController;
use super::entities::{LevelData, PlatformData};
use super::events::{EventBus, GameEvent};
use super::parallax::ParallaxRenderer;
use super::spatial::SpatialQuery;
use super::state::{AnchorZoneId, HiveId, LevelId, PlantId, PlatformId, Player};
use super::world::{CameraView, LevelLoadOptions, LoadedLevel, WorldManager};

/// Input sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement stick, each axis in [-1, 1]
    pub stick: Vec2,
    pub jump: bool,
    pub dash: bool,
    /// Any other key pressed this frame
    pub any_key: bool,
    /// Analog value of the reset button
    pub reset: f32,
}

impl TickInput {
    /// Input that starts the game from the title screen
    pub fn wants_to_start(&self) -> bool {
        self.any_key || self.jump || self.dash || self.stick.x != 0.0 || self.stick.y != 0.0
    }
}

pub struct Simulation<P: Player, W: SpatialQuery> {
    tuning: Tuning,
    settings: Settings,
    camera: CameraController,
    parallax: ParallaxRenderer,
    world: WorldManager,
    player: P,
    spatial: W,
    bus: EventBus,
    /// Every routed event, for the host
    outbox: Vec<GameEvent>,
    frames: u64,
}

impl<P: Player, W: SpatialQuery> Simulation<P, W> {
    pub fn new(tuning: Tuning, settings: Settings, player: P, spatial: W, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut camera = CameraController::new(&tuning.camera, rng.random::<u32>());
        camera.attach_holder(Vec2::ZERO);

        let parallax = ParallaxRenderer::new(tuning.parallax.max_layers, tuning.camera.base_dimensions());
        let world = WorldManager::new(&tuning);

        Self {
            tuning,
            settings,
            camera,
            parallax,
            world,
            player,
            spatial,
            bus: EventBus::new(),
            outbox: Vec::new(),
            frames: 0,
        }
    }

    // === Accessors ===

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn parallax(&self) -> &ParallaxRenderer {
        &self.parallax
    }

    pub fn world(&self) -> &WorldManager {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldManager {
        &mut self.world
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn spatial(&self) -> &W {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut W {
        &mut self.spatial
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Camera snapshot shared with the world tick
    pub fn camera_view(&self) -> Option<CameraView> {
        self.camera.position().map(|position| CameraView {
            position,
            collider_size: self.camera.camera_collider_size(),
        })
    }

    /// Events routed since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    // === Frame ===

    /// Run one frame of `dt` seconds
    pub fn frame(&mut self, input: &TickInput, dt: f32) {
        self.frames += 1;
        let mut events = Vec::new();

        // World (player, platforms, spawn points, hives, plants)
        self.world.handle_reset_input(input.reset, &mut events);
        let view = self.camera_view();
        self.world
            .tick(&mut self.player, input, view, &self.settings, &mut events);
        self.world.advance_frame(dt, &mut self.player, &mut events);
        self.publish(events);

        // Late tick: camera, then parallax from the new camera position
        let player = self
            .world
            .player_spawned()
            .then_some(&self.player as &dyn Player);
        self.camera
            .late_tick(player, &self.spatial, &self.settings, dt);

        if let Some(position) = self.camera.position() {
            self.parallax
                .update_positions(position, self.camera.camera_collider_size());
        }

        let camera_events = self.camera.take_events();
        self.publish(camera_events);
    }

    /// Deliver an external notification (e.g. a hazard killed the player)
    pub fn notify(&mut self, event: GameEvent) {
        self.publish(vec![event]);
    }

    fn publish(&mut self, events: Vec<GameEvent>) {
        self.bus.extend(events);

        while let Some(event) = self.bus.pop() {
            let mut follow_up = Vec::new();
            match &event {
                GameEvent::PlayerDeath => {
                    self.camera.on_player_death();
                    self.world.on_player_death(&mut follow_up);
                }
                GameEvent::PlayerReset => {
                    self.camera
                        .on_player_reset(&self.player, &self.spatial, &self.settings);
                }
                GameEvent::SpawnPointReached { area, .. } => {
                    let _ = self
                        .parallax
                        .on_spawn_point_reached(*area, &self.tuning.parallax);
                }
                GameEvent::AddTrauma(amount) => self.camera.add_trauma(*amount),
                _ => {}
            }

            follow_up.extend(self.camera.take_events());
            self.bus.extend(follow_up);
            self.outbox.push(event);
        }
    }

    // === Levels ===

    pub fn load_level(&mut self, level: LevelId, data: &LevelData, options: LevelLoadOptions) -> LoadedLevel {
        let mut events = Vec::new();
        let loaded = self
            .world
            .on_level_loaded(level, data, options, &mut self.player, &mut events);
        self.publish(events);
        loaded
    }

    pub fn unload_level(&mut self, level: LevelId) {
        let mut events = Vec::new();
        self.world.on_level_unloaded(level, &mut events);
        self.publish(events);
    }

    pub fn add_anchor_zone(&mut self, zone: AnchorZone) -> AnchorZoneId {
        self.camera.add_anchor_zone(zone)
    }

    pub fn enter_anchor_zone(&mut self, zone: AnchorZoneId) -> Result<(), SimError> {
        let result = self.camera.enter_anchor_zone(zone);
        let events = self.camera.take_events();
        self.publish(events);
        result
    }

    pub fn leave_anchor_zone(&mut self, zone: AnchorZoneId) {
        self.camera.leave_anchor_zone(zone);
        let events = self.camera.take_events();
        self.publish(events);
    }

    // === World passthroughs ===

    pub fn pop_blob(&mut self, hive: HiveId, blob: usize) -> Result<(), SimError> {
        let mut events = Vec::new();
        let result = self
            .world
            .pop_blob(hive, blob, &mut self.player, &mut events);
        self.publish(events);
        result
    }

    pub fn pop_reset_plant(&mut self, plant: PlantId) -> Result<(), SimError> {
        let mut events = Vec::new();
        let result = self
            .world
            .pop_reset_plant(plant, &mut self.player, &mut events);
        self.publish(events);
        result
    }

    pub fn add_platform(&mut self, data: PlatformData) -> PlatformId {
        self.world.add_platform(data)
    }

    pub fn request_reset(&mut self) -> Result<(), SimError> {
        let mut events = Vec::new();
        let result = self.world.request_reset(&mut events);
        self.publish(events);
        result
    }

    pub fn set_spawn_id(&mut self, index: i32) -> Result<(), SimError> {
        let mut events = Vec::new();
        let result = self.world.set_spawn_id(index, &mut events);
        self.publish(events);
        result
    }

    pub fn reset_level(&mut self) -> Result<(), SimError> {
        let mut events = Vec::new();
        let result = self.world.reset_level(&mut events);
        self.publish(events);
        result
    }

    pub fn on_intro_cutscene_finished(&mut self) {
        let mut events = Vec::new();
        self.world
            .on_intro_cutscene_finished(&mut self.player, &mut events);
        self.publish(events);
    }

    pub fn save(&self) -> SaveData {
        self.world.save()
    }

    pub fn load(&mut self, data: &SaveData) {
        self.world.load(data);
    }
}
