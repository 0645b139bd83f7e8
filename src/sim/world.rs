//! World/player manager
//!
//! Owns game flow and everything that is reset when the player respawns:
//! spawn points, temporary platforms, blob hives, reset plants and their
//! spawners. Also runs the reset sequence that hides the respawn behind a
//! screen transition.
//!
//! Tick order within `tick`: player, platforms, spawn points, hives, plants.

use glam::Vec2;

use crate::SimError;
use crate::consts::RESET_INPUT_THRESHOLD;
use crate::persistence::SaveData;
use crate::settings::Settings;
use crate::tuning::{PlayerTuning, Tuning};

use super::entities::{
    Hive, LevelData, PlantSpawn, PlantState, Platform, PlatformData, ResetPlant,
    ResetPlantSpawner, SpawnPoint,
};
use super::events::{GameEvent, SoundCue};
use super::reset::{LightRamp, ResetSequence, ResetStep};
use super::state::{
    GameState, HiveId, LevelId, PlantId, PlatformId, Player, PlayerStatus, SpawnPointId,
    SpawnerId,
};
use super::tick::TickInput;

/// Camera snapshot the world reads each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec2,
    /// Full visible size at the current zoom
    pub collider_size: Vec2,
}

/// How a level came to be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelLoadOptions {
    /// Spawn point requested by the loader
    pub spawn_player_at: Option<SpawnPointId>,
    /// This level starts a new game session
    pub start_game_from_level: bool,
    /// Loaded while restoring a save
    pub loaded_due_to_serialize: bool,
}

/// Ids assigned to a freshly loaded level's entities, in level-data order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedLevel {
    pub level: LevelId,
    pub hives: Vec<HiveId>,
    pub plants: Vec<PlantId>,
    pub spawners: Vec<SpawnerId>,
}

#[derive(Debug)]
pub struct WorldManager {
    tuning: PlayerTuning,
    blob_pop_trauma: f32,

    game_state: GameState,
    player_spawned: bool,
    /// Level the player was last placed in
    player_level: Option<LevelId>,
    accept_player_input: bool,
    /// Reset button was above the threshold last frame
    reset_held: bool,
    physics_paused: bool,
    regain_dash_on_ground_contact: bool,

    spawn_points: Vec<SpawnPoint>,
    current_spawn: Option<SpawnPointId>,
    /// Only used while loading or starting a game
    spawn_to_start_from: Option<SpawnPointId>,

    platforms: Vec<Platform>,
    hives: Vec<Hive>,
    plants: Vec<ResetPlant>,
    spawners: Vec<ResetPlantSpawner>,

    reset: ResetSequence,
    save_light: LightRamp,
    save_effect_position: Option<Vec2>,

    next_platform: u32,
    next_hive: u32,
    next_plant: u32,
    next_spawner: u32,
    tick_calls: u64,
}

impl WorldManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.player.clone(),
            blob_pop_trauma: tuning.camera.trauma_on_blob_pop,
            game_state: GameState::Gameplay,
            player_spawned: false,
            player_level: None,
            accept_player_input: true,
            reset_held: false,
            physics_paused: false,
            regain_dash_on_ground_contact: false,
            spawn_points: Vec::new(),
            current_spawn: None,
            spawn_to_start_from: None,
            platforms: Vec::new(),
            hives: Vec::new(),
            plants: Vec::new(),
            spawners: Vec::new(),
            reset: ResetSequence::default(),
            save_light: LightRamp::default(),
            save_effect_position: None,
            next_platform: 0,
            next_hive: 0,
            next_plant: 0,
            next_spawner: 0,
            tick_calls: 0,
        }
    }

    // === Accessors ===

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn set_game_state(&mut self, state: GameState) {
        self.game_state = state;
    }

    pub fn player_spawned(&self) -> bool {
        self.player_spawned
    }

    pub fn is_resetting(&self) -> bool {
        self.reset.is_resetting()
    }

    pub fn reset_sequence(&self) -> &ResetSequence {
        &self.reset
    }

    pub fn save_light(&self) -> &LightRamp {
        &self.save_light
    }

    pub fn save_effect_position(&self) -> Option<Vec2> {
        self.save_effect_position
    }

    pub fn current_spawn_point(&self) -> Option<&SpawnPoint> {
        let id = self.current_spawn?;
        self.spawn_points.iter().find(|s| s.id == id)
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn hives(&self) -> &[Hive] {
        &self.hives
    }

    pub fn hive(&self, id: HiveId) -> Option<&Hive> {
        self.hives.iter().find(|h| h.id == id)
    }

    pub fn plants(&self) -> &[ResetPlant] {
        &self.plants
    }

    pub fn plant(&self, id: PlantId) -> Option<&ResetPlant> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn spawners(&self) -> &[ResetPlantSpawner] {
        &self.spawners
    }

    pub fn accept_player_input(&self) -> bool {
        self.accept_player_input
    }

    pub fn set_accept_player_input(&mut self, accept: bool) {
        self.accept_player_input = accept;
    }

    pub fn set_physics_paused(&mut self, paused: bool) {
        self.physics_paused = paused;
    }

    pub fn regain_dash_on_ground_contact(&self) -> bool {
        self.regain_dash_on_ground_contact
    }

    pub fn set_regain_dash_on_ground_contact(&mut self, value: bool) {
        self.regain_dash_on_ground_contact = value;
    }

    /// Spawn point to use for the next level load
    pub fn set_desired_spawn_point(&mut self, spawn: SpawnPointId) {
        self.spawn_to_start_from = Some(spawn);
    }

    // === Levels ===

    pub fn on_level_loaded(
        &mut self,
        level: LevelId,
        data: &LevelData,
        options: LevelLoadOptions,
        player: &mut dyn Player,
        events: &mut Vec<GameEvent>,
    ) -> LoadedLevel {
        let mut spawn_points: Vec<SpawnPoint> = data
            .spawn_points
            .iter()
            .map(|spec| SpawnPoint::from_spec(level, spec))
            .collect();
        if spawn_points.is_empty() {
            log::warn!("Level {:?} has no spawn points", level);
        }
        spawn_points.sort_by_key(|s| s.id.index);
        self.spawn_points.extend(spawn_points);

        let mut loaded = LoadedLevel {
            level,
            ..Default::default()
        };

        for spec in &data.hives {
            let id = HiveId(self.next_hive);
            self.next_hive += 1;
            self.hives.push(Hive::from_spec(id, level, spec));
            loaded.hives.push(id);
        }
        for spec in &data.plants {
            let id = PlantId(self.next_plant);
            self.next_plant += 1;
            self.plants.push(ResetPlant::placed(id, level, spec));
            loaded.plants.push(id);
        }
        for spec in &data.spawners {
            let id = SpawnerId(self.next_spawner);
            self.next_spawner += 1;
            self.spawners.push(ResetPlantSpawner::from_spec(id, level, spec));
            loaded.spawners.push(id);
        }

        log::info!(
            "Level {:?} loaded: {} spawn points, {} hives, {} plants, {} spawners",
            level,
            data.spawn_points.len(),
            loaded.hives.len(),
            loaded.plants.len(),
            loaded.spawners.len()
        );
        events.push(GameEvent::LevelLoaded(level));

        if let Some(spawn) = options.spawn_player_at {
            self.spawn_to_start_from = Some(spawn);
        }

        let desired_in_level = self.spawn_to_start_from.is_some_and(|s| s.level == level);

        if options.loaded_due_to_serialize || (options.start_game_from_level && desired_in_level) {
            self.init_spawn_point_to_start_from(events);
        }

        if options.start_game_from_level || (options.loaded_due_to_serialize && desired_in_level) {
            self.init_player_for_level(level, player, events);
        }

        loaded
    }

    fn init_spawn_point_to_start_from(&mut self, events: &mut Vec<GameEvent>) {
        let Some(desired) = self.spawn_to_start_from else {
            return;
        };
        if !self.spawn_points.iter().any(|s| s.id == desired) {
            log::error!("Could not find spawn point {:?} to start from", desired);
            return;
        }
        self.set_spawn_point(Some(desired), events);
        if let Some(spawn) = self.current_spawn_point() {
            events.push(GameEvent::AmbienceArea(spawn.area));
        }
    }

    fn init_player_for_level(
        &mut self,
        level: LevelId,
        player: &mut dyn Player,
        events: &mut Vec<GameEvent>,
    ) {
        let intro = self.tuning.intro_cutscene_level == Some(level);
        self.game_state = if intro {
            GameState::Pregameplay
        } else {
            GameState::Gameplay
        };

        // Current spawn point, then the level's first spawn point, then the origin
        let position = self
            .current_spawn_point()
            .or_else(|| self.spawn_points.iter().find(|s| s.level() == level))
            .map_or(Vec2::ZERO, |s| s.position);

        self.player_spawned = true;
        self.player_level = Some(level);
        player.reset(position);
        player.set_visible(!intro);
        events.push(GameEvent::PlayerReset);
        log::info!("Player spawned in level {:?} at {:?}", level, position);
    }

    pub fn on_level_unloaded(&mut self, level: LevelId, events: &mut Vec<GameEvent>) {
        self.spawn_points.retain(|s| s.level() != level);
        self.hives.retain(|h| h.level != level);
        self.plants.retain(|p| p.level != level);
        self.spawners.retain(|s| s.level != level);

        if self.current_spawn.is_some_and(|s| s.level == level) {
            self.current_spawn = None;
        }
        log::info!("Level {:?} unloaded", level);
        events.push(GameEvent::LevelUnloaded(level));
    }

    // === Tick ===

    pub fn tick(
        &mut self,
        player: &mut dyn Player,
        input: &TickInput,
        view: Option<CameraView>,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.player_spawned {
            // No level loaded yet
            return;
        }
        if self.reset.is_resetting() || self.physics_paused {
            return;
        }

        self.tick_calls += 1;
        if !settings.world_runs_on(self.tick_calls) {
            return;
        }

        if self.game_state == GameState::Pregameplay {
            if !input.wants_to_start() {
                return;
            }
            log::info!("Starting intro cutscene");
            self.game_state = GameState::Cutscene;
            events.push(GameEvent::IntroStarted);
        }
        if self.game_state == GameState::Cutscene {
            return;
        }

        if player.tick(input) == PlayerStatus::Died {
            events.push(GameEvent::PlayerDeath);
        }

        self.tick_platforms(events);
        self.tick_spawn_points(player, settings, events);
        for hive in &mut self.hives {
            hive.tick(events);
        }
        self.tick_reset_plants(view, events);
    }

    fn tick_platforms(&mut self, events: &mut Vec<GameEvent>) {
        self.platforms.retain_mut(|platform| {
            let expired = platform.tick();
            if expired {
                events.push(GameEvent::PlatformDestroyed(platform.id));
            }
            !expired
        });
    }

    fn tick_spawn_points(
        &mut self,
        player: &dyn Player,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) {
        let position = player.position();
        let radius = player
            .collider_radius()
            .unwrap_or(self.tuning.spawn_probe_radius);

        let Some(hit) = self
            .spawn_points
            .iter()
            .find(|s| s.collides_with(position, radius))
        else {
            return;
        };
        if self.current_spawn == Some(hit.id) {
            return;
        }

        let (id, area, level) = (hit.id, hit.area, hit.level());
        self.set_spawn_point(Some(id), events);
        self.player_level = Some(level);
        events.push(GameEvent::AmbienceArea(area));

        if settings.draw_current_spawn_id {
            log::info!("SavePoint {:?}_{}", id.level, id.index);
        }
    }

    fn set_spawn_point(&mut self, spawn: Option<SpawnPointId>, events: &mut Vec<GameEvent>) {
        let Some(new_point) = spawn.and_then(|id| self.spawn_points.iter().find(|s| s.id == id)) else {
            self.current_spawn = None;
            return;
        };

        log::info!("Spawn point reached: {:?}", new_point.id);
        events.push(GameEvent::SpawnPointReached {
            spawn: new_point.id,
            area: new_point.area,
        });

        if new_point.visualized {
            if let Some(old) = self.current_spawn_point() {
                events.push(GameEvent::PlaySound {
                    cue: SoundCue::StopFirePlant,
                    at: old.position,
                });
            }
            let at = new_point.position + self.tuning.save_effect_offset;
            events.push(GameEvent::PlaySound {
                cue: SoundCue::FirePlant,
                at: new_point.position,
            });
            events.push(GameEvent::SaveEffectPlaced { at });
            self.save_effect_position = Some(at);
            self.save_light
                .start(self.tuning.save_light_duration, self.tuning.save_light_max_intensity);
        }

        self.current_spawn = spawn;
    }

    fn tick_reset_plants(&mut self, view: Option<CameraView>, events: &mut Vec<GameEvent>) {
        // Spawners only run near the camera
        let mut spawned = Vec::new();
        if let Some(view) = view {
            for spawner in &mut self.spawners {
                if (view.position.x - spawner.position.x).abs() > view.collider_size.x {
                    continue;
                }
                if let Some(spawn) = spawner.tick() {
                    spawned.push(spawn);
                }
            }
        }
        for spawn in spawned {
            self.register_spawned_plant(spawn, events);
        }

        self.plants.retain_mut(|plant| {
            if plant.tick_movement() {
                events.push(GameEvent::PlantDestroyed(plant.id));
                return false;
            }
            if plant.tick_pop_timer() {
                events.push(GameEvent::PlantStateChanged {
                    plant: plant.id,
                    state: PlantState::Default,
                });
            }
            true
        });
    }

    // === Reset ===

    /// Reset button from input; only a fresh press requests a reset
    pub fn handle_reset_input(&mut self, value: f32, events: &mut Vec<GameEvent>) {
        let pressed = value > RESET_INPUT_THRESHOLD;
        let was_held = std::mem::replace(&mut self.reset_held, pressed);
        if !pressed || was_held {
            return;
        }
        if self.reset.is_resetting()
            || self.game_state != GameState::Gameplay
            || !self.accept_player_input
        {
            return;
        }
        let _ = self.request_reset(events);
    }

    pub fn on_player_death(&mut self, events: &mut Vec<GameEvent>) {
        if self.reset.is_resetting() {
            return;
        }
        let _ = self.request_reset(events);
    }

    /// Start the reset sequence
    pub fn request_reset(&mut self, events: &mut Vec<GameEvent>) -> Result<(), SimError> {
        if let Err(err) = self.reset.start(
            self.tuning.transition_length_first_half,
            self.tuning.transition_length_second_half,
        ) {
            log::error!("Already resetting");
            return Err(err);
        }
        log::info!("Reset started");
        events.push(GameEvent::ResetStarted);
        Ok(())
    }

    /// Make the spawn point with `index` current and reset to it
    pub fn set_spawn_id(&mut self, index: i32, events: &mut Vec<GameEvent>) -> Result<(), SimError> {
        if let Some(id) = self.spawn_points.iter().find(|s| s.id.index == index).map(|s| s.id) {
            self.set_spawn_point(Some(id), events);
        } else {
            log::warn!("No spawn point with index {}", index);
        }
        self.request_reset(events)
    }

    pub fn reset_level(&mut self, events: &mut Vec<GameEvent>) -> Result<(), SimError> {
        self.set_spawn_id(0, events)
    }

    /// Advance per-frame sequences (reset transition, save light)
    pub fn advance_frame(&mut self, dt: f32, player: &mut dyn Player, events: &mut Vec<GameEvent>) {
        self.save_light.advance(dt);

        match self.reset.advance(dt) {
            ResetStep::None => {}
            ResetStep::PerformReset => self.perform_reset(player, events),
            ResetStep::Finished => {
                log::info!("Reset finished");
                events.push(GameEvent::ResetFinished);
            }
        }
    }

    fn perform_reset(&mut self, player: &mut dyn Player, events: &mut Vec<GameEvent>) {
        let (position, level) = match self.current_spawn_point() {
            Some(spawn) => (spawn.position, Some(spawn.level())),
            None => (Vec2::ZERO, self.player_level),
        };

        player.reset(position);
        events.push(GameEvent::PlayerReset);

        for platform in self.platforms.drain(..) {
            events.push(GameEvent::PlatformDestroyed(platform.id));
        }

        if let Some(level) = level {
            for hive in self.hives.iter_mut().filter(|h| h.level == level) {
                hive.reset(events);
            }
            self.reset_plants(level, events);
        }

        log::debug!("World reset at {:?}", position);
    }

    fn reset_plants(&mut self, level: LevelId, events: &mut Vec<GameEvent>) {
        for spawner in &mut self.spawners {
            spawner.reset_spawn_timer();
        }

        self.plants.retain_mut(|plant| {
            if plant.level != level {
                return true;
            }
            if !plant.respawns {
                events.push(GameEvent::PlantDestroyed(plant.id));
                return false;
            }
            plant.pop_timer = 0;
            if plant.state != PlantState::Default {
                plant.state = PlantState::Default;
                events.push(GameEvent::PlantStateChanged {
                    plant: plant.id,
                    state: PlantState::Default,
                });
            }
            true
        });
    }

    // === Entity events ===

    pub fn add_platform(&mut self, data: PlatformData) -> PlatformId {
        let id = PlatformId(self.next_platform);
        self.next_platform += 1;
        self.platforms.push(Platform { id, data });
        id
    }

    pub fn pop_blob(
        &mut self,
        hive_id: HiveId,
        blob: usize,
        player: &mut dyn Player,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        let Some(hive) = self.hives.iter_mut().find(|h| h.id == hive_id) else {
            log::error!("Could not find parent hive {:?} for popped blob", hive_id);
            return Err(SimError::UnknownHive(hive_id));
        };
        if blob >= hive.blobs.len() {
            log::error!("Blob {} out of range for hive {:?}", blob, hive_id);
            return Err(SimError::UnknownBlob { hive: hive_id, blob });
        }

        let deactivated = hive.pop(blob, self.tuning.blob_popped_for_ticks, events);
        events.push(GameEvent::PlaySound {
            cue: SoundCue::SmallBlop,
            at: hive.position,
        });
        events.push(GameEvent::AddTrauma(self.blob_pop_trauma));
        player.regain_dash();

        if deactivated {
            log::debug!("Hive {:?} deactivated", hive_id);
        }
        Ok(())
    }

    pub fn pop_reset_plant(
        &mut self,
        plant_id: PlantId,
        player: &mut dyn Player,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        let Some(index) = self.plants.iter().position(|p| p.id == plant_id) else {
            log::error!("Could not find reset plant {:?} to pop", plant_id);
            return Err(SimError::UnknownPlant(plant_id));
        };

        let plant = &mut self.plants[index];
        let at = plant.position;
        plant.state = PlantState::Destroyed;
        events.push(GameEvent::PlantStateChanged {
            plant: plant_id,
            state: PlantState::Destroyed,
        });

        if plant.respawns {
            plant.pop_timer = self.tuning.plant_popped_for_ticks;
        } else {
            self.plants.remove(index);
            events.push(GameEvent::PlantDestroyed(plant_id));
        }

        events.push(GameEvent::PlaySound {
            cue: SoundCue::SmallBlop,
            at,
        });
        player.regain_dash();
        Ok(())
    }

    /// Track a plant created by a spawner; it never respawns
    pub fn register_spawned_plant(&mut self, spawn: PlantSpawn, events: &mut Vec<GameEvent>) -> PlantId {
        let id = PlantId(self.next_plant);
        self.next_plant += 1;
        events.push(GameEvent::PlantSpawned {
            plant: id,
            at: spawn.position,
        });
        self.plants.push(ResetPlant::spawned(id, &spawn));
        id
    }

    // === Game flow ===

    pub fn on_intro_cutscene_finished(&mut self, player: &mut dyn Player, events: &mut Vec<GameEvent>) {
        self.game_state = GameState::Gameplay;
        player.set_visible(true);
        log::info!("Gameplay started");
        events.push(GameEvent::GameplayStarted);
    }

    // === Persistence ===

    pub fn save(&self) -> SaveData {
        SaveData::new(self.current_spawn, self.regain_dash_on_ground_contact)
    }

    /// Restore progress; the spawn point takes effect on the next level load
    pub fn load(&mut self, data: &SaveData) {
        self.spawn_to_start_from = data.spawn_point;
        self.regain_dash_on_ground_contact = data.regain_dash_on_ground_contact;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{HiveSpec, PlantSpec, SpawnPointSpec, SpawnerSpec};
    use crate::sim::spatial::Aabb;
    use crate::sim::state::{AreaId, PuppetPlayer};

    const LEVEL: LevelId = LevelId(1);

    fn level_data() -> LevelData {
        LevelData {
            spawn_points: vec![
                SpawnPointSpec {
                    index: 1,
                    area: AreaId(1),
                    position: Vec2::new(10.0, 0.0),
                    region: Aabb::from_center_size(Vec2::new(10.0, 0.0), Vec2::splat(2.0)),
                    visualized: true,
                },
                SpawnPointSpec {
                    index: 0,
                    area: AreaId(1),
                    position: Vec2::ZERO,
                    region: Aabb::from_center_size(Vec2::ZERO, Vec2::splat(2.0)),
                    visualized: false,
                },
            ],
            hives: vec![HiveSpec {
                position: Vec2::new(5.0, 5.0),
                blob_count: 2,
                deactivatable: true,
            }],
            plants: vec![PlantSpec {
                position: Vec2::new(3.0, 1.0),
            }],
            spawners: vec![SpawnerSpec {
                position: Vec2::new(4.0, 0.0),
                interval_ticks: 2,
                plant_velocity: Vec2::new(0.0, 0.1),
                plant_lifetime: Some(100),
            }],
        }
    }

    fn loaded_world(player: &mut PuppetPlayer) -> (WorldManager, LoadedLevel, Vec<GameEvent>) {
        let mut world = WorldManager::new(&Tuning::default());
        let mut events = Vec::new();
        let loaded = world.on_level_loaded(
            LEVEL,
            &level_data(),
            LevelLoadOptions {
                start_game_from_level: true,
                ..Default::default()
            },
            player,
            &mut events,
        );
        (world, loaded, events)
    }

    fn view() -> Option<CameraView> {
        Some(CameraView {
            position: Vec2::ZERO,
            collider_size: Vec2::new(21.3, 12.0),
        })
    }

    #[test]
    fn test_level_load_spawns_at_first_spawn_point() {
        let mut player = PuppetPlayer::at(Vec2::new(50.0, 50.0));
        let (world, loaded, events) = loaded_world(&mut player);

        assert!(world.player_spawned());
        assert_eq!(player.position, Vec2::ZERO);
        assert_eq!(world.spawn_points()[0].id.index, 0);
        assert_eq!(loaded.hives.len(), 1);
        assert!(events.contains(&GameEvent::PlayerReset));
        assert_eq!(world.game_state(), GameState::Gameplay);
    }

    #[test]
    fn test_spawn_point_notified_once() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let settings = Settings::default();

        let mut events = Vec::new();
        for _ in 0..3 {
            world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        }
        let reached: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::SpawnPointReached { .. }))
            .collect();
        assert_eq!(reached.len(), 1);
        assert_eq!(world.current_spawn_point().unwrap().id, SpawnPointId::new(LEVEL, 0));
    }

    #[test]
    fn test_visualized_spawn_point_starts_save_effect() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let settings = Settings::default();
        let mut events = Vec::new();

        world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        player.position = Vec2::new(10.0, 0.0);
        events.clear();
        world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);

        assert!(events.contains(&GameEvent::PlaySound {
            cue: SoundCue::StopFirePlant,
            at: Vec2::ZERO
        }));
        assert!(events.contains(&GameEvent::SaveEffectPlaced {
            at: Vec2::new(10.0, 0.5)
        }));
        assert!(world.save_light().is_running());
    }

    #[test]
    fn test_pop_blob_errors_and_deactivation() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, loaded, _) = loaded_world(&mut player);
        let hive = loaded.hives[0];
        let mut events = Vec::new();

        assert!(matches!(
            world.pop_blob(HiveId(99), 0, &mut player, &mut events),
            Err(SimError::UnknownHive(HiveId(99)))
        ));
        assert!(matches!(
            world.pop_blob(hive, 5, &mut player, &mut events),
            Err(SimError::UnknownBlob { blob: 5, .. })
        ));
        assert!(events.is_empty());

        player.dash_available = false;
        world.pop_blob(hive, 0, &mut player, &mut events).unwrap();
        assert!(player.dash_available);
        assert!(events.contains(&GameEvent::AddTrauma(0.3)));
        world.pop_blob(hive, 1, &mut player, &mut events).unwrap();
        assert!(!world.hive(hive).unwrap().active);
    }

    #[test]
    fn test_pop_respawning_plant_regrows() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, loaded, _) = loaded_world(&mut player);
        let plant = loaded.plants[0];
        let mut events = Vec::new();

        world.pop_reset_plant(plant, &mut player, &mut events).unwrap();
        assert_eq!(world.plant(plant).unwrap().state, PlantState::Destroyed);
        assert_eq!(world.plant(plant).unwrap().pop_timer, 180);

        let settings = Settings::default();
        for _ in 0..180 {
            world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        }
        assert_eq!(world.plant(plant).unwrap().state, PlantState::Default);
        assert_eq!(world.plant(plant).unwrap().pop_timer, ResetPlant::NOT_POPPED);
    }

    #[test]
    fn test_spawner_culled_by_camera_distance() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let settings = Settings::default();
        let far = Some(CameraView {
            position: Vec2::new(100.0, 0.0),
            collider_size: Vec2::new(21.3, 12.0),
        });
        let mut events = Vec::new();

        for _ in 0..4 {
            world.tick(&mut player, &TickInput::default(), far, &settings, &mut events);
        }
        assert_eq!(world.plants().len(), 1);

        for _ in 0..4 {
            world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        }
        assert_eq!(world.plants().len(), 3);
    }

    #[test]
    fn test_reset_clears_spawned_plants_and_platforms() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, loaded, _) = loaded_world(&mut player);
        let settings = Settings::default();
        let mut events = Vec::new();

        world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        assert_eq!(world.plants().len(), 2);
        world.add_platform(PlatformData {
            remaining_ticks: 100,
            vertices: Vec::new(),
        });
        world.pop_reset_plant(loaded.plants[0], &mut player, &mut events).unwrap();

        player.position = Vec2::new(30.0, 30.0);
        world.request_reset(&mut events).unwrap();
        let mut frames = 0;
        while world.is_resetting() && frames < 1000 {
            world.advance_frame(1.0 / 60.0, &mut player, &mut events);
            frames += 1;
        }

        assert!(!world.is_resetting());
        assert_eq!(player.position, Vec2::ZERO);
        assert!(world.platforms().is_empty());
        assert_eq!(world.plants().len(), 1);
        assert_eq!(world.plants()[0].state, PlantState::Default);
        assert_eq!(world.plants()[0].pop_timer, 0);
        assert_eq!(world.spawners()[0].timer, 2);
    }

    #[test]
    fn test_reset_input_needs_gameplay_and_threshold() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let mut events = Vec::new();

        world.handle_reset_input(0.05, &mut events);
        assert!(!world.is_resetting());

        world.set_accept_player_input(false);
        world.handle_reset_input(1.0, &mut events);
        world.handle_reset_input(0.0, &mut events);
        assert!(!world.is_resetting());

        world.set_accept_player_input(true);
        world.set_game_state(GameState::Cutscene);
        world.handle_reset_input(1.0, &mut events);
        world.handle_reset_input(0.0, &mut events);
        assert!(!world.is_resetting());

        world.set_game_state(GameState::Gameplay);
        world.handle_reset_input(1.0, &mut events);
        assert!(world.is_resetting());
    }

    #[test]
    fn test_held_reset_button_counts_once() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let mut events = Vec::new();

        // Blocked press stays consumed until the button is released
        world.set_accept_player_input(false);
        world.handle_reset_input(1.0, &mut events);
        world.set_accept_player_input(true);
        world.handle_reset_input(1.0, &mut events);
        assert!(!world.is_resetting());

        world.handle_reset_input(0.0, &mut events);
        world.handle_reset_input(0.5, &mut events);
        assert!(world.is_resetting());
        for _ in 0..200 {
            world.advance_frame(1.0 / 60.0, &mut player, &mut events);
            world.handle_reset_input(0.5, &mut events);
        }
        assert!(!world.is_resetting());
        let started = events.iter().filter(|e| **e == GameEvent::ResetStarted).count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_spawn_probe_uses_player_collider() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let mut events = Vec::new();
        let settings = Settings::default();

        // Just outside spawn 1's region [9, 11], within the collider radius
        player.position = Vec2::new(8.7, 0.0);
        world.tick(&mut player, &TickInput::default(), None, &settings, &mut events);
        assert_eq!(
            world.current_spawn_point().map(|s| s.id),
            Some(SpawnPointId::new(LEVEL, 1))
        );

        // Without a collider the tuned probe radius (0) applies
        let mut point = PuppetPlayer {
            radius: None,
            ..PuppetPlayer::at(Vec2::new(-1.3, 0.0))
        };
        world.tick(&mut point, &TickInput::default(), None, &settings, &mut events);
        assert_eq!(
            world.current_spawn_point().map(|s| s.id),
            Some(SpawnPointId::new(LEVEL, 1))
        );
        point.position = Vec2::new(-0.9, 0.0);
        world.tick(&mut point, &TickInput::default(), None, &settings, &mut events);
        assert_eq!(
            world.current_spawn_point().map(|s| s.id),
            Some(SpawnPointId::new(LEVEL, 0))
        );
    }

    #[test]
    fn test_intro_level_waits_for_input() {
        let tuning = Tuning {
            player: PlayerTuning {
                intro_cutscene_level: Some(LEVEL),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut world = WorldManager::new(&tuning);
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let mut events = Vec::new();
        world.on_level_loaded(
            LEVEL,
            &level_data(),
            LevelLoadOptions {
                start_game_from_level: true,
                ..Default::default()
            },
            &mut player,
            &mut events,
        );
        assert_eq!(world.game_state(), GameState::Pregameplay);
        assert!(!player.visible);

        let settings = Settings::default();
        world.tick(&mut player, &TickInput::default(), view(), &settings, &mut events);
        assert_eq!(world.game_state(), GameState::Pregameplay);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        world.tick(&mut player, &jump, view(), &settings, &mut events);
        assert_eq!(world.game_state(), GameState::Cutscene);
        assert!(events.contains(&GameEvent::IntroStarted));

        world.on_intro_cutscene_finished(&mut player, &mut events);
        assert_eq!(world.game_state(), GameState::Gameplay);
        assert!(player.visible);
        assert!(events.contains(&GameEvent::GameplayStarted));
    }

    #[test]
    fn test_unload_clears_current_spawn_point() {
        let mut player = PuppetPlayer::at(Vec2::ZERO);
        let (mut world, _, _) = loaded_world(&mut player);
        let mut events = Vec::new();
        world.tick(&mut player, &TickInput::default(), view(), &Settings::default(), &mut events);
        assert!(world.current_spawn_point().is_some());

        world.on_level_unloaded(LEVEL, &mut events);
        assert!(world.current_spawn_point().is_none());
        assert!(world.spawn_points().is_empty());
        assert!(world.hives().is_empty());
        assert!(world.plants().is_empty());
        assert!(world.spawners().is_empty());
    }
}
