//! Camera controller
//!
//! Follows the player with a threshold rectangle, look-ahead and two stages of
//! smoothing; collides with camera geometry one axis at a time; interpolates
//! zoom for anchor zones; and layers trauma shake on top.
//!
//! The late tick runs four phases in a fixed order, each reading what the
//! previous one wrote:
//! 1. mode: desired focus -> reachable focus -> smoothed focus
//! 2. movement: holder moves toward the focus, stopped by colliders
//! 3. scale: zoom transition
//! 4. trauma: shake decay and offset

use glam::Vec2;

use crate::consts::{
    ANCHOR_PROBE_PADDING, FOCUS_REACHED_EPSILON, LOCKED_SPEED_MULTIPLIER,
    MAX_OUTSIDE_THRESHOLD_FACTOR, MIN_MOVE_FACTOR, MIN_SIMILARITY_FACTOR, SIGNIFICANT_MOVE,
    SLOW_MOVE_DISTANCE, THRESHOLD_ASPECT_Y,
};
use crate::settings::Settings;
use crate::tuning::CameraTuning;
use crate::{SimError, lerp_angle_deg, lerp_clamped, remap};

use super::anchor::{AnchorZone, AnchorZones};
use super::events::GameEvent;
use super::shake::Shake;
use super::spatial::{RaycastHit, SpatialQuery};
use super::state::{AnchorZoneId, CameraMode, Player};

/// Diagnostics recorded each tick while the debug overlay is on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraDebugInfo {
    pub mode: CameraMode,
    pub anchor_zone: Option<AnchorZoneId>,
    pub holder: Vec2,
    pub focus: Vec2,
    pub reachable_focus: Vec2,
    /// Half extents of the follow threshold rectangle around the holder
    pub threshold: Vec2,
    pub unclamped_move: Vec2,
    pub collided_x: bool,
    pub collided_y: bool,
}

/// State of an in-flight zoom transition
#[derive(Debug, Clone, Copy, Default)]
struct ZoomTransition {
    from: f32,
    to: f32,
    remaining: f32,
    duration: f32,
}

#[derive(Debug)]
pub struct CameraController {
    tuning: CameraTuning,
    mode: CameraMode,
    zones: AnchorZones,
    current_zone: Option<AnchorZoneId>,

    /// Half extents of the visible area at zoom 1
    base_half: Vec2,
    zoom: f32,
    zoom_transition: ZoomTransition,

    /// Camera holder position; `None` until a camera is attached
    holder: Option<Vec2>,
    focus: Vec2,
    last_move_dir: Vec2,
    collided_x: bool,
    collided_y: bool,

    shake: Shake,
    elapsed: f32,
    tick_calls: u64,
    debug: Option<CameraDebugInfo>,
    pending: Vec<GameEvent>,
}

impl CameraController {
    pub fn new(tuning: &CameraTuning, seed: u32) -> Self {
        Self {
            tuning: tuning.clone(),
            mode: CameraMode::FocusPlayer,
            zones: AnchorZones::default(),
            current_zone: None,
            base_half: tuning.base_half_size(),
            zoom: 1.0,
            zoom_transition: ZoomTransition::default(),
            holder: None,
            focus: Vec2::ZERO,
            last_move_dir: Vec2::X,
            collided_x: false,
            collided_y: false,
            shake: Shake::new(seed),
            elapsed: 0.0,
            tick_calls: 0,
            debug: None,
            pending: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn focus(&self) -> Vec2 {
        self.focus
    }

    pub fn current_anchor_zone(&self) -> Option<AnchorZoneId> {
        self.current_zone
    }

    pub fn is_anchored(&self) -> bool {
        self.current_zone.is_some()
    }

    pub fn zones(&self) -> &AnchorZones {
        &self.zones
    }

    pub fn holder_position(&self) -> Option<Vec2> {
        self.holder
    }

    /// Final camera position (holder plus shake offset)
    pub fn position(&self) -> Option<Vec2> {
        self.holder.map(|h| h + self.shake.offset())
    }

    pub fn shake(&self) -> &Shake {
        &self.shake
    }

    pub fn trauma(&self) -> f32 {
        self.shake.trauma()
    }

    pub fn collided_last_tick(&self) -> (bool, bool) {
        (self.collided_x, self.collided_y)
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom_transition.remaining > 0.0
    }

    pub fn debug_info(&self) -> Option<&CameraDebugInfo> {
        self.debug.as_ref()
    }

    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Full visible size at the current zoom
    pub fn camera_collider_size(&self) -> Vec2 {
        self.base_half * 2.0 / self.zoom
    }

    /// Orthographic half height at the current zoom
    pub fn visible_half_height(&self) -> f32 {
        self.base_half.y / self.zoom
    }

    /// Events for the host (anchor collider toggles)
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    // === Camera holder ===

    pub fn attach_holder(&mut self, position: Vec2) {
        self.holder = Some(position);
        self.focus = position;
    }

    pub fn detach_holder(&mut self) {
        log::warn!("Camera holder detached");
        self.holder = None;
    }

    /// Jump to `position` without smoothing
    pub fn focus_on(&mut self, position: Vec2) {
        let Some(holder) = self.holder.as_mut() else {
            log::error!("No camera holder to focus");
            return;
        };
        *holder = position;
        self.focus = position;
    }

    // === Anchor zones ===

    pub fn add_anchor_zone(&mut self, zone: AnchorZone) -> AnchorZoneId {
        self.zones.insert(zone)
    }

    pub fn remove_anchor_zone(&mut self, id: AnchorZoneId) -> Option<AnchorZone> {
        if self.current_zone == Some(id) {
            self.current_zone = None;
            if self.mode != CameraMode::LockOnPlayer {
                self.mode = CameraMode::TransitionToFocusPlayer;
            }
        }
        self.zones.remove(id)
    }

    pub fn enter_anchor_zone(&mut self, id: AnchorZoneId) -> Result<(), SimError> {
        let Some(target_zoom) = self.zones.get(id).map(|z| z.zoom) else {
            log::error!("Entered unknown anchor zone {:?}", id);
            return Err(SimError::UnknownAnchorZone(id));
        };

        if let Some(previous) = self.current_zone.filter(|&p| p != id) {
            self.set_zone_colliders(previous, false);
        }

        log::debug!("Enter anchor zone {:?}", id);
        self.current_zone = Some(id);
        self.mode = CameraMode::TransitionToAnchorZone;
        self.zoom_to(target_zoom, self.tuning.zoom_time);
        self.set_zone_colliders(id, true);
        Ok(())
    }

    /// Leave `id`; a no-op unless it is the current zone
    pub fn leave_anchor_zone(&mut self, id: AnchorZoneId) {
        if self.current_zone != Some(id) {
            // Happens when overlapping zones report enter before leave
            log::debug!("Left anchor zone {:?} that is not current", id);
            return;
        }

        log::debug!("Leave anchor zone {:?}", id);
        self.zoom_to(1.0, self.tuning.zoom_time);
        self.set_zone_colliders(id, false);
        self.current_zone = None;
        if self.mode != CameraMode::LockOnPlayer {
            self.mode = CameraMode::TransitionToFocusPlayer;
        }
    }

    fn set_zone_colliders(&mut self, id: AnchorZoneId, active: bool) {
        if let Some(zone) = self.zones.get_mut(id) {
            if zone.colliders_active() != active {
                zone.set_colliders_active(active);
                self.pending
                    .push(GameEvent::AnchorCollidersActive { zone: id, active });
            }
        }
    }

    /// Lock onto the player, or release back to smooth following
    pub fn set_locked(&mut self, locked: bool) {
        self.mode = if locked {
            CameraMode::LockOnPlayer
        } else {
            CameraMode::TransitionToFocusPlayer
        };
    }

    // === Zoom ===

    /// Set the zoom factor immediately (visible half height = base / factor)
    pub fn set_zoom(&mut self, factor: f32) {
        if !(factor > 0.0 && factor.is_finite()) {
            log::warn!("Ignoring invalid zoom factor {}", factor);
            return;
        }
        self.zoom = factor;
    }

    /// Start a zoom transition; returns the zoom before the call
    pub fn zoom_to(&mut self, target: f32, duration: f32) -> f32 {
        let previous = self.zoom;
        if !(target > 0.0 && target.is_finite()) {
            log::warn!("Ignoring invalid zoom target {}", target);
            return previous;
        }

        if duration <= 0.0 {
            self.zoom_transition = ZoomTransition::default();
            self.set_zoom(target);
            return previous;
        }

        self.zoom_transition = ZoomTransition {
            from: previous,
            to: target,
            remaining: duration,
            duration,
        };
        previous
    }

    // === Shake ===

    pub fn add_trauma(&mut self, amount: f32) {
        self.shake.add_trauma(amount);
    }

    pub fn reset_trauma(&mut self) {
        self.shake.reset();
    }

    // === Notifications ===

    pub fn on_player_death(&mut self) {
        self.add_trauma(self.tuning.trauma_on_player_death);
    }

    /// Re-frame instantly after a respawn, never starting inside a wall
    pub fn on_player_reset(
        &mut self,
        player: &dyn Player,
        spatial: &dyn SpatialQuery,
        settings: &Settings,
    ) {
        if settings.freeze_camera {
            return;
        }
        if self.holder.is_none() {
            log::debug!("Player reset without a camera holder");
            return;
        }

        self.zoom_transition = ZoomTransition::default();
        self.set_zoom(1.0);

        let player_pos = player.position();
        let probe_radius = player.collider_radius().unwrap_or(0.0) + ANCHOR_PROBE_PADDING;
        let zone = spatial
            .circle_overlap(player_pos, probe_radius, self.tuning.camera_layer_mask)
            .and_then(|collider| self.zones.zone_for_collider(collider));

        let mut position = match zone {
            Some(id) => {
                if self.current_zone != Some(id) {
                    // Known to exist: it was just looked up
                    let _ = self.enter_anchor_zone(id);
                } else {
                    self.mode = CameraMode::TransitionToAnchorZone;
                }

                let size = self.camera_collider_size();
                if let Some(zone) = self.zones.get(id) {
                    let target = zone.target_camera_position(size, player_pos);
                    let zoom = zone.zoom;
                    self.focus_on(target);
                    self.set_zoom(zoom);
                }
                self.zoom_transition = ZoomTransition::default();
                self.holder.unwrap_or(player_pos)
            }
            None => {
                if let Some(previous) = self.current_zone.take() {
                    self.set_zone_colliders(previous, false);
                }
                self.mode = CameraMode::FocusPlayer;
                player_pos
            }
        };

        let pad = self.base_half / self.zoom;
        let mask = self.tuning.camera_layer_mask;

        let down = spatial.raycast(position, -Vec2::Y, pad.y, mask);
        if let Some(hit) = self.first_blocking(&down, false) {
            position.y = hit.point.y + pad.y;
        }

        for dir in [Vec2::X, -Vec2::X] {
            let hits = spatial.raycast(position, dir, pad.x, mask);
            if let Some(hit) = self.first_blocking(&hits, false) {
                let side = if hit.point.x < position.x { 1.0 } else { -1.0 };
                position.x = hit.point.x + side * pad.x;
            }
        }

        self.focus_on(position);
    }

    /// First hit that blocks the camera
    ///
    /// Triggers never block. Colliders of an inactive anchor zone never block;
    /// those of the active zone block unless `ignore_anchor` is set.
    fn first_blocking<'a>(
        &self,
        hits: &'a [RaycastHit],
        ignore_anchor: bool,
    ) -> Option<&'a RaycastHit> {
        hits.iter().find(|hit| {
            if hit.is_trigger {
                return false;
            }
            match self.zones.camera_collider_state(hit.collider) {
                Some(active) => active && !ignore_anchor,
                None => true,
            }
        })
    }

    // === Late tick ===

    /// Advance the camera by one frame of `dt` seconds
    pub fn late_tick(
        &mut self,
        player: Option<&dyn Player>,
        spatial: &dyn SpatialQuery,
        settings: &Settings,
        dt: f32,
    ) {
        if settings.freeze_camera {
            return;
        }

        self.tick_calls += 1;
        if !settings.camera_runs_on(self.tick_calls) {
            return;
        }
        self.elapsed += dt;

        let (Some(player), Some(_)) = (player, self.holder) else {
            log::debug!("Camera tick skipped: no player or no camera holder");
            return;
        };

        let mut debug = settings.debug_overlay.then(CameraDebugInfo::default);

        self.tick_mode(player, dt, debug.as_mut());
        self.tick_movement(spatial, dt, debug.as_mut());
        self.tick_scale(dt);
        self.shake
            .tick(self.elapsed, &self.tuning, settings.effective_screen_shake());

        if let Some(info) = debug.as_mut() {
            info.mode = self.mode;
            info.anchor_zone = self.current_zone;
            info.holder = self.holder.unwrap_or_default();
            info.focus = self.focus;
            info.collided_x = self.collided_x;
            info.collided_y = self.collided_y;
        }
        self.debug = debug;
    }

    fn tick_mode(&mut self, player: &dyn Player, dt: f32, debug: Option<&mut CameraDebugInfo>) {
        let holder = self.holder.unwrap_or_default();
        let size = self.camera_collider_size();
        let player_pos = player.position();

        // 1) Desired focus
        let follow = |p: &dyn Player| {
            p.position()
                + p.smooth_moving_direction() * self.tuning.movement_direction_offset_percentages * size
        };
        let desired = match self.mode {
            CameraMode::FocusPlayer | CameraMode::TransitionToFocusPlayer | CameraMode::LockOnPlayer => {
                follow(player)
            }
            CameraMode::TransitionToAnchorZone => match self.current_zone.and_then(|id| self.zones.get(id)) {
                Some(zone) => zone.target_camera_position(size, player_pos),
                None => follow(player),
            },
        };

        // 2) Reachable focus
        let extents = self.visible_half_height() * Vec2::new(1.0, THRESHOLD_ASPECT_Y);
        let threshold = extents
            * Vec2::new(
                1.0 - self.tuning.move_threshold_percentage_x,
                1.0 - self.tuning.move_threshold_percentage_y,
            );

        let mut factor = Vec2::ONE;
        let mut reachable = desired;
        if matches!(
            self.mode,
            CameraMode::FocusPlayer | CameraMode::TransitionToFocusPlayer
        ) {
            let delta = desired - holder;
            reachable = holder;
            for axis in 0..2 {
                let abs_delta = delta[axis].abs();
                factor[axis] = remap(abs_delta, threshold[axis], extents[axis], 1.0, MAX_OUTSIDE_THRESHOLD_FACTOR)
                    .clamp(1.0, MAX_OUTSIDE_THRESHOLD_FACTOR);
                if abs_delta > threshold[axis] {
                    // Pull the holder just far enough to bring the target back to the edge
                    reachable[axis] += delta[axis] - threshold[axis].copysign(delta[axis]);
                }
            }
        }

        // 3) Smoothed focus
        if self.mode == CameraMode::LockOnPlayer {
            self.focus = reachable;
        } else {
            let rate = self.tuning.smoothness * dt;
            self.focus = Vec2::new(
                lerp_clamped(self.focus.x, reachable.x, rate * factor.x),
                lerp_clamped(self.focus.y, reachable.y, rate * factor.y),
            );
        }

        // 4) Settle transitional modes
        let focus_delta = self.focus - holder;
        if focus_delta.x.abs() < FOCUS_REACHED_EPSILON && focus_delta.y.abs() < FOCUS_REACHED_EPSILON {
            self.mode = self.mode.settled();
        }

        if let Some(info) = debug {
            info.reachable_focus = reachable;
            info.threshold = threshold;
        }
    }

    fn tick_movement(&mut self, spatial: &dyn SpatialQuery, dt: f32, debug: Option<&mut CameraDebugInfo>) {
        let holder = self.holder.unwrap_or_default();
        let locked = self.mode == CameraMode::LockOnPlayer;

        let mut unclamped = self.focus - holder;
        let mut unclamped_len = unclamped.length();

        let similarity = self.last_move_dir.dot((holder - self.focus).normalize_or_zero());
        let similarity_factor = remap(similarity, -1.0, 1.0, MIN_SIMILARITY_FACTOR, 1.0);

        if !locked {
            let rate = self.tuning.smoothness_2 * dt * similarity_factor;
            unclamped = self.focus - holder.lerp(self.focus, rate.clamp(0.0, 1.0));
            unclamped_len = unclamped.length();
        }

        self.collided_x = false;
        self.collided_y = false;
        if let Some(info) = debug {
            info.unclamped_move = unclamped;
        }

        if unclamped.x.abs() < SIGNIFICANT_MOVE && unclamped.y.abs() < SIGNIFICANT_MOVE {
            return;
        }

        let ignore_anchor = self.mode.ignores_anchor_colliders();
        let pad = self.base_half / self.zoom;
        let mask = self.tuning.camera_layer_mask;
        let mut next = holder;

        // One axis at a time: X first, then Y from the X-resolved position
        for (axis, dir) in [(0, Vec2::X), (1, Vec2::Y)] {
            let step = unclamped[axis];
            if step.abs() <= SIGNIFICANT_MOVE {
                continue;
            }

            let sign = step.signum();
            let mut after = next;
            after[axis] += step;

            let hits = spatial.raycast(next, dir * sign, pad[axis] + step.abs(), mask);
            if let Some(hit) = self.first_blocking(&hits, ignore_anchor) {
                after[axis] = hit.point[axis] - sign * pad[axis];
                if axis == 0 {
                    self.collided_x = true;
                } else {
                    self.collided_y = true;
                }
            }
            next = after;
        }

        let mut max_move = lerp_clamped(
            self.tuning.max_speed_free_cam * MIN_MOVE_FACTOR,
            self.tuning.max_speed_free_cam,
            unclamped_len / SLOW_MOVE_DISTANCE,
        );
        if locked {
            max_move *= LOCKED_SPEED_MULTIPLIER;
        }

        let delta = (next - holder).clamp(Vec2::splat(-max_move), Vec2::splat(max_move));

        self.last_move_dir = if locked {
            delta.normalize_or_zero()
        } else {
            self.last_move_dir
                .normalize_or_zero()
                .lerp(delta.normalize_or_zero(), similarity_factor)
        };

        self.holder = Some(holder + delta);
    }

    fn tick_scale(&mut self, dt: f32) {
        let transition = &mut self.zoom_transition;
        if transition.remaining <= 0.0 {
            return;
        }

        transition.remaining -= dt;
        let zoom = if transition.remaining <= 0.0 {
            transition.remaining = 0.0;
            transition.to
        } else {
            let t = 1.0 - transition.remaining / transition.duration;
            lerp_angle_deg(transition.from, transition.to, t)
        };
        self.set_zoom(zoom);
    }
}
