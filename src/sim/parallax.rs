//! Parallax background layers
//!
//! Every layer tiles horizontally and covers a fixed share of the area (or of
//! the screen). Layer positions are a pure function of the camera position
//! and the active area: as the camera crosses the area from its root to its
//! far edge, each layer slides across its own extent, so larger layers drift
//! less relative to the camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::tuning::ParallaxTuning;

use super::state::{AreaId, SpriteId};

/// What a layer's covered size is relative to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayerSizing {
    /// Ratio of the area size
    Area(Vec2),
    /// Ratio of the camera's base visible size
    Screen(Vec2),
}

/// One configured layer of an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayerConfig {
    pub sprite: Option<SpriteId>,
    /// Sprite height in world units (texture height / pixels per unit)
    pub sprite_height: f32,
    pub sizing: LayerSizing,
}

/// Layer set and bounds for one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxAreaConfig {
    pub area: AreaId,
    /// Bottom-left corner of the area bounds
    pub root: Vec2,
    pub size: Vec2,
    pub layers: Vec<ParallaxLayerConfig>,
}

/// A layer slot as handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    pub sprite: Option<SpriteId>,
    /// Tiled sprite size before `scale`
    pub renderer_size: Vec2,
    /// Uniform renderer scale
    pub scale: f32,
    /// World-space extent covered by the layer
    pub dimensions: Vec2,
    /// World-space center of the layer
    pub position: Vec2,
}

impl Default for ParallaxLayer {
    fn default() -> Self {
        Self {
            sprite: None,
            renderer_size: Vec2::ONE,
            scale: 1.0,
            dimensions: Vec2::ONE,
            position: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParallaxRenderer {
    layers: Vec<ParallaxLayer>,
    current_area: Option<AreaId>,
    area_root: Vec2,
    area_size: Vec2,
    /// Base visible size of the camera (zoom 1)
    camera_dimensions: Vec2,
    /// Last camera position and visible size seen by `update_positions`
    last_view: Option<(Vec2, Vec2)>,
}

impl ParallaxRenderer {
    pub fn new(max_layers: usize, camera_dimensions: Vec2) -> Self {
        Self {
            layers: vec![ParallaxLayer::default(); max_layers],
            current_area: None,
            area_root: Vec2::ZERO,
            area_size: Vec2::ONE,
            camera_dimensions,
            last_view: None,
        }
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn current_area(&self) -> Option<AreaId> {
        self.current_area
    }

    /// Switch areas if the reached spawn point lies in a different one
    pub fn on_spawn_point_reached(
        &mut self,
        area: AreaId,
        tuning: &ParallaxTuning,
    ) -> Result<(), SimError> {
        if self.current_area == Some(area) {
            return Ok(());
        }
        self.switch_to_area(area, tuning)
    }

    /// Replace all layer assignments with the ones configured for `area`
    ///
    /// Leaves every layer untouched if the area has no configuration.
    pub fn switch_to_area(&mut self, area: AreaId, tuning: &ParallaxTuning) -> Result<(), SimError> {
        let Some(config) = tuning.area(area).filter(|c| !c.layers.is_empty()) else {
            log::error!("No parallax layers configured for area {:?}", area);
            return Err(SimError::MissingParallaxArea(area));
        };

        if config.layers.len() > self.layers.len() {
            log::warn!(
                "Area {:?} defines {} parallax layers, only {} are available",
                area,
                config.layers.len(),
                self.layers.len()
            );
        }

        self.area_root = config.root;
        self.area_size = config.size;

        self.layers = (0..self.layers.len())
            .map(|i| match config.layers.get(i) {
                Some(layer) => self.build_layer(layer),
                None => ParallaxLayer::default(),
            })
            .collect();

        log::info!("Parallax switched to area {:?}", area);
        self.current_area = Some(area);

        if let Some((position, size)) = self.last_view {
            self.update_positions(position, size);
        }
        Ok(())
    }

    fn build_layer(&self, config: &ParallaxLayerConfig) -> ParallaxLayer {
        let Some(sprite) = config.sprite else {
            return ParallaxLayer::default();
        };

        let covered = match config.sizing {
            LayerSizing::Area(ratio) => self.area_size * ratio,
            LayerSizing::Screen(ratio) => self.camera_dimensions * ratio,
        };

        // Sprite is drawn exactly once vertically; tiling fills the width
        let scale = if self.camera_dimensions.y > 0.0 {
            covered.y / self.camera_dimensions.y
        } else {
            1.0
        };
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let renderer_size = Vec2::new(covered.x / scale, config.sprite_height);

        ParallaxLayer {
            sprite: Some(sprite),
            renderer_size,
            scale,
            dimensions: renderer_size * scale,
            position: Vec2::ZERO,
        }
    }

    /// Reposition every layer for the camera at `camera_position` showing `camera_size`
    pub fn update_positions(&mut self, camera_position: Vec2, camera_size: Vec2) {
        self.last_view = Some((camera_position, camera_size));
        if self.current_area.is_none() {
            return;
        }

        let offset = camera_position - self.area_root;
        let progress = Vec2::new(
            progress(offset.x, self.area_size.x),
            progress(offset.y, self.area_size.y),
        );

        for layer in &mut self.layers {
            if layer.dimensions.length() == 0.0 {
                continue;
            }
            let drift = offset - (layer.dimensions - camera_size) * progress;
            let origin = self.area_root + layer.dimensions / 2.0 - camera_size / 2.0;
            layer.position = origin + drift;
        }
    }
}

#[inline]
fn progress(offset: f32, extent: f32) -> f32 {
    if extent == 0.0 { 0.0 } else { offset / extent }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMERA: Vec2 = Vec2::new(16.0 / 9.0 * 12.0, 12.0);

    fn tuning() -> ParallaxTuning {
        ParallaxTuning {
            max_layers: 3,
            areas: vec![
                ParallaxAreaConfig {
                    area: AreaId(1),
                    root: Vec2::new(0.0, 0.0),
                    size: Vec2::new(200.0, 60.0),
                    layers: vec![
                        ParallaxLayerConfig {
                            sprite: Some(SpriteId(10)),
                            sprite_height: 24.0,
                            sizing: LayerSizing::Screen(Vec2::new(4.0, 2.0)),
                        },
                        ParallaxLayerConfig {
                            sprite: Some(SpriteId(11)),
                            sprite_height: 12.0,
                            sizing: LayerSizing::Area(Vec2::new(0.5, 0.5)),
                        },
                    ],
                },
                ParallaxAreaConfig {
                    area: AreaId(2),
                    root: Vec2::new(300.0, 0.0),
                    size: Vec2::new(100.0, 40.0),
                    layers: vec![ParallaxLayerConfig {
                        sprite: Some(SpriteId(20)),
                        sprite_height: 12.0,
                        sizing: LayerSizing::Screen(Vec2::ONE),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_switch_sizes_layers() {
        let tuning = tuning();
        let mut parallax = ParallaxRenderer::new(3, CAMERA);
        parallax.switch_to_area(AreaId(1), &tuning).unwrap();

        let screen = &parallax.layers()[0];
        assert_eq!(screen.sprite, Some(SpriteId(10)));
        assert!((screen.scale - 2.0).abs() < 1e-6);
        assert!((screen.dimensions.x - CAMERA.x * 4.0).abs() < 1e-4);
        assert!((screen.dimensions.y - 48.0).abs() < 1e-4);

        let area = &parallax.layers()[1];
        assert!((area.scale - 2.5).abs() < 1e-6);
        assert!((area.dimensions.x - 100.0).abs() < 1e-4);

        // Unused slot is neutral
        assert_eq!(parallax.layers()[2], ParallaxLayer::default());
    }

    #[test]
    fn test_missing_area_keeps_layers() {
        let tuning = tuning();
        let mut parallax = ParallaxRenderer::new(3, CAMERA);
        parallax.switch_to_area(AreaId(1), &tuning).unwrap();
        let before = parallax.layers().to_vec();

        assert!(matches!(
            parallax.switch_to_area(AreaId(9), &tuning),
            Err(SimError::MissingParallaxArea(AreaId(9)))
        ));
        assert_eq!(parallax.layers(), before.as_slice());
        assert_eq!(parallax.current_area(), Some(AreaId(1)));
    }

    #[test]
    fn test_spawn_point_in_same_area_does_nothing() {
        let tuning = tuning();
        let mut parallax = ParallaxRenderer::new(3, CAMERA);
        parallax.on_spawn_point_reached(AreaId(2), &tuning).unwrap();
        assert_eq!(parallax.current_area(), Some(AreaId(2)));
        assert_eq!(parallax.layers()[1], ParallaxLayer::default());
        parallax.on_spawn_point_reached(AreaId(2), &tuning).unwrap();
        assert_eq!(parallax.current_area(), Some(AreaId(2)));
    }

    #[test]
    fn test_layer_drift_spans_area() {
        let tuning = tuning();
        let mut parallax = ParallaxRenderer::new(3, CAMERA);
        parallax.switch_to_area(AreaId(1), &tuning).unwrap();

        // Camera at the root: layer's bottom-left lines up with the view's
        parallax.update_positions(Vec2::ZERO, CAMERA);
        let layer = parallax.layers()[0].clone();
        let bottom_left = layer.position - layer.dimensions / 2.0;
        assert!((bottom_left - (-CAMERA / 2.0)).length() < 1e-3);

        // Camera at the far corner: layer's top-right lines up with the view's
        let far = Vec2::new(200.0, 60.0);
        parallax.update_positions(far, CAMERA);
        let layer = &parallax.layers()[0];
        let top_right = layer.position + layer.dimensions / 2.0;
        assert!((top_right - (far + CAMERA / 2.0)).length() < 1e-3);
    }

    #[test]
    fn test_switch_repositions_with_last_view() {
        let tuning = tuning();
        let mut parallax = ParallaxRenderer::new(3, CAMERA);
        parallax.update_positions(Vec2::new(310.0, 5.0), CAMERA);
        assert_eq!(parallax.layers()[0].position, Vec2::ZERO);

        parallax.switch_to_area(AreaId(2), &tuning).unwrap();
        assert_ne!(parallax.layers()[0].position, Vec2::ZERO);
    }
}
