//! Thicket demo driver
//!
//! Builds a small box-collider level with two spawn points and a camera
//! anchor zone, then walks a puppet player through it and logs what the
//! camera, parallax and world do. Pass a seed as the first argument.

use glam::Vec2;

use thicket::consts::SIM_DT;
use thicket::persistence;
use thicket::sim::entities::{HiveSpec, SpawnPointSpec};
use thicket::sim::{
    Aabb, AnchorZone, AreaId, BoxWorld, LayerMask, LayerSizing, LevelData, LevelId,
    LevelLoadOptions, ParallaxAreaConfig, ParallaxLayerConfig, PuppetPlayer, Simulation, SpriteId,
    TickInput,
};
use thicket::{Settings, Tuning};

const LEVEL: LevelId = LevelId(0);

fn demo_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.parallax.areas = vec![
        ParallaxAreaConfig {
            area: AreaId(0),
            root: Vec2::new(-10.0, -5.0),
            size: Vec2::new(60.0, 30.0),
            layers: vec![
                ParallaxLayerConfig {
                    sprite: Some(SpriteId(1)),
                    sprite_height: 12.0,
                    sizing: LayerSizing::Screen(Vec2::new(3.0, 1.5)),
                },
                ParallaxLayerConfig {
                    sprite: Some(SpriteId(2)),
                    sprite_height: 12.0,
                    sizing: LayerSizing::Area(Vec2::new(0.8, 0.8)),
                },
            ],
        },
        ParallaxAreaConfig {
            area: AreaId(1),
            root: Vec2::new(50.0, -5.0),
            size: Vec2::new(40.0, 30.0),
            layers: vec![ParallaxLayerConfig {
                sprite: Some(SpriteId(3)),
                sprite_height: 12.0,
                sizing: LayerSizing::Screen(Vec2::new(2.0, 1.0)),
            }],
        },
    ];
    tuning
}

fn demo_level() -> LevelData {
    LevelData {
        spawn_points: vec![
            SpawnPointSpec {
                index: 0,
                area: AreaId(0),
                position: Vec2::ZERO,
                region: Aabb::from_center_size(Vec2::ZERO, Vec2::splat(2.0)),
                visualized: false,
            },
            SpawnPointSpec {
                index: 1,
                area: AreaId(1),
                position: Vec2::new(55.0, 0.0),
                region: Aabb::from_center_size(Vec2::new(55.0, 0.0), Vec2::splat(2.0)),
                visualized: true,
            },
        ],
        hives: vec![HiveSpec {
            position: Vec2::new(20.0, 3.0),
            blob_count: 3,
            deactivatable: true,
        }],
        ..Default::default()
    }
}

fn demo_world() -> (BoxWorld, Aabb) {
    let mut world = BoxWorld::new();
    let solid = LayerMask::DEFAULT | LayerMask::CAMERA;
    // Floor and outer walls
    world.add_solid(Aabb::new(Vec2::new(-30.0, -6.0), Vec2::new(120.0, -1.0)), solid);
    world.add_solid(Aabb::new(Vec2::new(-30.0, -6.0), Vec2::new(-20.0, 40.0)), solid);
    world.add_solid(Aabb::new(Vec2::new(110.0, -6.0), Vec2::new(120.0, 40.0)), solid);

    let zone = Aabb::new(Vec2::new(25.0, -1.0), Vec2::new(40.0, 10.0));
    (world, zone)
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Thicket demo starting with seed {}", seed);

    let (mut spatial, zone_bounds) = demo_world();
    let trigger = spatial.add_trigger(zone_bounds, LayerMask::CAMERA);
    let mut sim = Simulation::new(
        demo_tuning(),
        Settings::default(),
        PuppetPlayer::at(Vec2::ZERO),
        spatial,
        seed,
    );
    let zone = sim.add_anchor_zone(AnchorZone::new(zone_bounds, 0.8, trigger));

    let loaded = sim.load_level(
        LEVEL,
        &demo_level(),
        LevelLoadOptions {
            start_game_from_level: true,
            ..Default::default()
        },
    );

    let right = TickInput {
        stick: Vec2::X,
        ..Default::default()
    };
    let mut in_zone = false;
    for frame in 0..900 {
        sim.frame(&right, SIM_DT);

        // The host owns trigger detection; mimic it with the zone bounds
        let inside = zone_bounds.contains(sim.player().position);
        if inside != in_zone {
            in_zone = inside;
            if inside {
                if let Err(err) = sim.enter_anchor_zone(zone) {
                    log::error!("{}", err);
                }
            } else {
                sim.leave_anchor_zone(zone);
            }
        }

        if frame == 200 {
            if let Some(&hive) = loaded.hives.first() {
                if let Err(err) = sim.pop_blob(hive, 0) {
                    log::error!("{}", err);
                }
            }
        }

        for event in sim.drain_events() {
            log::debug!("frame {}: {:?}", frame, event);
        }

        if frame % 60 == 0 {
            log::info!(
                "frame {:>3}: player {:?} camera {:?} mode {:?} zoom {:.2} area {:?}",
                frame,
                sim.player().position,
                sim.camera().position(),
                sim.camera().mode(),
                sim.camera().zoom(),
                sim.parallax().current_area()
            );
        }
    }

    // Kill the player and let the reset sequence run
    sim.notify(thicket::sim::GameEvent::PlayerDeath);
    for _ in 0..120 {
        sim.frame(&TickInput::default(), SIM_DT);
    }
    log::info!(
        "After reset: player {:?}, trauma {:.2}",
        sim.player().position,
        sim.camera().trauma()
    );

    match persistence::encode(&sim.save()) {
        Ok(json) => log::info!("Save: {}", json),
        Err(err) => log::error!("Could not encode save: {}", err),
    }
}
