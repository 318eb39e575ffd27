//! Procedural sci-fi environment: metallic floor, four perimeter walls and a
//! scatter of neon point lights with glowing bulbs.
//!
//! Generation is split in two steps. [`generate`] turns an
//! [`EnvironmentConfig`] into a plain [`EnvironmentLayout`] (deterministic for
//! a given seed) and [`EnvironmentLayout::spawn`] writes it into a [`Scene`].

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mamba_config::EnvironmentConfig;

use crate::rgb;
use crate::scene::{Atmosphere, Material, NodeId, NodeKind, PointLight, Scene};

const WALL_THICKNESS: f32 = 0.5;
const GLOW_SCALE: f32 = 0.3;
const NEON_HEIGHT: std::ops::Range<f32> = 2.0..4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WallSpec {
    pub name: &'static str,
    pub position: Vec3,
    pub size: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeonSpec {
    pub name: String,
    pub position: Vec3,
    pub light: PointLight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentLayout {
    pub floor_material: Material,
    pub wall_material: Material,
    /// Floor plane scale; the plane spans `grid_size` tiles per side.
    pub floor_scale: Vec3,
    pub floor_tiling: f32,
    pub walls: Vec<WallSpec>,
    pub neon_lights: Vec<NeonSpec>,
    pub atmosphere: Atmosphere,
}

/// Half the side length of the walled area.
pub fn half_extent(config: &EnvironmentConfig) -> f32 {
    config.grid_size as f32 * config.tile_size / 2.0
}

pub fn generate(config: &EnvironmentConfig) -> EnvironmentLayout {
    let grid = config.grid_size as f32;
    let side = grid * config.tile_size;
    let half = side / 2.0;
    let h = config.wall_height;

    let floor_material = Material {
        color: Vec3::new(0.1, 0.1, 0.15),
        metallic: config.metallic,
        gloss: config.smoothness,
        emission: None,
    };
    let wall_material = Material {
        color: Vec3::new(0.15, 0.15, 0.2),
        metallic: config.metallic * 0.8,
        gloss: config.smoothness * 0.9,
        emission: None,
    };

    let walls = vec![
        WallSpec {
            name: "WallNorth",
            position: Vec3::new(0.0, h / 2.0, half),
            size: Vec3::new(side, h, WALL_THICKNESS),
        },
        WallSpec {
            name: "WallSouth",
            position: Vec3::new(0.0, h / 2.0, -half),
            size: Vec3::new(side, h, WALL_THICKNESS),
        },
        WallSpec {
            name: "WallEast",
            position: Vec3::new(half, h / 2.0, 0.0),
            size: Vec3::new(WALL_THICKNESS, h, side),
        },
        WallSpec {
            name: "WallWest",
            position: Vec3::new(-half, h / 2.0, 0.0),
            size: Vec3::new(WALL_THICKNESS, h, side),
        },
    ];

    // Lights stay in the inner two thirds so they never clip the walls.
    let spread = side / 3.0;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let neon_lights = (0..config.neon_light_count)
        .map(|i| {
            let color = if i % 2 == 0 {
                rgb(config.neon_color_a)
            } else {
                rgb(config.neon_color_b)
            };
            let x = rng.gen_range(-spread..spread);
            let y = rng.gen_range(NEON_HEIGHT);
            let z = rng.gen_range(-spread..spread);
            NeonSpec {
                name: format!("NeonLight_{i}"),
                position: Vec3::new(x, y, z),
                light: PointLight {
                    color,
                    intensity: config.neon_intensity,
                    range: config.neon_range,
                },
            }
        })
        .collect();

    EnvironmentLayout {
        floor_material,
        wall_material,
        floor_scale: Vec3::new(grid, 1.0, grid),
        floor_tiling: grid * 2.0,
        walls,
        neon_lights,
        atmosphere: Atmosphere {
            ambient: Vec3::new(0.05, 0.05, 0.1),
            fog_color: Vec3::new(0.05, 0.1, 0.15),
            fog_density: 0.02,
            fog_enabled: true,
        },
    }
}

impl EnvironmentLayout {
    /// Write the layout into `scene` under a new group named `root_name` and
    /// return that group. The scene atmosphere is overwritten.
    pub fn spawn(&self, scene: &mut Scene, parent: Option<NodeId>, root_name: &str) -> NodeId {
        let root = scene.spawn(root_name, NodeKind::Group, parent, Vec3::ZERO, Vec3::ONE);

        scene.spawn(
            "Floor",
            NodeKind::Floor {
                material: self.floor_material,
                tiling: self.floor_tiling,
            },
            Some(root),
            Vec3::ZERO,
            self.floor_scale,
        );

        for wall in &self.walls {
            scene.spawn(
                wall.name,
                NodeKind::Wall {
                    material: self.wall_material,
                },
                Some(root),
                wall.position,
                wall.size,
            );
        }

        let lights = scene.spawn("NeonLights", NodeKind::Group, Some(root), Vec3::ZERO, Vec3::ONE);
        for neon in &self.neon_lights {
            let light = scene.spawn(
                neon.name.clone(),
                NodeKind::NeonLight(neon.light),
                Some(lights),
                neon.position,
                Vec3::ONE,
            );
            scene.spawn(
                "Glow",
                NodeKind::Glow {
                    material: Material {
                        color: neon.light.color,
                        metallic: 0.0,
                        gloss: 0.5,
                        emission: Some(neon.light.color * 2.0),
                    },
                },
                Some(light),
                Vec3::ZERO,
                Vec3::splat(GLOW_SCALE),
            );
        }

        scene.atmosphere = self.atmosphere;
        root
    }
}
