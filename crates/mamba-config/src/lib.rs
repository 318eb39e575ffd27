//! Configuration types and loaders for the Mamba simulator.
//!
//! The whole scene is described by one TOML file: the module catalog, the
//! prefabs module content resolves to, and the tuning of the lighting cycle,
//! camera and HUD. Every field has a default, so an empty file is valid.

pub mod scene;
pub mod tuning;

pub use scene::{
    default_config_path, Compatibility, ConfigSource, EnvironmentConfig, ModuleConfig, SceneConfig,
};
pub use tuning::{CameraConfig, HudConfig, LightingConfig, Rgb};
