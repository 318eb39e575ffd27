use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::tuning::{
    validate_color, validate_positive, CameraConfig, HudConfig, LightingConfig, Rgb,
};

/// Top-level scene configuration loaded from `mamba.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Scene node module content is instantiated under.
    pub container: String,
    /// Load the first catalog entry at startup.
    pub autoload_first: bool,
    pub compatibility: Compatibility,
    pub modules: Vec<ModuleConfig>,
    pub prefabs: BTreeMap<String, EnvironmentConfig>,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
    pub hud: HudConfig,
}

/// Host API range this scene file was written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Compatibility {
    pub host_api: String,
}

impl Default for Compatibility {
    fn default() -> Self {
        Self {
            host_api: "^0.1".to_string(),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    pub id: String,
    /// Key into `prefabs`. A module without a prefab can be listed but never
    /// activated.
    #[serde(default)]
    pub prefab: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Recipe for a procedurally generated environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Tiles per side of the square floor.
    pub grid_size: u32,
    pub tile_size: f32,
    pub wall_height: f32,
    pub neon_color_a: Rgb,
    pub neon_color_b: Rgb,
    pub neon_intensity: f32,
    pub neon_light_count: u32,
    pub neon_range: f32,
    pub metallic: f32,
    pub smoothness: f32,
    /// RNG seed for light placement.
    pub seed: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            tile_size: 10.0,
            wall_height: 5.0,
            neon_color_a: [0.0, 1.0, 1.0],
            neon_color_b: [1.0, 0.0, 1.0],
            neon_intensity: 2.0,
            neon_light_count: 10,
            neon_range: 15.0,
            metallic: 0.9,
            smoothness: 0.95,
            seed: 0,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.grid_size == 0 {
            bail!("{field}.grid_size must be at least 1");
        }
        validate_positive(&format!("{field}.tile_size"), self.tile_size)?;
        let side = self.grid_size as f32 * self.tile_size;
        if !side.is_finite() {
            bail!("{field}.grid_size * {field}.tile_size must be a finite length, got {side}");
        }
        validate_positive(&format!("{field}.wall_height"), self.wall_height)?;
        validate_positive(&format!("{field}.neon_range"), self.neon_range)?;
        validate_color(&format!("{field}.neon_color_a"), &self.neon_color_a)?;
        validate_color(&format!("{field}.neon_color_b"), &self.neon_color_b)?;
        if !(0.0..=1.0).contains(&self.metallic) || !(0.0..=1.0).contains(&self.smoothness) {
            bail!("{field}.metallic and {field}.smoothness must be within 0.0..=1.0");
        }
        if !(self.neon_intensity.is_finite() && self.neon_intensity >= 0.0) {
            bail!("{field}.neon_intensity must be a finite, non-negative number");
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        let module = |name: &str, id: &str, prefab: Option<&str>, description: &str| ModuleConfig {
            name: name.to_string(),
            id: id.to_string(),
            prefab: prefab.map(str::to_string),
            description: description.to_string(),
        };

        let mut prefabs = BTreeMap::new();
        prefabs.insert(
            "hangar".to_string(),
            EnvironmentConfig {
                grid_size: 12,
                neon_light_count: 6,
                seed: 7,
                ..EnvironmentConfig::default()
            },
        );
        prefabs.insert(
            "arena".to_string(),
            EnvironmentConfig {
                seed: 42,
                ..EnvironmentConfig::default()
            },
        );
        prefabs.insert(
            "datacore".to_string(),
            EnvironmentConfig {
                grid_size: 8,
                tile_size: 6.0,
                neon_color_a: [0.2, 1.0, 0.3],
                neon_color_b: [1.0, 0.7, 0.0],
                neon_light_count: 14,
                seed: 1337,
                ..EnvironmentConfig::default()
            },
        );

        Self {
            container: "ModuleContainer".to_string(),
            autoload_first: true,
            compatibility: Compatibility::default(),
            modules: vec![
                module("Hangar", "hangar", Some("hangar"), "Docking bay with a handful of neon strips."),
                module("Neon Arena", "arena", Some("arena"), "Open metallic arena lit in cyan and magenta."),
                module("Data Core", "datacore", Some("datacore"), "Cramped server hall, green and amber."),
                module("Vault", "vault", None, "Sealed. No content assigned yet."),
            ],
            prefabs,
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
            hud: HudConfig::default(),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Builtin => write!(f, "built-in defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl SceneConfig {
    /// Parse and validate scene TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse scene config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a scene file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene config at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid scene config at {}", path.display()))
    }

    /// Locate and load the scene configuration.
    ///
    /// Precedence: `MAMBA_CONFIG` (must exist) > `<config dir>/mamba/mamba.toml`
    /// (used when present) > built-in defaults.
    pub fn load() -> Result<(Self, ConfigSource)> {
        if let Some(explicit) = std::env::var_os("MAMBA_CONFIG") {
            let path = PathBuf::from(explicit);
            let config = Self::from_path(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        if let Some(path) = default_config_path().filter(|p| p.is_file()) {
            let config = Self::from_path(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Builtin))
    }

    /// Validate required fields and cross references.
    pub fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() {
            bail!("container must not be empty");
        }
        VersionReq::parse(&self.compatibility.host_api).with_context(|| {
            format!(
                "compatibility.host_api must be a valid semver requirement: {}",
                self.compatibility.host_api
            )
        })?;

        for (i, module) in self.modules.iter().enumerate() {
            if module.id.trim().is_empty() {
                bail!("modules[{i}].id must not be empty");
            }
            if module.name.trim().is_empty() {
                bail!("modules[{i}].name must not be empty");
            }
            if let Some(prefab) = &module.prefab {
                if !self.prefabs.contains_key(prefab) {
                    bail!("modules[{i}] ({}) references unknown prefab {:?}", module.id, prefab);
                }
            }
        }

        for (name, prefab) in &self.prefabs {
            prefab.validate(&format!("prefabs.{name}"))?;
        }

        self.lighting.validate()?;
        self.camera.validate()?;
        Ok(())
    }

    /// Module ids that appear more than once, in first-seen order.
    ///
    /// Duplicates are allowed (lookups return the first entry) but worth a
    /// warning at startup.
    pub fn duplicate_module_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut dups = Vec::new();
        for module in &self.modules {
            if !seen.insert(module.id.as_str()) && !dups.contains(&module.id.as_str()) {
                dups.push(module.id.as_str());
            }
        }
        dups
    }

    /// Ensure this scene file supports the provided host API version.
    pub fn supports_host_api(&self, host_api_version: &str) -> Result<()> {
        let requirement = VersionReq::parse(&self.compatibility.host_api).with_context(|| {
            format!(
                "compatibility.host_api must be a valid semver requirement: {}",
                self.compatibility.host_api
            )
        })?;
        let host = Version::parse(host_api_version)
            .with_context(|| format!("host API version must be valid semver: {host_api_version}"))?;

        if requirement.matches(&host) {
            Ok(())
        } else {
            bail!(
                "scene requires host_api {} but host is {}",
                self.compatibility.host_api,
                host
            )
        }
    }
}

/// `<platform config dir>/mamba/mamba.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mamba").join("mamba.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SCENE: &str = r#"
container = "Stage"
autoload_first = false

[compatibility]
host_api = "^0.1.0"

[[modules]]
name = "Arcade"
id = "arcade-1"
prefab = "arcade"
description = "Retro cabinets"

[[modules]]
name = "Locked"
id = "locked"

[prefabs.arcade]
grid_size = 6
neon_light_count = 3
seed = 9

[lighting]
transition_speed = 2.0
start_at_night = true

[camera]
speed = 4.0

[hud]
title = "TEST"
show_controls = false
"#;

    #[test]
    fn parses_valid_scene() {
        let cfg = SceneConfig::from_toml_str(VALID_SCENE).unwrap();
        assert_eq!(cfg.container, "Stage");
        assert!(!cfg.autoload_first);
        assert_eq!(cfg.modules.len(), 2);
        assert_eq!(cfg.modules[0].prefab.as_deref(), Some("arcade"));
        assert!(cfg.modules[1].prefab.is_none());
        assert_eq!(cfg.modules[1].description, "");

        let arcade = &cfg.prefabs["arcade"];
        assert_eq!(arcade.grid_size, 6);
        assert_eq!(arcade.tile_size, 10.0);
        assert_eq!(arcade.seed, 9);

        assert_eq!(cfg.lighting.transition_speed, 2.0);
        assert!(cfg.lighting.start_at_night);
        assert_eq!(cfg.lighting.toggle_key, 't');
        assert_eq!(cfg.camera.speed, 4.0);
        assert_eq!(cfg.camera.sprint_multiplier, 3.0);
        assert_eq!(cfg.hud.title, "TEST");
        assert!(!cfg.hud.show_controls);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SceneConfig::default());
    }

    #[test]
    fn builtin_default_is_valid() {
        let cfg = SceneConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.modules[0].id, "hangar");
        assert!(cfg.modules.iter().any(|m| m.prefab.is_none()));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SceneConfig::from_toml_str("containr = \"x\"").unwrap_err().to_string();
        assert!(err.contains("failed to parse scene config TOML"));
    }

    #[test]
    fn unknown_prefab_reference_is_rejected() {
        let raw = VALID_SCENE.replace("prefab = \"arcade\"", "prefab = \"pinball\"");
        let err = SceneConfig::from_toml_str(&raw).unwrap_err().to_string();
        assert!(err.contains("references unknown prefab"));
    }

    #[test]
    fn empty_module_id_is_rejected() {
        let raw = VALID_SCENE.replace("id = \"locked\"", "id = \"  \"");
        let err = SceneConfig::from_toml_str(&raw).unwrap_err().to_string();
        assert!(err.contains("modules[1].id must not be empty"));
    }

    #[test]
    fn invalid_prefab_values_are_rejected() {
        let raw = VALID_SCENE.replace("grid_size = 6", "grid_size = 0");
        let err = SceneConfig::from_toml_str(&raw).unwrap_err().to_string();
        assert!(err.contains("prefabs.arcade.grid_size"));
    }

    #[test]
    fn overflowing_floor_extent_is_rejected() {
        let raw = r#"
modules = []

[prefabs.big]
grid_size = 20
tile_size = 1e38
"#;
        let err = SceneConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("prefabs.big.grid_size * prefabs.big.tile_size"), "{err}");

        let raw = "modules = []\n[prefabs.big]\ngrid_size = 20\ntile_size = 1e30\n";
        SceneConfig::from_toml_str(raw).unwrap();
    }

    #[test]
    fn non_finite_neon_intensity_is_rejected() {
        let raw = "modules = []\n[prefabs.glow]\nneon_intensity = inf\n";
        let err = SceneConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("prefabs.glow.neon_intensity"), "{err}");
    }

    #[test]
    fn invalid_host_api_requirement_is_rejected() {
        let raw = VALID_SCENE.replace("host_api = \"^0.1.0\"", "host_api = \"soon\"");
        let err = SceneConfig::from_toml_str(&raw).unwrap_err().to_string();
        assert!(err.contains("compatibility.host_api must be a valid semver requirement"));
    }

    #[test]
    fn compatibility_check() {
        let cfg = SceneConfig::from_toml_str(VALID_SCENE).unwrap();
        cfg.supports_host_api("0.1.3").unwrap();
        let err = cfg.supports_host_api("1.0.0").unwrap_err().to_string();
        assert!(err.contains("scene requires host_api"));
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let raw = VALID_SCENE.replace("id = \"locked\"", "id = \"arcade-1\"");
        let mut cfg = SceneConfig::from_toml_str(&raw).unwrap();
        cfg.modules.push(cfg.modules[0].clone());
        assert_eq!(cfg.duplicate_module_ids(), vec!["arcade-1"]);
        assert!(SceneConfig::default().duplicate_module_ids().is_empty());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = SceneConfig::from_path(Path::new("/nonexistent/mamba.toml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to read scene config"));
    }

    #[test]
    fn source_display() {
        assert_eq!(ConfigSource::Builtin.to_string(), "built-in defaults");
        assert_eq!(
            ConfigSource::File(PathBuf::from("/etc/mamba.toml")).to_string(),
            "/etc/mamba.toml"
        );
    }
}
