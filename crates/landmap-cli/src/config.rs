//! Configuration – reads/writes `~/.landmap/config.toml`.
//!
//! ```toml
//! [settings]
//! vision_z_bias = 10.0
//!
//! [[walls]]
//! length = 200.0
//! markers = [{ marker = 7, offset_along = 20.0 }]
//!
//! [[discs]]
//! id = 1
//! x = 250.0
//! y = 0.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use landmap_perception::catalog::{MarkerMount, WallCatalog, WallConfig};
use landmap_perception::settings::MapSettings;
use landmap_types::{DiscObject, MapError};
use serde::{Deserialize, Serialize};

/// A disc landmark at a fixed, known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscConfig {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_disc_radius")]
    pub radius: f64,
    #[serde(default = "default_disc_thickness")]
    pub thickness: f64,
}

fn default_disc_radius() -> f64 {
    DiscObject::DEFAULT_RADIUS
}
fn default_disc_thickness() -> f64 {
    DiscObject::DEFAULT_THICKNESS
}

impl DiscConfig {
    pub fn to_disc(&self) -> DiscObject {
        DiscObject::with_geometry(self.id, self.x, self.y, self.radius, self.thickness)
    }
}

/// Persisted configuration stored in `~/.landmap/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: MapSettings,

    /// The static wall catalog.
    #[serde(default)]
    pub walls: Vec<WallConfig>,

    #[serde(default)]
    pub discs: Vec<DiscConfig>,
}

impl Config {
    /// Starter configuration written by `landmap init`: one 200 mm wall
    /// carrying marker 7.
    pub fn sample() -> Self {
        Self {
            walls: vec![WallConfig::new(200.0).with_marker(MarkerMount::front(7, 20.0))],
            ..Self::default()
        }
    }

    /// Build the wall catalog, registering walls in file order.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyWall`] for a wall without markers.
    pub fn build_catalog(&self) -> Result<WallCatalog, MapError> {
        WallCatalog::from_configs(self.walls.iter().cloned())
    }
}

/// Return the path to `~/.landmap/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".landmap").join("config.toml")
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, MapError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        MapError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| MapError::Config(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `LANDMAP_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `LANDMAP_Z_BIAS` | `settings.vision_z_bias` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("LANDMAP_Z_BIAS")
        && let Ok(bias) = v.parse::<f64>()
    {
        cfg.settings.vision_z_bias = bias;
    }
}

/// Save the config to a specific path, creating the parent directory if
/// necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), MapError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| MapError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| MapError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        MapError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmap_types::MarkerId;

    #[test]
    fn config_path_points_to_landmap_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".landmap"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn roundtrip_sample_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::sample(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");

        assert_eq!(loaded.walls.len(), 1);
        assert_eq!(loaded.walls[0].length, 200.0);
        assert_eq!(loaded.walls[0].markers[0].marker, MarkerId(7));
        assert_eq!(loaded.settings.default_custom_size, MapSettings::default().default_custom_size);
    }

    #[test]
    fn parses_hand_written_config() {
        let raw = r#"
            [settings]
            vision_z_bias = 12.5

            [settings.custom_size_overrides]
            CustomType03 = { x = 30.0, y = 30.0, z = 90.0 }

            [[walls]]
            length = 600.0
            height = 190.0
            markers = [
                { marker = 41, offset_along = 100.0 },
                { marker = 40, side = "back", offset_along = 500.0, offset_up = 60.0 },
            ]
            doorways = [{ offset_along = 300.0, width = 80.0 }]

            [[discs]]
            id = 3
            x = 120.0
            y = -40.0
        "#;
        let cfg: Config = toml::from_str(raw).expect("parse");
        assert_eq!(cfg.settings.vision_z_bias, 12.5);
        assert_eq!(cfg.settings.custom_size_overrides.len(), 1);
        assert_eq!(cfg.walls[0].door_width, 75.0);

        let catalog = cfg.build_catalog().expect("catalog");
        let wall = catalog.lookup(MarkerId(41)).expect("wall");
        assert_eq!(wall.id(), MarkerId(40));
        assert_eq!(wall.doorways.len(), 1);

        let disc = cfg.discs[0].to_disc();
        assert_eq!(disc.radius, 12.5);
        assert_eq!(disc.pose.y, -40.0);
    }

    #[test]
    fn wall_without_markers_fails_catalog_build() {
        let cfg: Config = toml::from_str("[[walls]]\nlength = 50.0\n").expect("parse");
        assert!(matches!(cfg.build_catalog(), Err(MapError::EmptyWall { .. })));
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[walls]\nlength = ").expect("write");
        assert!(matches!(load_from(&path), Err(MapError::Config(_))));
    }

    #[test]
    fn apply_env_overrides_changes_z_bias() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("LANDMAP_Z_BIAS", "4.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.settings.vision_z_bias, 4.5);
        unsafe { std::env::remove_var("LANDMAP_Z_BIAS") };
    }
}
