//! Tunables for a [`WorldMap`][crate::world_map::WorldMap].

use std::collections::BTreeMap;

use landmap_types::{CustomDetection, Size3, DEFAULT_CUSTOM_SIZE};
use serde::{Deserialize, Serialize};

use crate::transform::DEFAULT_Z_BIAS;

/// Settings read from the `[settings]` table of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// Added to every detected object's z (mm).
    #[serde(default = "default_z_bias")]
    pub vision_z_bias: f64,

    /// Size given to custom-marked objects nobody described.
    #[serde(default = "default_custom_size")]
    pub default_custom_size: Size3,

    /// Per object type sizes that take precedence over detection metadata.
    #[serde(default)]
    pub custom_size_overrides: BTreeMap<String, Size3>,
}

fn default_z_bias() -> f64 {
    DEFAULT_Z_BIAS
}
fn default_custom_size() -> Size3 {
    DEFAULT_CUSTOM_SIZE
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            vision_z_bias: default_z_bias(),
            default_custom_size: default_custom_size(),
            custom_size_overrides: BTreeMap::new(),
        }
    }
}

impl MapSettings {
    /// Size for a custom-marked object: explicit override, then the size the
    /// detection declares, then the default.
    pub fn custom_size(&self, detection: &CustomDetection) -> Size3 {
        self.custom_size_overrides
            .get(&detection.object_type)
            .copied()
            .or(detection.declared_size)
            .unwrap_or(self.default_custom_size)
    }
}
