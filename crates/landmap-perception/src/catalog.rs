//! [`WallCatalog`] – static registry of known walls, keyed by marker id.
//!
//! Walls are declared once at startup as [`WallConfig`] tables (usually from
//! the CLI's `config.toml`).  Each declaration is validated into a
//! [`WallSpec`] and registered under every marker mounted on it.  After the
//! catalog is handed to a [`WorldMap`][crate::world_map::WorldMap] it is only
//! ever read.
//!
//! A wall is named after the smallest marker id it carries, so the same
//! declaration always yields the same identifier regardless of the order its
//! markers were listed in.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use landmap_types::{MapError, MarkerId};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Declarations
// ────────────────────────────────────────────────────────────────────────────

/// Which face of the wall a marker is printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    #[default]
    Front,
    Back,
}

/// Where a marker sits on its wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerMount {
    pub marker: MarkerId,
    #[serde(default)]
    pub side: WallSide,
    /// Distance from the wall's left end to the marker centre (mm).
    pub offset_along: f64,
    /// Height of the marker centre above the floor (mm).
    #[serde(default)]
    pub offset_up: f64,
}

impl MarkerMount {
    /// A front-facing marker `offset_along` mm from the wall's left end.
    pub fn front(marker: u32, offset_along: f64) -> Self {
        Self {
            marker: MarkerId(marker),
            side: WallSide::Front,
            offset_along,
            offset_up: 0.0,
        }
    }
}

/// An opening in a wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Doorway {
    /// Distance from the wall's left end to the doorway centre (mm).
    pub offset_along: f64,
    pub width: f64,
}

/// Declarative description of a wall, as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    #[serde(default = "default_length")]
    pub length: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_door_width")]
    pub door_width: f64,
    #[serde(default = "default_door_height")]
    pub door_height: f64,
    #[serde(default)]
    pub markers: Vec<MarkerMount>,
    #[serde(default)]
    pub doorways: Vec<Doorway>,
}

fn default_length() -> f64 {
    100.0
}
fn default_height() -> f64 {
    210.0
}
fn default_door_width() -> f64 {
    75.0
}
fn default_door_height() -> f64 {
    105.0
}

impl WallConfig {
    /// A wall of `length` mm with default height, door size and no markers.
    pub fn new(length: f64) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_marker(mut self, mount: MarkerMount) -> Self {
        self.markers.push(mount);
        self
    }

    pub fn with_doorway(mut self, doorway: Doorway) -> Self {
        self.doorways.push(doorway);
        self
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            height: default_height(),
            door_width: default_door_width(),
            door_height: default_door_height(),
            markers: Vec::new(),
            doorways: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WallSpec
// ────────────────────────────────────────────────────────────────────────────

/// A validated wall declaration.  Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpec {
    id: MarkerId,
    pub length: f64,
    pub height: f64,
    pub door_width: f64,
    pub door_height: f64,
    markers: BTreeMap<MarkerId, MarkerMount>,
    pub doorways: Vec<Doorway>,
}

impl WallSpec {
    /// Validate `config` into a spec.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyWall`] when the declaration has no markers:
    /// such a wall could never be named nor observed.
    pub fn new(config: WallConfig) -> Result<Self, MapError> {
        let markers: BTreeMap<MarkerId, MarkerMount> = config
            .markers
            .into_iter()
            .map(|mount| (mount.marker, mount))
            .collect();
        let id = *markers.keys().next().ok_or(MapError::EmptyWall {
            length: config.length,
        })?;
        Ok(Self {
            id,
            length: config.length,
            height: config.height,
            door_width: config.door_width,
            door_height: config.door_height,
            markers,
            doorways: config.doorways,
        })
    }

    /// The wall identifier: the smallest marker id on the wall.
    pub fn id(&self) -> MarkerId {
        self.id
    }

    /// Mounting information for `marker`, if it belongs to this wall.
    pub fn mount(&self, marker: MarkerId) -> Option<&MarkerMount> {
        self.markers.get(&marker)
    }

    /// Marker ids on this wall in ascending order.
    pub fn marker_ids(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.markers.keys().copied()
    }
}

impl TryFrom<WallConfig> for WallSpec {
    type Error = MapError;

    fn try_from(config: WallConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WallCatalog
// ────────────────────────────────────────────────────────────────────────────

/// Marker id → wall lookup table.
///
/// # Example
///
/// ```
/// use landmap_perception::catalog::{MarkerMount, WallCatalog, WallConfig};
/// use landmap_types::MarkerId;
///
/// let mut catalog = WallCatalog::new();
/// catalog.register_config(
///     WallConfig::new(200.0)
///         .with_marker(MarkerMount::front(5, 20.0))
///         .with_marker(MarkerMount::front(2, 100.0)),
/// ).unwrap();
///
/// let wall = catalog.lookup(MarkerId(5)).unwrap();
/// assert_eq!(wall.id(), MarkerId(2));
/// assert!(catalog.lookup(MarkerId(3)).is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct WallCatalog {
    by_marker: HashMap<MarkerId, Arc<WallSpec>>,
}

impl WallCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from declarations, registering them in order.
    ///
    /// # Errors
    ///
    /// Fails on the first declaration without markers.
    pub fn from_configs<I>(configs: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = WallConfig>,
    {
        let mut catalog = Self::new();
        for config in configs {
            catalog.register_config(config)?;
        }
        Ok(catalog)
    }

    /// Register `spec` under each of its markers.
    ///
    /// A marker already claimed by another wall is reassigned to `spec`; the
    /// last registration wins.  Configuration-time only.
    pub fn register(&mut self, spec: WallSpec) -> Arc<WallSpec> {
        let spec = Arc::new(spec);
        for marker in spec.marker_ids() {
            if let Some(previous) = self.by_marker.insert(marker, Arc::clone(&spec))
                && previous.id() != spec.id()
            {
                warn!(
                    marker = %marker,
                    previous_wall = %previous.id(),
                    wall = %spec.id(),
                    "marker reassigned to another wall"
                );
            }
        }
        spec
    }

    /// Validate `config` and register it.
    pub fn register_config(&mut self, config: WallConfig) -> Result<Arc<WallSpec>, MapError> {
        Ok(self.register(WallSpec::new(config)?))
    }

    /// The wall `marker` belongs to, if any.
    pub fn lookup(&self, marker: MarkerId) -> Option<&WallSpec> {
        self.by_marker.get(&marker).map(Arc::as_ref)
    }

    /// Number of registered markers.
    pub fn len(&self) -> usize {
        self.by_marker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_marker.is_empty()
    }
}
