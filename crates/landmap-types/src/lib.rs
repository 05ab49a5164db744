//! `landmap-types` – shared vocabulary of the landmap workspace.
//!
//! # Modules
//!
//! - [`entity`] – [`Entity`][entity::Entity]: the closed set of objects a
//!   world map can hold (walls, light cubes, custom-marked objects, discs and
//!   generic obstacles), all expressed in world-frame coordinates.
//! - [`observation`] – what the localization and detection subsystems hand
//!   us: raw poses, agent estimates, landmark estimates, per-object
//!   detections and the [`ObjectObserved`][observation::ObjectObserved]
//!   event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod entity;
pub mod observation;

pub use entity::{
    CustomMarkedObject, DiscObject, Entity, EntityPose, LightCubeObject, ObstacleObject, Size3,
    WallObject, DEFAULT_CUSTOM_SIZE, LIGHT_CUBE_SIZE,
};
pub use observation::{
    AgentEstimate, CubeDetection, CustomDetection, LandmarkEstimate, ObjectObserved, RawPose,
};

/// Identifier of a fiducial marker as reported by the vision pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MarkerId(pub u32);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle the detection subsystem uses for a tracked object.
///
/// The map only ever uses it as a lookup key and a back-reference; it never
/// interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandle(pub u64);

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error type for the landmap workspace.
///
/// None of these are raised by a map update; they only surface while the
/// static configuration or a recorded snapshot is being loaded.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapError {
    /// A wall specification was declared without a single marker, so it has
    /// no identifier.
    #[error("Wall Specification Error: wall of length {length} declares no markers")]
    EmptyWall { length: f64 },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Snapshot Error: {0}")]
    Snapshot(String),
}
