//! Inputs produced by the localization and object-detection subsystems.
//!
//! Two kinds of pose appear here:
//!
//! - a [`RawPose`] is expressed in the robot's odometry frame.  Raw poses are
//!   only meaningful relative to each other when they share an origin, see
//!   [`RawPose::is_comparable`].
//! - an [`AgentEstimate`] is the localizer's current best guess of where the
//!   robot really is in the world frame.

use serde::{Deserialize, Serialize};

use crate::{ObjectHandle, Size3};

/// A pose in the robot's raw odometry frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Rotation about Z (radians).
    pub heading: f64,
    /// Odometry origin this pose is expressed in.  The origin changes when
    /// the robot is delocalized (picked up, for example).
    #[serde(default)]
    pub origin_id: u32,
    #[serde(default = "default_valid")]
    pub is_valid: bool,
}

fn default_valid() -> bool {
    true
}

impl RawPose {
    /// A valid pose in origin 0.
    pub fn new(x: f64, y: f64, z: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            z,
            heading,
            origin_id: 0,
            is_valid: true,
        }
    }

    /// Move this pose into another odometry origin.
    ///
    /// ```
    /// use landmap_types::RawPose;
    ///
    /// let here = RawPose::default();
    /// let elsewhere = RawPose::default().in_origin(2);
    /// assert!(!here.is_comparable(&elsewhere));
    /// ```
    pub fn in_origin(mut self, origin_id: u32) -> Self {
        self.origin_id = origin_id;
        self
    }

    /// Whether the difference between `self` and `other` means anything:
    /// both must be valid and share the same origin.
    pub fn is_comparable(&self, other: &RawPose) -> bool {
        self.is_valid && other.is_valid && self.origin_id == other.origin_id
    }
}

impl Default for RawPose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// The localizer's best estimate of the agent's world-frame pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentEstimate {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl AgentEstimate {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

/// The localizer's sensor-model estimate of a marker's world pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkEstimate {
    /// Mean (x, y) position.
    pub mean: [f64; 2],
    /// Orientation of the marker's face (radians).
    pub orientation: f64,
    /// 2×2 position covariance.
    #[serde(default)]
    pub covariance: [[f64; 2]; 2],
}

impl LandmarkEstimate {
    pub fn new(x: f64, y: f64, orientation: f64) -> Self {
        Self {
            mean: [x, y],
            orientation,
            covariance: [[0.0; 2]; 2],
        }
    }
}

/// Current state of a tracked light cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDetection {
    /// The cube's key in the tracker's collection.
    pub cube_id: u32,
    pub handle: ObjectHandle,
    /// Last known raw pose, `None` if the cube has never been localized.
    pub pose: Option<RawPose>,
    pub is_visible: bool,
}

/// Current state of a tracked custom-marked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDetection {
    pub handle: ObjectHandle,
    pub object_type: String,
    pub pose: Option<RawPose>,
    pub is_visible: bool,
    /// Physical size declared when the object type was defined.
    #[serde(default)]
    pub declared_size: Option<Size3>,
}

/// Notification that the vision pipeline just observed an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detection", rename_all = "snake_case")]
pub enum ObjectObserved {
    LightCube(CubeDetection),
    CustomObject(CustomDetection),
}

impl ObjectObserved {
    pub fn handle(&self) -> ObjectHandle {
        match self {
            ObjectObserved::LightCube(d) => d.handle,
            ObjectObserved::CustomObject(d) => d.handle,
        }
    }
}
