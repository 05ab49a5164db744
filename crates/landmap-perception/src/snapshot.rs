//! Recorded localization and detection output for one instant.
//!
//! A [`Snapshot`] implements both [`Localizer`] and [`ObjectTracker`], so a
//! frame captured from a running robot (or written by hand) can be replayed
//! through a [`WorldMap`].  Snapshots are stored as JSON:
//!
//! ```json
//! {
//!   "agent": { "x": 100.0, "y": 50.0, "heading": 0.0 },
//!   "raw_pose": { "x": 0.0, "y": 0.0, "heading": 0.0 },
//!   "landmarks": [
//!     { "marker": 7, "estimate": { "mean": [10.0, 0.0], "orientation": 0.0 } }
//!   ],
//!   "light_cubes": [
//!     { "cube_id": 1, "handle": 11, "is_visible": true,
//!       "pose": { "x": 30.0, "y": 0.0, "heading": 1.5708 } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use landmap_types::{
    AgentEstimate, CubeDetection, CustomDetection, LandmarkEstimate, MapError, MarkerId,
    ObjectObserved, RawPose,
};
use serde::{Deserialize, Serialize};

use crate::providers::{Localizer, ObjectTracker};
use crate::world_map::WorldMap;

/// One marker's landmark estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    pub marker: MarkerId,
    pub estimate: LandmarkEstimate,
}

/// Localizer and tracker output captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub agent: AgentEstimate,
    #[serde(default)]
    pub raw_pose: RawPose,
    #[serde(default)]
    pub landmarks: Vec<LandmarkRecord>,
    #[serde(default)]
    pub light_cubes: Vec<CubeDetection>,
    #[serde(default)]
    pub custom_objects: Vec<CustomDetection>,
    /// Notifications received after the snapshot was taken, applied in
    /// order by [`Snapshot::replay`].
    #[serde(default)]
    pub events: Vec<ObjectObserved>,
}

impl Snapshot {
    pub fn new(agent: AgentEstimate, raw_pose: RawPose) -> Self {
        Self {
            agent,
            raw_pose,
            ..Self::default()
        }
    }

    pub fn with_landmark(mut self, marker: MarkerId, estimate: LandmarkEstimate) -> Self {
        self.landmarks.push(LandmarkRecord { marker, estimate });
        self
    }

    pub fn with_cube(mut self, cube: CubeDetection) -> Self {
        self.light_cubes.push(cube);
        self
    }

    pub fn with_custom_object(mut self, object: CustomDetection) -> Self {
        self.custom_objects.push(object);
        self
    }

    pub fn with_event(mut self, event: ObjectObserved) -> Self {
        self.events.push(event);
        self
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(raw: &str) -> Result<Self, MapError> {
        serde_json::from_str(raw).map_err(|e| MapError::Snapshot(format!("invalid snapshot: {e}")))
    }

    /// Read and parse a snapshot file.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            MapError::Snapshot(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Run a full map update from this snapshot, then apply its events.
    ///
    /// Returns how many events changed the map.
    pub fn replay(&self, map: &mut WorldMap) -> usize {
        map.update(self, self);
        self.events
            .iter()
            .filter(|event| map.handle_object_observed(self, event))
            .count()
    }
}

impl Localizer for Snapshot {
    fn agent_estimate(&self) -> AgentEstimate {
        self.agent
    }

    fn raw_pose(&self) -> RawPose {
        self.raw_pose
    }

    fn landmarks(&self) -> Vec<(MarkerId, LandmarkEstimate)> {
        self.landmarks
            .iter()
            .map(|record| (record.marker, record.estimate))
            .collect()
    }
}

impl ObjectTracker for Snapshot {
    fn light_cubes(&self) -> Vec<CubeDetection> {
        self.light_cubes.clone()
    }

    fn custom_objects(&self) -> Vec<CustomDetection> {
        self.custom_objects.clone()
    }
}
