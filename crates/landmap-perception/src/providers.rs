//! Collaborator traits the world map pulls its inputs from.
//!
//! Localization and object detection run elsewhere; the map only needs a
//! read-only view of their latest output at the moment it updates.  Hosts
//! implement these traits over their own subsystems, and
//! [`Snapshot`][crate::snapshot::Snapshot] implements both for recorded
//! frames.

use landmap_types::{
    AgentEstimate, CubeDetection, CustomDetection, LandmarkEstimate, MarkerId, RawPose,
};

/// Read access to the localization subsystem.
pub trait Localizer {
    /// Current best estimate of the agent's world-frame pose.
    fn agent_estimate(&self) -> AgentEstimate;

    /// The agent's pose in the raw odometry frame that detections are
    /// reported in.
    fn raw_pose(&self) -> RawPose;

    /// Current marker landmark estimates.
    ///
    /// Order matters: within a wall, the first listed marker is the one the
    /// wall is inferred from.
    fn landmarks(&self) -> Vec<(MarkerId, LandmarkEstimate)>;
}

/// Read access to the object-detection subsystem.
pub trait ObjectTracker {
    /// Every light cube currently tracked, observed or not.
    fn light_cubes(&self) -> Vec<CubeDetection>;

    /// Every custom-marked object currently tracked.
    fn custom_objects(&self) -> Vec<CustomDetection>;
}
