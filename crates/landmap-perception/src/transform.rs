//! Geometric transform from a detection's raw-frame offset into the world
//! frame.
//!
//! Detections are reported relative to the robot's raw odometry pose, while
//! the map lives in the localizer's world frame.  The two frames differ by
//! the heading drift the localizer has corrected since odometry started:
//!
//! ```text
//! orient_diff = normalize(agent_world_heading − agent_raw_heading)
//! wx =  dx·cos(orient_diff) + dy·sin(orient_diff)
//! wy = −dx·sin(orient_diff) + dy·cos(orient_diff)
//! ```
//!
//! The world position is the agent's world position plus `(wx, wy)`; the
//! world heading is `normalize(relative_heading + orient_diff)`.
//!
//! # Example
//!
//! ```rust
//! use landmap_perception::transform::{fuse_pose, RelativeObservation, DEFAULT_Z_BIAS};
//! use landmap_types::AgentEstimate;
//!
//! let agent = AgentEstimate::new(100.0, 50.0, 0.0);
//! let cube = RelativeObservation { dx: 30.0, dy: 0.0, z: 0.0, heading: 0.0 };
//!
//! let fused = fuse_pose(&cube, &agent, 0.0, DEFAULT_Z_BIAS);
//! assert!((fused.x - 130.0).abs() < 1e-9);
//! assert!((fused.z - 10.0).abs() < 1e-9);
//! ```

use std::f64::consts::{PI, TAU};

use landmap_types::AgentEstimate;

/// Height the vision pipeline typically underestimates object z by (mm).
pub const DEFAULT_Z_BIAS: f64 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Angles
// ────────────────────────────────────────────────────────────────────────────

/// Wrap `theta` into (−π, π].
///
/// Values already inside the interval are returned unchanged, so applying
/// the function twice never moves a heading.
pub fn normalize_angle(theta: f64) -> f64 {
    if theta > -PI && theta <= PI {
        return theta;
    }
    let wrapped = theta.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Heading correction between the localizer's estimate and raw odometry.
pub fn heading_drift(agent_world_heading: f64, agent_raw_heading: f64) -> f64 {
    normalize_angle(agent_world_heading - agent_raw_heading)
}

/// Rotate the displacement `(dx, dy)` by the heading drift `angle`.
pub fn rotate(dx: f64, dy: f64, angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    (dx * c + dy * s, -dx * s + dy * c)
}

// ────────────────────────────────────────────────────────────────────────────
// Pose fusion
// ────────────────────────────────────────────────────────────────────────────

/// A detection expressed relative to the agent's raw pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeObservation {
    /// Displacement from the agent along raw X (mm).
    pub dx: f64,
    /// Displacement from the agent along raw Y (mm).
    pub dy: f64,
    /// Height above the floor as reported by vision (mm).
    pub z: f64,
    /// Heading in the raw frame (radians).
    pub heading: f64,
}

/// A world-frame pose produced by [`fuse_pose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
}

/// Project `relative` into the world frame.
///
/// `agent` is the localizer's current best estimate and `agent_raw_heading`
/// the raw odometry heading the relative offset was computed against.
/// `z_bias` is added to the reported height.
pub fn fuse_pose(
    relative: &RelativeObservation,
    agent: &AgentEstimate,
    agent_raw_heading: f64,
    z_bias: f64,
) -> FusedPose {
    let orient_diff = heading_drift(agent.heading, agent_raw_heading);
    let (wx, wy) = rotate(relative.dx, relative.dy, orient_diff);
    FusedPose {
        x: agent.x + wx,
        y: agent.y + wy,
        z: relative.z + z_bias,
        heading: normalize_angle(relative.heading + orient_diff),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const SAMPLE_ANGLES: [f64; 12] = [
        0.0, 0.3, -0.3, 1.0, -2.5, 3.0, PI, -PI, 4.0, -7.5, 12.0, 100.0,
    ];

    // ── normalize_angle ─────────────────────────────────────────────────────

    #[test]
    fn normalize_stays_in_half_open_interval() {
        for theta in SAMPLE_ANGLES {
            let n = normalize_angle(theta);
            assert!(n > -PI && n <= PI, "normalize({theta}) = {n}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for theta in SAMPLE_ANGLES {
            let once = normalize_angle(theta);
            assert_eq!(normalize_angle(once), once, "theta={theta}");
        }
    }

    #[test]
    fn normalize_maps_minus_pi_to_pi() {
        assert_eq!(normalize_angle(-PI), PI);
        assert_eq!(normalize_angle(PI), PI);
    }

    #[test]
    fn normalize_wraps_full_turns() {
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-TAU - 0.5) + 0.5).abs() < 1e-12);
        assert!((normalize_angle(3.0 * PI / 2.0) + FRAC_PI_2).abs() < 1e-12);
    }

    // ── rotate ──────────────────────────────────────────────────────────────

    #[test]
    fn rotation_preserves_norm() {
        let displacements = [(30.0, 0.0), (0.0, -12.5), (7.0, 24.0), (-100.0, 3.5)];
        for (dx, dy) in displacements {
            for angle in SAMPLE_ANGLES {
                let (wx, wy) = rotate(dx, dy, normalize_angle(angle));
                let before = dx * dx + dy * dy;
                let after = wx * wx + wy * wy;
                assert!((before - after).abs() < 1e-9 * before.max(1.0));
            }
        }
    }

    #[test]
    fn zero_drift_leaves_displacement_unchanged() {
        let (wx, wy) = rotate(17.25, -3.5, 0.0);
        assert_eq!(wx, 17.25);
        assert_eq!(wy, -3.5);
    }

    #[test]
    fn quarter_turn_drift_rotates_clockwise() {
        // wx = dy, wy = -dx for orient_diff = π/2.
        let (wx, wy) = rotate(10.0, 0.0, FRAC_PI_2);
        assert!(wx.abs() < 1e-9);
        assert!((wy + 10.0).abs() < 1e-9);
    }

    // ── fuse_pose ───────────────────────────────────────────────────────────

    #[test]
    fn fuse_cube_with_aligned_headings() {
        let agent = AgentEstimate::new(100.0, 50.0, 0.0);
        let rel = RelativeObservation {
            dx: 30.0,
            dy: 0.0,
            z: 0.0,
            heading: FRAC_PI_2,
        };
        let fused = fuse_pose(&rel, &agent, 0.0, DEFAULT_Z_BIAS);
        assert_eq!(fused.x, 130.0);
        assert_eq!(fused.y, 50.0);
        assert_eq!(fused.z, 10.0);
        assert_eq!(fused.heading, FRAC_PI_2);
    }

    #[test]
    fn fuse_applies_heading_drift() {
        // Localizer believes the robot faces π/2 while odometry says 0.
        let agent = AgentEstimate::new(0.0, 0.0, FRAC_PI_2);
        let rel = RelativeObservation {
            dx: 0.0,
            dy: 20.0,
            z: 5.0,
            heading: 3.0,
        };
        let fused = fuse_pose(&rel, &agent, 0.0, 0.0);
        assert!((fused.x - 20.0).abs() < 1e-9);
        assert!(fused.y.abs() < 1e-9);
        assert_eq!(fused.z, 5.0);
        // 3.0 + π/2 wraps past π.
        assert!((fused.heading - (3.0 + FRAC_PI_2 - TAU)).abs() < 1e-12);
    }

    #[test]
    fn fuse_drift_is_normalized_before_rotating() {
        let rel = RelativeObservation {
            dx: 10.0,
            dy: 5.0,
            z: 0.0,
            heading: 0.25,
        };
        let a = fuse_pose(&rel, &AgentEstimate::new(1.0, 2.0, 0.4), 0.1, 0.0);
        let b = fuse_pose(&rel, &AgentEstimate::new(1.0, 2.0, 0.4 + TAU), 0.1, 0.0);
        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
        assert!((a.heading - b.heading).abs() < 1e-9);
    }
}
