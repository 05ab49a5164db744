//! [`WorldMap`] – world-frame map of walls and tracked objects.
//!
//! Each update cycle pulls the latest output of the localizer and the object
//! tracker and rewrites the affected entries in place:
//!
//! 1. **Wall inference** – marker landmark estimates are grouped by the wall
//!    the [`WallCatalog`] assigns them to; markers the catalog does not know
//!    are dropped.  Each wall is placed from the first usable marker of its
//!    group:
//!
//!    ```text
//!    offset  = length / 2 − marker.offset_along
//!    heading = marker.orientation
//!    x       = marker.x + offset · cos(heading − π/2)
//!    y       = marker.y + offset · sin(heading − π/2)
//!    ```
//!
//!    The remaining markers of the group are not used.
//! 2. **Object fusion** – each tracked light cube and custom-marked object
//!    whose raw pose is comparable with the agent's raw pose is projected
//!    into the world frame with [`fuse_pose`].
//!
//! [`WorldMap::handle_object_observed`] runs step 2 for a single object and
//! converges to the same entry a full [`WorldMap::update`] would produce.
//!
//! Entries are never removed.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use landmap_types::{
    CubeDetection, CustomDetection, CustomMarkedObject, DiscObject, Entity, EntityPose,
    LandmarkEstimate, LightCubeObject, MarkerId, ObjectHandle, ObjectObserved, ObstacleObject,
    RawPose, WallObject,
};
use tracing::{debug, trace};

use crate::catalog::WallCatalog;
use crate::providers::{Localizer, ObjectTracker};
use crate::settings::MapSettings;
use crate::transform::{fuse_pose, normalize_angle, FusedPose, RelativeObservation};

// ────────────────────────────────────────────────────────────────────────────
// MapKey
// ────────────────────────────────────────────────────────────────────────────

/// Key of an entry in a [`WorldMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// An inferred wall, keyed by its identifier.
    Wall(MarkerId),
    /// An object tracked by the detection subsystem.
    Object(ObjectHandle),
    /// A static object placed by the host.
    Placed(u32),
}

impl std::fmt::Display for MapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapKey::Wall(id) => write!(f, "wall-{id}"),
            MapKey::Object(handle) => write!(f, "object-{}", handle.0),
            MapKey::Placed(id) => write!(f, "placed-{id}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WorldMap
// ────────────────────────────────────────────────────────────────────────────

/// Owns every [`Entity`] the robot knows about, in world coordinates.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use landmap_perception::catalog::{MarkerMount, WallCatalog, WallConfig};
/// use landmap_perception::snapshot::Snapshot;
/// use landmap_perception::world_map::{MapKey, WorldMap};
/// use landmap_types::{AgentEstimate, LandmarkEstimate, MarkerId, RawPose};
///
/// let mut catalog = WallCatalog::new();
/// catalog
///     .register_config(WallConfig::new(200.0).with_marker(MarkerMount::front(7, 20.0)))
///     .unwrap();
///
/// let mut map = WorldMap::new(Arc::new(catalog));
/// let frame = Snapshot::new(AgentEstimate::default(), RawPose::default())
///     .with_landmark(MarkerId(7), LandmarkEstimate::new(10.0, 0.0, 0.0));
/// map.update(&frame, &frame);
///
/// let wall = map.get(&MapKey::Wall(MarkerId(7))).unwrap();
/// assert!((wall.pose().y + 80.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct WorldMap {
    catalog: Arc<WallCatalog>,
    settings: MapSettings,
    objects: HashMap<MapKey, Entity>,
}

impl WorldMap {
    /// Create an empty map with default settings.
    pub fn new(catalog: Arc<WallCatalog>) -> Self {
        Self::with_settings(catalog, MapSettings::default())
    }

    pub fn with_settings(catalog: Arc<WallCatalog>, settings: MapSettings) -> Self {
        Self {
            catalog,
            settings,
            objects: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &WallCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    // ── Read access ─────────────────────────────────────────────────────────

    /// Every entry currently in the map.
    pub fn objects(&self) -> &HashMap<MapKey, Entity> {
        &self.objects
    }

    pub fn get(&self, key: &MapKey) -> Option<&Entity> {
        self.objects.get(key)
    }

    /// The entity tracking the detection `handle`, if it has been seen.
    pub fn object(&self, handle: ObjectHandle) -> Option<&Entity> {
        self.objects.get(&MapKey::Object(handle))
    }

    /// Inferred walls, in no particular order.
    pub fn walls(&self) -> impl Iterator<Item = &WallObject> + '_ {
        self.objects.values().filter_map(|entity| match entity {
            Entity::Wall(wall) => Some(wall),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ── Update cycle ────────────────────────────────────────────────────────

    /// Run a full update: infer walls, then fuse every tracked cube and
    /// custom-marked object.
    pub fn update<L, T>(&mut self, localizer: &L, tracker: &T)
    where
        L: Localizer + ?Sized,
        T: ObjectTracker + ?Sized,
    {
        let walls = self.generate_walls(localizer);

        let mut fused = 0usize;
        for cube in tracker.light_cubes() {
            fused += usize::from(self.update_cube(localizer, &cube));
        }
        for object in tracker.custom_objects() {
            fused += usize::from(self.update_custom_object(localizer, &object));
        }
        debug!(walls, fused, entries = self.objects.len(), "world map updated");
    }

    /// Infer walls from the localizer's marker estimates and store them.
    ///
    /// Returns the number of walls written.
    pub fn generate_walls<L>(&mut self, localizer: &L) -> usize
    where
        L: Localizer + ?Sized,
    {
        let mut groups: BTreeMap<MarkerId, Vec<(MarkerId, LandmarkEstimate)>> = BTreeMap::new();
        for (marker, estimate) in localizer.landmarks() {
            let Some(spec) = self.catalog.lookup(marker) else {
                trace!(marker = %marker, "marker is not part of a known wall");
                continue;
            };
            groups.entry(spec.id()).or_default().push((marker, estimate));
        }

        let mut written = 0;
        for (wall_id, markers) in groups {
            if let Some(wall) = self.infer_wall(wall_id, &markers) {
                debug!(wall = %wall_id, x = wall.pose.x, y = wall.pose.y, "wall inferred");
                self.objects.insert(MapKey::Wall(wall_id), Entity::Wall(wall));
                written += 1;
            }
        }
        written
    }

    /// Place the wall `wall_id` from the first marker of `markers` that the
    /// catalog knows.  Later markers are ignored.
    ///
    /// Returns `None` when no marker of the group is in the catalog.
    pub fn infer_wall(
        &self,
        wall_id: MarkerId,
        markers: &[(MarkerId, LandmarkEstimate)],
    ) -> Option<WallObject> {
        markers.iter().find_map(|(marker, estimate)| {
            let spec = self.catalog.lookup(*marker)?;
            let mount = spec.mount(*marker)?;
            let offset = spec.length / 2.0 - mount.offset_along;
            let heading = estimate.orientation;
            let [marker_x, marker_y] = estimate.mean;
            Some(WallObject {
                id: wall_id,
                pose: EntityPose {
                    heading: normalize_angle(heading),
                    ..EntityPose::at(
                        marker_x + offset * (heading - FRAC_PI_2).cos(),
                        marker_y + offset * (heading - FRAC_PI_2).sin(),
                        spec.height / 2.0,
                    )
                },
                length: spec.length,
                height: spec.height,
                door_width: spec.door_width,
                door_height: spec.door_height,
            })
        })
    }

    /// Fuse a light cube detection into the map.
    ///
    /// Returns `false` without touching the map when the cube has no pose or
    /// its pose cannot be compared with the agent's.
    pub fn update_cube<L>(&mut self, localizer: &L, cube: &CubeDetection) -> bool
    where
        L: Localizer + ?Sized,
    {
        let Some(fused) = self.fuse_detection(localizer, cube.handle, cube.pose.as_ref()) else {
            return false;
        };
        let entity = self
            .objects
            .entry(MapKey::Object(cube.handle))
            .or_insert_with(|| {
                debug!(cube = cube.cube_id, handle = %cube.handle, "new light cube");
                Entity::LightCube(LightCubeObject::new(cube.cube_id, cube.handle))
            });
        apply_fused(entity.pose_mut(), &fused, cube.is_visible);
        true
    }

    /// Fuse a custom-marked object detection into the map.
    ///
    /// The object's size is fixed when it is first seen.
    pub fn update_custom_object<L>(&mut self, localizer: &L, object: &CustomDetection) -> bool
    where
        L: Localizer + ?Sized,
    {
        let Some(fused) = self.fuse_detection(localizer, object.handle, object.pose.as_ref())
        else {
            return false;
        };
        let size = self.settings.custom_size(object);
        let entity = self
            .objects
            .entry(MapKey::Object(object.handle))
            .or_insert_with(|| {
                debug!(
                    object_type = %object.object_type,
                    handle = %object.handle,
                    "new custom-marked object"
                );
                Entity::CustomMarked(CustomMarkedObject::new(
                    object.object_type.clone(),
                    object.handle,
                    size,
                ))
            });
        apply_fused(entity.pose_mut(), &fused, object.is_visible);
        true
    }

    /// Apply a single "object observed" notification.
    pub fn handle_object_observed<L>(&mut self, localizer: &L, event: &ObjectObserved) -> bool
    where
        L: Localizer + ?Sized,
    {
        match event {
            ObjectObserved::LightCube(cube) => self.update_cube(localizer, cube),
            ObjectObserved::CustomObject(object) => self.update_custom_object(localizer, object),
        }
    }

    // ── Static objects ──────────────────────────────────────────────────────

    /// Add a disc landmark under [`MapKey::Placed`], replacing any placed
    /// object with the same id.
    pub fn place_disc(&mut self, disc: DiscObject) -> MapKey {
        let key = MapKey::Placed(disc.id);
        self.objects.insert(key, Entity::Disc(disc));
        key
    }

    /// Add a generic obstacle under [`MapKey::Placed`].
    pub fn place_obstacle(&mut self, obstacle: ObstacleObject) -> MapKey {
        let key = MapKey::Placed(obstacle.id);
        self.objects.insert(key, Entity::Obstacle(obstacle));
        key
    }

    // Project a detection's raw pose into the world frame, or `None` when
    // it is unobservable right now.
    fn fuse_detection<L>(
        &self,
        localizer: &L,
        handle: ObjectHandle,
        pose: Option<&RawPose>,
    ) -> Option<FusedPose>
    where
        L: Localizer + ?Sized,
    {
        let agent_raw = localizer.raw_pose();
        let Some(pose) = pose.filter(|p| p.is_comparable(&agent_raw)) else {
            trace!(handle = %handle, "detection pose absent or not comparable; skipped");
            return None;
        };
        let relative = RelativeObservation {
            dx: pose.x - agent_raw.x,
            dy: pose.y - agent_raw.y,
            z: pose.z,
            heading: pose.heading,
        };
        Some(fuse_pose(
            &relative,
            &localizer.agent_estimate(),
            agent_raw.heading,
            self.settings.vision_z_bias,
        ))
    }
}

fn apply_fused(pose: &mut EntityPose, fused: &FusedPose, is_visible: bool) {
    pose.x = fused.x;
    pose.y = fused.y;
    pose.z = fused.z;
    pose.heading = fused.heading;
    pose.is_visible = is_visible;
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
