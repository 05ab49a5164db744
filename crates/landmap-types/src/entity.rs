//! World-frame objects held by a world map.
//!
//! Every object kind is a variant of [`Entity`].  The fields every kind
//! shares (position, heading, visibility, obstacle flag) live in the embedded
//! [`EntityPose`]; each variant struct only adds its own geometry and
//! identity.
//!
//! Units are millimetres and radians.

use serde::{Deserialize, Serialize};

use crate::{MarkerId, ObjectHandle};

// ────────────────────────────────────────────────────────────────────────────
// Shared pieces
// ────────────────────────────────────────────────────────────────────────────

/// Physical extent of a box-shaped object (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Size3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A cube with every edge equal to `edge`.
    pub const fn cube(edge: f64) -> Self {
        Self::new(edge, edge, edge)
    }
}

/// Size of a light cube; it never changes.
pub const LIGHT_CUBE_SIZE: Size3 = Size3::cube(44.0);

/// Size used for a custom-marked object when neither an override nor the
/// detection metadata provides one.
pub const DEFAULT_CUSTOM_SIZE: Size3 = Size3::cube(50.0);

/// World-frame placement shared by every [`Entity`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Heading in radians, kept in (−π, π].
    pub heading: f64,
    pub is_visible: bool,
    /// Whether path planners must route around the object.
    pub obstacle: bool,
}

impl EntityPose {
    /// A non-visible obstacle at `(x, y, z)` facing along +X.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            heading: 0.0,
            is_visible: false,
            obstacle: true,
        }
    }
}

impl Default for EntityPose {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Variants
// ────────────────────────────────────────────────────────────────────────────

/// A generic world object with no geometry of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleObject {
    pub id: u32,
    pub pose: EntityPose,
}

impl ObstacleObject {
    pub fn new(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            pose: EntityPose::at(x, y, z),
        }
    }
}

/// A wall reconstructed from one of its markers.
///
/// `pose` is the centre of the wall's base line; `pose.z` is half the wall
/// height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallObject {
    /// Smallest marker id mounted on the wall.
    pub id: MarkerId,
    pub pose: EntityPose,
    pub length: f64,
    pub height: f64,
    pub door_width: f64,
    pub door_height: f64,
}

/// One of the light cubes tracked by the detection subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCubeObject {
    /// The cube's id in the tracker's collection.
    pub id: u32,
    pub pose: EntityPose,
    pub size: Size3,
    pub handle: ObjectHandle,
}

impl LightCubeObject {
    pub fn new(id: u32, handle: ObjectHandle) -> Self {
        Self {
            id,
            pose: EntityPose::default(),
            size: LIGHT_CUBE_SIZE,
            handle,
        }
    }
}

/// An object carrying a custom marker pattern, identified by its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMarkedObject {
    pub object_type: String,
    pub pose: EntityPose,
    pub size: Size3,
    pub handle: ObjectHandle,
}

impl CustomMarkedObject {
    pub fn new(object_type: impl Into<String>, handle: ObjectHandle, size: Size3) -> Self {
        Self {
            object_type: object_type.into(),
            pose: EntityPose::default(),
            size,
            handle,
        }
    }
}

/// A flat disc-shaped landmark (a poker chip, a coaster, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscObject {
    pub id: u32,
    pub pose: EntityPose,
    pub radius: f64,
    pub thickness: f64,
}

impl DiscObject {
    pub const DEFAULT_RADIUS: f64 = 12.5;
    pub const DEFAULT_THICKNESS: f64 = 4.0;

    /// A disc of the default size lying at `(x, y)`.
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self::with_geometry(id, x, y, Self::DEFAULT_RADIUS, Self::DEFAULT_THICKNESS)
    }

    pub fn with_geometry(id: u32, x: f64, y: f64, radius: f64, thickness: f64) -> Self {
        Self {
            id,
            pose: EntityPose::at(x, y, 0.0),
            radius,
            thickness,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entity
// ────────────────────────────────────────────────────────────────────────────

/// Any object a world map can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Obstacle(ObstacleObject),
    Wall(WallObject),
    LightCube(LightCubeObject),
    CustomMarked(CustomMarkedObject),
    Disc(DiscObject),
}

impl Entity {
    /// The shared world-frame placement of this entity.
    pub fn pose(&self) -> &EntityPose {
        match self {
            Entity::Obstacle(o) => &o.pose,
            Entity::Wall(w) => &w.pose,
            Entity::LightCube(c) => &c.pose,
            Entity::CustomMarked(c) => &c.pose,
            Entity::Disc(d) => &d.pose,
        }
    }

    pub fn pose_mut(&mut self) -> &mut EntityPose {
        match self {
            Entity::Obstacle(o) => &mut o.pose,
            Entity::Wall(w) => &mut w.pose,
            Entity::LightCube(c) => &mut c.pose,
            Entity::CustomMarked(c) => &mut c.pose,
            Entity::Disc(d) => &mut d.pose,
        }
    }

    /// Short lowercase name of the variant, as written in the serialized
    /// `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Obstacle(_) => "obstacle",
            Entity::Wall(_) => "wall",
            Entity::LightCube(_) => "light_cube",
            Entity::CustomMarked(_) => "custom_marked",
            Entity::Disc(_) => "disc",
        }
    }

    pub fn heading(&self) -> f64 {
        self.pose().heading
    }

    pub fn is_visible(&self) -> bool {
        self.pose().is_visible
    }

    pub fn is_obstacle(&self) -> bool {
        self.pose().obstacle
    }

    /// The detection handle this entity is tied to, if it came from the
    /// object tracker.
    pub fn handle(&self) -> Option<ObjectHandle> {
        match self {
            Entity::LightCube(c) => Some(c.handle),
            Entity::CustomMarked(c) => Some(c.handle),
            Entity::Obstacle(_) | Entity::Wall(_) | Entity::Disc(_) => None,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.pose();
        let deg = p.heading.to_degrees().round();
        match self {
            Entity::Obstacle(o) => {
                write!(f, "<Obstacle {}: ({:.1},{:.1},{:.1})>", o.id, p.x, p.y, p.z)
            }
            Entity::Wall(w) => write!(
                f,
                "<Wall {}: ({:.1},{:.1}) @ {deg} deg. for {:.1}>",
                w.id, p.x, p.y, w.length
            ),
            Entity::LightCube(c) => write!(
                f,
                "<LightCube {}: ({:.1}, {:.1}, {:.1}) @ {deg} deg.>",
                c.id, p.x, p.y, p.z
            ),
            Entity::CustomMarked(c) => write!(
                f,
                "<CustomMarked {}: ({:.1}, {:.1}, {:.1}) @ {deg} deg.>",
                c.object_type, p.x, p.y, p.z
            ),
            Entity::Disc(d) => {
                write!(f, "<Disc ({:.1},{:.1}) radius {:.1}>", p.x, p.y, d.radius)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entities_are_invisible_obstacles() {
        let cube = Entity::LightCube(LightCubeObject::new(1, ObjectHandle(10)));
        assert!(cube.is_obstacle());
        assert!(!cube.is_visible());
        assert_eq!(cube.heading(), 0.0);
        assert_eq!(cube.handle(), Some(ObjectHandle(10)));
    }

    #[test]
    fn light_cube_has_fixed_size() {
        let cube = LightCubeObject::new(2, ObjectHandle(3));
        assert_eq!(cube.size, Size3::new(44.0, 44.0, 44.0));
    }

    #[test]
    fn disc_defaults() {
        let disc = DiscObject::new(4, 100.0, -20.0);
        assert!((disc.radius - 12.5).abs() < f64::EPSILON);
        assert!((disc.thickness - 4.0).abs() < f64::EPSILON);
        assert_eq!(disc.pose.x, 100.0);
        assert_eq!(Entity::Disc(disc).handle(), None);
    }

    #[test]
    fn pose_mut_writes_through_to_variant() {
        let mut entity = Entity::CustomMarked(CustomMarkedObject::new(
            "CustomType00",
            ObjectHandle(7),
            DEFAULT_CUSTOM_SIZE,
        ));
        entity.pose_mut().x = 12.0;
        entity.pose_mut().is_visible = true;
        match &entity {
            Entity::CustomMarked(c) => {
                assert_eq!(c.pose.x, 12.0);
                assert!(c.pose.is_visible);
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn display_matches_object_kind() {
        let wall = Entity::Wall(WallObject {
            id: MarkerId(2),
            pose: EntityPose {
                heading: std::f64::consts::FRAC_PI_2,
                ..EntityPose::at(10.0, -80.0, 105.0)
            },
            length: 200.0,
            height: 210.0,
            door_width: 75.0,
            door_height: 105.0,
        });
        assert_eq!(wall.to_string(), "<Wall 2: (10.0,-80.0) @ 90 deg. for 200.0>");

        let disc = Entity::Disc(DiscObject::new(1, 5.0, 6.0));
        assert_eq!(disc.to_string(), "<Disc (5.0,6.0) radius 12.5>");
    }

    #[test]
    fn entity_serializes_with_kind_tag() {
        let entity = Entity::Obstacle(ObstacleObject::new(3, 1.0, 2.0, 0.0));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"], entity.kind());
        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }
}
