//! `landmap-perception` – turns localizer and detector output into a
//! world-frame map.
//!
//! # Modules
//!
//! - [`transform`] – [`fuse_pose`][transform::fuse_pose]: projects a
//!   detection's raw-frame offset into the world frame, correcting for the
//!   heading drift the localizer has observed.
//! - [`catalog`] – [`WallCatalog`][catalog::WallCatalog]: static marker →
//!   wall registry built from configuration.
//! - [`world_map`] – [`WorldMap`][world_map::WorldMap]: infers walls from
//!   markers and keeps light cubes and custom-marked objects in world
//!   coordinates.
//! - [`shared`] – [`SharedWorldMap`][shared::SharedWorldMap]: the same map
//!   behind a mutex for multi-threaded hosts.
//! - [`providers`] – the [`Localizer`][providers::Localizer] and
//!   [`ObjectTracker`][providers::ObjectTracker] traits the map reads from.
//! - [`snapshot`] – [`Snapshot`][snapshot::Snapshot]: a recorded frame of
//!   both providers, replayable through a map.
//! - [`settings`] – [`MapSettings`][settings::MapSettings].

pub mod catalog;
pub mod providers;
pub mod settings;
pub mod shared;
pub mod snapshot;
pub mod transform;
pub mod world_map;

pub use catalog::{WallCatalog, WallConfig, WallSpec};
pub use settings::MapSettings;
pub use shared::SharedWorldMap;
pub use snapshot::Snapshot;
pub use world_map::{MapKey, WorldMap};
