//! [`SharedWorldMap`] – a [`WorldMap`] behind one mutex.
//!
//! Hosts that poll [`WorldMap::update`] on one thread while a detection
//! event stream calls [`WorldMap::handle_object_observed`] on another share
//! the map through this handle.  The lock is taken once per call and held for
//! exactly that call.  Every update overwrites whole entries, so a lock
//! poisoned by a panicking caller still guards a consistent map and is
//! recovered rather than propagated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use landmap_types::{CubeDetection, CustomDetection, Entity, ObjectObserved};

use crate::providers::{Localizer, ObjectTracker};
use crate::world_map::{MapKey, WorldMap};

/// Cloneable, thread-safe handle to a [`WorldMap`].
#[derive(Debug, Clone)]
pub struct SharedWorldMap {
    inner: Arc<Mutex<WorldMap>>,
}

impl SharedWorldMap {
    pub fn new(map: WorldMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorldMap> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update<L, T>(&self, localizer: &L, tracker: &T)
    where
        L: Localizer + ?Sized,
        T: ObjectTracker + ?Sized,
    {
        self.lock().update(localizer, tracker);
    }

    pub fn generate_walls<L>(&self, localizer: &L) -> usize
    where
        L: Localizer + ?Sized,
    {
        self.lock().generate_walls(localizer)
    }

    pub fn update_cube<L>(&self, localizer: &L, cube: &CubeDetection) -> bool
    where
        L: Localizer + ?Sized,
    {
        self.lock().update_cube(localizer, cube)
    }

    pub fn update_custom_object<L>(&self, localizer: &L, object: &CustomDetection) -> bool
    where
        L: Localizer + ?Sized,
    {
        self.lock().update_custom_object(localizer, object)
    }

    pub fn handle_object_observed<L>(&self, localizer: &L, event: &ObjectObserved) -> bool
    where
        L: Localizer + ?Sized,
    {
        self.lock().handle_object_observed(localizer, event)
    }

    /// Copy of a single entry.
    pub fn get(&self, key: &MapKey) -> Option<Entity> {
        self.lock().get(key).cloned()
    }

    /// Run `f` against the map while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&WorldMap) -> R) -> R {
        f(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MarkerMount, WallCatalog, WallConfig};
    use crate::snapshot::Snapshot;
    use landmap_types::{AgentEstimate, LandmarkEstimate, MarkerId, ObjectHandle, RawPose};
    use std::thread;

    fn shared() -> SharedWorldMap {
        let catalog = WallCatalog::from_configs([
            WallConfig::new(200.0).with_marker(MarkerMount::front(7, 20.0))
        ])
        .unwrap();
        SharedWorldMap::new(WorldMap::new(Arc::new(catalog)))
    }

    fn cube_event(handle: u64, x: f64) -> ObjectObserved {
        ObjectObserved::LightCube(CubeDetection {
            cube_id: handle as u32,
            handle: ObjectHandle(handle),
            pose: Some(RawPose::new(x, 0.0, 0.0, 0.0)),
            is_visible: true,
        })
    }

    #[test]
    fn concurrent_sweep_and_events_land_every_entry() {
        let map = shared();
        let frame = Snapshot::new(AgentEstimate::new(0.0, 0.0, 0.0), RawPose::default())
            .with_landmark(MarkerId(7), LandmarkEstimate::new(10.0, 0.0, 0.0));

        thread::scope(|s| {
            for worker in 0..4u64 {
                let map = map.clone();
                let frame = &frame;
                s.spawn(move || {
                    for i in 0..25u64 {
                        let handle = worker * 100 + i;
                        map.handle_object_observed(frame, &cube_event(handle, handle as f64));
                    }
                });
            }
            let map = map.clone();
            let frame = &frame;
            s.spawn(move || {
                for _ in 0..10 {
                    map.update(frame, frame);
                }
            });
        });

        assert_eq!(map.read(WorldMap::len), 101);
        let cube = map.get(&MapKey::Object(ObjectHandle(307))).unwrap();
        assert_eq!(cube.pose().x, 307.0);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let map = shared();
        let poisoner = map.clone();
        let _ = thread::spawn(move || {
            poisoner.read(|m| {
                if m.is_empty() {
                    panic!("reader panicked");
                }
            });
        })
        .join();

        let frame = Snapshot::new(AgentEstimate::default(), RawPose::default());
        assert!(map.handle_object_observed(&frame, &cube_event(1, 5.0)));
        assert_eq!(map.read(|m| m.len()), 1);
    }
}
