//! [`SpatialModel`] – the robot's picture of the room.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use stowbot_types::{Point, WorkspaceConfig};
use tracing::warn;

/// A discrete object the robot can carry to the storage bay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceObject {
    id: u32,
    position: Point,
    stored: bool,
}

impl WorkspaceObject {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// `true` once the object has been credited to the storage bay.
    pub fn is_stored(&self) -> bool {
        self.stored
    }
}

/// Robot pose, room bounds, workspace objects and storage bay.
///
/// Position and facing are only changed by the
/// [`NavigationEngine`][crate::engine::NavigationEngine]; objects are seeded
/// once at construction and never added or removed.
#[derive(Debug, Clone)]
pub struct SpatialModel {
    room_width: f64,
    room_length: f64,
    position: Point,
    facing_angle: f64,
    objects: BTreeMap<u32, WorkspaceObject>,
    storage_bay: Point,
    storage_range: f64,
}

impl SpatialModel {
    /// Build the model from `config` with the robot at the room centre,
    /// facing 0 degrees.
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self::starting_at(config, config.centre())
    }

    /// Build the model with the robot at `start`.
    ///
    /// When two seeds share an id the first one wins.
    pub fn starting_at(config: &WorkspaceConfig, start: Point) -> Self {
        let mut objects = BTreeMap::new();
        for seed in &config.objects {
            match objects.entry(seed.id) {
                Entry::Vacant(slot) => {
                    slot.insert(WorkspaceObject {
                        id: seed.id,
                        position: Point::new(seed.x, seed.y),
                        stored: false,
                    });
                }
                Entry::Occupied(_) => {
                    warn!(id = seed.id, x = seed.x, y = seed.y, "duplicate object id ignored");
                }
            }
        }
        Self {
            room_width: config.room_width,
            room_length: config.room_length,
            position: start,
            facing_angle: 0.0,
            objects,
            storage_bay: config.storage_bay(),
            storage_range: config.storage_range,
        }
    }

    pub fn room_width(&self) -> f64 {
        self.room_width
    }

    pub fn room_length(&self) -> f64 {
        self.room_length
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Facing angle in degrees, always in `[0, 360)`.
    pub fn facing_angle(&self) -> f64 {
        self.facing_angle
    }

    pub fn storage_bay(&self) -> Point {
        self.storage_bay
    }

    pub fn storage_range(&self) -> f64 {
        self.storage_range
    }

    pub fn object(&self, id: u32) -> Option<&WorkspaceObject> {
        self.objects.get(&id)
    }

    /// All objects in ascending id order.
    pub fn objects(&self) -> impl Iterator<Item = &WorkspaceObject> {
        self.objects.values()
    }

    pub fn unstored_count(&self) -> usize {
        self.objects.values().filter(|o| !o.stored).count()
    }

    /// `true` when `p` lies in `[0, room_width] × [0, room_length]`.
    pub fn in_room(&self, p: Point) -> bool {
        (0.0..=self.room_width).contains(&p.x) && (0.0..=self.room_length).contains(&p.y)
    }

    pub(crate) fn set_position(&mut self, p: Point) {
        self.position = p;
    }

    pub(crate) fn set_facing_angle(&mut self, degrees: f64) {
        self.facing_angle = degrees;
    }

    /// Flag `id` as stored.  Returns `false` for unknown or already-stored ids.
    pub(crate) fn mark_stored(&mut self, id: u32) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) if !obj.stored => {
                obj.stored = true;
                true
            }
            _ => false,
        }
    }

    /// Move an unstored object to `p`.  Stored objects stay in the bay.
    pub(crate) fn place_object(&mut self, id: u32, p: Point) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) if !obj.stored => {
                obj.position = p;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowbot_types::ObjectSeed;

    #[test]
    fn new_model_starts_at_centre_with_seeded_objects() {
        let model = SpatialModel::new(&WorkspaceConfig::default());
        assert_eq!(model.position(), Point::new(500.0, 500.0));
        assert!(model.facing_angle().abs() < f64::EPSILON);
        assert_eq!(model.objects().count(), 3);
        assert_eq!(model.object(2).map(|o| o.position()), Some(Point::new(700.0, 700.0)));
        assert_eq!(model.unstored_count(), 3);
    }

    #[test]
    fn room_bounds_are_inclusive() {
        let model = SpatialModel::new(&WorkspaceConfig::default());
        assert!(model.in_room(Point::new(0.0, 0.0)));
        assert!(model.in_room(Point::new(1000.0, 1000.0)));
        assert!(!model.in_room(Point::new(-0.1, 500.0)));
        assert!(!model.in_room(Point::new(500.0, 1000.1)));
    }

    #[test]
    fn mark_stored_happens_once() {
        let mut model = SpatialModel::new(&WorkspaceConfig::default());
        assert!(model.mark_stored(1));
        assert!(!model.mark_stored(1));
        assert!(!model.mark_stored(42));
        assert_eq!(model.unstored_count(), 2);
        assert!(model.object(1).is_some_and(|o| o.is_stored()));
    }

    #[test]
    fn stored_objects_cannot_be_moved() {
        let mut model = SpatialModel::new(&WorkspaceConfig::default());
        assert!(model.place_object(3, Point::new(10.0, 10.0)));
        model.mark_stored(3);
        assert!(!model.place_object(3, Point::new(20.0, 20.0)));
        assert_eq!(model.object(3).map(|o| o.position()), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn custom_seed_set() {
        let cfg = WorkspaceConfig {
            objects: vec![ObjectSeed { id: 9, x: 1.0, y: 2.0 }],
            ..WorkspaceConfig::default()
        };
        let model = SpatialModel::starting_at(&cfg, Point::new(100.0, 100.0));
        assert_eq!(model.position(), Point::new(100.0, 100.0));
        assert!(model.object(9).is_some());
        assert!(model.object(1).is_none());
    }

    #[test]
    fn duplicate_seed_ids_keep_the_first() {
        let cfg = WorkspaceConfig {
            objects: vec![
                ObjectSeed { id: 4, x: 10.0, y: 20.0 },
                ObjectSeed { id: 4, x: 900.0, y: 900.0 },
                ObjectSeed { id: 5, x: 30.0, y: 40.0 },
            ],
            ..WorkspaceConfig::default()
        };
        let model = SpatialModel::new(&cfg);
        assert_eq!(model.objects().count(), 2);
        assert_eq!(model.object(4).map(|o| o.position()), Some(Point::new(10.0, 20.0)));
    }
}
