//! [`NavigationEngine`] – movement legality and spatial queries.
//!
//! The engine wraps a [`SpatialModel`] and is the only code allowed to move
//! the robot.  A move is computed, checked with
//! [`NavigationEngine::is_movement_safe`] and applied in one step; when the
//! check fails the position is left untouched.
//!
//! # Movement rules
//!
//! 1. The target must lie inside the room, `[0, width] × [0, length]`.
//! 2. While the carry constraint is active the target must not be farther
//!    from the storage bay than the current position.  Which condition
//!    activates the constraint is selected by [`CarryRule`]:
//!    [`CarryRule::AnyUnstored`] (any object still waiting for delivery) or
//!    [`CarryRule::Holding`] (an object is currently held).
//!
//! # Example
//!
//! ```
//! use stowbot_navigation::NavigationEngine;
//! use stowbot_types::{Point, WorkspaceConfig};
//!
//! let mut nav = NavigationEngine::new(&WorkspaceConfig::default());
//! assert!(nav.walk("north", 10));
//! assert_eq!(nav.position(), Point::new(500.0, 600.0));
//!
//! // Walking away from the storage bay at (800, 800) is refused.
//! assert!(!nav.walk("south", 5));
//! assert_eq!(nav.position(), Point::new(500.0, 600.0));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use stowbot_types::{
    CarryRule, CompassDirection, Point, RelativeDirection, StowError, WorkspaceConfig,
};
use tracing::{debug, info};

use crate::direction::{self, compass_direction, relative_direction, step_delta, whole_steps};
use crate::spatial::SpatialModel;

/// Radius used by [`NavigationEngine::location_summary`] for nearby objects.
pub const DEFAULT_SCAN_RADIUS: f64 = 200.0;

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

/// Distance from the robot to each wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallDistances {
    pub forward: f64,
    pub backward: f64,
    pub right: f64,
    pub left: f64,
}

/// An unstored object near the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyObject {
    pub id: u32,
    pub position: Point,
    pub distance: f64,
    pub direction: RelativeDirection,
}

/// Human-oriented snapshot of the robot's surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSummary {
    pub position: Point,
    pub facing_angle: f64,
    pub walls: WallDistances,
    pub nearby: Vec<NearbyObject>,
}

impl fmt::Display for LocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Position: {}", self.position)?;
        writeln!(f, "Facing: {:.0} degrees", self.facing_angle)?;
        writeln!(f, "Distance to Walls:")?;
        writeln!(f, "- Forward: {:.0}cm", self.walls.forward)?;
        writeln!(f, "- Backward: {:.0}cm", self.walls.backward)?;
        writeln!(f, "- Right: {:.0}cm", self.walls.right)?;
        write!(f, "- Left: {:.0}cm", self.walls.left)?;
        if !self.nearby.is_empty() {
            write!(f, "\nNearby Objects:")?;
            for obj in &self.nearby {
                write!(f, "\n- Object {}: {}, {:.0}cm away", obj.id, obj.direction, obj.distance)?;
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NavigationEngine
// ────────────────────────────────────────────────────────────────────────────

/// Spatial queries and legal movement over a [`SpatialModel`].
#[derive(Debug, Clone)]
pub struct NavigationEngine {
    model: SpatialModel,
    step_cm: f64,
    carry_rule: CarryRule,
    /// Object currently held by the manipulator; it travels with the robot.
    carrying: Option<u32>,
}

impl NavigationEngine {
    /// Engine over a fresh model built from `config`, robot at the centre.
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self::with_model(SpatialModel::new(config), config)
    }

    /// Engine over an existing model, taking step length and carry rule from
    /// `config`.
    pub fn with_model(model: SpatialModel, config: &WorkspaceConfig) -> Self {
        Self {
            model,
            step_cm: config.step_cm,
            carry_rule: config.carry_rule,
            carrying: None,
        }
    }

    pub fn model(&self) -> &SpatialModel {
        &self.model
    }

    pub fn position(&self) -> Point {
        self.model.position()
    }

    pub fn facing_angle(&self) -> f64 {
        self.model.facing_angle()
    }

    pub fn carry_rule(&self) -> CarryRule {
        self.carry_rule
    }

    pub fn carrying(&self) -> Option<u32> {
        self.carrying
    }

    /// Record which object, if any, the manipulator is holding.
    pub fn set_carrying(&mut self, id: Option<u32>) {
        self.carrying = id;
    }

    // -------------------------------------------------------------------------
    // Directions & distances
    // -------------------------------------------------------------------------

    /// Direction of `target` relative to the robot's facing.
    pub fn relative_direction(&self, target: Point) -> RelativeDirection {
        relative_direction(self.position(), self.facing_angle(), target)
    }

    /// Compass label and whole step count from the robot to `target`.
    pub fn steps_to(&self, target: Point) -> (CompassDirection, u32) {
        let here = self.position();
        let label = compass_direction(target.x - here.x, target.y - here.y);
        (label, whole_steps(here.distance_to(target), self.step_cm))
    }

    /// [`steps_to`][Self::steps_to] an object.  `None` for unknown ids.
    pub fn steps_to_object(&self, id: u32) -> Option<(CompassDirection, u32)> {
        self.model.object(id).map(|o| self.steps_to(o.position()))
    }

    /// [`steps_to`][Self::steps_to] the storage bay.
    pub fn steps_to_storage(&self) -> (CompassDirection, u32) {
        self.steps_to(self.model.storage_bay())
    }

    pub fn distance_to_storage(&self) -> f64 {
        self.position().distance_to(self.model.storage_bay())
    }

    /// Unstored objects within `max_distance` of the robot, with their
    /// distances.
    pub fn nearby_objects(&self, max_distance: f64) -> BTreeMap<u32, f64> {
        let here = self.position();
        self.model
            .objects()
            .filter(|o| !o.is_stored())
            .map(|o| (o.id(), here.distance_to(o.position())))
            .filter(|(_, d)| *d <= max_distance)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------------

    /// `true` when moving to `(target_x, target_y)` is legal.
    pub fn is_movement_safe(&self, target_x: f64, target_y: f64) -> bool {
        let target = Point::new(target_x, target_y);
        if !self.model.in_room(target) {
            debug!(x = target_x, y = target_y, "target outside room bounds");
            return false;
        }

        if self.carry_constraint_active() {
            let bay = self.model.storage_bay();
            if target.distance_to(bay) > self.position().distance_to(bay) {
                debug!(
                    x = target_x,
                    y = target_y,
                    rule = ?self.carry_rule,
                    "target moves away from storage bay"
                );
                return false;
            }
        }
        true
    }

    fn carry_constraint_active(&self) -> bool {
        match self.carry_rule {
            CarryRule::AnyUnstored => self.model.unstored_count() > 0,
            CarryRule::Holding => self.carrying.is_some(),
        }
    }

    /// Walk `steps` steps toward the compass label `direction`.
    ///
    /// Returns `false`, leaving the position unchanged, when the label is
    /// malformed or the target fails [`is_movement_safe`][Self::is_movement_safe].
    pub fn walk(&mut self, direction: &str, steps: u32) -> bool {
        match direction
            .parse::<CompassDirection>()
            .and_then(|d| self.walk_toward(d, steps))
        {
            Ok(_) => true,
            Err(e) => {
                debug!(direction, steps, error = %e, "walk refused");
                false
            }
        }
    }

    /// Typed form of [`walk`][Self::walk].  Returns the new position.
    ///
    /// # Errors
    ///
    /// [`StowError::MovementRejected`] when the target is not safe.
    pub fn walk_toward(&mut self, direction: CompassDirection, steps: u32) -> Result<Point, StowError> {
        let (dx, dy) = step_delta(direction, self.step_cm);
        let n = f64::from(steps);
        let target = self.position().offset(dx * n, dy * n);

        if !self.is_movement_safe(target.x, target.y) {
            return Err(StowError::MovementRejected {
                x: target.x,
                y: target.y,
            });
        }

        self.model.set_position(target);
        if let Some(id) = self.carrying {
            self.model.place_object(id, target);
        }
        info!(%direction, steps, x = target.x, y = target.y, "moved");
        Ok(target)
    }

    /// Rotate the facing angle by `delta_deg`, wrapping into `[0, 360)`.
    /// Returns the new facing angle.
    pub fn rotate(&mut self, delta_deg: f64) -> f64 {
        let facing = direction::normalize_degrees(self.facing_angle() + delta_deg);
        self.model.set_facing_angle(facing);
        facing
    }

    // -------------------------------------------------------------------------
    // Storage workflow
    // -------------------------------------------------------------------------

    /// `true` when `point` is within the storage bay's capture radius.
    pub fn is_at_storage_bay(&self, point: Point) -> bool {
        self.is_at_storage_bay_within(point, self.model.storage_range())
    }

    /// `true` when `point` is within `tolerance` of the storage bay.
    pub fn is_at_storage_bay_within(&self, point: Point, tolerance: f64) -> bool {
        point.distance_to(self.model.storage_bay()) <= tolerance
    }

    /// Credit object `id` as delivered.
    ///
    /// Unknown or already-stored ids are a no-op returning `false`.  Otherwise
    /// returns `true` iff this call completed delivery of every object.
    pub fn store_object(&mut self, id: u32) -> bool {
        if !self.model.mark_stored(id) {
            return false;
        }
        if self.carrying == Some(id) {
            self.carrying = None;
        }
        let remaining = self.model.unstored_count();
        info!(id, remaining, "object stored");
        remaining == 0
    }

    /// Leave object `id` at `at`.  Returns `false` for unknown or stored ids.
    pub fn drop_object(&mut self, id: u32, at: Point) -> bool {
        if self.carrying == Some(id) {
            self.carrying = None;
        }
        self.model.place_object(id, at)
    }

    /// Positions of every object not yet stored.
    pub fn available_objects(&self) -> BTreeMap<u32, Point> {
        self.model
            .objects()
            .filter(|o| !o.is_stored())
            .map(|o| (o.id(), o.position()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    pub fn wall_distances(&self) -> WallDistances {
        let p = self.position();
        WallDistances {
            forward: self.model.room_length() - p.y,
            backward: p.y,
            right: self.model.room_width() - p.x,
            left: p.x,
        }
    }

    /// Position, facing, wall distances and unstored objects within
    /// [`DEFAULT_SCAN_RADIUS`].
    pub fn location_summary(&self) -> LocationSummary {
        let nearby = self
            .nearby_objects(DEFAULT_SCAN_RADIUS)
            .into_iter()
            .filter_map(|(id, distance)| self.bearing(id, distance))
            .collect();
        LocationSummary {
            position: self.position(),
            facing_angle: self.facing_angle(),
            walls: self.wall_distances(),
            nearby,
        }
    }

    /// Every object, stored or not, with its distance and relative direction.
    pub fn workspace_guide(&self) -> Vec<NearbyObject> {
        let here = self.position();
        self.model
            .objects()
            .filter_map(|o| self.bearing(o.id(), here.distance_to(o.position())))
            .collect()
    }

    fn bearing(&self, id: u32, distance: f64) -> Option<NearbyObject> {
        let position = self.model.object(id)?.position();
        Some(NearbyObject {
            id,
            position,
            distance,
            direction: self.relative_direction(position),
        })
    }
}
