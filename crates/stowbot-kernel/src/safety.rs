//! [`SafetyController`] – safety barrier and emergency-stop latch.
//!
//! The controller answers two questions:
//!
//! - [`SafetyController::check_envelope`]: does a 3-D point lie inside the
//!   permitted [`SafetyEnvelope`]?  Pure, no side effects.
//! - [`SafetyController::validate_safety`]: is the robot currently allowed to
//!   operate at all?
//!
//! Once [`SafetyController::trigger_emergency_stop`] has been called,
//! `validate_safety` returns `false` for the rest of the session.  There is
//! no public un-latch operation.

use stowbot_types::{Point3, SafetyEvent, WorkspaceConfig};
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Envelope
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned box of positions the robot may legally occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyEnvelope {
    min: Point3,
    max: Point3,
}

impl SafetyEnvelope {
    /// Create an envelope from explicit per-axis bounds (inclusive).
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Envelope that keeps `margin` clear of every face of a
    /// `width × length × height` room.
    pub fn for_room(width: f64, length: f64, height: f64, margin: f64) -> Self {
        Self::new(
            Point3::new(margin, margin, margin),
            Point3::new(width - margin, length - margin, height - margin),
        )
    }

    /// Envelope derived from a [`WorkspaceConfig`].
    pub fn from_workspace(config: &WorkspaceConfig) -> Self {
        Self::for_room(
            config.room_width,
            config.room_length,
            config.room_height,
            config.envelope_margin(),
        )
    }

    pub fn min(&self) -> Point3 {
        self.min
    }

    pub fn max(&self) -> Point3 {
        self.max
    }

    /// `true` when every coordinate of `p` lies within `[min, max]`.
    pub fn contains(&self, p: Point3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

impl Default for SafetyEnvelope {
    fn default() -> Self {
        Self::from_workspace(&WorkspaceConfig::default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Event sinks
// ────────────────────────────────────────────────────────────────────────────

/// Destination for safety events.
///
/// Implementations must not panic; recording is fire-and-forget and can never
/// fail the operation that produced the event.
pub trait SafetyEventSink: Send + Sync {
    fn record(&self, event: &SafetyEvent);
}

/// Default sink: emits every event as a `warn`-level tracing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SafetyEventSink for TracingSink {
    fn record(&self, event: &SafetyEvent) {
        warn!(
            event_id = %event.id,
            timestamp = %event.timestamp,
            "Safety Event: {}",
            event.description
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SafetyController
// ────────────────────────────────────────────────────────────────────────────

/// Envelope checks plus the emergency-stop latch.
///
/// # Example
///
/// ```
/// use stowbot_kernel::safety::{SafetyController, SafetyEnvelope};
/// use stowbot_types::Point3;
///
/// let mut safety = SafetyController::new(SafetyEnvelope::for_room(1000.0, 1000.0, 1000.0, 100.0));
/// assert!(safety.initialise());
/// assert!(safety.validate_safety());
/// assert!(safety.check_envelope(Point3::new(500.0, 500.0, 500.0)));
///
/// safety.trigger_emergency_stop();
/// assert!(!safety.validate_safety());
/// ```
pub struct SafetyController {
    envelope: SafetyEnvelope,
    safety_status: bool,
    emergency_stop: bool,
    sink: Box<dyn SafetyEventSink>,
}

impl SafetyController {
    /// Create a controller that reports events through [`TracingSink`].
    ///
    /// The controller starts in the unsafe state until [`initialise`][Self::initialise]
    /// has run.
    pub fn new(envelope: SafetyEnvelope) -> Self {
        Self::with_sink(envelope, Box::new(TracingSink))
    }

    /// Create a controller with a custom event sink.
    pub fn with_sink(envelope: SafetyEnvelope, sink: Box<dyn SafetyEventSink>) -> Self {
        Self {
            envelope,
            safety_status: false,
            emergency_stop: false,
            sink,
        }
    }

    /// Run the initial safety checks.
    ///
    /// Returns `false` if the emergency stop has been latched: a latched
    /// controller never comes back online.
    pub fn initialise(&mut self) -> bool {
        if self.emergency_stop {
            self.log_event("initialisation refused: emergency stop is latched");
            return false;
        }
        self.safety_status = true;
        true
    }

    pub fn envelope(&self) -> SafetyEnvelope {
        self.envelope
    }

    /// `true` iff `point` lies inside the safety envelope.
    pub fn check_envelope(&self, point: Point3) -> bool {
        self.envelope.contains(point)
    }

    /// `safety_status AND NOT emergency_stop`.
    pub fn validate_safety(&self) -> bool {
        self.safety_status && !self.emergency_stop
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.emergency_stop
    }

    /// Latch the emergency stop.  Irreversible for the lifetime of this
    /// controller.
    pub fn trigger_emergency_stop(&mut self) {
        self.emergency_stop = true;
        self.safety_status = false;
        self.log_event("emergency stop triggered");
    }

    /// Forward `description` to the event sink.
    pub fn log_event(&self, description: &str) {
        self.sink.record(&SafetyEvent::new(description));
    }
}

impl Default for SafetyController {
    fn default() -> Self {
        Self::new(SafetyEnvelope::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl SafetyEventSink for RecordingSink {
        fn record(&self, event: &SafetyEvent) {
            self.0.lock().unwrap().push(event.description.clone());
        }
    }

    fn room_controller() -> SafetyController {
        SafetyController::new(SafetyEnvelope::for_room(1000.0, 1000.0, 1000.0, 100.0))
    }

    // ------------------------------------------------------------------ envelope

    #[test]
    fn points_inside_envelope_pass() {
        let s = room_controller();
        assert!(s.check_envelope(Point3::new(500.0, 500.0, 500.0)));
        assert!(s.check_envelope(Point3::new(100.5, 899.5, 450.0)));
    }

    #[test]
    fn envelope_boundary_is_inclusive() {
        let s = room_controller();
        assert!(s.check_envelope(Point3::new(100.0, 100.0, 100.0)));
        assert!(s.check_envelope(Point3::new(900.0, 900.0, 900.0)));
    }

    #[test]
    fn any_axis_below_margin_fails() {
        let s = room_controller();
        assert!(!s.check_envelope(Point3::new(99.9, 500.0, 500.0)));
        assert!(!s.check_envelope(Point3::new(500.0, 0.0, 500.0)));
        assert!(!s.check_envelope(Point3::new(500.0, 500.0, -1.0)));
    }

    #[test]
    fn any_axis_above_extent_minus_margin_fails() {
        let s = room_controller();
        assert!(!s.check_envelope(Point3::new(900.1, 500.0, 500.0)));
        assert!(!s.check_envelope(Point3::new(500.0, 1000.0, 500.0)));
        assert!(!s.check_envelope(Point3::new(500.0, 500.0, 950.0)));
    }

    #[test]
    fn envelope_check_ignores_latch() {
        let mut s = room_controller();
        s.trigger_emergency_stop();
        assert!(s.check_envelope(Point3::new(500.0, 500.0, 500.0)));
    }

    #[test]
    fn envelope_margin_counts_half_the_robot_width() {
        let env = SafetyEnvelope::from_workspace(&WorkspaceConfig::default());
        assert!((env.min().x - 100.0).abs() < f64::EPSILON);
        assert!((env.max().z - 900.0).abs() < f64::EPSILON);

        let cfg = WorkspaceConfig {
            room_width: 2000.0,
            robot_width: 120.0,
            safe_distance: 70.0,
            ..WorkspaceConfig::default()
        };
        let env = SafetyEnvelope::from_workspace(&cfg);
        assert!((env.min().x - 130.0).abs() < f64::EPSILON);
        assert!((env.max().x - 1870.0).abs() < f64::EPSILON);
        assert!((env.max().y - 870.0).abs() < f64::EPSILON);
    }

    // ------------------------------------------------------------------ latch

    #[test]
    fn unsafe_until_initialised() {
        let mut s = room_controller();
        assert!(!s.validate_safety());
        assert!(s.initialise());
        assert!(s.validate_safety());
    }

    #[test]
    fn emergency_stop_is_permanent() {
        let mut s = room_controller();
        s.initialise();
        s.trigger_emergency_stop();
        for _ in 0..5 {
            assert!(!s.validate_safety());
        }
        // Re-initialising does not clear the latch.
        assert!(!s.initialise());
        assert!(!s.validate_safety());
        assert!(s.is_emergency_stopped());
    }

    #[test]
    fn emergency_stop_before_initialise_is_still_latched() {
        let mut s = room_controller();
        s.trigger_emergency_stop();
        assert!(!s.initialise());
        assert!(!s.validate_safety());
    }

    // ------------------------------------------------------------------ events

    #[test]
    fn emergency_stop_emits_event() {
        let sink = RecordingSink::default();
        let mut s = SafetyController::with_sink(SafetyEnvelope::default(), Box::new(sink.clone()));
        s.initialise();
        s.trigger_emergency_stop();
        let events = sink.0.lock().unwrap();
        assert_eq!(events.as_slice(), ["emergency stop triggered"]);
    }

    #[test]
    fn log_event_does_not_change_state() {
        let sink = RecordingSink::default();
        let mut s = SafetyController::with_sink(SafetyEnvelope::default(), Box::new(sink.clone()));
        s.initialise();
        s.log_event("obstacle near gripper");
        assert!(s.validate_safety());
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn tracing_sink_never_panics() {
        TracingSink.record(&SafetyEvent::new("test"));
    }
}
