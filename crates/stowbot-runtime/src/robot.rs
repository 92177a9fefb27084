//! [`Robot`] – the mobile manipulator, composed from its subsystems.
//!
//! `Robot` owns one of everything: the safety controller, the state machine,
//! the navigation engine, and one driver per capability (sensor, drive,
//! gripper).  Callers only ever go through its methods; no subsystem is
//! reachable from outside except through a read-only accessor.
//!
//! Operations come in two flavours:
//!
//! - The boolean / `Option` API (`walk`, `grip`, `release`, …) never fails.
//!   Invalid input, unsafe moves and hardware refusals all come back as
//!   `false` or `None`, and the reason is logged.
//! - The `try_*` API returns `Result<_, StowError>` with the reason attached.
//!   The [`CommandExecutor`][crate::executor::CommandExecutor] uses it to tell
//!   the operator why a command failed.
//!
//! # Example
//!
//! ```
//! use stowbot_runtime::Robot;
//! use stowbot_types::{Point, RobotState, WorkspaceConfig};
//!
//! let mut robot = Robot::simulated(&WorkspaceConfig::default());
//! assert!(robot.initialise());
//! assert_eq!(robot.current_state(), RobotState::Idle);
//!
//! assert!(robot.walk("north", 10));
//! assert_eq!(robot.position(), Point::new(500.0, 600.0));
//!
//! // Nothing is within reach of (500, 600).
//! assert!(!robot.grip(5));
//! assert_eq!(robot.held_object(), None);
//! ```

use std::collections::BTreeMap;

use stowbot_hal::{ManipulationLink, Moveable, Rig, Sensing};
use stowbot_kernel::{
    CommandGate, RobotStateMachine, SafetyController, SafetyEnvelope, SafetyEventSink,
};
use stowbot_navigation::{LocationSummary, NavigationEngine, NearbyObject};
use stowbot_types::{
    CommandToken, CompassDirection, Point, Point3, RobotState, StowError, WorkspaceConfig,
};
use tracing::{error, info, warn};

/// Largest turn accepted in one command, in degrees either way.
pub const MAX_TURN_DEG: f64 = 180.0;

/// What happened to the object let go by [`Robot::try_release`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Released inside the storage bay and credited as stored.
    /// `all_stored` is `true` when this was the last unstored object.
    Stored { id: u32, all_stored: bool },
    /// Released elsewhere; the object now rests at `at`.
    Dropped { id: u32, at: Point },
}

impl ReleaseOutcome {
    pub fn id(&self) -> u32 {
        match *self {
            ReleaseOutcome::Stored { id, .. } | ReleaseOutcome::Dropped { id, .. } => id,
        }
    }
}

pub struct Robot {
    safety: SafetyController,
    machine: RobotStateMachine,
    nav: NavigationEngine,
    sensor: Box<dyn Sensing>,
    motion: Box<dyn Moveable>,
    manipulation: ManipulationLink,
    grip_range: f64,
}

impl Robot {
    /// Compose a robot from `config` and a set of hardware drivers.
    ///
    /// The robot is not operational until [`initialise`][Self::initialise]
    /// succeeds.
    pub fn new(config: &WorkspaceConfig, rig: Rig) -> Self {
        Self::with_safety(
            config,
            rig,
            SafetyController::new(SafetyEnvelope::from_workspace(config)),
        )
    }

    /// As [`new`][Self::new], reporting safety events to `sink`.
    pub fn with_sink(config: &WorkspaceConfig, rig: Rig, sink: Box<dyn SafetyEventSink>) -> Self {
        Self::with_safety(
            config,
            rig,
            SafetyController::with_sink(SafetyEnvelope::from_workspace(config), sink),
        )
    }

    fn with_safety(config: &WorkspaceConfig, rig: Rig, safety: SafetyController) -> Self {
        Self {
            safety,
            machine: RobotStateMachine::new(),
            nav: NavigationEngine::new(config),
            sensor: rig.sensor,
            motion: rig.motion,
            manipulation: ManipulationLink::new(rig.gripper),
            grip_range: config.grip_range,
        }
    }

    /// Robot on the default simulated rig.
    pub fn simulated(config: &WorkspaceConfig) -> Self {
        Self::new(config, Rig::default())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ────────────────────────────────────────────────────────────────────────

    /// Bring every subsystem online: safety, then the sensor, then the drive.
    ///
    /// On success the robot is operational and `Idle`.  On any failure it is
    /// not operational and in `Error`.
    pub fn initialise(&mut self) -> bool {
        match self.bring_online() {
            Ok(()) => {
                self.machine.mark_operational();
                info!(position = %self.nav.position(), "robot online");
                true
            }
            Err(e) => {
                self.machine.mark_failed();
                error!(error = %e, "initialisation failed");
                false
            }
        }
    }

    fn bring_online(&mut self) -> Result<(), StowError> {
        if !self.safety.initialise() {
            return Err(StowError::SafetyLatched);
        }
        let scan = self.sensor.scan()?;
        if !scan.path_clear {
            warn!(obstacles = scan.obstacles, "initial scan reports obstacles");
        }
        self.motion.stop()?;
        Ok(())
    }

    /// Re-run [`initialise`][Self::initialise].  The emergency-stop latch is
    /// not cleared, so a latched robot stays in `Error`.
    pub fn reset(&mut self) -> bool {
        info!(state = %self.machine.state(), "reset requested");
        self.initialise()
    }

    pub fn current_state(&self) -> RobotState {
        self.machine.state()
    }

    pub fn is_operational(&self) -> bool {
        self.machine.is_operational()
    }

    /// Legality oracle; never changes state.
    pub fn validate_command(&self, token: &str) -> bool {
        self.machine.validate_command(token)
    }

    /// State legality plus the safety latch for `token`.
    ///
    /// # Errors
    ///
    /// See [`CommandGate::authorize`].
    pub fn authorize(&self, token: CommandToken) -> Result<(), StowError> {
        CommandGate::new(&self.machine, &self.safety).authorize(token)
    }

    pub fn state_machine(&self) -> &RobotStateMachine {
        &self.machine
    }

    pub(crate) fn enter_state(&mut self, state: RobotState) {
        self.machine.enter(state);
    }

    // ────────────────────────────────────────────────────────────────────────
    // Motion
    // ────────────────────────────────────────────────────────────────────────

    /// Walk `steps` steps toward the compass label `direction`.
    ///
    /// `false`, with the position unchanged, for malformed labels, unsafe
    /// targets, a latched emergency stop, or a drive refusal.
    pub fn walk(&mut self, direction: &str, steps: u32) -> bool {
        let result = direction
            .parse::<CompassDirection>()
            .and_then(|d| self.try_walk(d, steps));
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(direction, steps, error = %e, "walk failed");
                false
            }
        }
    }

    /// Typed [`walk`][Self::walk].  Returns the new position.
    ///
    /// # Errors
    ///
    /// - [`StowError::NotOperational`] – initialisation has not succeeded.
    /// - [`StowError::SafetyLatched`] – the robot is not safe to move.
    /// - [`StowError::MovementRejected`] – the target fails the movement rules.
    /// - [`StowError::HardwareFault`] – the drive refused to start.
    pub fn try_walk(&mut self, direction: CompassDirection, steps: u32) -> Result<Point, StowError> {
        self.drive(|nav| nav.walk_toward(direction, steps))
    }

    /// Turn by `degrees`, which must lie in `[-180, 180]`.
    pub fn turn(&mut self, degrees: f64) -> bool {
        match self.try_turn(degrees) {
            Ok(_) => true,
            Err(e) => {
                warn!(degrees, error = %e, "turn failed");
                false
            }
        }
    }

    /// Typed [`turn`][Self::turn].  Returns the new facing angle.
    ///
    /// # Errors
    ///
    /// [`StowError::AngleOutOfRange`] for turns outside `[-180, 180]`, plus
    /// the errors of [`try_walk`][Self::try_walk] other than
    /// `MovementRejected`.
    pub fn try_turn(&mut self, degrees: f64) -> Result<f64, StowError> {
        if !(-MAX_TURN_DEG..=MAX_TURN_DEG).contains(&degrees) {
            return Err(StowError::AngleOutOfRange(degrees));
        }
        self.drive(|nav| Ok(nav.rotate(degrees)))
    }

    /// Halt the drive.
    ///
    /// # Errors
    ///
    /// [`StowError::HardwareFault`] if the drive cannot be halted.
    pub fn stop(&mut self) -> Result<(), StowError> {
        self.motion.stop()
    }

    /// Run `action` with the drive started, stopping it again afterwards.
    fn drive<T>(
        &mut self,
        action: impl FnOnce(&mut NavigationEngine) -> Result<T, StowError>,
    ) -> Result<T, StowError> {
        self.ensure_operational()?;
        if !self.safety.validate_safety() {
            return Err(StowError::SafetyLatched);
        }
        self.motion.start()?;
        let result = action(&mut self.nav);
        if let Err(e) = self.motion.stop() {
            error!(error = %e, "drive failed to stop");
        }
        result
    }

    fn ensure_operational(&self) -> Result<(), StowError> {
        if self.machine.is_operational() {
            Ok(())
        } else {
            Err(StowError::NotOperational)
        }
    }

    pub fn position(&self) -> Point {
        self.nav.position()
    }

    pub fn facing_angle(&self) -> f64 {
        self.nav.facing_angle()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Queries
    // ────────────────────────────────────────────────────────────────────────

    pub fn nearby_objects(&self, max_distance: f64) -> BTreeMap<u32, f64> {
        self.nav.nearby_objects(max_distance)
    }

    /// Compass label and whole steps to object `id`; `None` if unknown.
    pub fn steps_to(&self, id: u32) -> Option<(CompassDirection, u32)> {
        self.nav.steps_to_object(id)
    }

    pub fn steps_to_storage(&self) -> (CompassDirection, u32) {
        self.nav.steps_to_storage()
    }

    pub fn available_objects(&self) -> BTreeMap<u32, Point> {
        self.nav.available_objects()
    }

    pub fn is_at_storage_bay(&self, point: Point) -> bool {
        self.nav.is_at_storage_bay(point)
    }

    pub fn location_summary(&self) -> LocationSummary {
        self.nav.location_summary()
    }

    pub fn workspace_guide(&self) -> Vec<NearbyObject> {
        self.nav.workspace_guide()
    }

    pub fn navigation(&self) -> &NavigationEngine {
        &self.nav
    }

    // ────────────────────────────────────────────────────────────────────────
    // Manipulation
    // ────────────────────────────────────────────────────────────────────────

    /// Grip object `id`.  Needs an empty hand and `id` within grip range.
    pub fn grip(&mut self, id: u32) -> bool {
        match self.try_grip(id) {
            Ok(()) => true,
            Err(e) => {
                warn!(id, error = %e, "grip failed");
                false
            }
        }
    }

    /// Typed [`grip`][Self::grip].
    ///
    /// # Errors
    ///
    /// - [`StowError::NotOperational`] – initialisation has not succeeded.
    /// - [`StowError::UnknownObject`] – no object has this id.
    /// - [`StowError::OutOfReach`] – the object is stored or too far away.
    /// - [`StowError::HardwareFault`] – already holding, or the gripper
    ///   refused.
    pub fn try_grip(&mut self, id: u32) -> Result<(), StowError> {
        self.ensure_operational()?;
        if self.nav.model().object(id).is_none() {
            return Err(StowError::UnknownObject(id));
        }
        if !self.nav.nearby_objects(self.grip_range).contains_key(&id) {
            return Err(StowError::OutOfReach(id));
        }
        if !self.manipulation.grip(id) {
            return Err(StowError::HardwareFault {
                component: self.manipulation.gripper().id().to_string(),
                details: format!("could not grip object {id}"),
            });
        }
        self.nav.set_carrying(Some(id));
        Ok(())
    }

    /// Let go of the held object.  Inside the storage bay it is credited as
    /// stored; elsewhere it is left at the robot's position.
    pub fn release(&mut self) -> bool {
        match self.try_release() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "release failed");
                false
            }
        }
    }

    /// Typed [`release`][Self::release].
    ///
    /// # Errors
    ///
    /// - [`StowError::NotOperational`] – initialisation has not succeeded.
    /// - [`StowError::NotHolding`] – the hand is empty.
    /// - [`StowError::HardwareFault`] – the gripper would not open.
    /// - [`StowError::UnknownObject`] – the held id is not an unstored object.
    pub fn try_release(&mut self) -> Result<ReleaseOutcome, StowError> {
        self.ensure_operational()?;
        let id = self.manipulation.held_object().ok_or(StowError::NotHolding)?;
        if !self.manipulation.release() {
            return Err(StowError::HardwareFault {
                component: self.manipulation.gripper().id().to_string(),
                details: format!("could not release object {id}"),
            });
        }

        let here = self.nav.position();
        if self.nav.is_at_storage_bay(here) {
            let all_stored = self.nav.store_object(id);
            Ok(ReleaseOutcome::Stored { id, all_stored })
        } else if self.nav.drop_object(id, here) {
            info!(id, at = %here, "object left outside the storage bay");
            Ok(ReleaseOutcome::Dropped { id, at: here })
        } else {
            Err(StowError::UnknownObject(id))
        }
    }

    pub fn held_object(&self) -> Option<u32> {
        self.manipulation.held_object()
    }

    /// Credit object `id` as stored.  `true` iff it was the last one.
    ///
    /// The held object is refused; it is stored by releasing it inside the
    /// bay.
    pub fn store_object(&mut self, id: u32) -> bool {
        if self.manipulation.held_object() == Some(id) {
            warn!(id, "object is in the gripper; release it to store it");
            return false;
        }
        self.nav.store_object(id)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Safety
    // ────────────────────────────────────────────────────────────────────────

    pub fn validate_safety(&self) -> bool {
        self.safety.validate_safety()
    }

    pub fn check_envelope(&self, point: Point3) -> bool {
        self.safety.check_envelope(point)
    }

    /// Latch the emergency stop and halt the drive.
    pub fn trigger_emergency_stop(&mut self) {
        self.safety.trigger_emergency_stop();
        if let Err(e) = self.motion.stop() {
            error!(error = %e, "drive failed to stop after emergency stop");
        }
    }

    pub fn safety(&self) -> &SafetyController {
        &self.safety
    }
}
