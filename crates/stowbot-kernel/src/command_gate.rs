//! [`CommandGate`] – single interception point before a command executes.
//!
//! Every command issued to the robot must pass through
//! [`CommandGate::authorize`].  Two independent checks run in order:
//!
//! 1. **State legality** ([`RobotStateMachine`]): the robot must be
//!    operational and the token must be legal in the current state.
//! 2. **Safety latch** ([`SafetyController`]): motion tokens (`walk`, `turn`)
//!    are refused while [`SafetyController::validate_safety`] is `false`.
//!
//! # Example
//!
//! ```
//! use stowbot_kernel::{CommandGate, RobotStateMachine, SafetyController};
//! use stowbot_types::CommandToken;
//!
//! let mut machine = RobotStateMachine::new();
//! let mut safety = SafetyController::default();
//! machine.mark_operational();
//! safety.initialise();
//!
//! assert!(CommandGate::new(&machine, &safety).authorize(CommandToken::Walk).is_ok());
//!
//! safety.trigger_emergency_stop();
//! assert!(CommandGate::new(&machine, &safety).authorize(CommandToken::Walk).is_err());
//! ```

use stowbot_types::{CommandToken, StowError};

use crate::safety::SafetyController;
use crate::state_machine::RobotStateMachine;

/// Borrowing view over the state machine and safety controller.
pub struct CommandGate<'a> {
    machine: &'a RobotStateMachine,
    safety: &'a SafetyController,
}

impl<'a> CommandGate<'a> {
    pub fn new(machine: &'a RobotStateMachine, safety: &'a SafetyController) -> Self {
        Self { machine, safety }
    }

    /// Decide whether `token` may execute now.
    ///
    /// # Errors
    ///
    /// - [`StowError::NotOperational`] / [`StowError::IllegalCommand`] – the
    ///   state machine refused the token.
    /// - [`StowError::SafetyLatched`] – a motion token was issued while the
    ///   robot is unsafe.
    pub fn authorize(&self, token: CommandToken) -> Result<(), StowError> {
        self.machine.check(token)?;
        if token.is_motion() && !self.safety.validate_safety() {
            return Err(StowError::SafetyLatched);
        }
        Ok(())
    }
}
