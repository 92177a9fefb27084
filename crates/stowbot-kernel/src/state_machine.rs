//! [`RobotStateMachine`] – operational flag, discrete state, and the
//! per-state command legality table.
//!
//! Validation is a pure oracle: [`RobotStateMachine::validate_command`] never
//! changes the state.  State changes are driven from outside through
//! [`RobotStateMachine::enter`], [`RobotStateMachine::mark_operational`] and
//! [`RobotStateMachine::mark_failed`].
//!
//! | State | Legal tokens |
//! |---|---|
//! | `Idle` | walk, turn, grasp |
//! | `Walking` | stop, turn |
//! | `Turning` | stop, walk |
//! | `Grasping` | release |
//! | `Error` | reset |

use stowbot_types::{CommandToken, RobotState, StowError};
use tracing::debug;

/// Tokens accepted in `state`.
pub fn legal_tokens(state: RobotState) -> &'static [CommandToken] {
    match state {
        RobotState::Idle => &[CommandToken::Walk, CommandToken::Turn, CommandToken::Grasp],
        RobotState::Walking => &[CommandToken::Stop, CommandToken::Turn],
        RobotState::Turning => &[CommandToken::Stop, CommandToken::Walk],
        RobotState::Grasping => &[CommandToken::Release],
        RobotState::Error => &[CommandToken::Reset],
    }
}

/// Tracks whether the robot is operational and which state it is in.
///
/// # Example
///
/// ```
/// use stowbot_kernel::state_machine::RobotStateMachine;
/// use stowbot_types::RobotState;
///
/// let mut sm = RobotStateMachine::new();
/// assert!(!sm.validate_command("walk"));
///
/// sm.mark_operational();
/// assert!(sm.validate_command("walk"));
/// assert!(!sm.validate_command("release"));
/// assert_eq!(sm.state(), RobotState::Idle);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RobotStateMachine {
    state: RobotState,
    is_operational: bool,
}

impl RobotStateMachine {
    /// `Idle`, not operational.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn is_operational(&self) -> bool {
        self.is_operational
    }

    /// `true` when `token` names a command legal in the current state.
    ///
    /// Always `false` while the robot is not operational.  Unknown tokens are
    /// never legal.
    pub fn validate_command(&self, token: &str) -> bool {
        token
            .parse::<CommandToken>()
            .is_ok_and(|t| self.check(t).is_ok())
    }

    /// Typed form of [`validate_command`][Self::validate_command] that reports
    /// why a token was refused.
    ///
    /// # Errors
    ///
    /// - [`StowError::NotOperational`] – the robot has not been initialised,
    ///   or initialisation failed.
    /// - [`StowError::IllegalCommand`] – `token` is not in the current state's
    ///   row of the legality table.
    pub fn check(&self, token: CommandToken) -> Result<(), StowError> {
        if !self.is_operational {
            return Err(StowError::NotOperational);
        }
        if legal_tokens(self.state).contains(&token) {
            Ok(())
        } else {
            Err(StowError::IllegalCommand {
                state: self.state,
                token: token.to_string(),
            })
        }
    }

    /// Successful initialisation: operational and `Idle`.
    pub fn mark_operational(&mut self) {
        self.is_operational = true;
        self.state = RobotState::Idle;
    }

    /// Failed initialisation: not operational and `Error`.
    pub fn mark_failed(&mut self) {
        self.is_operational = false;
        self.state = RobotState::Error;
    }

    /// Move to `state`.  Called by the external command driver; no legality
    /// check is applied here.
    pub fn enter(&mut self, state: RobotState) {
        if state != self.state {
            debug!(from = %self.state, to = %state, "state transition");
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operational_in(state: RobotState) -> RobotStateMachine {
        let mut sm = RobotStateMachine::new();
        sm.mark_operational();
        sm.enter(state);
        sm
    }

    #[test]
    fn starts_idle_and_not_operational() {
        let sm = RobotStateMachine::new();
        assert_eq!(sm.state(), RobotState::Idle);
        assert!(!sm.is_operational());
    }

    #[test]
    fn not_operational_rejects_everything() {
        let sm = RobotStateMachine::new();
        for token in ["walk", "turn", "grasp", "stop", "release", "reset"] {
            assert!(!sm.validate_command(token), "{token} must be rejected");
        }
        assert_eq!(sm.check(CommandToken::Walk), Err(StowError::NotOperational));
    }

    #[test]
    fn idle_row() {
        let sm = operational_in(RobotState::Idle);
        assert!(sm.validate_command("walk"));
        assert!(sm.validate_command("turn"));
        assert!(sm.validate_command("grasp"));
        assert!(!sm.validate_command("stop"));
        assert!(!sm.validate_command("release"));
        assert!(!sm.validate_command("reset"));
    }

    #[test]
    fn walking_row() {
        let sm = operational_in(RobotState::Walking);
        assert!(sm.validate_command("stop"));
        assert!(sm.validate_command("turn"));
        assert!(!sm.validate_command("walk"));
        assert!(!sm.validate_command("grasp"));
    }

    #[test]
    fn turning_row() {
        let sm = operational_in(RobotState::Turning);
        assert!(sm.validate_command("stop"));
        assert!(sm.validate_command("walk"));
        assert!(!sm.validate_command("turn"));
    }

    #[test]
    fn grasping_row() {
        let sm = operational_in(RobotState::Grasping);
        assert!(sm.validate_command("release"));
        for token in ["walk", "turn", "grasp", "stop", "reset"] {
            assert!(!sm.validate_command(token));
        }
    }

    #[test]
    fn error_row_is_unreachable_while_failed() {
        let mut sm = RobotStateMachine::new();
        sm.mark_failed();
        assert_eq!(sm.state(), RobotState::Error);
        // Failed initialisation clears the operational flag, so even the
        // reset token is refused by the oracle.
        assert!(!sm.validate_command("reset"));
    }

    #[test]
    fn error_row_when_operational() {
        let sm = operational_in(RobotState::Error);
        assert!(sm.validate_command("reset"));
        assert!(!sm.validate_command("walk"));
    }

    #[test]
    fn unknown_tokens_rejected() {
        let sm = operational_in(RobotState::Idle);
        assert!(!sm.validate_command("jump"));
        assert!(!sm.validate_command(""));
        assert!(!sm.validate_command("WALK"));
    }

    #[test]
    fn validation_never_changes_state() {
        let sm = operational_in(RobotState::Turning);
        for token in ["walk", "turn", "grasp", "stop", "release", "reset", "bogus"] {
            let _ = sm.validate_command(token);
            assert_eq!(sm.state(), RobotState::Turning);
            assert!(sm.is_operational());
        }
    }

    #[test]
    fn check_reports_state_and_token() {
        let sm = operational_in(RobotState::Grasping);
        assert_eq!(
            sm.check(CommandToken::Walk),
            Err(StowError::IllegalCommand {
                state: RobotState::Grasping,
                token: "walk".to_string(),
            })
        );
    }

    #[test]
    fn mark_operational_recovers_from_error() {
        let mut sm = RobotStateMachine::new();
        sm.mark_failed();
        sm.mark_operational();
        assert_eq!(sm.state(), RobotState::Idle);
        assert!(sm.is_operational());
    }
}
