//! `stowbot-kernel` – Safety & Command Legality
//!
//! The rule-enforcing core of stowbot. It does not move anything; it decides
//! whether movement and commands are allowed.
//!
//! # Modules
//!
//! - [`safety`] – [`SafetyController`][safety::SafetyController]:
//!   validates points against the [`SafetyEnvelope`][safety::SafetyEnvelope]
//!   and holds the fail-closed emergency-stop latch.  Safety events are
//!   forwarded to a [`SafetyEventSink`][safety::SafetyEventSink].
//! - [`state_machine`] – [`RobotStateMachine`][state_machine::RobotStateMachine]:
//!   tracks the operational flag and the discrete
//!   [`RobotState`][stowbot_types::RobotState], and answers whether a command
//!   token is legal in the current state.
//! - [`command_gate`] – [`CommandGate`][command_gate::CommandGate]:
//!   the single check a command passes before it is executed.  Combines state
//!   legality and the emergency-stop latch in one call.

pub mod command_gate;
pub mod safety;
pub mod state_machine;

pub use command_gate::CommandGate;
pub use safety::{SafetyController, SafetyEnvelope, SafetyEventSink, TracingSink};
pub use state_machine::RobotStateMachine;
