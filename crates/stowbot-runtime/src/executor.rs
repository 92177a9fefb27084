//! [`CommandExecutor`] – parses operator commands and drives the state
//! machine around them.
//!
//! The state machine never transitions on its own.  The executor does it:
//!
//! 1. The command's token is checked against the state the robot is in when
//!    the command begins (state legality plus the safety latch, see
//!    [`CommandGate`]).  An illegal command mutates nothing.
//! 2. The robot enters the command's phase state (`walk` → `Walking`,
//!    `turn` → `Turning`, `grasp`/`release` → `Grasping`).
//! 3. The action runs.  Actions are atomic.
//! 4. The robot settles back to `Idle`, whatever the action's outcome.
//!
//! While an object is held the gripper is engaged, so a `release` begins in
//! the `Grasping` phase.  `reset` bypasses the legality table and always
//! re-runs [`Robot::initialise`].
//!
//! # Example
//!
//! ```
//! use stowbot_runtime::{CommandExecutor, Outcome, Robot};
//! use stowbot_types::{Point, RobotState, WorkspaceConfig};
//!
//! let mut robot = Robot::simulated(&WorkspaceConfig::default());
//! robot.initialise();
//!
//! let mut exec = CommandExecutor::new();
//! let outcome = exec.execute(&mut robot, "walk north 10").unwrap();
//! assert_eq!(outcome, Outcome::Moved(Point::new(500.0, 600.0)));
//! assert_eq!(robot.current_state(), RobotState::Idle);
//!
//! // Nothing is held, so there is nothing to release.
//! assert!(exec.execute(&mut robot, "release").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use stowbot_kernel::CommandGate;
use stowbot_types::{CommandToken, CompassDirection, Point, RobotState, StowError};
use tracing::{debug, info};

use crate::command_log::CommandLog;
use crate::robot::{ReleaseOutcome, Robot};

// ────────────────────────────────────────────────────────────────────────────
// Command
// ────────────────────────────────────────────────────────────────────────────

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Walk { direction: CompassDirection, steps: u32 },
    Turn(f64),
    Grasp(u32),
    Release,
    Stop,
    Reset,
}

impl Command {
    pub fn token(&self) -> CommandToken {
        match self {
            Command::Walk { .. } => CommandToken::Walk,
            Command::Turn(_) => CommandToken::Turn,
            Command::Grasp(_) => CommandToken::Grasp,
            Command::Release => CommandToken::Release,
            Command::Stop => CommandToken::Stop,
            Command::Reset => CommandToken::Reset,
        }
    }

    /// State the robot is in while the command runs.
    fn phase(&self) -> Option<RobotState> {
        match self {
            Command::Walk { .. } => Some(RobotState::Walking),
            Command::Turn(_) => Some(RobotState::Turning),
            Command::Grasp(_) | Command::Release => Some(RobotState::Grasping),
            Command::Stop | Command::Reset => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Walk { direction, steps } => write!(f, "walk {direction} {steps}"),
            Command::Turn(deg) => write!(f, "turn {deg}"),
            Command::Grasp(id) => write!(f, "grasp {id}"),
            Command::Release => f.write_str("release"),
            Command::Stop => f.write_str("stop"),
            Command::Reset => f.write_str("reset"),
        }
    }
}

fn arg<'a>(parts: &mut impl Iterator<Item = &'a str>, verb: &str, what: &str) -> Result<&'a str, StowError> {
    parts
        .next()
        .ok_or_else(|| StowError::Parse(format!("usage: {verb} needs {what}")))
}

fn number<T: FromStr>(raw: &str, what: &str) -> Result<T, StowError> {
    raw.parse()
        .map_err(|_| StowError::Parse(format!("'{raw}' is not a valid {what}")))
}

impl FromStr for Command {
    type Err = StowError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| StowError::Parse("empty command".to_string()))?
            .to_lowercase();

        let command = match verb.as_str() {
            "walk" => {
                let direction = arg(&mut parts, "walk", "a direction")?.parse()?;
                let steps = number(arg(&mut parts, "walk", "a step count")?, "step count")?;
                Command::Walk { direction, steps }
            }
            "turn" => {
                let deg: f64 = number(arg(&mut parts, "turn", "an angle")?, "angle")?;
                if !deg.is_finite() {
                    return Err(StowError::Parse(format!("'{deg}' is not a valid angle")));
                }
                Command::Turn(deg)
            }
            "grasp" => Command::Grasp(number(arg(&mut parts, "grasp", "an object id")?, "object id")?),
            "release" => Command::Release,
            "stop" => Command::Stop,
            "reset" => Command::Reset,
            other => return Err(StowError::Parse(format!("unknown command '{other}'"))),
        };

        if let Some(extra) = parts.next() {
            return Err(StowError::Parse(format!("unexpected argument '{extra}'")));
        }
        Ok(command)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────────────────

/// Result of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Moved(Point),
    Turned(f64),
    Gripped(u32),
    Released(ReleaseOutcome),
    Stopped,
    Reset { online: bool },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Moved(p) => write!(f, "Moved to {p}"),
            Outcome::Turned(deg) => write!(f, "Now facing {deg:.0} degrees"),
            Outcome::Gripped(id) => write!(f, "Holding object {id}"),
            Outcome::Released(ReleaseOutcome::Stored { id, all_stored: true }) => {
                write!(f, "Object {id} stored. All objects delivered!")
            }
            Outcome::Released(ReleaseOutcome::Stored { id, .. }) => write!(f, "Object {id} stored"),
            Outcome::Released(ReleaseOutcome::Dropped { id, at }) => {
                write!(f, "Object {id} left at {at}")
            }
            Outcome::Stopped => f.write_str("Stopped"),
            Outcome::Reset { online: true } => f.write_str("Reset complete, robot online"),
            Outcome::Reset { online: false } => f.write_str("Reset failed, robot still in Error"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CommandExecutor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CommandExecutor {
    log: CommandLog,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut CommandLog {
        &mut self.log
    }

    /// Parse and run one command line.  Successful commands are recorded in
    /// the history.
    ///
    /// # Errors
    ///
    /// - [`StowError::Parse`] / [`StowError::InvalidDirection`] – malformed
    ///   line.
    /// - [`StowError::NotOperational`], [`StowError::IllegalCommand`],
    ///   [`StowError::SafetyLatched`] – refused before anything ran.
    /// - Any error of the robot's `try_*` operation for the command.
    pub fn execute(&mut self, robot: &mut Robot, line: &str) -> Result<Outcome, StowError> {
        let command: Command = line.parse()?;
        let outcome = self.dispatch(robot, command)?;
        self.log.record(command.to_string());
        info!(%command, %outcome, "command executed");
        Ok(outcome)
    }

    /// Queue `line` for a later [`run_pending`][Self::run_pending].
    pub fn submit(&mut self, line: impl Into<String>) {
        self.log.enqueue(line);
    }

    /// Run every queued command in order.  A failed command does not stop
    /// the rest.
    pub fn run_pending(&mut self, robot: &mut Robot) -> Vec<(String, Result<Outcome, StowError>)> {
        let mut results = Vec::with_capacity(self.log.queue_len());
        while let Some(line) = self.log.next() {
            let result = self.execute(robot, &line);
            results.push((line, result));
        }
        results
    }

    fn dispatch(&mut self, robot: &mut Robot, command: Command) -> Result<Outcome, StowError> {
        if command == Command::Reset {
            return Ok(Outcome::Reset { online: robot.reset() });
        }

        let token = command.token();
        authorize_from(robot, start_state(robot, &command), token)?;

        if let Some(phase) = command.phase() {
            robot.enter_state(phase);
        }
        let result = perform(robot, command);
        robot.enter_state(RobotState::Idle);
        result
    }
}

/// State a command begins in.  Holding an object keeps the gripper engaged,
/// so a release starts in `Grasping`.
fn start_state(robot: &Robot, command: &Command) -> RobotState {
    let current = robot.current_state();
    if *command == Command::Release && robot.held_object().is_some() && current == RobotState::Idle {
        RobotState::Grasping
    } else {
        current
    }
}

fn authorize_from(robot: &Robot, start: RobotState, token: CommandToken) -> Result<(), StowError> {
    if start == robot.current_state() {
        return robot.authorize(token);
    }
    let mut engaged = robot.state_machine().clone();
    engaged.enter(start);
    debug!(state = %start, %token, "checking command in engaged state");
    CommandGate::new(&engaged, robot.safety()).authorize(token)
}

fn perform(robot: &mut Robot, command: Command) -> Result<Outcome, StowError> {
    match command {
        Command::Walk { direction, steps } => robot.try_walk(direction, steps).map(Outcome::Moved),
        Command::Turn(deg) => robot.try_turn(deg).map(Outcome::Turned),
        Command::Grasp(id) => robot.try_grip(id).map(|()| Outcome::Gripped(id)),
        Command::Release => robot.try_release().map(Outcome::Released),
        Command::Stop => robot.stop().map(|()| Outcome::Stopped),
        Command::Reset => Ok(Outcome::Reset { online: robot.reset() }),
    }
}
