use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A 2-D workspace coordinate in centimetres.
///
/// `(0, 0)` is the room's bottom-left corner; `x` grows to the east and `y`
/// grows to the north.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Return a new point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0})", self.x, self.y)
    }
}

/// A 3-D point checked against the safety envelope.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One of the eight absolute-frame direction labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompassDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::NorthEast,
        CompassDirection::East,
        CompassDirection::SouthEast,
        CompassDirection::South,
        CompassDirection::SouthWest,
        CompassDirection::West,
        CompassDirection::NorthWest,
    ];

    /// The hyphenated label, e.g. `"north-east"`.
    pub fn label(self) -> &'static str {
        match self {
            CompassDirection::North => "north",
            CompassDirection::NorthEast => "north-east",
            CompassDirection::East => "east",
            CompassDirection::SouthEast => "south-east",
            CompassDirection::South => "south",
            CompassDirection::SouthWest => "south-west",
            CompassDirection::West => "west",
            CompassDirection::NorthWest => "north-west",
        }
    }

    /// `true` for the four two-token labels.
    pub fn is_diagonal(self) -> bool {
        self.label().contains('-')
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CompassDirection {
    type Err = StowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == wanted)
            .ok_or_else(|| StowError::InvalidDirection(s.to_string()))
    }
}

/// Facing-relative direction of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeDirection {
    Ahead,
    Right,
    Behind,
    Left,
}

impl fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelativeDirection::Ahead => "ahead",
            RelativeDirection::Right => "to your right",
            RelativeDirection::Behind => "behind you",
            RelativeDirection::Left => "to your left",
        })
    }
}

/// Discrete operational state of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RobotState {
    #[default]
    Idle,
    Walking,
    Turning,
    Grasping,
    Error,
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RobotState::Idle => "Idle",
            RobotState::Walking => "Walking",
            RobotState::Turning => "Turning",
            RobotState::Grasping => "Grasping",
            RobotState::Error => "Error",
        })
    }
}

/// Command tokens understood by the state machine's legality table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandToken {
    Walk,
    Turn,
    Grasp,
    Stop,
    Release,
    Reset,
}

impl CommandToken {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandToken::Walk => "walk",
            CommandToken::Turn => "turn",
            CommandToken::Grasp => "grasp",
            CommandToken::Stop => "stop",
            CommandToken::Release => "release",
            CommandToken::Reset => "reset",
        }
    }

    /// Tokens that physically move the robot and so require a clear safety
    /// latch in addition to state legality.
    pub fn is_motion(self) -> bool {
        matches!(self, CommandToken::Walk | CommandToken::Turn)
    }
}

impl fmt::Display for CommandToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandToken {
    type Err = StowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(CommandToken::Walk),
            "turn" => Ok(CommandToken::Turn),
            "grasp" => Ok(CommandToken::Grasp),
            "stop" => Ok(CommandToken::Stop),
            "release" => Ok(CommandToken::Release),
            "reset" => Ok(CommandToken::Reset),
            other => Err(StowError::Parse(format!("unknown command token '{other}'"))),
        }
    }
}

/// Which condition forbids moving away from the storage bay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryRule {
    /// Every move must not increase the distance to the bay while any object
    /// is still unstored.
    #[default]
    AnyUnstored,
    /// The approach constraint only applies while an object is held.
    Holding,
}

impl FromStr for CarryRule {
    type Err = StowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "any_unstored" => Ok(CarryRule::AnyUnstored),
            "holding" => Ok(CarryRule::Holding),
            other => Err(StowError::Parse(format!("unknown carry rule '{other}'"))),
        }
    }
}

/// Initial placement of one workspace object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSeed {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

/// Static description of the room, the storage bay, and the robot body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_room_extent")]
    pub room_width: f64,
    #[serde(default = "default_room_extent")]
    pub room_length: f64,
    #[serde(default = "default_room_extent")]
    pub room_height: f64,
    #[serde(default = "default_storage_coord")]
    pub storage_x: f64,
    #[serde(default = "default_storage_coord")]
    pub storage_y: f64,
    /// Capture radius of the storage bay.
    #[serde(default = "default_storage_range")]
    pub storage_range: f64,
    /// Clearance kept between the robot's side and every wall.
    #[serde(default = "default_safe_distance")]
    pub safe_distance: f64,
    /// Length of one cardinal walking step.
    #[serde(default = "default_step_cm")]
    pub step_cm: f64,
    /// Radius inside which an object can be gripped.
    #[serde(default = "default_grip_range")]
    pub grip_range: f64,
    #[serde(default)]
    pub carry_rule: CarryRule,
    /// Body width; half of it counts toward the envelope margin.
    #[serde(default = "default_robot_width")]
    pub robot_width: f64,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectSeed>,
}

fn default_room_extent() -> f64 {
    1000.0
}
fn default_storage_coord() -> f64 {
    800.0
}
fn default_storage_range() -> f64 {
    50.0
}
fn default_safe_distance() -> f64 {
    70.0
}
fn default_step_cm() -> f64 {
    10.0
}
fn default_grip_range() -> f64 {
    100.0
}
fn default_robot_width() -> f64 {
    60.0
}
fn default_objects() -> Vec<ObjectSeed> {
    vec![
        ObjectSeed { id: 1, x: 300.0, y: 300.0 },
        ObjectSeed { id: 2, x: 700.0, y: 700.0 },
        ObjectSeed { id: 3, x: 300.0, y: 700.0 },
    ]
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            room_width: default_room_extent(),
            room_length: default_room_extent(),
            room_height: default_room_extent(),
            storage_x: default_storage_coord(),
            storage_y: default_storage_coord(),
            storage_range: default_storage_range(),
            safe_distance: default_safe_distance(),
            step_cm: default_step_cm(),
            grip_range: default_grip_range(),
            carry_rule: CarryRule::default(),
            robot_width: default_robot_width(),
            objects: default_objects(),
        }
    }
}

impl WorkspaceConfig {
    /// Distance the safety envelope keeps from every face of the room:
    /// half the robot's width plus `safe_distance`.
    pub fn envelope_margin(&self) -> f64 {
        self.robot_width / 2.0 + self.safe_distance
    }

    pub fn storage_bay(&self) -> Point {
        Point::new(self.storage_x, self.storage_y)
    }

    pub fn centre(&self) -> Point {
        Point::new(self.room_width / 2.0, self.room_length / 2.0)
    }
}

/// A safety-relevant occurrence handed to an observability sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl SafetyEvent {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            description: description.into(),
        }
    }
}

/// Error type shared by every stowbot crate.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StowError {
    #[error("invalid direction label '{0}'")]
    InvalidDirection(String),

    #[error("unknown object {0}")]
    UnknownObject(u32),

    #[error("object {0} is not within reach")]
    OutOfReach(u32),

    #[error("no object is being held")]
    NotHolding,

    #[error("turn of {0} degrees is outside [-180, 180]")]
    AngleOutOfRange(f64),

    #[error("command '{token}' is not allowed in state {state}")]
    IllegalCommand { state: RobotState, token: String },

    #[error("robot is not operational")]
    NotOperational,

    #[error("emergency stop is latched")]
    SafetyLatched,

    #[error("movement to ({x:.1}, {y:.1}) rejected")]
    MovementRejected { x: f64, y: f64 },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("parse error: {0}")]
    Parse(String),
}
