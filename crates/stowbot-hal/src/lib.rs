//! `stowbot-hal` – hardware abstraction layer.
//!
//! The robot talks to its hardware only through three capability traits:
//!
//! - [`Sensing`][sensing::Sensing] – environment scans and detections.
//! - [`Moveable`][motion::Moveable] – start and stop the drive.
//! - [`Grippable`][gripper::Grippable] – close and open the gripper.
//!
//! [`sim`] provides in-process drivers for all three plus the
//! [`SimRig`][sim::SimRig] builder, so the full stack runs without physical
//! hardware.  [`ManipulationLink`][manipulation::ManipulationLink] sits on top
//! of a gripper and remembers which object is held.

pub mod gripper;
pub mod manipulation;
pub mod motion;
pub mod sensing;
pub mod sim;

pub use gripper::Grippable;
pub use manipulation::ManipulationLink;
pub use motion::Moveable;
pub use sensing::{ScanReading, Sensing};
pub use sim::{Rig, SimGripper, SimMotion, SimRig, SimSensor};
