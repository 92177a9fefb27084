//! In-process simulated drivers for running the robot without hardware.
//!
//! [`SimRig`] assembles a [`Rig`] (one sensor, one drive, one gripper) from
//! stub drivers that keep plausible internal state.  Individual drivers can be
//! swapped for custom ones, which is how tests inject faults.
//!
//! # Example
//!
//! ```rust
//! use stowbot_hal::sim::SimRig;
//!
//! let mut rig = SimRig::new().build();
//! let scan = rig.sensor.scan().expect("sim scan must succeed");
//! assert!(scan.path_clear);
//! rig.gripper.grip().expect("sim grip must succeed");
//! assert!(rig.gripper.is_closed());
//! ```

use std::collections::VecDeque;

use stowbot_types::{Point, StowError};
use tracing::debug;

use crate::gripper::Grippable;
use crate::motion::Moveable;
use crate::sensing::{ScanReading, Sensing};

fn fault(component: &str, details: &str) -> StowError {
    StowError::HardwareFault {
        component: component.to_string(),
        details: details.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub sensor
// ────────────────────────────────────────────────────────────────────────────

/// Range reported in every direction by [`SimSensor`], in centimetres.
pub const SIM_RANGE_CM: f64 = 100.0;

/// Number of scans [`SimSensor`] keeps.
pub const SCAN_HISTORY: usize = 10;

/// A simulated sensor reporting a clear path at [`SIM_RANGE_CM`] in every
/// direction.  Keeps the last [`SCAN_HISTORY`] scans.
pub struct SimSensor {
    id: String,
    history: VecDeque<ScanReading>,
}

impl SimSensor {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            history: VecDeque::with_capacity(SCAN_HISTORY),
        })
    }

    /// Recorded scans, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ScanReading> {
        self.history.iter()
    }
}

impl Sensing for SimSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn scan(&mut self) -> Result<ScanReading, StowError> {
        let reading = ScanReading {
            front: SIM_RANGE_CM,
            back: SIM_RANGE_CM,
            left: SIM_RANGE_CM,
            right: SIM_RANGE_CM,
            obstacles: 0,
            path_clear: true,
        };
        if self.history.len() == SCAN_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(reading);
        Ok(reading)
    }

    fn detect(&mut self) -> Result<Vec<Point>, StowError> {
        Ok(Vec::new())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub drive
// ────────────────────────────────────────────────────────────────────────────

/// A simulated drive.  Refuses to start while already moving.
pub struct SimMotion {
    id: String,
    moving: bool,
}

impl SimMotion {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            moving: false,
        })
    }
}

impl Moveable for SimMotion {
    fn id(&self) -> &str {
        &self.id
    }

    fn start(&mut self) -> Result<(), StowError> {
        if self.moving {
            return Err(fault(&self.id, "already moving"));
        }
        self.moving = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StowError> {
        self.moving = false;
        Ok(())
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub gripper
// ────────────────────────────────────────────────────────────────────────────

/// Grip force limit of [`SimGripper`], in newtons.
pub const MAX_GRIP_FORCE: f64 = 100.0;

/// A simulated gripper with grip-force bookkeeping.
///
/// `grip` succeeds only when the jaws are open and the commanded force is
/// below [`MAX_GRIP_FORCE`]; `release` opens the jaws and zeroes the force.
pub struct SimGripper {
    id: String,
    closed: bool,
    force: f64,
}

impl SimGripper {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            closed: false,
            force: 0.0,
        })
    }

    /// Currently commanded grip force in newtons.
    pub fn force(&self) -> f64 {
        self.force
    }

    /// Set the grip force.  Accepts `0 <= force <= MAX_GRIP_FORCE`.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] for out-of-range forces.
    pub fn adjust_grip(&mut self, force: f64) -> Result<(), StowError> {
        if !(0.0..=MAX_GRIP_FORCE).contains(&force) {
            return Err(fault(&self.id, &format!("force {force} N outside [0, {MAX_GRIP_FORCE}]")));
        }
        debug!(gripper = %self.id, force, "grip force adjusted");
        self.force = force;
        Ok(())
    }
}

impl Grippable for SimGripper {
    fn id(&self) -> &str {
        &self.id
    }

    fn grip(&mut self) -> Result<(), StowError> {
        if self.closed {
            return Err(fault(&self.id, "already closed"));
        }
        if self.force >= MAX_GRIP_FORCE {
            return Err(fault(&self.id, "force limit reached"));
        }
        self.closed = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), StowError> {
        if !self.closed {
            return Err(fault(&self.id, "already open"));
        }
        self.closed = false;
        self.force = 0.0;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rig
// ────────────────────────────────────────────────────────────────────────────

/// One driver for each capability, ready to hand to the robot.
pub struct Rig {
    pub sensor: Box<dyn Sensing>,
    pub motion: Box<dyn Moveable>,
    pub gripper: Box<dyn Grippable>,
}

impl Default for Rig {
    fn default() -> Self {
        SimRig::new().build()
    }
}

/// Builder for a [`Rig`] made of simulated drivers.
///
/// Every slot starts with its `Sim*` driver; the `with_*` methods replace a
/// slot with a custom driver.
pub struct SimRig {
    sensor: Box<dyn Sensing>,
    motion: Box<dyn Moveable>,
    gripper: Box<dyn Grippable>,
}

impl Default for SimRig {
    fn default() -> Self {
        Self {
            sensor: SimSensor::new("front_sensor"),
            motion: SimMotion::new("drive_base"),
            gripper: SimGripper::new("gripper"),
        }
    }
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, sensor: Box<dyn Sensing>) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_motion(mut self, motion: Box<dyn Moveable>) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_gripper(mut self, gripper: Box<dyn Grippable>) -> Self {
        self.gripper = gripper;
        self
    }

    pub fn build(self) -> Rig {
        Rig {
            sensor: self.sensor,
            motion: self.motion,
            gripper: self.gripper,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
