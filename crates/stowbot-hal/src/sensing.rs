//! Generic `Sensing` trait for range sensors and object detectors.
//!
//! Drivers implement this trait and are handed to the robot at construction.
//! Nothing above the HAL reads a sensor directly, so a simulated sensor and a
//! real one are interchangeable.

use stowbot_types::{Point, StowError};

/// One range scan around the robot, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanReading {
    pub front: f64,
    pub back: f64,
    pub left: f64,
    pub right: f64,
    pub obstacles: usize,
    pub path_clear: bool,
}

/// An environment sensor.
pub trait Sensing: Send + Sync {
    /// Stable identifier, e.g. `"front_lidar"`.
    fn id(&self) -> &str;

    /// Take one range scan.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if the sensor cannot be read.
    fn scan(&mut self) -> Result<ScanReading, StowError>;

    /// Positions of objects the sensor can currently see.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if detection fails.
    fn detect(&mut self) -> Result<Vec<Point>, StowError>;
}
