//! Generic `Moveable` trait for the robot's drive.

use stowbot_types::StowError;

/// A drive that can be started and stopped.
///
/// Position bookkeeping is not the drive's job; the navigation layer decides
/// where the robot ends up.  The drive only has to accept or refuse motion.
pub trait Moveable: Send + Sync {
    fn id(&self) -> &str;

    /// Begin a motion.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if the drive refuses to start,
    /// e.g. because it is already moving.
    fn start(&mut self) -> Result<(), StowError>;

    /// Halt any motion.  Stopping an idle drive is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if the drive cannot be halted.
    fn stop(&mut self) -> Result<(), StowError>;

    fn is_moving(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingDrive {
        starts: u32,
        moving: bool,
    }

    impl Moveable for CountingDrive {
        fn id(&self) -> &str {
            "counting"
        }

        fn start(&mut self) -> Result<(), StowError> {
            self.starts += 1;
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

    #[test]
    fn start_stop_cycle() {
        let mut drive = CountingDrive::default();
        drive.start().unwrap();
        assert!(drive.is_moving());
        drive.stop().unwrap();
        assert!(!drive.is_moving());
        assert_eq!(drive.starts, 1);
    }
}
