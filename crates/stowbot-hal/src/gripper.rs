//! Generic `Grippable` trait for end-effector grippers.

use stowbot_types::StowError;

/// A gripper that can close on an object and open again.
pub trait Grippable: Send + Sync {
    fn id(&self) -> &str;

    /// Close the gripper.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if the gripper refuses, for
    /// example because it is already closed or its force limit is reached.
    fn grip(&mut self) -> Result<(), StowError>;

    /// Open the gripper.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::HardwareFault`] if the gripper is already open.
    fn release(&mut self) -> Result<(), StowError>;

    /// `true` while the gripper is closed.
    fn is_closed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gripper with no failure modes.
    #[derive(Default)]
    struct Pincer {
        closed: bool,
    }

    impl Grippable for Pincer {
        fn id(&self) -> &str {
            "pincer"
        }

        fn grip(&mut self) -> Result<(), StowError> {
            self.closed = true;
            Ok(())
        }

        fn release(&mut self) -> Result<(), StowError> {
            self.closed = false;
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    #[test]
    fn boxed_gripper_toggles() {
        let mut g: Box<dyn Grippable> = Box::<Pincer>::default();
        assert!(!g.is_closed());
        g.grip().unwrap();
        assert!(g.is_closed());
        g.release().unwrap();
        assert!(!g.is_closed());
        assert_eq!(g.id(), "pincer");
    }
}
