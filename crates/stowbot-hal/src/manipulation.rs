//! [`ManipulationLink`] – which object the gripper is holding.
//!
//! The gripper itself only knows open or closed.  The link pairs it with the
//! id of the object inside, and enforces one object at a time.

use tracing::{info, warn};

use crate::gripper::Grippable;

pub struct ManipulationLink {
    gripper: Box<dyn Grippable>,
    held: Option<u32>,
}

impl ManipulationLink {
    pub fn new(gripper: Box<dyn Grippable>) -> Self {
        Self { gripper, held: None }
    }

    /// Close the gripper on `object_id`.
    ///
    /// Succeeds iff nothing is held yet and the gripper accepts.
    pub fn grip(&mut self, object_id: u32) -> bool {
        if let Some(current) = self.held {
            warn!(object_id, current, "grip refused: already holding an object");
            return false;
        }
        match self.gripper.grip() {
            Ok(()) => {
                self.held = Some(object_id);
                info!(object_id, "object gripped");
                true
            }
            Err(e) => {
                warn!(object_id, error = %e, "gripper refused");
                false
            }
        }
    }

    /// Open the gripper.  Returns `false` if nothing is held or the gripper
    /// refuses; the held id is kept in the latter case.
    pub fn release(&mut self) -> bool {
        let Some(object_id) = self.held else {
            return false;
        };
        match self.gripper.release() {
            Ok(()) => {
                self.held = None;
                info!(object_id, "object released");
                true
            }
            Err(e) => {
                warn!(object_id, error = %e, "gripper failed to open");
                false
            }
        }
    }

    pub fn held_object(&self) -> Option<u32> {
        self.held
    }

    pub fn gripper(&self) -> &dyn Grippable {
        self.gripper.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimGripper;
    use stowbot_types::StowError;

    fn link() -> ManipulationLink {
        ManipulationLink::new(SimGripper::new("g"))
    }

    #[test]
    fn grip_then_release() {
        let mut l = link();
        assert!(l.grip(2));
        assert_eq!(l.held_object(), Some(2));
        assert!(l.gripper().is_closed());
        assert!(l.release());
        assert_eq!(l.held_object(), None);
        assert!(!l.gripper().is_closed());
    }

    #[test]
    fn one_object_at_a_time() {
        let mut l = link();
        assert!(l.grip(1));
        assert!(!l.grip(3));
        assert_eq!(l.held_object(), Some(1));
    }

    #[test]
    fn release_with_nothing_held() {
        let mut l = link();
        assert!(!l.release());
    }

    #[test]
    fn gripper_refusal_leaves_hand_empty() {
        struct Jammed;
        impl Grippable for Jammed {
            fn id(&self) -> &str {
                "jammed"
            }
            fn grip(&mut self) -> Result<(), StowError> {
                Err(StowError::HardwareFault {
                    component: "jammed".into(),
                    details: "stuck open".into(),
                })
            }
            fn release(&mut self) -> Result<(), StowError> {
                Ok(())
            }
            fn is_closed(&self) -> bool {
                false
            }
        }

        let mut l = ManipulationLink::new(Box::new(Jammed));
        assert!(!l.grip(1));
        assert_eq!(l.held_object(), None);
    }
}
