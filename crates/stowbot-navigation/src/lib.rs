//! `stowbot-navigation` – spatial awareness layer.
//!
//! Tracks where the robot is, where the workspace objects are, and which
//! moves are legal.
//!
//! # Modules
//!
//! - [`direction`] – pure direction and distance maths: facing-relative
//!   labels, eight-way compass labels, per-step deltas.
//! - [`spatial`] – [`SpatialModel`][spatial::SpatialModel]: owns the robot's
//!   position and facing, the room bounds, the workspace objects and the
//!   storage bay.
//! - [`engine`] – [`NavigationEngine`][engine::NavigationEngine]: answers
//!   queries over the model (nearby objects, step counts, storage-bay
//!   distance) and applies moves that pass the movement-legality rules.

pub mod direction;
pub mod engine;
pub mod spatial;

pub use engine::{LocationSummary, NavigationEngine, NearbyObject, WallDistances, DEFAULT_SCAN_RADIUS};
pub use spatial::{SpatialModel, WorkspaceObject};
