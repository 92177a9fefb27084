//! `stowbot-runtime` – the assembled robot.
//!
//! Ties the kernel, navigation and hardware layers together behind one
//! facade and drives it from operator commands.
//!
//! # Modules
//!
//! - [`robot`] – [`Robot`][robot::Robot]: owns the safety controller, state
//!   machine, navigation engine and hardware drivers, and exposes the
//!   operations a controller calls (`initialise`, `walk`, `grip`, `release`,
//!   `store_object`, `trigger_emergency_stop`, …).
//! - [`shared`] – [`SharedRobot`][shared::SharedRobot]: an `Arc<Mutex<_>>`
//!   handle that serialises every call, for use from several threads.
//! - [`executor`] – [`CommandExecutor`][executor::CommandExecutor]: parses
//!   command lines, checks them through the
//!   [`CommandGate`][stowbot_kernel::CommandGate], and moves the state
//!   machine through each command's phase.
//! - [`command_log`] – [`CommandLog`][command_log::CommandLog]: pending
//!   command queue and executed-command history.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with an optional OTLP span exporter.

pub mod command_log;
pub mod executor;
pub mod robot;
pub mod shared;
pub mod telemetry;

pub use command_log::{CommandLog, LogEntry};
pub use executor::{Command, CommandExecutor, Outcome};
pub use robot::{ReleaseOutcome, Robot};
pub use shared::SharedRobot;
pub use telemetry::{init_tracing, init_tracing_with, LogFormat, TracerProviderGuard};
