//! `stowbot` – operator console for the mobile manipulator.
//!
//! 1. Loads `~/.stowbot/config.toml`, writing the defaults on first run.
//! 2. Brings the robot online on the simulated rig and prints the workspace.
//! 3. Drops the operator into an interactive REPL.
//! 4. Intercepts **Ctrl-C** to latch the emergency stop and exit.

mod config;
mod repl;

use colored::Colorize;
use tracing::{info, warn};

use stowbot_runtime::{LogFormat, Robot, SharedRobot, init_tracing_with};

fn main() {
    let (cfg, notice) = match config::load() {
        Ok((cfg, config::Source::File)) => {
            (cfg, format!("Config loaded from {}", config::config_path().display()))
        }
        Ok((cfg, config::Source::Defaults)) => (cfg, first_run()),
        Err(e) => (config::defaults(), format!("Config error: {e}. Using defaults.")),
    };

    let _guard = init_tracing_with("stowbot", LogFormat::from_env_or(cfg.log_format));

    print_banner();
    println!("  {notice}");

    let mut robot = Robot::simulated(&cfg.workspace);
    if robot.initialise() {
        println!("  {} Robot online at {}", "✓".green().bold(), robot.position());
    } else {
        println!(
            "  {} Initialisation failed; robot is in {}. Try {}.",
            "✗".red().bold(),
            robot.current_state().to_string().red(),
            "reset".bold()
        );
    }
    print_workspace(&robot);

    let robot = SharedRobot::new(robot);

    let estop_handle = robot.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        on_interrupt(&estop_handle);
        std::process::exit(130);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will not latch the emergency stop");
    }

    println!();
    println!("  Type {} for a list of commands.\n", "help".bold().cyan());

    repl::run(repl::Session::new(robot, cfg.workspace.grip_range));
    info!("session ended");
}

/// Latch the emergency stop before the process exits on Ctrl-C.
fn on_interrupt(robot: &SharedRobot) {
    println!();
    println!("{}", "⚠  Ctrl-C received – latching emergency stop …".yellow().bold());
    robot.emergency_stop();
    println!("{}", "  ✓ Emergency stop latched.".green());
    println!("{}", "  ✓ Exiting stowbot.".green());
}

/// Write the default config, without env overrides, and report where it went.
fn first_run() -> String {
    let path = config::config_path();
    match config::save(&config::Config::default()) {
        Ok(()) => format!("No config found; defaults written to {}", path.display()),
        Err(e) => format!("No config found and defaults could not be saved: {e}"),
    }
}

fn print_banner() {
    println!();
    println!("{}", r#"      _                 _           _   "#.bold().cyan());
    println!("{}", r#"  ___| |_ _____      __| |__   ___ | |_ "#.bold().cyan());
    println!("{}", r#" / __| __/ _ \ \ /\ / /| '_ \ / _ \| __|"#.bold().cyan());
    println!("{}", r#" \__ \ || (_) \ V  V / | |_) | (_) | |_ "#.bold().cyan());
    println!("{}", r#" |___/\__\___/ \_/\_/  |_.__/ \___/ \__|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "stowbot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Fetch-and-stow mobile manipulator");
    println!();
}

fn print_workspace(robot: &Robot) {
    let bay = robot.navigation().model().storage_bay();
    println!();
    println!("{}", "  Workspace".bold().underline());
    println!("  Storage bay at {}", bay);
    for obj in robot.workspace_guide() {
        println!(
            "  Object {} at {}: {:.0}cm {}",
            obj.id.to_string().yellow(),
            obj.position,
            obj.distance,
            obj.direction
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowbot_types::WorkspaceConfig;

    #[test]
    fn interrupt_latches_emergency_stop() {
        let mut robot = Robot::simulated(&WorkspaceConfig::default());
        assert!(robot.initialise());
        let shared = SharedRobot::new(robot);

        on_interrupt(&shared);

        assert!(!shared.with(|bot| bot.validate_safety()));
        assert!(!shared.with(|bot| bot.walk("north", 1)));
    }
}
