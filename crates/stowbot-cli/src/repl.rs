//! REPL – interactive operator shell.
//!
//! Robot commands (`walk`, `turn`, `grasp`, `release`, `stop`, `reset`) go
//! through the [`CommandExecutor`]; the rest are read-only queries or shell
//! housekeeping.

use colored::Colorize;
use std::io::{self, BufRead, Write};

use stowbot_runtime::{CommandExecutor, SharedRobot};

/// Interactive session state.
pub struct Session {
    robot: SharedRobot,
    executor: CommandExecutor,
    grip_range: f64,
}

impl Session {
    pub fn new(robot: SharedRobot, grip_range: f64) -> Self {
        Self {
            robot,
            executor: CommandExecutor::new(),
            grip_range,
        }
    }
}

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Entry point for the interactive REPL.  Returns on `quit`, `exit` or EOF.
pub fn run(mut session: Session) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "stowbot>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        if handle_line(&mut session, line.trim()) == Flow::Quit {
            println!("{}", "Goodbye.".green());
            break;
        }
    }
}

fn handle_line(session: &mut Session, line: &str) -> Flow {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Flow::Continue;
    };
    let arg = words.next();

    match verb.to_lowercase().as_str() {
        "walk" | "turn" | "grasp" | "release" | "stop" | "reset" => cmd_robot(session, line),
        "status" => cmd_status(session),
        "where" => cmd_where(session),
        "nearby" => cmd_nearby(session, arg),
        "steps" => cmd_steps(session, arg),
        "storage" => cmd_storage(session),
        "objects" => cmd_objects(session),
        "history" => cmd_history(session),
        "undo" => cmd_undo(session),
        "estop" => cmd_estop(session),
        "help" => cmd_help(),
        "quit" | "exit" => return Flow::Quit,
        other => {
            println!(
                "{} '{}'. Type {} for available commands.",
                "Unknown command:".red(),
                other.yellow(),
                "help".bold()
            );
        }
    }
    Flow::Continue
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Robot commands".bold().underline());
    println!("  {}  – walk N steps (north, north-east, …)", "walk <direction> <steps>".bold().cyan());
    println!("  {}              – turn by -180..180 degrees", "turn <degrees>".bold().cyan());
    println!("  {}                   – grip a nearby object", "grasp <id>".bold().cyan());
    println!("  {}                      – let go of the held object", "release".bold().cyan());
    println!("  {}                         – halt an in-progress motion", "stop".bold().cyan());
    println!("  {}                        – re-run initialisation", "reset".bold().cyan());
    println!("{}", "Queries".bold().underline());
    println!("  {}  – state, position, held object", "status".bold().cyan());
    println!("  {}   – walls and nearby objects", "where".bold().cyan());
    println!("  {}  – unstored objects within a radius", "nearby [radius]".bold().cyan());
    println!("  {}  – route to an object", "steps <id>".bold().cyan());
    println!("  {}  – route to the storage bay", "storage".bold().cyan());
    println!("  {}  – every object and where it is", "objects".bold().cyan());
    println!("{}", "Shell".bold().underline());
    println!("  {}  – executed commands", "history".bold().cyan());
    println!("  {}  – forget the last executed command", "undo".bold().cyan());
    println!("  {}  – latch the emergency stop", "estop".bold().cyan());
    println!("  {}  – exit", "quit  exit".bold().cyan());
    println!();
}

fn cmd_robot(session: &mut Session, line: &str) {
    let Session { robot, executor, .. } = session;
    match robot.with(|bot| executor.execute(bot, line)) {
        Ok(outcome) => println!("  {} {}", "✓".green().bold(), outcome),
        Err(e) => println!("  {} {}", "✗".red().bold(), e),
    }
}

fn cmd_status(session: &Session) {
    session.robot.with(|bot| {
        let state = bot.current_state().to_string();
        println!("  State       : {}", if bot.is_operational() { state.green() } else { state.red() });
        println!(
            "  Safety      : {}",
            if bot.validate_safety() { "ok".green() } else { "EMERGENCY STOP".red().bold() }
        );
        println!("  Position    : {}", bot.position());
        println!("  Facing      : {:.0} degrees", bot.facing_angle());
        match bot.held_object() {
            Some(id) => println!("  Holding     : object {}", id.to_string().yellow()),
            None => println!("  Holding     : {}", "nothing".dimmed()),
        }
        println!("  Unstored    : {}", bot.available_objects().len());
    });
}

fn cmd_where(session: &Session) {
    let summary = session.robot.with(|bot| bot.location_summary());
    for line in summary.to_string().lines() {
        println!("  {line}");
    }
}

fn cmd_nearby(session: &Session, arg: Option<&str>) {
    let radius = match arg.map(str::parse::<f64>) {
        None => session.grip_range,
        Some(Ok(r)) if r >= 0.0 => r,
        Some(_) => {
            println!("{}", "Radius must be a non-negative number.".red());
            return;
        }
    };
    let nearby = session.robot.with(|bot| bot.nearby_objects(radius));
    if nearby.is_empty() {
        println!("  No unstored objects within {radius:.0}cm.");
        return;
    }
    for (id, distance) in nearby {
        println!("  Object {}: {:.0}cm", id.to_string().yellow(), distance);
    }
}

fn cmd_steps(session: &Session, arg: Option<&str>) {
    let Some(id) = arg.and_then(|a| a.parse::<u32>().ok()) else {
        println!("{}", "Usage: steps <id>".red());
        return;
    };
    match session.robot.with(|bot| bot.steps_to(id)) {
        Some((direction, steps)) => println!("  Object {id}: walk {direction} {steps}"),
        None => println!("  {} {}", "Unknown object".red(), id),
    }
}

fn cmd_storage(session: &Session) {
    let (route, at_bay) = session
        .robot
        .with(|bot| (bot.steps_to_storage(), bot.is_at_storage_bay(bot.position())));
    if at_bay {
        println!("  {}", "Inside the storage bay.".green());
    }
    println!("  Storage bay: walk {} {}", route.0, route.1);
}

fn cmd_objects(session: &Session) {
    let (guide, unstored) = session
        .robot
        .with(|bot| (bot.workspace_guide(), bot.available_objects()));
    for obj in guide {
        let status = if unstored.contains_key(&obj.id) {
            format!("{:.0}cm {}", obj.distance, obj.direction).normal()
        } else {
            "stored".green()
        };
        println!("  Object {} at {}: {}", obj.id.to_string().yellow(), obj.position, status);
    }
}

fn cmd_history(session: &Session) {
    let history = session.executor.log().history();
    if history.is_empty() {
        println!("  {}", "No commands executed yet.".dimmed());
        return;
    }
    for (i, entry) in history.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            i + 1,
            entry.issued_at.format("%H:%M:%S").to_string().dimmed(),
            entry.command
        );
    }
}

fn cmd_undo(session: &mut Session) {
    match session.executor.log_mut().undo_last() {
        Some(entry) => println!(
            "  Removed '{}' from history. The robot was not moved.",
            entry.command
        ),
        None => println!("  {}", "History is empty.".dimmed()),
    }
}

fn cmd_estop(session: &Session) {
    session.robot.emergency_stop();
    println!("{}", "  ⚠  Emergency stop latched. Motion is disabled for this session.".red().bold());
}
