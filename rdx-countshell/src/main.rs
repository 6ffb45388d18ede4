use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use countdown::prelude::*;
use countdown::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", "-".repeat(64).as_str().dimmed());
    println!("  {}", ENGINE_NAME.cyan().bold());
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    let license_blurb = "
    This software is provided 'as is', without warranty of any kind.
    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.
    ";
    println!("{}", license_blurb.dimmed());
    println!("{}", "-".repeat(64).as_str().dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  set <H> <M> <S>       - Picks the countdown duration.");
    println!("  start [MILLIS]        - Starts the picked duration, or MILLIS if given.");
    println!("  pause                 - Freezes the running countdown.");
    println!("  resume                - Continues a paused countdown.");
    println!("  cancel                - Stops the countdown and resets it.");
    println!("  toggle                - Presses the primary button (start/pause/resume).");
    println!("  status                - Shows the current state and controls.");
    println!("  watch on|off          - Prints the display whenever a digit changes.");
    println!("  exit                  - Quits the shell.");
}

/// Spawns tasks that print the engine's transition stream.
fn spawn_event_listeners(engine: &CountdownEngine) {
    let mut event_rx = engine.subscribe_events();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(CountdownEvent::Tick { .. }) | Err(RecvError::Lagged(_)) => {}
                Ok(CountdownEvent::Completed { .. }) => {
                    println!(
                        "\n<-- [{}] {}\n>> ",
                        Local::now().format("%H:%M:%S"),
                        "Countdown complete!".green().bold()
                    );
                }
                Ok(event) => {
                    println!("<-- [{}] {:?}", Local::now().format("%H:%M:%S"), event);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Registers the renderer listener, gated by the shared `watch` flag.
async fn register_renderer(engine: &CountdownEngine, is_watching: Arc<AtomicBool>) {
    let mut last_shown = None;
    engine
        .subscribe(move |snapshot| {
            if !is_watching.load(Ordering::Relaxed) {
                return;
            }
            let digits = DigitDisplay::from(snapshot);
            if last_shown != Some(digits) {
                last_shown = Some(digits);
                let angle = sweep_angle(snapshot.remaining_millis, snapshot.elapsed_time);
                println!(
                    "<-- [DISPLAY] {} {:>8} {}",
                    digits.to_string().as_str().cyan().bold(),
                    snapshot.status,
                    format!("{:5.1} deg", angle).as_str().dimmed()
                );
            }
        })
        .await;
}

async fn print_status(engine: &CountdownEngine) {
    let snapshot = engine.snapshot().await;
    let time = engine.time_spec().await;
    let controls = Controls::for_snapshot(&snapshot);
    println!("Status:    {}", snapshot.status.to_string().as_str().bold());
    let picker = TimeField::ALL
        .iter()
        .map(|field| format!("{}={:02}", field.label(), time.get(*field)))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "Picked:    {} ({}ms){}",
        picker,
        snapshot.elapsed_time,
        if controls.picker_enabled { "" } else { " (locked)" }
    );
    println!(
        "Remaining: {} ({}ms)",
        DigitDisplay::from(&snapshot),
        snapshot.remaining_millis
    );
    println!(
        "Controls:  [{}]{} [Cancel]{}",
        controls.primary,
        if controls.primary_enabled { "" } else { " (disabled)" },
        if controls.cancel_enabled { "" } else { " (disabled)" },
    );
}

/// Parses exactly three `H M S` tokens. Any malformed token rejects the line.
fn parse_duration_args(args: &[&str]) -> Option<[u32; 3]> {
    let fields = args
        .iter()
        .map(|arg| arg.parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    fields.try_into().ok()
}

fn report(outcome: Option<CountdownEvent>, intent: &str) {
    if outcome.is_none() {
        println!("--> '{}' has no effect right now. Type 'status'.", intent);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = CountdownConfig::load(config_path.as_deref())?;
    let engine = CountdownEngine::new(config);

    // Create the shared flag for the display listener.
    let is_watching = Arc::new(AtomicBool::new(true));
    spawn_event_listeners(&engine);
    register_renderer(&engine, is_watching.clone()).await;
    info!(resolution = ?engine.config().resolution, "{} ready", ENGINE_NAME);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("{} is ready. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting countshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();

        let Some(command) = args.first() else {
            continue;
        };
        match *command {
            "set" => {
                if let Some([hour, minute, second]) = parse_duration_args(&args[1..]) {
                    if engine.set_duration(hour, minute, second).await.is_some() {
                        let duration = engine.elapsed_time().await;
                        println!("--> Duration set to {}", DigitDisplay::from_millis(duration));
                    } else {
                        println!("--> The picker is locked until the countdown is idle.");
                    }
                } else {
                    println!("Usage: set <H> <M> <S>");
                }
            }
            "start" => match args.get(1) {
                Some(millis_str) => match millis_str.parse::<u64>() {
                    Ok(millis) => report(engine.start_with(millis).await, "start"),
                    Err(_) => println!("Error: '{}' is not a valid number of milliseconds.", millis_str),
                },
                None => report(engine.start().await, "start"),
            },
            "pause" => report(engine.pause().await, "pause"),
            "resume" => report(engine.resume().await, "resume"),
            "cancel" => report(engine.cancel().await, "cancel"),
            "toggle" => report(engine.toggle().await, "toggle"),
            "status" => print_status(&engine).await,
            "watch" => match args.get(1) {
                Some(&"on") => {
                    is_watching.store(true, Ordering::Relaxed);
                    println!("--> Display updates on.");
                }
                Some(&"off") => {
                    is_watching.store(false, Ordering::Relaxed);
                    println!("--> Display updates off.");
                }
                _ => println!("Usage: watch on|off"),
            },
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line.trim()),
        }
    }

    engine.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_args_need_three_numbers() {
        assert_eq!(parse_duration_args(&["1", "2", "3"]), Some([1, 2, 3]));
        assert_eq!(parse_duration_args(&["0", "0"]), None);
        assert_eq!(parse_duration_args(&["1", "2", "3", "4"]), None);
    }

    #[test]
    fn malformed_duration_token_rejects_the_line() {
        assert_eq!(parse_duration_args(&["1", "x", "2", "3"]), None);
        assert_eq!(parse_duration_args(&["1", "-2", "3"]), None);
    }
}
