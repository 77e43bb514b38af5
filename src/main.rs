//! Sayit - read text aloud from the terminal
//!
//! A line-oriented host shell: each input line is a command id, or
//! `say <text>` to speak some text.

use anyhow::Result;
use clap::Parser;
use sayit::commands::{CommandId, SayPlugin};
use sayit::config::JsonSettingsStore;
use sayit::host::TerminalHost;
use sayit::selection::TerminalPrompt;
use sayit::tts::{self, system::SystemEngine};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// TTS engine: system (speech-dispatcher) or espeak
    #[arg(short, long, default_value = "system")]
    engine: String,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seconds between checks for installed/removed voices
    #[arg(long, default_value_t = 5)]
    voice_poll: u64,
}

/// One parsed line of shell input
#[derive(Debug, PartialEq)]
enum ShellInput {
    Empty,
    Help,
    Quit,
    /// Replace the current selection
    Select(String),
    /// Run a command, optionally selecting text first
    Run(CommandId, Option<String>),
    Unknown(String),
}

fn parse_line(line: &str) -> ShellInput {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, Some(rest.trim().to_string())),
        None => (line, None),
    };

    match word {
        "" => ShellInput::Empty,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        "select" => ShellInput::Select(rest.unwrap_or_default()),
        "say" => ShellInput::Run(CommandId::Say, rest),
        _ => match word.parse::<CommandId>() {
            Ok(command) if rest.is_none() => ShellInput::Run(command, None),
            _ => ShellInput::Unknown(line.to_string()),
        },
    }
}

fn print_help(plugin: &SayPlugin) {
    println!("Commands:");
    for command in plugin.commands() {
        println!("  {:<32} {}", command.id(), command.name());
    }
    println!("  {:<32} Speak the given text", "say <text>");
    println!("  {:<32} Set the selected text", "select <text>");
    println!("  {:<32} Leave", "quit");
}

enum ShellEvent {
    VoicesChanged(Option<Vec<sayit::voices::Voice>>),
    Line(Option<String>),
}

async fn next_line(lines: &Mutex<mpsc::Receiver<String>>) -> Option<String> {
    lines.lock().await.recv().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging; stdout belongs to the prompts
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("🔊 Sayit v{} starting...", env!("CARGO_PKG_VERSION"));

    // Stdin is read on its own thread; the shell loop and the prompts share the receiver
    let (tx, rx) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    let lines = Arc::new(Mutex::new(rx));

    let engine = match tts::create_engine(&args.engine).await {
        Ok(engine) => engine,
        Err(e) => {
            warn!("⚠️ Could not start '{}' engine, using system: {}", args.engine, e);
            Arc::new(SystemEngine::new())
        }
    };
    let settings = args
        .settings
        .map(JsonSettingsStore::new)
        .unwrap_or_default();
    info!("📁 Preferences at {}", settings.path().display());

    let host = Arc::new(TerminalHost::new());
    let prompt = Arc::new(TerminalPrompt::new(lines.clone()));
    let mut plugin = SayPlugin::new(engine, prompt, host.clone(), Box::new(settings))
        .with_voice_poll(Duration::from_secs(args.voice_poll.max(1)));

    plugin.load().await;
    print_help(&plugin);

    loop {
        let event = tokio::select! {
            changed = plugin.next_voices_change() => ShellEvent::VoicesChanged(changed),
            line = next_line(&lines) => ShellEvent::Line(line),
        };

        let line = match event {
            ShellEvent::VoicesChanged(Some(voices)) => {
                plugin.on_voices_changed(voices);
                continue;
            }
            ShellEvent::VoicesChanged(None) => continue,
            ShellEvent::Line(None) => break,
            ShellEvent::Line(Some(line)) => line,
        };

        match parse_line(&line) {
            ShellInput::Empty => {}
            ShellInput::Help => print_help(&plugin),
            ShellInput::Quit => break,
            ShellInput::Select(text) => host.set_selection(&text),
            ShellInput::Run(command, text) => {
                if let Some(text) = text {
                    host.set_selection(&text);
                }
                if let Err(e) = plugin.run(command).await {
                    warn!("⚠️ '{}' failed: {}", command, e);
                }
            }
            ShellInput::Unknown(input) => println!("Unknown command '{}', try 'help'", input),
        }
    }

    plugin.unload().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), ShellInput::Empty);
        assert_eq!(parse_line("quit"), ShellInput::Quit);
        assert_eq!(
            parse_line("say  hello there "),
            ShellInput::Run(CommandId::Say, Some("hello there".to_string()))
        );
        assert_eq!(parse_line("say"), ShellInput::Run(CommandId::Say, None));
        assert_eq!(
            parse_line("select-pitch"),
            ShellInput::Run(CommandId::SelectPitch, None)
        );
        assert_eq!(
            parse_line("select some words"),
            ShellInput::Select("some words".to_string())
        );
        assert!(matches!(parse_line("select-pitch now"), ShellInput::Unknown(_)));
        assert!(matches!(parse_line("sing"), ShellInput::Unknown(_)));
    }
}
