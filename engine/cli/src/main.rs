//! Lites - Line-Oriented Messenger Surface
//!
//! A headless surface for the Lites session core. Reads commands and
//! messages from stdin, forwards them as intents, and prints every
//! projection the session publishes to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Interactive
//! lites
//!
//! # Faster pipeline for a demo
//! lites --delivered-ms 100 --typing-ms 200 --reply-ms 600
//!
//! # Scripted, JSON output, wait for the last reply before exiting
//! printf '/register\n/phone +79991234567\n/avatar 1\n/profile Anna @anna\n/open 1\nhello\n' \
//!     | lites --json --linger-ms 3500
//!
//! # Verbose logging
//! RUST_LOG=debug lites
//! ```

mod commands;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use lites_core::{
    load_config, load_config_from_path, ConfigOverrides, ContactDirectory, InMemoryDirectory,
    Session, SessionConfig, SessionMessage, SessionRuntime, DEFAULT_INTENT_BUFFER,
};

use commands::{parse_line, Command, HELP};

/// Lites - headless messenger prototype
#[derive(Parser, Debug)]
#[command(name = "lites")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "LITES_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LITES_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Delay before a sent message is marked delivered
    #[arg(long, value_name = "MS")]
    delivered_ms: Option<u64>,

    /// Delay before the peer starts typing
    #[arg(long, value_name = "MS")]
    typing_ms: Option<u64>,

    /// Delay before the peer reply arrives
    #[arg(long, value_name = "MS")]
    reply_ms: Option<u64>,

    /// Text of the simulated reply
    #[arg(long, value_name = "TEXT")]
    reply_text: Option<String>,

    /// Print session messages as JSON lines
    #[arg(long)]
    json: bool,

    /// Keep printing for this long after stdin closes
    #[arg(long, value_name = "MS", default_value_t = 0)]
    linger_ms: u64,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ms) = self.delivered_ms {
            overrides = overrides.with_delivered_ms(ms);
        }
        if let Some(ms) = self.typing_ms {
            overrides = overrides.with_typing_ms(ms);
        }
        if let Some(ms) = self.reply_ms {
            overrides = overrides.with_reply_ms(ms);
        }
        if let Some(ref text) = self.reply_text {
            overrides = overrides.with_reply_text(text.clone());
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lites_cli={level},lites_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Resolve configuration: file and environment, then CLI flags on top
fn resolve_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    args.overrides().apply(&mut config);
    config
        .validate()
        .context("Invalid command-line overrides")?;
    Ok(config)
}

fn print(msg: &SessionMessage, json: bool) -> Result<()> {
    if json {
        println!("{}", msg.to_json().context("Failed to serialize message")?);
    } else {
        println!("{}", render::render(msg));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    let config = resolve_config(&args)?;
    info!(
        source = %config.source(),
        delivered_ms = config.timings.delivered_ms,
        typing_ms = config.timings.typing_ms,
        reply_ms = config.timings.reply_ms,
        "Configuration resolved"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = Session::new(config, tx);
    let (runtime, handle) = SessionRuntime::new(session, DEFAULT_INTENT_BUFFER);
    let runtime_task = tokio::spawn(runtime.run());

    let directory = InMemoryDirectory::with_sample_contacts();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                print(&msg, args.json)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                match parse_line(&line, &directory) {
                    Ok(None) => {}
                    Ok(Some(Command::Intent(intent))) => {
                        handle.send(intent).await.context("Session runtime stopped")?;
                    }
                    Ok(Some(Command::Contacts)) => {
                        println!("{}", render::render_contacts(directory.contacts()));
                    }
                    Ok(Some(Command::Avatars)) => println!("{}", render::render_palette()),
                    Ok(Some(Command::Help)) => println!("{HELP}"),
                    Ok(Some(Command::Quit)) => break,
                    Err(e) => {
                        warn!(error = %e, "Bad input line");
                        eprintln!("{e:#}");
                    }
                }
            }
        }
    }

    if args.linger_ms > 0 {
        let linger = tokio::time::sleep(Duration::from_millis(args.linger_ms));
        tokio::pin!(linger);
        loop {
            tokio::select! {
                () = &mut linger => break,
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    print(&msg, args.json)?;
                }
            }
        }
    }

    drop(handle);
    runtime_task.await.context("Session runtime panicked")?;

    // Anything published before the runtime stopped
    while let Ok(msg) = rx.try_recv() {
        print(&msg, args.json)?;
    }
    info!("Lites stopped cleanly");
    Ok(())
}
