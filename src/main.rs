use announcer_rs::{init_tracing, Announcer, AnnouncerConfig, BackendKind, Priority};
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
/// Speak announcements read from standard input, one per line.
///
/// Each line is "<priority> <text>", where priority is one of emergency, critical,
/// high, medium or low (medium if omitted). A line reading "clear" drops everything
/// still queued.
#[derive(Debug, Parser)]
#[command(name = "announcer-rs", version)]
struct Cli {
  /// TOML configuration file.
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Override the configured backend (null, simulated, espeak-ng, speech-dispatcher).
  #[arg(short, long)]
  backend: Option<BackendKind>,
  /// How long to wait for queued announcements at end of input.
  #[arg(long, default_value_t = 30)]
  wait_secs: u64,
  /// Default log level when RUST_LOG is unset.
  #[arg(long, default_value = "info")]
  log_level: String,
}
fn parse_line(line: &str) -> (Priority, &str) {
  let line = line.trim();
  match line.split_once(char::is_whitespace) {
    Some((word, rest)) => match word.parse::<Priority>() {
      Ok(priority) => (priority, rest),
      Err(_) => (Priority::Medium, line),
    },
    None => (Priority::Medium, line),
  }
}
fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_tracing(&cli.log_level);
  let mut config = match &cli.config {
    Some(path) => AnnouncerConfig::load_from_file(path)
      .with_context(|| format!("loading {}", path.display()))?,
    None => AnnouncerConfig::default(),
  };
  if let Some(backend) = cli.backend {
    config.backend = backend;
  }
  let announcer = Announcer::new(config);
  if announcer.initialize().is_ok() {
    announcer.start()?;
  } else {
    warn!("no speech backend, announcements will be accepted but not spoken");
  }
  for line in io::stdin().lock().lines() {
    let line = line.context("reading standard input")?;
    if line.trim().is_empty() {
      continue;
    }
    if line.trim().eq_ignore_ascii_case("clear") {
      let cleared = announcer.clear_queue();
      info!(cleared, "queue cleared");
      continue;
    }
    let (priority, text) = parse_line(&line);
    if let Err(error) = announcer.announce(text, priority, None) {
      warn!(%error, "announcement rejected");
    }
  }
  announcer.wait_until_done(Duration::from_secs(cli.wait_secs));
  announcer.shutdown();
  println!("{}", serde_json::to_string_pretty(&announcer.get_stats())?);
  Ok(())
}
