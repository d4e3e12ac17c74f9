//! Terminal trivia player
//!
//! Plays rounds against a JSON catalog file. Type the number of an answer
//! and press Enter; once a round is over, press Enter to play again or type
//! `q` to quit.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trivia::{
    ChannelDisplay, FileSettings, Phase, QuizConfig, RoundController, StaticCatalog,
    UpdateMessage,
};
use web_time::Instant;

const TICK_PERIOD: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "trivia", about = "Adaptive-difficulty trivia in the terminal")]
struct Cli {
    /// Catalog document (`{"Catalog": [...]}`)
    #[arg(long)]
    catalog: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// File remembering the last difficulty between runs
    #[arg(long, default_value = "trivia-settings.json")]
    settings: PathBuf,

    /// Seed for question selection and answer order
    #[arg(long)]
    seed: Option<u64>,

    /// Device identifier used to sign in to the catalog
    #[arg(long, default_value = "local-device")]
    device_id: String,

    /// Verbosity (-v info, -vv debug, -vvv trace); overridden by RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Measures the time between consecutive ticks
#[derive(Debug)]
struct TickClock {
    last: Instant,
}

impl TickClock {
    fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Forgets time spent outside a running round, such as init backoff
    fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Time since the previous lap or restart
    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Prints a message; returns whether the round is fully over
fn render(
    message: &UpdateMessage,
    time_per_question: Duration,
    last_second: &mut Option<u64>,
) -> bool {
    match message {
        UpdateMessage::Question {
            prompt,
            answers,
            tier,
        } => {
            *last_second = None;
            println!();
            println!("[{tier}] {prompt}");
            for (i, answer) in answers.iter().enumerate() {
                println!("  {}) {answer}", i + 1);
            }
        }
        UpdateMessage::Timer(fraction) => {
            let seconds = (time_per_question.as_secs_f32() * fraction).ceil() as u64;
            if *last_second != Some(seconds) {
                *last_second = Some(seconds);
                println!("  {seconds}s left");
            }
        }
        UpdateMessage::Scoreboard { tier, score, max } => {
            println!("Score {score} / {max}  (next: {tier})");
        }
        UpdateMessage::InputEnabled(_) => {}
        UpdateMessage::Outcome(outcome) => {
            println!();
            println!("*** {outcome} ***");
        }
        UpdateMessage::Results { correct, incorrect } => {
            println!("Correct: {correct}  Incorrect: {incorrect}");
            println!("Press Enter to play again, or q to quit.");
            return true;
        }
        UpdateMessage::Unavailable(reason) => {
            println!("Trivia is unavailable right now: {reason}");
            println!("Press Enter to retry, or q to quit.");
            return true;
        }
    }
    false
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = QuizConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let catalog = StaticCatalog::from_file(cli.device_id, &cli.catalog)
        .with_context(|| format!("reading catalog {}", cli.catalog.display()))?;
    let settings = FileSettings::open(&cli.settings)
        .with_context(|| format!("opening settings {}", cli.settings.display()))?;
    info!(items = catalog.len(), "catalog loaded");

    let (display, mut updates) = ChannelDisplay::new();
    let mut controller =
        RoundController::new(config, Arc::new(catalog), Box::new(settings), display);
    if let Some(seed) = cli.seed {
        controller = controller.with_rng(fastrand::Rng::with_seed(seed));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(TICK_PERIOD);
    let mut last_second = None;
    let mut round_over = false;

    // a failed init reports itself through the display
    controller.init().await.ok();
    let mut clock = TickClock::start();

    loop {
        while let Ok(message) = updates.try_recv() {
            round_over |= render(&message, config.time_per_question, &mut last_second);
        }

        tokio::select! {
            _ = interval.tick() => controller.tick(clock.lap()),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();

                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                if round_over {
                    if line.is_empty() {
                        round_over = false;
                        controller.init().await.ok();
                        clock.restart();
                    }
                    continue;
                }
                match line.parse::<usize>() {
                    Ok(choice) if controller.phase() == Phase::AwaitingAnswer => {
                        if controller.submit_choice(choice.wrapping_sub(1)).is_none() {
                            let count = controller.state().answers().len();
                            println!("Pick an answer between 1 and {count}");
                        }
                    }
                    Ok(_) => {}
                    Err(_) => warn!(input = line, "not an answer number"),
                }
            }
        }
    }

    Ok(())
}
