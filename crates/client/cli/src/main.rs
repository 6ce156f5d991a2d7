//! Terminal client entry point.
//!
//! Runs battles locally against the file-backed rating store and prints the
//! event stream as plain text.
mod config;
mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use battle_core::{BattleMode, Participant, ParticipantId};
use battle_runtime::{BattleRuntime, SessionOutcome, SessionRequest};
use config::CliConfig;

/// Local front-end for the battle engine
#[derive(Parser)]
#[command(name = "battle-cli")]
#[command(about = "Run battles and inspect ratings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run one battle and print every turn
    Fight(Fight),

    /// Show the top fighters of a mode
    Leaderboard {
        #[arg(short, long, value_enum, default_value = "casual")]
        mode: Mode,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show recent battles of a fighter
    History {
        /// Participant identifier
        id: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Only battles of this mode
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,
    },

    /// Show a fighter's rating profile
    Profile {
        /// Participant identifier
        id: String,
    },

    /// Recalculate every stored weighted score
    Recompute,
}

#[derive(Parser)]
struct Fight {
    /// Display name of the first fighter
    first: String,

    /// Display name of the second fighter
    second: String,

    /// Identifier of the first fighter (defaults to its lowercased name)
    #[arg(long)]
    first_id: Option<String>,

    /// Identifier of the second fighter (defaults to its lowercased name)
    #[arg(long)]
    second_id: Option<String>,

    #[arg(short, long, value_enum, default_value = "casual")]
    mode: Mode,

    /// Arena the session lock is scoped to
    #[arg(short, long, default_value = "local")]
    arena: String,

    /// Skip pacing delays
    #[arg(long)]
    fast: bool,

    /// Seed for reproducible rolls (overrides BATTLE_RNG_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Casual,
    Competitive,
}

impl From<Mode> for BattleMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Casual => BattleMode::Casual,
            Mode::Competitive => BattleMode::Competitive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let cli = Cli::parse();
    let mut config = CliConfig::from_env();

    if let Command::Fight(fight) = &cli.command {
        if fight.fast {
            config.start_delay = std::time::Duration::ZERO;
            config.turn_delay = std::time::Duration::ZERO;
        }
        if fight.seed.is_some() {
            config.rng_seed = fight.seed;
        }
    }

    let runtime = BattleRuntime::builder()
        .config(config.runtime_config())
        .build()
        .await
        .with_context(|| format!("failed to open data dir {}", config.data_dir.display()))?;
    tracing::debug!(data_dir = %config.data_dir.display(), "runtime ready");

    let result = run(&runtime, cli.command).await;
    runtime.shutdown().await?;
    result
}

async fn run(runtime: &BattleRuntime, command: Command) -> Result<()> {
    let rating = runtime.rating();
    match command {
        Command::Fight(fight) => return fight.execute(runtime).await,
        Command::Leaderboard { mode, limit } => {
            let entries = rating.leaderboard(mode.into(), limit).await?;
            print!("{}", render::leaderboard(&entries));
        }
        Command::History { id, limit, mode } => {
            let records = rating
                .history(&ParticipantId::new(id), limit, mode.map(Into::into))
                .await?;
            print!("{}", render::history(&records));
        }
        Command::Profile { id } => match rating.profile(&ParticipantId::new(&id)).await? {
            Some(profile) => print!("{}", render::profile(&profile)),
            None => bail!("no profile for {id}"),
        },
        Command::Recompute => {
            let changed = rating.recompute_weighted_scores().await?;
            println!("Updated {changed} profile(s).");
        }
    }
    Ok(())
}

impl Fight {
    async fn execute(self, runtime: &BattleRuntime) -> Result<()> {
        let first = participant(self.first_id, self.first);
        let second = participant(self.second_id, self.second);
        let mode = BattleMode::from(self.mode);

        let request = SessionRequest::new(self.arena, first.clone(), second.clone(), mode)
            .initiated_by(first.id.clone());
        let handle = runtime.start_session(request)?;
        let mut events = handle.events();

        // Both fighters sit at this terminal, so consent is given on their behalf.
        if mode.is_competitive() {
            handle.signal_accept(first.id);
            handle.signal_accept(second.id);
        }

        while let Some(event) = events.next().await {
            if self.json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                for line in render::event(&event) {
                    println!("{line}");
                }
            }
        }

        match handle.settled().await {
            SessionOutcome::Failed { error, .. } => bail!("battle failed: {error}"),
            _ => Ok(()),
        }
    }
}

fn participant(id: Option<String>, label: String) -> Participant {
    let id = id.unwrap_or_else(|| label.to_lowercase());
    Participant::new(id, label)
}

/// Setup logging to stderr so stdout stays clean for battle output
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
