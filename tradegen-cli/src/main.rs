//! tradegen CLI — inspect the catalog, print snapshots, run sessions.
//!
//! Commands:
//! - `catalog` — list the instruments trades are drawn from
//! - `snapshot` — create and mutate trades, print the live set as CSV or JSON
//! - `run` — simulate a demo config on a virtual clock and save artifacts
//! - `live` — run a demo config in real time on the driver thread

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tradegen_core::{InstrumentCatalog, TradeId};
use tradegen_runner::{
    save_artifacts, snapshot_csv, spawn_driver, Action, ActionOutcome, DemoConfig, Driver,
    DriverCommand, DriverEvent, RunSummary, Schedule, Simulation,
};

#[derive(Parser)]
#[command(name = "tradegen", about = "tradegen — synthetic trade blotter feed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the instrument catalog.
    Catalog {
        /// Catalog TOML file. Defaults to the built-in six instruments.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Create trades, mutate them, and print the live set.
    Snapshot {
        /// Trades to create.
        #[arg(long, default_value_t = 400)]
        rows: usize,

        /// Random mutations to apply after creation.
        #[arg(long, default_value_t = 0)]
        mutations: usize,

        /// Trade ids to cancel after mutating.
        #[arg(long)]
        cancel: Vec<u64>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Simulate a demo config on a virtual clock.
    Run {
        /// Demo config TOML. Defaults to the built-in page behaviour.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated duration in milliseconds.
        #[arg(long, default_value_t = 10_000)]
        duration_ms: u64,

        /// Override the config's seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for snapshot.csv and summary.json.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run a demo config in real time.
    Live {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wall-clock duration in milliseconds.
        #[arg(long, default_value_t = 2_000)]
        duration_ms: u64,

        /// Move a variable timer's slider at start, as `name=level`.
        #[arg(long)]
        level: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { catalog } => run_catalog(catalog.as_deref()),
        Commands::Snapshot {
            rows,
            mutations,
            cancel,
            seed,
            format,
        } => run_snapshot(rows, mutations, &cancel, seed, format),
        Commands::Run {
            config,
            duration_ms,
            seed,
            output_dir,
        } => run_simulation(config.as_deref(), duration_ms, seed, &output_dir),
        Commands::Live {
            config,
            duration_ms,
            level,
        } => run_live(config.as_deref(), duration_ms, &level),
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    match path {
        Some(p) => DemoConfig::from_file(p).with_context(|| format!("load {}", p.display())),
        None => Ok(DemoConfig::default()),
    }
}

fn run_catalog(path: Option<&Path>) -> Result<()> {
    let catalog = match path {
        Some(p) => InstrumentCatalog::from_file(p)?,
        None => InstrumentCatalog::standard(),
    };
    println!("{:<10} {:<8} FLAG", "SYMBOL", "COUNTRY");
    for inst in catalog.iter() {
        println!(
            "{:<10} {:<8} {}",
            inst.symbol,
            inst.country_code,
            inst.flag_asset()
        );
    }
    Ok(())
}

fn run_snapshot(
    rows: usize,
    mutations: usize,
    cancel: &[u64],
    seed: u64,
    format: Format,
) -> Result<()> {
    let mut driver = Driver::seeded(seed);
    driver.apply(&Action::Create { count: rows });
    for _ in 0..mutations {
        driver.apply(&Action::Mutate);
    }
    for &id in cancel {
        if let ActionOutcome::NotLive(id) = driver.apply(&Action::Cancel { id: TradeId(id) }) {
            eprintln!("Trade {id} is not live; nothing cancelled");
        }
    }

    let trades = driver.store().all_items();
    match format {
        Format::Csv => print!("{}", snapshot_csv(trades)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(trades)?),
    }
    Ok(())
}

fn run_simulation(
    config_path: Option<&Path>,
    duration_ms: u64,
    seed: Option<u64>,
    output_dir: &Path,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.seed = seed;
    }

    let driver = Driver::from_config(&config)?;
    let mut sim = Simulation::new(driver, Schedule::new(&config.timers));
    let summary = sim.run_for(duration_ms);

    print_summary(&summary);

    let paths = save_artifacts(output_dir, sim.driver().store().all_items(), &summary)?;
    for p in paths {
        println!("Saved: {}", p.display());
    }
    Ok(())
}

fn run_live(config_path: Option<&Path>, duration_ms: u64, levels: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let driver = Driver::from_config(&config)?;
    let handle = spawn_driver(driver, Schedule::new(&config.timers))?;

    for arg in levels {
        let Some((timer, level)) = arg.split_once('=') else {
            bail!("expected name=level, got '{arg}'");
        };
        let level: u8 = level
            .parse()
            .with_context(|| format!("invalid level in '{arg}'"))?;
        handle.send(DriverCommand::SetLevel {
            timer: timer.to_string(),
            level,
        })?;
    }

    let deadline = std::time::Instant::now() + Duration::from_millis(duration_ms);
    let mut store_events = 0usize;
    while let Some(remaining) = deadline.checked_duration_since(std::time::Instant::now()) {
        match handle.events().recv_timeout(remaining) {
            Ok(DriverEvent::Store(_)) => store_events += 1,
            Ok(DriverEvent::LevelChanged { timer, period_ms }) => {
                println!("Timer '{timer}' now fires every {period_ms} ms");
            }
            Ok(DriverEvent::Rejected { command, error }) => {
                eprintln!("Rejected {command}: {error}");
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    let summary = handle.shutdown()?;
    print_summary(&summary);
    println!("Store events:   {store_events}");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Session Summary ===");
    match summary.seed {
        Some(seed) => println!("Seed:           {seed}"),
        None => println!("Seed:           (entropy)"),
    }
    println!("Elapsed:        {} ms", summary.elapsed_ms);
    println!("Live trades:    {}", summary.live_trades);
    println!("Next id:        {}", summary.next_id);
    println!();
    println!("--- Actions ---");
    println!("Created:        {}", summary.stats.created);
    println!(
        "Mutated:        {} ({} skipped on empty set)",
        summary.stats.mutated, summary.stats.skipped_mutations
    );
    println!("Clears:         {}", summary.stats.clears);
    println!("Resets:         {}", summary.stats.resets);
    println!(
        "Cancels:        {} ({} not live)",
        summary.stats.cancels, summary.stats.skipped_cancels
    );
    println!();
    println!("--- Live set ---");
    for (status, count) in &summary.status_counts {
        println!("{:<16}{count}", format!("{status}:"));
    }
    println!("Buy / Sell:     {} / {}", summary.buy_count, summary.sell_count);
    println!("Mean filled:    {:.1}%", summary.mean_fill_ratio * 100.0);
    println!();
}
