//! Barometer CLI: run, watch, solve and config commands.
//!
//! Commands:
//! - `run`: fetch every model once, print the gauges, save artifacts
//! - `watch`: refresh on an interval, saving each snapshot
//! - `solve`: required return and forward Sharpe for one set of inputs, using the configured policies
//! - `init-config`: write a default TOML config

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use barometer_core::signal::Observation;
use barometer_core::{IndexKind, SignalEngine};
use barometer_runner::{
    run_all_models, save_artifacts, BarometerConfig, CsvDirSource, DataSource, ModelRegistry,
    RefreshLoop, Snapshot, SyntheticSource,
};

#[derive(Parser)]
#[command(
    name = "barometer",
    about = "Barometer CLI: forward-Sharpe equity valuation gauge"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the exported workbooks (overrides the config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Where snapshots are written (overrides the config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Generate synthetic histories instead of reading exports.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Rows per synthetic history.
    #[arg(long, default_value_t = 300)]
    rows: usize,

    /// Seed for synthetic histories.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(clap::Args)]
struct SolveArgs {
    /// Path to a TOML config file; its `[engine.policies]` are applied.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Index price level.
    #[arg(long)]
    price: f64,

    /// Dividend payout ratio in percent.
    #[arg(long, allow_hyphen_values = true)]
    payout: f64,

    /// Return on equity in percent.
    #[arg(long, allow_hyphen_values = true)]
    roe: f64,

    /// Current-year dividend estimate.
    #[arg(long)]
    div_current: f64,

    /// Next-year dividend estimate.
    #[arg(long)]
    div_next: f64,

    /// Reference rate in percent.
    #[arg(long, allow_hyphen_values = true)]
    reference_rate: f64,

    /// Volatility in percent.
    #[arg(long)]
    volatility: f64,

    /// Scaling policy to apply (SPX or TPX).
    #[arg(long, default_value = "SPX")]
    index: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured model once.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Print only; do not write artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Re-run every configured model on an interval.
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Seconds between refreshes (overrides the config).
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Stop after this many refreshes. Runs until killed when omitted.
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Derive required return and forward Sharpe for one set of inputs.
    Solve(SolveArgs),
    /// Write a default config file.
    InitConfig {
        /// Destination path.
        #[arg(default_value = "barometer.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { source, no_save } => run_once(&source, no_save),
        Commands::Watch {
            source,
            interval_secs,
            cycles,
        } => run_watch(&source, interval_secs, cycles),
        Commands::Solve(args) => run_solve(&args),
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

struct Setup {
    config: BarometerConfig,
    registry: ModelRegistry,
    engine: SignalEngine,
    source: Arc<dyn DataSource>,
}

fn setup(args: &SourceArgs) -> Result<Setup> {
    let mut config = match &args.config {
        Some(path) => BarometerConfig::from_file(path)?,
        None => BarometerConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }

    let registry = ModelRegistry::builtin().select(&config.models)?;
    let engine = SignalEngine::new(config.engine.clone())?;
    let source: Arc<dyn DataSource> = if args.synthetic {
        if args.rows == 0 {
            bail!("--rows must be at least 1");
        }
        Arc::new(SyntheticSource::new(&config.engine, args.rows, args.seed))
    } else {
        Arc::new(CsvDirSource::new(&config.data_dir))
    };
    info!(source = source.name(), models = registry.len(), "configured");

    Ok(Setup {
        config,
        registry,
        engine,
        source,
    })
}

fn run_once(args: &SourceArgs, no_save: bool) -> Result<()> {
    let Setup {
        config,
        registry,
        engine,
        source,
    } = setup(args)?;

    let snapshot = run_all_models(&registry, &engine, source.as_ref());
    print_summary(&snapshot);

    if !no_save {
        let run_dir = save_artifacts(&snapshot, &config.output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_watch(args: &SourceArgs, interval_secs: Option<u64>, cycles: Option<usize>) -> Result<()> {
    let Setup {
        config,
        registry,
        engine,
        source,
    } = setup(args)?;

    let interval = match interval_secs {
        Some(0) => bail!("--interval-secs must be at least 1"),
        Some(secs) => Duration::from_secs(secs),
        None => config.refresh_interval(),
    };

    let (tx, rx) = mpsc::channel();
    let refresh = RefreshLoop::spawn(registry, engine, source, interval, tx)
        .context("failed to start refresh thread")?;

    let mut received = 0usize;
    for snapshot in rx.iter() {
        received += 1;
        print_summary(&snapshot);
        let run_dir = save_artifacts(&snapshot, &config.output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
        if cycles.is_some_and(|n| received >= n) {
            break;
        }
    }
    refresh.stop();
    Ok(())
}

fn run_solve(args: &SolveArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => BarometerConfig::from_file(path)?,
        None => BarometerConfig::default(),
    };
    let engine = SignalEngine::new(config.engine)?;
    let index: IndexKind = args.index.parse()?;

    let obs = Observation::from_values(
        chrono::Local::now().date_naive(),
        [
            args.price,
            args.payout,
            args.roe,
            args.div_current,
            args.div_next,
            args.reference_rate,
            args.volatility,
        ],
    );
    let row = engine.derive_observation(index, &obs);

    println!("Growth rate: {:.4}%", row.growth_rate);
    let Some(r) = row.required_return else {
        println!("Required return: undefined (no real root)");
        return Ok(());
    };
    println!("Required return: {r:.4}%");
    if let Some(erp) = row.equity_risk_premium {
        println!("Equity risk premium: {erp:.4}%");
    }
    if let Some(raw) = row.raw_sharpe {
        println!("Raw Sharpe: {raw:.4}");
    }
    match row.forward_sharpe {
        Some(fs) => println!("Forward Sharpe ({index}): {fs:.4}"),
        None => println!("Forward Sharpe ({index}): undefined"),
    }
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = BarometerConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    println!();
    println!("=== Barometer @ {} ===", snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if snapshot.is_empty() {
        println!("No data available. Retry later.");
        return;
    }
    for output in snapshot.models.values() {
        println!("{}", output.display_name);
        for (index, series) in &output.results.series {
            match output.gauges.get(index) {
                Some(g) => println!(
                    "  {index}: {:.2} ({}) as of {}, {} points",
                    g.value,
                    g.zone,
                    g.date,
                    series.len()
                ),
                None => println!("  {index}: No data available"),
            }
        }
        for (index, reason) in &output.results.skipped {
            println!("  {index}: skipped ({reason})");
        }
    }
}
