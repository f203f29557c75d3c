use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use volatility_utility::report::fmt_stat;
use volatility_utility::{export, pipeline, report, Category, SimulationConfig};

#[derive(Parser)]
#[command(name = "volatility-utility")]
#[command(about = "Simulates a year of moods and compares utility of crisis and stable days", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// JSON configuration file; unset fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, allow_negative_numbers = true)]
    days: Option<i64>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    window: Option<usize>,
    /// CSV of recorded days (date,category,utility_score)
    #[arg(long)]
    events: Option<PathBuf>,
}

impl RunArgs {
    fn load(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_path(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(days) = self.days {
            config.num_days = days;
        }
        if let Some(threshold) = self.threshold {
            config.volatility_threshold = threshold;
        }
        if let Some(window) = self.window {
            config.volatility_window = window;
        }
        if let Some(path) = &self.events {
            let recorded = export::load_recorded_days(path)
                .with_context(|| format!("failed to read events {}", path.display()))?;
            config.recorded_days.extend(recorded);
        }

        config.validate().context("invalid simulation settings")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and print the category summary
    Simulate {
        #[command(flatten)]
        run: RunArgs,
        /// Write the per-day table as CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
        /// Write the summary as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Repeat the simulation with consecutive seeds
    Batch {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value_t = 100)]
        runs: usize,
    },
    /// Print the default configuration as JSON
    Defaults,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            run,
            csv_out,
            json_out,
        } => {
            let config = run.load()?;
            let output = pipeline::run(&config)?;

            println!("Utility by category ({} days):", output.records.len());
            for summary in output.summaries.values() {
                println!(
                    "- {}: {} days, mean {}, std {}",
                    summary.category,
                    summary.count,
                    fmt_stat(summary.mean_utility),
                    fmt_stat(summary.std_dev_utility)
                );
            }
            for warning in &output.warnings {
                println!("Warning: {warning}");
            }

            if let Some(path) = csv_out {
                export::write_day_table_to_path(&output.records, &path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Day table written to {}.", path.display());
            }
            if let Some(path) = json_out {
                export::write_summary_json_to_path(&config, &output, &path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Summary written to {}.", path.display());
            }
        }
        Commands::Report { run, out } => {
            let config = run.load()?;
            let output = pipeline::run(&config)?;
            let report = report::build_report(&config, &output);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Batch { run, runs } => {
            let config = run.load()?;
            let outcome = pipeline::run_batch(&config, runs)?;

            println!(
                "{} runs from seed {} ({} with an empty category):",
                outcome.runs, outcome.base_seed, outcome.degenerate_runs
            );
            for category in Category::ALL {
                let mean = outcome
                    .mean_of_means
                    .get(&category)
                    .copied()
                    .unwrap_or(f64::NAN);
                println!("- {}: mean utility {}", category, fmt_stat(mean));
            }
            println!(
                "Crisis beat stable in {} of {} comparable runs ({}).",
                outcome.crisis_wins,
                outcome.runs_compared,
                fmt_stat(outcome.crisis_win_rate())
            );
        }
        Commands::Defaults => {
            let json = serde_json::to_string_pretty(&SimulationConfig::default())?;
            println!("{json}");
        }
    }

    Ok(())
}
