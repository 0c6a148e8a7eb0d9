use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use u_dispatch::config::DispatchConfig;
use u_dispatch::dispatch::Scheduler;
use u_dispatch::evaluation::evaluate_run;
use u_dispatch::loader::Dataset;
use u_dispatch::models::{parse_clock, Minutes, PackageId};
use u_dispatch::report::{block, brief, RunSummary};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,

    /// Package table
    #[arg(long, global = true, default_value = "data/packages.csv")]
    packages: PathBuf,

    /// Lower-triangular distance table
    #[arg(long, global = true, default_value = "data/distances.csv")]
    distances: PathBuf,

    /// Number of trucks in the fleet
    #[arg(short, long, global = true, default_value_t = 2)]
    trucks: usize,

    /// JSON file overriding the default configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the day and print totals and any violations
    Run,
    /// Show one package as of a clock time
    #[command(visible_alias = "p")]
    Package {
        #[arg(long)]
        id: PackageId,

        /// Clock time, e.g. "10:30" or "9:05 am"
        #[arg(long, value_parser = parse_time)]
        at: Minutes,
    },
    /// Show every package as of a clock time
    Packages {
        /// Clock time, e.g. "10:30" or "9:05 am"
        #[arg(long, value_parser = parse_time)]
        at: Minutes,

        /// Multi-line blocks instead of one line per package
        #[arg(long)]
        block: bool,
    },
    /// Show each truck's mileage
    Mileage,
    /// Show run totals
    Summary {
        #[arg(long)]
        json: bool,
    },
}

fn parse_time(input: &str) -> Result<Minutes, String> {
    if let Ok(time) = input.parse::<jiff::civil::Time>() {
        return Ok(f64::from(time.hour()) * 60.0 + f64::from(time.minute()));
    }

    parse_clock(input).ok_or_else(|| String::from("Invalid time, expected HH:MM or H:MM am/pm"))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DispatchConfig> {
    let Some(path) = path else {
        return Ok(DispatchConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn simulate(cli: &Cli) -> anyhow::Result<(Scheduler, RunSummary)> {
    let config = load_config(cli.config.as_deref())?;
    let dataset = Dataset::read(&cli.packages, &cli.distances)?;
    let mut scheduler = dataset.into_scheduler(config);
    let summary = scheduler
        .run(cli.trucks)
        .context("dispatch did not complete")?;
    Ok((scheduler, summary))
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let (scheduler, summary) = simulate(&cli)?;

    match cli.command {
        Some(Commands::Run) | None => {
            print!("{summary}");
            let violations = evaluate_run(&scheduler);
            for v in &violations {
                println!("violation: {:?}", v.kind);
            }
            info!(violations = violations.len(), "run audited");
        }
        Some(Commands::Package { id, at }) => {
            let Some(package) = scheduler.package(id) else {
                bail!("package #{id} does not exist");
            };
            println!("{}", block(package, at));
        }
        Some(Commands::Packages { at, block: as_blocks }) => {
            for package in scheduler.ledger().iter() {
                if as_blocks {
                    println!("{}", block(package, at));
                } else {
                    println!("{}", brief(package, at));
                }
            }
        }
        Some(Commands::Mileage) => {
            println!("Trucks mileage (in miles):");
            for truck in &summary.trucks {
                println!("  Truck #{}: {:.1}", truck.id, truck.mileage);
            }
        }
        Some(Commands::Summary { json }) => {
            if json {
                println!("{}", summary.to_json()?);
            } else {
                print!("{summary}");
            }
        }
    }

    Ok(())
}
