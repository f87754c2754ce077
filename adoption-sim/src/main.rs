use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use adoption_sim::logging::init_tracing;
use adoption_sim::scenarios;
use adoption_sim::{SimEngine, SimResult};

#[derive(Parser, Debug)]
#[command(name = "adoption-sim")]
#[command(about = "Discrete-event simulation of product adoption")]
struct Args {
    /// Scenario file, or a scenario name looked up under scenarios/
    #[arg(short, long, default_value = "heating_market")]
    scenario: String,

    /// Override the number of simulation steps
    #[arg(long)]
    steps: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the directory CSV logs are written to
    #[arg(short, long)]
    logs_dir: Option<PathBuf>,

    /// Do not write CSV logs
    #[arg(long, default_value = "false")]
    no_csv: bool,
}

fn run(args: Args) -> SimResult<()> {
    let mut config = scenarios::load_scenario(&args.scenario)?;
    if let Some(steps) = args.steps {
        config.number_total_steps = steps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let logs_dir = args.logs_dir.unwrap_or_else(|| PathBuf::from(&config.logs_dir));
    let logs = if args.no_csv { None } else { Some(logs_dir.as_path()) };

    info!(
        scenario = %config.scenario_name,
        steps = config.number_total_steps,
        seed = ?config.seed,
        "[Main] starting"
    );
    let mut engine = SimEngine::from_config(&config, logs)?;
    let summary = engine.run()?;
    info!(
        steps = summary.steps_run,
        events = summary.events_processed,
        late = summary.late_events,
        "[Main] done"
    );
    Ok(())
}

fn main() {
    init_tracing("info");
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("[Main] FATAL: {e}");
        std::process::exit(1);
    }
}
