//! Tickbus simulation CLI
//!
//! Runs one of the built-in scenarios and prints a run report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tickbus_core::SimTime;
use tickbus_simulator::{scenario, ModuleKind, ScenarioConfig, ThrustScenarioConfig};
use tickbus_types::Direction;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickbus-sim")]
#[command(about = "Discrete-time simulation runner for Tickbus scenarios")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "tickbus_bus=trace")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Robot, LiDAR and controller on an occupancy grid
    Grid {
        /// Scenario TOML file; command-line flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Last tick time in nanoseconds (inclusive)
        #[arg(long)]
        run_time: Option<SimTime>,

        /// Step between ticks in nanoseconds
        #[arg(long)]
        dt: Option<SimTime>,

        /// Robot start column
        #[arg(long)]
        start_x: Option<i64>,

        /// Robot start row
        #[arg(long)]
        start_y: Option<i64>,

        /// Direction the controller commands (up, down, left, right)
        #[arg(long)]
        direction: Option<Direction>,

        /// Tick order (comma-separated: robot, lidar, controller)
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<ModuleKind>>,

        /// Bound subscriber queues, dropping the oldest message on overflow
        #[arg(long)]
        queue_capacity: Option<usize>,
    },

    /// Constant-thrust controller driving a noisy vertical plant
    Thrust {
        /// Last tick time in nanoseconds (inclusive)
        #[arg(long, default_value = "10000000000")]
        run_time: SimTime,

        /// Step between ticks in nanoseconds
        #[arg(long, default_value = "10000000")]
        dt: SimTime,

        /// Throttle fraction in [0, 1]; hover throttle when omitted
        #[arg(long)]
        thrust: Option<f64>,

        /// Noise seed
        #[arg(long, default_value = "12345")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Grid {
            config,
            run_time,
            dt,
            start_x,
            start_y,
            direction,
            order,
            queue_capacity,
        } => {
            let mut scenario_config = match config {
                Some(path) => ScenarioConfig::load(path)?,
                None => ScenarioConfig::default(),
            };
            if let Some(run_time) = run_time {
                scenario_config = scenario_config.with_run_time(run_time);
            }
            if let Some(dt) = dt {
                scenario_config = scenario_config.with_dt(dt);
            }
            let [x, y] = scenario_config.robot.start;
            scenario_config =
                scenario_config.with_start(start_x.unwrap_or(x), start_y.unwrap_or(y));
            if let Some(direction) = direction {
                scenario_config = scenario_config.with_direction(direction);
            }
            if let Some(order) = order {
                scenario_config = scenario_config.with_order(order);
            }
            if let Some(capacity) = queue_capacity {
                scenario_config = scenario_config.with_queue_capacity(capacity);
            }

            let report = scenario::grid(&scenario_config)?.run();
            print!("{report}");
        }

        Commands::Thrust {
            run_time,
            dt,
            thrust,
            seed,
        } => {
            let mut thrust_config = ThrustScenarioConfig::default()
                .with_run_time(run_time)
                .with_dt(dt)
                .with_seed(seed);
            if let Some(fraction) = thrust {
                thrust_config = thrust_config.with_fraction(fraction);
            }

            let report = scenario::thrust(&thrust_config)?.run();
            print!("{report}");
        }
    }

    Ok(())
}
