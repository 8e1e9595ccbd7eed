//! Tickbus Simulator
//!
//! Ready-made scenarios on top of the scheduler, plus the `tickbus-sim`
//! command-line runner.
//!
//! # Architecture
//!
//! The simulator builds on `tickbus-simulation` to provide:
//!
//! - **Configuration**: TOML scenario files with builder-style overrides
//! - **Assembly**: one bus per run, modules constructed and registered in the
//!   configured tick order
//! - **Reporting**: tick counters, the final output value and per-topic stats
//!
//! # Example
//!
//! ```ignore
//! use tickbus_simulator::{scenario, ModuleKind, ScenarioConfig};
//!
//! let config = ScenarioConfig::default()
//!     .with_run_time(10)
//!     .with_order(vec![ModuleKind::Controller, ModuleKind::Lidar, ModuleKind::Robot]);
//!
//! let mut grid = scenario::grid(&config)?;
//! let report = grid.run();
//! println!("{report}");
//! ```

pub mod config;
pub mod scenario;

pub use config::{ConfigError, ModuleKind, ScenarioConfig, ThrustScenarioConfig};
pub use scenario::{RunReport, Scenario};
