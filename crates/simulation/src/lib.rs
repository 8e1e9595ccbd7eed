//! Deterministic fixed-timestep scheduler.
//!
//! This crate drives a list of [`Module`](tickbus_core::Module)s through
//! simulated time. There is no concurrency and no suspension point: every
//! `update_state` call runs to completion before the next one starts, so a
//! given registration order and timing always reproduce the same run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                          Sim                            │
//! │                                                         │
//! │   current_time = 0                                      │
//! │   while current_time <= run_time:                       │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     modules: Vec<Box<dyn Module>>                  │ │
//! │  │     update_state(current_time), in order           │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │   current_time += dt                                    │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod runner;

pub use config::SimConfig;
pub use error::SimError;
pub use runner::{Sim, SimulationStats};
