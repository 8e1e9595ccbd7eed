//! Core contract for Tickbus simulations.
//!
//! A simulation is a list of [`Module`]s ticked in a fixed order by a
//! scheduler. Modules never call each other; everything they exchange goes
//! through typed topics on a message bus.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Scheduler (Sim)                      │
//! │   now = 0, dt, 2·dt, ... run_time (inclusive)            │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ update_state(now), in order
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!     ┌─────────┐         ┌─────────┐         ┌─────────┐
//!     │ Module A│         │ Module B│         │ Module C│
//!     └────┬────┘         └────┬────┘         └────┬────┘
//!          │ publish / pop     │                   │
//!          ▼                   ▼                   ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │             MessageBus: one Topic<T> per type            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod time;
mod traits;

pub use time::{nanos_to_secs, secs_to_nanos, NANOS_PER_SEC};
pub use tickbus_types::SimTime;
pub use traits::{short_type_name, Module};
