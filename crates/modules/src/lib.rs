//! Sample modules built on the Tickbus bus.
//!
//! None of these are part of the scheduling core; they show how concrete
//! behaviour plugs into it. Each module wires its subscriptions in its
//! constructor and talks to the others only through topics:
//!
//! ```text
//!   Robot ──TrueStateMsg──► Lidar ──LidarScanMsg──► DummyController
//!     ▲                                                   │
//!     └──────────────────────ControlMsg───────────────────┘
//!
//!   ConstantThrustController ──ThrustCommand──► ThrustPlant ──AltitudeReading──►
//! ```

mod controller;
mod error;
mod lidar;
mod robot;
mod thrust;

pub use controller::DummyController;
pub use error::ModuleError;
pub use lidar::{Lidar, LidarConfig};
pub use robot::Robot;
pub use thrust::{ConstantThrustController, Noise, ThrustPlant, ThrustPlantConfig};
