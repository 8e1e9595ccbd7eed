//! Scenario assembly.
//!
//! Building a scenario means creating one bus, constructing every module
//! against it and registering the modules with a scheduler in tick order.
//! Each scenario also keeps a one-slot observer subscription on its output
//! topic so the final value can be reported after the run.

use crate::config::{ConfigError, ModuleKind, ScenarioConfig, ThrustScenarioConfig};
use std::fmt;
use tickbus_bus::{MessageBus, QueuePolicy, Subscription, TopicStats};
use tickbus_core::Module;
use tickbus_modules::{ConstantThrustController, DummyController, Lidar, Robot, ThrustPlant};
use tickbus_simulation::{Sim, SimulationStats};
use tickbus_types::{AltitudeReading, TrueStateMsg};
use tracing::info;

/// A fully wired simulation, ready to run.
pub struct Scenario<T> {
    sim: Sim,
    bus: MessageBus,
    observer: Subscription<T>,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone)]
pub struct RunReport<T> {
    pub stats: SimulationStats,

    /// Last value published on the observed topic, if any.
    pub last: Option<T>,

    /// Per-topic counters, in topic creation order.
    pub topics: Vec<TopicStats>,
}

impl<T: Clone + 'static> Scenario<T> {
    fn new(sim: Sim, bus: MessageBus) -> Result<Self, ConfigError> {
        // Only the newest value matters; the observer never accumulates.
        let observer = bus.subscribe_with(QueuePolicy::drop_oldest(1)?)?;
        Ok(Self { sim, bus, observer })
    }

    /// Run every remaining tick and collect the results.
    pub fn run(&mut self) -> RunReport<T> {
        let stats = self.sim.run();
        RunReport {
            stats,
            last: self.observer.latest(),
            topics: self.bus.stats(),
        }
    }

    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }
}

/// Build the robot / LiDAR / controller scenario.
pub fn grid(config: &ScenarioConfig) -> Result<Scenario<TrueStateMsg>, ConfigError> {
    config.validate()?;

    let bus = MessageBus::with_default_policy(config.queue_policy()?)?;
    let map = config.grid_map()?;
    let [x, y] = config.robot.start;

    let mut sim = Sim::from_config(config.sim_config())?;
    for kind in &config.order {
        let module: Box<dyn Module> = match kind {
            ModuleKind::Robot => Box::new(Robot::new(&bus, map.clone(), x, y)?),
            ModuleKind::Lidar => Box::new(Lidar::new(&bus, map.clone())),
            ModuleKind::Controller => Box::new(DummyController::with_direction(
                &bus,
                config.controller.direction,
            )),
        };
        sim.add_boxed(module);
    }

    info!(
        order = ?config.order,
        start_x = x,
        start_y = y,
        direction = %config.controller.direction,
        queue_capacity = ?config.queue_capacity,
        "Built grid scenario"
    );
    Scenario::new(sim, bus)
}

/// Build the vertical thrust scenario: a constant-thrust controller
/// followed by the plant.
pub fn thrust(config: &ThrustScenarioConfig) -> Result<Scenario<AltitudeReading>, ConfigError> {
    config.validate()?;

    let bus = MessageBus::new();
    let fraction = config.effective_fraction();

    let mut sim = Sim::from_config(config.sim_config())?;
    sim.add_module(ConstantThrustController::new(&bus, fraction));
    sim.add_module(ThrustPlant::new(&bus, config.plant)?);

    info!(fraction, seed = config.plant.seed, "Built thrust scenario");
    Scenario::new(sim, bus)
}

impl<T: fmt::Debug> fmt::Display for RunReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Report ===")?;
        writeln!(f, "Ticks:          {}", self.stats.ticks)?;
        writeln!(f, "Module updates: {}", self.stats.module_updates)?;
        match self.stats.last_tick_time {
            Some(time) => writeln!(f, "Last tick:      {time} ns")?,
            None => writeln!(f, "Last tick:      -")?,
        }
        match &self.last {
            Some(last) => writeln!(f, "Final output:   {last:?}")?,
            None => writeln!(f, "Final output:   -")?,
        }
        writeln!(f)?;
        writeln!(f, "Topics:")?;
        for topic in &self.topics {
            writeln!(f, "  {topic}")?;
        }
        Ok(())
    }
}
