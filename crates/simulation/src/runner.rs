//! The fixed-timestep scheduler.

use crate::{SimConfig, SimError};
use tickbus_core::{Module, SimTime};
use tracing::{debug, info, trace, warn};

/// Counters for a (possibly partial) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Ticks executed.
    pub ticks: u64,
    /// `update_state` calls across all modules.
    pub module_updates: u64,
    /// Simulated time of the most recent tick.
    pub last_tick_time: Option<SimTime>,
}

/// Drives registered modules through simulated time.
///
/// Every tick calls [`Module::update_state`] on each module in registration
/// order, then advances time by `dt`. Ticks run at `0, dt, 2·dt, ...` while
/// the current time is at most `run_time`, so a tick lands exactly on
/// `run_time` when it is a multiple of `dt`.
///
/// Registration order is the ordering contract of the whole system: a module
/// sees messages published earlier in the same tick by modules registered
/// before it, and messages from modules registered after it only on the next
/// tick. Swapping two modules can change results.
///
/// # Example
///
/// ```ignore
/// let mut sim = Sim::new(5, 1)?;
/// sim.add_module(robot);
/// sim.add_module(lidar);
/// sim.add_module(controller);
/// let stats = sim.run();
/// assert_eq!(stats.ticks, 6);
/// ```
pub struct Sim {
    config: SimConfig,

    /// Time of the next tick.
    current_time: SimTime,

    /// Set once advancing past the last tick (or overflowing) ends the run.
    finished: bool,

    /// Modules in tick order.
    modules: Vec<Box<dyn Module>>,

    stats: SimulationStats,
}

impl Sim {
    /// Create a scheduler running until `run_time` in steps of `dt`.
    ///
    /// Fails if `dt` is zero.
    pub fn new(run_time: SimTime, dt: SimTime) -> Result<Self, SimError> {
        Self::from_config(SimConfig::new(run_time, dt))
    }

    /// Create a scheduler from a validated configuration.
    pub fn from_config(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            current_time: 0,
            finished: false,
            modules: Vec::new(),
            stats: SimulationStats::default(),
        })
    }

    /// Append a module to the tick order.
    ///
    /// Modules run in the order they are added. Add every module before the
    /// first tick; there is no way to remove one.
    pub fn add_module<M: Module + 'static>(&mut self, module: M) {
        self.add_boxed(Box::new(module));
    }

    /// Append an already boxed module to the tick order.
    pub fn add_boxed(&mut self, module: Box<dyn Module>) {
        if self.stats.ticks > 0 {
            warn!(
                module = module.name(),
                ticks = self.stats.ticks,
                "Module registered after the run started"
            );
        }
        debug!(
            module = module.name(),
            position = self.modules.len(),
            "Registered module"
        );
        self.modules.push(module);
    }

    /// Run one tick, unless the run is already over.
    ///
    /// Returns whether a tick was executed.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let now = self.current_time;
        trace!(now, "Tick");
        for module in &mut self.modules {
            module.update_state(now);
        }

        self.stats.ticks += 1;
        self.stats.module_updates += self.modules.len() as u64;
        self.stats.last_tick_time = Some(now);

        match now.checked_add(self.config.dt) {
            Some(next) => {
                self.current_time = next;
                self.finished = next > self.config.run_time;
            }
            None => {
                debug!(now, dt = self.config.dt, "Simulated time would overflow");
                self.finished = true;
            }
        }

        true
    }

    /// Run ticks until simulated time passes `run_time`.
    pub fn run(&mut self) -> SimulationStats {
        info!(
            run_time = self.config.run_time,
            dt = self.config.dt,
            modules = self.modules.len(),
            "Starting simulation"
        );

        while self.step() {}

        info!(
            ticks = self.stats.ticks,
            module_updates = self.stats.module_updates,
            "Simulation finished"
        );
        self.stats
    }

    /// Time of the next tick, or of the first time past the end once
    /// finished.
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    pub fn run_time(&self) -> SimTime {
        self.config.run_time
    }

    pub fn dt(&self) -> SimTime {
        self.config.dt
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    /// Whether no further tick will run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Module names in tick order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }
}

impl std::fmt::Debug for Sim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sim")
            .field("config", &self.config)
            .field("current_time", &self.current_time)
            .field("finished", &self.finished)
            .field("modules", &self.module_names())
            .finish()
    }
}
