//! Scenario configuration.
//!
//! The grid scenario can be described in a TOML file and then overridden
//! field by field from the command line:
//!
//! ```toml
//! run_time_ns = 5
//! dt_ns = 1
//! order = ["robot", "lidar", "controller"]
//! queue_capacity = 16
//!
//! [robot]
//! start = [1, 1]
//!
//! [controller]
//! direction = "right"
//!
//! [map]
//! rows = [[1, 1, 1], [1, 0, 1], [1, 1, 1]]
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tickbus_bus::{BusError, QueuePolicy};
use tickbus_core::{secs_to_nanos, SimTime};
use tickbus_modules::{ModuleError, ThrustPlantConfig};
use tickbus_simulation::{SimConfig, SimError};
use tickbus_types::{Direction, GridMap, MapError};

/// Errors loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown module '{0}' (expected robot, lidar or controller)")]
    UnknownModule(String),

    #[error("Module '{0}' appears more than once in the order")]
    DuplicateModule(ModuleKind),

    #[error("Module '{0}' is missing from the order")]
    MissingModule(ModuleKind),

    #[error("Thrust fraction must be within [0, 1], got {0}")]
    InvalidThrust(f64),

    #[error("Invalid map: {0}")]
    Map(#[from] MapError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// The modules a grid scenario is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Robot,
    Lidar,
    Controller,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::Robot,
        ModuleKind::Lidar,
        ModuleKind::Controller,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Robot => "robot",
            ModuleKind::Lidar => "lidar",
            ModuleKind::Controller => "controller",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownModule(s.to_string()))
    }
}

/// Robot placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RobotSection {
    /// Starting cell as `[x, y]`.
    pub start: [i64; 2],
}

impl Default for RobotSection {
    fn default() -> Self {
        Self { start: [1, 1] }
    }
}

/// Controller behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSection {
    /// Direction commanded after every scan.
    pub direction: Direction,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            direction: Direction::Right,
        }
    }
}

/// Occupancy grid given inline, `rows[y][x]`, 0 free and 1 occupied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapSection {
    pub rows: Vec<Vec<u8>>,
}

/// Configuration of the robot / LiDAR / controller scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Last tick time, inclusive.
    pub run_time_ns: SimTime,

    /// Step between ticks.
    pub dt_ns: SimTime,

    /// Tick order of the modules.
    pub order: Vec<ModuleKind>,

    /// Bound every subscriber queue to this many messages, dropping the
    /// oldest on overflow. Unbounded when absent.
    pub queue_capacity: Option<usize>,

    pub robot: RobotSection,

    pub controller: ControllerSection,

    /// Custom map; a bordered 10x10 grid when absent.
    pub map: Option<MapSection>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            run_time_ns: 5,
            dt_ns: 1,
            order: ModuleKind::ALL.to_vec(),
            queue_capacity: None,
            robot: RobotSection::default(),
            controller: ControllerSection::default(),
            map: None,
        }
    }
}

impl ScenarioConfig {
    /// Parse a scenario from TOML. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Set the total run time.
    pub fn with_run_time(mut self, run_time_ns: SimTime) -> Self {
        self.run_time_ns = run_time_ns;
        self
    }

    /// Set the step size.
    pub fn with_dt(mut self, dt_ns: SimTime) -> Self {
        self.dt_ns = dt_ns;
        self
    }

    /// Set the robot start cell.
    pub fn with_start(mut self, x: i64, y: i64) -> Self {
        self.robot.start = [x, y];
        self
    }

    /// Set the direction the controller commands.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.controller.direction = direction;
        self
    }

    /// Set the module tick order.
    pub fn with_order(mut self, order: Vec<ModuleKind>) -> Self {
        self.order = order;
        self
    }

    /// Bound subscriber queues.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Use a custom map.
    pub fn with_map_rows(mut self, rows: Vec<Vec<u8>>) -> Self {
        self.map = Some(MapSection { rows });
        self
    }

    /// Scheduler timing.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.run_time_ns, self.dt_ns)
    }

    /// Default queue policy for the scenario bus.
    pub fn queue_policy(&self) -> Result<QueuePolicy, BusError> {
        match self.queue_capacity {
            Some(capacity) => QueuePolicy::drop_oldest(capacity),
            None => Ok(QueuePolicy::Unbounded),
        }
    }

    /// Build the occupancy grid.
    pub fn grid_map(&self) -> Result<GridMap, MapError> {
        match &self.map {
            Some(section) => GridMap::new(section.rows.clone()),
            None => GridMap::bordered(10, 10),
        }
    }

    /// Check everything that can be checked without a bus.
    ///
    /// The robot start is validated later, by the robot itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim_config().validate()?;
        self.queue_policy()?;
        self.grid_map()?;

        for (i, kind) in self.order.iter().enumerate() {
            if self.order[..i].contains(kind) {
                return Err(ConfigError::DuplicateModule(*kind));
            }
        }
        let missing = ModuleKind::ALL
            .into_iter()
            .find(|kind| !self.order.contains(kind));
        if let Some(kind) = missing {
            return Err(ConfigError::MissingModule(kind));
        }
        Ok(())
    }
}

/// Configuration of the vertical thrust scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustScenarioConfig {
    pub run_time_ns: SimTime,
    pub dt_ns: SimTime,

    /// Constant throttle; the hover throttle when `None`.
    pub fraction: Option<f64>,

    pub plant: ThrustPlantConfig,
}

impl Default for ThrustScenarioConfig {
    fn default() -> Self {
        Self {
            run_time_ns: secs_to_nanos(10.0),
            dt_ns: secs_to_nanos(0.01),
            fraction: None,
            plant: ThrustPlantConfig::default(),
        }
    }
}

impl ThrustScenarioConfig {
    /// Set the total run time.
    pub fn with_run_time(mut self, run_time_ns: SimTime) -> Self {
        self.run_time_ns = run_time_ns;
        self
    }

    /// Set the step size.
    pub fn with_dt(mut self, dt_ns: SimTime) -> Self {
        self.dt_ns = dt_ns;
        self
    }

    /// Set a constant throttle.
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }

    /// Set the noise seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.plant = self.plant.with_seed(seed);
        self
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.run_time_ns, self.dt_ns)
    }

    /// Throttle the controller will command.
    pub fn effective_fraction(&self) -> f64 {
        self.fraction.unwrap_or_else(|| self.plant.hover_fraction())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim_config().validate()?;
        let fraction = self.effective_fraction();
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::InvalidThrust(fraction));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_full_file() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            run_time_ns = 20
            dt_ns = 2
            order = ["controller", "lidar", "robot"]
            queue_capacity = 4

            [robot]
            start = [2, 3]

            [controller]
            direction = "down"

            [map]
            rows = [[1, 1, 1, 1], [1, 0, 0, 1], [1, 0, 0, 1], [1, 0, 0, 1], [1, 1, 1, 1]]
            "#,
        )
        .unwrap();

        assert_eq!(config.sim_config(), SimConfig::new(20, 2));
        assert_eq!(
            config.order,
            vec![ModuleKind::Controller, ModuleKind::Lidar, ModuleKind::Robot]
        );
        assert_eq!(config.queue_policy(), Ok(QueuePolicy::DropOldest { capacity: 4 }));
        assert_eq!(config.robot.start, [2, 3]);
        assert_eq!(config.controller.direction, Direction::Down);
        assert_eq!(config.grid_map().unwrap().dims(), (5, 4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ScenarioConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert_eq!(config.grid_map().unwrap(), GridMap::bordered(10, 10).unwrap());
    }

    #[test]
    fn test_unknown_module_in_file() {
        let result = ScenarioConfig::from_toml_str(r#"order = ["robot", "camera"]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_direction_in_file() {
        let result = ScenarioConfig::from_toml_str("[controller]\ndirection = \"north\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_in_file() {
        let result = ScenarioConfig::from_toml_str("tick_rate = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_order_validation() {
        let duplicate = ScenarioConfig::default().with_order(vec![
            ModuleKind::Robot,
            ModuleKind::Lidar,
            ModuleKind::Robot,
        ]);
        assert!(matches!(
            duplicate.validate(),
            Err(ConfigError::DuplicateModule(ModuleKind::Robot))
        ));

        let missing =
            ScenarioConfig::default().with_order(vec![ModuleKind::Robot, ModuleKind::Lidar]);
        assert!(matches!(
            missing.validate(),
            Err(ConfigError::MissingModule(ModuleKind::Controller))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let zero_dt = ScenarioConfig::default().with_dt(0);
        assert!(matches!(zero_dt.validate(), Err(ConfigError::Sim(SimError::ZeroStep))));

        let zero_capacity = ScenarioConfig::default().with_queue_capacity(0);
        assert!(matches!(
            zero_capacity.validate(),
            Err(ConfigError::Bus(BusError::ZeroCapacity))
        ));

        let ragged = ScenarioConfig::default().with_map_rows(vec![vec![1, 1], vec![1]]);
        assert!(matches!(ragged.validate(), Err(ConfigError::Map(_))));

        let empty = ScenarioConfig::default().with_map_rows(Vec::new());
        assert!(matches!(empty.validate(), Err(ConfigError::Map(MapError::Empty))));
    }

    #[test]
    fn test_module_kind_from_str() {
        assert_eq!("Lidar".parse::<ModuleKind>().unwrap(), ModuleKind::Lidar);
        assert_eq!(" robot".parse::<ModuleKind>().unwrap(), ModuleKind::Robot);
        assert!(matches!(
            "camera".parse::<ModuleKind>(),
            Err(ConfigError::UnknownModule(name)) if name == "camera"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "run_time_ns = 7\n[robot]\nstart = [4, 4]").unwrap();

        let config = ScenarioConfig::load(file.path()).unwrap();
        assert_eq!(config.run_time_ns, 7);
        assert_eq!(config.robot.start, [4, 4]);

        let missing = ScenarioConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_thrust_defaults() {
        let config = ThrustScenarioConfig::default();
        assert_eq!(config.sim_config().tick_count(), Some(1001));
        assert!((config.effective_fraction() - 9.81 / 40.0).abs() < 1e-12);
        assert!(config.validate().is_ok());

        let too_much = config.with_fraction(1.5);
        assert!(matches!(too_much.validate(), Err(ConfigError::InvalidThrust(_))));
    }
}
