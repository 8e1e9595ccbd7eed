//! One-dimensional vertical thrust plant.
//!
//! A body pushed upwards by a throttled thruster against gravity, with noise
//! on the applied force and on the velocity/acceleration sensors. Time steps
//! come from the scheduler clock; all randomness is drawn from a seeded
//! ChaCha RNG so a run is reproducible.

use crate::ModuleError;
use nalgebra::{Matrix3, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tickbus_bus::{MessageBus, Publisher, Subscription};
use tickbus_core::{nanos_to_secs, Module, SimTime};
use tickbus_types::{AltitudeReading, ThrustCommand};
use tracing::{trace, warn};

/// Gaussian noise parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    pub mean: f64,
    pub std_dev: f64,
}

impl Noise {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// No noise at all.
    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    fn distribution(&self, name: &'static str) -> Result<Normal<f64>, ModuleError> {
        // Normal::new only rejects a non-finite std_dev.
        if !(self.mean.is_finite() && self.std_dev.is_finite() && self.std_dev >= 0.0) {
            return Err(ModuleError::InvalidParameter {
                name,
                reason: format!(
                    "needs finite mean and finite non-negative std_dev, got ({}, {})",
                    self.mean, self.std_dev
                ),
            });
        }
        Normal::new(self.mean, self.std_dev).map_err(|e| ModuleError::InvalidParameter {
            name,
            reason: e.to_string(),
        })
    }
}

/// Physical and noise parameters of a [`ThrustPlant`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustPlantConfig {
    /// Acceleration produced at full throttle.
    pub max_thrust: f64,

    /// Downward acceleration.
    pub gravity: f64,

    /// Error on the thrust actually produced.
    pub thrust_noise: Noise,

    /// Error on velocity and acceleration readings.
    pub sensor_noise: Noise,

    /// Random external force (gusts).
    pub force_noise: Noise,

    /// Seed for all noise.
    pub seed: u64,
}

impl Default for ThrustPlantConfig {
    fn default() -> Self {
        Self {
            max_thrust: 40.0,
            gravity: 9.81,
            thrust_noise: Noise::new(0.0, 2.0),
            sensor_noise: Noise::new(0.1, 0.5),
            force_noise: Noise::new(0.0, 5.75),
            seed: 12345,
        }
    }
}

impl ThrustPlantConfig {
    /// Set the noise seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the full-throttle acceleration.
    pub fn with_max_thrust(mut self, max_thrust: f64) -> Self {
        self.max_thrust = max_thrust;
        self
    }

    /// Disable every noise source.
    pub fn without_noise(mut self) -> Self {
        self.thrust_noise = Noise::none();
        self.sensor_noise = Noise::none();
        self.force_noise = Noise::none();
        self
    }

    /// Throttle fraction that exactly cancels gravity without noise.
    pub fn hover_fraction(&self) -> f64 {
        (self.gravity / self.max_thrust).clamp(0.0, 1.0)
    }
}

/// Vertical plant state: position, velocity and acceleration.
///
/// Consumes the newest pending [`ThrustCommand`] each tick (older ones are
/// discarded; with none pending the previous throttle is held) and publishes
/// an [`AltitudeReading`] every tick. The body cannot go below the ground.
pub struct ThrustPlant {
    config: ThrustPlantConfig,
    /// `[position, velocity, acceleration]`.
    state: Vector3<f64>,
    throttle: f64,
    last_tick: Option<SimTime>,
    rng: ChaCha8Rng,
    thrust_noise: Normal<f64>,
    sensor_noise: Normal<f64>,
    force_noise: Normal<f64>,
    command_sub: Subscription<ThrustCommand>,
    reading_pub: Publisher<AltitudeReading>,
}

impl ThrustPlant {
    /// Create a plant resting on the ground with zero throttle.
    pub fn new(bus: &MessageBus, config: ThrustPlantConfig) -> Result<Self, ModuleError> {
        let thrust_noise = config.thrust_noise.distribution("thrust_noise")?;
        let sensor_noise = config.sensor_noise.distribution("sensor_noise")?;
        let force_noise = config.force_noise.distribution("force_noise")?;

        Ok(Self {
            config,
            state: Vector3::zeros(),
            throttle: 0.0,
            last_tick: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            thrust_noise,
            sensor_noise,
            force_noise,
            command_sub: bus.subscribe(),
            reading_pub: bus.publisher(),
        })
    }

    /// Exact height above ground.
    pub fn position(&self) -> f64 {
        self.state[0]
    }

    /// Exact vertical velocity.
    pub fn velocity(&self) -> f64 {
        self.state[1]
    }

    /// Exact vertical acceleration applied during the last step.
    pub fn acceleration(&self) -> f64 {
        self.state[2]
    }

    /// Throttle currently held, in `[0, 1]`.
    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    fn set_throttle(&mut self, fraction: f64) {
        if fraction.is_nan() {
            warn!("Ignoring NaN thrust command");
            return;
        }
        self.throttle = fraction.clamp(0.0, 1.0);
    }

    /// Integrate the plant over `dt` seconds.
    fn advance(&mut self, dt: f64) {
        let thrust_err = self.thrust_noise.sample(&mut self.rng);
        let force = self.force_noise.sample(&mut self.rng);

        self.state[2] =
            self.config.max_thrust * self.throttle + force + thrust_err - self.config.gravity;

        #[rustfmt::skip]
        let transition = Matrix3::new(
            1.0, dt,  0.5 * dt * dt,
            0.0, 1.0, dt,
            0.0, 0.0, 1.0,
        );
        self.state = transition * self.state;

        // Ground contact: no sinking, no downward velocity.
        if self.state[0] <= 0.0 {
            self.state[0] = 0.0;
            self.state[1] = self.state[1].max(0.0);
        }
    }

    fn reading(&mut self, now: SimTime) -> AltitudeReading {
        AltitudeReading {
            position: self.state[0],
            velocity: self.state[1] + self.sensor_noise.sample(&mut self.rng),
            acceleration: self.state[2] + self.sensor_noise.sample(&mut self.rng),
            time_ns: now,
        }
    }
}

impl Module for ThrustPlant {
    fn update_state(&mut self, now: SimTime) {
        if let Some(command) = self.command_sub.latest() {
            self.set_throttle(command.fraction);
        }

        // The first tick only establishes the clock.
        if let Some(prev) = self.last_tick {
            self.advance(nanos_to_secs(now.saturating_sub(prev)));
        }
        self.last_tick = Some(now);

        let reading = self.reading(now);
        trace!(
            position = reading.position,
            velocity = reading.velocity,
            throttle = self.throttle,
            now,
            "Thrust plant"
        );
        self.reading_pub.publish(reading);
    }
}

/// Publishes the same [`ThrustCommand`] every tick.
pub struct ConstantThrustController {
    fraction: f64,
    command_pub: Publisher<ThrustCommand>,
}

impl ConstantThrustController {
    pub fn new(bus: &MessageBus, fraction: f64) -> Self {
        Self {
            fraction,
            command_pub: bus.publisher(),
        }
    }
}

impl Module for ConstantThrustController {
    fn update_state(&mut self, now: SimTime) {
        self.command_pub.publish(ThrustCommand::new(self.fraction, now));
    }
}
