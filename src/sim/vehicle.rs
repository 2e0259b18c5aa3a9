// ==============================================================================
// vehicle.rs — VEHICLE AGGREGATE + CONFIG VALIDATION
// ==============================================================================
// A vehicle is a strict single-ownership tree: one body, four wheels (FL, FR,
// RL, RR), one of each powertrain/chassis subsystem. Construction validates
// the config and fails fast — a zero mass or a non-monotonic torque curve
// would corrupt every subsequent tick through NaN/Infinity, so it is rejected
// here rather than clamped later.
// ==============================================================================

use std::error::Error;
use std::fmt;

use nalgebra::Vector3;
use serde::Deserialize;

use super::aero::{AeroConfig, Aerodynamics};
use super::assists::{Assists, AssistsConfig};
use super::body::{BodyConfig, VehicleBody};
use super::damage::{DamageConfig, DamageModel};
use super::engine::{EngineConfig, EngineUnit};
use super::steering::{Steering, SteeringConfig};
use super::suspension::AntiRollBar;
use super::transmission::{Drivetrain, Transmission, TransmissionConfig};
use super::wheel::{Wheel, WheelConfig};

pub const WHEEL_FL: usize = 0;
pub const WHEEL_FR: usize = 1;
pub const WHEEL_RL: usize = 2;
pub const WHEEL_RR: usize = 3;

/// Construction-time validation failure. The tick itself is infallible;
/// everything that could divide by zero is rejected here.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveMass(f32),
    NonPositiveInertia(f32),
    NonPositiveWheelRadius(f32),
    NonPositiveWheelMass(f32),
    NonPositiveSpringRate(f32),
    BadTorqueCurve(usize, usize),
    NonMonotonicTorqueCurve,
    TooFewGears(usize),
    NonPositiveFinalDrive(f32),
    BadEfficiency(f32),
    NonPositiveShiftDuration(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMass(m) => write!(f, "vehicle mass must be positive, got {m}"),
            Self::NonPositiveInertia(i) => {
                write!(f, "inertia components must be positive, got {i}")
            }
            Self::NonPositiveWheelRadius(r) => {
                write!(f, "wheel radius must be positive, got {r}")
            }
            Self::NonPositiveWheelMass(m) => write!(f, "wheel mass must be positive, got {m}"),
            Self::NonPositiveSpringRate(k) => {
                write!(f, "suspension spring rate must be positive, got {k}")
            }
            Self::BadTorqueCurve(keys, values) => write!(
                f,
                "torque curve needs matching key/value lengths, got {keys} keys and {values} values"
            ),
            Self::NonMonotonicTorqueCurve => {
                write!(f, "torque curve RPM keys must be strictly ascending")
            }
            Self::TooFewGears(n) => {
                write!(f, "gear table needs reverse, neutral and a forward gear, got {n} entries")
            }
            Self::NonPositiveFinalDrive(r) => {
                write!(f, "final drive ratio must be positive, got {r}")
            }
            Self::BadEfficiency(e) => {
                write!(f, "drivetrain efficiency must be in (0, 1], got {e}")
            }
            Self::NonPositiveShiftDuration(d) => {
                write!(f, "shift duration must be positive, got {d}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Driver intent for one tick. Values outside the documented ranges are
/// clamped where consumed, never rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub throttle: f32, // 0..1
    pub brake: f32,    // 0..1
    pub steer: f32,    // -1..1
    pub handbrake: bool,
    pub nitro: bool,
}

#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub body: BodyConfig,
    pub wheel: WheelConfig,
    pub engine: EngineConfig,
    pub transmission: TransmissionConfig,
    pub steering: SteeringConfig,
    pub aero: AeroConfig,
    pub assists: AssistsConfig,
    pub damage: DamageConfig,
    pub nitro: NitroConfig,
    pub front_arb_stiffness: f32,
    pub rear_arb_stiffness: f32,
    /// Drive torque fades to zero approaching this forward speed (m/s);
    /// nitro raises the ceiling by 30%.
    pub max_speed: f32,
}

#[derive(Debug, Clone)]
pub struct NitroConfig {
    pub max: f32,
    pub drain_rate: f32, // units/s while active
    pub regen_rate: f32, // units/s while inactive
    pub boost_force: f32, // N
}

impl Default for NitroConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            drain_rate: 16.0,
            regen_rate: 5.0,
            boost_force: 6000.0,
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::default(),
            wheel: WheelConfig::default(),
            engine: EngineConfig::default(),
            transmission: TransmissionConfig::default(),
            steering: SteeringConfig::default(),
            aero: AeroConfig::default(),
            assists: AssistsConfig::default(),
            damage: DamageConfig::default(),
            nitro: NitroConfig::default(),
            front_arb_stiffness: 12_000.0,
            rear_arb_stiffness: 10_000.0,
            max_speed: 55.0,
        }
    }
}

impl VehicleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.body.mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass(self.body.mass));
        }
        for axis in [self.body.inertia.x, self.body.inertia.y, self.body.inertia.z] {
            if axis <= 0.0 {
                return Err(ConfigError::NonPositiveInertia(axis));
            }
        }
        if self.wheel.radius <= 0.0 {
            return Err(ConfigError::NonPositiveWheelRadius(self.wheel.radius));
        }
        if self.wheel.mass <= 0.0 {
            return Err(ConfigError::NonPositiveWheelMass(self.wheel.mass));
        }
        if self.wheel.suspension.spring_rate <= 0.0 {
            return Err(ConfigError::NonPositiveSpringRate(
                self.wheel.suspension.spring_rate,
            ));
        }

        let keys = self.engine.torque_curve_keys.len();
        let values = self.engine.torque_curve_values.len();
        if keys != values || keys < 2 {
            return Err(ConfigError::BadTorqueCurve(keys, values));
        }
        if !self
            .engine
            .torque_curve_keys
            .windows(2)
            .all(|w| w[0] < w[1])
        {
            return Err(ConfigError::NonMonotonicTorqueCurve);
        }

        if self.transmission.gear_ratios.len() < 3 {
            return Err(ConfigError::TooFewGears(self.transmission.gear_ratios.len()));
        }
        if self.transmission.final_drive <= 0.0 {
            return Err(ConfigError::NonPositiveFinalDrive(
                self.transmission.final_drive,
            ));
        }
        if self.transmission.efficiency <= 0.0 || self.transmission.efficiency > 1.0 {
            return Err(ConfigError::BadEfficiency(self.transmission.efficiency));
        }
        if self.transmission.shift_duration <= 0.0 {
            return Err(ConfigError::NonPositiveShiftDuration(
                self.transmission.shift_duration,
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub body: VehicleBody,
    pub wheels: [Wheel; 4],
    pub engine: EngineUnit,
    pub transmission: Transmission,
    pub aero: Aerodynamics,
    pub steering: Steering,
    pub assists: Assists,
    pub damage: DamageModel,
    pub front_arb: AntiRollBar,
    pub rear_arb: AntiRollBar,

    pub input: InputState,

    pub nitro: f32,
    pub max_nitro: f32,
    pub nitro_drain: f32,
    pub nitro_regen: f32,
    pub nitro_boost_force: f32,
    pub is_nitro_active: bool,
    pub max_speed: f32,

    pub is_drifting: bool,
    pub drift_angle: f32,
}

impl Vehicle {
    pub fn new(config: &VehicleConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let body = VehicleBody::new(&config.body);
        let half_track = config.body.track_width / 2.0;
        let half_base = config.body.wheel_base / 2.0;

        let (front_driven, rear_driven) = match config.transmission.drivetrain {
            Drivetrain::Fwd => (true, false),
            Drivetrain::Rwd => (false, true),
            Drivetrain::Awd => (true, true),
        };

        let make_wheel = |x: f32, z: f32, steered: bool, driven: bool| {
            Wheel::new(&WheelConfig {
                local_position: Vector3::new(x, 0.0, z),
                is_steered: steered,
                is_driven: driven,
                ..config.wheel.clone()
            })
        };

        let wheels = [
            make_wheel(-half_track, half_base, true, front_driven),
            make_wheel(half_track, half_base, true, front_driven),
            make_wheel(-half_track, -half_base, false, rear_driven),
            make_wheel(half_track, -half_base, false, rear_driven),
        ];

        let mut steering_config = config.steering.clone();
        steering_config.wheel_base = config.body.wheel_base;
        steering_config.track_width = config.body.track_width;

        Ok(Self {
            body,
            wheels,
            engine: EngineUnit::new(&config.engine),
            transmission: Transmission::new(&config.transmission),
            aero: Aerodynamics::new(&config.aero),
            steering: Steering::new(&steering_config),
            assists: Assists::new(&config.assists),
            damage: DamageModel::new(&config.damage),
            front_arb: AntiRollBar::new(config.front_arb_stiffness),
            rear_arb: AntiRollBar::new(config.rear_arb_stiffness),
            input: InputState::default(),
            nitro: config.nitro.max,
            max_nitro: config.nitro.max,
            nitro_drain: config.nitro.drain_rate,
            nitro_regen: config.nitro.regen_rate,
            nitro_boost_force: config.nitro.boost_force,
            is_nitro_active: false,
            max_speed: config.max_speed,
            is_drifting: false,
            drift_angle: 0.0,
        })
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.body.position
    }

    pub fn heading(&self) -> f32 {
        self.body.heading
    }

    pub fn speed(&self) -> f32 {
        self.body.speed()
    }

    pub fn forward_speed(&self) -> f32 {
        self.body.forward_speed()
    }

    pub fn rpm(&self) -> f32 {
        self.engine.rpm
    }

    pub fn gear_index(&self) -> usize {
        self.transmission.current_gear
    }

    /// Full respawn at the given position: every subsystem back to its
    /// initial state, nothing reallocated.
    pub fn reset(&mut self, x: f32, y: f32, z: f32) {
        self.body.reset(x, y, z);
        for wheel in &mut self.wheels {
            wheel.reset();
        }
        self.engine.reset();
        self.transmission.reset();
        self.steering.reset();
        self.assists.reset();
        self.damage.reset();
        self.aero.reset();
        self.input = InputState::default();
        self.nitro = self.max_nitro;
        self.is_nitro_active = false;
        self.is_drifting = false;
        self.drift_angle = 0.0;
    }
}
