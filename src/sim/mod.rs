//! Deterministic fixed-timestep vehicle dynamics. No I/O, no async, no
//! randomness: the same input sequence from the same initial state yields
//! the same telemetry sequence.

pub mod aero;
pub mod assists;
pub mod body;
pub mod collision;
pub mod damage;
pub mod engine;
pub mod math;
pub mod steering;
pub mod surface;
pub mod suspension;
pub mod telemetry;
pub mod tire;
pub mod transmission;
pub mod vehicle;
pub mod weather;
pub mod wheel;
pub mod world;

pub use telemetry::Telemetry;
pub use vehicle::{ConfigError, InputState, Vehicle, VehicleConfig};
pub use world::{PhysicsWorld, WorldConfig, FIXED_DT};
