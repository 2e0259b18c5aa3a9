//! Deterministic vehicle dynamics core plus the LAN host plumbing around it.
//!
//! The `sim` tree is the simulation itself: fixed 1/120 s ticks, per-wheel
//! Pacejka tires, suspension, powertrain, assists, damage and arena
//! collisions, with a [`sim::Telemetry`] snapshot per tick. `net`, `state`
//! and `spawn` are the WebSocket host that drives it for LAN play.

pub mod net;
pub mod sim;
pub mod spawn;
pub mod state;

pub use sim::{InputState, PhysicsWorld, Telemetry, Vehicle, VehicleConfig};
