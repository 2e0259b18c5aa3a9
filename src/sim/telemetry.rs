//! Telemetry snapshot: a fully-owned copy of one tick's observable state.
//! No references back into the sim; safe to serialize or hand to another
//! thread. Consumers poll the latest value after `step()`.

use serde::Serialize;

use super::damage::DamageZones;

#[derive(Debug, Clone, Serialize)]
pub struct WheelTelemetry {
    pub slip_angle: f32,
    pub slip_ratio: f32,
    pub load: f32,
    pub temp: f32,
    pub wear: f32,
    pub grounded: bool,
    /// Suspension compression as 0..1 of max travel.
    pub compression: f32,
    pub bottomed_out: bool,
    pub spin_angle: f32,
    pub lateral_force: f32,
    pub longitudinal_force: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Telemetry {
    pub speed_kmh: f32,
    pub forward_speed_kmh: f32,
    pub rpm: f32,
    pub gear: String,
    pub gear_index: usize,
    pub nitro: f32,
    pub max_nitro: f32,
    pub is_drifting: bool,
    pub is_nitro_active: bool,
    pub steer_angle: f32,
    pub drift_angle: f32,
    pub damage: DamageZones,
    pub total_damage: f32,
    pub abs_active: bool,
    pub tc_active: bool,
    pub sc_active: bool,
    pub wheels: Vec<WheelTelemetry>,
    pub tire_temp: f32,
    pub tire_wear: f32,
}
