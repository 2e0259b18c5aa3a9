// ==============================================================================
// tire.rs — PACEJKA-STYLE TIRE FORCE MODEL (FORCE DOMAIN)
// ==============================================================================
// Inputs per call:
// - slip angle (lateral) or slip ratio (longitudinal)
// - normal load (N), surface multipliers, tire temperature (°C), wear (0..0.3)
//
// Model steps:
// 1) F = D * sin(C * atan(B*s - E*(B*s - atan(B*s))))
//    with B,C,E scaled by the surface and D scaled by load * surface.d
// 2) temperature grip factor (cold ramp / optimal window / overheat falloff)
// 3) wear factor (1 - wear), wear capped at WEAR_MAX
// 4) friction_circle() jointly rescales lat/long so the combined magnitude
//    never exceeds load * surface.friction — the one invariant everything
//    downstream relies on.
//
// Temperature and wear integrate explicitly per tick from slip * load.
// ==============================================================================

use super::surface::Surface;

const BASE_B_LAT: f32 = 10.0;
const BASE_C_LAT: f32 = 1.9;
const BASE_D_LAT: f32 = 1.0;
const BASE_E_LAT: f32 = 0.97;

const BASE_B_LONG: f32 = 12.0;
const BASE_C_LONG: f32 = 1.65;
const BASE_D_LONG: f32 = 1.0;
const BASE_E_LONG: f32 = 0.97;

const TEMP_OPTIMAL: f32 = 90.0;
const TEMP_COLD: f32 = 60.0;
const TEMP_HOT: f32 = 120.0;
const TEMP_HEAT_RATE: f32 = 40.0;
const TEMP_COOL_RATE: f32 = 15.0;
pub const TEMP_AMBIENT: f32 = 25.0;

const WEAR_RATE: f32 = 0.000_01;
pub const WEAR_MAX: f32 = 0.3;

#[inline]
fn pacejka(slip: f32, b: f32, c: f32, d: f32, e: f32) -> f32 {
    d * (c * (b * slip - e * (b * slip - (b * slip).atan())).atan()).sin()
}

/// Piecewise grip multiplier vs temperature: cold tires ramp 0.7 → 0.85,
/// the 60–90 °C window ramps to 1.0, then grip falls off when overheated.
fn temp_grip_factor(temperature: f32) -> f32 {
    if temperature < TEMP_COLD {
        let t = ((temperature - TEMP_AMBIENT) / (TEMP_COLD - TEMP_AMBIENT)).clamp(0.0, 1.0);
        return 0.7 + 0.3 * t;
    }
    if temperature <= TEMP_OPTIMAL {
        let t = ((temperature - TEMP_COLD) / (TEMP_OPTIMAL - TEMP_COLD)).clamp(0.0, 1.0);
        return 0.85 + 0.15 * t;
    }
    if temperature <= TEMP_HOT {
        let t = ((temperature - TEMP_OPTIMAL) / (TEMP_HOT - TEMP_OPTIMAL)).clamp(0.0, 1.0);
        return 1.0 - 0.15 * t;
    }
    0.85 - 0.25 * ((temperature - TEMP_HOT) / 40.0).clamp(0.0, 1.0)
}

pub fn lateral_force(
    slip_angle: f32,
    load: f32,
    surface: &Surface,
    temperature: f32,
    wear: f32,
) -> f32 {
    let b = BASE_B_LAT * surface.b;
    let c = BASE_C_LAT * surface.c;
    let d = load * surface.d * BASE_D_LAT;
    let e = BASE_E_LAT * surface.e;

    let raw = pacejka(slip_angle, b, c, d, e);
    raw * temp_grip_factor(temperature) * (1.0 - wear.clamp(0.0, WEAR_MAX))
}

pub fn longitudinal_force(
    slip_ratio: f32,
    load: f32,
    surface: &Surface,
    temperature: f32,
    wear: f32,
) -> f32 {
    let b = BASE_B_LONG * surface.b;
    let c = BASE_C_LONG * surface.c;
    let d = load * surface.d * BASE_D_LONG;
    let e = BASE_E_LONG * surface.e;

    let raw = pacejka(slip_ratio, b, c, d, e);
    raw * temp_grip_factor(temperature) * (1.0 - wear.clamp(0.0, WEAR_MAX))
}

/// Lateral + longitudinal force after the friction-circle clamp.
#[derive(Debug, Clone, Copy)]
pub struct CombinedForce {
    pub lat: f32,
    pub long: f32,
    pub saturated: bool,
}

/// Jointly rescale (lat, long) so their magnitude never exceeds `max_force`,
/// preserving direction. One grip budget shared between cornering and
/// accel/braking.
pub fn friction_circle(lat: f32, long: f32, max_force: f32) -> CombinedForce {
    let total = (lat * lat + long * long).sqrt();
    if total > max_force && total > 1e-6 {
        let scale = max_force / total;
        return CombinedForce {
            lat: lat * scale,
            long: long * scale,
            saturated: true,
        };
    }
    CombinedForce {
        lat,
        long,
        saturated: false,
    }
}

/// Explicit per-tick heat balance: heat ∝ slip * load, cooling ∝ overshoot
/// above ambient scaled by airspeed.
pub fn update_temperature(current: f32, slip_magnitude: f32, load: f32, air_speed: f32, dt: f32) -> f32 {
    let heat = slip_magnitude * load * TEMP_HEAT_RATE * 0.0001;
    let cooling = (current - TEMP_AMBIENT) * TEMP_COOL_RATE * 0.01 * (1.0 + air_speed * 0.005);
    current + (heat - cooling) * dt
}

/// Monotone wear accumulation, capped at WEAR_MAX.
pub fn update_wear(current: f32, slip_magnitude: f32, load: f32, dt: f32) -> f32 {
    (current + slip_magnitude * load * WEAR_RATE * dt).clamp(0.0, WEAR_MAX)
}

/// Angle between tire velocity and tire heading. Near-rest both components
/// are noise, so report zero rather than atan2 of jitter.
pub fn slip_angle(lateral_vel: f32, forward_vel: f32) -> f32 {
    if forward_vel.abs() < 0.5 && lateral_vel.abs() < 0.5 {
        return 0.0;
    }
    lateral_vel.atan2(forward_vel.abs())
}

/// Normalized difference between wheel surface speed and ground speed.
/// The 0.5 m/s denominator floor keeps the ratio finite at rest.
pub fn slip_ratio(spin_speed: f32, radius: f32, forward_vel: f32) -> f32 {
    let wheel_linear = spin_speed * radius;
    let reference = forward_vel.abs().max(0.5);
    (wheel_linear - forward_vel) / reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::surface;
    use proptest::prelude::*;

    #[test]
    fn pacejka_rises_then_saturates() {
        // force should grow near-linearly for small slip and plateau past peak
        let small = lateral_force(0.02, 4000.0, &surface::ASPHALT, 90.0, 0.0);
        let peak = lateral_force(0.15, 4000.0, &surface::ASPHALT, 90.0, 0.0);
        let deep = lateral_force(0.8, 4000.0, &surface::ASPHALT, 90.0, 0.0);
        assert!(small > 0.0);
        assert!(peak > small);
        assert!(deep > 0.0);
        assert!(deep < peak * 1.05);
    }

    #[test]
    fn cold_tires_grip_less_than_optimal() {
        let cold = lateral_force(0.1, 4000.0, &surface::ASPHALT, 25.0, 0.0);
        let optimal = lateral_force(0.1, 4000.0, &surface::ASPHALT, 90.0, 0.0);
        let overheated = lateral_force(0.1, 4000.0, &surface::ASPHALT, 150.0, 0.0);
        assert!(cold < optimal);
        assert!(overheated < optimal);
    }

    #[test]
    fn worn_tires_grip_less() {
        let fresh = longitudinal_force(0.1, 4000.0, &surface::ASPHALT, 90.0, 0.0);
        let worn = longitudinal_force(0.1, 4000.0, &surface::ASPHALT, 90.0, WEAR_MAX);
        assert!((worn - fresh * (1.0 - WEAR_MAX)).abs() < 1e-3);
    }

    #[test]
    fn wear_is_monotone_and_capped() {
        let mut wear = 0.0;
        for _ in 0..100_000 {
            let next = update_wear(wear, 1.0, 8000.0, 1.0 / 120.0);
            assert!(next >= wear);
            wear = next;
        }
        assert!(wear <= WEAR_MAX);
    }

    #[test]
    fn slip_ratio_is_finite_at_rest() {
        assert_eq!(slip_ratio(0.0, 0.33, 0.0), 0.0);
        let spinning = slip_ratio(100.0, 0.33, 0.0);
        assert!(spinning.is_finite());
        assert!(spinning > 0.0);
    }

    #[test]
    fn slip_angle_zero_near_rest() {
        assert_eq!(slip_angle(0.3, 0.1), 0.0);
        assert!(slip_angle(2.0, 10.0) > 0.0);
    }

    proptest! {
        // The invariant everything downstream relies on: combined force
        // magnitude never exceeds load * friction (small float epsilon).
        #[test]
        fn friction_circle_bounds_combined_force(
            slip_angle in -1.5f32..1.5,
            slip_ratio in -4.0f32..4.0,
            load in 0.0f32..20_000.0,
            temp in -20.0f32..180.0,
            wear in 0.0f32..0.5,
            surface_idx in 0usize..5,
        ) {
            let surfaces = [
                surface::ASPHALT,
                surface::WET_ASPHALT,
                surface::DIRT,
                surface::ICE,
                surface::PUDDLE,
            ];
            let surf = &surfaces[surface_idx];
            let lat = lateral_force(slip_angle, load, surf, temp, wear);
            let long = longitudinal_force(slip_ratio, load, surf, temp, wear);
            let max = load * surf.friction;
            let combined = friction_circle(lat, long, max);
            let total = (combined.lat * combined.lat + combined.long * combined.long).sqrt();
            prop_assert!(total <= max * 1.0001);
        }

        #[test]
        fn friction_circle_preserves_direction(
            lat in -10_000.0f32..10_000.0,
            long in -10_000.0f32..10_000.0,
        ) {
            let combined = friction_circle(lat, long, 1000.0);
            prop_assert!(combined.lat * lat >= 0.0);
            prop_assert!(combined.long * long >= 0.0);
        }
    }
}
