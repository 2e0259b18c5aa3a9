// ==============================================================================
// wheel.rs — WHEEL SPIN + SLIP STATE (owns one suspension unit)
// ==============================================================================
// Two implicit states:
// - Airborne (load < 10 N): no tire forces, spin decays by friction only.
// - Grounded: slip angle/ratio from the wheel-frame velocity, tire model,
//   friction circle, spin integration from net torque, suspension update.
//
// Locked wheels (handbrake) skip slip dynamics: an opposing decel torque is
// applied, spin is forced toward zero and lateral authority collapses to
// `lock_grip` of normal — that reduced rear grip is what makes handbrake
// drifts work.
// ==============================================================================

use nalgebra::Vector3;

use super::surface::{self, Surface};
use super::suspension::{SuspensionConfig, SuspensionUnit};
use super::tire;

/// Load below which a wheel counts as airborne.
const GROUNDED_LOAD_MIN: f32 = 10.0;
const INITIAL_TEMP: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct WheelConfig {
    pub local_position: Vector3<f32>, // mounting offset from body origin, m
    pub radius: f32,                  // m
    pub width: f32,                   // m
    pub mass: f32,                    // kg
    pub is_driven: bool,
    pub is_steered: bool,
    /// Lateral grip fraction retained while locked (handbrake drift).
    pub lock_grip: f32,
    pub suspension: SuspensionConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            local_position: Vector3::zeros(),
            radius: 0.33,
            width: 0.225,
            mass: 15.0,
            is_driven: false,
            is_steered: false,
            lock_grip: 0.20,
            suspension: SuspensionConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wheel {
    pub local_position: Vector3<f32>,
    pub radius: f32,
    pub width: f32,
    pub mass: f32,
    pub inertia: f32, // solid disc, 0.5*m*r^2

    pub is_driven: bool,
    pub is_steered: bool,
    pub lock_grip: f32,

    pub steer_angle: f32, // rad, set by the world each tick
    pub spin_speed: f32,  // rad/s
    pub spin_angle: f32,  // accumulated, for visual rolling

    pub slip_angle: f32,
    pub slip_ratio: f32,
    pub lateral_force: f32,
    pub longitudinal_force: f32,
    pub saturated: bool,

    pub load: f32, // N
    pub grounded: bool,
    pub surface: Surface,

    pub temperature: f32, // °C
    pub wear: f32,        // 0..WEAR_MAX

    pub locked: bool,

    pub suspension: SuspensionUnit,
}

impl Wheel {
    pub fn new(config: &WheelConfig) -> Self {
        Self {
            local_position: config.local_position,
            radius: config.radius,
            width: config.width,
            mass: config.mass,
            inertia: 0.5 * config.mass * config.radius * config.radius,
            is_driven: config.is_driven,
            is_steered: config.is_steered,
            lock_grip: config.lock_grip,
            steer_angle: 0.0,
            spin_speed: 0.0,
            spin_angle: 0.0,
            slip_angle: 0.0,
            slip_ratio: 0.0,
            lateral_force: 0.0,
            longitudinal_force: 0.0,
            saturated: false,
            load: config.mass * 9.81,
            grounded: true,
            surface: surface::ASPHALT,
            temperature: INITIAL_TEMP,
            wear: 0.0,
            locked: false,
            suspension: SuspensionUnit::new(&config.suspension),
        }
    }

    /// One fixed tick. `forward_vel`/`lateral_vel` are the contact point's
    /// velocity components in the wheel's own heading frame (chassis heading
    /// plus steer angle).
    pub fn update(
        &mut self,
        forward_vel: f32,
        lateral_vel: f32,
        drive_torque: f32,
        brake_torque: f32,
        load: f32,
        dt: f32,
    ) {
        self.load = load.max(0.0);

        if self.load < GROUNDED_LOAD_MIN {
            self.grounded = false;
            self.lateral_force = 0.0;
            self.longitudinal_force = 0.0;
            self.saturated = false;
            self.spin_speed *= 0.99;
            self.spin_angle += self.spin_speed * dt;
            return;
        }
        self.grounded = true;

        self.slip_angle = tire::slip_angle(lateral_vel, forward_vel);
        self.slip_ratio = tire::slip_ratio(self.spin_speed, self.radius, forward_vel);

        let raw_lat = tire::lateral_force(
            self.slip_angle,
            self.load,
            &self.surface,
            self.temperature,
            self.wear,
        );
        let raw_long = tire::longitudinal_force(
            self.slip_ratio,
            self.load,
            &self.surface,
            self.temperature,
            self.wear,
        );

        let max_grip = self.load * self.surface.friction;
        let combined = tire::friction_circle(raw_lat, raw_long, max_grip);
        self.lateral_force = combined.lat;
        self.longitudinal_force = combined.long;
        self.saturated = combined.saturated;

        let mut net_torque = 0.0;
        if self.is_driven {
            net_torque += drive_torque;
        }

        if self.locked {
            // handbrake: oppose ground speed directly and kill spin
            let lock_decel = forward_vel * self.mass * 2.0;
            net_torque -= lock_decel * self.radius;
            self.spin_speed *= 0.9;
            self.lateral_force *= self.lock_grip;
        } else {
            net_torque -= brake_torque * self.spin_speed.signum();
        }

        // reaction torque from the tire's longitudinal force
        net_torque -= self.longitudinal_force * self.radius;

        self.spin_speed += net_torque / self.inertia * dt;

        // stiction: don't let brake torque spin the wheel backwards
        if brake_torque.abs() > 0.0 && self.spin_speed.abs() < 1.0 {
            self.spin_speed *= 0.95;
        }

        self.spin_angle += self.spin_speed * dt;

        let slip_mag =
            (self.slip_angle * self.slip_angle + self.slip_ratio * self.slip_ratio).sqrt();
        self.temperature = tire::update_temperature(
            self.temperature,
            slip_mag,
            self.load,
            forward_vel.abs(),
            dt,
        );
        self.wear = tire::update_wear(self.wear, slip_mag, self.load, dt);

        self.suspension.update(self.load, dt);
    }

    pub fn is_drifting(&self) -> bool {
        self.slip_angle.abs() > 0.08 && self.grounded
    }

    /// Restore spin/slip/thermal/suspension state without reallocating.
    pub fn reset(&mut self) {
        self.steer_angle = 0.0;
        self.spin_speed = 0.0;
        self.spin_angle = 0.0;
        self.slip_angle = 0.0;
        self.slip_ratio = 0.0;
        self.lateral_force = 0.0;
        self.longitudinal_force = 0.0;
        self.saturated = false;
        self.load = self.mass * 9.81;
        self.grounded = true;
        self.surface = surface::ASPHALT;
        self.temperature = INITIAL_TEMP;
        self.wear = 0.0;
        self.locked = false;
        self.suspension.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    fn test_wheel(driven: bool) -> Wheel {
        Wheel::new(&WheelConfig {
            is_driven: driven,
            ..WheelConfig::default()
        })
    }

    #[test]
    fn airborne_wheel_produces_no_force() {
        let mut wheel = test_wheel(true);
        wheel.spin_speed = 50.0;
        wheel.update(10.0, 2.0, 500.0, 0.0, 5.0, DT);
        assert!(!wheel.grounded);
        assert_eq!(wheel.lateral_force, 0.0);
        assert_eq!(wheel.longitudinal_force, 0.0);
        assert!(wheel.spin_speed < 50.0); // friction decay only
    }

    #[test]
    fn drive_torque_spins_wheel_up() {
        let mut wheel = test_wheel(true);
        wheel.update(0.0, 0.0, 300.0, 0.0, 3500.0, DT);
        assert!(wheel.grounded);
        assert!(wheel.spin_speed > 0.0);
    }

    #[test]
    fn combined_force_respects_friction_circle() {
        let mut wheel = test_wheel(true);
        wheel.spin_speed = 80.0; // heavy wheelspin
        wheel.update(5.0, 4.0, 800.0, 0.0, 4000.0, DT);
        let total = (wheel.lateral_force.powi(2) + wheel.longitudinal_force.powi(2)).sqrt();
        assert!(total <= wheel.load * wheel.surface.friction * 1.0001);
    }

    #[test]
    fn locked_wheel_loses_lateral_grip() {
        let mut grip = test_wheel(false);
        let mut locked = test_wheel(false);
        locked.locked = true;
        grip.spin_speed = 30.0;
        locked.spin_speed = 30.0;
        grip.update(10.0, 3.0, 0.0, 0.0, 3500.0, DT);
        locked.update(10.0, 3.0, 0.0, 0.0, 3500.0, DT);
        assert!(locked.lateral_force.abs() < grip.lateral_force.abs());
        assert!(locked.spin_speed < grip.spin_speed);
    }

    #[test]
    fn slipping_heats_and_wears_the_tire() {
        let mut wheel = test_wheel(true);
        wheel.spin_speed = 100.0;
        let temp0 = wheel.temperature;
        for _ in 0..240 {
            wheel.update(2.0, 0.0, 400.0, 0.0, 4000.0, DT);
        }
        assert!(wheel.temperature > temp0);
        assert!(wheel.wear > 0.0);
        assert!(wheel.wear <= tire::WEAR_MAX);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut wheel = test_wheel(true);
        wheel.spin_speed = 100.0;
        for _ in 0..120 {
            wheel.update(5.0, 1.0, 400.0, 0.0, 4000.0, DT);
        }
        wheel.locked = true;
        wheel.reset();
        assert_eq!(wheel.spin_speed, 0.0);
        assert_eq!(wheel.wear, 0.0);
        assert_eq!(wheel.temperature, 40.0);
        assert!(!wheel.locked);
        assert_eq!(wheel.suspension.compression, 0.0);
    }
}
