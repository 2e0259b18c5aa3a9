// ==============================================================================
// engine.rs — ENGINE UNIT (RPM + TORQUE DOMAIN)
// ==============================================================================
// RPM is not integrated from torque: it blends toward the wheel-feedback RPM
// with a throttle-dependent rate (0.1 + 0.15*throttle, scaled to the tick
// length). That models flywheel inertia well enough for a driving feel and
// keeps the unit unconditionally stable.
//
// The rev limiter is a latch: it trips at revLimiterRPM, cuts fuel (torque
// collapses to -frictionTorque), and releases only once RPM has dropped 300
// below the trip point.
//
// Invariant: idle_rpm <= rpm <= max_rpm after every update().
// ==============================================================================

use super::math::LookupTable;

const LIMITER_HYSTERESIS: f32 = 300.0; // rpm below trip point before release

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub torque_curve_keys: Vec<f32>,   // rpm, strictly ascending
    pub torque_curve_values: Vec<f32>, // N*m
    pub idle_rpm: f32,
    pub redline_rpm: f32,
    pub max_rpm: f32,
    pub rev_limiter_rpm: f32,
    pub engine_brake_torque: f32, // N*m
    pub friction_torque: f32,     // N*m
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            torque_curve_keys: vec![
                800.0, 1500.0, 2500.0, 3500.0, 4500.0, 5500.0, 6500.0, 7500.0, 8000.0,
            ],
            torque_curve_values: vec![
                120.0, 200.0, 310.0, 380.0, 420.0, 400.0, 360.0, 300.0, 250.0,
            ],
            idle_rpm: 800.0,
            redline_rpm: 7800.0,
            max_rpm: 8200.0,
            rev_limiter_rpm: 7900.0,
            engine_brake_torque: 40.0,
            friction_torque: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineUnit {
    pub torque_curve: LookupTable,
    pub idle_rpm: f32,
    pub redline_rpm: f32,
    pub max_rpm: f32,
    pub rev_limiter_rpm: f32,
    pub engine_brake_torque: f32,
    pub friction_torque: f32,

    pub rpm: f32,
    pub throttle: f32,
    pub rev_limiter_active: bool,
}

impl EngineUnit {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            torque_curve: LookupTable::new(
                config.torque_curve_keys.clone(),
                config.torque_curve_values.clone(),
            ),
            idle_rpm: config.idle_rpm,
            redline_rpm: config.redline_rpm,
            max_rpm: config.max_rpm,
            rev_limiter_rpm: config.rev_limiter_rpm,
            engine_brake_torque: config.engine_brake_torque,
            friction_torque: config.friction_torque,
            rpm: config.idle_rpm,
            throttle: 0.0,
            rev_limiter_active: false,
        }
    }

    fn drive_torque(&mut self, rpm: f32, throttle: f32) -> f32 {
        if self.rev_limiter_active && rpm > self.rev_limiter_rpm {
            return 0.0;
        }
        if rpm >= self.rev_limiter_rpm {
            self.rev_limiter_active = true;
        }
        if rpm < self.rev_limiter_rpm - LIMITER_HYSTERESIS {
            self.rev_limiter_active = false;
        }
        self.torque_curve.sample(rpm) * throttle.clamp(0.0, 1.0)
    }

    /// Engine braking torque, signed against wheel spin. Fades in with RPM
    /// and only applies off-throttle while the wheels turn.
    pub fn engine_braking(&self, wheel_speed: f32) -> f32 {
        if self.throttle > 0.05 || wheel_speed.abs() < 0.5 {
            return 0.0;
        }
        let rpm_factor =
            ((self.rpm - self.idle_rpm) / (self.redline_rpm - self.idle_rpm)).clamp(0.0, 1.0);
        self.engine_brake_torque * (0.3 + rpm_factor * 0.7) * wheel_speed.signum()
    }

    /// Smooth RPM toward the drivetrain feedback and return net drive torque
    /// (fuel cut while the limiter latch holds).
    pub fn update(&mut self, wheel_feedback_rpm: f32, throttle: f32, dt: f32) -> f32 {
        self.throttle = throttle.clamp(0.0, 1.0);

        let target_rpm = wheel_feedback_rpm.max(self.idle_rpm);
        let rpm_blend = 0.1 + self.throttle * 0.15;
        self.rpm += (target_rpm - self.rpm) * (rpm_blend * dt * 60.0).clamp(0.0, 1.0);
        self.rpm = self.rpm.clamp(self.idle_rpm, self.max_rpm);

        let torque = self.drive_torque(self.rpm, self.throttle);
        if self.rev_limiter_active {
            return -self.friction_torque;
        }
        torque
    }

    pub fn rpm_normalized(&self) -> f32 {
        ((self.rpm - self.idle_rpm) / (self.redline_rpm - self.idle_rpm)).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.rpm = self.idle_rpm;
        self.throttle = 0.0;
        self.rev_limiter_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn rpm_settles_to_idle_without_input() {
        let mut engine = EngineUnit::new(&EngineConfig::default());
        engine.rpm = 4000.0;
        for _ in 0..600 {
            engine.update(0.0, 0.0, DT);
        }
        assert!((engine.rpm - engine.idle_rpm).abs() < 50.0);
    }

    #[test]
    fn torque_follows_curve_with_throttle() {
        let mut engine = EngineUnit::new(&EngineConfig::default());
        engine.rpm = 4500.0;
        let full = engine.drive_torque(4500.0, 1.0);
        let half = engine.drive_torque(4500.0, 0.5);
        assert!((full - 420.0).abs() < 1.0);
        assert!((half - 210.0).abs() < 1.0);
    }

    #[test]
    fn rev_limiter_latches_with_hysteresis() {
        let mut engine = EngineUnit::new(&EngineConfig::default());
        engine.rpm = 7950.0;
        let cut = engine.update(7950.0, 1.0, DT);
        assert!(engine.rev_limiter_active);
        assert!(cut < 0.0); // fuel cut, only friction drag

        // still above the release point: latch holds
        engine.rpm = 7700.0;
        engine.drive_torque(7700.0, 1.0);
        assert!(engine.rev_limiter_active);

        // 300 below the trip point: latch releases
        engine.drive_torque(7500.0, 1.0);
        assert!(!engine.rev_limiter_active);
    }

    #[test]
    fn engine_braking_needs_motion_and_closed_throttle() {
        let mut engine = EngineUnit::new(&EngineConfig::default());
        engine.rpm = 5000.0;
        engine.throttle = 0.0;
        assert!(engine.engine_braking(50.0) > 0.0);
        assert!(engine.engine_braking(-50.0) < 0.0);
        assert_eq!(engine.engine_braking(0.1), 0.0);
        engine.throttle = 0.5;
        assert_eq!(engine.engine_braking(50.0), 0.0);
    }

    proptest! {
        // idle <= rpm <= max after any update sequence
        #[test]
        fn rpm_stays_in_bounds(
            steps in proptest::collection::vec((0.0f32..20_000.0, 0.0f32..1.5), 1..200),
        ) {
            let mut engine = EngineUnit::new(&EngineConfig::default());
            for (feedback, throttle) in steps {
                engine.update(feedback, throttle, DT);
                prop_assert!(engine.rpm >= engine.idle_rpm);
                prop_assert!(engine.rpm <= engine.max_rpm);
            }
        }
    }
}
