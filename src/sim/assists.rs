// ==============================================================================
// assists.rs — DRIVER AIDS (ABS / TRACTION CONTROL / STABILITY CONTROL)
// ==============================================================================
// All three are per-tick modulators, not controllers with memory beyond the
// ABS pulse timer:
// - ABS: while braking with a slipping grounded wheel, pulse brake torque at
//   absPulseRate Hz (sine-sign test; off-phase keeps 10% torque).
// - TC: while throttling with a spinning driven wheel, scale throttle down.
// - SC: when yaw rate deviates from the steering-implied target, request
//   extra brake torque on the outer wheels (front full, rear half). The
//   caller routes those corrections into the wheels' brake inputs.
// ==============================================================================

#[derive(Debug, Clone)]
pub struct AssistsConfig {
    pub abs_enabled: bool,
    pub tc_enabled: bool,
    pub sc_enabled: bool,
    pub abs_slip_threshold: f32,
    pub abs_pulse_rate: f32, // Hz
    pub tc_slip_threshold: f32,
    pub tc_reduction: f32,
    pub sc_yaw_threshold: f32, // rad/s of yaw error
    pub sc_brake_force: f32,   // N*m per rad/s of error
}

impl Default for AssistsConfig {
    fn default() -> Self {
        Self {
            abs_enabled: true,
            tc_enabled: true,
            sc_enabled: true,
            abs_slip_threshold: 0.15,
            abs_pulse_rate: 15.0,
            tc_slip_threshold: 0.10,
            tc_reduction: 0.6,
            sc_yaw_threshold: 0.15,
            sc_brake_force: 800.0,
        }
    }
}

/// Per-wheel brake torque additions requested by stability control.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScCorrections {
    pub fl: f32,
    pub fr: f32,
    pub rl: f32,
    pub rr: f32,
}

/// Minimal per-wheel view the assists need, decoupled from `Wheel` itself.
#[derive(Debug, Clone, Copy)]
pub struct WheelSlipState {
    pub slip_ratio: f32,
    pub grounded: bool,
    pub is_driven: bool,
}

#[derive(Debug, Clone)]
pub struct Assists {
    pub abs_enabled: bool,
    pub tc_enabled: bool,
    pub sc_enabled: bool,
    pub abs_slip_threshold: f32,
    pub abs_pulse_rate: f32,
    pub tc_slip_threshold: f32,
    pub tc_reduction: f32,
    pub sc_yaw_threshold: f32,
    pub sc_brake_force: f32,

    pub abs_active: bool,
    pub tc_active: bool,
    pub sc_active: bool,

    abs_timer: f32,
}

impl Assists {
    pub fn new(config: &AssistsConfig) -> Self {
        Self {
            abs_enabled: config.abs_enabled,
            tc_enabled: config.tc_enabled,
            sc_enabled: config.sc_enabled,
            abs_slip_threshold: config.abs_slip_threshold,
            abs_pulse_rate: config.abs_pulse_rate,
            tc_slip_threshold: config.tc_slip_threshold,
            tc_reduction: config.tc_reduction,
            sc_yaw_threshold: config.sc_yaw_threshold,
            sc_brake_force: config.sc_brake_force,
            abs_active: false,
            tc_active: false,
            sc_active: false,
            abs_timer: 0.0,
        }
    }

    pub fn update_abs(&mut self, wheels: &[WheelSlipState], brake_torque: f32, dt: f32) -> f32 {
        if !self.abs_enabled || brake_torque <= 0.0 {
            self.abs_active = false;
            return brake_torque;
        }

        let any_locked = wheels
            .iter()
            .any(|w| w.grounded && w.slip_ratio.abs() > self.abs_slip_threshold);
        if !any_locked {
            self.abs_active = false;
            return brake_torque;
        }

        self.abs_active = true;
        self.abs_timer += dt;
        let pulse = (self.abs_timer * self.abs_pulse_rate * std::f32::consts::TAU).sin();
        if pulse > 0.0 {
            brake_torque
        } else {
            brake_torque * 0.1
        }
    }

    pub fn update_tc(&mut self, wheels: &[WheelSlipState], throttle: f32) -> f32 {
        if !self.tc_enabled || throttle <= 0.0 {
            self.tc_active = false;
            return throttle;
        }

        let any_spinning = wheels
            .iter()
            .any(|w| w.is_driven && w.grounded && w.slip_ratio > self.tc_slip_threshold);
        if !any_spinning {
            self.tc_active = false;
            return throttle;
        }

        self.tc_active = true;
        throttle * self.tc_reduction
    }

    /// Positive yaw error (rotating faster than steered) brakes the left
    /// side; negative brakes the right. Inactive below 5 m/s where yaw rates
    /// are dominated by parking maneuvers.
    pub fn update_sc(
        &mut self,
        yaw_rate: f32,
        target_yaw_rate: f32,
        speed: f32,
    ) -> Option<ScCorrections> {
        if !self.sc_enabled || speed < 5.0 {
            self.sc_active = false;
            return None;
        }

        let yaw_error = yaw_rate - target_yaw_rate;
        if yaw_error.abs() < self.sc_yaw_threshold {
            self.sc_active = false;
            return None;
        }

        self.sc_active = true;
        let force = yaw_error.abs() * self.sc_brake_force;

        let mut corrections = ScCorrections::default();
        if yaw_error > 0.0 {
            corrections.fl = force;
            corrections.rl = force * 0.5;
        } else {
            corrections.fr = force;
            corrections.rr = force * 0.5;
        }
        Some(corrections)
    }

    pub fn reset(&mut self) {
        self.abs_active = false;
        self.tc_active = false;
        self.sc_active = false;
        self.abs_timer = 0.0;
    }
}
