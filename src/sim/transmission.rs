// ==============================================================================
// transmission.rs — GEARBOX + AUTO-SHIFT STATE MACHINE
// ==============================================================================
// Gear indexing: 0 = reverse, 1 = neutral, 2.. = forward gears ascending.
// A shift zeroes the clutch and starts a cooldown; wheel torque delivery is
// zero while the cooldown runs and the clutch ramps linearly back to 1.
// Automatic shifts move the gear index by exactly one.
// ==============================================================================

const REVERSE: usize = 0;
const NEUTRAL: usize = 1;
const FIRST: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivetrain {
    Fwd,
    Rwd,
    Awd,
}

/// Fraction of wheel torque sent to each axle.
#[derive(Debug, Clone, Copy)]
pub struct TorqueSplit {
    pub front: f32,
    pub rear: f32,
}

#[derive(Debug, Clone)]
pub struct TransmissionConfig {
    pub gear_ratios: Vec<f32>,
    pub final_drive: f32,
    pub efficiency: f32,
    pub is_automatic: bool,
    pub shift_up_rpm: f32,
    pub shift_down_rpm: f32,
    pub shift_duration: f32, // s
    pub drivetrain: Drivetrain,
    pub front_bias: f32, // AWD only
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            gear_ratios: vec![-3.2, 0.0, 3.8, 2.5, 1.8, 1.3, 1.0, 0.8],
            final_drive: 3.42,
            efficiency: 0.85,
            is_automatic: true,
            shift_up_rpm: 7200.0,
            shift_down_rpm: 2800.0,
            shift_duration: 0.15,
            drivetrain: Drivetrain::Rwd,
            front_bias: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transmission {
    pub gear_ratios: Vec<f32>,
    pub final_drive: f32,
    pub efficiency: f32,
    pub is_automatic: bool,
    pub shift_up_rpm: f32,
    pub shift_down_rpm: f32,
    pub shift_duration: f32,
    pub drivetrain: Drivetrain,
    pub front_bias: f32,

    pub current_gear: usize,
    pub shift_cooldown: f32,
    pub clutch_engaged: f32, // 0..1
}

impl Transmission {
    pub fn new(config: &TransmissionConfig) -> Self {
        Self {
            gear_ratios: config.gear_ratios.clone(),
            final_drive: config.final_drive,
            efficiency: config.efficiency,
            is_automatic: config.is_automatic,
            shift_up_rpm: config.shift_up_rpm,
            shift_down_rpm: config.shift_down_rpm,
            shift_duration: config.shift_duration,
            drivetrain: config.drivetrain,
            front_bias: config.front_bias,
            current_gear: FIRST,
            shift_cooldown: 0.0,
            clutch_engaged: 1.0,
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.current_gear == REVERSE
    }

    pub fn is_neutral(&self) -> bool {
        self.current_gear == NEUTRAL
    }

    /// HUD label: "R", "N", or the forward gear number starting at 1.
    pub fn display_gear(&self) -> String {
        match self.current_gear {
            REVERSE => "R".to_string(),
            NEUTRAL => "N".to_string(),
            g => (g - 1).to_string(),
        }
    }

    pub fn current_ratio(&self) -> f32 {
        self.gear_ratios[self.current_gear] * self.final_drive
    }

    pub fn wheel_torque(&self, engine_torque: f32) -> f32 {
        if self.shift_cooldown > 0.0 {
            return 0.0;
        }
        engine_torque * self.current_ratio() * self.efficiency * self.clutch_engaged
    }

    /// Map wheel RPM back through the gearing to an engine feedback RPM.
    /// Neutral has no mechanical path, so report idle.
    pub fn wheel_rpm_to_engine_rpm(&self, wheel_rpm: f32) -> f32 {
        let ratio = self.current_ratio().abs();
        if ratio < 0.01 {
            return 800.0;
        }
        wheel_rpm * ratio
    }

    pub fn update(&mut self, engine_rpm: f32, forward_speed: f32, dt: f32) {
        if self.shift_cooldown > 0.0 {
            self.shift_cooldown = (self.shift_cooldown - dt).max(0.0);
            self.clutch_engaged = (1.0 - self.shift_cooldown / self.shift_duration).clamp(0.0, 1.0);
        } else {
            self.clutch_engaged = 1.0;
        }

        if !self.is_automatic {
            return;
        }

        let top_gear = self.gear_ratios.len() - 1;

        if self.current_gear >= FIRST
            && self.current_gear < top_gear
            && engine_rpm > self.shift_up_rpm
            && self.shift_cooldown <= 0.0
        {
            self.shift(self.current_gear + 1);
        }

        if self.current_gear > FIRST
            && engine_rpm < self.shift_down_rpm
            && self.shift_cooldown <= 0.0
        {
            self.shift(self.current_gear - 1);
        }

        // rolling in reverse/neutral: drop into first
        if self.current_gear < FIRST && forward_speed > 1.0 {
            self.shift(FIRST);
        }
    }

    pub fn shift(&mut self, gear: usize) {
        let gear = gear.min(self.gear_ratios.len() - 1);
        if gear == self.current_gear {
            return;
        }
        self.current_gear = gear;
        self.shift_cooldown = self.shift_duration;
        self.clutch_engaged = 0.0;
    }

    pub fn shift_up(&mut self) {
        if self.current_gear < self.gear_ratios.len() - 1 && self.shift_cooldown <= 0.0 {
            self.shift(self.current_gear + 1);
        }
    }

    pub fn shift_down(&mut self) {
        if self.current_gear > 0 && self.shift_cooldown <= 0.0 {
            self.shift(self.current_gear - 1);
        }
    }

    pub fn torque_split(&self) -> TorqueSplit {
        match self.drivetrain {
            Drivetrain::Fwd => TorqueSplit { front: 1.0, rear: 0.0 },
            Drivetrain::Rwd => TorqueSplit { front: 0.0, rear: 1.0 },
            Drivetrain::Awd => TorqueSplit {
                front: self.front_bias,
                rear: 1.0 - self.front_bias,
            },
        }
    }

    pub fn reset(&mut self) {
        self.current_gear = FIRST;
        self.shift_cooldown = 0.0;
        self.clutch_engaged = 1.0;
    }
}
