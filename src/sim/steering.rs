//! Speed-sensitive steering smoothing and Ackermann front-wheel geometry.

#[derive(Debug, Clone)]
pub struct SteeringConfig {
    pub max_angle: f32,       // rad at rest
    pub speed_reduction: f32, // shrinks max angle with speed
    pub min_speed_angle: f32, // rad, floor at high speed
    pub turn_speed: f32,      // blend rate while steering
    pub return_speed: f32,    // blend rate while centering
    pub wheel_base: f32,      // m
    pub track_width: f32,     // m
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_angle: 0.55,
            speed_reduction: 0.004,
            min_speed_angle: 0.12,
            turn_speed: 4.0,
            return_speed: 6.0,
            wheel_base: 2.6,
            track_width: 1.6,
        }
    }
}

/// Left/right front wheel angles, radians. Inner wheel is always sharper.
#[derive(Debug, Clone, Copy)]
pub struct AckermannAngles {
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone)]
pub struct Steering {
    pub max_angle: f32,
    pub speed_reduction: f32,
    pub min_speed_angle: f32,
    pub turn_speed: f32,
    pub return_speed: f32,
    pub wheel_base: f32,
    pub track_width: f32,

    pub current_angle: f32,
}

impl Steering {
    pub fn new(config: &SteeringConfig) -> Self {
        Self {
            max_angle: config.max_angle,
            speed_reduction: config.speed_reduction,
            min_speed_angle: config.min_speed_angle,
            turn_speed: config.turn_speed,
            return_speed: config.return_speed,
            wheel_base: config.wheel_base,
            track_width: config.track_width,
            current_angle: 0.0,
        }
    }

    /// Ramp toward the speed-limited target. Turning in uses `turn_speed`;
    /// self-centering on release uses the slower `return_speed`... which is
    /// actually larger here, so the wheel snaps back faster than it winds in.
    pub fn update(&mut self, steer_input: f32, speed: f32, dt: f32) -> f32 {
        let speed_factor = 1.0 / (1.0 + speed.abs() * self.speed_reduction);
        let effective_max = (self.max_angle * speed_factor).max(self.min_speed_angle);

        let target = steer_input.clamp(-1.0, 1.0) * effective_max;

        let rate = if steer_input != 0.0 {
            self.turn_speed
        } else {
            self.return_speed
        };
        let blend = (rate * dt).clamp(0.0, 1.0);
        self.current_angle += (target - self.current_angle) * blend;
        self.current_angle
    }

    /// Distinct inner/outer angles from the turn radius so both front wheels
    /// track concentric circles.
    pub fn ackermann_angles(&self) -> AckermannAngles {
        let angle = self.current_angle;
        if angle.abs() < 0.001 {
            return AckermannAngles { left: 0.0, right: 0.0 };
        }

        let turn_radius = self.wheel_base / angle.abs().tan();
        let inner_radius = turn_radius - self.track_width * 0.5;
        let outer_radius = turn_radius + self.track_width * 0.5;

        let inner = (self.wheel_base / inner_radius).atan();
        let outer = (self.wheel_base / outer_radius).atan();

        if angle > 0.0 {
            AckermannAngles { left: inner, right: outer }
        } else {
            AckermannAngles { left: -outer, right: -inner }
        }
    }

    pub fn reset(&mut self) {
        self.current_angle = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn steering_authority_shrinks_with_speed() {
        let mut slow = Steering::new(&SteeringConfig::default());
        let mut fast = Steering::new(&SteeringConfig::default());
        for _ in 0..600 {
            slow.update(1.0, 2.0, DT);
            fast.update(1.0, 50.0, DT);
        }
        assert!(slow.current_angle > fast.current_angle);
        assert!(fast.current_angle >= fast.min_speed_angle - 1e-4);
    }

    #[test]
    fn centers_when_input_released() {
        let mut steering = Steering::new(&SteeringConfig::default());
        for _ in 0..240 {
            steering.update(1.0, 10.0, DT);
        }
        assert!(steering.current_angle > 0.3);
        for _ in 0..240 {
            steering.update(0.0, 10.0, DT);
        }
        assert!(steering.current_angle.abs() < 0.01);
    }

    #[test]
    fn inner_wheel_steers_sharper() {
        let mut steering = Steering::new(&SteeringConfig::default());
        steering.current_angle = 0.4;
        let angles = steering.ackermann_angles();
        assert!(angles.left > angles.right); // left turn: left wheel is inner
        assert!(angles.right > 0.0);

        steering.current_angle = -0.4;
        let angles = steering.ackermann_angles();
        assert!(angles.right < angles.left);
        assert!(angles.left < 0.0);
    }

    #[test]
    fn near_zero_angle_yields_straight_wheels() {
        let mut steering = Steering::new(&SteeringConfig::default());
        steering.current_angle = 0.0005;
        let angles = steering.ackermann_angles();
        assert_eq!(angles.left, 0.0);
        assert_eq!(angles.right, 0.0);
    }
}
