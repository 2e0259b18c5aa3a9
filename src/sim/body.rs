// ==============================================================================
// body.rs — RIGID BODY STATE + SEMI-IMPLICIT INTEGRATION
// ==============================================================================
// Yaw-only orientation: heading is the single rotational degree of freedom
// that feeds back into dynamics; pitch/roll live in the suspension and are
// cosmetic. Forces/torques accumulate over a tick through applyForce /
// applyForceAtPoint / applyTorque and are consumed by integrate().
//
// Integration order matters: velocity is updated from this tick's forces
// BEFORE position advances (semi-implicit Euler). Accumulators are zeroed at
// the end of every integrate, so they are zero at the start of every tick.
// ==============================================================================

use nalgebra::Vector3;

use super::math;

const ANGULAR_DAMPING: f32 = 0.98;

#[derive(Debug, Clone)]
pub struct BodyConfig {
    pub mass: f32, // kg
    pub inertia: Vector3<f32>,
    pub center_of_mass: Vector3<f32>, // body-local offset
    pub wheel_base: f32,              // m
    pub track_width: f32,             // m
    pub start_position: Vector3<f32>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1400.0,
            inertia: Vector3::new(800.0, 1600.0, 600.0),
            center_of_mass: Vector3::new(0.0, 0.35, -0.1),
            wheel_base: 2.6,
            track_width: 1.6,
            start_position: Vector3::new(0.0, 0.5, 0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VehicleBody {
    pub mass: f32,
    pub inverse_mass: f32,
    pub inertia: Vector3<f32>,
    pub inverse_inertia: Vector3<f32>,
    pub center_of_mass: Vector3<f32>,
    pub wheel_base: f32,
    pub track_width: f32,

    pub position: Vector3<f32>,
    pub heading: f32, // rad, yaw
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,

    force_accum: Vector3<f32>,
    torque_accum: Vector3<f32>,
}

impl VehicleBody {
    pub fn new(config: &BodyConfig) -> Self {
        Self {
            mass: config.mass,
            inverse_mass: 1.0 / config.mass,
            inertia: config.inertia,
            inverse_inertia: Vector3::new(
                1.0 / config.inertia.x,
                1.0 / config.inertia.y,
                1.0 / config.inertia.z,
            ),
            center_of_mass: config.center_of_mass,
            wheel_base: config.wheel_base,
            track_width: config.track_width,
            position: config.start_position,
            heading: 0.0,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            force_accum: Vector3::zeros(),
            torque_accum: Vector3::zeros(),
        }
    }

    pub fn apply_force(&mut self, force: Vector3<f32>) {
        self.force_accum += force;
    }

    /// Linear force plus the torque `r × F` about the world-space COM.
    pub fn apply_force_at_point(&mut self, force: Vector3<f32>, world_point: Vector3<f32>) {
        self.force_accum += force;
        let r = world_point - self.world_com();
        self.torque_accum += r.cross(&force);
    }

    pub fn apply_torque(&mut self, torque: Vector3<f32>) {
        self.torque_accum += torque;
    }

    pub fn world_com(&self) -> Vector3<f32> {
        self.position + math::rotate_y(self.center_of_mass, self.heading)
    }

    pub fn forward_dir(&self) -> Vector3<f32> {
        math::heading_forward(self.heading)
    }

    pub fn right_dir(&self) -> Vector3<f32> {
        math::heading_right(self.heading)
    }

    pub fn forward_speed(&self) -> f32 {
        self.linear_velocity.dot(&self.forward_dir())
    }

    pub fn lateral_speed(&self) -> f32 {
        self.linear_velocity.dot(&self.right_dir())
    }

    pub fn speed(&self) -> f32 {
        self.linear_velocity.norm()
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed() * 3.6
    }

    pub fn local_to_world(&self, local_point: Vector3<f32>) -> Vector3<f32> {
        math::rotate_y(local_point, self.heading) + self.position
    }

    pub fn world_to_local(&self, world_point: Vector3<f32>) -> Vector3<f32> {
        math::rotate_y(world_point - self.position, -self.heading)
    }

    /// A world-space direction expressed in the body frame (rotation only).
    pub fn world_dir_to_local(&self, world_dir: Vector3<f32>) -> Vector3<f32> {
        math::rotate_y(world_dir, -self.heading)
    }

    pub fn integrate(&mut self, dt: f32) {
        self.linear_velocity += self.force_accum * self.inverse_mass * dt;

        self.angular_velocity.x += self.torque_accum.x * self.inverse_inertia.x * dt;
        self.angular_velocity.y += self.torque_accum.y * self.inverse_inertia.y * dt;
        self.angular_velocity.z += self.torque_accum.z * self.inverse_inertia.z * dt;

        self.position += self.linear_velocity * dt;
        self.heading += self.angular_velocity.y * dt;

        self.angular_velocity *= ANGULAR_DAMPING;

        self.force_accum = Vector3::zeros();
        self.torque_accum = Vector3::zeros();
    }

    pub fn reset(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
        self.heading = 0.0;
        self.linear_velocity = Vector3::zeros();
        self.angular_velocity = Vector3::zeros();
        self.force_accum = Vector3::zeros();
        self.torque_accum = Vector3::zeros();
    }
}
