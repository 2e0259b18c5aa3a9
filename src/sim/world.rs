// ==============================================================================
// world.rs — PHYSICS WORLD (FIXED-TIMESTEP ORCHESTRATION)
// ==============================================================================
// step(renderDelta) accumulates clamped render time and runs fixed 1/120 s
// substeps, at most MAX_SUBSTEPS per call. Time beyond the substep cap is
// dropped, trading exact time accounting for responsiveness under load.
//
// updateVehicle runs one tick for one vehicle in a fixed order: steering,
// nitro, throttle (TC + damage), powertrain, brakes (ABS + stability
// control), body forces (gravity/drag/wind), per-wheel loads (static split,
// weight transfer, downforce, anti-roll bars), the four wheel updates,
// integration, collision response, telemetry. Reordering these changes the
// handling balance, not just the numbers.
// ==============================================================================

use nalgebra::Vector3;
use tracing::{debug, trace};

use super::collision::{CollisionBridge, CollisionConfig, VEHICLE_RADIUS};
use super::math;
use super::telemetry::{Telemetry, WheelTelemetry};
use super::vehicle::{
    ConfigError, Vehicle, VehicleConfig, WHEEL_FL, WHEEL_FR, WHEEL_RL, WHEEL_RR,
};
use super::weather::Weather;
use super::wheel::Wheel;

pub const FIXED_DT: f32 = 1.0 / 120.0;
pub const MAX_SUBSTEPS: u32 = 8;
const GRAVITY: f32 = 9.81;
const RIDE_HEIGHT: f32 = 0.5;
const BRAKE_TORQUE_BASE: f32 = 3000.0;

#[derive(Debug, Clone, Default)]
pub struct WorldConfig {
    pub fixed_dt: Option<f32>,
    pub gravity: Option<f32>,
    pub collision: CollisionConfig,
}

pub struct PhysicsWorld {
    pub fixed_dt: f32,
    pub gravity: f32,
    pub accumulator: f32,
    pub tick_count: u64,

    pub vehicles: Vec<Vehicle>,
    pub weather: Weather,
    pub collision: CollisionBridge,

    /// Latest per-vehicle snapshots, rebuilt every fixed step.
    pub telemetry: Vec<Telemetry>,
}

impl PhysicsWorld {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            fixed_dt: config.fixed_dt.unwrap_or(FIXED_DT),
            gravity: config.gravity.unwrap_or(GRAVITY),
            accumulator: 0.0,
            tick_count: 0,
            vehicles: Vec::new(),
            weather: Weather::new(),
            collision: CollisionBridge::new(&config.collision),
            telemetry: Vec::new(),
        }
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> usize {
        self.vehicles.push(vehicle);
        self.vehicles.len() - 1
    }

    pub fn create_vehicle(&mut self, config: &VehicleConfig) -> Result<usize, ConfigError> {
        let vehicle = Vehicle::new(config)?;
        Ok(self.add_vehicle(vehicle))
    }

    /// Advance by a variable render/host delta. Deltas above 0.1 s are
    /// clamped so a stall can't trigger a substep avalanche.
    pub fn step(&mut self, render_delta: f32) {
        self.accumulator += render_delta.min(0.1);
        let mut steps = 0;

        while self.accumulator >= self.fixed_dt && steps < MAX_SUBSTEPS {
            self.fixed_step(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            self.tick_count += 1;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.accumulator >= self.fixed_dt {
            trace!(dropped = self.accumulator, "substep cap hit, dropping time");
            self.accumulator = 0.0;
        }
    }

    pub fn fixed_step(&mut self, dt: f32) {
        let positions: Vec<Vector3<f32>> = self.vehicles.iter().map(|v| v.position()).collect();
        self.telemetry.clear();

        for (i, vehicle) in self.vehicles.iter_mut().enumerate() {
            let others: Vec<Vector3<f32>> = positions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, p)| *p)
                .collect();

            let snapshot = update_vehicle(
                vehicle,
                &self.weather,
                &self.collision,
                self.gravity,
                &others,
                dt,
            );
            self.telemetry.push(snapshot);
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.tick_count = 0;
        for vehicle in &mut self.vehicles {
            vehicle.reset(0.0, RIDE_HEIGHT, 0.0);
        }
        self.weather.reset();
        self.telemetry.clear();
    }
}

fn slip_states(wheels: &[Wheel; 4]) -> [super::assists::WheelSlipState; 4] {
    std::array::from_fn(|i| super::assists::WheelSlipState {
        slip_ratio: wheels[i].slip_ratio,
        grounded: wheels[i].grounded,
        is_driven: wheels[i].is_driven,
    })
}

fn update_vehicle(
    v: &mut Vehicle,
    weather: &Weather,
    collision: &CollisionBridge,
    gravity: f32,
    others: &[Vector3<f32>],
    dt: f32,
) -> Telemetry {
    let fwd = v.body.forward_dir();
    let right = v.body.right_dir();
    let forward_speed = v.body.forward_speed();
    let abs_speed = forward_speed.abs();
    let speed = v.body.speed();

    // 1. steering + Ackermann, with damage alignment and authority penalty
    let steer_angle = v.steering.update(v.input.steer, forward_speed, dt);
    let ackermann = v.steering.ackermann_angles();
    let align_drift = v.damage.alignment_drift();
    let steering_penalty = v.damage.steering_penalty();

    v.wheels[WHEEL_FL].steer_angle = (ackermann.left + align_drift) * steering_penalty;
    v.wheels[WHEEL_FR].steer_angle = (ackermann.right + align_drift) * steering_penalty;
    v.wheels[WHEEL_RL].steer_angle = 0.0;
    v.wheels[WHEEL_RR].steer_angle = 0.0;

    // 2. nitro resource
    v.is_nitro_active = v.input.nitro && v.nitro > 0.0 && v.input.throttle > 0.0;
    if v.is_nitro_active {
        v.nitro = (v.nitro - v.nitro_drain * dt).max(0.0);
    } else {
        v.nitro = (v.nitro + v.nitro_regen * dt).min(v.max_nitro);
    }

    // 3. throttle after traction control and rear damage
    let wheel_states = slip_states(&v.wheels);
    let mut throttle = v.input.throttle.clamp(0.0, 1.0);
    throttle = v.assists.update_tc(&wheel_states, throttle);
    throttle *= v.damage.power_penalty();

    // 4-5. powertrain
    let driven: Vec<&Wheel> = v.wheels.iter().filter(|w| w.is_driven).collect();
    let avg_driven_spin = if driven.is_empty() {
        0.0
    } else {
        driven.iter().map(|w| w.spin_speed).sum::<f32>() / driven.len() as f32
    };
    let wheel_rpm = avg_driven_spin.abs() * 60.0 / std::f32::consts::TAU;
    let feedback_rpm = v.transmission.wheel_rpm_to_engine_rpm(wheel_rpm);

    let engine_torque = v.engine.update(feedback_rpm, throttle, dt);
    v.transmission.update(v.engine.rpm, forward_speed, dt);

    let mut wheel_torque = v.transmission.wheel_torque(engine_torque);

    // top-speed governor: drive delivery fades out over the last 10% toward
    // the ceiling (raised 30% while nitro is active)
    let ceiling = v.max_speed * if v.is_nitro_active { 1.3 } else { 1.0 };
    let governor = if forward_speed > 0.0 {
        ((ceiling - forward_speed) / (ceiling * 0.1)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    if wheel_torque > 0.0 {
        wheel_torque *= governor;
    }
    let split = v.transmission.torque_split();

    // 6. brakes: base torque through ABS, then per-wheel stability control
    let mut brake_torque = v.input.brake.clamp(0.0, 1.0) * BRAKE_TORQUE_BASE;
    brake_torque = v.assists.update_abs(&wheel_states, brake_torque, dt);

    let target_yaw_rate = if abs_speed > 0.5 {
        forward_speed * steer_angle.tan() / v.body.wheel_base
    } else {
        0.0
    };
    let sc = v
        .assists
        .update_sc(v.body.angular_velocity.y, target_yaw_rate, speed)
        .unwrap_or_default();
    let sc_by_wheel = [sc.fl, sc.fr, sc.rl, sc.rr];

    let handbrake = v.input.handbrake;
    v.wheels[WHEEL_RL].locked = handbrake;
    v.wheels[WHEEL_RR].locked = handbrake;

    // 7. body-level forces
    v.body
        .apply_force(Vector3::new(0.0, -gravity * v.body.mass, 0.0));

    v.aero.check_slipstream(&v.body.position, &fwd, others);
    let drag = v.aero.drag(&v.body.linear_velocity) * v.damage.drag_penalty();
    v.body.apply_force(drag);

    let wind = weather.wind_force(v.aero.frontal_area);
    if wind.norm_squared() > 0.0 {
        v.body.apply_force(wind);
    }

    let downforce = v.aero.downforce(speed);

    // 8. per-wheel loads
    let total_weight = v.body.mass * gravity;
    let accel_g = if forward_speed > 0.5 {
        (throttle - v.input.brake) * 0.3
    } else {
        0.0
    };
    let weight_transfer = accel_g * v.body.mass * 0.1;
    let front_static = total_weight * 0.48;
    let rear_static = total_weight * 0.52;

    let mut fl = (front_static - weight_transfer) * 0.5 + downforce.front * 0.5;
    let mut fr = (front_static - weight_transfer) * 0.5 + downforce.front * 0.5;
    let mut rl = (rear_static + weight_transfer) * 0.5 + downforce.rear * 0.5;
    let mut rr = (rear_static + weight_transfer) * 0.5 + downforce.rear * 0.5;

    let yaw_rate = v.body.angular_velocity.y;
    let lateral_transfer = yaw_rate * abs_speed * v.body.mass * 0.05;
    fl += lateral_transfer;
    fr -= lateral_transfer;
    rl += lateral_transfer;
    rr -= lateral_transfer;

    let front_arb = v.front_arb.compute(
        v.wheels[WHEEL_FL].suspension.compression,
        v.wheels[WHEEL_FR].suspension.compression,
    );
    fl += front_arb.left;
    fr += front_arb.right;
    let rear_arb = v.rear_arb.compute(
        v.wheels[WHEEL_RL].suspension.compression,
        v.wheels[WHEEL_RR].suspension.compression,
    );
    rl += rear_arb.left;
    rr += rear_arb.right;

    let loads = [fl.max(0.0), fr.max(0.0), rl.max(0.0), rr.max(0.0)];

    // 9. wheel updates, forces accumulated onto the body
    v.is_drifting = false;
    for i in 0..4 {
        let wheel = &mut v.wheels[i];
        let world_pos = math::rotate_y(wheel.local_position, v.body.heading) + v.body.position;

        wheel.surface = weather.surface_at(world_pos.x, world_pos.z);
        if weather.check_hydroplane(abs_speed, &wheel.surface) {
            // riding on the water film, not the road
            wheel.surface.friction *= 0.3;
            wheel.surface.d *= 0.3;
        }

        let wheel_heading = v.body.heading + wheel.steer_angle;
        let wheel_fwd = math::heading_forward(wheel_heading);
        let wheel_right = math::heading_right(wheel_heading);

        let w_fwd_speed = v.body.linear_velocity.dot(&wheel_fwd);
        let w_lat_speed = v.body.linear_velocity.dot(&wheel_right);

        let axle_share = if i < 2 { split.front } else { split.rear };
        let mut drive = if wheel.is_driven {
            wheel_torque * axle_share * 0.5
        } else {
            0.0
        };
        if wheel.is_driven {
            drive -= v.engine.engine_braking(wheel.spin_speed);
        }

        let brake = brake_torque * 0.25 + sc_by_wheel[i];

        wheel.update(w_fwd_speed, w_lat_speed, drive, brake, loads[i], dt);

        let lat_force = -wheel.lateral_force;
        let long_force = wheel.longitudinal_force;
        let force_world = Vector3::new(
            wheel_fwd.x * long_force + wheel_right.x * lat_force,
            0.0,
            wheel_fwd.z * long_force + wheel_right.z * lat_force,
        );
        v.body.apply_force_at_point(force_world, world_pos);

        if wheel.is_drifting() {
            v.is_drifting = true;
        }
    }

    // 10. nitro boost (also governed) + damage side pull
    if v.is_nitro_active {
        v.body.apply_force(fwd * v.nitro_boost_force * governor);
    }
    let side_drag = v.damage.side_drag_bias();
    if side_drag.abs() > 0.001 {
        v.body.apply_force(right * side_drag * speed * v.body.mass);
    }

    // 11. integrate, then hold the body on the ground plane
    v.body.integrate(dt);
    let ground = collision.terrain_height(v.body.position.x, v.body.position.z) + RIDE_HEIGHT;
    if v.body.position.y <= ground {
        v.body.position.y = ground;
        if v.body.linear_velocity.y < 0.0 {
            v.body.linear_velocity.y = 0.0;
        }
    }

    // 12. collision response
    let contacts = collision.test_collision(&v.body.position, VEHICLE_RADIUS);
    for contact in &contacts {
        let vel_into_wall = v.body.linear_velocity.dot(&contact.normal);
        if vel_into_wall >= 0.0 {
            continue;
        }
        let impact_speed = vel_into_wall.abs();
        debug!(impact_speed, "wall impact");

        // reflect with a slight bounce, then bleed energy by impact speed
        v.body.linear_velocity += contact.normal * (-vel_into_wall * 1.2);
        let impact_loss = (1.0 - impact_speed * 0.004).clamp(0.6, 0.95);
        v.body.linear_velocity *= impact_loss;

        v.body.position += contact.normal * (contact.penetration + 0.1);

        let local_normal = v.body.world_dir_to_local(contact.normal);
        v.damage
            .apply_impact(impact_speed, local_normal.x, local_normal.z);

        v.body.angular_velocity.y *= 0.85;
    }

    // 13. drift angle + snapshot
    v.drift_angle = if abs_speed > 2.0 {
        v.body.lateral_speed().atan2(abs_speed)
    } else {
        0.0
    };

    Telemetry {
        speed_kmh: abs_speed * 3.6,
        forward_speed_kmh: forward_speed * 3.6,
        rpm: v.engine.rpm,
        gear: v.transmission.display_gear(),
        gear_index: v.transmission.current_gear,
        nitro: v.nitro,
        max_nitro: v.max_nitro,
        is_drifting: v.is_drifting,
        is_nitro_active: v.is_nitro_active,
        steer_angle,
        drift_angle: v.drift_angle,
        damage: v.damage.zones,
        total_damage: v.damage.total_damage01(),
        abs_active: v.assists.abs_active,
        tc_active: v.assists.tc_active,
        sc_active: v.assists.sc_active,
        wheels: v
            .wheels
            .iter()
            .map(|w| WheelTelemetry {
                slip_angle: w.slip_angle,
                slip_ratio: w.slip_ratio,
                load: w.load,
                temp: w.temperature,
                wear: w.wear,
                grounded: w.grounded,
                compression: w.suspension.compression01(),
                bottomed_out: w.suspension.bottomed_out,
                spin_angle: w.spin_angle,
                lateral_force: w.lateral_force,
                longitudinal_force: w.longitudinal_force,
            })
            .collect(),
        tire_temp: v.wheels.iter().map(|w| w.temperature).sum::<f32>() / 4.0,
        tire_wear: v.wheels.iter().map(|w| w.wear).sum::<f32>() / 4.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_car() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(&WorldConfig::default());
        world.create_vehicle(&VehicleConfig::default()).unwrap();
        world
    }

    #[test]
    fn accumulator_runs_fixed_substeps() {
        let mut world = world_with_car();
        world.step(2.5 * FIXED_DT);
        assert_eq!(world.tick_count, 2);
        assert!(world.accumulator < FIXED_DT);
    }

    #[test]
    fn huge_render_delta_is_capped() {
        let mut world = world_with_car();
        world.step(10.0);
        assert_eq!(world.tick_count, MAX_SUBSTEPS as u64);
        assert_eq!(world.accumulator, 0.0);
    }

    #[test]
    fn throttle_moves_the_car_forward() {
        let mut world = world_with_car();
        world.vehicles[0].input.throttle = 1.0;
        for _ in 0..240 {
            world.fixed_step(FIXED_DT);
        }
        assert!(world.vehicles[0].forward_speed() > 1.0);
        assert!(world.vehicles[0].body.position.z > 0.0);
    }

    #[test]
    fn telemetry_tracks_each_vehicle() {
        let mut world = world_with_car();
        world.create_vehicle(&VehicleConfig::default()).unwrap();
        world.vehicles[1].body.position.x = 20.0;
        world.fixed_step(FIXED_DT);
        assert_eq!(world.telemetry.len(), 2);
    }

    #[test]
    fn car_stays_on_the_ground() {
        let mut world = world_with_car();
        for _ in 0..600 {
            world.fixed_step(FIXED_DT);
        }
        assert!((world.vehicles[0].body.position.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn idle_car_barely_moves() {
        let mut world = world_with_car();
        for _ in 0..600 {
            world.fixed_step(FIXED_DT);
        }
        let v = &world.vehicles[0];
        assert!(v.speed() < 0.1);
        assert!(v.position().xz().norm() < 0.5);
        assert!((v.rpm() - v.engine.idle_rpm).abs() < 50.0);
    }

    #[test]
    fn reset_restores_world_state() {
        let mut world = world_with_car();
        world.vehicles[0].input.throttle = 1.0;
        world.step(1.0);
        world.weather.set_wind(1.0, 0.0, 20.0);
        world.reset();
        assert_eq!(world.tick_count, 0);
        assert_eq!(world.accumulator, 0.0);
        assert_eq!(world.weather.wind_speed, 0.0);
        assert_eq!(world.vehicles[0].speed(), 0.0);
    }
}
