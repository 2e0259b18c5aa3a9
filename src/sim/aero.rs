//! Drag, downforce, and slipstream detection.

use nalgebra::Vector3;

const AIR_DENSITY: f32 = 1.225;
const SLIPSTREAM_MIN_DISTANCE: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct AeroConfig {
    pub drag_coefficient: f32,
    pub frontal_area: f32, // m^2
    pub lift_coefficient: f32,
    pub downforce_area_front: f32,
    pub downforce_area_rear: f32,
    pub slipstream_cone_angle: f32, // rad
    pub slipstream_max_distance: f32,
    pub slipstream_reduction: f32, // fraction of drag removed
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self {
            drag_coefficient: 0.32,
            frontal_area: 2.2,
            lift_coefficient: -0.45,
            downforce_area_front: 0.3,
            downforce_area_rear: 0.5,
            slipstream_cone_angle: 0.35,
            slipstream_max_distance: 30.0,
            slipstream_reduction: 0.40,
        }
    }
}

/// Downforce split across the axles, N.
#[derive(Debug, Clone, Copy)]
pub struct Downforce {
    pub front: f32,
    pub rear: f32,
}

#[derive(Debug, Clone)]
pub struct Aerodynamics {
    pub drag_coefficient: f32,
    pub frontal_area: f32,
    pub lift_coefficient: f32,
    pub downforce_area_front: f32,
    pub downforce_area_rear: f32,
    pub slipstream_cone_angle: f32,
    pub slipstream_max_distance: f32,
    pub slipstream_reduction: f32,

    pub in_slipstream: bool,
}

impl Aerodynamics {
    pub fn new(config: &AeroConfig) -> Self {
        Self {
            drag_coefficient: config.drag_coefficient,
            frontal_area: config.frontal_area,
            lift_coefficient: config.lift_coefficient,
            downforce_area_front: config.downforce_area_front,
            downforce_area_rear: config.downforce_area_rear,
            slipstream_cone_angle: config.slipstream_cone_angle,
            slipstream_max_distance: config.slipstream_max_distance,
            slipstream_reduction: config.slipstream_reduction,
            in_slipstream: false,
        }
    }

    /// Quadratic drag opposing velocity, reduced while tucked in another
    /// car's slipstream.
    pub fn drag(&self, velocity: &Vector3<f32>) -> Vector3<f32> {
        let speed = velocity.norm();
        if speed < 0.5 {
            return Vector3::zeros();
        }

        let magnitude =
            0.5 * AIR_DENSITY * self.drag_coefficient * self.frontal_area * speed * speed;
        let factor = if self.in_slipstream {
            1.0 - self.slipstream_reduction
        } else {
            1.0
        };
        -velocity / speed * magnitude * factor
    }

    pub fn downforce(&self, speed: f32) -> Downforce {
        let q = 0.5 * AIR_DENSITY * self.lift_coefficient.abs() * speed * speed;
        Downforce {
            front: q * self.downforce_area_front,
            rear: q * self.downforce_area_rear,
        }
    }

    /// Slipstream check against every other vehicle position: inside the
    /// forward cone and the 3..max distance window of a car ahead.
    pub fn check_slipstream(
        &mut self,
        my_position: &Vector3<f32>,
        my_forward: &Vector3<f32>,
        others: &[Vector3<f32>],
    ) {
        self.in_slipstream = false;
        let cone_cos = self.slipstream_cone_angle.cos();

        for other in others {
            let to_other = other - my_position;
            let dist = to_other.norm();
            if dist < SLIPSTREAM_MIN_DISTANCE || dist > self.slipstream_max_distance {
                continue;
            }
            if (to_other / dist).dot(my_forward) > cone_cos {
                self.in_slipstream = true;
                return;
            }
        }
    }

    pub fn reset(&mut self) {
        self.in_slipstream = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_opposes_velocity_quadratically() {
        let aero = Aerodynamics::new(&AeroConfig::default());
        let slow = aero.drag(&Vector3::new(0.0, 0.0, 10.0));
        let fast = aero.drag(&Vector3::new(0.0, 0.0, 20.0));
        assert!(slow.z < 0.0);
        assert!((fast.z / slow.z - 4.0).abs() < 0.01);
    }

    #[test]
    fn no_drag_near_rest() {
        let aero = Aerodynamics::new(&AeroConfig::default());
        assert_eq!(aero.drag(&Vector3::new(0.1, 0.0, 0.2)), Vector3::zeros());
    }

    #[test]
    fn slipstream_cuts_drag() {
        let mut aero = Aerodynamics::new(&AeroConfig::default());
        let v = Vector3::new(0.0, 0.0, 30.0);
        let clean = aero.drag(&v).norm();
        aero.in_slipstream = true;
        let tucked = aero.drag(&v).norm();
        assert!((tucked / clean - (1.0 - aero.slipstream_reduction)).abs() < 1e-4);
    }

    #[test]
    fn rear_downforce_exceeds_front() {
        let aero = Aerodynamics::new(&AeroConfig::default());
        let df = aero.downforce(40.0);
        assert!(df.rear > df.front);
        assert!(df.front > 0.0);
    }

    #[test]
    fn slipstream_needs_a_car_ahead_in_the_cone() {
        let mut aero = Aerodynamics::new(&AeroConfig::default());
        let me = Vector3::zeros();
        let fwd = Vector3::new(0.0, 0.0, 1.0);

        aero.check_slipstream(&me, &fwd, &[Vector3::new(0.0, 0.0, 15.0)]);
        assert!(aero.in_slipstream);

        // behind me
        aero.check_slipstream(&me, &fwd, &[Vector3::new(0.0, 0.0, -15.0)]);
        assert!(!aero.in_slipstream);

        // too close
        aero.check_slipstream(&me, &fwd, &[Vector3::new(0.0, 0.0, 2.0)]);
        assert!(!aero.in_slipstream);

        // too far
        aero.check_slipstream(&me, &fwd, &[Vector3::new(0.0, 0.0, 45.0)]);
        assert!(!aero.in_slipstream);

        // well off-axis
        aero.check_slipstream(&me, &fwd, &[Vector3::new(15.0, 0.0, 5.0)]);
        assert!(!aero.in_slipstream);
    }
}
