//! Weather state: rain/snow surface override, puddles, and a constant wind
//! force. Queried per wheel contact each tick.

use nalgebra::Vector3;

use super::math;
use super::surface::{self, Surface};

const AIR_DENSITY: f32 = 1.225;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Clear,
    Rain,
    Snow,
}

#[derive(Debug, Clone, Copy)]
pub struct Puddle {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    pub depth: f32,
}

#[derive(Debug, Clone)]
pub struct Weather {
    pub kind: WeatherKind,
    pub intensity: f32, // 0..1
    pub wind_direction: Vector3<f32>,
    pub wind_speed: f32, // m/s
    pub puddles: Vec<Puddle>,
}

impl Default for Weather {
    fn default() -> Self {
        Self::new()
    }
}

impl Weather {
    pub fn new() -> Self {
        Self {
            kind: WeatherKind::Clear,
            intensity: 0.0,
            wind_direction: Vector3::new(1.0, 0.0, 0.0),
            wind_speed: 0.0,
            puddles: Vec::new(),
        }
    }

    pub fn set_weather(&mut self, kind: WeatherKind, intensity: f32) {
        self.kind = kind;
        self.intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn set_wind(&mut self, dir_x: f32, dir_z: f32, speed: f32) {
        self.wind_direction = math::normalize_or(
            Vector3::new(dir_x, 0.0, dir_z),
            Vector3::new(1.0, 0.0, 0.0),
        );
        self.wind_speed = speed;
    }

    pub fn add_puddle(&mut self, x: f32, z: f32, radius: f32, depth: f32) {
        self.puddles.push(Puddle { x, z, radius, depth });
    }

    pub fn clear_puddles(&mut self) {
        self.puddles.clear();
    }

    /// Effective surface under a wheel contact. Puddles win over the
    /// weather-wide surface; clear weather is always asphalt.
    pub fn surface_at(&self, world_x: f32, world_z: f32) -> Surface {
        if self.kind == WeatherKind::Clear {
            return surface::ASPHALT;
        }
        for p in &self.puddles {
            let dx = world_x - p.x;
            let dz = world_z - p.z;
            if dx * dx + dz * dz < p.radius * p.radius {
                return surface::PUDDLE;
            }
        }
        match self.kind {
            WeatherKind::Rain => surface::WET_ASPHALT,
            WeatherKind::Snow => surface::ICE,
            WeatherKind::Clear => surface::ASPHALT,
        }
    }

    /// Constant wind push on the body. The 0.3 factor models the car only
    /// partially presenting its frontal area to the wind.
    pub fn wind_force(&self, frontal_area: f32) -> Vector3<f32> {
        if self.wind_speed < 0.1 {
            return Vector3::zeros();
        }
        let force = 0.5 * AIR_DENSITY * self.wind_speed * self.wind_speed * frontal_area * 0.3;
        self.wind_direction * force
    }

    pub fn check_hydroplane(&self, speed: f32, surface: &Surface) -> bool {
        match surface.hydroplane_speed {
            Some(threshold) => speed > threshold,
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.kind = WeatherKind::Clear;
        self.intensity = 0.0;
        self.wind_speed = 0.0;
        self.puddles.clear();
    }
}
