//! Zone-based damage accumulator. Impacts land in the front/rear/left/right
//! zone picked by the body-local contact normal; every gameplay penalty is a
//! pure function of the zone values, recomputed each tick and never stored.

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct DamageConfig {
    pub max_damage: f32,
    pub threshold: f32, // impact force below this is shrugged off
    pub scale: f32,
    pub enabled: bool,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            max_damage: 100.0,
            threshold: 5.0,
            scale: 0.15,
            enabled: true,
        }
    }
}

/// Per-zone damage, each clamped to [0, max_damage].
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DamageZones {
    pub front: f32,
    pub rear: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone)]
pub struct DamageModel {
    pub zones: DamageZones,
    pub max_damage: f32,
    pub threshold: f32,
    pub scale: f32,
    pub enabled: bool,
}

impl DamageModel {
    pub fn new(config: &DamageConfig) -> Self {
        Self {
            zones: DamageZones::default(),
            max_damage: config.max_damage,
            threshold: config.threshold,
            scale: config.scale,
            enabled: config.enabled,
        }
    }

    /// Register an impact. `normal_x`/`normal_z` are the contact normal in
    /// the body frame, pointing away from the wall: a head-on hit arrives
    /// with the normal facing rearward (-z) and lands in the front zone.
    pub fn apply_impact(&mut self, impact_force: f32, normal_x: f32, normal_z: f32) {
        if !self.enabled || impact_force < self.threshold {
            return;
        }

        let dmg = (impact_force - self.threshold) * self.scale;
        let max = self.max_damage;

        if normal_z < -0.5 {
            self.zones.front = (self.zones.front + dmg).clamp(0.0, max);
        }
        if normal_z > 0.5 {
            self.zones.rear = (self.zones.rear + dmg).clamp(0.0, max);
        }
        if normal_x > 0.5 {
            self.zones.left = (self.zones.left + dmg).clamp(0.0, max);
        }
        if normal_x < -0.5 {
            self.zones.right = (self.zones.right + dmg).clamp(0.0, max);
        }
    }

    /// Multiplier on steering authority: down to 0.6 at max front damage.
    pub fn steering_penalty(&self) -> f32 {
        1.0 - (self.zones.front / self.max_damage) * 0.4
    }

    /// Constant steer offset from left/right asymmetry, up to ±0.02 rad.
    pub fn alignment_drift(&self) -> f32 {
        let left = self.zones.left / self.max_damage;
        let right = self.zones.right / self.max_damage;
        (right - left) * 0.02
    }

    /// Multiplier on engine power: down to 0.65 at max rear damage.
    pub fn power_penalty(&self) -> f32 {
        1.0 - (self.zones.rear / self.max_damage) * 0.35
    }

    /// Multiplier on drag: up to 1.3 when fully wrecked.
    pub fn drag_penalty(&self) -> f32 {
        1.0 + self.total_damage01() * 0.3
    }

    /// Sideways pull from left/right asymmetry, as a fraction of speed.
    pub fn side_drag_bias(&self) -> f32 {
        let left = self.zones.left / self.max_damage;
        let right = self.zones.right / self.max_damage;
        (left - right) * 0.1
    }

    pub fn total_damage01(&self) -> f32 {
        (self.zones.front + self.zones.rear + self.zones.left + self.zones.right)
            / (self.max_damage * 4.0)
    }

    pub fn repair(&mut self) {
        self.zones = DamageZones::default();
    }

    pub fn reset(&mut self) {
        self.repair();
    }
}
