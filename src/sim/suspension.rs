//! Per-wheel spring-damper with a cubic-ish bump stop, plus the anti-roll
//! bar coupling that redistributes load across an axle.

const BUMP_STOP_STIFFNESS: f32 = 50_000.0;
const BUMP_STOP_ZONE: f32 = 0.02; // m of travel where the bump stop engages

#[derive(Debug, Clone)]
pub struct SuspensionConfig {
    pub spring_rate: f32, // N/m
    pub damping: f32,     // N*s/m
    pub max_travel: f32,  // m
    pub rest_length: f32, // m
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            spring_rate: 35_000.0,
            damping: 4500.0,
            max_travel: 0.15,
            rest_length: 0.3,
        }
    }
}

/// Invariant: |compression| <= max_travel after every update.
#[derive(Debug, Clone)]
pub struct SuspensionUnit {
    pub spring_rate: f32,
    pub damping: f32,
    pub max_travel: f32,
    pub rest_length: f32,

    pub compression: f32, // signed, m
    pub velocity: f32,    // m/s
    pub force: f32,       // N, last computed
    pub bottomed_out: bool,
}

impl SuspensionUnit {
    pub fn new(config: &SuspensionConfig) -> Self {
        Self {
            spring_rate: config.spring_rate,
            damping: config.damping,
            max_travel: config.max_travel,
            rest_length: config.rest_length,
            compression: 0.0,
            velocity: 0.0,
            force: 0.0,
            bottomed_out: false,
        }
    }

    /// Track the load-implied compression target and return the resulting
    /// spring + damper force. Past `max_travel - BUMP_STOP_ZONE` a quadratic
    /// bump-stop penalty stacks on top of the linear spring.
    pub fn update(&mut self, wheel_load: f32, dt: f32) -> f32 {
        let target = ((wheel_load / self.spring_rate) * 0.05)
            .clamp(-self.max_travel, self.max_travel);

        let prev = self.compression;
        self.velocity = (target - prev) / dt.max(0.0001);
        self.compression = target;

        let mut spring_force = self.spring_rate * self.compression;
        let damper_force = self.damping * self.velocity;

        let travel = self.compression.abs();
        let travel_limit = self.max_travel - BUMP_STOP_ZONE;
        if travel > travel_limit {
            let penetration = travel - travel_limit;
            spring_force += BUMP_STOP_STIFFNESS * penetration * penetration * self.compression.signum();
        }

        self.bottomed_out = travel >= self.max_travel * 0.95;
        self.force = spring_force + damper_force;
        self.force
    }

    /// Compression as a 0..1 fraction of max travel, for telemetry.
    pub fn compression01(&self) -> f32 {
        (self.compression.abs() / self.max_travel).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.compression = 0.0;
        self.velocity = 0.0;
        self.force = 0.0;
        self.bottomed_out = false;
    }
}

/// Couples left/right wheels on one axle: transfers load proportional to
/// the compression difference, resisting body roll. Never adds net load.
#[derive(Debug, Clone)]
pub struct AntiRollBar {
    pub stiffness: f32, // N/m
}

#[derive(Debug, Clone, Copy)]
pub struct ArbForces {
    pub left: f32,
    pub right: f32,
}

impl AntiRollBar {
    pub fn new(stiffness: f32) -> Self {
        Self { stiffness }
    }

    pub fn compute(&self, left_compression: f32, right_compression: f32) -> ArbForces {
        let force = self.stiffness * (left_compression - right_compression);
        ArbForces {
            left: -force,
            right: force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bump_stop_engages_near_limit() {
        let cfg = SuspensionConfig::default();
        let mut unit = SuspensionUnit::new(&cfg);
        // load high enough to push compression into the bump zone
        let linear_only = cfg.spring_rate * cfg.max_travel;
        unit.update(200_000.0, 1.0 / 120.0);
        assert!(unit.bottomed_out);
        assert!(unit.force > linear_only);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut unit = SuspensionUnit::new(&SuspensionConfig::default());
        unit.update(8000.0, 1.0 / 120.0);
        assert!(unit.compression != 0.0);
        unit.reset();
        assert_eq!(unit.compression, 0.0);
        assert_eq!(unit.force, 0.0);
        assert!(!unit.bottomed_out);
    }

    #[test]
    fn arb_transfers_without_net_load() {
        let arb = AntiRollBar::new(12_000.0);
        let forces = arb.compute(0.08, 0.02);
        assert!((forces.left + forces.right).abs() < 1e-6);
        assert!(forces.right > 0.0); // load moves toward the less-compressed side
    }

    proptest! {
        #[test]
        fn compression_never_exceeds_travel(
            loads in proptest::collection::vec(-50_000.0f32..200_000.0, 1..50),
        ) {
            let cfg = SuspensionConfig::default();
            let mut unit = SuspensionUnit::new(&cfg);
            for load in loads {
                unit.update(load, 1.0 / 120.0);
                prop_assert!(unit.compression.abs() <= cfg.max_travel + 1e-6);
                prop_assert!(unit.compression01() <= 1.0);
            }
        }
    }
}
