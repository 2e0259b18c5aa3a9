use rand::Rng;

// ---------------------------------------------
// CAR COLOR PALETTE
// ---------------------------------------------
const CAR_COLORS: [u32; 10] = [
    0xe63946, 0x457b9d, 0xf4a261, 0x2a9d8f, 0xe76f51,
    0x6a4c93, 0x1982c4, 0xffca3a, 0xff595e, 0x8ac926,
];

/// Lateral spacing between spawn slots along the plaza's east-west road.
const SLOT_SPACING: f32 = 6.0;
const SPAWN_Y: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct CarColor(pub u32);

// ---------------------------------------------
// SPAWN RESULT RETURNED TO STATE + NET
// ---------------------------------------------
#[derive(Debug, Clone)]
pub struct PlayerSpawnInfo {
    pub player_id: String,
    pub position: [f32; 3],
    pub heading: f32,
    pub color: CarColor,
}

// ---------------------------------------------
// SPAWN MANAGER
// ---------------------------------------------
/// Hands out spawn slots fanned out across the central plaza, plus a car
/// color. Colors cycle through the palette; the small positional jitter is
/// host-side only and never touches the sim after spawn.
#[derive(Debug)]
pub struct SpawnManager {
    next_slot: usize,
}

impl SpawnManager {
    pub fn new() -> Self {
        Self { next_slot: 0 }
    }

    pub fn allocate_spawn(&mut self, player_id: &str) -> PlayerSpawnInfo {
        let slot = self.next_slot;
        self.next_slot += 1;

        let color = CarColor(CAR_COLORS[slot % CAR_COLORS.len()]);

        // alternate left/right of the origin, walking outward
        let lane = (slot as i32 + 1) / 2;
        let side = if slot % 2 == 0 { 1.0 } else { -1.0 };
        let mut rng = rand::thread_rng();
        let jitter: f32 = rng.gen_range(-1.0..1.0);

        PlayerSpawnInfo {
            player_id: player_id.to_string(),
            position: [lane as f32 * SLOT_SPACING * side + jitter, SPAWN_Y, 0.0],
            heading: 0.0,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_fan_out_without_overlap() {
        let mut mgr = SpawnManager::new();
        let a = mgr.allocate_spawn("a");
        let b = mgr.allocate_spawn("b");
        let c = mgr.allocate_spawn("c");
        // first slot at the origin, later slots on alternating sides
        assert!(a.position[0].abs() < SLOT_SPACING / 2.0 + 1.0);
        assert!((b.position[0] - c.position[0]).abs() > SLOT_SPACING - 2.0);
    }

    #[test]
    fn colors_cycle_through_the_palette() {
        let mut mgr = SpawnManager::new();
        let first = mgr.allocate_spawn("a").color.0;
        for _ in 0..CAR_COLORS.len() - 1 {
            mgr.allocate_spawn("x");
        }
        let wrapped = mgr.allocate_spawn("b").color.0;
        assert_eq!(first, wrapped);
    }
}
