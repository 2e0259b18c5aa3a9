//! Arena boundary + city block contact queries. Pure: `test_collision`
//! returns contacts, the world applies the response.
//!
//! The city is a square grid of blocks on a fixed pitch (block + road).
//! Cells within one cell of the origin form an open plaza; cells past the
//! grid's half-size don't exist. Only the nearest cell is tested, which is
//! enough at the vehicle collision radius against a 40 m road gap.

use nalgebra::Vector3;

pub const BLOCK_SIZE: f32 = 140.0;
pub const ROAD_WIDTH: f32 = 40.0;
pub const GRID_PITCH: f32 = BLOCK_SIZE + ROAD_WIDTH;
pub const BLOCKS_PER_SIDE: i32 = 20;

pub const VEHICLE_RADIUS: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub normal: Vector3<f32>,
    pub penetration: f32,
    pub impact_speed: f32,
}

#[derive(Debug, Clone)]
pub struct CollisionConfig {
    /// Half-extent of the drivable square, m.
    pub world_bounds: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { world_bounds: 500.0 }
    }
}

#[derive(Debug, Clone)]
pub struct CollisionBridge {
    pub world_bounds: f32,
}

impl CollisionBridge {
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            world_bounds: config.world_bounds,
        }
    }

    pub fn test_collision(&self, position: &Vector3<f32>, radius: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();

        let half = self.world_bounds;
        if position.x.abs() > half {
            let nx = if position.x > 0.0 { -1.0 } else { 1.0 };
            contacts.push(Contact {
                normal: Vector3::new(nx, 0.0, 0.0),
                penetration: position.x.abs() - half,
                impact_speed: 0.0,
            });
        }
        if position.z.abs() > half {
            let nz = if position.z > 0.0 { -1.0 } else { 1.0 };
            contacts.push(Contact {
                normal: Vector3::new(0.0, 0.0, nz),
                penetration: position.z.abs() - half,
                impact_speed: 0.0,
            });
        }

        let grid_x = (position.x / GRID_PITCH).round() as i32;
        let grid_z = (position.z / GRID_PITCH).round() as i32;

        // central plaza is open
        if grid_x.abs() <= 1 && grid_z.abs() <= 1 {
            return contacts;
        }
        if grid_x.abs() > BLOCKS_PER_SIDE / 2 || grid_z.abs() > BLOCKS_PER_SIDE / 2 {
            return contacts;
        }

        let dx = position.x - grid_x as f32 * GRID_PITCH;
        let dz = position.z - grid_z as f32 * GRID_PITCH;
        let block_half = BLOCK_SIZE / 2.0 + radius;

        if dx.abs() < block_half && dz.abs() < block_half {
            let pen_x = block_half - dx.abs();
            let pen_z = block_half - dz.abs();

            // push out along the shallower axis; X on ties
            if pen_x <= pen_z {
                contacts.push(Contact {
                    normal: Vector3::new(dx.signum(), 0.0, 0.0),
                    penetration: pen_x,
                    impact_speed: 0.0,
                });
            } else {
                contacts.push(Contact {
                    normal: Vector3::new(0.0, 0.0, dz.signum()),
                    penetration: pen_z,
                    impact_speed: 0.0,
                });
            }
        }

        contacts
    }

    pub fn terrain_height(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }

    pub fn terrain_normal(&self, _x: f32, _z: f32) -> Vector3<f32> {
        Vector3::new(0.0, 1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> CollisionBridge {
        CollisionBridge::new(&CollisionConfig::default())
    }

    #[test]
    fn open_road_has_no_contacts() {
        let contacts = bridge().test_collision(&Vector3::new(GRID_PITCH / 2.0, 0.5, 0.0), 2.0);
        assert!(contacts.is_empty());
    }

    #[test]
    fn plaza_cells_are_open() {
        // dead center of a cell adjacent to origin would be inside a block
        // anywhere else
        let contacts = bridge().test_collision(&Vector3::new(GRID_PITCH, 0.5, 0.0), 2.0);
        assert!(contacts.is_empty());
    }

    #[test]
    fn boundary_plane_pushes_inward() {
        // z sits in the road gap between cell rows so only the plane fires
        let contacts = bridge().test_collision(&Vector3::new(510.0, 0.5, GRID_PITCH / 2.0), 2.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vector3::new(-1.0, 0.0, 0.0));
        assert!((contacts[0].penetration - 10.0).abs() < 1e-4);
    }

    #[test]
    fn corner_exit_reports_both_planes() {
        // far enough past the corner to clear the nearest block's footprint
        let contacts = bridge().test_collision(&Vector3::new(612.0, 0.5, -612.0), 2.0);
        assert_eq!(contacts.len(), 2);
    }

    #[test]
    fn block_contact_uses_min_penetration_axis() {
        // two cells out along X, just inside the block's +X face
        let block_x = 2.0 * GRID_PITCH;
        let pos = Vector3::new(block_x + BLOCK_SIZE / 2.0 + 1.0, 0.5, 3.0);
        let contacts = bridge().test_collision(&pos, 2.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vector3::new(1.0, 0.0, 0.0));
        assert!(contacts[0].penetration > 0.0);
    }

    #[test]
    fn cells_outside_grid_are_ignored_inside_bounds() {
        // bounds are tighter than the grid extent here, so just check a cell
        // index beyond blocksPerSide/2 produces no block contact
        let far = CollisionBridge::new(&CollisionConfig { world_bounds: 5000.0 });
        let pos = Vector3::new(11.0 * GRID_PITCH, 0.5, 0.0);
        assert!(far.test_collision(&pos, 2.0).is_empty());
    }

    #[test]
    fn terrain_is_flat() {
        let b = bridge();
        assert_eq!(b.terrain_height(123.0, -45.0), 0.0);
        assert_eq!(b.terrain_normal(123.0, -45.0), Vector3::new(0.0, 1.0, 0.0));
    }
}
