//! Scalar helpers + heading-frame basis vectors shared across the sim.

use nalgebra::Vector3;

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Monotone key → value table with linear interpolation between keys and
/// clamped extrapolation at both ends. Keys must be strictly ascending
/// (validated at vehicle construction).
#[derive(Debug, Clone)]
pub struct LookupTable {
    pub keys: Vec<f32>,
    pub values: Vec<f32>,
}

impl LookupTable {
    pub fn new(keys: Vec<f32>, values: Vec<f32>) -> Self {
        Self { keys, values }
    }

    pub fn is_monotonic(&self) -> bool {
        !self.keys.is_empty()
            && self.keys.len() == self.values.len()
            && self.keys.windows(2).all(|w| w[0] < w[1])
    }

    pub fn sample(&self, input: f32) -> f32 {
        let keys = &self.keys;
        let values = &self.values;
        if input <= keys[0] {
            return values[0];
        }
        if input >= keys[keys.len() - 1] {
            return values[values.len() - 1];
        }
        for i in 0..keys.len() - 1 {
            if input >= keys[i] && input <= keys[i + 1] {
                let t = (input - keys[i]) / (keys[i + 1] - keys[i]);
                return lerp(values[i], values[i + 1], t);
            }
        }
        values[values.len() - 1]
    }
}

/// Forward direction for a yaw-only heading: heading 0 faces +Z.
#[inline]
pub fn heading_forward(heading: f32) -> Vector3<f32> {
    Vector3::new(heading.sin(), 0.0, heading.cos())
}

/// Right direction for a yaw-only heading (right-handed with +Y up).
#[inline]
pub fn heading_right(heading: f32) -> Vector3<f32> {
    Vector3::new(heading.cos(), 0.0, -heading.sin())
}

/// Rotate a vector around world +Y by `angle` radians.
#[inline]
pub fn rotate_y(v: Vector3<f32>, angle: f32) -> Vector3<f32> {
    let (sin, cos) = angle.sin_cos();
    Vector3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

/// Normalize, or return the fallback when the vector is degenerate.
#[inline]
pub fn normalize_or(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    let n = v.norm();
    if n > 1e-8 { v / n } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table_interpolates_and_clamps() {
        let table = LookupTable::new(vec![0.0, 10.0, 20.0], vec![1.0, 3.0, 2.0]);
        assert!(table.is_monotonic());
        assert_eq!(table.sample(-5.0), 1.0);
        assert_eq!(table.sample(25.0), 2.0);
        assert!((table.sample(5.0) - 2.0).abs() < 1e-6);
        assert!((table.sample(15.0) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn lookup_table_rejects_unsorted_keys() {
        let table = LookupTable::new(vec![0.0, 10.0, 10.0], vec![1.0, 2.0, 3.0]);
        assert!(!table.is_monotonic());
    }

    #[test]
    fn heading_basis_is_orthonormal() {
        for h in [0.0, 0.7, -2.1, 3.5] {
            let fwd = heading_forward(h);
            let right = heading_right(h);
            assert!((fwd.norm() - 1.0).abs() < 1e-6);
            assert!(fwd.dot(&right).abs() < 1e-6);
        }
    }

    #[test]
    fn rotate_y_matches_heading_forward() {
        let fwd = rotate_y(Vector3::new(0.0, 0.0, 1.0), 0.9);
        let expect = heading_forward(0.9);
        assert!((fwd - expect).norm() < 1e-6);
    }
}
