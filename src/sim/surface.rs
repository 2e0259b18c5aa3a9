//! Surface descriptors: per-surface friction and Pacejka curve multipliers.

/// One road surface. `b`, `c`, `d`, `e` scale the base tire curve constants;
/// `friction` bounds the friction circle (`load * friction`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub name: &'static str,
    pub friction: f32,
    pub roughness: f32,
    pub dust: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    /// m/s above which a wheel hydroplanes (puddles only).
    pub hydroplane_speed: Option<f32>,
}

pub const ASPHALT: Surface = Surface {
    name: "asphalt",
    friction: 1.0,
    roughness: 0.8,
    dust: 0.0,
    b: 1.0,
    c: 1.0,
    d: 1.0,
    e: 1.0,
    hydroplane_speed: None,
};

pub const WET_ASPHALT: Surface = Surface {
    name: "wet_asphalt",
    friction: 0.7,
    roughness: 0.6,
    dust: 0.0,
    b: 0.85,
    c: 0.95,
    d: 0.7,
    e: 1.1,
    hydroplane_speed: None,
};

pub const DIRT: Surface = Surface {
    name: "dirt",
    friction: 0.6,
    roughness: 1.0,
    dust: 0.8,
    b: 0.7,
    c: 0.8,
    d: 0.6,
    e: 0.9,
    hydroplane_speed: None,
};

pub const ICE: Surface = Surface {
    name: "ice",
    friction: 0.15,
    roughness: 0.2,
    dust: 0.0,
    b: 0.4,
    c: 0.5,
    d: 0.15,
    e: 1.2,
    hydroplane_speed: None,
};

pub const PUDDLE: Surface = Surface {
    name: "puddle",
    friction: 0.3,
    roughness: 0.1,
    dust: 0.0,
    b: 0.5,
    c: 0.6,
    d: 0.3,
    e: 1.0,
    hydroplane_speed: Some(60.0),
};

impl Surface {
    pub fn by_name(name: &str) -> Surface {
        match name {
            "wet_asphalt" => WET_ASPHALT,
            "dirt" => DIRT,
            "ice" => ICE,
            "puddle" => PUDDLE,
            _ => ASPHALT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_falls_back_to_asphalt() {
        assert_eq!(Surface::by_name("ice"), ICE);
        assert_eq!(Surface::by_name("lava"), ASPHALT);
    }
}
