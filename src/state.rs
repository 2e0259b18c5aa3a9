use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

use crate::sim::{InputState, PhysicsWorld};
use crate::spawn::CarColor;

pub struct Player {
    pub id: String,
    pub vehicle_index: usize,
    pub color: CarColor,
    pub last_input: Option<InputState>,
}

/// Reduced per-player state sent to every client. Full telemetry stays on
/// the host; clients only need pose and a couple of effect flags.
#[derive(Serialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub x: f32,
    pub z: f32,
    pub heading: f32,
    pub speed: f32,
    pub steer: f32,
    pub drifting: bool,
}

#[derive(Serialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub tick: u64,
    pub players: Vec<PlayerSnapshot>,
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: HashMap<String, UnboundedSender<String>>,
    pub players: HashMap<String, Player>,
    /// Vehicle slots freed by disconnects, reused before growing the world.
    pub free_vehicles: Vec<usize>,
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: HashMap::new(),
            players: HashMap::new(),
            free_vehicles: Vec::new(),
        }
    }

    pub fn register_client(&mut self, id: &str, tx: UnboundedSender<String>) {
        self.clients.insert(id.to_string(), tx);
    }

    pub fn add_player(&mut self, id: &str, vehicle_index: usize, color: CarColor) {
        self.players.insert(
            id.to_string(),
            Player {
                id: id.to_string(),
                vehicle_index,
                color,
                last_input: None,
            },
        );
    }

    pub fn update_input(&mut self, id: &str, input: InputState) {
        if let Some(player) = self.players.get_mut(id) {
            player.last_input = Some(input);
        }
    }

    /// Drop the player and park their vehicle slot for reuse.
    pub fn remove_player(&mut self, id: &str) {
        self.clients.remove(id);
        if let Some(player) = self.players.remove(id) {
            self.free_vehicles.push(player.vehicle_index);
        }
    }

    /// Push the latest inputs into the sim before a step.
    pub fn apply_inputs(&self, world: &mut PhysicsWorld) {
        for player in self.players.values() {
            if let Some(input) = player.last_input {
                if let Some(vehicle) = world.vehicles.get_mut(player.vehicle_index) {
                    vehicle.set_input(input);
                }
            }
        }
    }

    /// Build and send the reduced snapshot of every player to all clients.
    pub fn broadcast_snapshot(&self, world: &PhysicsWorld) {
        let mut players = Vec::with_capacity(self.players.len());

        for player in self.players.values() {
            if let Some(vehicle) = world.vehicles.get(player.vehicle_index) {
                let pos = vehicle.position();
                players.push(PlayerSnapshot {
                    id: player.id.clone(),
                    x: pos.x,
                    z: pos.z,
                    heading: vehicle.heading(),
                    speed: vehicle.forward_speed(),
                    steer: vehicle.steering.current_angle,
                    drifting: vehicle.is_drifting,
                });
            }
        }

        let json = match serde_json::to_string(&Snapshot {
            msg_type: "state",
            tick: self.tick,
            players,
        }) {
            Ok(j) => j,
            Err(_) => return,
        };

        for tx in self.clients.values() {
            let _ = tx.send(json.clone());
        }
    }
}
