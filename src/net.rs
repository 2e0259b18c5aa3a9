use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{info, warn};
use uuid::Uuid;

use crate::sim::{InputState, PhysicsWorld, VehicleConfig};
use crate::spawn::SpawnManager;
use crate::state::SharedGameState;

fn parse_input(text: &str) -> Option<(String, serde_json::Value)> {
    let v = serde_json::from_str::<serde_json::Value>(text).ok()?;
    let msg_type = v.get("type")?.as_str()?.to_string();
    Some((msg_type, v))
}

fn input_from_json(v: &serde_json::Value) -> InputState {
    InputState {
        throttle: v.get("throttle").and_then(|x| x.as_f64()).unwrap_or(0.0) as f32,
        brake: v.get("brake").and_then(|x| x.as_f64()).unwrap_or(0.0) as f32,
        steer: v.get("steer").and_then(|x| x.as_f64()).unwrap_or(0.0) as f32,
        handbrake: v.get("handbrake").and_then(|x| x.as_bool()).unwrap_or(false),
        nitro: v.get("nitro").and_then(|x| x.as_bool()).unwrap_or(false),
    }
}

pub async fn start_websocket_server(
    state: Arc<Mutex<SharedGameState>>,
    world: Arc<Mutex<PhysicsWorld>>,
    spawns: Arc<Mutex<SpawnManager>>,
    bind_addr: String,
) {
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(%bind_addr, error = %e, "failed to bind websocket port");
            return;
        }
    };

    info!(%bind_addr, "websocket listening");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(_) => continue,
        };
        let state = Arc::clone(&state);
        let world = Arc::clone(&world);
        let spawns = Arc::clone(&spawns);

        tokio::spawn(async move {
            let ws = match accept_async(raw).await {
                Ok(ws) => ws,
                Err(_) => return,
            };
            let (mut write, mut read) = ws.split();

            // -------------------------------
            // 1) Outgoing message channel
            // -------------------------------
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();

            tokio::spawn(async move {
                while let Some(msg) = rx.recv().await {
                    if write.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
            });

            // -------------------------------
            // 2) Allocate spawn + vehicle
            // -------------------------------
            let player_id = Uuid::new_v4().to_string();
            let spawn = spawns.lock().await.allocate_spawn(&player_id);

            // lock order is world then state everywhere, matching the tick loop
            {
                let mut sim = world.lock().await;
                let mut game = state.lock().await;

                let vehicle_index = match game.free_vehicles.pop() {
                    Some(idx) => {
                        let [x, y, z] = spawn.position;
                        sim.vehicles[idx].reset(x, y, z);
                        idx
                    }
                    None => match sim.create_vehicle(&VehicleConfig::default()) {
                        Ok(idx) => {
                            let [x, y, z] = spawn.position;
                            sim.vehicles[idx].reset(x, y, z);
                            idx
                        }
                        Err(e) => {
                            warn!(error = %e, "vehicle config rejected");
                            return;
                        }
                    },
                };

                game.register_client(&player_id, tx.clone());
                game.add_player(&player_id, vehicle_index, spawn.color);
            }

            info!(%player_id, ?peer, "player connected");

            let welcome = format!(
                r#"{{"type":"welcome","id":"{}","color":{},"x":{},"z":{}}}"#,
                player_id, spawn.color.0, spawn.position[0], spawn.position[2],
            );
            let _ = tx.send(welcome);

            // -------------------------------
            // 3) Receive loop
            // -------------------------------
            while let Some(msg) = read.next().await {
                let msg = match msg {
                    Ok(m) => m,
                    Err(_) => break,
                };
                if !msg.is_text() {
                    continue;
                }
                let text = match msg.to_text() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                let (msg_type, value) = match parse_input(text) {
                    Some(parsed) => parsed,
                    None => continue,
                };

                match msg_type.as_str() {
                    "ping" => {
                        let _ = tx.send(r#"{"type":"pong"}"#.into());
                    }
                    "input" => {
                        let input = input_from_json(&value);
                        state.lock().await.update_input(&player_id, input);
                    }
                    "reset" => {
                        let idx = {
                            let game = state.lock().await;
                            game.players.get(&player_id).map(|p| p.vehicle_index)
                        };
                        if let Some(idx) = idx {
                            let [x, y, z] = spawn.position;
                            world.lock().await.vehicles[idx].reset(x, y, z);
                        }
                    }
                    _ => {}
                }
            }

            info!(%player_id, "player disconnected");
            state.lock().await.remove_player(&player_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_messages_parse_with_defaults() {
        let (msg_type, v) =
            parse_input(r#"{"type":"input","throttle":0.9,"steer":-0.4,"handbrake":true}"#)
                .unwrap();
        assert_eq!(msg_type, "input");
        let input = input_from_json(&v);
        assert!((input.throttle - 0.9).abs() < 1e-6);
        assert!((input.steer + 0.4).abs() < 1e-6);
        assert!(input.handbrake);
        assert!(!input.nitro);
        assert_eq!(input.brake, 0.0);
    }

    #[test]
    fn malformed_messages_are_dropped() {
        assert!(parse_input("not json").is_none());
        assert!(parse_input(r#"{"throttle":1}"#).is_none());
    }
}
