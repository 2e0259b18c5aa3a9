use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant};
use tracing::info;

use neondrive_physics::sim::{PhysicsWorld, WorldConfig};
use neondrive_physics::spawn::SpawnManager;
use neondrive_physics::state::SharedGameState;

const TICK_RATE_HZ: u64 = 60;
/// Broadcast every Nth tick: 60 Hz sim, 20 Hz state snapshots.
const BROADCAST_EVERY: u64 = 3;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("starting physics host");

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let world = Arc::new(Mutex::new(PhysicsWorld::new(&WorldConfig::default())));
    let spawns = Arc::new(Mutex::new(SpawnManager::new()));

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9001".to_string());

    tokio::spawn(neondrive_physics::net::start_websocket_server(
        Arc::clone(&state),
        Arc::clone(&world),
        Arc::clone(&spawns),
        bind_addr,
    ));

    let mut ticker = interval(Duration::from_micros(1_000_000 / TICK_RATE_HZ));
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        let mut sim = world.lock().await;
        let mut game = state.lock().await;

        game.apply_inputs(&mut sim);
        sim.step(delta);

        game.tick += 1;
        if game.tick % BROADCAST_EVERY == 0 {
            game.broadcast_snapshot(&sim);
        }
    }
}
