mod net;
mod server;
mod settings;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, interval};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use car_physics::{RollingHills, VehicleConfig};

use crate::net::start_websocket_server;
use crate::server::DriveServer;
use crate::settings::Settings;

fn vehicle_config(settings: &Settings) -> Result<VehicleConfig, car_physics::ConfigError> {
    if let Some(path) = &settings.vehicle_config {
        info!("loading vehicle config from {path}");
        return VehicleConfig::load(path);
    }
    match VehicleConfig::preset(&settings.vehicle_preset) {
        Some(cfg) => Ok(cfg),
        None => {
            warn!("unknown preset {:?}, using gt86", settings.vehicle_preset);
            Ok(VehicleConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;
    let config = vehicle_config(&settings)?;
    let terrain = RollingHills::random(&mut StdRng::seed_from_u64(settings.terrain_seed));

    info!(tick_ms = settings.tick_ms, "starting car physics server");
    let server = Arc::new(Mutex::new(DriveServer::new(config, terrain)?));

    let listener = tokio::spawn(start_websocket_server(Arc::clone(&server), settings.bind_address.clone()));

    // real elapsed time goes to the cars; their accumulators keep the 60 Hz step
    let mut ticker = interval(Duration::from_millis(settings.tick_ms.max(1)));
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        if listener.is_finished() {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        server.lock().await.tick(dt);
    }

    match listener.await? {
        Ok(()) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
