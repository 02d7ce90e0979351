use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use car_physics::{CarPhysics, CarSnapshot, ConfigError, Controls, RollingHills, Terrain, VehicleConfig, vec3};

/// Everything the server pushes to a client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Welcome { session_id: Uuid },
    Pong,
    Snapshot { tick: u64, cars: Vec<CarEntry> },
}

#[derive(Debug, Serialize)]
pub struct CarEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub car: CarSnapshot,
}

struct Session {
    car: CarPhysics,
    slot: usize,
    tx: UnboundedSender<String>,
}

/// One car per connected client, all driving over the same hills.
pub struct DriveServer {
    pub tick: u64,
    config: VehicleConfig,
    terrain: RollingHills,
    sessions: HashMap<Uuid, Session>,
    next_slot: usize,
}

impl DriveServer {
    pub fn new(config: VehicleConfig, terrain: RollingHills) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { tick: 0, config, terrain, sessions: HashMap::new(), next_slot: 0 })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Grid slot → spawn point on the flat pad, cars side by side along X.
    fn spawn_car(&self, slot: usize) -> Result<CarPhysics, ConfigError> {
        let x = ((slot % 4) as f32 - 1.5) * 4.0;
        let z = -((slot / 4) as f32) * 7.0;
        let y = self.terrain.height(x, z) + self.config.ride_height();
        CarPhysics::with_position(self.config.clone(), vec3(x, y, z), 0.0)
    }

    pub fn join(&mut self, tx: UnboundedSender<String>) -> Result<Uuid, ConfigError> {
        let id = Uuid::new_v4();
        let slot = self.next_slot;
        self.next_slot += 1;

        let car = self.spawn_car(slot)?;
        send(&tx, &ServerMessage::Welcome { session_id: id });
        self.sessions.insert(id, Session { car, slot, tx });

        info!(%id, slot, drivers = self.session_count(), "driver joined");
        Ok(id)
    }

    pub fn leave(&mut self, id: &Uuid) {
        if self.sessions.remove(id).is_some() {
            info!(%id, "driver left");
        }
    }

    pub fn set_input(&mut self, id: &Uuid, controls: Controls) {
        if let Some(s) = self.sessions.get_mut(id) {
            s.car.set_controls(controls);
        }
    }

    pub fn pong(&self, id: &Uuid) {
        if let Some(s) = self.sessions.get(id) {
            send(&s.tx, &ServerMessage::Pong);
        }
    }

    /// Respawn the session's car at its grid slot.
    pub fn reset(&mut self, id: &Uuid) -> Result<(), ConfigError> {
        let Some(slot) = self.sessions.get(id).map(|s| s.slot) else { return Ok(()) };
        let car = self.spawn_car(slot)?;
        if let Some(s) = self.sessions.get_mut(id) {
            s.car = car;
        }
        debug!(%id, "car reset");
        Ok(())
    }

    /// Advance every car by the real elapsed `dt` and broadcast a snapshot.
    pub fn tick(&mut self, dt: f32) {
        for s in self.sessions.values_mut() {
            s.car.update(dt, &self.terrain);
        }
        self.tick += 1;

        let cars = self
            .sessions
            .iter()
            .map(|(id, s)| CarEntry { id: *id, car: s.car.state() })
            .collect();
        let msg = ServerMessage::Snapshot { tick: self.tick, cars };

        match serde_json::to_string(&msg) {
            Ok(json) => {
                for s in self.sessions.values() {
                    let _ = s.tx.send(json.clone());
                }
            }
            Err(e) => warn!("snapshot serialization failed: {e}"),
        }
    }
}

fn send(tx: &UnboundedSender<String>, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => warn!("message serialization failed: {e}"),
    }
}
