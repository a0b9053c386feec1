//! TrafficSimulator - Synthetic Gate Activity
//!
//! ## Responsibilities
//!
//! - Periodic synthetic entries/exits for demo realism on the reception
//!   dashboard
//!
//! The simulator is an explicit task holding a store handle; it is started
//! and stopped by the role-change handler and never inspects the current
//! role itself.

use crate::gate_store::{GateStore, VehicleStatus};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

/// Tick period of the simulation timer
pub const TICK_PERIOD: Duration = Duration::from_secs(15);

/// Probability of a synthetic entry per tick
const ENTRY_PROBABILITY: f64 = 0.1;

/// Probability of a synthetic exit per tick
const EXIT_PROBABILITY: f64 = 0.1;

/// Synthetic event chosen for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimulatedEvent {
    Entry,
    Exit,
    None,
}

fn event_for_roll(roll: f64) -> SimulatedEvent {
    if roll < ENTRY_PROBABILITY {
        SimulatedEvent::Entry
    } else if roll > 1.0 - EXIT_PROBABILITY {
        SimulatedEvent::Exit
    } else {
        SimulatedEvent::None
    }
}

/// TrafficSimulator instance
pub struct TrafficSimulator {
    store: Arc<GateStore>,
    running: Arc<RwLock<bool>>,
}

impl TrafficSimulator {
    /// Create new TrafficSimulator
    pub fn new(store: Arc<GateStore>) -> Self {
        Self {
            store,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the simulation loop
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::debug!("Simulation already running");
                return;
            }
            *running = true;
        }

        tracing::info!(period_sec = TICK_PERIOD.as_secs(), "Starting traffic simulator");

        let store = self.store.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut ticker = interval(TICK_PERIOD);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                {
                    let is_running = running.read().await;
                    if !*is_running {
                        break;
                    }
                }

                Self::tick(&store).await;
            }

            tracing::info!("Traffic simulator stopped");
        });
    }

    /// Stop the simulation loop
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        if *running {
            *running = false;
            tracing::info!("Stopping traffic simulator");
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Roll once and maybe trigger a synthetic entry or exit
    async fn tick(store: &Arc<GateStore>) {
        let roll: f64 = rand::thread_rng().gen();

        match event_for_roll(roll) {
            SimulatedEvent::Entry => {
                let vehicles = store.vehicles().await;
                let view = store.gate_view().await;
                if view.current_capacity >= view.max_capacity {
                    return;
                }
                if let Some(vehicle) = vehicles
                    .iter()
                    .find(|v| v.status == VehicleStatus::Registered)
                {
                    tracing::debug!(plate = %vehicle.plate, "Simulated entry");
                    store.enter_gate(vehicle.id).await;
                }
            }
            SimulatedEvent::Exit => {
                let vehicles = store.vehicles().await;
                let inside: Vec<_> = vehicles
                    .iter()
                    .filter(|v| v.status == VehicleStatus::Inside)
                    .collect();
                if inside.is_empty() {
                    return;
                }
                let pick = inside[rand::thread_rng().gen_range(0..inside.len())];
                tracing::debug!(plate = %pick.plate, "Simulated exit");
                store.exit_gate(pick.id).await;
            }
            SimulatedEvent::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime_hub::RealtimeHub;

    #[test]
    fn test_event_roll_boundaries() {
        assert_eq!(event_for_roll(0.0), SimulatedEvent::Entry);
        assert_eq!(event_for_roll(0.05), SimulatedEvent::Entry);
        assert_eq!(event_for_roll(0.1), SimulatedEvent::None);
        assert_eq!(event_for_roll(0.5), SimulatedEvent::None);
        assert_eq!(event_for_roll(0.9), SimulatedEvent::None);
        assert_eq!(event_for_roll(0.95), SimulatedEvent::Exit);
        assert_eq!(event_for_roll(1.0), SimulatedEvent::Exit);
    }

    #[tokio::test]
    async fn test_start_stop_is_idempotent() {
        let hub = Arc::new(RealtimeHub::new());
        let store = Arc::new(GateStore::new(hub));
        let simulator = TrafficSimulator::new(store);

        assert!(!simulator.is_running().await);
        simulator.start().await;
        simulator.start().await;
        assert!(simulator.is_running().await);

        simulator.stop().await;
        simulator.stop().await;
        assert!(!simulator.is_running().await);
    }
}
