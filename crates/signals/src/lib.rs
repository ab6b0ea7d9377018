//! Simulated environment source.
//!
//! Stands in for real sensor/location/health integrations: readings are
//! constants, only the aggregation-facing behavior (monitoring lifecycle,
//! point-in-time snapshots, failure when stopped) is real.

use async_trait::async_trait;
use chrono::Utc;
use reverie_core::environment::{
    Activity, DeviceState, EnvironmentSnapshot, EnvironmentSource, GeoLocation, HealthMetrics,
    NetworkType, ThermalState,
};
use reverie_core::error::SensorError;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// An environment source that returns a fixed plausible snapshot while
/// monitoring is active and fails with `NotMonitoring` once stopped.
pub struct SimulatedEnvironmentSource {
    monitoring: AtomicBool,
}

impl SimulatedEnvironmentSource {
    /// Create a source with monitoring stopped.
    pub fn new() -> Self {
        Self {
            monitoring: AtomicBool::new(false),
        }
    }

    /// Create a source that is already monitoring.
    pub fn started() -> Self {
        Self {
            monitoring: AtomicBool::new(true),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedEnvironmentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnvironmentSource for SimulatedEnvironmentSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn current_snapshot(&self) -> Result<EnvironmentSnapshot, SensorError> {
        if !self.is_monitoring() {
            return Err(SensorError::NotMonitoring);
        }

        Ok(EnvironmentSnapshot {
            taken_at: Utc::now(),
            location: Some(GeoLocation {
                latitude: 37.7749,
                longitude: -122.4194,
                accuracy_m: 25.0,
                place_name: Some("Home".into()),
            }),
            activity: Some(Activity::Stationary),
            health: Some(HealthMetrics {
                heart_rate_bpm: Some(64.0),
                step_count: Some(5200),
                distance_m: Some(3800.0),
                active_energy_kcal: Some(310.0),
                stand_hours: Some(9),
            }),
            device: Some(DeviceState {
                battery_level: 0.82,
                charging: false,
                low_power_mode: false,
                thermal: ThermalState::Nominal,
                network: NetworkType::Wifi,
            }),
        })
    }

    async fn start_monitoring(&self) -> Result<(), SensorError> {
        self.monitoring.store(true, Ordering::SeqCst);
        debug!(source = self.name(), "environment monitoring started");
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<(), SensorError> {
        self.monitoring.store(false, Ordering::SeqCst);
        debug!(source = self.name(), "environment monitoring stopped");
        Ok(())
    }
}
