//! Environment snapshot types and the sensor-source contract.
//!
//! A snapshot is a point-in-time reading of device and surroundings
//! state. Every sub-group is optional; a snapshot with nothing present
//! still carries its capture timestamp.

use crate::error::SensorError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,

    /// Accuracy radius in meters
    pub accuracy_m: f64,

    /// Reverse-geocoded place name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

/// Coarse motion activity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Walking,
    Running,
    Cycling,
    Automotive,
    Stationary,
    Unknown,
}

impl Activity {
    /// Human-readable label used in packet rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Walking => "walking",
            Activity::Running => "running",
            Activity::Cycling => "cycling",
            Activity::Automotive => "automotive",
            Activity::Stationary => "stationary",
            Activity::Unknown => "unknown",
        }
    }
}

/// Health metrics, each independently optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_energy_kcal: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand_hours: Option<u32>,
}

impl HealthMetrics {
    /// True if at least one metric is present.
    pub fn has_any(&self) -> bool {
        self.heart_rate_bpm.is_some()
            || self.step_count.is_some()
            || self.distance_m.is_some()
            || self.active_energy_kcal.is_some()
            || self.stand_hours.is_some()
    }
}

/// Device thermal pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalState {
    Nominal,
    Fair,
    Serious,
    Critical,
}

/// Network connectivity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Wired,
    Offline,
}

/// Device power and connectivity state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceState {
    /// Battery level in 0.0–1.0
    pub battery_level: f32,
    pub charging: bool,
    pub low_power_mode: bool,
    pub thermal: ThermalState,
    pub network: NetworkType,
}

/// An immutable point-in-time environment reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceState>,
}

impl EnvironmentSnapshot {
    /// A snapshot with no data, timestamped now.
    pub fn empty() -> Self {
        Self {
            taken_at: Utc::now(),
            location: None,
            activity: None,
            health: None,
            device: None,
        }
    }

    /// True iff at least one optional field across all sub-groups is present.
    pub fn has_data(&self) -> bool {
        self.location.is_some()
            || self.activity.is_some()
            || self.health.as_ref().is_some_and(HealthMetrics::has_any)
            || self.device.is_some()
    }
}

/// The environment-source contract.
///
/// `current_snapshot` failures are treated as non-fatal by consumers;
/// the monitoring pair brackets the window in which readings are valid.
#[async_trait]
pub trait EnvironmentSource: Send + Sync {
    /// The source name (e.g., "simulated").
    fn name(&self) -> &str;

    /// Take a point-in-time snapshot.
    async fn current_snapshot(&self) -> std::result::Result<EnvironmentSnapshot, SensorError>;

    /// Begin producing readings.
    async fn start_monitoring(&self) -> std::result::Result<(), SensorError>;

    /// Stop producing readings.
    async fn stop_monitoring(&self) -> std::result::Result<(), SensorError>;
}
