//! Push-channel telemetry payloads.

use std::collections::BTreeMap;

use crate::{DeviceId, RegisterId};

/// One observed register value, with optional display metadata.
///
/// The hub attaches `min_value`/`max_value` so gauges can be scaled without a
/// registry round-trip; they mirror the register's configured bounds at the
/// time of the observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterReading {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_value: Option<f64>,
}

/// A `register_update` push event: one batch of readings for one device.
///
/// Arrival order at the receiver is authoritative for sequencing; the hub
/// attaches no timestamp worth trusting, and none is carried here.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterUpdate {
    #[cfg_attr(feature = "serde", serde(rename = "plc_id"))]
    pub device_id: DeviceId,
    #[cfg_attr(feature = "serde", serde(rename = "data"))]
    pub values: BTreeMap<RegisterId, RegisterReading>,
}

impl RegisterUpdate {
    /// Whether this update belongs to the given device.
    pub fn is_for(&self, device: DeviceId) -> bool {
        self.device_id == device
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
