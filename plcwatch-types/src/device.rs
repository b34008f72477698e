//! Device and register metadata.

use crate::{DeviceId, RegisterId};

/// A monitored field controller (PLC), identified by network address.
///
/// Everything except `connected` is immutable while a monitoring session is
/// running; connectivity is refreshed only by refetching the device list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub ip_address: String,
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    #[cfg_attr(feature = "serde", serde(default = "default_unit_id"))]
    pub unit_id: u8,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "is_connected", default)
    )]
    pub connected: bool,
}

impl Device {
    /// The device's network address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }
}

fn default_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

/// On-wire representation of a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataType {
    Int16,
    Int32,
    Float,
}

impl DataType {
    /// Number of 16-bit protocol words the value occupies.
    pub fn word_count(&self) -> u16 {
        match self {
            DataType::Int16 => 1,
            DataType::Int32 | DataType::Float => 2,
        }
    }

    /// Display label, matching the hub's wire spelling.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Float => "float",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single numeric data point on a device.
///
/// Created and edited through the hub's register CRUD surface; the dashboard
/// treats this as read-only input and refetches the list whenever the
/// selected device changes or a register is mutated. Ownership is keyed by
/// the device whose register list a value came from; the hub does not embed
/// the device id in register payloads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register {
    pub id: RegisterId,
    pub name: String,
    pub address: u16,
    pub data_type: DataType,
    #[cfg_attr(feature = "serde", serde(default = "default_scaling"))]
    pub scaling_factor: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Whether the hub should be polling and pushing updates for this
    /// register.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "is_monitored", default)
    )]
    pub monitored: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_value: Option<f64>,
}

impl Register {
    /// Apply the register's scaling factor to a raw protocol value.
    pub fn scale(&self, raw: f64) -> f64 {
        raw * self.scaling_factor
    }

    /// Display bounds, when both ends are configured.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}

fn default_scaling() -> f64 {
    1.0
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn device_deserializes_hub_payload() {
        let json = r#"{
            "id": 4,
            "name": "Packaging line",
            "ip_address": "192.168.1.20",
            "port": 502,
            "unit_id": 1,
            "is_connected": true
        }"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.id, 4);
        assert!(device.connected);
    }

    #[test]
    fn device_defaults_for_omitted_fields() {
        let json = r#"{"id": 9, "name": "Bare", "ip_address": "10.0.0.9"}"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.port, 502);
        assert_eq!(device.unit_id, 1);
        assert!(!device.connected);
    }

    #[test]
    fn register_deserializes_with_null_bounds() {
        let json = r#"{
            "id": 12,
            "name": "Counter",
            "address": 7,
            "data_type": "int32",
            "scaling_factor": 1.0,
            "unit": null,
            "description": null,
            "is_monitored": false,
            "min_value": null,
            "max_value": null
        }"#;

        let register: Register = serde_json::from_str(json).unwrap();
        assert_eq!(register.data_type, DataType::Int32);
        assert!(!register.monitored);
        assert_eq!(register.bounds(), None);
    }

    #[test]
    fn data_type_round_trips_lowercase() {
        assert_eq!(serde_json::to_string(&DataType::Float).unwrap(), r#""float""#);
        let parsed: DataType = serde_json::from_str(r#""int16""#).unwrap();
        assert_eq!(parsed, DataType::Int16);
    }
}
