//! # plcwatch-types
//!
//! Core types for PLC register monitoring. This crate defines the device and
//! telemetry schema shared by the plcwatch dashboard and its hub client.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: the types work without any serialization
//!   framework
//! - **Optional serialization**: enable the `serde` feature to speak the
//!   hub's JSON wire format
//! - **Wire-compatible**: serialized field names match the hub API
//!   (`ip_address`, `is_connected`, `is_monitored`, `plc_id`)
//!
//! ## Example
//!
//! ```rust
//! use plcwatch_types::{DataType, Register};
//!
//! let register = Register {
//!     id: 7,
//!     name: "Boiler temp".to_string(),
//!     address: 0,
//!     data_type: DataType::Float,
//!     scaling_factor: 0.1,
//!     unit: Some("°C".to_string()),
//!     description: None,
//!     monitored: true,
//!     min_value: Some(0.0),
//!     max_value: Some(100.0),
//! };
//!
//! assert_eq!(register.data_type.word_count(), 2);
//! assert_eq!(register.scale(215.0), 21.5);
//! ```

mod device;
mod telemetry;

pub use device::*;
pub use telemetry::*;

/// Identifier of a device, as assigned by the hub backend.
pub type DeviceId = i64;

/// Identifier of a register, as assigned by the hub backend.
pub type RegisterId = i64;
