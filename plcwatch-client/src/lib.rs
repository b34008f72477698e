//! # plcwatch-client
//!
//! REST client for the plcwatch monitoring hub. The hub exposes device and
//! register metadata, session start/stop, and register mutation endpoints;
//! this crate wraps them behind [`HubClient`] with typed errors.
//!
//! The push channel carrying live register updates is a separate interface
//! and lives in the `plcwatch` crate's telemetry module; this crate is
//! request/response only.

mod error;
mod hub;

pub use error::ClientError;
pub use hub::{HubClient, HubClientBuilder};
