// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # plcwatch
//!
//! A terminal dashboard for live PLC register telemetry.
//!
//! plcwatch talks to a monitoring hub over two interfaces: a REST API for
//! device/register metadata and session control (via `plcwatch-client`),
//! and a push feed of `register_update` events. The hard part lives in the
//! engine: keeping the per-register history buffers and the session
//! lifecycle consistent while selection changes, REST completions, and push
//! events interleave in arbitrary order.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │  app    │───▶│ monitor  │───▶│   ui    │───▶│ Terminal │ │
//! │  │ (loop)  │    │ (engine) │    │(render) │    │          │ │
//! │  └────┬────┘    └────┬─────┘    └─────────┘    └──────────┘ │
//! │       │              │                                       │
//! │       ▼              ▼                                       │
//! │  ┌─────────┐    ┌──────────┐                                 │
//! │  │ backend │    │telemetry │◀── TcpTelemetrySource           │
//! │  │ (REST)  │    │ (push)   │    | ChannelTelemetrySource     │
//! │  └─────────┘    └──────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`monitor`]**: the engine - binds the device selection to the
//!   session lifecycle, applies filtered push events to the bounded
//!   [`data::SeriesBuffer`]s, and recomputes the aligned chart dataset
//! - **[`session`]**: the pure start/stop state machine with epoch-tagged
//!   commands, so completions of abandoned calls can never corrupt state
//! - **[`telemetry`]**: the push-feed abstraction ([`telemetry::TelemetrySource`])
//!   and the device filter applied at delivery time
//! - **[`backend`]**: dispatch of REST calls onto the runtime, with
//!   completions funneled back to the single-threaded loop
//! - **[`registry`]**: cached device/register metadata with explicit
//!   invalidation
//! - **[`data`]**: bounded series buffers and chart alignment
//! - **[`app`]**, **[`events`]**, **[`ui`]**: terminal application state,
//!   key handling, and rendering
//!
//! ## Embedding the engine
//!
//! The engine runs without the TUI; feed it a channel source and drive it
//! from any loop:
//!
//! ```no_run
//! use std::sync::Arc;
//! use plcwatch::backend::BackendHandle;
//! use plcwatch::monitor::Monitor;
//! use plcwatch::telemetry::{ChannelTelemetrySource, TelemetryStream};
//! use plcwatch_client::HubClient;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = Arc::new(HubClient::builder().build());
//! let (backend, _outcomes) =
//!     BackendHandle::new(client, tokio::runtime::Handle::current());
//! let (_updates, source) = ChannelTelemetrySource::create("embedded");
//!
//! let mut monitor = Monitor::new(backend, TelemetryStream::new(Box::new(source)));
//! monitor.select_device(Some(1));
//! # }
//! ```

pub mod app;
pub mod backend;
pub mod data;
pub mod events;
pub mod monitor;
pub mod registry;
pub mod session;
pub mod settings;
pub mod telemetry;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use backend::{Backend, BackendHandle, Outcome};
pub use data::{AlignedSeries, SeriesBuffer, SERIES_CAPACITY};
pub use monitor::Monitor;
pub use registry::DeviceRegistry;
pub use session::{Command, SessionController, SessionState};
pub use telemetry::{
    ChannelTelemetrySource, StreamStatus, TcpTelemetrySource, TelemetrySource, TelemetryStream,
};
