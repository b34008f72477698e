//! Push-channel consumption and device filtering.
//!
//! This module provides a trait-based abstraction for receiving register
//! updates from the hub's push channel, plus the device filter that decides
//! which updates the engine may apply.

mod channel;
mod tcp;

pub use channel::ChannelTelemetrySource;
pub use tcp::TcpTelemetrySource;

use std::fmt::Debug;

use tracing::debug;

use plcwatch_types::{DeviceId, RegisterUpdate};

/// Connection state of a telemetry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Receiving events.
    Connected,
    /// Waiting to retry after a transport failure. While disconnected no
    /// events are delivered and none are synthesized.
    Reconnecting { attempt: u32 },
    /// Gave up after exhausting the retry budget (or the producer went away).
    Closed,
}

impl StreamStatus {
    /// Returns the display label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            StreamStatus::Connected => "live",
            StreamStatus::Reconnecting { .. } => "reconnecting",
            StreamStatus::Closed => "offline",
        }
    }
}

/// Trait for receiving register updates from a push channel.
///
/// Implementations deliver updates from different backends - a TCP feed in
/// production, an in-process channel in tests.
pub trait TelemetrySource: Send + Debug {
    /// Poll for the next pending update.
    ///
    /// Returns `Some(update)` if one is queued, `None` otherwise. This
    /// method must be non-blocking.
    fn poll(&mut self) -> Option<RegisterUpdate>;

    /// Current connection state.
    fn status(&self) -> StreamStatus;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar.
    fn description(&self) -> &str;
}

/// Filters a telemetry source down to the currently selected device.
///
/// The filter key is evaluated when an update is *delivered*, not when it
/// was sent: updates already in flight during a device switch are judged
/// against the new selection and dropped if they no longer match. That is
/// what makes stale-device events safe to discard deterministically: they
/// are never queued for later.
#[derive(Debug)]
pub struct TelemetryStream {
    source: Box<dyn TelemetrySource>,
    active: Option<DeviceId>,
}

impl TelemetryStream {
    pub fn new(source: Box<dyn TelemetrySource>) -> Self {
        Self {
            source,
            active: None,
        }
    }

    /// Retarget the filter. Effective immediately for every update not yet
    /// delivered.
    pub fn set_active_device(&mut self, device: Option<DeviceId>) {
        self.active = device;
    }

    pub fn active_device(&self) -> Option<DeviceId> {
        self.active
    }

    /// Next update for the selected device, discarding stale ones.
    pub fn poll(&mut self) -> Option<RegisterUpdate> {
        while let Some(update) = self.source.poll() {
            match self.active {
                Some(id) if update.is_for(id) => return Some(update),
                _ => {
                    debug!(
                        device = update.device_id,
                        "dropping update for unselected device"
                    );
                }
            }
        }
        None
    }

    pub fn status(&self) -> StreamStatus {
        self.source.status()
    }

    pub fn description(&self) -> &str {
        self.source.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use plcwatch_types::RegisterReading;

    fn update_for(device: DeviceId, register: i64, value: f64) -> RegisterUpdate {
        let mut values = BTreeMap::new();
        values.insert(
            register,
            RegisterReading {
                name: None,
                value,
                unit: None,
                min_value: None,
                max_value: None,
            },
        );
        RegisterUpdate {
            device_id: device,
            values,
        }
    }

    #[tokio::test]
    async fn accepts_only_the_selected_device() {
        let (tx, source) = ChannelTelemetrySource::create("test");
        let mut stream = TelemetryStream::new(Box::new(source));
        stream.set_active_device(Some(1));

        tx.send(update_for(2, 10, 5.0)).await.unwrap();
        tx.send(update_for(1, 10, 7.0)).await.unwrap();
        tx.send(update_for(2, 11, 9.0)).await.unwrap();

        let accepted = stream.poll().unwrap();
        assert!(accepted.is_for(1));
        assert_eq!(accepted.values[&10].value, 7.0);
        assert!(stream.poll().is_none());
    }

    #[tokio::test]
    async fn filter_applies_at_delivery_time() {
        let (tx, source) = ChannelTelemetrySource::create("test");
        let mut stream = TelemetryStream::new(Box::new(source));
        stream.set_active_device(Some(1));

        // The update was in flight while device 1 was selected...
        tx.send(update_for(1, 10, 5.0)).await.unwrap();

        // ...but the switch happens before it is delivered.
        stream.set_active_device(Some(2));
        assert!(stream.poll().is_none());
    }

    #[tokio::test]
    async fn no_selection_drops_everything() {
        let (tx, source) = ChannelTelemetrySource::create("test");
        let mut stream = TelemetryStream::new(Box::new(source));

        tx.send(update_for(1, 10, 5.0)).await.unwrap();
        assert!(stream.poll().is_none());
    }
}
