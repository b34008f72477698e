//! Channel-based telemetry source.
//!
//! Receives register updates via a tokio mpsc channel. This is the source
//! used by tests and by embedders that already have the updates in-process.

use tokio::sync::mpsc;

use plcwatch_types::RegisterUpdate;

use super::{StreamStatus, TelemetrySource};

/// A telemetry source fed through an in-process channel.
///
/// # Example
///
/// ```
/// use plcwatch::telemetry::ChannelTelemetrySource;
///
/// let (tx, source) = ChannelTelemetrySource::create("simulator");
/// ```
#[derive(Debug)]
pub struct ChannelTelemetrySource {
    receiver: mpsc::Receiver<RegisterUpdate>,
    description: String,
    closed: bool,
}

impl ChannelTelemetrySource {
    /// Wrap the receiving end of an update channel.
    pub fn new(receiver: mpsc::Receiver<RegisterUpdate>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair for pushing updates into the dashboard.
    ///
    /// Returns (sender, source); the source side plugs into
    /// [`TelemetryStream`](super::TelemetryStream).
    pub fn create(source_description: &str) -> (mpsc::Sender<RegisterUpdate>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx, source_description))
    }
}

impl TelemetrySource for ChannelTelemetrySource {
    fn poll(&mut self) -> Option<RegisterUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn status(&self) -> StreamStatus {
        if self.closed {
            StreamStatus::Closed
        } else {
            StreamStatus::Connected
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn polls_queued_updates_in_order() {
        let (tx, mut source) = ChannelTelemetrySource::create("test");

        tx.send(RegisterUpdate {
            device_id: 1,
            values: Default::default(),
        })
        .await
        .unwrap();
        tx.send(RegisterUpdate {
            device_id: 2,
            values: Default::default(),
        })
        .await
        .unwrap();

        assert_eq!(source.poll().unwrap().device_id, 1);
        assert_eq!(source.poll().unwrap().device_id, 2);
        assert!(source.poll().is_none());
        assert_eq!(source.status(), StreamStatus::Connected);
    }

    #[tokio::test]
    async fn reports_closed_after_sender_drops() {
        let (tx, mut source) = ChannelTelemetrySource::create("test");
        drop(tx);

        assert!(source.poll().is_none());
        assert_eq!(source.status(), StreamStatus::Closed);
    }

    #[tokio::test]
    async fn describes_its_origin() {
        let (_tx, source) = ChannelTelemetrySource::create("simulator");
        assert_eq!(source.description(), "channel: simulator");
    }
}
