//! TCP telemetry source with automatic reconnection.
//!
//! The hub pushes `register_update` events as newline-delimited JSON on a
//! plain TCP feed. A background task owns the connection and reconnects on
//! its own with bounded exponential backoff; the dashboard keeps rendering
//! the last buffered values while the feed is down.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use plcwatch_types::RegisterUpdate;

use super::{StreamStatus, TelemetrySource};

const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 30_000;
const MAX_ATTEMPTS: u32 = 5;

/// A telemetry source reading newline-delimited JSON from a TCP feed.
#[derive(Debug)]
pub struct TcpTelemetrySource {
    receiver: mpsc::Receiver<RegisterUpdate>,
    status: Arc<Mutex<StreamStatus>>,
    description: String,
    reader: JoinHandle<()>,
}

impl TcpTelemetrySource {
    /// Connect to `addr` and start reading updates.
    ///
    /// Must be called within a tokio runtime. The reader task dials
    /// immediately and redials after transport failures, doubling the delay
    /// between attempts up to a cap; after `MAX_ATTEMPTS` consecutive
    /// failures the source reports [`StreamStatus::Closed`] and stays down.
    pub fn connect(addr: &str) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let status = Arc::new(Mutex::new(StreamStatus::Reconnecting { attempt: 0 }));
        let reader = tokio::spawn(run_reader(addr.to_string(), tx, status.clone()));

        Self {
            receiver: rx,
            status,
            description: format!("stream: {}", addr),
            reader,
        }
    }

    /// Tear down the connection and the reader task.
    pub fn disconnect(self) {
        self.reader.abort();
    }
}

impl Drop for TcpTelemetrySource {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl TelemetrySource for TcpTelemetrySource {
    fn poll(&mut self) -> Option<RegisterUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => None,
        }
    }

    fn status(&self) -> StreamStatus {
        *self.status.lock().unwrap()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Why a read loop ended.
enum ReadEnd {
    /// The connection dropped; the caller should redial.
    Disconnected,
    /// The consuming side went away; the task should exit.
    ReceiverDropped,
}

async fn run_reader(
    addr: String,
    tx: mpsc::Sender<RegisterUpdate>,
    status: Arc<Mutex<StreamStatus>>,
) {
    let mut attempt = 0u32;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!(%addr, "telemetry feed connected");
                *status.lock().unwrap() = StreamStatus::Connected;
                attempt = 0;
                backoff_ms = INITIAL_BACKOFF_MS;

                match read_lines(stream, &tx).await {
                    ReadEnd::ReceiverDropped => return,
                    ReadEnd::Disconnected => warn!(%addr, "telemetry feed lost"),
                }
            }
            Err(e) => {
                warn!(%addr, error = %e, "telemetry feed connect failed");
            }
        }

        attempt += 1;
        if attempt > MAX_ATTEMPTS {
            warn!(%addr, "telemetry feed retry budget exhausted");
            *status.lock().unwrap() = StreamStatus::Closed;
            return;
        }

        *status.lock().unwrap() = StreamStatus::Reconnecting { attempt };
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
    }
}

async fn read_lines(stream: TcpStream, tx: &mpsc::Sender<RegisterUpdate>) -> ReadEnd {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => return ReadEnd::Disconnected,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<RegisterUpdate>(trimmed) {
                    Ok(update) => {
                        if tx.send(update).await.is_err() {
                            return ReadEnd::ReceiverDropped;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "skipping malformed telemetry line");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "telemetry read error");
                return ReadEnd::Disconnected;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn sample_line(device: i64, value: f64) -> String {
        format!(
            r#"{{"plc_id": {device}, "data": {{"5": {{"value": {value}}}}}}}"#
        ) + "\n"
    }

    #[tokio::test]
    async fn receives_updates_from_a_feed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(sample_line(1, 25.5).as_bytes())
                .await
                .unwrap();
            socket
                .write_all(sample_line(1, 26.0).as_bytes())
                .await
                .unwrap();
        });

        let mut source = TcpTelemetrySource::connect(&addr.to_string());

        // Give the reader task time to connect and consume.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let first = source.poll().unwrap();
        assert_eq!(first.device_id, 1);
        assert_eq!(first.values[&5].value, 25.5);
        assert_eq!(source.poll().unwrap().values[&5].value, 26.0);
        assert_eq!(source.status(), StreamStatus::Connected);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"not valid json\n").await.unwrap();
            socket
                .write_all(sample_line(3, 7.0).as_bytes())
                .await
                .unwrap();
        });

        let mut source = TcpTelemetrySource::connect(&addr.to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let update = source.poll().unwrap();
        assert_eq!(update.device_id, 3);
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn reports_reconnecting_when_the_feed_is_down() {
        // Bind then drop the listener so the port refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = TcpTelemetrySource::connect(&addr.to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(matches!(
            source.status(),
            StreamStatus::Reconnecting { attempt } if attempt >= 1
        ));
    }

    #[tokio::test]
    async fn describes_its_origin() {
        let source = TcpTelemetrySource::connect("127.0.0.1:1");
        assert_eq!(source.description(), "stream: 127.0.0.1:1");
    }
}
