//! The live telemetry engine.
//!
//! [`Monitor`] binds the device selection to the session lifecycle, consumes
//! the filtered push stream, maintains the per-register series buffers, and
//! keeps the aligned chart dataset current. It runs entirely on the UI loop:
//! every network call is dispatched through [`BackendHandle`] and comes back
//! as an [`Outcome`](crate::backend::Outcome) the loop feeds into
//! [`Monitor::session_started`]/[`Monitor::session_stopped`].

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::{debug, warn};

use plcwatch_client::ClientError;
use plcwatch_types::{DeviceId, Register, RegisterId, RegisterReading, RegisterUpdate};

use crate::backend::BackendHandle;
use crate::data::{align, AlignedSeries, SeriesBuffer};
use crate::session::{SessionController, SessionState};
use crate::telemetry::{StreamStatus, TelemetryStream};

pub struct Monitor {
    backend: BackendHandle,
    stream: TelemetryStream,
    controller: SessionController,
    /// Register metadata for the selected device; refetched per selection.
    registers: Vec<Register>,
    buffers: HashMap<RegisterId, SeriesBuffer>,
    latest: HashMap<RegisterId, RegisterReading>,
    /// Shared label sequence; one label per accepted update, per session.
    label_seq: u64,
    chart: Vec<AlignedSeries>,
    last_error: Option<ClientError>,
    revision: u64,
    notify: watch::Sender<u64>,
}

impl Monitor {
    pub fn new(backend: BackendHandle, stream: TelemetryStream) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            backend,
            stream,
            controller: SessionController::new(),
            registers: Vec::new(),
            buffers: HashMap::new(),
            latest: HashMap::new(),
            label_seq: 0,
            chart: Vec::new(),
            last_error: None,
            revision: 0,
            notify,
        }
    }

    /// Observe engine updates: the receiver changes on every accepted event
    /// and every session state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Change the selected device (or clear the selection with `None`).
    ///
    /// The stream filter and the buffers change together here, before any
    /// backend command is dispatched and with no suspension point in
    /// between. After this returns, no event for the old device can be
    /// accepted, no matter when its stop call completes.
    pub fn select_device(&mut self, device: Option<DeviceId>) {
        let previous = self.stream.active_device();
        let commands = self.controller.select(device);
        if commands.is_empty() && device == previous {
            // Same live selection; don't touch the buffers.
            return;
        }

        self.stream.set_active_device(device);
        self.buffers.clear();
        self.latest.clear();
        self.label_seq = 0;
        self.chart.clear();
        self.registers.clear();
        self.last_error = None;

        for command in commands {
            self.backend.dispatch(command);
        }
        self.bump();
    }

    /// The device the engine is currently filtered to.
    pub fn selected_device(&self) -> Option<DeviceId> {
        self.stream.active_device()
    }

    /// Install the register list for the selected device.
    ///
    /// Lists that arrive for a device that is no longer selected are late
    /// responses from an abandoned selection and are dropped.
    pub fn set_registers(&mut self, device: DeviceId, registers: Vec<Register>) {
        if self.stream.active_device() != Some(device) {
            debug!(device, "ignoring register list for unselected device");
            return;
        }
        self.registers = registers;
        self.chart = align(&self.registers, &self.buffers);
        self.bump();
    }

    /// Drain the push stream, applying every update accepted by the filter.
    ///
    /// Returns the number of updates applied.
    pub fn poll_telemetry(&mut self) -> usize {
        let mut accepted = 0;
        while let Some(update) = self.stream.poll() {
            self.apply_update(update);
            accepted += 1;
        }
        accepted
    }

    fn apply_update(&mut self, update: RegisterUpdate) {
        self.label_seq += 1;
        let label = self.label_seq;
        for (register_id, reading) in update.values {
            self.buffers
                .entry(register_id)
                .or_default()
                .push(label, reading.value);
            self.latest.insert(register_id, reading);
        }
        self.chart = align(&self.registers, &self.buffers);
        self.bump();
    }

    /// Record the completion of a start call.
    pub fn session_started(
        &mut self,
        device: DeviceId,
        epoch: u64,
        result: Result<(), ClientError>,
    ) {
        let ok = result.is_ok();
        let current = self.controller.on_started(device, epoch, ok);
        if !current {
            debug!(device, "ignoring stale start completion");
            return;
        }
        if let Err(err) = result {
            warn!(device, error = %err, "monitoring start failed");
            self.last_error = Some(err);
        }
        self.bump();
    }

    /// Record the completion of a stop call.
    pub fn session_stopped(
        &mut self,
        device: DeviceId,
        epoch: u64,
        result: Result<(), ClientError>,
    ) {
        let current = self.controller.on_stopped(device, epoch, result.is_ok());
        match result {
            Err(err) if current => {
                warn!(device, error = %err, "monitoring stop failed");
                self.last_error = Some(err);
            }
            Err(err) => {
                // A stop failure for an abandoned device is not the
                // operator's problem; the hub will drop the session when the
                // device disappears from its poll set.
                debug!(device, error = %err, "stop failed for abandoned session");
                return;
            }
            Ok(()) if !current => {
                debug!(device, "ignoring stale stop completion");
                return;
            }
            Ok(()) => {}
        }
        self.bump();
    }

    pub fn session_state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.stream.status()
    }

    pub fn stream_description(&self) -> &str {
        self.stream.description()
    }

    /// The most recent session error, cleared on selection change.
    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Register metadata for the selected device.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// The series buffer for one register, if it has received any updates.
    pub fn series(&self, register: RegisterId) -> Option<&SeriesBuffer> {
        self.buffers.get(&register)
    }

    /// The latest reading for one register.
    pub fn latest(&self, register: RegisterId) -> Option<&RegisterReading> {
        self.latest.get(&register)
    }

    /// The aligned chart dataset, recomputed on every accepted update.
    pub fn chart_data(&self) -> &[AlignedSeries] {
        &self.chart
    }

    /// Current value of the shared label sequence.
    pub fn label_seq(&self) -> u64 {
        self.label_seq
    }

    fn bump(&mut self) {
        self.revision += 1;
        self.notify.send_replace(self.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::{mpsc, Notify};

    use plcwatch_types::Device;

    use crate::backend::{Backend, Outcome};
    use crate::telemetry::ChannelTelemetrySource;

    /// Scriptable hub stand-in: records calls, can fail or hold them open.
    #[derive(Default)]
    struct FakeBackend {
        starts: Mutex<Vec<DeviceId>>,
        stops: Mutex<Vec<DeviceId>>,
        fail_start_for: Mutex<Option<DeviceId>>,
        hold_start_for: Mutex<Option<(DeviceId, Arc<Notify>)>>,
        hold_stops: bool,
    }

    impl FakeBackend {
        fn held_start(&self, device: DeviceId) -> Option<Arc<Notify>> {
            let held = self.hold_start_for.lock().unwrap();
            match &*held {
                Some((d, notify)) if *d == device => Some(notify.clone()),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
            Ok(Vec::new())
        }

        async fn list_registers(&self, _device: DeviceId) -> Result<Vec<Register>, ClientError> {
            Ok(Vec::new())
        }

        async fn start_session(&self, device: DeviceId) -> Result<(), ClientError> {
            self.starts.lock().unwrap().push(device);
            if let Some(gate) = self.held_start(device) {
                gate.notified().await;
            }
            if *self.fail_start_for.lock().unwrap() == Some(device) {
                return Err(ClientError::Timeout);
            }
            Ok(())
        }

        async fn stop_session(&self, device: DeviceId) -> Result<(), ClientError> {
            self.stops.lock().unwrap().push(device);
            if self.hold_stops {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn set_monitored(
            &self,
            _device: DeviceId,
            _register: RegisterId,
            _monitored: bool,
        ) -> Result<Register, ClientError> {
            unimplemented!("not exercised by these tests")
        }

        async fn write_register(
            &self,
            _device: DeviceId,
            _register: RegisterId,
            _value: f64,
        ) -> Result<(), ClientError> {
            Ok(())
        }
    }

    struct Harness {
        monitor: Monitor,
        backend: Arc<FakeBackend>,
        outcomes: mpsc::Receiver<Outcome>,
        telemetry: mpsc::Sender<RegisterUpdate>,
    }

    fn harness_with(fake: FakeBackend) -> Harness {
        let backend = Arc::new(fake);
        let (handle, outcomes) =
            BackendHandle::new(backend.clone(), tokio::runtime::Handle::current());
        let (telemetry, source) = ChannelTelemetrySource::create("test");
        let monitor = Monitor::new(handle, TelemetryStream::new(Box::new(source)));
        Harness {
            monitor,
            backend,
            outcomes,
            telemetry,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeBackend::default())
    }

    impl Harness {
        /// Wait for `n` session completions and feed them to the monitor in
        /// whatever order the spawned calls finished.
        async fn settle(&mut self, n: usize) {
            for _ in 0..n {
                match self.outcomes.recv().await.unwrap() {
                    Outcome::Started {
                        device,
                        epoch,
                        result,
                    } => self.monitor.session_started(device, epoch, result),
                    Outcome::Stopped {
                        device,
                        epoch,
                        result,
                    } => self.monitor.session_stopped(device, epoch, result),
                    other => panic!("unexpected outcome: {other:?}"),
                }
            }
        }

        async fn push(&mut self, device: DeviceId, readings: &[(RegisterId, f64)]) {
            let mut values = BTreeMap::new();
            for &(register, value) in readings {
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
            }
            self.telemetry
                .send(RegisterUpdate {
                    device_id: device,
                    values,
                })
                .await
                .unwrap();
        }

        fn values(&self, register: RegisterId) -> Vec<f64> {
            self.monitor
                .series(register)
                .map(|buffer| buffer.values().map(|(_, v)| v).collect())
                .unwrap_or_default()
        }
    }

    fn monitored_register(id: RegisterId) -> Register {
        Register {
            id,
            name: format!("reg-{id}"),
            address: id as u16,
            data_type: plcwatch_types::DataType::Float,
            scaling_factor: 1.0,
            unit: None,
            description: None,
            monitored: true,
            min_value: None,
            max_value: None,
        }
    }

    #[tokio::test]
    async fn select_start_and_apply_updates() {
        let mut h = harness();
        h.monitor.select_device(Some(1));
        h.settle(1).await;
        assert_eq!(h.monitor.session_state(), SessionState::Active(1));

        h.push(1, &[(10, 10.0)]).await;
        h.push(1, &[(10, 11.0)]).await;
        h.push(1, &[(11, 5.0)]).await;
        assert_eq!(h.monitor.poll_telemetry(), 3);

        assert_eq!(h.values(10), vec![10.0, 11.0]);
        assert_eq!(h.values(11), vec![5.0]);
        assert_eq!(h.monitor.label_seq(), 3);
    }

    #[tokio::test]
    async fn double_select_issues_exactly_one_start() {
        let mut h = harness();
        h.monitor.select_device(Some(1));
        h.monitor.select_device(Some(1));
        h.settle(1).await;

        assert_eq!(*h.backend.starts.lock().unwrap(), [1]);
        assert_eq!(h.monitor.session_state(), SessionState::Active(1));

        // Still a no-op once Active.
        h.monitor.select_device(Some(1));
        assert_eq!(h.backend.starts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn switch_clears_buffers_before_stop_resolves() {
        let mut h = harness_with(FakeBackend {
            hold_stops: true,
            ..FakeBackend::default()
        });
        h.monitor.select_device(Some(1));
        h.settle(1).await;

        h.push(1, &[(10, 10.0), (11, 4.0)]).await;
        h.monitor.poll_telemetry();
        assert_eq!(h.values(10), vec![10.0]);

        // The stop call for device 1 never completes, and the buffers must
        // still be empty the moment the switch happens.
        h.monitor.select_device(Some(2));
        assert!(h.monitor.series(10).is_none());
        assert!(h.monitor.series(11).is_none());
        assert_eq!(h.monitor.selected_device(), Some(2));
        assert_eq!(h.monitor.label_seq(), 0);

        // Device 2's start completes; the stop for device 1 was issued even
        // though it never resolves.
        h.settle(1).await;
        assert_eq!(h.monitor.session_state(), SessionState::Active(2));
        assert_eq!(*h.backend.stops.lock().unwrap(), [1]);
    }

    #[tokio::test]
    async fn updates_for_other_devices_never_land() {
        let mut h = harness();
        h.monitor.select_device(Some(1));
        h.settle(1).await;

        h.push(2, &[(10, 99.0)]).await;
        h.push(1, &[(10, 1.0)]).await;
        h.push(2, &[(11, 42.0)]).await;
        assert_eq!(h.monitor.poll_telemetry(), 1);

        assert_eq!(h.values(10), vec![1.0]);
        assert!(h.monitor.series(11).is_none());
    }

    #[tokio::test]
    async fn late_start_for_abandoned_device_changes_nothing() {
        let gate = Arc::new(Notify::new());
        let mut h = harness_with(FakeBackend {
            hold_start_for: Mutex::new(Some((1, gate.clone()))),
            ..FakeBackend::default()
        });

        h.monitor.select_device(Some(1));
        // Device 2 is selected before device 1's start call resolves.
        h.monitor.select_device(Some(2));

        // stop(1) and start(2) complete; start(1) is still held open.
        h.settle(2).await;
        assert_eq!(h.monitor.session_state(), SessionState::Active(2));

        // Now the abandoned start resolves; it must not reactivate device 1.
        gate.notify_one();
        h.settle(1).await;
        assert_eq!(h.monitor.session_state(), SessionState::Active(2));
        assert_eq!(h.monitor.selected_device(), Some(2));
    }

    #[tokio::test]
    async fn start_failure_surfaces_as_error_state() {
        let mut h = harness_with(FakeBackend {
            fail_start_for: Mutex::new(Some(1)),
            ..FakeBackend::default()
        });
        h.monitor.select_device(Some(1));
        h.settle(1).await;

        assert_eq!(h.monitor.session_state(), SessionState::Error(1));
        assert!(matches!(h.monitor.last_error(), Some(ClientError::Timeout)));

        // The next selection change clears the error.
        h.monitor.select_device(Some(2));
        assert!(h.monitor.last_error().is_none());
        assert_eq!(h.monitor.session_state(), SessionState::Starting(2));
    }

    #[tokio::test]
    async fn chart_recomputes_on_each_accepted_update() {
        let mut h = harness();
        h.monitor.select_device(Some(1));
        h.settle(1).await;
        h.monitor
            .set_registers(1, vec![monitored_register(10), monitored_register(11)]);

        h.push(1, &[(10, 1.0)]).await;
        h.monitor.poll_telemetry();
        let chart = h.monitor.chart_data();
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].points.len(), 1);
        assert_eq!(chart[1].points, vec![None]);

        h.push(1, &[(10, 2.0), (11, 7.0)]).await;
        h.monitor.poll_telemetry();
        let chart = h.monitor.chart_data();
        assert_eq!(chart[0].points, vec![Some(1.0), Some(2.0)]);
        assert_eq!(chart[1].points, vec![None, Some(7.0)]);
    }

    #[tokio::test]
    async fn register_list_for_unselected_device_is_dropped() {
        let mut h = harness();
        h.monitor.select_device(Some(1));
        h.settle(1).await;

        h.monitor.set_registers(2, vec![monitored_register(10)]);
        assert!(h.monitor.registers().is_empty());
    }

    #[tokio::test]
    async fn observers_are_notified_on_accepted_updates() {
        let mut h = harness();
        let mut updates = h.monitor.subscribe();
        let before = *updates.borrow_and_update();

        h.monitor.select_device(Some(1));
        h.settle(1).await;
        h.push(1, &[(10, 1.0)]).await;
        h.monitor.poll_telemetry();

        assert!(updates.has_changed().unwrap());
        assert!(*updates.borrow_and_update() > before);
    }
}
