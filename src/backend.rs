//! Backend seam between the UI loop and the hub's REST surface.
//!
//! All REST calls are suspension points that may interleave arbitrarily with
//! each other and with telemetry delivery, so none of them run on the UI
//! loop: [`BackendHandle`] spawns each call on the runtime and funnels its
//! completion back through a single channel the loop drains between frames.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use plcwatch_client::{ClientError, HubClient};
use plcwatch_types::{Device, DeviceId, Register, RegisterId};

use crate::session::Command;

/// The REST operations the dashboard consumes.
///
/// [`HubClient`] is the production implementation; tests substitute fakes to
/// drive the engine without a hub.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<Device>, ClientError>;
    async fn list_registers(&self, device: DeviceId) -> Result<Vec<Register>, ClientError>;
    async fn start_session(&self, device: DeviceId) -> Result<(), ClientError>;
    async fn stop_session(&self, device: DeviceId) -> Result<(), ClientError>;
    async fn set_monitored(
        &self,
        device: DeviceId,
        register: RegisterId,
        monitored: bool,
    ) -> Result<Register, ClientError>;
    async fn write_register(
        &self,
        device: DeviceId,
        register: RegisterId,
        value: f64,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl Backend for HubClient {
    async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        HubClient::list_devices(self).await
    }

    async fn list_registers(&self, device: DeviceId) -> Result<Vec<Register>, ClientError> {
        HubClient::list_registers(self, device).await
    }

    async fn start_session(&self, device: DeviceId) -> Result<(), ClientError> {
        self.start_monitoring(device).await
    }

    async fn stop_session(&self, device: DeviceId) -> Result<(), ClientError> {
        self.stop_monitoring(device).await
    }

    async fn set_monitored(
        &self,
        device: DeviceId,
        register: RegisterId,
        monitored: bool,
    ) -> Result<Register, ClientError> {
        HubClient::set_monitored(self, device, register, monitored).await
    }

    async fn write_register(
        &self,
        device: DeviceId,
        register: RegisterId,
        value: f64,
    ) -> Result<(), ClientError> {
        HubClient::write_register(self, device, register, value).await
    }
}

/// Completion of a backend call, delivered to the UI loop.
#[derive(Debug)]
pub enum Outcome {
    Started {
        device: DeviceId,
        epoch: u64,
        result: Result<(), ClientError>,
    },
    Stopped {
        device: DeviceId,
        epoch: u64,
        result: Result<(), ClientError>,
    },
    Devices {
        result: Result<Vec<Device>, ClientError>,
    },
    Registers {
        device: DeviceId,
        result: Result<Vec<Register>, ClientError>,
    },
    MonitoredChanged {
        device: DeviceId,
        register: RegisterId,
        result: Result<Register, ClientError>,
    },
    ValueWritten {
        device: DeviceId,
        register: RegisterId,
        result: Result<(), ClientError>,
    },
}

/// Spawns backend calls and funnels their completions into one channel.
///
/// Cheap to clone; every clone feeds the same receiver.
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn Backend>,
    runtime: Handle,
    tx: mpsc::Sender<Outcome>,
}

impl BackendHandle {
    /// Wrap a backend, returning the handle and the completion receiver.
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle) -> (Self, mpsc::Receiver<Outcome>) {
        let (tx, rx) = mpsc::channel(64);
        (
            Self {
                backend,
                runtime,
                tx,
            },
            rx,
        )
    }

    /// Issue a session command from the controller.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::Start { device, epoch } => self.spawn_start(device, epoch),
            Command::Stop { device, epoch } => self.spawn_stop(device, epoch),
        }
    }

    pub fn spawn_start(&self, device: DeviceId, epoch: u64) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.start_session(device).await;
            let _ = tx
                .send(Outcome::Started {
                    device,
                    epoch,
                    result,
                })
                .await;
        });
    }

    pub fn spawn_stop(&self, device: DeviceId, epoch: u64) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.stop_session(device).await;
            let _ = tx
                .send(Outcome::Stopped {
                    device,
                    epoch,
                    result,
                })
                .await;
        });
    }

    pub fn spawn_list_devices(&self) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.list_devices().await;
            let _ = tx.send(Outcome::Devices { result }).await;
        });
    }

    pub fn spawn_list_registers(&self, device: DeviceId) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.list_registers(device).await;
            let _ = tx.send(Outcome::Registers { device, result }).await;
        });
    }

    pub fn spawn_set_monitored(&self, device: DeviceId, register: RegisterId, monitored: bool) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.set_monitored(device, register, monitored).await;
            let _ = tx
                .send(Outcome::MonitoredChanged {
                    device,
                    register,
                    result,
                })
                .await;
        });
    }

    pub fn spawn_write_register(&self, device: DeviceId, register: RegisterId, value: f64) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.write_register(device, register, value).await;
            let _ = tx
                .send(Outcome::ValueWritten {
                    device,
                    register,
                    result,
                })
                .await;
        });
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle").finish_non_exhaustive()
    }
}
