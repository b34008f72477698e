//! Cached device and register metadata.

use std::collections::HashMap;

use plcwatch_types::{Device, DeviceId, Register};

/// Cache of metadata fetched from the hub.
///
/// Entries are only trusted until the next mutation: after updating a
/// register the affected device's entry is invalidated and refetched, and a
/// device's register list is refetched on every selection change rather
/// than reused. A stored empty list is a valid "device truly has zero
/// registers" state; fetch failures never reach this cache.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Option<Vec<Device>>,
    registers: HashMap<DeviceId, Vec<Register>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached device list, if one has been fetched.
    pub fn devices(&self) -> Option<&[Device]> {
        self.devices.as_deref()
    }

    /// Look up a cached device by id.
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices
            .as_ref()
            .and_then(|devices| devices.iter().find(|d| d.id == id))
    }

    /// The cached register list for a device, if one has been fetched.
    pub fn registers(&self, device: DeviceId) -> Option<&[Register]> {
        self.registers.get(&device).map(Vec::as_slice)
    }

    pub fn store_devices(&mut self, devices: Vec<Device>) {
        self.devices = Some(devices);
    }

    pub fn store_registers(&mut self, device: DeviceId, registers: Vec<Register>) {
        self.registers.insert(device, registers);
    }

    /// Drop the cached device list.
    pub fn invalidate_devices(&mut self) {
        self.devices = None;
    }

    /// Drop the cached register list for one device.
    ///
    /// Called after any register mutation, before refetching.
    pub fn invalidate_registers(&mut self, device: DeviceId) {
        self.registers.remove(&device);
    }
}
