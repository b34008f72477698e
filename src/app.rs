//! Application state and navigation logic.

use std::time::Instant;

use tokio::sync::mpsc;

use plcwatch_types::RegisterId;

use crate::backend::{BackendHandle, Outcome};
use crate::monitor::Monitor;
use crate::registry::DeviceRegistry;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Device list with connectivity status; Enter starts monitoring.
    Devices,
    /// Live cards, gauges, and the multi-series chart.
    Dashboard,
    /// Register table with monitored toggles and value writes.
    Registers,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Devices => View::Dashboard,
            View::Dashboard => View::Registers,
            View::Registers => View::Devices,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Devices => View::Registers,
            View::Dashboard => View::Devices,
            View::Registers => View::Dashboard,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Devices => "Devices",
            View::Dashboard => "Dashboard",
            View::Registers => "Registers",
        }
    }
}

/// In-progress register value write, captured keystroke by keystroke.
#[derive(Debug, Clone)]
pub struct ValueInput {
    pub register: RegisterId,
    pub register_name: String,
    pub buffer: String,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    /// The telemetry engine; owns selection, buffers, and the chart.
    pub monitor: Monitor,
    /// Metadata cache; invalidated after mutations.
    pub registry: DeviceRegistry,
    backend: BackendHandle,
    outcomes: mpsc::Receiver<Outcome>,

    // Navigation state
    pub selected_device_index: usize,
    pub selected_register_index: usize,

    /// Active value-write input, if any.
    pub value_input: Option<ValueInput>,

    pub devices_loading: bool,
    pub theme: Theme,

    // Status message (temporary feedback)
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        monitor: Monitor,
        backend: BackendHandle,
        outcomes: mpsc::Receiver<Outcome>,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Devices,
            show_help: false,
            monitor,
            registry: DeviceRegistry::new(),
            backend,
            outcomes,
            selected_device_index: 0,
            selected_register_index: 0,
            value_input: None,
            devices_loading: false,
            theme,
            status_message: None,
        }
    }

    /// One scheduler turn: drain backend completions, then the push stream.
    ///
    /// Everything that mutates engine state happens here or in a key
    /// handler, never concurrently.
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.handle_outcome(outcome);
        }
        self.monitor.poll_telemetry();
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Started {
                device,
                epoch,
                result,
            } => {
                let failed = result.is_err();
                self.monitor.session_started(device, epoch, result);
                if failed {
                    let message = self
                        .monitor
                        .last_error()
                        .map(|err| format!("start failed: {err}"));
                    if let Some(message) = message {
                        self.set_status_message(message);
                    }
                }
            }
            Outcome::Stopped {
                device,
                epoch,
                result,
            } => {
                self.monitor.session_stopped(device, epoch, result);
            }
            Outcome::Devices { result } => {
                self.devices_loading = false;
                match result {
                    Ok(devices) => {
                        let max = devices.len().saturating_sub(1);
                        self.selected_device_index = self.selected_device_index.min(max);
                        self.registry.store_devices(devices);
                    }
                    Err(err) => self.set_status_message(format!("device list failed: {err}")),
                }
            }
            Outcome::Registers { device, result } => match result {
                Ok(registers) => {
                    let max = registers.len().saturating_sub(1);
                    self.selected_register_index = self.selected_register_index.min(max);
                    self.registry.store_registers(device, registers.clone());
                    self.monitor.set_registers(device, registers);
                }
                Err(err) => self.set_status_message(format!("register list failed: {err}")),
            },
            Outcome::MonitoredChanged {
                device,
                register,
                result,
            } => match result {
                Ok(updated) => {
                    self.set_status_message(format!(
                        "{}: monitoring {}",
                        updated.name,
                        if updated.monitored { "on" } else { "off" }
                    ));
                    // The cached list is stale now; refetch before trusting it.
                    self.registry.invalidate_registers(device);
                    self.backend.spawn_list_registers(device);
                }
                Err(err) => {
                    self.set_status_message(format!("register {register} update failed: {err}"))
                }
            },
            Outcome::ValueWritten {
                device: _,
                register,
                result,
            } => match result {
                Ok(()) => self.set_status_message(format!("register {register} written")),
                Err(err) => {
                    self.set_status_message(format!("register {register} write failed: {err}"))
                }
            },
        }
    }

    /// Request a fresh device list from the hub.
    pub fn refresh_devices(&mut self) {
        self.devices_loading = true;
        self.backend.spawn_list_devices();
    }

    /// Start monitoring the device highlighted in the Devices view.
    pub fn select_highlighted_device(&mut self) {
        let Some(device) = self
            .registry
            .devices()
            .and_then(|devices| devices.get(self.selected_device_index))
            .map(|device| device.id)
        else {
            return;
        };

        self.monitor.select_device(Some(device));
        // Register metadata is refreshed on every selection change, never
        // carried over from the previous device.
        self.registry.invalidate_registers(device);
        self.backend.spawn_list_registers(device);
        self.selected_register_index = 0;
        self.current_view = View::Dashboard;
    }

    /// Stop the running session and clear the selection.
    pub fn deselect_device(&mut self) {
        self.monitor.select_device(None);
    }

    /// Refetch the register list for the selected device.
    pub fn refresh_registers(&mut self) {
        if let Some(device) = self.monitor.selected_device() {
            self.registry.invalidate_registers(device);
            self.backend.spawn_list_registers(device);
        }
    }

    /// Toggle the monitored flag of the highlighted register.
    pub fn toggle_monitored(&mut self) {
        let Some(device) = self.monitor.selected_device() else {
            return;
        };
        let Some(register) = self.monitor.registers().get(self.selected_register_index) else {
            return;
        };
        self.backend
            .spawn_set_monitored(device, register.id, !register.monitored);
    }

    /// Open the value-write input for the highlighted register.
    pub fn start_value_input(&mut self) {
        let Some(register) = self.monitor.registers().get(self.selected_register_index) else {
            return;
        };
        self.value_input = Some(ValueInput {
            register: register.id,
            register_name: register.name.clone(),
            buffer: String::new(),
        });
    }

    /// Append a character to the value input.
    pub fn input_push(&mut self, c: char) {
        if let Some(input) = &mut self.value_input {
            input.buffer.push(c);
        }
    }

    /// Remove the last character from the value input.
    pub fn input_pop(&mut self) {
        if let Some(input) = &mut self.value_input {
            input.buffer.pop();
        }
    }

    /// Parse and submit the value input.
    pub fn submit_value_input(&mut self) {
        let Some(input) = self.value_input.take() else {
            return;
        };
        let Some(device) = self.monitor.selected_device() else {
            return;
        };
        match input.buffer.trim().parse::<f64>() {
            Ok(value) => {
                self.backend
                    .spawn_write_register(device, input.register, value);
            }
            Err(_) => {
                self.set_status_message(format!("not a number: {:?}", input.buffer));
            }
        }
    }

    /// Close the value input without submitting.
    pub fn cancel_value_input(&mut self) {
        self.value_input = None;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        match self.current_view {
            View::Devices => {
                let count = self.registry.devices().map_or(0, |devices| devices.len());
                let max = count.saturating_sub(1);
                self.selected_device_index = (self.selected_device_index + 1).min(max);
            }
            View::Registers => {
                let max = self.monitor.registers().len().saturating_sub(1);
                self.selected_register_index = (self.selected_register_index + 1).min(max);
            }
            View::Dashboard => {}
        }
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        match self.current_view {
            View::Devices => {
                self.selected_device_index = self.selected_device_index.saturating_sub(1);
            }
            View::Registers => {
                self.selected_register_index = self.selected_register_index.saturating_sub(1);
            }
            View::Dashboard => {}
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
