//! Monitoring session lifecycle state machine.
//!
//! The controller decides *what* backend calls to issue; it performs no I/O
//! itself. `select` is a single non-suspending step, so the caller can clear
//! its buffers and retarget the stream filter before any returned command is
//! dispatched. That ordering, not backend sequencing, is what makes device
//! switches safe.

use plcwatch_types::DeviceId;

/// Lifecycle of the backend monitoring session for the selected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session and no device selected.
    Idle,
    /// A start call for this device is in flight.
    Starting(DeviceId),
    /// The hub confirmed it is polling this device.
    Active(DeviceId),
    /// The selection was cleared and the stop call is in flight.
    Stopping(DeviceId),
    /// A start or stop call for this device failed; cleared by the next
    /// selection change.
    Error(DeviceId),
}

impl SessionState {
    /// The device this state refers to, if any.
    pub fn device(&self) -> Option<DeviceId> {
        match self {
            SessionState::Idle => None,
            SessionState::Starting(d)
            | SessionState::Active(d)
            | SessionState::Stopping(d)
            | SessionState::Error(d) => Some(*d),
        }
    }

    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Starting(_) => "starting",
            SessionState::Active(_) => "monitoring",
            SessionState::Stopping(_) => "stopping",
            SessionState::Error(_) => "error",
        }
    }
}

/// A backend call the controller wants issued.
///
/// Commands carry the epoch current at issue time; a completion delivered
/// with an older epoch belongs to an abandoned selection and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start { device: DeviceId, epoch: u64 },
    Stop { device: DeviceId, epoch: u64 },
}

/// State machine owning the start/stop lifecycle of the monitoring session.
///
/// At most one session is live at a time. Start and stop calls race freely
/// against each other and against selection changes; correctness comes from
/// the epoch check on completion, never from backend completion order.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    epoch: u64,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            epoch: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply a selection change, returning the backend calls to issue.
    ///
    /// Selecting the device that is already Active or Starting is a no-op
    /// returning no commands, so a duplicate start can never be issued.
    /// Switching away from a live session emits a fire-and-forget stop for
    /// the old device; the new selection does not wait on its outcome.
    pub fn select(&mut self, device: Option<DeviceId>) -> Vec<Command> {
        if let Some(id) = device {
            if matches!(
                self.state,
                SessionState::Active(cur) | SessionState::Starting(cur) if cur == id
            ) {
                return Vec::new();
            }
        }

        self.epoch += 1;
        let mut commands = Vec::new();

        let live = match self.state {
            SessionState::Active(old) | SessionState::Starting(old) => Some(old),
            _ => None,
        };
        if let Some(old) = live {
            commands.push(Command::Stop {
                device: old,
                epoch: self.epoch,
            });
        }

        match device {
            Some(id) => {
                self.state = SessionState::Starting(id);
                commands.push(Command::Start {
                    device: id,
                    epoch: self.epoch,
                });
            }
            None => {
                self.state = match live {
                    Some(old) => SessionState::Stopping(old),
                    None => SessionState::Idle,
                };
            }
        }

        commands
    }

    /// Record the completion of a start call.
    ///
    /// Returns whether the completion was current. Stale completions (older
    /// epoch, or a device that is no longer the one starting) leave the
    /// state untouched.
    pub fn on_started(&mut self, device: DeviceId, epoch: u64, ok: bool) -> bool {
        if epoch != self.epoch
            || !matches!(self.state, SessionState::Starting(d) if d == device)
        {
            return false;
        }
        self.state = if ok {
            SessionState::Active(device)
        } else {
            SessionState::Error(device)
        };
        true
    }

    /// Record the completion of a stop call.
    ///
    /// Only a stop issued by a plain deselection is still current when it
    /// completes; a stop fired while switching to another device finds the
    /// controller in `Starting`/`Active` for the new device and reports
    /// stale here.
    pub fn on_stopped(&mut self, device: DeviceId, epoch: u64, ok: bool) -> bool {
        if epoch != self.epoch
            || !matches!(self.state, SessionState::Stopping(d) if d == device)
        {
            return false;
        }
        self.state = if ok {
            SessionState::Idle
        } else {
            SessionState::Error(device)
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_commands(commands: &[Command]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, Command::Start { .. }))
            .count()
    }

    #[test]
    fn first_selection_issues_one_start() {
        let mut controller = SessionController::new();
        let commands = controller.select(Some(1));

        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::Start { device: 1, .. }));
        assert_eq!(controller.state(), SessionState::Starting(1));
    }

    #[test]
    fn reselecting_the_same_device_is_a_no_op() {
        let mut controller = SessionController::new();
        let first = controller.select(Some(1));
        let again_while_starting = controller.select(Some(1));

        let Command::Start { epoch, .. } = first[0] else {
            panic!("expected start");
        };
        assert!(controller.on_started(1, epoch, true));
        let again_while_active = controller.select(Some(1));

        assert_eq!(start_commands(&first), 1);
        assert!(again_while_starting.is_empty());
        assert!(again_while_active.is_empty());
        assert_eq!(controller.state(), SessionState::Active(1));
    }

    #[test]
    fn switching_devices_stops_old_and_starts_new() {
        let mut controller = SessionController::new();
        let first = controller.select(Some(1));
        let Command::Start { epoch, .. } = first[0] else {
            panic!("expected start");
        };
        controller.on_started(1, epoch, true);

        let commands = controller.select(Some(2));
        assert!(matches!(commands[0], Command::Stop { device: 1, .. }));
        assert!(matches!(commands[1], Command::Start { device: 2, .. }));
        assert_eq!(controller.state(), SessionState::Starting(2));
    }

    #[test]
    fn late_start_for_an_abandoned_device_is_ignored() {
        let mut controller = SessionController::new();
        let first = controller.select(Some(1));
        let Command::Start { epoch: old_epoch, .. } = first[0] else {
            panic!("expected start");
        };

        // Device 2 is selected before device 1's start resolves.
        controller.select(Some(2));

        assert!(!controller.on_started(1, old_epoch, true));
        assert_eq!(controller.state(), SessionState::Starting(2));
    }

    #[test]
    fn start_failure_enters_error_until_next_selection() {
        let mut controller = SessionController::new();
        let commands = controller.select(Some(1));
        let Command::Start { epoch, .. } = commands[0] else {
            panic!("expected start");
        };

        assert!(controller.on_started(1, epoch, false));
        assert_eq!(controller.state(), SessionState::Error(1));

        // The next selection change clears the error.
        controller.select(None);
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn reselecting_a_failed_device_retries_the_start() {
        let mut controller = SessionController::new();
        let commands = controller.select(Some(1));
        let Command::Start { epoch, .. } = commands[0] else {
            panic!("expected start");
        };
        controller.on_started(1, epoch, false);

        let retry = controller.select(Some(1));
        // No session is live after a failed start, so there is nothing to
        // stop, just one fresh start.
        assert_eq!(retry.len(), 1);
        assert!(matches!(retry[0], Command::Start { device: 1, .. }));
        assert_eq!(controller.state(), SessionState::Starting(1));
    }

    #[test]
    fn deselecting_stops_then_idles() {
        let mut controller = SessionController::new();
        let commands = controller.select(Some(1));
        let Command::Start { epoch, .. } = commands[0] else {
            panic!("expected start");
        };
        controller.on_started(1, epoch, true);

        let commands = controller.select(None);
        assert_eq!(commands.len(), 1);
        let Command::Stop { device, epoch } = commands[0] else {
            panic!("expected stop");
        };
        assert_eq!(device, 1);
        assert_eq!(controller.state(), SessionState::Stopping(1));

        assert!(controller.on_stopped(1, epoch, true));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn deselecting_while_idle_issues_nothing() {
        let mut controller = SessionController::new();
        assert!(controller.select(None).is_empty());
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn stale_stop_completion_is_ignored() {
        let mut controller = SessionController::new();
        let commands = controller.select(Some(1));
        let Command::Start { epoch, .. } = commands[0] else {
            panic!("expected start");
        };
        controller.on_started(1, epoch, true);

        // Switching devices fires a stop for device 1 whose epoch is already
        // superseded by the new selection.
        let commands = controller.select(Some(2));
        let Command::Stop { epoch: stop_epoch, .. } = commands[0] else {
            panic!("expected stop");
        };

        assert!(!controller.on_stopped(1, stop_epoch, false));
        assert_eq!(controller.state(), SessionState::Starting(2));
    }
}
