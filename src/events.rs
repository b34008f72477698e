use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If the value-write input is open, it captures keystrokes
    if app.value_input.is_some() {
        handle_value_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => app.next_view(),
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Devices),
        KeyCode::Char('2') => app.set_view(View::Dashboard),
        KeyCode::Char('3') => app.set_view(View::Registers),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Enter acts on the highlighted item
        KeyCode::Enter => {
            if app.current_view == View::Devices {
                app.select_highlighted_device();
            }
        }

        // Go back to the device list
        KeyCode::Esc | KeyCode::Backspace => {
            if app.current_view != View::Devices {
                app.set_view(View::Devices);
            }
        }

        // Refresh metadata
        KeyCode::Char('r') => match app.current_view {
            View::Devices => app.refresh_devices(),
            View::Dashboard | View::Registers => app.refresh_registers(),
        },

        // Stop the running session
        KeyCode::Char('s') => app.deselect_device(),

        // Register actions
        KeyCode::Char('m') => {
            if app.current_view == View::Registers {
                app.toggle_monitored();
            }
        }
        KeyCode::Char('w') => {
            if app.current_view == View::Registers {
                app.start_value_input();
            }
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key input while the value-write input is open
fn handle_value_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_value_input(),
        KeyCode::Esc => app.cancel_value_input(),
        KeyCode::Backspace => app.input_pop(),
        // Accept anything number-shaped; parsing happens on submit
        KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e') => {
            app.input_push(c);
        }
        _ => {}
    }
}
