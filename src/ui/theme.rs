//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::session::SessionState;
use crate::telemetry::StreamStatus;

/// Palette cycled through for chart series.
pub const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for degraded or failed state.
    pub critical: Color,
    /// Color for in-between state (starting, reconnecting).
    pub warning: Color,
    /// Color for healthy/live state.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            critical: Color::Red,
            warning: Color::Yellow,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            critical: Color::Red,
            warning: Color::Yellow,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a session state indicator.
    pub fn session_style(&self, state: SessionState) -> Style {
        match state {
            SessionState::Active(_) => Style::default().fg(self.healthy),
            SessionState::Starting(_) | SessionState::Stopping(_) => {
                Style::default().fg(self.warning)
            }
            SessionState::Error(_) => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            SessionState::Idle => Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// Style for a stream status indicator.
    pub fn stream_style(&self, status: StreamStatus) -> Style {
        match status {
            StreamStatus::Connected => Style::default().fg(self.healthy),
            StreamStatus::Reconnecting { .. } => Style::default().fg(self.warning),
            StreamStatus::Closed => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Style for a device connectivity flag.
    pub fn connected_style(&self, connected: bool) -> Style {
        if connected {
            Style::default().fg(self.healthy)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }
}
