//! Terminal rendering.
//!
//! This module contains the frame layout, the header/tab/status chrome, the
//! help overlay, and the three views.

pub mod dashboard;
pub mod devices;
pub mod registers;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Render one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(ratatui::layout::Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Devices => devices::render(frame, app, chunks[2]),
        View::Dashboard => dashboard::render(frame, app, chunks[2]),
        View::Registers => registers::render(frame, app, chunks[2]),
    }

    render_status_bar(frame, app, chunks[3]);

    if app.value_input.is_some() {
        registers::render_value_input(frame, app, area);
    }

    if app.show_help {
        render_help(frame, app, area);
    }
}

/// Render the header bar with session and stream state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.monitor.session_state();
    let status = app.monitor.stream_status();

    let device_name = app
        .monitor
        .selected_device()
        .and_then(|id| app.registry.device(id))
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "no device".to_string());

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.session_style(state)),
        Span::styled("PLCWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(device_name),
        Span::raw(" │ session: "),
        Span::styled(state.label(), app.theme.session_style(state)),
        Span::raw(" │ feed: "),
        Span::styled(status.label(), app.theme.stream_style(status)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Devices "),
        Line::from(" 2:Dashboard "),
        Line::from(" 3:Registers "),
    ];

    let selected = match app.current_view {
        View::Devices => 0,
        View::Dashboard => 1,
        View::Registers => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary feedback, the last session error, or the key hints for
/// the current view.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(err) = app.monitor.last_error() {
        let paragraph = Paragraph::new(format!(" Error: {} ", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Devices => "↑↓:select Enter:monitor r:refresh Tab:switch ?:help q:quit",
        View::Dashboard => "s:stop r:refresh Tab:switch Esc:devices ?:help q:quit",
        View::Registers => {
            if app.value_input.is_some() {
                "Type a value | Enter:write Esc:cancel"
            } else {
                "↑↓:select m:toggle w:write s:stop Esc:devices ?:help q:quit"
            }
        }
    };

    let paragraph =
        Paragraph::new(format!(" {} | {}", app.current_view.label(), controls))
            .style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  Esc         Back to devices"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Monitoring",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Enter       Monitor selected device"),
        Line::from("  s           Stop the session"),
        Line::from("  r           Refresh metadata"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Registers",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  m           Toggle monitored flag"),
        Line::from("  w           Write a value"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
