//! Devices view rendering.
//!
//! Lists all devices known to the hub with their network address and
//! connectivity status; Enter starts a monitoring session for the selection.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the Devices view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(devices) = app.registry.devices() else {
        let message = if app.devices_loading {
            " Loading devices..."
        } else {
            " No device list yet. Press r to fetch."
        };
        let block = Block::default()
            .title(" Devices ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    };

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Address"),
        Cell::from("Unit"),
        Cell::from("Link"),
    ])
    .height(1)
    .style(app.theme.header);

    let selected_id = app.monitor.selected_device();

    let rows: Vec<Row> = devices
        .iter()
        .map(|device| {
            let link = if device.connected {
                "connected"
            } else {
                "offline"
            };
            let marker = if selected_id == Some(device.id) {
                format!("● {}", device.name)
            } else {
                device.name.clone()
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(device.address()),
                Cell::from(device.unit_id.to_string()),
                Cell::from(link).style(app.theme.connected_style(device.connected)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Min(6),
        Constraint::Min(10),
    ];

    let selected_index = app.selected_device_index.min(devices.len().saturating_sub(1));
    let title = format!(" Devices ({}) [Enter:monitor] ", devices.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !devices.is_empty() {
        state.select(Some(selected_index));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
