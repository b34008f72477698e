//! Registers view rendering.
//!
//! Shows the selected device's register table with live values; `m` toggles
//! a register's monitored flag on the hub, `w` opens the value-write input.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the Registers view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let registers = app.monitor.registers();

    if app.monitor.selected_device().is_none() {
        let block = bordered_block(app, " Registers ");
        frame.render_widget(
            Paragraph::new(" Select a device to list its registers.").block(block),
            area,
        );
        return;
    }

    if registers.is_empty() {
        let block = bordered_block(app, " Registers ");
        frame.render_widget(
            Paragraph::new(" No registers configured on this device.").block(block),
            area,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("Register"),
        Cell::from("Addr"),
        Cell::from("Type"),
        Cell::from("Scale"),
        Cell::from("Unit"),
        Cell::from("Value"),
        Cell::from("Mon"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = registers
        .iter()
        .map(|register| {
            let value = app
                .monitor
                .latest(register.id)
                .map(|reading| format!("{:.2}", reading.value))
                .unwrap_or_else(|| "--".to_string());

            let monitored = if register.monitored { "✓" } else { "·" };
            let monitored_style = if register.monitored {
                Style::default().fg(app.theme.healthy)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };

            Row::new(vec![
                Cell::from(register.name.clone()),
                Cell::from(register.address.to_string()),
                Cell::from(register.data_type.label()),
                Cell::from(format!("{}", register.scaling_factor)),
                Cell::from(register.unit.clone().unwrap_or_default()),
                Cell::from(value),
                Cell::from(monitored).style(monitored_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Min(5),
        Constraint::Min(6),
        Constraint::Min(6),
        Constraint::Min(6),
        Constraint::Fill(1),
        Constraint::Min(4),
    ];

    let monitored_count = registers.iter().filter(|r| r.monitored).count();
    let title = format!(
        " Registers ({} monitored / {}) [m:toggle w:write] ",
        monitored_count,
        registers.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered_block(app, &title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(
        app.selected_register_index
            .min(registers.len().saturating_sub(1)),
    ));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the value-write input as a small centered modal.
pub fn render_value_input(frame: &mut Frame, app: &App, area: Rect) {
    let Some(input) = &app.value_input else {
        return;
    };

    let lines = vec![
        Line::from(format!("Write to {}", input.register_name)),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(
                format!("{}_", input.buffer),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let block = Block::default()
        .title(" Write value ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let width = 36u16.min(area.width.saturating_sub(4));
    let height = 4u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn bordered_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}
