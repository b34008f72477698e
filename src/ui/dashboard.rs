//! Dashboard view rendering.
//!
//! Live value cards with gauges for each monitored register, above a
//! multi-series chart built from the aligned datasets. Gaps in a series
//! (registers that started updating late) produce no point at all, so the
//! line connects across them instead of dropping to zero.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};

use plcwatch_types::Register;

use crate::app::App;
use crate::ui::theme::SERIES_COLORS;

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.monitor.selected_device().is_none() {
        let block = Block::default()
            .title(" Dashboard ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        frame.render_widget(
            Paragraph::new(" Select a device to start monitoring.").block(block),
            area,
        );
        return;
    }

    let monitored: Vec<&Register> = app
        .monitor
        .registers()
        .iter()
        .filter(|r| r.monitored)
        .collect();

    if monitored.is_empty() {
        let block = Block::default()
            .title(" Dashboard ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        frame.render_widget(
            Paragraph::new(" No monitored registers on this device.").block(block),
            area,
        );
        return;
    }

    let chunks = Layout::vertical([Constraint::Length(5), Constraint::Min(6)]).split(area);

    render_cards(frame, app, &monitored, chunks[0]);
    render_chart(frame, app, chunks[1]);
}

/// Render one value card per monitored register.
fn render_cards(frame: &mut Frame, app: &App, monitored: &[&Register], area: Rect) {
    // Cap the card count to what the width can reasonably hold.
    let max_cards = (area.width / 18).max(1) as usize;
    let shown = &monitored[..monitored.len().min(max_cards)];

    let constraints: Vec<Constraint> = shown.iter().map(|_| Constraint::Fill(1)).collect();
    let slots = Layout::horizontal(constraints).split(area);

    for (i, register) in shown.iter().enumerate() {
        render_card(frame, app, register, slots[i]);
    }
}

fn render_card(frame: &mut Frame, app: &App, register: &Register, area: Rect) {
    let reading = app.monitor.latest(register.id);

    let unit = register.unit.as_deref().unwrap_or("");
    let value_text = match reading {
        Some(reading) => format!("{:.2} {}", reading.value, unit),
        None => "--".to_string(),
    };

    let block = Block::default()
        .title(format!(" {} ", register.name))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            value_text,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );

    // Gauge scaled by the event's bounds metadata, falling back to the
    // register's configured bounds.
    let bounds = reading
        .and_then(|r| match (r.min_value, r.max_value) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
        .or_else(|| register.bounds());

    if let (Some(reading), Some((min, max))) = (reading, bounds) {
        if max > min {
            let ratio = ((reading.value - min) / (max - min)).clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(app.theme.highlight))
                .ratio(ratio)
                .label(format!("{:.0}%", ratio * 100.0));
            frame.render_widget(gauge, rows[1]);
        }
    }
}

/// Render the shared multi-series chart.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let aligned = app.monitor.chart_data();
    let reference = aligned.iter().map(|s| s.points.len()).max().unwrap_or(0);

    let block = Block::default()
        .title(" Trend ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if reference == 0 {
        frame.render_widget(
            Paragraph::new(" Waiting for register updates...").block(block),
            area,
        );
        return;
    }

    // Materialize the gap-spanning point sets first; datasets borrow them.
    let series_points: Vec<Vec<(f64, f64)>> = aligned
        .iter()
        .map(|series| {
            series
                .present_points()
                .map(|(i, v)| (i as f64, v))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = aligned
        .iter()
        .zip(&series_points)
        .enumerate()
        .map(|(i, (series, points))| {
            Dataset::default()
                .name(series.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(points)
        })
        .collect();

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for value in series_points.iter().flatten().map(|&(_, v)| v) {
        y_min = y_min.min(value);
        y_max = y_max.max(value);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        (y_min, y_max) = (0.0, 1.0);
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        // Flat line: widen the band so it doesn't hug the frame.
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_max = (reference - 1).max(1) as f64;

    // The x axis is the shared label sequence, newest update at the right.
    let last_label = app.monitor.label_seq();
    let first_label = last_label.saturating_sub(reference as u64 - 1);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(format!("#{first_label}")),
                    Span::raw(format!("#{last_label}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.1}")),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{y_max:.1}")),
                ]),
        );

    frame.render_widget(chart, area);
}
