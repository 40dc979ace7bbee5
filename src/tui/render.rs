use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, Gauge, GraphType, Paragraph};
use ratatui::Frame;

use crate::dashboard::{Dashboard, Status, View};
use crate::series::VolumeSeries;
use crate::snapshot::VolumeInfo;
use crate::util::{format_bytes, format_timestamp};

const HELP: &str = "tab: switch view • r: refresh • ↑↓: select drive • q: quit";

const LINE_COLORS: [Color; 8] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Indexed(202),
    Color::Indexed(199),
];

fn accent() -> Style {
    Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn header() -> Style {
    Style::new().fg(Color::Indexed(170)).add_modifier(Modifier::BOLD)
}

fn muted() -> Style {
    Style::new().fg(Color::DarkGray)
}

pub fn draw(frame: &mut Frame, dashboard: &Dashboard) {
    let [title, body, status, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(Paragraph::new(Line::styled("Disk Space Monitor", accent())), title);

    match dashboard.view() {
        View::Current => draw_current(frame, dashboard, body),
        View::Chart => draw_chart(frame, dashboard, body),
    }

    frame.render_widget(Paragraph::new(status_line(dashboard)), status);
    frame.render_widget(Paragraph::new(Line::styled(HELP, muted())), help);
}

fn status_line(dashboard: &Dashboard) -> Line<'static> {
    match dashboard.status() {
        Status::Loading => Line::styled("Refreshing data...", Style::new().fg(Color::Cyan)),
        Status::Error(e) => Line::styled(format!("Error: {e}"), Style::new().fg(Color::Red)),
        Status::Ready if !dashboard.failures().is_empty() => Line::styled(
            format!("{} volume(s) could not be measured", dashboard.failures().len()),
            Style::new().fg(Color::Yellow),
        ),
        Status::Ready => Line::default(),
    }
}

fn usage_color(ratio: f64) -> Color {
    if ratio > 0.8 {
        Color::Red
    } else if ratio > 0.6 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn draw_current(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let Some(latest) = dashboard.latest() else {
        let text = vec![
            Line::styled("Current disk status:", header()),
            Line::default(),
            Line::raw("No drives found"),
        ];
        frame.render_widget(Paragraph::new(text), area);
        return;
    };

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(latest.disks.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(area);

    frame.render_widget(Paragraph::new(Line::styled("Current disk status:", header())), rows[0]);

    for (i, disk) in latest.disks.iter().enumerate() {
        let selected = dashboard.selected_volume() == Some(disk.drive.as_str());
        draw_volume(frame, disk, selected, rows[i + 1]);
    }

    let footer = format!("Last update: {}", format_timestamp(&latest.timestamp));
    frame.render_widget(
        Paragraph::new(Line::styled(footer, muted())),
        rows[latest.disks.len() + 1],
    );
}

fn draw_volume(frame: &mut Frame, disk: &VolumeInfo, selected: bool, area: Rect) {
    let [line_area, bar_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let mut line = Line::from(vec![
        Span::styled(disk.drive.clone(), accent()),
        Span::raw(format!(
            "  Total: {}  Free: {}  Used: {} ({:.1}%)",
            format_bytes(disk.total_space),
            format_bytes(disk.free_space),
            format_bytes(disk.used_space),
            disk.used_percent()
        )),
    ]);
    if selected {
        line = line.style(Style::new().bg(Color::Indexed(237)).add_modifier(Modifier::BOLD));
    }
    frame.render_widget(Paragraph::new(line), line_area);

    let ratio = (disk.used_percent() / 100.0).clamp(0.0, 1.0);
    let bar_area = Rect {
        x: bar_area.x + 2,
        width: bar_area.width.saturating_sub(2).min(52),
        ..bar_area
    };
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::new().fg(usage_color(ratio)).bg(Color::Indexed(236)))
            .ratio(ratio)
            .label(""),
        bar_area,
    );
}

fn draw_chart(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let [heading, chart_area, stats_area, legend_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(6),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Line::styled("Free space over time:", header())), heading);

    match dashboard.series() {
        Ok(series) => {
            let color = LINE_COLORS[dashboard.selected_index() % LINE_COLORS.len()];
            draw_series(frame, series, color, chart_area);
            frame.render_widget(Paragraph::new(stats_lines(series)), stats_area);
        }
        Err(insufficient) => {
            frame.render_widget(Paragraph::new(insufficient.message()), chart_area);
        }
    }

    frame.render_widget(Paragraph::new(legend(dashboard)), legend_area);
}

fn caption(series: &VolumeSeries) -> String {
    let mut caption = format!("Drive {}: Current: {:.1} GB", series.volume, series.current());
    if series.points.len() > 1 {
        caption.push_str(&format!(", Change: {:+.1} GB", series.stats.delta));
    }
    caption
}

fn draw_series(frame: &mut Frame, series: &VolumeSeries, color: Color, area: Rect) {
    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.free_gb))
        .collect();

    let (mut low, mut high) = (series.stats.min, series.stats.max);
    if high - low < f64::EPSILON {
        low -= 1.0;
        high += 1.0;
    }
    let low = low.max(0.0);
    let x_max = (data.len().saturating_sub(1)).max(1) as f64;

    let y_labels = vec![
        format!("{low:.1}"),
        format!("{:.1}", (low + high) / 2.0),
        format!("{high:.1}"),
    ];

    let dataset = Dataset::default()
        .name(series.volume.clone())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::new().fg(color))
        .data(&data);

    let [chart_area, label_area] =
        Layout::vertical([Constraint::Min(4), Constraint::Length(1)]).areas(area);

    // plot columns start after the border, the y labels and the axis line
    let gutter = 1 + y_labels.iter().map(|l| l.len() as u16).max().unwrap_or(0) + 1;
    let plot = Rect {
        x: chart_area.x + gutter,
        width: chart_area.width.saturating_sub(gutter + 1),
        ..label_area
    };

    let row = axis_row(&series.labels, plot.width as usize);
    frame.render_widget(Paragraph::new(Line::styled(row, muted())), plot);

    let chart = Chart::new(vec![dataset])
        .block(Block::bordered().title(caption(series)))
        .x_axis(Axis::default().style(muted()).bounds([0.0, x_max]))
        .y_axis(
            Axis::default()
                .title("GB")
                .style(muted())
                .bounds([low, high])
                .labels(y_labels),
        );

    frame.render_widget(chart, chart_area);
}

/// Lays the label track out under the plot. Label `i` starts at the column
/// of point `i`; a label that would overlap its predecessor is pushed right,
/// and dropped when it no longer fits.
fn axis_row(labels: &[String], width: usize) -> String {
    let mut row = vec![' '; width];
    let last = labels.len().saturating_sub(1).max(1);
    let mut next_free = 0;

    for (i, label) in labels.iter().enumerate() {
        let len = label.chars().count();
        if len == 0 || len > width {
            continue;
        }
        let column = i * width.saturating_sub(1) / last;
        let start = column.max(next_free).min(width - len);
        if start < next_free {
            continue;
        }
        for (offset, ch) in label.chars().enumerate() {
            row[start + offset] = ch;
        }
        next_free = start + len + 1;
    }

    row.into_iter().collect()
}

fn stats_lines(series: &VolumeSeries) -> Vec<Line<'static>> {
    let stats = series.stats;
    vec![
        Line::raw("Stats for period:"),
        Line::raw(format!("  Min: {:.1} GB", stats.min)),
        Line::raw(format!("  Max: {:.1} GB", stats.max)),
        Line::raw(format!("  Avg: {:.1} GB", stats.average)),
        Line::raw(format!("  Range: {:.1} GB", stats.range)),
    ]
}

fn legend(dashboard: &Dashboard) -> Line<'static> {
    let mut spans = vec![Span::raw("Drives: ")];
    for (i, drive) in dashboard.volumes().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let mut style = Style::new().fg(LINE_COLORS[i % LINE_COLORS.len()]);
        if i == dashboard.selected_index() {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(drive.clone(), style));
    }
    Line::from(spans)
}
