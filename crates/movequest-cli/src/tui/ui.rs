//! TUI rendering: steps over acceleration.
//!
//! ┌──────────────────────────────────────────────┐
//! │  👟 MoveQuest  receiving on http://…  200 pts │
//! ├──────────────────────────────────────────────┤
//! │  Total steps  ▁▂▂▃▄▄▅▆▆▇                      │
//! ├──────────────────────────────────────────────┤
//! │  Acceleration magnitude  raw · filtered · 1.2g│
//! ├──────────────────────────────────────────────┤
//! │  Axis acceleration  x · y · z   (logs only)   │
//! ├──────────────────────────────────────────────┤
//! │  q: quit                                     │
//! └──────────────────────────────────────────────┘

use movequest_core::{AxisSeries, STEP_THRESHOLD_G, Snapshot, TimeSeriesView};
use ratatui::{prelude::*, widgets::*};

/// Draw one frame purely from `snap`. `axes` adds a per-axis chart when it
/// holds one `[x, y, z]` entry per sample.
pub fn draw(f: &mut Frame, header: &str, live: bool, snap: &Snapshot, axes: &[[f64; 3]]) {
    let view = TimeSeriesView::from_snapshot(snap);
    let axis_series = view.as_ref().and_then(|v| v.axis_series(axes));

    let constraints = if axis_series.is_some() {
        vec![
            Constraint::Length(3),      // title
            Constraint::Percentage(30), // steps
            Constraint::Min(8),         // acceleration
            Constraint::Percentage(30), // axes
            Constraint::Length(1),      // keys
        ]
    } else {
        vec![
            Constraint::Length(3),      // title
            Constraint::Percentage(45), // steps
            Constraint::Min(8),         // acceleration
            Constraint::Length(1),      // keys
        ]
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_title(f, rows[0], header, view.as_ref());

    match &view {
        Some(v) => {
            draw_steps(f, rows[1], v);
            draw_accel(f, rows[2], v);
            if let Some(a) = &axis_series {
                draw_axes(f, rows[3], v, a);
            }
        }
        None => {
            let area = rows[1].union(rows[2]);
            draw_waiting(f, area, live);
        }
    }

    draw_keys(f, rows[rows.len() - 1]);
}

fn draw_title(f: &mut Frame, area: Rect, header: &str, view: Option<&TimeSeriesView>) {
    let stats = match view {
        Some(v) => format!(
            "  {} pts  steps {}  raw {:.2}g  filtered {:.2}g ",
            v.len, v.latest.step_count, v.latest.raw_magnitude, v.latest.filtered_magnitude
        ),
        None => "  0 pts ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 👟 MoveQuest ", Style::default().bold().fg(Color::Cyan)),
            Span::raw(format!(" {header}")),
            Span::styled(stats, Style::default().fg(Color::DarkGray)),
        ]));

    f.render_widget(block, area);
}

fn draw_waiting(f: &mut Frame, area: Rect, live: bool) {
    let msg = if live {
        "Waiting for data from the wearable…"
    } else {
        "No readable rows in this log"
    };
    let p = Paragraph::new(msg)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Step Detection "));
    f.render_widget(p, area);
}

fn draw_steps(f: &mut Frame, area: Rect, v: &TimeSeriesView) {
    let datasets = vec![
        Dataset::default()
            .name("Steps")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&v.steps),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Total Steps Detected  {} ", v.latest.step_count)),
        )
        .x_axis(time_axis(v))
        .y_axis(
            Axis::default()
                .title("steps")
                .bounds(v.step_bounds)
                .labels(vec![
                    Line::from(format!("{:.0}", v.step_bounds[0])),
                    Line::from(format!("{:.0}", v.step_bounds[1])),
                ]),
        );

    f.render_widget(chart, area);
}

fn draw_accel(f: &mut Frame, area: Rect, v: &TimeSeriesView) {
    let threshold = v.threshold_line();
    let datasets = vec![
        Dataset::default()
            .name("Raw")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&v.raw),
        Dataset::default()
            .name("Filtered")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&v.filtered),
        Dataset::default()
            .name(format!("Threshold {STEP_THRESHOLD_G}g"))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&threshold),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Acceleration Magnitude "),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(time_axis(v))
        .y_axis(
            Axis::default()
                .title("g")
                .bounds(v.accel_bounds)
                .labels(vec![
                    Line::from(format!("{:.1}", v.accel_bounds[0])),
                    Line::from(format!("{:.1}", v.accel_bounds[1])),
                ]),
        );

    f.render_widget(chart, area);
}

fn draw_axes(f: &mut Frame, area: Rect, v: &TimeSeriesView, a: &AxisSeries) {
    let datasets = vec![
        Dataset::default()
            .name("X")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&a.x),
        Dataset::default()
            .name("Y")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&a.y),
        Dataset::default()
            .name("Z")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::White))
            .data(&a.z),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Axis Acceleration "),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(time_axis(v))
        .y_axis(
            Axis::default()
                .title("g")
                .bounds(a.bounds)
                .labels(vec![
                    Line::from(format!("{:.1}", a.bounds[0])),
                    Line::from(format!("{:.1}", a.bounds[1])),
                ]),
        );

    f.render_widget(chart, area);
}

fn time_axis(v: &TimeSeriesView) -> Axis<'static> {
    Axis::default()
        .title("seconds")
        .bounds(v.time_bounds)
        .labels(vec![
            Line::from(format!("{:.1}", v.time_bounds[0])),
            Line::from(format!("{:.1}", v.time_bounds[1])),
        ])
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(" q: quit")
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
