//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition, Paragraph, Tabs,
        Wrap,
    },
    Frame,
};

use crate::app::{App, Screen, View, TABS};
use crate::data::series::{x_bounds, y_bounds, Series};
use crate::data::{Bucket, BucketCounts};
use crate::events::tab_title;
use crate::source::Load;

/// Dimmed text.
pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Bucket counts shown in the header, with the noun they count.
fn header_counts(app: &App, now: DateTime<Utc>) -> Option<(BucketCounts, &'static str)> {
    let (loaded, counts) = match &app.screen {
        Screen::Operators(state) => return state.counts().map(|c| (c, "operators")),
        Screen::OperatorHistory(state) => (state.samples.loaded().is_some(), state.counts(now)),
        Screen::ShardHealth(state) => (state.samples.loaded().is_some(), state.counts(now)),
        _ => return None,
    };
    loaded.then_some((counts, "samples"))
}

fn count_span(app: &App, count: usize, bucket: Bucket) -> Span<'static> {
    if count > 0 {
        Span::styled(format!("{}", count), app.theme.bucket_style(bucket))
    } else {
        Span::styled("0", dim())
    }
}

/// Render the header bar with a health overview of the current view.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled("WALRUS WATCH ", bold());

    let Some((counts, noun)) = header_counts(app, Utc::now()) else {
        let tail = if app.screen.is_loading() {
            "│ Loading..."
        } else {
            "│ "
        };
        let line = Line::from(vec![
            Span::raw(" ● "),
            title,
            Span::raw(tail),
            Span::styled(app.source_description().to_string(), dim()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Overall status indicator
    let status_style = counts
        .worst()
        .map(|bucket| app.theme.bucket_style(bucket))
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        title,
        Span::raw("│ "),
        count_span(app, counts.ok, Bucket::Ok),
        Span::raw(" ok "),
        count_span(app, counts.warning, Bucket::Warning),
        Span::raw(" warn "),
        count_span(app, counts.critical, Bucket::Critical),
        Span::raw(" crit "),
        count_span(app, counts.unknown, Bucket::Unknown),
        Span::raw(" n/a │ "),
        Span::styled(counts.total().to_string(), bold()),
        Span::raw(format!(" {} │ ", noun)),
        Span::styled(app.source_description().to_string(), dim()),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = TABS.map(|view| Line::from(tab_title(view)));

    let tabs = Tabs::new(titles)
        .select(app.current_view().tab_index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

fn controls(view: View) -> &'static str {
    match view {
        View::Operators => "/:filter Enter:history Tab:switch ?:help q:quit",
        View::OperatorHistory => "t:window g:green Esc:back ?:help q:quit",
        View::ShardHealth => "t:window Tab:switch ?:help q:quit",
        View::ShardOwners => "/:search Enter:select Tab:switch ?:help q:quit",
        View::BlobSearch => "/:blob id Tab:switch ?:help q:quit",
    }
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let style = Style::default().fg(app.theme.highlight);
        let paragraph = Paragraph::new(format!(" {} ", msg)).style(style);
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if app.input_active {
        " Type to search | Enter:apply Esc:cancel Ctrl-C:clear".to_string()
    } else if let Some(err) = app.screen.error() {
        format!(" {} | Error: {} | r:retry q:quit", app.breadcrumb(), err)
    } else if app.screen.is_loading() {
        format!(" {} | Loading... | q:quit", app.breadcrumb())
    } else {
        let updated = app
            .last_update
            .map(|t| format!("Updated {:.1}s ago | ", t.elapsed().as_secs_f64()))
            .unwrap_or_default();
        let controls = controls(app.current_view());
        format!(" {} | {}{}", app.breadcrumb(), updated, controls)
    };

    let paragraph = Paragraph::new(status).style(dim());

    frame.render_widget(paragraph, area);
}

/// Title suffix describing the input of the current view.
pub fn input_info(app: &App, prefix: &str) -> String {
    if app.input_active {
        format!(" {}{}_", prefix, app.input_text)
    } else if !app.input_text.is_empty() {
        format!(" {}{} [c:clear]", prefix, app.input_text)
    } else {
        String::new()
    }
}

/// Render a bordered block with the given title.
pub fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Render the placeholder for data that is not loaded yet.
///
/// Returns the data once it is loaded, so callers can render it.
pub fn loaded_or_placeholder<'a, T>(
    frame: &mut Frame,
    app: &App,
    load: &'a Load<T>,
    title: &str,
    area: Rect,
) -> Option<&'a T> {
    let (text, style) = match load {
        Load::Loaded(data) => return Some(data),
        Load::Loading => ("Loading...".to_string(), dim()),
        Load::Errored(e) => (e.to_string(), app.theme.bucket_style(Bucket::Critical)),
        Load::Unloaded => (String::new(), Style::default()),
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block(app, format!(" {} ", title.trim())));
    frame.render_widget(paragraph, area);
    None
}

/// Render line series over time, one color per series.
///
/// The y axis starts at zero and reaches at least `y_floor`. `reference`
/// lines (thresholds) span the data and do not widen the x axis.
pub fn render_chart(
    frame: &mut Frame,
    app: &App,
    title: String,
    series: &[(Series, Color)],
    reference: Option<(&'static str, f64, Color)>,
    y_floor: f64,
    area: Rect,
) {
    let data: Vec<Series> = series.iter().map(|(s, _)| s.clone()).collect();
    let Some(x) = x_bounds(&data) else {
        let paragraph = Paragraph::new("No data in this window")
            .alignment(Alignment::Center)
            .style(dim())
            .block(block(app, title));
        frame.render_widget(paragraph, area);
        return;
    };
    let y = y_bounds(&data, y_floor);
    let reference = reference.map(|(name, value, color)| (Series::flat(name, x, value), color));

    let datasets: Vec<Dataset> = series
        .iter()
        .chain(reference.iter())
        .filter(|(s, _)| !s.is_empty())
        .map(|(s, color)| {
            Dataset::default()
                .name(s.name)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(&s.points)
        })
        .collect();

    let mid = (x[0] + x[1]) / 2.0;
    let x_axis = Axis::default()
        .bounds(x)
        .style(Style::default().fg(app.theme.border))
        .labels(vec![
            Span::from(time_label(x[0])),
            Span::from(time_label(mid)),
            Span::from(time_label(x[1])),
        ]);
    let y_axis = Axis::default()
        .bounds(y)
        .style(Style::default().fg(app.theme.border))
        .labels(vec![
            Span::from("0"),
            Span::from(format!("{:.0}", y[1] / 2.0)),
            Span::from(format!("{:.0}", y[1])),
        ]);

    let chart = Chart::new(datasets)
        .block(block(app, title))
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));
    frame.render_widget(chart, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |name: &'static str| Line::from(Span::styled(name, bold()));

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-4 ←/→ h/l Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Open / select"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Views"),
        Line::from("  /         Filter or search"),
        Line::from("  c         Clear filter or search"),
        Line::from("  t / T     Next / previous window"),
        Line::from("  g         Hide healthy blocks"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload view"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", dim())),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Format a byte size for display.
pub fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Chart axis label for a unix timestamp.
pub fn time_label(seconds: f64) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
