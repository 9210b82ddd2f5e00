//! Operator history view.
//!
//! Two block strips (node status and event pending, newest first) above a
//! chart of owned and ready shards.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::common::{block, dim, loaded_or_placeholder, render_chart};
use crate::app::App;
use crate::data::series::sparkline;
use crate::data::Bucket;
use crate::state::HistoryState;

const BLOCK: &str = "■";

const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the pending trend, in characters.
const TREND_WIDTH: usize = 16;

/// Render the history of the operator held in `state`.
pub fn render(frame: &mut Frame, app: &App, state: &HistoryState, area: Rect) {
    let window = state.window.current();
    let span = format!("{} ({})", window.label, window.selector.describe());
    let title = format!(" {} │ {} [t:window] ", state.endpoint, span);
    if loaded_or_placeholder(frame, app, &state.samples, &title, area).is_none() {
        return;
    }

    let now = Utc::now();
    let chunks = Layout::vertical([
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Min(8),
    ])
    .split(area);

    let readings: Vec<_> = state.window(now).iter().map(|s| s.event_pending).collect();
    let trend = render_sparkline(&sparkline(&readings));
    let pending_name = if trend.is_empty() {
        "Event pending".to_string()
    } else {
        format!("Event pending {}", trend)
    };

    let statuses = state.status_strip(now);
    render_strip(frame, app, state, "Node status", &statuses, chunks[0]);
    let pending = state.pending_strip(now);
    render_strip(frame, app, state, &pending_name, &pending, chunks[1]);

    let series = state.series(now);
    let colored: Vec<_> = series
        .into_iter()
        .zip([app.theme.highlight, Color::Magenta])
        .collect();
    render_chart(frame, app, title, &colored, None, 0.0, chunks[2]);
}

fn render_strip(
    frame: &mut Frame,
    app: &App,
    state: &HistoryState,
    name: &str,
    blocks: &[Bucket],
    area: Rect,
) {
    let hidden = if state.show_green {
        ""
    } else {
        ", healthy hidden"
    };
    let title = format!(" {} ({} blocks{}) [g:green] ", name, blocks.len(), hidden);

    let spans: Vec<Span> = blocks
        .iter()
        .map(|bucket| Span::styled(BLOCK, app.theme.bucket_style(*bucket)))
        .collect();

    let paragraph = if spans.is_empty() {
        Paragraph::new(Line::from(Span::styled("Nothing to show", dim())))
    } else {
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false })
    };

    frame.render_widget(paragraph.block(block(app, title)), area);
}

fn render_sparkline(data: &[u8]) -> String {
    // Most recent readings only
    let start = data.len().saturating_sub(TREND_WIDTH);
    data[start..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}
