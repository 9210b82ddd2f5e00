//! Shard health view.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::common::{block, dim, loaded_or_placeholder, render_chart};
use crate::app::App;
use crate::data::classify::SHARD_QUORUM;
use crate::data::duration::format_age;
use crate::state::ShardHealthState;

/// Render shard health over the selected window.
pub fn render(frame: &mut Frame, app: &App, state: &ShardHealthState, area: Rect) {
    let window = state.window.current();
    let span = format!("{} ({})", window.label, window.selector.describe());
    let title = format!(" Shard Health │ {} [t:window] ", span);
    if loaded_or_placeholder(frame, app, &state.samples, &title, area).is_none() {
        return;
    }

    let now = Utc::now();
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(8)]).split(area);

    let summary = match (state.latest(now), state.bucket(now)) {
        (Some(latest), Some(bucket)) => {
            let label = format!(" {} ", bucket.label());
            let seen = format!(
                "│ quorum {} │ {} ({})",
                SHARD_QUORUM,
                latest.timestamp.format("%Y-%m-%d %H:%M UTC"),
                format_age(latest.timestamp, now)
            );
            Line::from(vec![
                Span::styled(label, app.theme.bucket_style(bucket)),
                Span::raw(format!("│ green {} ", latest.greenshards)),
                Span::raw(format!("yellow {} ", latest.yellowshards)),
                Span::raw(format!("red {} ", latest.redshards)),
                Span::styled(seen, dim()),
            ])
        }
        _ => Line::from(Span::styled(" No samples in this window", dim())),
    };
    let summary = Paragraph::new(summary).block(block(app, " Current ".to_string()));
    frame.render_widget(summary, chunks[0]);

    let series = state.series(now);
    let colored: Vec<_> = series
        .into_iter()
        .zip([app.theme.critical, app.theme.healthy, app.theme.warning])
        .collect();
    render_chart(
        frame,
        app,
        title,
        &colored,
        Some(("Quorum", SHARD_QUORUM as f64, app.theme.threshold)),
        SHARD_QUORUM as f64,
        chunks[1],
    );
}
