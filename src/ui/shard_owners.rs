//! Shard owners view.
//!
//! A grid of every shard coloured by how many operators have held it, and a
//! panel with the ownership details of the searched (or selected) shard.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::common::{block, bold, dim, input_info, loaded_or_placeholder};
use crate::app::App;
use crate::data::{Bucket, OwnerBucket, ShardInfo};
use crate::state::{owner_bucket, ShardOwnersState};

/// Width of one grid cell, including the gap.
const CELL_WIDTH: u16 = 6;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn render(frame: &mut Frame, app: &App, state: &ShardOwnersState, area: Rect) {
    let input = input_info(app, "id:");
    let title = format!(" Shards ({}){} ", state.shard_count(), input);
    let Some(shards) = loaded_or_placeholder(frame, app, &state.shards, &title, area) else {
        return;
    };

    let constraints = [Constraint::Percentage(60), Constraint::Percentage(40)];
    let chunks = Layout::horizontal(constraints).split(area);
    render_grid(frame, app, state, shards, title, chunks[0]);
    render_details(frame, app, state, chunks[1]);
}

fn render_grid(
    frame: &mut Frame,
    app: &App,
    state: &ShardOwnersState,
    shards: &[ShardInfo],
    title: String,
    area: Rect,
) {
    let columns = (area.width.saturating_sub(2) / CELL_WIDTH).max(1) as usize;
    let visible_rows = area.height.saturating_sub(2).max(1) as usize;

    let lines: Vec<Line> = shards
        .chunks(columns)
        .enumerate()
        .map(|(row, chunk)| {
            let spans: Vec<Span> = chunk
                .iter()
                .enumerate()
                .flat_map(|(col, shard)| {
                    let color = app.theme.owner_color(owner_bucket(shard));
                    let mut style = Style::default().fg(Color::Black).bg(color);
                    if row * columns + col == state.selected {
                        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                    }
                    [
                        Span::styled(format!("{:>5}", shard.shardid), style),
                        Span::raw(" "),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    // Keep the cursor row on screen
    let cursor_row = state.selected / columns;
    let scroll = cursor_row.saturating_sub(visible_rows - 1) as u16;

    let paragraph = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(block(app, title));
    frame.render_widget(paragraph, area);
}

fn legend(app: &App) -> Line<'static> {
    let entry = |bucket: OwnerBucket, label: &'static str| {
        [
            Span::styled("  ", Style::default().bg(app.theme.owner_color(bucket))),
            Span::raw(format!(" {}  ", label)),
        ]
    };
    let spans: Vec<Span> = [
        entry(OwnerBucket::One, "1"),
        entry(OwnerBucket::Two, "2"),
        entry(OwnerBucket::Three, "3"),
        entry(OwnerBucket::Four, "4"),
        entry(OwnerBucket::Other, "5+"),
    ]
    .into_iter()
    .flatten()
    .collect();
    Line::from(spans)
}

fn detail(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![Span::styled(label, dim()), Span::raw(value)])
}

fn render_details(frame: &mut Frame, app: &App, state: &ShardOwnersState, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("Owners", dim())),
        legend(app),
        Line::from(""),
    ];

    if let Some(Err(e)) = &state.search {
        let style = app.theme.bucket_style(Bucket::Critical);
        lines.push(Line::from(Span::styled(e.to_string(), style)));
        lines.push(Line::from(""));
    }

    let shard = state.found().or_else(|| state.selected_shard());
    match shard {
        Some(shard) => {
            let held = state
                .shards_for_operator(&shard.networkaddress)
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ");

            let heading = format!("Shard {}", shard.shardid);
            lines.push(Line::from(Span::styled(heading, bold())));
            lines.push(detail("Operator:     ", shard.networkaddress.clone()));
            lines.push(detail("Shards held:  ", shard.nshards.to_string()));
            lines.push(detail("Owners:       ", shard.owners.to_string()));
            lines.push(detail("Held shards:  ", held));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Ownership (newest first)", dim())));

            for interval in shard.intervals_newest_first() {
                let end = interval
                    .end_time
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "now".to_string());
                lines.push(Line::from(vec![
                    Span::raw(format!("{} → {}  ", interval.start_time.format(TIME_FORMAT), end)),
                    Span::styled(interval.networkaddress.clone(), app.theme.header),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled("Press / to search by shard id", dim()))),
    }

    let title = if state.found().is_some() {
        " Search result "
    } else {
        " Selected shard "
    };
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block(app, title.to_string()));
    frame.render_widget(paragraph, area);
}
