//! Operators view rendering.
//!
//! Network constants across the top, then a table of the latest values of
//! every operator. Columns are whatever the API sends, in server order,
//! minus bookkeeping columns. Rows are tinted by health.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::common::{block, bold, dim, input_info, loaded_or_placeholder};
use crate::app::App;
use crate::data::classify::DASHBOARD_PENDING_CRITICAL;
use crate::data::duration::format_age;
use crate::data::records::{display_value, parse_timestamp};
use crate::data::{classify_pending, classify_row, classify_status, Bucket, OperatorRow};
use crate::source::Load;
use crate::state::OperatorsState;

/// Height of the constants strip, borders included.
pub const CONSTANTS_HEIGHT: u16 = 3;

/// Render the operators view.
pub fn render(frame: &mut Frame, app: &App, state: &OperatorsState, area: Rect) {
    let constraints = [Constraint::Length(CONSTANTS_HEIGHT), Constraint::Min(5)];
    let chunks = Layout::vertical(constraints).split(area);
    render_constants(frame, app, state, chunks[0]);
    render_table(frame, app, state, chunks[1]);
}

fn render_constants(frame: &mut Frame, app: &App, state: &OperatorsState, area: Rect) {
    let spans: Vec<Span> = match &state.constants {
        Load::Loaded(constants) => constants
            .visible()
            .flat_map(|(key, value)| {
                [
                    Span::styled(format!("{}: ", key), dim()),
                    Span::styled(value, bold()),
                    Span::raw("  "),
                ]
            })
            .collect(),
        Load::Errored(e) => {
            let style = app.theme.bucket_style(Bucket::Critical);
            vec![Span::styled(e.to_string(), style)]
        }
        _ => vec![Span::styled("Loading...", dim())],
    };

    let updated = match state.last_updated() {
        Some(text) => match parse_timestamp(&text) {
            Some(at) => format!("{} ({})", text, format_age(at, Utc::now())),
            None => text,
        },
        None => "N/A".to_string(),
    };
    let title = format!(" Network │ Last updated: {} ", updated);
    let paragraph = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(block(app, title));
    frame.render_widget(paragraph, area);
}

fn cell<'a>(app: &App, row: &OperatorRow, column: &str) -> Cell<'a> {
    let text = row
        .get(column)
        .map(display_value)
        .unwrap_or_else(|| "-".to_string());
    let cell = Cell::from(text);
    let bucket = match column {
        "node_status" => classify_status(row.node_status()),
        "event_pending" => classify_pending(row.event_pending(), DASHBOARD_PENDING_CRITICAL),
        _ => return cell,
    };
    cell.style(app.theme.bucket_style(bucket))
}

fn render_table(frame: &mut Frame, app: &App, state: &OperatorsState, area: Rect) {
    let Some(all_rows) = loaded_or_placeholder(frame, app, &state.rows, "Operators", area) else {
        return;
    };
    let rows = state.filtered(&app.input_text);

    // Column set from the first row, in server order
    let columns: Vec<&str> = all_rows
        .first()
        .map(|row| row.visible_columns().map(|(key, _)| key).collect())
        .unwrap_or_default();

    let header = Row::new(columns.iter().map(|c| Cell::from(c.to_string())))
        .height(1)
        .style(app.theme.header);

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            let cells: Vec<Cell> = columns
                .iter()
                .map(|column| cell(app, row, column))
                .collect();
            let style = app.theme.row_style(classify_row(row));
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|column| match *column {
            "endpoint" => Constraint::Fill(3),
            "node_status" => Constraint::Min(8),
            _ => Constraint::Fill(1),
        })
        .collect();

    let selected = state.selected.min(rows.len().saturating_sub(1));

    // Show scroll position if there are items
    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected + 1, rows.len())
    } else {
        String::new()
    };

    let title = format!(
        " Operators ({}/{}){}{} ",
        rows.len(),
        all_rows.len(),
        input_info(app, "/"),
        position_info
    );

    let table = Table::new(body, widths)
        .header(header)
        .block(block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default();
    table_state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut table_state);
}
