//! Blob search view.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::common::{block, dim, format_bytes, input_info, loaded_or_placeholder};
use crate::app::App;
use crate::data::{BlobInfo, Metric};
use crate::source::Load;
use crate::state::BlobState;

pub fn render(frame: &mut Frame, app: &App, state: &BlobState, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(6)]).split(area);

    let prompt = if app.input_active || !app.input_text.is_empty() {
        Line::from(input_info(app, "").trim_start().to_string())
    } else {
        Line::from(Span::styled("Press / or Enter to type a blob id", dim()))
    };
    let prompt = Paragraph::new(prompt).block(block(app, " Blob ID ".to_string()));
    frame.render_widget(prompt, chunks[0]);

    if matches!(state.blob, Load::Unloaded) {
        return;
    }
    let title = format!(" Blob {} ", state.query);
    if let Some(blob) = loaded_or_placeholder(frame, app, &state.blob, &title, chunks[1]) {
        render_blob(frame, app, blob, title, chunks[1]);
    }
}

fn field(name: &'static str, value: String) -> Line<'static> {
    let label = Span::styled(format!("{:<12}", name), dim());
    Line::from(vec![label, Span::raw(value)])
}

fn render_blob(frame: &mut Frame, app: &App, blob: &BlobInfo, title: String, area: Rect) {
    let or_dash = |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or("-").to_string();
    let metric = |value: Metric| value.value().map_or("-".to_string(), |v| v.to_string());

    let parsed = blob.parsed.clone().unwrap_or_default();
    let size = match parsed.size {
        Metric::Value(bytes) => format!("{} ({} bytes)", format_bytes(bytes), bytes),
        Metric::Unavailable => "-".to_string(),
    };
    let deletable = match parsed.deletable {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    };

    let lines = vec![
        field("Deletable", deletable.to_string()),
        field("Epoch", metric(parsed.epoch)),
        field("End epoch", metric(parsed.end_epoch)),
        field("Size", size),
        field("Sender", or_dash(blob.sender.as_deref())),
        field("Type", or_dash(Some(blob.type_suffix().as_str()))),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block(app, title).border_style(Style::default().fg(app.theme.highlight)));
    frame.render_widget(paragraph, area);
}
