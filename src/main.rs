use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use walrus_watch::data::duration::parse_span;
use walrus_watch::data::window::{sort_by_timestamp, span_presets};
use walrus_watch::data::WindowSelector;
use walrus_watch::ui::{self, Theme};
use walrus_watch::{events, App, FileSource, HttpSource, Report, Settings, StatsSource};

#[derive(Parser, Debug)]
#[command(name = "walrus-watch")]
#[command(about = "Terminal dashboard for Walrus storage node operators, shard health and blobs")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the stats host
    #[arg(long)]
    stats_url: Option<String>,

    /// Base URL of the network host
    #[arg(long)]
    network_url: Option<String>,

    /// Replay saved responses from a directory instead of the live API
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Open the history of this operator endpoint on startup
    #[arg(short, long)]
    operator: Option<String>,

    /// Export the classified operators and shard health to a JSON file and exit
    #[arg(short, long, conflicts_with = "operator")]
    export: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// UI tick in milliseconds
    #[arg(long)]
    tick: Option<u64>,

    /// Default shard health window (e.g., "6h", "3d")
    #[arg(long)]
    health_window: Option<String>,
}

impl Args {
    /// Command-line flags override every other settings layer.
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.stats_url {
            settings.stats_url = url.clone();
        }
        if let Some(url) = &self.network_url {
            settings.network_url = url.clone();
        }
        if let Some(dir) = &self.replay {
            settings.replay_dir = Some(dir.clone());
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        if let Some(tick) = self.tick {
            settings.tick_ms = tick;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    if let Some(path) = &settings.log_file {
        init_logging(path)?;
    }

    let health_span = args
        .health_window
        .as_deref()
        .map(parse_span)
        .transpose()
        .context("invalid --health-window")?;

    // Fetches run on this runtime while the UI loop owns the main thread
    let rt = Runtime::new()?;
    let source = build_source(&settings)?;
    info!(source = source.description(), "starting");

    // Handle export mode (non-interactive)
    if let Some(export_path) = &args.export {
        return export_to_file(&rt, source, health_span, export_path);
    }

    let theme = Theme::auto_detect();
    let mut app = App::new(source, rt.handle().clone(), theme);
    if let Some(span) = health_span {
        app = app.with_health_span(span);
    }
    if let Some(endpoint) = args.operator {
        app.open_history(endpoint);
    }

    run_tui(app, settings.tick())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("walrus_watch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_source(settings: &Settings) -> Result<Arc<dyn StatsSource>> {
    let source: Arc<dyn StatsSource> = match &settings.replay_dir {
        Some(dir) => Arc::new(FileSource::new(dir)),
        None => Arc::new(
            HttpSource::builder()
                .stats_url(&settings.stats_url)
                .network_url(&settings.network_url)
                .build()?,
        ),
    };
    Ok(source)
}

/// Run the TUI until the user quits
fn run_tui(app: App, tick: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = app;
    let result = run_app(&mut terminal, &mut app, tick);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;
    // Header, tabs, constants strip and the table's top border
    const TABLE_TOP: u16 = 2 + ui::operators::CONSTANTS_HEIGHT + 1;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
                frame.render_widget(paragraph, centered.intersection(area));
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::render_view(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // The tick doubles as the fetch polling interval
        if let Some(event) = events::poll_event(tick)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, TABLE_TOP),
                _ => {}
            }
        }

        app.poll_fetches();
    }

    Ok(())
}

/// Fetch operators and shard health once and write the classified snapshot
fn export_to_file(
    rt: &Runtime,
    source: Arc<dyn StatsSource>,
    health_span: Option<TimeDelta>,
    export_path: &Path,
) -> Result<()> {
    let rows = rt
        .block_on(source.latest_values())
        .context("failed to fetch operator values")?;

    let selector = match health_span {
        Some(span) => WindowSelector::Span(span),
        None => span_presets()
            .first()
            .map(|preset| preset.selector)
            .unwrap_or(WindowSelector::Span(TimeDelta::days(1))),
    };

    let mut report = Report::new(source.description(), Utc::now()).with_operators(&rows);
    match rt.block_on(source.shard_health()) {
        Ok(mut samples) => {
            sort_by_timestamp(&mut samples);
            report = report.with_shard_health(&samples, selector);
        }
        Err(e) => warn!(error = %e, "shard health unavailable, exporting operators only"),
    }

    report.write_to(export_path)?;
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::try_parse_from([
            "walrus-watch",
            "--tick",
            "50",
            "--stats-url",
            "http://localhost:8000",
            "--replay",
            "captures",
        ])
        .unwrap();
        let mut settings = Settings {
            network_url: "http://network.local".to_string(),
            ..Settings::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.tick_ms, 50);
        assert_eq!(settings.stats_url, "http://localhost:8000");
        assert_eq!(settings.replay_dir, Some(PathBuf::from("captures")));
        // Flags left out keep the lower layers
        assert_eq!(settings.network_url, "http://network.local");
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn test_export_conflicts_with_operator() {
        let parsed = Args::try_parse_from([
            "walrus-watch",
            "--export",
            "out.json",
            "--operator",
            "https://node.example.com:9185",
        ]);
        assert!(parsed.is_err());
    }
}
