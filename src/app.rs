//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::{TimeDelta, Utc};
use tokio::runtime::Handle;
use tracing::info;

use crate::data::window::{count_presets, span_presets};
use crate::data::{WindowChoice, WindowSelector};
use crate::error::FetchError;
use crate::export::Report;
use crate::source::StatsSource;
use crate::state::{BlobState, HistoryState, OperatorsState, ShardHealthState, ShardOwnersState};
use crate::ui::Theme;

/// The current view in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Latest status of every operator.
    Operators,
    /// History of one operator. Reached from the operators table, not a tab.
    OperatorHistory,
    /// Network shard health over time.
    ShardHealth,
    /// Which operators hold which shards.
    ShardOwners,
    /// Blob lookup by id.
    BlobSearch,
}

/// Views reachable from the tab bar, in order.
pub const TABS: [View; 4] = [
    View::Operators,
    View::ShardHealth,
    View::ShardOwners,
    View::BlobSearch,
];

impl View {
    /// Position in the tab bar. Operator history sits under the operators tab.
    pub fn tab_index(self) -> usize {
        match self {
            View::Operators | View::OperatorHistory => 0,
            View::ShardHealth => 1,
            View::ShardOwners => 2,
            View::BlobSearch => 3,
        }
    }

    /// Cycle to the next tab.
    pub fn next(self) -> Self {
        TABS[(self.tab_index() + 1) % TABS.len()]
    }

    /// Cycle to the previous tab.
    pub fn prev(self) -> Self {
        TABS[(self.tab_index() + TABS.len() - 1) % TABS.len()]
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Operators => "Operators",
            View::OperatorHistory => "History",
            View::ShardHealth => "Shard Health",
            View::ShardOwners => "Shard Owners",
            View::BlobSearch => "Blobs",
        }
    }

    /// Whether `/` opens a text input in this view.
    pub fn accepts_input(&self) -> bool {
        matches!(self, View::Operators | View::ShardOwners | View::BlobSearch)
    }
}

/// The mounted view together with its data.
#[derive(Debug)]
pub enum Screen {
    Operators(OperatorsState),
    OperatorHistory(HistoryState),
    ShardHealth(ShardHealthState),
    ShardOwners(ShardOwnersState),
    BlobSearch(BlobState),
}

impl Screen {
    pub fn view(&self) -> View {
        match self {
            Screen::Operators(_) => View::Operators,
            Screen::OperatorHistory(_) => View::OperatorHistory,
            Screen::ShardHealth(_) => View::ShardHealth,
            Screen::ShardOwners(_) => View::ShardOwners,
            Screen::BlobSearch(_) => View::BlobSearch,
        }
    }

    /// Collect finished fetches. Returns true if anything settled.
    pub fn poll(&mut self) -> bool {
        match self {
            Screen::Operators(state) => state.poll(),
            Screen::OperatorHistory(state) => state.poll(),
            Screen::ShardHealth(state) => state.poll(),
            Screen::ShardOwners(state) => state.poll(),
            Screen::BlobSearch(state) => state.poll(),
        }
    }

    /// First fetch error of the view, if any.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Screen::Operators(state) => state.rows.error().or_else(|| state.constants.error()),
            Screen::OperatorHistory(state) => state.samples.error(),
            Screen::ShardHealth(state) => state.samples.error(),
            Screen::ShardOwners(state) => state.shards.error(),
            Screen::BlobSearch(state) => state.blob.error(),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            Screen::Operators(state) => state.rows.is_loading() || state.constants.is_loading(),
            Screen::OperatorHistory(state) => state.samples.is_loading(),
            Screen::ShardHealth(state) => state.samples.is_loading(),
            Screen::ShardOwners(state) => state.shards.is_loading(),
            Screen::BlobSearch(state) => state.blob.is_loading(),
        }
    }
}

/// Saved state for returning to a previous view.
///
/// Data is not kept: going back remounts the view and fetches again.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// The view that was active.
    pub view: View,
    /// The selected row in that view.
    pub selected_index: usize,
    /// The filter or search text in that view.
    pub input_text: String,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub screen: Screen,

    // Data source
    source: Arc<dyn StatsSource>,
    runtime: Handle,
    pub last_update: Option<Instant>,

    // Navigation state
    pub view_stack: Vec<ViewState>,

    // Filter / search input of the current view
    pub input_text: String,
    pub input_active: bool,

    /// Extra shard health window offered ahead of the presets.
    health_span: Option<TimeDelta>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App and mount the operators view.
    ///
    /// Fetches are spawned on `runtime`; the caller keeps the runtime alive.
    pub fn new(source: Arc<dyn StatsSource>, runtime: Handle, theme: Theme) -> Self {
        let screen = Screen::Operators(OperatorsState::mount(&source, &runtime));
        Self {
            running: true,
            show_help: false,
            screen,
            source,
            runtime,
            last_update: None,
            view_stack: Vec::new(),
            input_text: String::new(),
            input_active: false,
            health_span: None,
            theme,
            status_message: None,
        }
    }

    /// Offer a custom span as the default shard health window.
    pub fn with_health_span(mut self, span: TimeDelta) -> Self {
        self.health_span = Some(span);
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn current_view(&self) -> View {
        self.screen.view()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    fn health_window(&self) -> WindowChoice {
        match self.health_span {
            Some(span) => {
                let custom = WindowSelector::Span(span);
                WindowChoice::with_custom("Custom", custom, span_presets())
            }
            None => WindowChoice::new(span_presets()),
        }
    }

    fn mount(&self, view: View) -> Screen {
        info!(
            view = view.label(),
            source = self.source.description(),
            "mounting view"
        );
        match view {
            // History needs an endpoint and is only opened through open_history
            View::Operators | View::OperatorHistory => {
                Screen::Operators(OperatorsState::mount(&self.source, &self.runtime))
            }
            View::ShardHealth => {
                let window = self.health_window();
                Screen::ShardHealth(ShardHealthState::mount(&self.source, &self.runtime, window))
            }
            View::ShardOwners => {
                Screen::ShardOwners(ShardOwnersState::mount(&self.source, &self.runtime))
            }
            View::BlobSearch => Screen::BlobSearch(BlobState::default()),
        }
    }

    /// Open the history of an operator, remembering where we came from.
    pub fn open_history(&mut self, endpoint: String) {
        info!(%endpoint, "opening operator history");
        self.view_stack.push(ViewState {
            view: self.current_view(),
            selected_index: self.selected_index(),
            input_text: std::mem::take(&mut self.input_text),
        });
        self.input_active = false;
        self.screen = Screen::OperatorHistory(HistoryState::mount(
            &self.source,
            &self.runtime,
            endpoint,
            WindowChoice::new(count_presets()),
            true,
        ));
    }

    /// Pop the view stack and remount the previous view.
    pub fn pop_view(&mut self) -> bool {
        let Some(state) = self.view_stack.pop() else {
            return false;
        };
        self.screen = self.mount(state.view);
        self.input_text = state.input_text;
        self.input_active = false;
        self.set_selected_index(state.selected_index);
        true
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        let mut parts: Vec<&str> = self.view_stack.iter().map(|s| s.view.label()).collect();
        parts.push(self.current_view().label());
        parts.join(" > ")
    }

    /// Poll in-flight fetches of the current view.
    ///
    /// Returns true if any of them finished.
    pub fn poll_fetches(&mut self) -> bool {
        let changed = self.screen.poll();
        if changed {
            self.last_update = Some(Instant::now());
        }
        changed
    }

    /// Remount the current view, keeping its window and selection.
    pub fn reload(&mut self) {
        let source = &self.source;
        let runtime = &self.runtime;
        let screen = match &self.screen {
            Screen::Operators(old) => {
                let mut state = OperatorsState::mount(source, runtime);
                state.selected = old.selected;
                Screen::Operators(state)
            }
            Screen::OperatorHistory(old) => Screen::OperatorHistory(HistoryState::mount(
                source,
                runtime,
                old.endpoint.clone(),
                old.window.clone(),
                old.show_green,
            )),
            Screen::ShardHealth(old) => {
                let window = old.window.clone();
                Screen::ShardHealth(ShardHealthState::mount(source, runtime, window))
            }
            Screen::ShardOwners(old) => {
                let mut state = ShardOwnersState::mount(source, runtime);
                state.selected = old.selected;
                Screen::ShardOwners(state)
            }
            Screen::BlobSearch(old) => {
                let mut state = BlobState::default();
                if !old.query.is_empty() {
                    state.submit(source, runtime, &old.query);
                }
                Screen::BlobSearch(state)
            }
        };
        info!(view = self.current_view().label(), "reloading view");
        self.screen = screen;
        self.set_status_message("Reloading...".to_string());
    }

    /// Switch to the next tab.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view().next());
    }

    /// Switch to the previous tab.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view().prev());
    }

    /// Switch to a specific view. The old view and its pending fetches are dropped.
    pub fn set_view(&mut self, view: View) {
        if view == self.current_view() {
            return;
        }
        self.view_stack.clear();
        self.input_text.clear();
        self.input_active = false;
        self.screen = self.mount(view);
    }

    fn selected_index(&self) -> usize {
        match &self.screen {
            Screen::Operators(state) => state.selected,
            Screen::ShardOwners(state) => state.selected,
            _ => 0,
        }
    }

    fn set_selected_index(&mut self, index: usize) {
        match &mut self.screen {
            Screen::Operators(state) => state.selected = index,
            Screen::ShardOwners(state) => state.selected = index,
            _ => {}
        }
    }

    /// Number of selectable items in the current view.
    fn item_count(&self) -> usize {
        match &self.screen {
            Screen::Operators(state) => state.filtered(&self.input_text).len(),
            Screen::ShardOwners(state) => state.shard_count(),
            _ => 0,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let index = (self.selected_index() + n).min(max);
        self.set_selected_index(index);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let index = self.selected_index().saturating_sub(n);
        self.set_selected_index(index);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.set_selected_index(0);
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        self.set_selected_index(last);
    }

    /// Act on the current selection.
    ///
    /// Operators: open the selected operator's history. Shard owners: search
    /// for the selected shard. Blobs: start typing an id.
    pub fn activate(&mut self) {
        match &self.screen {
            Screen::Operators(state) => {
                let Some(row) = state.selected_row(&self.input_text) else {
                    return;
                };
                match row.endpoint().map(str::to_string) {
                    Some(endpoint) => self.open_history(endpoint),
                    None => self.set_status_message("Operator has no endpoint".to_string()),
                }
            }
            Screen::ShardOwners(state) => {
                if let Some(id) = state.selected_shard().map(|s| s.shardid) {
                    self.input_text = id.to_string();
                    self.submit_input();
                }
            }
            Screen::BlobSearch(_) => self.start_input(),
            _ => {}
        }
    }

    /// Navigate back: pop the view stack, otherwise go to operators.
    pub fn go_back(&mut self) {
        if !self.pop_view() {
            self.set_view(View::Operators);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle the time window of a history view.
    pub fn cycle_window(&mut self, forward: bool) {
        let window = match &mut self.screen {
            Screen::OperatorHistory(state) => &mut state.window,
            Screen::ShardHealth(state) => &mut state.window,
            _ => return,
        };
        if forward {
            window.next();
        } else {
            window.prev();
        }
    }

    /// Show or hide healthy blocks in the operator history strips.
    pub fn toggle_green(&mut self) {
        if let Screen::OperatorHistory(state) = &mut self.screen {
            state.show_green = !state.show_green;
        }
    }

    /// Enter input mode (starts capturing keystrokes).
    pub fn start_input(&mut self) {
        if self.current_view().accepts_input() {
            self.input_active = true;
        }
    }

    /// Exit input mode without clearing the text.
    pub fn cancel_input(&mut self) {
        self.input_active = false;
    }

    /// Clear the input text and exit input mode.
    pub fn clear_input(&mut self) {
        self.input_text.clear();
        self.input_active = false;
        if let Screen::ShardOwners(state) = &mut self.screen {
            state.clear_search();
        }
    }

    /// Append a character to the input text.
    pub fn input_push(&mut self, c: char) {
        self.input_text.push(c);
        if let Screen::Operators(state) = &mut self.screen {
            state.selected = 0;
        }
    }

    /// Remove the last character from the input text.
    pub fn input_pop(&mut self) {
        self.input_text.pop();
    }

    /// Confirm the input. Runs the search in views that have one.
    pub fn submit_input(&mut self) {
        self.input_active = false;
        let failure = match &mut self.screen {
            Screen::ShardOwners(state) => state.search(&self.input_text).err(),
            Screen::BlobSearch(state) => {
                state.submit(&self.source, &self.runtime, &self.input_text);
                None
            }
            _ => None,
        };
        if let Some(e) = failure {
            self.set_status_message(e.to_string());
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current view's classified data to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let report = Report::new(self.source.description(), Utc::now());
        let report = match &self.screen {
            Screen::Operators(state) => match state.rows.loaded() {
                Some(rows) => report.with_operators(rows),
                None => bail!("No data to export"),
            },
            Screen::ShardHealth(state) => match state.samples.loaded() {
                Some(samples) => report.with_shard_health(samples, state.window.selector()),
                None => bail!("No data to export"),
            },
            _ => bail!("Nothing to export in this view"),
        };
        report.write_to(path)
    }
}
