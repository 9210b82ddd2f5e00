//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`operators`]: Network constants and the latest status of every operator
//! - [`history`]: Status strips and shard chart for one operator
//! - [`shard_health`]: Red/green/yellow shard counts against the quorum line
//! - [`shard_owners`]: Shard grid coloured by owner count, with search
//! - [`blob`]: Blob lookup by id
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content (<view>::render)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod blob;
pub mod common;
pub mod history;
pub mod operators;
pub mod shard_health;
pub mod shard_owners;
pub mod theme;

pub use theme::Theme;

use ratatui::{layout::Rect, Frame};

use crate::app::{App, Screen};

/// Render the mounted view into the content area.
pub fn render_view(frame: &mut Frame, app: &App, area: Rect) {
    match &app.screen {
        Screen::Operators(state) => operators::render(frame, app, state, area),
        Screen::OperatorHistory(state) => history::render(frame, app, state, area),
        Screen::ShardHealth(state) => shard_health::render(frame, app, state, area),
        Screen::ShardOwners(state) => shard_owners::render(frame, app, state, area),
        Screen::BlobSearch(state) => blob::render(frame, app, state, area),
    }
}
