use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View, TABS};

/// Where the `e` key writes its snapshot.
pub const EXPORT_PATH: &str = "walrus_watch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If text input is active, handle text input
    if app.input_active {
        handle_text_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access (history is reached with Enter)
        KeyCode::Char('1') => app.set_view(View::Operators),
        KeyCode::Char('2') => app.set_view(View::ShardHealth),
        KeyCode::Char('3') => app.set_view(View::ShardOwners),
        KeyCode::Char('4') => app.set_view(View::BlobSearch),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.activate(),

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Reload
        KeyCode::Char('r') => app.reload(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Time window (history views)
        KeyCode::Char('t') => app.cycle_window(true),
        KeyCode::Char('T') => app.cycle_window(false),

        // Hide healthy blocks (operator history)
        KeyCode::Char('g') => app.toggle_green(),

        // Filter / search
        KeyCode::Char('/') => app.start_input(),

        // Clear filter / search
        KeyCode::Char('c') => {
            if !app.input_text.is_empty() {
                app.clear_input();
            }
        }

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while text input is active
fn handle_text_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm (runs the search in shard owners and blobs)
        KeyCode::Enter => app.submit_input(),

        // Cancel (keep text but exit input mode)
        KeyCode::Esc => app.cancel_input(),

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_input(),

        KeyCode::Backspace => app.input_pop(),

        // Type characters
        KeyCode::Char(c) => app.input_push(c),

        _ => {}
    }
}

/// Tab title as shown in the tab bar.
pub fn tab_title(view: View) -> String {
    format!(" {}:{} ", view.tab_index() + 1, view.label())
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows of the operators table: content area border plus table header
            if clicked_row > content_start_row && app.current_view() == View::Operators {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                app.select_first();
                app.select_next_n(item_row);
            }

            // Tab clicks (row 1, after header)
            if clicked_row == 1 {
                let mut start = 0u16;
                for view in TABS {
                    // Each title plus its divider
                    let end = start + tab_title(view).chars().count() as u16 + 1;
                    if mouse.column < end {
                        app.set_view(view);
                        break;
                    }
                    start = end;
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}
