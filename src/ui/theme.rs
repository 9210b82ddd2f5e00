//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{Bucket, OwnerBucket};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning buckets.
    pub warning: Color,
    /// Color for critical buckets.
    pub critical: Color,
    /// Color for healthy buckets.
    pub healthy: Color,
    /// Color for unavailable readings.
    pub unknown: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color of the shard quorum line.
    pub threshold: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

fn bold_fg(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn bold_bg(color: Color) -> Style {
    Style::default().bg(color).add_modifier(Modifier::BOLD)
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::DarkGray,
            border: Color::Gray,
            threshold: Color::White,
            header: bold_fg(Color::Cyan),
            selected: bold_bg(Color::DarkGray),
            tab_active: bold_fg(Color::Cyan),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::Gray,
            border: Color::DarkGray,
            threshold: Color::Black,
            header: bold_fg(Color::Blue),
            selected: bold_bg(Color::LightBlue),
            tab_active: bold_fg(Color::Blue),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn bucket_color(&self, bucket: Bucket) -> Color {
        match bucket {
            Bucket::Ok => self.healthy,
            Bucket::Unknown => self.unknown,
            Bucket::Warning => self.warning,
            Bucket::Critical => self.critical,
        }
    }

    /// Get style for a bucket
    pub fn bucket_style(&self, bucket: Bucket) -> Style {
        let style = Style::default().fg(self.bucket_color(bucket));
        match bucket {
            Bucket::Critical => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    /// Tint for a whole table row. Healthy rows keep the default style.
    pub fn row_style(&self, bucket: Bucket) -> Style {
        match bucket {
            Bucket::Ok => Style::default(),
            other => Style::default().fg(self.bucket_color(other)),
        }
    }

    /// Grid color by owner count. Same palette in both themes.
    pub fn owner_color(&self, owners: OwnerBucket) -> Color {
        match owners {
            OwnerBucket::One => Color::Rgb(0x99, 0xef, 0xe4),
            OwnerBucket::Two => Color::Rgb(0xff, 0xf1, 0x76),
            OwnerBucket::Three => Color::Rgb(0x81, 0xc7, 0x84),
            OwnerBucket::Four => Color::Rgb(0x64, 0xb5, 0xf6),
            OwnerBucket::Other => Color::Rgb(0xba, 0x68, 0xc8),
        }
    }
}
