//! Time-series windowing.
//!
//! Every view that shows history keeps the full fetched sequence sorted
//! ascending by timestamp and derives what is visible from it with
//! [`apply`]. Changing the selected window never re-fetches.

use chrono::{DateTime, TimeDelta, Utc};

use super::duration::format_span;

/// A record that carries the time it was observed.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// How much of a history to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSelector {
    /// The most recent `n` records.
    Count(usize),
    /// Records no older than the span, relative to "now".
    Span(TimeDelta),
}

impl WindowSelector {
    /// Short description for titles, e.g. "last 144" or "last 5d".
    pub fn describe(&self) -> String {
        match self {
            WindowSelector::Count(n) => format!("last {}", n),
            WindowSelector::Span(span) => format!("last {}", format_span(*span)),
        }
    }
}

/// Display order of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Oldest first, used by charts.
    Ascending,
    /// Newest first, used by block strips.
    Descending,
}

/// Sort records ascending by timestamp. Stable, so equal timestamps keep
/// their server order.
pub fn sort_by_timestamp<T: Timestamped>(records: &mut [T]) {
    records.sort_by_key(|r| r.timestamp());
}

/// Select the visible suffix of an ascending sequence.
///
/// Count windows take the last `n` records; span windows take every record
/// with `now - timestamp <= span`. Records stamped after `now` count as
/// inside the span. Fewer matches than asked for is fine: the result is
/// never padded.
pub fn apply<T: Timestamped>(records: &[T], selector: WindowSelector, now: DateTime<Utc>) -> &[T] {
    match selector {
        WindowSelector::Count(n) => &records[records.len().saturating_sub(n)..],
        WindowSelector::Span(span) => {
            let start = records.partition_point(|r| now - r.timestamp() > span);
            &records[start..]
        }
    }
}

/// Arrange a window for display.
pub fn ordered<T>(window: &[T], presentation: Presentation) -> Vec<&T> {
    match presentation {
        Presentation::Ascending => window.iter().collect(),
        Presentation::Descending => window.iter().rev().collect(),
    }
}

/// A named window option offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPreset {
    pub label: &'static str,
    pub selector: WindowSelector,
}

/// Shown when a view has no presets.
const SHOW_ALL: WindowPreset = WindowPreset {
    label: "All",
    selector: WindowSelector::Count(usize::MAX),
};

fn preset(label: &'static str, selector: WindowSelector) -> WindowPreset {
    WindowPreset { label, selector }
}

/// Record-count presets for operator history. The collector samples every
/// ten minutes, so 144 records is one day.
pub fn count_presets() -> Vec<WindowPreset> {
    vec![
        preset("1 Day", WindowSelector::Count(144)),
        preset("2 Days", WindowSelector::Count(288)),
        preset("5 Days", WindowSelector::Count(720)),
        preset("1 Month", WindowSelector::Count(4320)),
    ]
}

/// Duration presets for shard health.
pub fn span_presets() -> Vec<WindowPreset> {
    vec![
        preset("1 Day", WindowSelector::Span(TimeDelta::days(1))),
        preset("5 Days", WindowSelector::Span(TimeDelta::days(5))),
        preset("10 Days", WindowSelector::Span(TimeDelta::days(10))),
        preset("1 Month", WindowSelector::Span(TimeDelta::days(30))),
    ]
}

/// The window a view currently shows, cycling through its presets.
#[derive(Debug, Clone)]
pub struct WindowChoice {
    presets: Vec<WindowPreset>,
    index: usize,
}

impl WindowChoice {
    /// Start at the first preset. An empty preset list shows everything.
    pub fn new(presets: Vec<WindowPreset>) -> Self {
        Self { presets, index: 0 }
    }

    /// Start at a caller-supplied selector, placed ahead of the presets.
    pub fn with_custom(
        label: &'static str,
        selector: WindowSelector,
        others: Vec<WindowPreset>,
    ) -> Self {
        let mut presets = vec![preset(label, selector)];
        presets.extend(others.into_iter().filter(|p| p.selector != selector));
        Self { presets, index: 0 }
    }

    pub fn current(&self) -> WindowPreset {
        self.presets.get(self.index).copied().unwrap_or(SHOW_ALL)
    }

    pub fn selector(&self) -> WindowSelector {
        self.current().selector
    }

    pub fn next(&mut self) {
        if !self.presets.is_empty() {
            self.index = (self.index + 1) % self.presets.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.presets.is_empty() {
            self.index = (self.index + self.presets.len() - 1) % self.presets.len();
        }
    }
}
