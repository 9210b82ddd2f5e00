//! Chart series derived from windowed records.

use super::records::Metric;
use super::window::Timestamped;

/// A named line for a chart: `(unix seconds, value)` points, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Build a series from an ascending window. Unavailable readings leave a gap.
    pub fn from_window<T, F>(name: &'static str, window: &[T], value: F) -> Self
    where
        T: Timestamped,
        F: Fn(&T) -> Metric,
    {
        let points = window
            .iter()
            .filter_map(|r| {
                let v = value(r).value()?;
                Some((r.timestamp().timestamp() as f64, v as f64))
            })
            .collect();
        Self { name, points }
    }

    /// A flat line at `y` spanning the given x bounds.
    pub fn flat(name: &'static str, x_bounds: [f64; 2], y: f64) -> Self {
        Self {
            name,
            points: vec![(x_bounds[0], y), (x_bounds[1], y)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent value in the series.
    pub fn last(&self) -> Option<f64> {
        self.points.last().map(|(_, y)| *y)
    }
}

/// X bounds covering every point, or `None` if there are no points.
pub fn x_bounds(series: &[Series]) -> Option<[f64; 2]> {
    let mut xs = series.iter().flat_map(|s| s.points.iter().map(|(x, _)| *x));
    let first = xs.next()?;
    let (mut min, mut max) = (first, first);
    for x in xs {
        min = min.min(x);
        max = max.max(x);
    }
    // A single point still needs a non-empty axis
    Some([min, max.max(min + 1.0)])
}

/// Y bounds from zero to the largest value, at least `floor`.
pub fn y_bounds(series: &[Series], floor: f64) -> [f64; 2] {
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, y)| *y))
        .fold(floor, f64::max);
    [0.0, max.max(1.0)]
}

/// Normalize values to 0-7 range for sparkline display.
///
/// Unavailable readings are skipped. Returns an empty Vec if fewer than
/// two readings remain.
pub fn sparkline(values: &[Metric]) -> Vec<u8> {
    let values: Vec<u64> = values.iter().filter_map(Metric::value).collect();
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().max().unwrap_or(1);
    let min = values.iter().copied().min().unwrap_or(0);
    let range = (max - min).max(1) as f64;

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) as f64 / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}
