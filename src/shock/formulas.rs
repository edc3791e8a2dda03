//! Pure per-group shock formulas.
//!
//! Every function maps `(baseline, window | path)` to a `ShockResult`.
//! Missing inputs are skipped by the reductions; results that are not
//! finite (zero baseline, zero previous CPI level) become `None`.

use crate::domain::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShockResult {
    pub shock: Option<f64>,
    pub extreme_level: Option<f64>,
}

/// Quarters per year, the exponent of the CPI annualization.
const PERIODS_PER_YEAR: i32 = 4;

pub fn window_min(values: &[Option<f64>]) -> Option<f64> {
    values.iter().flatten().copied().reduce(f64::min)
}

pub fn window_max(values: &[Option<f64>]) -> Option<f64> {
    values.iter().flatten().copied().reduce(f64::max)
}

fn defined(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn relative_change(level: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    defined(level? / baseline? - 1.0)
}

fn level_change(level: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    defined(level? - baseline?)
}

/// `min(window) / baseline - 1`.
pub fn min_percent(baseline: Option<f64>, window: &[Option<f64>]) -> ShockResult {
    ShockResult {
        shock: relative_change(window_min(window), baseline),
        extreme_level: None,
    }
}

/// `max(window) / baseline - 1`.
pub fn max_percent(baseline: Option<f64>, window: &[Option<f64>]) -> ShockResult {
    ShockResult {
        shock: relative_change(window_max(window), baseline),
        extreme_level: None,
    }
}

/// `max(window) - baseline`, extreme at `max(window)`.
pub fn max_change(baseline: Option<f64>, window: &[Option<f64>]) -> ShockResult {
    let max = window_max(window);
    ShockResult {
        shock: level_change(max, baseline),
        extreme_level: max,
    }
}

/// Carry the last known level over gaps. Leading gaps stay missing.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|value| {
            if value.is_some() {
                last = *value;
            }
            last
        })
        .collect()
}

/// Annualized quarter-on-quarter change for each consecutive pair of `path`.
///
/// The result has one element less than `path`: the first period has no
/// previous value. Gaps are forward-filled first, so a missing quarter
/// counts as no change.
pub fn annualized_changes(path: &[Option<f64>]) -> Vec<Option<f64>> {
    forward_fill(path)
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(cur)) => {
                let pct_change = cur / prev - 1.0;
                defined((1.0 + pct_change).powi(PERIODS_PER_YEAR) - 1.0)
            }
            _ => None,
        })
        .collect()
}

/// Min / max annualized change over `[T0, scen_end]`.
pub fn cpi(path: &[Option<f64>]) -> ShockResult {
    let changes = annualized_changes(path);
    ShockResult {
        shock: window_min(&changes),
        extreme_level: window_max(&changes),
    }
}

/// Max-based for up scenarios, min-based otherwise.
pub fn rates(baseline: Option<f64>, window: &[Option<f64>], direction: Direction) -> ShockResult {
    match direction {
        Direction::Up => max_change(baseline, window),
        Direction::Other => {
            let min = window_min(window);
            ShockResult {
                shock: level_change(min, baseline),
                extreme_level: min,
            }
        }
    }
}
