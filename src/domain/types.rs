//! Shared domain types.
//!
//! These types are kept small and free of I/O so the calculation and
//! formatting engines can be tested on hand-built rows.

use std::collections::BTreeSet;

/// Indicator key column of both source tables.
pub const INDICATOR_COLUMN: &str = "M names";
/// Scenario column of the time-series table.
pub const SCENARIO_COLUMN: &str = "Scenario";
/// Display label column of the mapping table.
pub const LABEL_COLUMN: &str = "Slides name";

/// The five mutually exclusive indicator groups.
///
/// Each group selects one shock formula (see `shock::apply_group`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    MinPercent,
    MaxPercent,
    MaxChange,
    Cpi,
    Rates,
}

impl Group {
    pub const ALL: [Group; 5] = [
        Group::MinPercent,
        Group::MaxPercent,
        Group::MaxChange,
        Group::Cpi,
        Group::Rates,
    ];

    /// Key under which the group's members are listed in `groups.json`.
    pub fn config_key(self) -> &'static str {
        match self {
            Group::MinPercent => "group_min_percent",
            Group::MaxPercent => "group_max_percent",
            Group::MaxChange => "group_max_change",
            Group::Cpi => "group_cpi",
            Group::Rates => "group_rates",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Group::MinPercent => "min_percent",
            Group::MaxPercent => "max_percent",
            Group::MaxChange => "max_change",
            Group::Cpi => "cpi",
            Group::Rates => "rates",
        }
    }
}

/// Scenario direction. Only `rates` shocks and directional format rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Other,
}

impl Direction {
    /// A missing scenario is never up-directed.
    pub fn classify(scenario: Option<&str>, up_scenarios: &BTreeSet<String>) -> Self {
        match scenario {
            Some(s) if up_scenarios.contains(s) => Direction::Up,
            _ => Direction::Other,
        }
    }
}

/// A computed cell: numeric until formatted, display text afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Render for output tables and text concatenation.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Number(v) => plain_number(*v),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// One joined (indicator, scenario) row plus its computed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub indicator: String,
    pub scenario: Option<String>,
    pub label: Option<String>,
    /// Value at the baseline period `T0`.
    pub baseline: Option<f64>,
    /// Values over `[scen_start, scen_end]`.
    pub window: Vec<Option<f64>>,
    /// Values over `[T0, scen_end]`, used by the CPI formula.
    pub path: Vec<Option<f64>>,
    pub shock: Option<FieldValue>,
    pub extreme_level: Option<FieldValue>,
}

impl ObservationRow {
    pub fn new(indicator: impl Into<String>, scenario: Option<&str>) -> Self {
        Self {
            indicator: indicator.into(),
            scenario: scenario.map(str::to_string),
            label: None,
            baseline: None,
            window: Vec::new(),
            path: Vec::new(),
            shock: None,
            extreme_level: None,
        }
    }

    pub fn direction(&self, up_scenarios: &BTreeSet<String>) -> Direction {
        Direction::classify(self.scenario.as_deref(), up_scenarios)
    }
}

/// Requested period labels, in the normalized `.` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBounds {
    pub t0: String,
    pub scen_start: String,
    pub scen_end: String,
}

/// Resolved period columns of the joined dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodLayout {
    pub t0: String,
    pub window: Vec<String>,
    pub path: Vec<String>,
}

/// The full computed table returned by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockTable {
    pub periods: PeriodLayout,
    pub rows: Vec<ObservationRow>,
}

impl ShockTable {
    /// Distinct scenario names in order of first appearance.
    pub fn scenarios(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if let Some(s) = row.scenario.as_deref() {
                if seen.insert(s) {
                    out.push(s);
                }
            }
        }
        out
    }
}

/// Shortest round-trip form, always with a fractional part for finite
/// integral values (`110` renders as `110.0`). Very small or very large
/// magnitudes use exponent form (`1e-05`).
pub fn plain_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let magnitude = v.abs();
    if magnitude != 0.0 && !(SCIENTIFIC_BELOW..SCIENTIFIC_FROM).contains(&magnitude) {
        return scientific(v);
    }
    let s = v.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Plain decimals are used for magnitudes in `[1e-4, 1e16)`.
const SCIENTIFIC_BELOW: f64 = 1e-4;
const SCIENTIFIC_FROM: f64 = 1e16;

/// `1e-05`, `-2.5e+16`: signed exponent with at least two digits.
fn scientific(v: f64) -> String {
    let s = format!("{v:e}");
    let Some((mantissa, exponent)) = s.split_once('e') else {
        return s;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
