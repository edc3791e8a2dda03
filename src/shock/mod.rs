//! Shock calculation engine.
//!
//! Each row is dispatched on its indicator's `Group` to one pure formula in
//! `formulas`. Rows without a group keep unset `shock` / `extreme_level`.
//! Groups are disjoint, so the order rows are processed in does not matter.

pub mod formulas;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::GroupMembership;
use crate::domain::{Direction, FieldValue, Group, ObservationRow, ShockTable};

pub use formulas::ShockResult;

/// Counters describing one calculation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShockStats {
    /// Rows with a defined shock, per group.
    pub computed: BTreeMap<Group, usize>,
    /// Rows whose indicator belongs to no group.
    pub unassigned: usize,
    /// Grouped rows whose shock came out undefined.
    pub undefined: usize,
}

/// Apply the formula of `group` to a single row.
pub fn apply_group(group: Group, row: &ObservationRow, direction: Direction) -> ShockResult {
    match group {
        Group::MinPercent => formulas::min_percent(row.baseline, &row.window),
        Group::MaxPercent => formulas::max_percent(row.baseline, &row.window),
        Group::MaxChange => formulas::max_change(row.baseline, &row.window),
        Group::Cpi => formulas::cpi(&row.path),
        Group::Rates => formulas::rates(row.baseline, &row.window, direction),
    }
}

/// Compute `shock` / `extreme_level` for every grouped row of `table`.
pub fn calculate_shocks(
    table: &mut ShockTable,
    groups: &GroupMembership,
    up_scenarios: &BTreeSet<String>,
) -> ShockStats {
    let mut stats = ShockStats::default();

    for row in &mut table.rows {
        let Some(group) = groups.group_of(&row.indicator) else {
            stats.unassigned += 1;
            continue;
        };

        let direction = row.direction(up_scenarios);
        let result = apply_group(group, row, direction);
        row.shock = result.shock.map(FieldValue::Number);
        row.extreme_level = result.extreme_level.map(FieldValue::Number);

        if row.shock.is_some() {
            *stats.computed.entry(group).or_default() += 1;
            continue;
        }

        stats.undefined += 1;
        let has_data = row.baseline.is_some() || row.path.iter().any(Option::is_some);
        if has_data {
            tracing::warn!(
                indicator = %row.indicator,
                scenario = row.scenario.as_deref().unwrap_or(""),
                group = group.display_name(),
                "shock is undefined (missing or non-finite inputs)"
            );
        } else {
            tracing::debug!(indicator = %row.indicator, "no path data for indicator");
        }
    }

    stats
}
