//! Preconditions checked before any calculation runs.

use std::collections::BTreeSet;

use crate::config::GroupMembership;
use crate::domain::{INDICATOR_COLUMN, LABEL_COLUMN, PeriodBounds, SCENARIO_COLUMN, ShockTable};
use crate::error::{AppError, join_sorted};
use crate::io::assemble::column_span;
use crate::io::sheet::Sheet;

/// Fail if a structural column is missing or the scenario window is empty.
pub fn validate_structure(table: &Sheet, bounds: &PeriodBounds) -> Result<(), AppError> {
    let required = [INDICATOR_COLUMN, SCENARIO_COLUMN, LABEL_COLUMN, bounds.t0.as_str()];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !table.has_column(name))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation(format!(
            "Missing required columns: {}",
            join_sorted(missing)
        )));
    }

    if column_span(&table.headers, &bounds.scen_start, &bounds.scen_end).is_empty() {
        return Err(AppError::validation(format!(
            "Scenario range columns not found: {} to {}",
            bounds.scen_start, bounds.scen_end
        )));
    }

    Ok(())
}

/// Coverage gaps between the data and the group configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Indicators in the data that belong to no group.
    pub unassigned: BTreeSet<String>,
    /// Group members that never appear in the data.
    pub unused: BTreeSet<String>,
}

pub fn group_coverage(table: &ShockTable, groups: &GroupMembership) -> Coverage {
    let data_names: BTreeSet<&str> = table
        .rows
        .iter()
        .map(|row| row.indicator.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    Coverage {
        unassigned: data_names
            .iter()
            .filter(|name| groups.group_of(name).is_none())
            .map(|name| name.to_string())
            .collect(),
        unused: groups
            .all_members()
            .filter(|name| !data_names.contains(name))
            .map(str::to_string)
            .collect(),
    }
}

/// Report coverage gaps.
///
/// Gaps are logged as warnings. With `strict`, unassigned indicators fail the
/// run; unused group entries never do.
pub fn check_group_coverage(
    table: &ShockTable,
    groups: &GroupMembership,
    strict: bool,
) -> Result<Coverage, AppError> {
    let coverage = group_coverage(table, groups);

    if !coverage.unassigned.is_empty() {
        if strict {
            return Err(AppError::validation(format!(
                "Missing group assignments for: {}",
                join_sorted(&coverage.unassigned)
            )));
        }
        tracing::warn!(
            indicators = %join_sorted(&coverage.unassigned),
            "indicators without a group keep unset shocks"
        );
    }
    if !coverage.unused.is_empty() {
        tracing::warn!(
            indicators = %join_sorted(&coverage.unused),
            "group entries not found in data"
        );
    }

    Ok(coverage)
}
