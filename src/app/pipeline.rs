//! The path → shock pipeline shared by the `run` and `check` commands.
//!
//! load config/groups/rules -> read sheets -> join -> validate -> assemble
//! -> calculate -> format -> write one file per scenario
//!
//! Every loader and validator error is raised before the first output file is
//! written.

use std::path::PathBuf;

use crate::config::{GroupMembership, RuleSet, ShockConfig, load_config, load_groups, load_rules};
use crate::domain::{PeriodBounds, ShockTable};
use crate::error::AppError;
use crate::format::apply_format_rules;
use crate::io::assemble::{assemble_rows, merge_on_indicator, normalize_period_label};
use crate::io::export::{WrittenFile, write_scenario_outputs};
use crate::io::sheet::read_sheet;
use crate::shock::{ShockStats, calculate_shocks};
use crate::validate::{Coverage, check_group_coverage, validate_structure};

pub const CONFIG_FILE: &str = "config.json";
pub const GROUPS_FILE: &str = "groups.json";

/// Parameters of one run. `None` overrides fall back to the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Defaults to `<input_dir>/config.json`.
    pub config_file: Option<PathBuf>,
    /// Defaults to `<input_dir>/groups.json`.
    pub groups_file: Option<PathBuf>,
    pub mapping_source: Option<String>,
    pub data_source: Option<String>,
    pub t0: Option<String>,
    pub scen_start: Option<String>,
    pub scen_end: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            config_file: None,
            groups_file: None,
            mapping_source: None,
            data_source: None,
            t0: None,
            scen_start: None,
            scen_end: None,
        }
    }
}

impl RunOptions {
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.input_dir.join(CONFIG_FILE))
    }

    pub fn groups_path(&self) -> PathBuf {
        self.groups_file
            .clone()
            .unwrap_or_else(|| self.input_dir.join(GROUPS_FILE))
    }

    /// Apply caller overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut ShockConfig) {
        let set = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                *target = v.clone();
            }
        };
        set(&mut config.mapping_excel, &self.mapping_source);
        set(&mut config.data_excel, &self.data_source);
        set(&mut config.t0, &self.t0);
        set(&mut config.scen_start, &self.scen_start);
        set(&mut config.scen_end, &self.scen_end);
    }
}

/// Everything loaded and validated, before calculation.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub config: ShockConfig,
    pub groups: GroupMembership,
    pub rules: RuleSet,
    pub table: ShockTable,
    pub coverage: Coverage,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: ShockConfig,
    pub table: ShockTable,
    pub stats: ShockStats,
    pub coverage: Coverage,
    pub formatted_rows: usize,
    pub written: Vec<WrittenFile>,
}

/// Load every input and run all validations without calculating or writing.
pub fn check_inputs(options: &RunOptions) -> Result<PreparedRun, AppError> {
    let mut config = load_config(&options.config_path())?;
    options.apply_overrides(&mut config);

    let groups = load_groups(&options.groups_path())?;
    let rules = load_rules(&options.input_dir.join(&config.format_rules))?;
    tracing::debug!(
        indicators = groups.len(),
        rules = rules.len(),
        up_scenarios = config.group_rates_up_scenarios.len(),
        "loaded configuration"
    );

    let mapping = read_sheet(&options.input_dir, &config.mapping_excel, &config.mapping_sheet_name)?;
    let data = read_sheet(&options.input_dir, &config.data_excel, &config.data_sheet_name)?;
    let joined = merge_on_indicator(&mapping, &data)?;

    let bounds = PeriodBounds {
        t0: normalize_period_label(&config.t0),
        scen_start: normalize_period_label(&config.scen_start),
        scen_end: normalize_period_label(&config.scen_end),
    };
    validate_structure(&joined, &bounds)?;

    let table = assemble_rows(&joined, &bounds)?;
    let coverage = check_group_coverage(&table, &groups, config.strict_group_coverage)?;

    Ok(PreparedRun {
        config,
        groups,
        rules,
        table,
        coverage,
    })
}

/// Execute the full pipeline and return the computed table.
pub fn run_path2shock(options: &RunOptions) -> Result<RunOutput, AppError> {
    let PreparedRun {
        config,
        groups,
        rules,
        mut table,
        coverage,
    } = check_inputs(options)?;

    let stats = calculate_shocks(&mut table, &groups, &config.group_rates_up_scenarios);
    let formatted_rows = apply_format_rules(&mut table, &rules, &config.group_rates_up_scenarios);
    let written = write_scenario_outputs(&table, &options.output_dir)?;

    Ok(RunOutput {
        config,
        table,
        stats,
        coverage,
        formatted_rows,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ShockConfig {
        crate::config::parse_config(
            r#"{"mapping_excel": "mapping", "data_excel": "path",
                "mapping_sheet_name": "Sheet1", "data_sheet_name": "Sheet1",
                "group_rates_up_scenarios": ["S1"],
                "T0": "2025.4", "scen_start": "2026.1", "scen_end": "2029.1"}"#,
        )
        .unwrap()
    }

    #[test]
    fn overrides_replace_config_values() {
        let options = RunOptions {
            data_source: Some("path_v2".to_string()),
            scen_end: Some("2028.4".to_string()),
            ..RunOptions::default()
        };
        let mut config = sample_config();
        options.apply_overrides(&mut config);
        assert_eq!(config.data_excel, "path_v2");
        assert_eq!(config.scen_end, "2028.4");
        assert_eq!(config.mapping_excel, "mapping");
    }

    #[test]
    fn default_paths_live_in_input_dir() {
        let options = RunOptions::default();
        assert_eq!(options.config_path(), PathBuf::from("input").join("config.json"));
        assert_eq!(options.groups_path(), PathBuf::from("input").join("groups.json"));
    }
}
