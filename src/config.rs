use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisParams;
use crate::detection::{BaselineStrategy, ChangePointParams, FlakeParams, RegressionParams};

/// Configuration file structure for ci-hunter.
///
/// Holds detector thresholds for each kind of series plus output preferences.
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Regression settings for whole-run wall-clock durations
    #[serde(default)]
    pub runs: RegressionParams,

    /// Regression settings for named build steps
    #[serde(default)]
    pub steps: RegressionParams,

    /// Regression settings for individual test durations
    #[serde(default)]
    pub tests: RegressionParams,

    #[serde(default)]
    pub change_points: ChangePointParams,

    #[serde(default)]
    pub flakes: FlakeParams,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Markdown,
}

/// Overrides applied on top of the file configuration, typically from CLI flags.
///
/// Each set field replaces the value in all three regression sections.
#[derive(Debug, Clone, Default)]
pub struct RegressionOverrides {
    pub min_delta_pct: Option<f64>,
    pub baseline_strategy: Option<BaselineStrategy>,
    pub trim_ratio: Option<f64>,
    pub history_window: Option<usize>,
}

const CANDIDATES: [&str; 4] = [
    "ci-hunter.toml",
    "ci-hunter.json",
    "ci-hunter.yaml",
    "ci-hunter.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./ci-hunter.toml
    /// 3. ./ci-hunter.json
    /// 4. ./ci-hunter.yaml
    /// 5. ./ci-hunter.yml
    /// 6. `<user config dir>/ci-hunter/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let user_config = dirs::config_dir().map(|dir| dir.join("ci-hunter").join("config.toml"));
        let found = CANDIDATES
            .iter()
            .copied()
            .map(PathBuf::from)
            .chain(user_config)
            .find(|candidate| candidate.exists());

        match found {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        debug!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &RegressionOverrides) {
        for params in [&mut self.runs, &mut self.steps, &mut self.tests] {
            if let Some(min_delta_pct) = overrides.min_delta_pct {
                params.min_delta_pct = min_delta_pct;
            }
            if let Some(strategy) = overrides.baseline_strategy {
                params.baseline_strategy = strategy;
            }
            if let Some(trim_ratio) = overrides.trim_ratio {
                params.trim_ratio = trim_ratio;
            }
            if let Some(history_window) = overrides.history_window {
                params.history_window = Some(history_window);
            }
        }
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            runs: self.runs.clone(),
            steps: self.steps.clone(),
            tests: self.tests.clone(),
            change_points: self.change_points.clone(),
            flakes: self.flakes.clone(),
        }
    }

    /// Checks all detector settings.
    pub fn validate(&self) -> Result<()> {
        self.analysis_params()
            .validate()
            .context("Invalid detector configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runs.min_delta_pct, 0.2);
        assert_eq!(config.runs.baseline_strategy, BaselineStrategy::Median);
        assert_eq!(config.steps.min_history, 1);
        assert_eq!(config.change_points.window_size, 3);
        assert_eq!(config.flakes.min_runs, 5);
        assert_eq!(config.flakes.min_failures, 2);
        assert_eq!(config.output.format, OutputFormat::Summary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[runs]
min-delta-pct = 0.3
baseline-strategy = "trimmed_mean"
trim-ratio = 0.25

[steps]
history-window = 10
min-history = 4

[change-points]
window-size = 5

[flakes]
min-fail-rate = 0.1

[output]
format = "markdown"
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.runs.min_delta_pct, 0.3);
        assert_eq!(config.runs.baseline_strategy, BaselineStrategy::TrimmedMean);
        assert_eq!(config.runs.trim_ratio, 0.25);
        assert_eq!(config.steps.history_window, Some(10));
        assert_eq!(config.steps.min_history, 4);
        assert_eq!(config.tests.min_history, 1, "Unset section keeps defaults");
        assert_eq!(config.change_points.window_size, 5);
        assert_eq!(config.flakes.min_fail_rate, 0.1);
        assert_eq!(config.flakes.min_runs, 5);
        assert_eq!(config.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "tests": {
    "baseline-strategy": "mean"
  },
  "output": {
    "format": "json",
    "pretty": true
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.tests.baseline_strategy, BaselineStrategy::Mean);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let yaml_content = "flakes:\n  min-runs: 8\n  history-window: 20\n";
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.flakes.min_runs, 8);
        assert_eq!(config.flakes.history_window, Some(20));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[runs]\nbaseline-strategy = \"mode\"\n").unwrap();

        assert!(Config::load_from_path(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("definitely-missing-ci-hunter.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ci-hunter.toml");

        let mut config = Config::default();
        config.runs.history_window = Some(30);
        config.flakes.min_fail_rate = 0.35;
        config.output.format = OutputFormat::Json;
        config.save(&path).unwrap();

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.runs, config.runs);
        assert_eq!(reloaded.flakes, config.flakes);
        assert_eq!(reloaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_overrides_apply_to_all_regression_sections() {
        let mut config = Config::default();
        config.apply_overrides(&RegressionOverrides {
            min_delta_pct: Some(0.5),
            baseline_strategy: Some(BaselineStrategy::Mean),
            trim_ratio: None,
            history_window: Some(7),
        });

        for params in [&config.runs, &config.steps, &config.tests] {
            assert_eq!(params.min_delta_pct, 0.5);
            assert_eq!(params.baseline_strategy, BaselineStrategy::Mean);
            assert_eq!(params.trim_ratio, 0.1);
            assert_eq!(params.history_window, Some(7));
        }
    }

    #[test]
    fn test_validate_reports_invalid_settings() {
        let mut config = Config::default();
        config.change_points.window_size = 0;

        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("window_size"));
    }
}
