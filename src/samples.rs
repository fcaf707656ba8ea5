use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{HunterError, Result};

/// One pipeline execution.
///
/// `run_number` is the only ordering key; timestamps are used solely to
/// derive the wall-clock duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: u64,
    pub run_number: u64,
    /// When the run was created (ISO-8601)
    pub created_at: String,
    /// When the run last changed state (ISO-8601)
    pub updated_at: String,
}

/// Measured duration of a named step or test within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedDurationSample {
    pub run_number: u64,
    #[serde(alias = "step_name", alias = "test_name")]
    pub name: String,
    pub duration_seconds: f64,
}

impl NamedDurationSample {
    pub fn new(run_number: u64, name: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            run_number,
            name: name.into(),
            duration_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
}

impl FromStr for TestOutcome {
    type Err = HunterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            other => Err(HunterError::invalid(
                "outcome",
                format!("expected passed, failed or skipped, got {other:?}"),
            )),
        }
    }
}

/// Outcome of a single test in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcomeSample {
    pub run_number: u64,
    pub test_name: String,
    pub outcome: TestOutcome,
}

impl TestOutcomeSample {
    pub fn new(run_number: u64, test_name: impl Into<String>, outcome: TestOutcome) -> Self {
        Self {
            run_number,
            test_name: test_name.into(),
            outcome,
        }
    }
}

/// Source of per-repository history consumed by the analysis.
pub trait SampleProvider {
    fn runs(&self, repo: &str) -> Result<Vec<Run>>;
    fn step_durations(&self, repo: &str) -> Result<Vec<NamedDurationSample>>;
    fn test_durations(&self, repo: &str) -> Result<Vec<NamedDurationSample>>;
    fn test_outcomes(&self, repo: &str) -> Result<Vec<TestOutcomeSample>>;
}

/// Complete recorded history of one repository.
///
/// Doubles as an in-memory [`SampleProvider`] serving only `repo`, and can be
/// loaded from a JSON export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepoHistory {
    pub repo: String,
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub step_durations: Vec<NamedDurationSample>,
    #[serde(default)]
    pub test_durations: Vec<NamedDurationSample>,
    #[serde(default)]
    pub test_outcomes: Vec<TestOutcomeSample>,
}

impl RepoHistory {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Loads a history export from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid export.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let history: Self = serde_json::from_str(&content)?;

        info!(
            "Loaded history for {} from {}: {} runs, {} step samples, {} test samples, {} outcomes",
            history.repo,
            path.display(),
            history.runs.len(),
            history.step_durations.len(),
            history.test_durations.len(),
            history.test_outcomes.len()
        );

        Ok(history)
    }

    fn ensure_repo(&self, repo: &str) -> Result<()> {
        if self.repo == repo {
            Ok(())
        } else {
            debug!("Requested {repo}, but history only covers {}", self.repo);
            Err(HunterError::UnknownRepository(repo.to_string()))
        }
    }
}

impl SampleProvider for RepoHistory {
    fn runs(&self, repo: &str) -> Result<Vec<Run>> {
        self.ensure_repo(repo)?;
        Ok(self.runs.clone())
    }

    fn step_durations(&self, repo: &str) -> Result<Vec<NamedDurationSample>> {
        self.ensure_repo(repo)?;
        Ok(self.step_durations.clone())
    }

    fn test_durations(&self, repo: &str) -> Result<Vec<NamedDurationSample>> {
        self.ensure_repo(repo)?;
        Ok(self.test_durations.clone())
    }

    fn test_outcomes(&self, repo: &str) -> Result<Vec<TestOutcomeSample>> {
        self.ensure_repo(repo)?;
        Ok(self.test_outcomes.clone())
    }
}
