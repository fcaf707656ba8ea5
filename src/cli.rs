use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ci_hunter::analysis::analyze_repo;
use ci_hunter::config::{Config, OutputFormat, RegressionOverrides};
use ci_hunter::detection::BaselineStrategy;
use ci_hunter::output;
use ci_hunter::samples::RepoHistory;

#[derive(Parser)]
#[command(name = "ci-hunter")]
#[command(author, version, about = "CI regression & flake detector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./ci-hunter.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository's exported run history
    Analyze {
        /// JSON history export (runs, step/test durations, test outcomes)
        #[arg(short, long)]
        input: PathBuf,

        /// Repository to analyze (defaults to the one named in the export)
        #[arg(short, long, env = "CI_HUNTER_REPO")]
        repo: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,

        /// Minimum fractional increase to report (0.2 = 20%)
        #[arg(long)]
        min_delta_pct: Option<f64>,

        /// mean, median or trimmed_mean
        #[arg(long)]
        baseline_strategy: Option<BaselineStrategy>,

        #[arg(long)]
        trim_ratio: Option<f64>,

        /// Only the most recent N historical points feed each baseline
        #[arg(long)]
        history_window: Option<usize>,
    },

    /// Write a configuration file populated with the defaults
    InitConfig {
        #[arg(default_value = "ci-hunter.toml")]
        path: PathBuf,
    },
}

struct AnalyzeArgs<'a> {
    input: &'a PathBuf,
    repo: Option<&'a str>,
    format: Option<OutputFormat>,
    output: Option<&'a PathBuf>,
    pretty: bool,
    overrides: RegressionOverrides,
}

impl Cli {
    fn execute_analyze(&self, args: AnalyzeArgs<'_>) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_overrides(&args.overrides);
        config.validate()?;

        let history = RepoHistory::load(args.input)
            .with_context(|| format!("Failed to load history: {}", args.input.display()))?;
        let repo = args.repo.unwrap_or(&history.repo).to_owned();
        info!("Analyzing history for repository: {}", repo);

        let result = analyze_repo(&history, &repo, &config.analysis_params())?;

        let format = args.format.unwrap_or(config.output.format);
        let pretty = args.pretty || config.output.pretty;

        if let Some(output_path) = args.output {
            let mut file = File::create(output_path).with_context(|| {
                format!("Failed to create output file: {}", output_path.display())
            })?;
            output::export_result(&result, format, pretty, &mut file)?;
            info!("Report written to: {}", output_path.display());
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            output::export_result(&result, format, pretty, &mut handle)?;
            handle.flush()?;
        }

        Ok(())
    }

    fn execute_init_config(path: &Path) -> Result<()> {
        Config::default().save(path)?;
        info!("Default configuration written to: {}", path.display());
        Ok(())
    }

    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Analyze {
                input,
                repo,
                format,
                output,
                pretty,
                min_delta_pct,
                baseline_strategy,
                trim_ratio,
                history_window,
            } => self.execute_analyze(AnalyzeArgs {
                input,
                repo: repo.as_deref(),
                format: *format,
                output: output.as_ref(),
                pretty: *pretty,
                overrides: RegressionOverrides {
                    min_delta_pct: *min_delta_pct,
                    baseline_strategy: *baseline_strategy,
                    trim_ratio: *trim_ratio,
                    history_window: *history_window,
                },
            }),
            Commands::InitConfig { path } => Self::execute_init_config(path),
        }
    }
}
