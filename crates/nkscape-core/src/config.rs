//! Experiment configuration.
//!
//! An experiment file is YAML with three sections: optional `logging` and
//! `output` settings, and a list of `cases`. Each case names an influence
//! matrix, the landscape parameters, a shock schedule and a roster of agent
//! types. Loading resolves every case into a validated [`CaseSpec`], so a
//! malformed case is reported before any run starts.
//!
//! ```yaml
//! output:
//!   directory: results
//!   format: tsv
//! cases:
//!   - runs: 10
//!     influence_matrix:
//!       path: matrices/n6k2.csv
//!     bias: 0.5
//!     delta: 0.2
//!     tau: [40, 120]
//!     agents:
//!       - type: incremental
//!         num: 5
//!         power: 1
//!         constraint: 1.0
//!         plan: "(0,1,2)(3,4,5)"
//! ```

use std::path::{Path, PathBuf};

use nkscape_agents::{Agent, AgentError, IterationPlan};
use nkscape_landscape::{DependencyMatrix, LandscapeError};
use nkscape_types::SearchStrategy;
use serde::Deserialize;

use crate::schedule::ShockSchedule;
use crate::sink::OutputFormat;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A case's influence matrix is missing, ambiguous or invalid.
    #[error("case {case}: influence matrix: {source}")]
    Matrix {
        /// Zero-based case index.
        case: usize,
        /// The underlying landscape error.
        source: LandscapeError,
    },

    /// A case parameter is out of range.
    #[error("case {case}: {reason}")]
    InvalidCase {
        /// Zero-based case index.
        case: usize,
        /// What was wrong.
        reason: String,
    },

    /// An agent entry failed validation.
    #[error("case {case}, agent {agent_type}: {source}")]
    Agent {
        /// Zero-based case index.
        case: usize,
        /// Type name of the agent entry.
        agent_type: String,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error) when
    /// `RUST_LOG` is not set.
    #[serde(default)]
    pub level: Option<String>,
}

/// Where and how records are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory, relative to the working directory.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Record line format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

/// Source of a case's influence matrix: a file or inline rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixSource {
    /// Adjacency table file, relative to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Inline adjacency table rows.
    #[serde(default)]
    pub rows: Option<Vec<String>>,
}

/// Iteration plan as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlanEntry {
    /// Compact notation, e.g. `"(0,1)(2)"`.
    Compact(String),
    /// Explicit groups, e.g. `[[0, 1], [2]]`.
    Groups(Vec<Vec<usize>>),
}

/// One agent type as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentEntry {
    /// Type name.
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Number of individuals.
    pub num: u32,
    /// Processing power.
    pub power: usize,
    /// Constraint fraction in `(0, 1]`.
    pub constraint: f64,
    /// Greedy multi-pass search instead of random acceptance.
    #[serde(default)]
    pub exhaustive: bool,
    /// Score candidates by their expected fitness over undecided elements.
    #[serde(default)]
    pub averaging: bool,
    /// Iteration plan.
    pub plan: PlanEntry,
}

/// One case as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseEntry {
    /// Number of runs (seeds `0..runs`).
    pub runs: u32,
    /// Influence matrix source.
    pub influence_matrix: MatrixSource,
    /// Initial uncertainty in `[0, 1]`.
    pub bias: f64,
    /// Shock persistence in `[0, 1]`.
    pub delta: f64,
    /// Shock thresholds, in any order.
    #[serde(default)]
    pub tau: Vec<u64>,
    /// Agent roster.
    pub agents: Vec<AgentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExperimentFile {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    output: OutputConfig,
    cases: Vec<CaseEntry>,
}

/// A validated case, ready to simulate.
#[derive(Debug, Clone)]
pub struct CaseSpec {
    /// Number of runs.
    pub runs: u32,
    /// Dependency structure.
    pub matrix: DependencyMatrix,
    /// Initial uncertainty.
    pub bias: f64,
    /// Shock persistence.
    pub delta: f64,
    /// Shock thresholds.
    pub schedule: ShockSchedule,
    /// Agent types in simulation order.
    pub roster: Vec<Agent>,
}

/// A loaded experiment.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Cases in file order.
    pub cases: Vec<CaseSpec>,
}

impl ExperimentConfig {
    /// Load an experiment from a YAML file. Matrix paths are resolved
    /// relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise any
    /// error of [`ExperimentConfig::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&contents, base_dir)
    }

    /// Parse an experiment from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] for invalid YAML or unknown keys, and
    /// a case-specific error for any case that fails validation.
    pub fn parse(yaml: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ExperimentFile = serde_yml::from_str(yaml)?;
        let cases = file
            .cases
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.resolve(index, base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            logging: file.logging,
            output: file.output,
            cases,
        })
    }

    /// Total number of runs across all cases.
    pub fn total_runs(&self) -> u64 {
        self.cases
            .iter()
            .fold(0_u64, |acc, case| acc.saturating_add(u64::from(case.runs)))
    }
}

impl CaseEntry {
    /// Validate this entry into a [`CaseSpec`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming `case` for any invalid field.
    pub fn resolve(&self, case: usize, base_dir: &Path) -> Result<CaseSpec, ConfigError> {
        let matrix = self.influence_matrix.load(case, base_dir)?;
        if !(0.0..=1.0).contains(&self.bias) {
            return Err(ConfigError::InvalidCase {
                case,
                reason: format!("bias must be in [0, 1], got {}", self.bias),
            });
        }
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(ConfigError::InvalidCase {
                case,
                reason: format!("delta must be in [0, 1], got {}", self.delta),
            });
        }
        let roster = self
            .agents
            .iter()
            .map(|entry| entry.build(matrix.n()).map_err(|source| ConfigError::Agent {
                case,
                agent_type: entry.agent_type.clone(),
                source,
            }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CaseSpec {
            runs: self.runs,
            matrix,
            bias: self.bias,
            delta: self.delta,
            schedule: ShockSchedule::new(self.tau.iter().copied()),
            roster,
        })
    }
}

impl MatrixSource {
    fn load(&self, case: usize, base_dir: &Path) -> Result<DependencyMatrix, ConfigError> {
        let matrix = match (&self.path, &self.rows) {
            (Some(path), None) => DependencyMatrix::from_file(&base_dir.join(path)),
            (None, Some(rows)) => DependencyMatrix::parse_table(&rows.join("\n")),
            _ => {
                return Err(ConfigError::InvalidCase {
                    case,
                    reason: "influence_matrix needs exactly one of `path` or `rows`".to_owned(),
                });
            }
        };
        matrix.map_err(|source| ConfigError::Matrix { case, source })
    }
}

impl AgentEntry {
    /// Validate this entry into an [`Agent`] over `n` elements.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] for an invalid plan, power or constraint.
    pub fn build(&self, n: usize) -> Result<Agent, AgentError> {
        let plan = match &self.plan {
            PlanEntry::Compact(text) => IterationPlan::parse_compact(text, n)?,
            PlanEntry::Groups(groups) => IterationPlan::from_lists(groups, n)?,
        };
        Agent::new(
            self.agent_type.clone(),
            self.num,
            plan,
            self.power,
            self.constraint,
            SearchStrategy::from_flags(self.exhaustive, self.averaging),
        )
    }
}
