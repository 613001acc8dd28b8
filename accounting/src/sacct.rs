use std::path::{Path, PathBuf};

use derive_builder::Builder;
use itertools::Itertools as _;
use tracing::{debug, instrument, warn};

use crate::config::{FieldCountPolicy, Settings};
use crate::error::{BackendFailure, InquirerError, Result};
use crate::inquirer::Inquirer;
use crate::query::{helpformat_args, query_args, QueryMode};
use crate::record::{DbOutput, Record};
use crate::runner::{display_command, CommandRunner, SystemRunner};
use crate::slurm::SlurmUser;
use crate::{DEFAULT_LOOKBACK_DAYS, DEFAULT_TOOL};

/// [`Inquirer`] backed by Slurm's `sacct`.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SacctInquirer<R: CommandRunner + Clone = SystemRunner> {
    runner: R,
    #[builder(default = "PathBuf::from(DEFAULT_TOOL)", setter(into))]
    tool: PathBuf,
    #[builder(default = "DEFAULT_LOOKBACK_DAYS")]
    lookback_days: i64,
    #[builder(default)]
    field_count: FieldCountPolicy,
    #[builder(default, setter(into, strip_option))]
    user: Option<SlurmUser>,
}

impl SacctInquirer {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        SacctInquirer {
            runner: SystemRunner,
            tool: settings.tool.clone(),
            lookback_days: settings.lookback_days(),
            field_count: settings.field_count,
            user: None,
        }
    }
}

impl Default for SacctInquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner + Clone> SacctInquirerBuilder<R> {
    fn validate(&self) -> std::result::Result<(), String> {
        match self.lookback_days {
            Some(days) if days < 1 => Err(format!("lookback must be at least one day, got {days}")),
            _ => Ok(()),
        }
    }
}

impl<R: CommandRunner + Clone> SacctInquirer<R> {
    pub fn with_runner(runner: R) -> Self {
        SacctInquirer {
            runner,
            tool: PathBuf::from(DEFAULT_TOOL),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            field_count: FieldCountPolicy::default(),
            user: None,
        }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    pub fn user(&self) -> Option<&SlurmUser> {
        self.user.as_ref()
    }

    /// The mode [`Inquirer::get_db_output`] would use right now for `jobs`. An empty user name
    /// counts as no filter.
    pub fn mode_for(&self, jobs: &[String]) -> Result<QueryMode> {
        match &self.user {
            Some(user) if !user.is_empty() => QueryMode::by_user(user.clone(), self.lookback_days),
            _ => Ok(QueryMode::by_jobs(jobs.iter().cloned())),
        }
    }

    /// Query with an explicit mode, independent of the stored user filter.
    pub fn query(&self, columns: &[String], mode: &QueryMode) -> Result<Vec<Record>> {
        Ok(self.query_debug(columns, mode)?.records)
    }

    /// Like [`SacctInquirer::query`], but also returns the raw output text.
    #[instrument(skip(self), fields(tool = %self.tool.display()))]
    pub fn query_debug(&self, columns: &[String], mode: &QueryMode) -> Result<DbOutput> {
        let stdout = self.run(&query_args(columns, mode))?;
        let lines = stdout.split('\n').collect_vec();
        let records = parse_rows(&lines, columns, self.field_count)?;
        debug!(rows = records.len(), "parsed sacct output");
        Ok(DbOutput {
            records,
            raw: lines.join("\n"),
        })
    }

    /// [`Inquirer::get_db_output`] plus the raw output text, for diagnostics.
    pub fn get_db_output_debug(&self, columns: &[String], jobs: &[String]) -> Result<DbOutput> {
        self.query_debug(columns, &self.mode_for(jobs)?)
    }

    fn run(&self, args: &[String]) -> Result<String> {
        let command = display_command(&self.tool, args);
        debug!(%command, "running");
        let unavailable = |reason: BackendFailure| {
            warn!(%command, %reason, "accounting command failed");
            InquirerError::BackendUnavailable {
                command: command.clone(),
                reason,
            }
        };

        let output = self.runner.run(&self.tool, args).map_err(|e| unavailable(BackendFailure::Spawn(e)))?;
        if !output.status.success() {
            return Err(unavailable(BackendFailure::Status {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl<R: CommandRunner + Clone> Inquirer for SacctInquirer<R> {
    #[instrument(skip(self), fields(tool = %self.tool.display()))]
    fn get_valid_formats(&self) -> Result<Vec<String>> {
        let stdout = self.run(&helpformat_args())?;
        Ok(stdout.split_whitespace().map(str::to_owned).collect())
    }

    fn get_db_output(&self, columns: &[String], jobs: &[String]) -> Result<Vec<Record>> {
        self.query(columns, &self.mode_for(jobs)?)
    }

    fn set_user(&mut self, user: &str) {
        self.user = Some(SlurmUser::from(user));
    }

    fn clear_user(&mut self) {
        self.user = None;
    }
}

/// Empty lines are skipped; every other line becomes one record, fields paired with `columns` by
/// position.
pub fn parse_rows(lines: &[&str], columns: &[String], policy: FieldCountPolicy) -> Result<Vec<Record>> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            let fields = line.split('|').collect_vec();
            if policy == FieldCountPolicy::Strict && fields.len() != columns.len() {
                return Err(InquirerError::MalformedOutput {
                    line: i + 1,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }
            Ok(columns.iter().map(String::as_str).zip(fields).collect::<Record>())
        })
        .process_results(|rows| rows.collect())
}
