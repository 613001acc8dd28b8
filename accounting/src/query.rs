use chrono::{Days, Local, NaiveDate};
use itertools::Itertools as _;

use crate::error::{InquirerError, Result};
use crate::slurm::{format_date_for_sacct, SlurmUser};

/// Which jobs a single query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    ByJobs(Vec<String>),
    /// All of `user`'s jobs started on or after `since`.
    ByUser { user: SlurmUser, since: NaiveDate },
}

impl QueryMode {
    pub fn by_jobs<I, S>(jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryMode::ByJobs(jobs.into_iter().map(Into::into).collect())
    }

    /// The trailing window ends today, local time.
    pub fn by_user(user: impl Into<SlurmUser>, lookback_days: i64) -> Result<Self> {
        Self::by_user_from(user, Local::now().date_naive(), lookback_days)
    }

    /// `lookback_days` must be at least one and keep the start date representable.
    pub fn by_user_from(user: impl Into<SlurmUser>, today: NaiveDate, lookback_days: i64) -> Result<Self> {
        let since = u64::try_from(lookback_days)
            .ok()
            .filter(|&days| days >= 1)
            .and_then(|days| today.checked_sub_days(Days::new(days)))
            .ok_or(InquirerError::InvalidLookback(lookback_days))?;
        Ok(QueryMode::ByUser {
            user: user.into(),
            since,
        })
    }
}

/// `-P` gives `|` separated fields, `-n` drops the header line.
const BASE_ARGS: [&str; 2] = ["-P", "-n"];

pub fn helpformat_args() -> Vec<String> {
    vec!["--helpformat".to_owned()]
}

pub fn query_args(columns: &[impl AsRef<str>], mode: &QueryMode) -> Vec<String> {
    let mut args = BASE_ARGS.iter().map(|s| s.to_string()).collect_vec();
    args.push(format!("--format={}", columns.iter().map(|c| c.as_ref()).join(",")));
    match mode {
        QueryMode::ByUser { user, since } => {
            args.push(format!("--user={user}"));
            args.push(format!("--starttime={}", format_date_for_sacct(*since)));
        }
        QueryMode::ByJobs(jobs) => args.push(format!("--jobs={}", jobs.join(","))),
    }
    args
}
