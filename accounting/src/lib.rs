//! Query layer over the Slurm accounting database.
//!
//! Callers go through the [`Inquirer`] trait: ask for the valid columns, validate their own
//! column list against it, then fetch [`Record`]s for a set of job IDs or for one user's recent
//! jobs. [`SacctInquirer`] is the `sacct` backed implementation. [`job::Job`] folds the records of
//! one job into the usual efficiency summary.
pub mod config;
pub mod error;
pub mod inquirer;
pub mod job;
pub mod misc;
pub mod query;
pub mod record;
pub mod runner;
pub mod sacct;
pub mod slurm;

pub use error::{BackendFailure, InquirerError};
pub use inquirer::Inquirer;
pub use query::QueryMode;
pub use record::{DbOutput, Record};
pub use sacct::SacctInquirer;

/// How far back user-scoped queries look unless configured otherwise.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
pub const DEFAULT_TOOL: &str = "sacct";
