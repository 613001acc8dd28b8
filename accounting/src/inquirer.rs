use itertools::Itertools as _;

use crate::error::{InquirerError, Result};
use crate::record::Record;

/// Anything that can answer "give me these accounting columns for these jobs".
///
/// Result order is not guaranteed to follow the order of the requested jobs.
pub trait Inquirer {
    /// Column names the backend accepts, read from the backend itself.
    fn get_valid_formats(&self) -> Result<Vec<String>>;

    /// One [`Record`] per accounting line, keyed by `columns`.
    ///
    /// `columns` are not re-validated, see [`Inquirer::validate_columns`]. With a user filter
    /// set, `jobs` is ignored and the user's recent jobs are returned instead.
    fn get_db_output(&self, columns: &[String], jobs: &[String]) -> Result<Vec<Record>>;

    /// Switch subsequent queries to the given user's recent jobs.
    fn set_user(&mut self, user: &str);

    /// Back to querying by job IDs.
    fn clear_user(&mut self);

    /// Fails with every column the backend does not know, compared case-insensitively.
    fn validate_columns(&self, columns: &[String]) -> Result<()> {
        let valid = self.get_valid_formats()?.into_iter().map(|f| f.to_ascii_lowercase()).collect_vec();
        let unknown = columns
            .iter()
            .filter(|c| !valid.contains(&c.to_ascii_lowercase()))
            .cloned()
            .collect_vec();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(InquirerError::UnknownColumns(unknown))
        }
    }
}
