use std::fmt::Debug;

use chrono::NaiveDate;
use derive_more::derive::{Deref, Display, From, Into};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, From, Into, Serialize)]
pub struct SlurmUser(pub String);

impl From<&str> for SlurmUser {
    fn from(value: &str) -> Self {
        SlurmUser(value.to_owned())
    }
}

/// `MMDDYY`, e.g. `031524` for 2024-03-15.
///
/// sacct reads `--starttime` in local time; only the date is passed, so the window starts at
/// local midnight of that day.
pub fn format_date_for_sacct(date: NaiveDate) -> String {
    const FMT: &str = "%m%d%y";
    date.format(FMT).to_string()
}
