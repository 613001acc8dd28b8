use std::collections::HashMap;

use derive_more::derive::{Deref, From, Into};
use serde::Serialize;

/// One accounting line, keyed by the requested column names. Values stay exactly as `sacct`
/// printed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From, Into, Serialize)]
#[serde(transparent)]
pub struct Record(HashMap<String, String>);

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parsed records together with the raw text they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbOutput {
    pub records: Vec<Record>,
    pub raw: String,
}
