use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::misc::parsing::Lookback;
use crate::{DEFAULT_LOOKBACK_DAYS, DEFAULT_TOOL};

const ENV_PREFIX: &str = "SEFF";

/// What to do with an output line whose field count differs from the requested column count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCountPolicy {
    /// Fail the whole query with [`MalformedOutput`](crate::InquirerError::MalformedOutput).
    #[default]
    Strict,
    /// Pair columns and fields up to the shorter of the two and drop the rest.
    Lenient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path or name of the `sacct` binary.
    pub tool: PathBuf,
    /// Window for user-scoped queries, counted in whole days back from today.
    pub lookback: Lookback,
    pub field_count: FieldCountPolicy,
}

impl Settings {
    /// Defaults, overridden by `SEFF_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize::<Self>()?
            .checked()
    }

    /// Defaults, then the given TOML file, then `SEFF_*` environment variables.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize::<Self>()?
            .checked()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("tool", DEFAULT_TOOL)?
            .set_default("lookback", format!("{DEFAULT_LOOKBACK_DAYS}d"))?
            .set_default("field_count", "strict")
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.lookback_days() < 1 {
            return Err(ConfigError::Message(format!(
                "lookback must be at least one day, got {}",
                self.lookback
            )));
        }
        Ok(self)
    }

    pub fn lookback_days(&self) -> i64 {
        *self.lookback
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tool: PathBuf::from(DEFAULT_TOOL),
            lookback: Lookback(DEFAULT_LOOKBACK_DAYS),
            field_count: FieldCountPolicy::default(),
        }
    }
}
