//! Environment overrides live in their own test binary: `SEFF_*` variables are process wide and
//! would leak into the file-based settings tests.
use std::io::Write as _;

use accounting::config::{FieldCountPolicy, Settings};
use color_eyre::Result;

#[test]
fn seff_env_overrides_file_and_defaults() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "tool = \"/opt/slurm/bin/sacct\"")?;
    writeln!(file, "lookback = \"14d\"")?;

    std::env::set_var("SEFF_LOOKBACK", "3d");
    std::env::set_var("SEFF_FIELD_COUNT", "lenient");

    let settings = Settings::from_file(file.path())?;
    assert_eq!(settings.lookback_days(), 3);
    assert_eq!(settings.field_count, FieldCountPolicy::Lenient);
    assert_eq!(settings.tool, std::path::PathBuf::from("/opt/slurm/bin/sacct"));

    let settings = Settings::new()?;
    assert_eq!(settings.lookback_days(), 3);
    assert_eq!(settings.field_count, FieldCountPolicy::Lenient);
    assert_eq!(settings.tool, std::path::PathBuf::from(accounting::DEFAULT_TOOL));

    std::env::set_var("SEFF_LOOKBACK", "0w");
    assert!(Settings::new().is_err());

    std::env::remove_var("SEFF_LOOKBACK");
    std::env::remove_var("SEFF_FIELD_COUNT");
    Ok(())
}
