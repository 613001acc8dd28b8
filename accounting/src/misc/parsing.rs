/// The user-mode window in the settings file: whole days (`7d`) or weeks (`2w`).
pub mod lookback {
    use color_eyre::{
        eyre::{bail, eyre, Context as _},
        Result,
    };
    use derive_more::derive::{Deref, Display};
    use itertools::Itertools as _;
    use serde::Deserialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deref, Display, Deserialize)]
    #[serde(try_from = "String")]
    #[display("{_0}d")]
    pub struct Lookback(pub i64);

    impl TryFrom<String> for Lookback {
        type Error = color_eyre::Report;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            let chars = value.trim().chars().collect_vec();
            let (count, per_unit) = match chars.as_slice() {
                [days @ .., 'd'] => (days, 1),
                [weeks @ .., 'w'] => (weeks, 7),
                x => bail!(
                    "parsing lookback: {x}: invalid suffix (only d, w)",
                    x = x.iter().collect::<String>()
                ),
            };
            let count = count.iter().collect::<String>();
            let days = count
                .parse::<i64>()
                .context("parsing lookback from string")?
                .checked_mul(per_unit)
                .ok_or_else(|| eyre!("lookback {value:?} is out of range"))?;
            Ok(Lookback(days))
        }
    }

    impl TryFrom<&str> for Lookback {
        type Error = color_eyre::Report;

        fn try_from(value: &str) -> Result<Self, Self::Error> {
            Self::try_from(value.to_owned())
        }
    }
}

/// The three elapsed-time layouts sacct uses in `Elapsed`, `Timelimit` and `TotalCPU`.
pub mod slurm_time {
    use chrono::Duration;
    use color_eyre::{
        eyre::{bail, Context as _},
        Result,
    };
    use itertools::Itertools as _;

    /// `D-HH:MM:SS`, `HH:MM:SS` or `MM:SS.mmm`. Sub-second parts are dropped.
    pub fn parse(value: &str) -> Result<Duration> {
        let num = |s: &str| s.parse::<i64>().wrap_err_with(|| format!("parsing {s:?} in slurm time {value:?}"));

        let (days, clock) = match value.split_once('-') {
            Some((days, clock)) => (num(days)?, clock),
            None => (0, value),
        };
        let parts = clock.split(':').collect_vec();
        let seconds = match parts.as_slice() {
            [h, m, s] if !s.contains('.') => num(h)? * 3600 + num(m)? * 60 + num(s)?,
            [m, s_ms] if days == 0 => match s_ms.split_once('.') {
                Some((s, _millis)) => num(m)? * 60 + num(s)?,
                None => bail!("slurm time {value:?}: expected MM:SS.mmm"),
            },
            _ => bail!("slurm time {value:?}: expected D-HH:MM:SS, HH:MM:SS or MM:SS.mmm"),
        };
        Ok(Duration::seconds(days * 86_400 + seconds))
    }

    /// `Timelimit` may be a limit that has no duration at all.
    pub fn is_unlimited(value: &str) -> bool {
        matches!(value, "UNLIMITED" | "Partition_Limit" | "INVALID" | "")
    }
}

/// Memory columns, in KiB.
pub mod memory {
    use color_eyre::{
        eyre::{bail, eyre, Context as _},
        Result,
    };

    fn multiple(unit: char) -> Option<f64> {
        Some(match unit {
            'K' => 1.0,
            'M' => 1024.0,
            'G' => 1024.0_f64.powi(2),
            'T' => 1024.0_f64.powi(3),
            'E' => 1024.0_f64.powi(4),
            _ => return None,
        })
    }

    /// `ReqMem` like `4000Mc` (per cpu) or `16Gn` (per node), scaled up to the whole job.
    ///
    /// A value without a unit letter in front of the `n`/`c` counts as nothing requested.
    pub fn parse_requested(mem: &str, nodes: u32, cpus: u32) -> Result<f64> {
        let chars = mem.chars().collect::<Vec<_>>();
        let (number, unit, alloc) = match chars.as_slice() {
            [number @ .., unit, alloc] => (number.iter().collect::<String>(), *unit, *alloc),
            _ => bail!("requested memory {mem:?}: too short"),
        };
        let amount = if unit.is_ascii_digit() {
            0.0
        } else {
            let multiple = multiple(unit).ok_or_else(|| eyre!("requested memory {mem:?}: unknown unit {unit}"))?;
            number
                .parse::<f64>()
                .wrap_err_with(|| format!("parsing requested memory {mem:?}"))?
                * multiple
        };
        Ok(match alloc {
            'n' => amount * f64::from(nodes),
            _ => amount * f64::from(cpus),
        })
    }

    /// `MaxRSS` of one step, like `1234K`. Empty means the step recorded nothing.
    pub fn parse_step(mem: &str) -> Result<f64> {
        let Some(unit) = mem.chars().last() else {
            return Ok(0.0);
        };
        let number = &mem[..mem.len() - unit.len_utf8()];
        let multiple = multiple(unit).ok_or_else(|| eyre!("Unexpected memstep format: {mem}"))?;
        Ok(number
            .parse::<f64>()
            .wrap_err_with(|| format!("Unexpected memstep format: {mem}"))?
            * multiple)
    }
}

pub use lookback::Lookback;

#[allow(non_snake_case)]
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn Lookback__try_from_string() {
        assert_eq!(Lookback::try_from("7d").unwrap(), Lookback(7));
        assert_eq!(Lookback::try_from(" 2w ").unwrap(), Lookback(14));
        assert_eq!(Lookback::try_from("0d").unwrap(), Lookback(0));
        assert_eq!(Lookback(3).to_string(), "3d");

        assert!(Lookback::try_from("7").is_err());
        assert!(Lookback::try_from("36h").is_err());
        assert!(Lookback::try_from("xd").is_err());
        assert!(Lookback::try_from(format!("{}w", i64::MAX)).is_err());
    }

    #[test]
    fn slurm_time__parse__all_layouts() {
        assert_eq!(slurm_time::parse("1-02:03:04").unwrap().num_seconds(), 93_784);
        assert_eq!(slurm_time::parse("00:01:00").unwrap().num_seconds(), 60);
        assert_eq!(slurm_time::parse("12:34:56").unwrap().num_seconds(), 45_296);
        assert_eq!(slurm_time::parse("01:30.250").unwrap().num_seconds(), 90);
    }

    #[test]
    fn slurm_time__parse__rejects_garbage() {
        assert!(slurm_time::parse("UNLIMITED").is_err());
        assert!(slurm_time::parse("01:30").is_err());
        assert!(slurm_time::parse("a-00:00:00").is_err());
        assert!(slurm_time::is_unlimited("UNLIMITED"));
        assert!(!slurm_time::is_unlimited("00:10:00"));
    }

    #[test]
    fn memory__parse_requested() {
        assert_eq!(memory::parse_requested("4000Mc", 1, 4).unwrap(), 4000.0 * 1024.0 * 4.0);
        assert_eq!(memory::parse_requested("16Gn", 2, 8).unwrap(), 16.0 * 1024.0 * 1024.0 * 2.0);
        assert_eq!(memory::parse_requested("0n", 2, 8).unwrap(), 0.0);
        assert!(memory::parse_requested("4Xc", 1, 1).is_err());
        assert!(memory::parse_requested("c", 1, 1).is_err());
    }

    #[test]
    fn memory__parse_step() {
        assert_eq!(memory::parse_step("").unwrap(), 0.0);
        assert_eq!(memory::parse_step("1234K").unwrap(), 1234.0);
        assert_eq!(memory::parse_step("1.5M").unwrap(), 1536.0);
        assert!(memory::parse_step("12").is_err());
        assert!(memory::parse_step("abcK").is_err());
    }
}
