use std::collections::HashMap;

use color_eyre::{eyre::Context as _, Result};
use serde::Serialize;

use crate::misc::parsing::{memory, slurm_time};
use crate::record::Record;

/// Shown for any value the accounting data did not provide.
pub const MISSING: &str = "---";

/// Efficiency summary of one job, folded from its accounting lines.
///
/// Feed it the main line (`JobID == id`) and the step lines (`id.batch`, `id.0`, ...) in any
/// order the inquirer returned them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub jobid: String,
    /// Output file the job was found through, shown instead of the ID when known.
    pub filename: Option<String>,
    pub state: Option<String>,
    /// `Elapsed` of the main line, verbatim.
    pub time: Option<String>,
    pub time_eff: Option<f64>,
    pub cpu_eff: Option<f64>,
    /// KiB, summed `MaxRSS` over all steps.
    pub step_mem: f64,
    /// KiB, `None` when the request is unknown.
    pub total_mem: Option<f64>,
    pub other_entries: Record,
}

impl Job {
    pub fn new(jobid: impl Into<String>) -> Self {
        Job {
            jobid: jobid.into(),
            filename: None,
            state: None,
            time: None,
            time_eff: None,
            cpu_eff: None,
            step_mem: 0.0,
            total_mem: None,
            other_entries: Record::default(),
        }
    }

    pub fn with_filename(jobid: impl Into<String>, filename: impl Into<String>) -> Self {
        Job {
            filename: Some(filename.into()).filter(|f| !f.is_empty()),
            ..Self::new(jobid)
        }
    }

    pub fn name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.jobid)
    }

    pub fn update(&mut self, entry: &Record) -> Result<()> {
        let jobid = entry.get("JobID").unwrap_or_default();
        if !jobid.contains('.') {
            self.state = entry
                .get("State")
                .and_then(|s| s.split_whitespace().next())
                .map(str::to_owned);
        }

        let state = self.state.clone();
        match state.as_deref() {
            Some("PENDING") => Ok(()),
            _ if jobid == self.jobid => self.update_main(entry).wrap_err_with(|| format!("job {}", self.jobid)),
            Some("RUNNING") => Ok(()),
            _ => self.update_step(entry).wrap_err_with(|| format!("step {jobid}")),
        }
    }

    fn update_main(&mut self, entry: &Record) -> Result<()> {
        self.other_entries = entry.clone();
        self.time = entry.get("Elapsed").map(str::to_owned);

        let wall = entry.get("Elapsed").map(slurm_time::parse).transpose()?.map_or(0, |d| d.num_seconds());
        self.time_eff = match entry.get("Timelimit") {
            Some(limit) if slurm_time::is_unlimited(limit) => None,
            Some(limit) => match slurm_time::parse(limit)?.num_seconds() {
                0 => None,
                requested => Some(percent(wall as f64, requested as f64)),
            },
            None => Some(percent(wall as f64, 1.0)),
        };

        if self.state.as_deref() == Some("RUNNING") {
            return Ok(());
        }

        let alloc_cpus = entry.get("AllocCPUS").map(parse_count).transpose()?;
        let cpu_per_core = match (entry.get("TotalCPU"), alloc_cpus) {
            (Some(total), Some(cpus)) if cpus > 0 => slurm_time::parse(total)?.num_seconds() as f64 / f64::from(cpus),
            _ => 0.0,
        };
        self.cpu_eff = (wall != 0).then(|| percent(cpu_per_core, wall as f64));

        let req_mem = entry.get("ReqMem").or_else(|| entry.get("REQMEM"));
        self.total_mem = match (req_mem, entry.get("NNodes").map(parse_count).transpose()?, alloc_cpus) {
            (Some(mem), Some(nodes), Some(cpus)) => Some(memory::parse_requested(mem, nodes, cpus)?),
            _ => None,
        };
        Ok(())
    }

    fn update_step(&mut self, entry: &Record) -> Result<()> {
        let mut merged: HashMap<String, String> = self.other_entries.clone().into();
        for (k, v) in entry.iter() {
            let slot = merged.entry(k.to_owned()).or_default();
            if slot.is_empty() {
                *slot = v.to_owned();
            }
        }
        self.other_entries = Record::from(merged);

        if let Some(rss) = entry.get("MaxRSS") {
            self.step_mem += memory::parse_step(rss)?;
        }
        Ok(())
    }

    pub fn mem_eff(&self) -> Option<f64> {
        self.total_mem.filter(|&t| t > 0.0).map(|total| percent(self.step_mem, total))
    }

    /// Summary value for `column`, or the raw accounting value for any other column.
    pub fn get_entry(&self, column: &str) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| MISSING.to_owned(), |v| v.to_string());
        match column {
            "JobID" => self.name().to_owned(),
            "State" => self.state.clone().unwrap_or_else(|| MISSING.to_owned()),
            "MemEff" => fmt(self.mem_eff()),
            "TimeEff" => fmt(self.time_eff),
            "CPUEff" => fmt(self.cpu_eff.filter(|&v| v != 0.0)),
            other => self.other_entries.get(other).unwrap_or(MISSING).to_owned(),
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    (part / whole * 1000.0).round() / 10.0
}

fn parse_count(value: &str) -> Result<u32> {
    value.parse::<u32>().wrap_err_with(|| format!("parsing count {value:?}"))
}

#[allow(non_snake_case)]
#[cfg(test)]
mod test {
    use color_eyre::Result;

    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    fn completed_job() -> Result<Job> {
        let mut job = Job::new("1234");
        job.update(&record(&[
            ("JobID", "1234"),
            ("State", "COMPLETED"),
            ("Elapsed", "00:10:00"),
            ("Timelimit", "00:20:00"),
            ("TotalCPU", "00:30:00"),
            ("AllocCPUS", "4"),
            ("NNodes", "1"),
            ("ReqMem", "1Gc"),
            ("MaxRSS", ""),
        ]))?;
        job.update(&record(&[
            ("JobID", "1234.batch"),
            ("State", "COMPLETED"),
            ("Elapsed", "00:10:00"),
            ("Timelimit", ""),
            ("TotalCPU", "00:30:00"),
            ("AllocCPUS", "4"),
            ("NNodes", "1"),
            ("ReqMem", "1Gc"),
            ("MaxRSS", "1048576K"),
        ]))?;
        Ok(job)
    }

    #[test]
    fn Job__update__completed_with_steps() -> Result<()> {
        let job = completed_job()?;
        assert_eq!(job.state.as_deref(), Some("COMPLETED"));
        assert_eq!(job.time.as_deref(), Some("00:10:00"));
        assert_eq!(job.time_eff, Some(50.0));
        assert_eq!(job.cpu_eff, Some(75.0));
        assert_eq!(job.total_mem, Some(4.0 * 1024.0 * 1024.0));
        assert_eq!(job.mem_eff(), Some(25.0));
        assert_eq!(job.get_entry("MaxRSS"), "1048576K");
        assert_eq!(job.get_entry("MemEff"), "25");
        assert_eq!(job.get_entry("Partition"), MISSING);
        Ok(())
    }

    #[test]
    fn Job__update__step_before_main_line() -> Result<()> {
        let mut job = Job::new("77");
        job.update(&record(&[("JobID", "77.0"), ("State", "FAILED"), ("MaxRSS", "2M")]))?;
        job.update(&record(&[("JobID", "77"), ("State", "FAILED"), ("Elapsed", "00:00:10")]))?;
        assert_eq!(job.state.as_deref(), Some("FAILED"));
        assert_eq!(job.step_mem, 2048.0);
        assert_eq!(job.time_eff, Some(1000.0));
        Ok(())
    }

    #[test]
    fn Job__update__pending_ignores_data() -> Result<()> {
        let mut job = Job::new("5");
        job.update(&record(&[("JobID", "5"), ("State", "PENDING"), ("Elapsed", "00:00:00")]))?;
        assert_eq!(job.get_entry("State"), "PENDING");
        assert_eq!(job.time, None);
        assert_eq!(job.get_entry("TimeEff"), MISSING);
        Ok(())
    }

    #[test]
    fn Job__update__running_has_no_cpu_eff() -> Result<()> {
        let mut job = Job::new("6");
        job.update(&record(&[
            ("JobID", "6"),
            ("State", "RUNNING"),
            ("Elapsed", "01:00:00"),
            ("Timelimit", "1-00:00:00"),
            ("TotalCPU", "00:10:00"),
            ("AllocCPUS", "1"),
        ]))?;
        job.update(&record(&[("JobID", "6.batch"), ("State", "RUNNING"), ("MaxRSS", "1G")]))?;
        assert_eq!(job.time_eff, Some(4.2));
        assert_eq!(job.cpu_eff, None);
        assert_eq!(job.step_mem, 0.0);
        Ok(())
    }

    #[test]
    fn Job__update__state_keeps_first_word() -> Result<()> {
        let mut job = Job::new("8");
        job.update(&record(&[("JobID", "8"), ("State", "CANCELLED by 1000"), ("Timelimit", "UNLIMITED")]))?;
        assert_eq!(job.get_entry("State"), "CANCELLED");
        assert_eq!(job.time_eff, None);
        assert_eq!(job.get_entry("CPUEff"), MISSING);
        Ok(())
    }

    #[test]
    fn Job__update__bad_memory_is_an_error() {
        let mut job = Job::new("9");
        let res = job.update(&record(&[
            ("JobID", "9"),
            ("State", "COMPLETED"),
            ("AllocCPUS", "1"),
            ("NNodes", "1"),
            ("ReqMem", "12Qc"),
        ]));
        assert!(res.is_err());
    }

    #[test]
    fn Job__get_entry__jobid_shows_filename() -> Result<()> {
        let mut job = Job::with_filename("4242", "slurm-4242.out");
        job.update(&record(&[("JobID", "4242"), ("State", "COMPLETED")]))?;
        assert_eq!(job.name(), "slurm-4242.out");
        assert_eq!(job.get_entry("JobID"), "slurm-4242.out");
        assert_eq!(job.get_entry("State"), "COMPLETED");

        assert_eq!(Job::new("4242").get_entry("JobID"), "4242");
        assert_eq!(Job::with_filename("4242", "").name(), "4242");
        Ok(())
    }
}
