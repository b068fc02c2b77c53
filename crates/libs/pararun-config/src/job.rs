//! Job records and job list ingestion.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prelude::*;

/// One record of the job list file as written by the user.
///
/// Unknown keys are ignored. Both fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Command line, split on whitespace before execution.
    pub cmd: String,
    /// Name used for log tagging and per-job log file naming.
    pub name: String,
}

/// User-provided job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobList {
    /// Records in file order.
    pub records: Vec<JobRecord>,
}

/// An immutable unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Command line to execute.
    pub command: String,
    /// Display name.
    pub name: String,
    /// Directory receiving the per-job log.
    pub output_dir: PathBuf,
}

impl JobList {
    /// Load a job list from a JSON file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        let list = Self::from_json(&contents)?;
        info!("Loaded {} job(s) from {}", list.len(), file_path.display());
        Ok(list)
    }

    /// Parse a job list from a JSON string.
    pub fn from_json(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert every record into a [`Job`] writing its log into `output_dir`.
    pub fn into_jobs(self, output_dir: &Path) -> Vec<Job> {
        self.records
            .into_iter()
            .map(|record| Job::from_record(record, output_dir))
            .collect()
    }
}

impl Job {
    pub fn from_record(record: JobRecord, output_dir: &Path) -> Self {
        Self {
            command: record.cmd,
            name: record.name,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Name used to tag this job's lines in the shared log.
    pub fn tag(&self) -> &str {
        self.name.trim()
    }

    /// Per-job log path for the given day: `{output_dir}/{name}-{YYYYMMDD}.log`.
    pub fn log_file_path_for(&self, date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.log", self.name, date.format("%Y%m%d")))
    }

    /// Per-job log path for today, in local time.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file_path_for(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_job_list() -> Result<()> {
        let list = JobList::from_json(
            r#"[
                {"cmd": "echo hi", "name": "a"},
                {"cmd": "false", "name": "b", "comment": "ignored"}
            ]"#,
        )?;
        assert_eq!(
            list.records,
            vec![
                JobRecord {
                    cmd: String::from("echo hi"),
                    name: String::from("a"),
                },
                JobRecord {
                    cmd: String::from("false"),
                    name: String::from("b"),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn empty_list_is_valid() -> Result<()> {
        assert!(JobList::from_json("[]")?.is_empty());
        Ok(())
    }

    #[test]
    fn reject_non_list() {
        let err = JobList::from_json(r#"{"cmd": "echo hi", "name": "a"}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn reject_non_object_records() {
        assert!(JobList::from_json(r#"["echo hi"]"#).is_err());
    }

    #[test]
    fn reject_missing_fields() {
        assert!(JobList::from_json(r#"[{"cmd": "echo hi"}]"#).is_err());
        assert!(JobList::from_json(r#"[{"name": "a"}]"#).is_err());
    }

    #[test]
    fn reject_malformed_json() {
        assert!(JobList::from_json("[{").is_err());
    }

    #[test]
    fn from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"[{{"cmd": "uname -a", "name": "kernel"}}]"#)?;
        let jobs = JobList::from_file(file.path())?.into_jobs(Path::new("/tmp/out"));
        assert_eq!(
            jobs,
            vec![Job {
                command: String::from("uname -a"),
                name: String::from("kernel"),
                output_dir: PathBuf::from("/tmp/out"),
            }]
        );
        Ok(())
    }

    #[test]
    fn from_missing_file() {
        let err = JobList::from_file(Path::new("/nonexistent/jobs.json")).unwrap_err();
        assert!(matches!(err, Error::IO(_)));
    }

    #[test]
    fn log_file_path_uses_name_and_date() {
        let job = Job::from_record(
            JobRecord {
                cmd: String::from("echo hi"),
                name: String::from("nightly"),
            },
            Path::new("/var/log/jobs"),
        );
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            job.log_file_path_for(date),
            PathBuf::from("/var/log/jobs/nightly-20240307.log")
        );
    }

    #[test]
    fn tag_is_trimmed() {
        let job = Job::from_record(
            JobRecord {
                cmd: String::from("true"),
                name: String::from("  padded "),
            },
            Path::new("."),
        );
        assert_eq!(job.tag(), "padded");
    }
}
