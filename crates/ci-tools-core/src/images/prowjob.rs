use super::{find_files_in_directory, PodSpec};
use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Job sections of a Prow configuration.
///
/// Only the fields needed to find images are modelled; everything else in
/// the file is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub periodics: Vec<Job>,
    /// Presubmit jobs keyed by `org/repo`.
    #[serde(default)]
    pub presubmits: BTreeMap<String, Vec<Job>>,
    /// Postsubmit jobs keyed by `org/repo`.
    #[serde(default)]
    pub postsubmits: BTreeMap<String, Vec<Job>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spec: Option<PodSpec>,
}

impl JobConfig {
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Load the jobs from the main Prow config and every YAML file below
    /// `jobs_dir`.
    pub fn load(config_file: &Path, jobs_dir: &Path) -> Result<Self> {
        let mut config = Self::parse(&std::fs::read_to_string(config_file)?)?;
        for path in find_files_in_directory(jobs_dir, r"\.(yaml|yml)$")? {
            let jobs = Self::parse(&std::fs::read_to_string(&path)?)?;
            tracing::debug!(path = %path.display(), "loaded job config");
            config.merge(jobs);
        }
        Ok(config)
    }

    pub fn merge(&mut self, other: JobConfig) {
        self.periodics.extend(other.periodics);
        for (repo, jobs) in other.presubmits {
            self.presubmits.entry(repo).or_default().extend(jobs);
        }
        for (repo, jobs) in other.postsubmits {
            self.postsubmits.entry(repo).or_default().extend(jobs);
        }
    }
}

/// Every container image of periodic, presubmit and postsubmit jobs, in that
/// order. Jobs without a pod spec are skipped.
pub fn from_prow_job_config(config: &JobConfig) -> Vec<String> {
    let periodics = config.periodics.iter();
    let presubmits = config.presubmits.values().flatten();
    let postsubmits = config.postsubmits.values().flatten();

    periodics
        .chain(presubmits)
        .chain(postsubmits)
        .filter_map(|job| job.spec.as_ref())
        .flat_map(|spec| spec.images().map(String::from))
        .collect()
}
