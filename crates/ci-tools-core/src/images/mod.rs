//! Container image reference extraction.
//!
//! Each extractor reads one source format and returns the image references it
//! finds in document order. Callers combine them with [`from_files`] and
//! [`unique_images`].

mod kubernetes;
mod prowjob;
mod tekton;
mod terraform;

pub use kubernetes::{from_kubernetes_deployments, Container, PodSpec};
pub use prowjob::{from_prow_job_config, Job, JobConfig};
pub use tekton::from_tekton_task;
pub use terraform::from_terraform;

use crate::error::{CiToolsError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All regular files under `root` whose file name matches `pattern`, sorted.
///
/// The pattern is unanchored, so `.*\.(tf|tfvars)` also matches names that
/// merely contain such a suffix.
pub fn find_files_in_directory(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CiToolsError::DirectoryNotFound(root.to_path_buf()));
    }
    let re = Regex::new(pattern).map_err(|source| CiToolsError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if re.is_match(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Run `extract` over every file, concatenating results.
///
/// Stops at the first failing file; the error names it.
pub fn from_files<F>(files: &[PathBuf], extract: F) -> Result<Vec<String>>
where
    F: Fn(File) -> Result<Vec<String>>,
{
    let mut images = Vec::new();
    for path in files {
        let found = File::open(path)
            .map_err(CiToolsError::from)
            .and_then(&extract)
            .map_err(|e| CiToolsError::Extract {
                path: path.clone(),
                source: Box::new(e),
            })?;
        images.extend(found);
    }
    Ok(images)
}

/// Split a multi-document YAML stream, skipping empty documents.
fn yaml_documents<R: Read>(mut reader: R) -> Result<Vec<serde_yaml::Value>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if !value.is_null() {
            docs.push(value);
        }
    }
    Ok(docs)
}

/// `kind` of a manifest document, if any.
fn kind_of(doc: &serde_yaml::Value) -> Option<&str> {
    doc.get("kind").and_then(|k| k.as_str())
}

/// Drop duplicates, keeping the first occurrence of each image.
pub fn unique_images(images: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    images
        .into_iter()
        .filter(|image| seen.insert(image.clone()))
        .collect()
}
