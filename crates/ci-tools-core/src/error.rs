use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiToolsError {
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to extract images from {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: Box<CiToolsError>,
    },

    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, CiToolsError>;
