//! Error types for module discovery and loading.

use crate::parsing::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from module discovery.
///
/// Parse failures of individual files are not loader errors; they are
/// collected in [`super::LoadReport::failures`].
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Module '{name}' not found in search path {}", display_paths(.search_path))]
    ModuleNotFound {
        name: String,
        search_path: Vec<PathBuf>,
    },

    #[error("Invalid module name '{0}'")]
    InvalidModuleName(String),

    #[error("Path {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to read {}: {reason}", .path.display())]
    Walk { path: PathBuf, reason: String },

    #[error("Failed to create parser: {0}")]
    Parser(#[from] ParseError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    let parts: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", parts.join(", "))
}

impl From<walkdir::Error> for LoaderError {
    fn from(e: walkdir::Error) -> Self {
        LoaderError::Walk {
            path: e.path().map(PathBuf::from).unwrap_or_default(),
            reason: e.to_string(),
        }
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
