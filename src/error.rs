//! Error taxonomy for the shell layer.
//!
//! The menu compiler itself never fails; everything here originates from
//! loading, templating, or the Tauri host.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("app directory not provided")]
    MissingAppDir,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration in {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("missing built-in asset {0}")]
    MissingAsset(&'static str),

    #[error("function with that name ({0}) already exists")]
    FunctionExists(String),

    #[error("no function named {0}")]
    FunctionNotFound(String),

    #[error("no focused window")]
    NoWindow,

    #[error("invalid view path {}", .0.display())]
    InvalidViewPath(PathBuf),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}

impl ShellError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
