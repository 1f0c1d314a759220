//! Error types for the ica-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// carries the user-facing validation failures of the save/load/run flows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please select a solver before continuing.")]
    MissingSolver,

    #[error("Please choose an output file path before proceeding.")]
    MissingOutputPath,

    #[error("Please choose the analysis tool executable before running.")]
    MissingExecutable,

    #[error("No executable found at '{path}'.")]
    ExecutableNotFound { path: PathBuf },

    #[error("'{path}' is a directory. Please select the analysis tool executable file.")]
    ExecutableIsDirectory { path: PathBuf },

    #[error("Please choose which solver to run (got '{target}').")]
    InvalidRunTarget { target: String },

    #[error("Could not create directory for {path}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not write to {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No JSON file found at '{path}'.")]
    DocumentNotFound { path: PathBuf },

    #[error("Failed to read configuration {path}: {reason}")]
    DocumentRead { path: PathBuf, reason: String },

    #[error("'{path}' does not contain data for the available solvers.")]
    UnsupportedDocument { path: PathBuf },

    #[error("Failed to start {command}")]
    ToolStart {
        command: String,
        source: std::io::Error,
    },

    #[error("{command}\n\n{details}")]
    ToolFailed { command: String, details: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Formatting error: {0}")]
    Format(String),

    #[error("Run file error: {0}")]
    RunFile(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ica-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<ica_schema::SchemaError> for AppError {
    fn from(err: ica_schema::SchemaError) -> Self {
        AppError::Schema(err.to_string())
    }
}

impl From<ica_form::FormError> for AppError {
    fn from(err: ica_form::FormError) -> Self {
        match err {
            ica_form::FormError::NoSolver => AppError::MissingSolver,
            other => AppError::Form(other.to_string()),
        }
    }
}

impl From<ica_format::FormatError> for AppError {
    fn from(err: ica_format::FormatError) -> Self {
        AppError::Format(err.to_string())
    }
}

impl From<ica_form::RunFileError> for AppError {
    fn from(err: ica_form::RunFileError) -> Self {
        AppError::RunFile(err.to_string())
    }
}
