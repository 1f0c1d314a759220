//! Service layer shared by the front ends.
//!
//! Saving merges a formatted solver document into the output file, loading
//! maps a saved document back onto the form, and running saves the document
//! and hands it to the external analysis tool.

pub mod config;
pub mod document_service;
pub mod error;
pub mod persistence;
pub mod run_service;

pub use config::{CONFIG_FILE_NAME, ConfigCache};
pub use document_service::{load_document, restore_document, save_session, save_values};
pub use error::{AppError, AppResult};
pub use persistence::{
    DEFAULT_OUTPUT_FILE, merge_payload, output_path_control, read_existing,
    resolve_document_path, resolve_output_path, save_payload, write_pretty_json,
};
pub use run_service::{
    RunRequest, RunResponse, RunTarget, format_command, normalize_tool_path, resolve_executable,
    run_tool, tool_path_control,
};
