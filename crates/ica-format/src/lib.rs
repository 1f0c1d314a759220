//! ica-format: solver-specific output documents.
//!
//! Turns collected form values into the JSON shape each analysis tool
//! expects, and maps saved documents back onto form sections.

pub mod materials;
pub mod payload;
pub mod restore;
pub mod run_metadata;
pub mod solver;

pub use materials::{build_model_entry, format_materials};
pub use payload::{
    Payload, format_mapping_tool, format_pressure_oven, format_pressure_ramp_profile,
    format_reliability_source, format_reliability_tools, format_solver_payload,
};
pub use restore::{prepare_section_values, select_solver_payload};
pub use run_metadata::{RunMetadata, derive_run_metadata};
pub use solver::SolverKind;

pub type FormatResult<T> = Result<T, FormatError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Run file path is required.")]
    RunFileRequired,

    #[error("Run file path must be absolute: {path}")]
    RunFileNotAbsolute { path: String },

    #[error("Run file path must include a parent folder: {path}")]
    RunFileNoParent { path: String },
}
