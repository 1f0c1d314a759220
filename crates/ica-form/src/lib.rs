//! ica-form: live form state for the active solver.
//!
//! One control per schema field holds the displayed value and knows how to
//! read it back as a normalised JSON value. The store is rebuilt from schema
//! defaults whenever the active solver changes.

pub mod control;
pub mod materials;
pub mod run_file;
pub mod session;
pub mod store;

pub use control::{
    ChoiceControl, FieldControl, FieldState, GroupControl, NumberControl, PathControl,
    TableControl, TextControl,
};
pub use materials::{MaterialRow, MaterialsControl, ModelDraft, ModelEntry};
pub use run_file::{
    MaterialSource, RunFileError, RunFileOutcome, RunFileReader, RunFileWatch, parse_materials,
    read_run_file,
};
pub use session::{FormSession, PathCommit};
pub use store::{SectionState, SectionValues, ValueStore};

pub type FormResult<T> = Result<T, FormError>;

#[derive(thiserror::Error, Debug)]
pub enum FormError {
    #[error("No solver selected")]
    NoSolver,

    #[error("Unknown section '{section}'")]
    UnknownSection { section: String },

    #[error("Unknown field '{field}' in section '{section}'")]
    UnknownField { section: String, field: String },

    #[error("Failed to read value for '{field}' in '{section}': {reason}")]
    FieldRead {
        section: String,
        field: String,
        reason: String,
    },

    #[error("Field '{field}' is not a {expected}")]
    WrongKind {
        field: String,
        expected: &'static str,
    },

    #[error("Unknown model '{model}'")]
    UnknownModel { model: String },

    #[error("Row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}
