//! ica-core: shared foundation for the IC advanced tool front end.
//!
//! Contains:
//! - numeric (number-field grammar and coercion)
//! - value (JSON value helpers shared by the form and the formatter)
//! - paths (home expansion and run-file path parsing)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod paths;
pub mod value;

pub use error::{IcaError, IcaResult};
pub use numeric::*;
pub use paths::{PathFlavour, RunPath, expand_home};
pub use value::*;
