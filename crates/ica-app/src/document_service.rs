//! Saving the form to, and restoring it from, the output document.

use crate::error::{AppError, AppResult};
use crate::persistence::save_payload;
use ica_core::SectionValues;
use ica_form::FormSession;
use ica_format::{Payload, format_solver_payload, prepare_section_values, select_solver_payload};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Format `values` under `solver` and merge the result into `output`.
pub fn save_values(solver: &str, values: &SectionValues, output: &Path) -> AppResult<Payload> {
    let payload = format_solver_payload(solver, values)?;
    save_payload(output, &payload)?;
    Ok(payload)
}

/// Collect the session and save it. `format_as` overrides the solver the
/// payload is formatted for.
pub fn save_session(
    session: &FormSession,
    output: &Path,
    format_as: Option<&str>,
) -> AppResult<Payload> {
    let (solver, values) = session.collect()?;
    let target = format_as.filter(|name| !name.is_empty()).unwrap_or(solver.as_str());
    save_values(target, &values, output)
}

/// Read a saved document.
pub fn load_document(path: &Path) -> AppResult<Value> {
    if !path.exists() {
        return Err(AppError::DocumentNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| AppError::DocumentRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| AppError::DocumentRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load the document at `path` into the session. Returns the solver the
/// form switched to.
pub fn restore_document(session: &mut FormSession, path: &Path) -> AppResult<String> {
    let document = load_document(path)?;
    let current = session.active_solver().map(str::to_string);
    let (solver, payload) = select_solver_payload(
        &document,
        current.as_deref(),
        session.schema().solver_names(),
    )
    .ok_or_else(|| AppError::UnsupportedDocument {
        path: path.to_path_buf(),
    })?;

    let sections = prepare_section_values(session.schema(), &solver, &payload);
    session.load(&solver, &sections);
    tracing::debug!(%solver, path = %path.display(), "document restored");
    Ok(solver)
}
