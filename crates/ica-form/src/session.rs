//! Form lifecycle: no solver → populated store, rebuilt on every switch.

use crate::control::FieldControl;
use crate::run_file::{MaterialSource, RunFileOutcome, RunFileWatch};
use crate::store::{SectionValues, ValueStore};
use crate::{FormError, FormResult};
use ica_schema::{MATERIALS_FIELD, RUN_FILE_FIELD, SOURCE_SECTION, Schema};
use serde_json::Value;

/// Result of committing a path field.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommit {
    pub path: String,
    /// Set when the committed field is the run file of a source section that
    /// also holds the materials table.
    pub run_file: Option<RunFileOutcome>,
}

#[derive(Debug)]
pub struct FormSession {
    schema: Schema,
    store: Option<ValueStore>,
    run_file: RunFileWatch,
}

impl FormSession {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            store: None,
            run_file: RunFileWatch::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Switch the active solver. Unsaved values of the previous solver are
    /// discarded.
    pub fn select_solver(&mut self, solver: &str) -> &mut ValueStore {
        if let Some(previous) = &self.store {
            tracing::debug!(from = previous.solver(), to = solver, "rebuilding form");
        }
        self.run_file = RunFileWatch::default();
        self.store.insert(ValueStore::for_solver(&self.schema, solver))
    }

    pub fn active_solver(&self) -> Option<&str> {
        self.store.as_ref().map(ValueStore::solver)
    }

    pub fn store(&self) -> FormResult<&ValueStore> {
        self.store.as_ref().ok_or(FormError::NoSolver)
    }

    pub fn store_mut(&mut self) -> FormResult<&mut ValueStore> {
        self.store.as_mut().ok_or(FormError::NoSolver)
    }

    pub fn set_value(&mut self, section: &str, field: &str, value: &Value) -> FormResult<()> {
        self.store_mut()?.field_mut(section, field)?.write(value);
        Ok(())
    }

    /// Commit a path field: normalise it and, for the source run file, refresh
    /// the materials table from the file.
    pub fn commit_path(
        &mut self,
        section: &str,
        field: &str,
        source: &dyn MaterialSource,
    ) -> FormResult<PathCommit> {
        let store = self.store.as_mut().ok_or(FormError::NoSolver)?;
        let path = match store.field_mut(section, field)? {
            FieldControl::Path(control) => control.commit(),
            _ => {
                return Err(FormError::WrongKind {
                    field: field.to_string(),
                    expected: "path",
                });
            }
        };

        let is_run_file = section.eq_ignore_ascii_case(SOURCE_SECTION) && field == RUN_FILE_FIELD;
        if !is_run_file {
            return Ok(PathCommit {
                path,
                run_file: None,
            });
        }
        let Ok(FieldControl::Materials(_)) = store.field(section, MATERIALS_FIELD) else {
            return Ok(PathCommit {
                path,
                run_file: None,
            });
        };

        let outcome = self.run_file.observe(&path, source);
        if let RunFileOutcome::Populated(names) = &outcome
            && let Ok(FieldControl::Materials(materials)) =
                store.field_mut(section, MATERIALS_FIELD)
        {
            materials.populate_from_names(names);
        }
        Ok(PathCommit {
            path,
            run_file: Some(outcome),
        })
    }

    /// Collect the active solver's values.
    pub fn collect(&self) -> FormResult<(String, SectionValues)> {
        let store = self.store()?;
        if store.solver().is_empty() {
            return Err(FormError::NoSolver);
        }
        Ok((store.solver().to_string(), store.collect()?))
    }

    /// Switch to `solver` and fill it with loaded section values.
    pub fn load(&mut self, solver: &str, sections: &SectionValues) {
        self.select_solver(solver).apply(sections);
    }
}
