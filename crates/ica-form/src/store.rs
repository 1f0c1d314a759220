//! Section → field → control mapping for the active solver.

use crate::control::{FieldControl, FieldState};
use crate::{FormError, FormResult};
use ica_core::case_insensitive_get;
use ica_schema::Schema;
use serde_json::{Map, Value};

pub use ica_core::SectionValues;

#[derive(Debug, Clone)]
pub struct SectionState {
    pub name: String,
    pub fields: Vec<FieldState>,
}

impl SectionState {
    pub fn field(&self, name: &str) -> Option<&FieldControl> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.control)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldControl> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.control)
    }
}

#[derive(Debug, Clone)]
pub struct ValueStore {
    solver: String,
    sections: Vec<SectionState>,
}

impl ValueStore {
    /// Fresh store for `solver` with every field at its schema default.
    /// Unknown solvers get an empty store.
    pub fn for_solver(schema: &Schema, solver: &str) -> Self {
        let sections = schema
            .sections(solver)
            .iter()
            .map(|section| SectionState {
                name: section.name.clone(),
                fields: section.fields.iter().map(FieldState::from_def).collect(),
            })
            .collect();
        Self {
            solver: solver.to_string(),
            sections,
        }
    }

    pub fn solver(&self) -> &str {
        &self.solver
    }

    pub fn sections(&self) -> &[SectionState] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionState> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn field(&self, section: &str, field: &str) -> FormResult<&FieldControl> {
        self.section(section)
            .ok_or_else(|| FormError::UnknownSection {
                section: section.to_string(),
            })?
            .field(field)
            .ok_or_else(|| FormError::UnknownField {
                section: section.to_string(),
                field: field.to_string(),
            })
    }

    pub fn field_mut(&mut self, section: &str, field: &str) -> FormResult<&mut FieldControl> {
        self.sections
            .iter_mut()
            .find(|s| s.name == section)
            .ok_or_else(|| FormError::UnknownSection {
                section: section.to_string(),
            })?
            .field_mut(field)
            .ok_or_else(|| FormError::UnknownField {
                section: section.to_string(),
                field: field.to_string(),
            })
    }

    /// Read every field. The first field that cannot be read aborts the
    /// whole collection.
    pub fn collect(&self) -> FormResult<SectionValues> {
        let mut out = Map::new();
        for section in &self.sections {
            let mut values = Map::new();
            for field in &section.fields {
                let value = field.control.read().map_err(|e| FormError::FieldRead {
                    section: section.name.clone(),
                    field: field.name.clone(),
                    reason: e.to_string(),
                })?;
                values.insert(field.name.clone(), value);
            }
            out.insert(section.name.clone(), Value::Object(values));
        }
        Ok(out)
    }

    /// Write loaded values. Sections are matched by exact name, fields
    /// case-insensitively; absent values leave the field untouched.
    pub fn apply(&mut self, sections: &SectionValues) {
        for section in &mut self.sections {
            let Some(Value::Object(payload)) = sections.get(&section.name) else {
                continue;
            };
            for field in &mut section.fields {
                if let Some(value) = case_insensitive_get(payload, &field.name) {
                    field.control.write(value);
                }
            }
        }
    }
}
