//! Structure loading.

use crate::raw::{RawField, RawStructure};
use crate::schema::{FieldDef, Schema, SectionDef, SolverDef};
use crate::{SchemaError, SchemaResult};
use serde_json::Value;
use std::path::Path;

/// Structure definition shipped with the tool.
pub const BUILTIN_STRUCTURE: &str = include_str!("../structure.yaml");

/// Build the typed schema from a raw structure document.
///
/// Field definitions are converted into owned values; nothing produced here is
/// shared with the form state built from it.
pub fn load_structure(raw: &RawStructure) -> SchemaResult<Schema> {
    let mut definitions: Vec<SolverDef> = Vec::new();

    for (idx, entry) in raw.parameters.iter().enumerate() {
        let Value::Object(solvers) = entry else {
            return Err(SchemaError::Malformed {
                context: format!("parameters[{idx}]"),
                reason: "expected a mapping of solver name to section groups".to_string(),
            });
        };
        for (solver_name, groups) in solvers {
            let sections = load_sections(solver_name, groups)?;
            let def = SolverDef {
                name: solver_name.clone(),
                sections,
            };
            match definitions.iter_mut().find(|d| d.name == def.name) {
                Some(existing) => *existing = def,
                None => definitions.push(def),
            }
        }
    }

    tracing::debug!(
        solvers = raw.solver.len(),
        definitions = definitions.len(),
        "structure loaded"
    );
    Ok(Schema::new(raw.solver.clone(), definitions))
}

fn load_sections(solver: &str, groups: &Value) -> SchemaResult<Vec<SectionDef>> {
    let groups: Vec<serde_json::Map<String, Value>> = serde_json::from_value(groups.clone())
        .map_err(|e| SchemaError::Malformed {
            context: format!("solver '{solver}'"),
            reason: e.to_string(),
        })?;

    let mut sections: Vec<SectionDef> = Vec::new();
    for group in groups {
        for (section_name, fields) in group {
            let raw_fields: Vec<RawField> =
                serde_json::from_value(fields).map_err(|e| SchemaError::Malformed {
                    context: format!("solver '{solver}' section '{section_name}'"),
                    reason: e.to_string(),
                })?;
            let section = SectionDef {
                name: section_name,
                fields: raw_fields
                    .iter()
                    .map(FieldDef::from_raw)
                    .collect::<SchemaResult<_>>()?,
            };
            match sections.iter_mut().find(|s| s.name == section.name) {
                Some(existing) => *existing = section,
                None => sections.push(section),
            }
        }
    }
    Ok(sections)
}

impl Schema {
    /// The structure shipped with the tool.
    pub fn builtin() -> SchemaResult<Self> {
        Self::from_yaml_str(BUILTIN_STRUCTURE)
    }

    pub fn from_yaml_str(text: &str) -> SchemaResult<Self> {
        let raw: RawStructure = serde_yaml::from_str(text)?;
        load_structure(&raw)
    }

    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let raw: RawStructure = serde_json::from_str(text)?;
        load_structure(&raw)
    }

    /// Load a structure file; `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}
