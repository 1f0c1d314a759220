//! Typed structure definitions.

use crate::raw::RawField;
use crate::{SchemaError, SchemaResult};
use ica_core::capitalize;

/// Solver name whose source section drives run-file derived fields.
pub const RELIABILITY_TOOLS: &str = "ReliabilityTools";
pub const MAPPING_TOOL: &str = "MappingTool";
pub const PRESSURE_OVEN: &str = "PressureOven";

/// Name of the table field that gets the materials-table behavior.
pub const MATERIALS_FIELD: &str = "Materials";
pub const RUN_FILE_FIELD: &str = "RunFile";
pub const SOURCE_SECTION: &str = "source";

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    solvers: Vec<String>,
    definitions: Vec<SolverDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverDef {
    pub name: String,
    pub sections: Vec<SectionDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Path(PathOptions),
    Choice { options: Vec<String> },
    Number,
    Group { fields: Vec<FieldDef> },
    Table { columns: Vec<FieldDef> },
    Materials(MaterialsDef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Open,
    Save,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathOptions {
    pub mode: PathMode,
    pub dialog: DialogMode,
    pub caption: String,
    pub filter: String,
    /// Extension (without dot) appended when the entered path has none.
    pub default_suffix: Option<String>,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            mode: PathMode::Directory,
            dialog: DialogMode::Save,
            caption: "Select path".to_string(),
            filter: "All Files (*)".to_string(),
            default_suffix: None,
        }
    }
}

impl PathOptions {
    /// Suffix without any leading dot, if one is configured.
    pub fn suffix(&self) -> Option<&str> {
        self.default_suffix
            .as_deref()
            .map(|s| s.trim_start_matches('.'))
            .filter(|s| !s.is_empty())
    }

    /// JSON targets get a placeholder file created when normalised.
    pub fn materializes(&self) -> bool {
        self.suffix().is_some_and(|s| s.eq_ignore_ascii_case("json"))
    }
}

/// Model list and per-model parameter schemas of the materials table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialsDef {
    pub model_options: Vec<String>,
    pub parameter_groups: Vec<ModelParameters>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub model: String,
    pub fields: Vec<FieldDef>,
}

impl MaterialsDef {
    /// Parameter fields for `model`; unknown models have none.
    pub fn parameters_for(&self, model: &str) -> &[FieldDef] {
        self.parameter_groups
            .iter()
            .find(|group| group.model == model)
            .map(|group| group.fields.as_slice())
            .unwrap_or(&[])
    }
}

impl FieldDef {
    pub fn from_raw(raw: &RawField) -> SchemaResult<Self> {
        let kind_text = raw.kind.as_deref().unwrap_or("").trim().to_lowercase();
        let kind = match kind_text.as_str() {
            "text edit" => FieldKind::Text,
            "path finder" => FieldKind::Path(path_options(raw)),
            "list" => FieldKind::Choice {
                options: raw.list.clone(),
            },
            "number" => FieldKind::Number,
            "key-value list" => FieldKind::Group {
                fields: group_entries(&raw.fields)?,
            },
            "table" if raw.name == MATERIALS_FIELD => {
                FieldKind::Materials(materials_def(&raw.columns)?)
            }
            "table" => FieldKind::Table {
                columns: raw
                    .columns
                    .iter()
                    .map(FieldDef::from_raw)
                    .collect::<SchemaResult<_>>()?,
            },
            _ => {
                return Err(SchemaError::UnsupportedFieldType {
                    field: raw.name.clone(),
                    kind: raw.kind.clone().unwrap_or_default(),
                });
            }
        };
        Ok(Self {
            name: raw.name.clone(),
            kind,
        })
    }
}

fn path_options(raw: &RawField) -> PathOptions {
    let defaults = PathOptions::default();
    let mode = match raw.mode.as_deref().map(str::to_lowercase).as_deref() {
        Some("file") => PathMode::File,
        _ => PathMode::Directory,
    };
    let dialog = match raw.dialog.as_deref().map(str::to_lowercase).as_deref() {
        Some("open") => DialogMode::Open,
        _ => DialogMode::Save,
    };
    PathOptions {
        mode,
        dialog,
        caption: raw.caption.clone().unwrap_or(defaults.caption),
        filter: raw.filter.clone().unwrap_or(defaults.filter),
        default_suffix: raw.default_suffix.clone(),
    }
}

/// Entries of a key-value list: typed entries are fields, untyped entries
/// with nested fields are named sub-groups.
fn group_entries(entries: &[RawField]) -> SchemaResult<Vec<FieldDef>> {
    entries
        .iter()
        .map(|entry| {
            if entry.kind.is_some() {
                FieldDef::from_raw(entry)
            } else if !entry.fields.is_empty() {
                Ok(FieldDef {
                    name: entry.name.clone(),
                    kind: FieldKind::Group {
                        fields: group_entries(&entry.fields)?,
                    },
                })
            } else {
                Err(SchemaError::UnrecognizedGroupEntry {
                    field: entry.name.clone(),
                })
            }
        })
        .collect()
}

fn materials_def(columns: &[RawField]) -> SchemaResult<MaterialsDef> {
    let model_options = columns
        .iter()
        .find(|col| col.name == "Model")
        .map(|col| col.list.clone())
        .unwrap_or_default();

    let mut parameter_groups = Vec::new();
    if let Some(parameters) = columns.iter().find(|col| col.name == "Parameters") {
        for group in &parameters.fields {
            parameter_groups.push(ModelParameters {
                model: group.name.clone(),
                fields: group
                    .fields
                    .iter()
                    .map(FieldDef::from_raw)
                    .collect::<SchemaResult<_>>()?,
            });
        }
    }

    Ok(MaterialsDef {
        model_options,
        parameter_groups,
    })
}

impl Schema {
    pub fn new(solvers: Vec<String>, definitions: Vec<SolverDef>) -> Self {
        Self {
            solvers,
            definitions,
        }
    }

    /// Solver names in declaration order.
    pub fn solver_names(&self) -> &[String] {
        &self.solvers
    }

    pub fn solver(&self, name: &str) -> Option<&SolverDef> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// Sections of `name`, empty for solvers without a definition.
    pub fn sections(&self, name: &str) -> &[SectionDef] {
        self.solver(name)
            .map(|def| def.sections.as_slice())
            .unwrap_or(&[])
    }

    pub fn definitions(&self) -> &[SolverDef] {
        &self.definitions
    }
}

impl SolverDef {
    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|section| section.name == name)
    }
}

impl SectionDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

fn section_emoji(section: &str) -> &'static str {
    match section.to_lowercase().as_str() {
        "source" => "📁",
        "target" => "🎯",
        "configuration" => "⚙️",
        "materials" => "🧬",
        "model" => "🧠",
        "general" => "📋",
        "material properties" => "🧪",
        "process conditions" => "⏱️",
        "pressure ramp profile" => "📈",
        _ => "📦",
    }
}

/// Group label for a section, e.g. `📁 Source`.
pub fn section_title(section: &str) -> String {
    format!("{} {}", section_emoji(section), capitalize(section))
}
