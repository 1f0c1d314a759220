//! Per-field-type controls.
//!
//! Every control exposes `read` (normalised value) and `write` (update the
//! displayed state). `write(read())` reproduces an equivalent display.

use crate::materials::MaterialsControl;
use crate::{FormError, FormResult};
use ica_core::{IcaError, coerce_number, expand_home, is_blank, value_text};
use ica_schema::{FieldDef, FieldKind, PathOptions};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A named control: one entry of a section, group or table row.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub name: String,
    pub control: FieldControl,
}

impl FieldState {
    pub fn from_def(def: &FieldDef) -> Self {
        Self {
            name: def.name.clone(),
            control: FieldControl::from_def(def),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldControl {
    Text(TextControl),
    Path(PathControl),
    Choice(ChoiceControl),
    Number(NumberControl),
    Group(GroupControl),
    Table(TableControl),
    Materials(MaterialsControl),
}

impl FieldControl {
    /// Fresh control holding the schema default.
    pub fn from_def(def: &FieldDef) -> Self {
        match &def.kind {
            FieldKind::Text => FieldControl::Text(TextControl::default()),
            FieldKind::Path(options) => FieldControl::Path(PathControl::new(options.clone())),
            FieldKind::Choice { options } => {
                FieldControl::Choice(ChoiceControl::new(options.clone()))
            }
            FieldKind::Number => FieldControl::Number(NumberControl::default()),
            FieldKind::Group { fields } => FieldControl::Group(GroupControl::new(fields)),
            FieldKind::Table { columns } => FieldControl::Table(TableControl::new(columns.clone())),
            FieldKind::Materials(def) => {
                FieldControl::Materials(MaterialsControl::new(def.clone()))
            }
        }
    }

    pub fn read(&self) -> Result<Value, IcaError> {
        match self {
            FieldControl::Text(c) => Ok(c.read()),
            FieldControl::Path(c) => Ok(c.read()),
            FieldControl::Choice(c) => Ok(c.read()),
            FieldControl::Number(c) => c.read(),
            FieldControl::Group(c) => c.read(),
            FieldControl::Table(c) => c.read(),
            FieldControl::Materials(c) => Ok(c.read()),
        }
    }

    pub fn write(&mut self, value: &Value) {
        match self {
            FieldControl::Text(c) => c.write(value),
            FieldControl::Path(c) => c.write(value),
            FieldControl::Choice(c) => c.write(value),
            FieldControl::Number(c) => c.write(value),
            FieldControl::Group(c) => c.write(value),
            FieldControl::Table(c) => c.write(value),
            FieldControl::Materials(c) => c.write(value),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldControl::Text(_) => "text",
            FieldControl::Path(_) => "path",
            FieldControl::Choice(_) => "list",
            FieldControl::Number(_) => "number",
            FieldControl::Group(_) => "key-value list",
            FieldControl::Table(_) => "table",
            FieldControl::Materials(_) => "materials table",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextControl {
    pub text: String,
}

impl TextControl {
    pub fn read(&self) -> Value {
        Value::String(self.text.clone())
    }

    pub fn write(&mut self, value: &Value) {
        self.text = value_text(value);
    }
}

/// Path entry. Reading returns the text as typed; normalisation only happens
/// when the entry is committed.
#[derive(Debug, Clone)]
pub struct PathControl {
    pub text: String,
    options: PathOptions,
}

impl PathControl {
    pub fn new(options: PathOptions) -> Self {
        Self {
            text: String::new(),
            options,
        }
    }

    pub fn options(&self) -> &PathOptions {
        &self.options
    }

    pub fn read(&self) -> Value {
        Value::String(self.text.clone())
    }

    /// Replace the text without committing it.
    pub fn write(&mut self, value: &Value) {
        self.text = value_text(value);
    }

    /// Normalise the current text in place and return the committed path.
    pub fn commit(&mut self) -> String {
        let normalized = self.normalize(&self.text);
        if normalized != self.text {
            self.text = normalized;
        }
        self.text.clone()
    }

    /// Append the default suffix when the path has no extension.
    ///
    /// JSON targets are additionally expanded and materialised: the parent
    /// directory and an empty placeholder file are created. Failures there
    /// are logged and otherwise ignored.
    pub fn normalize(&self, raw: &str) -> String {
        let text = raw.trim();
        if text.is_empty() {
            return String::new();
        }
        let Some(suffix) = self.options.suffix() else {
            return text.to_string();
        };
        if !self.options.materializes() {
            if std::path::Path::new(text).extension().is_none() {
                return format!("{text}.{suffix}");
            }
            return text.to_string();
        }

        let mut candidate = PathBuf::from(expand_home(text));
        if candidate.extension().is_none() {
            candidate.set_extension(suffix);
        }
        if let Err(err) = materialize(&candidate) {
            tracing::warn!(path = %candidate.display(), error = %err, "could not create placeholder file");
        }
        candidate.to_string_lossy().into_owned()
    }
}

fn materialize(path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(())
}

/// Enumerated choice. The option list starts as the schema's; writing an
/// unknown value appends it.
#[derive(Debug, Clone)]
pub struct ChoiceControl {
    options: Vec<String>,
    selected: String,
}

impl ChoiceControl {
    pub fn new(options: Vec<String>) -> Self {
        let selected = options.first().cloned().unwrap_or_default();
        Self { options, selected }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn read(&self) -> Value {
        Value::String(self.selected.clone())
    }

    pub fn write(&mut self, value: &Value) {
        let text = value_text(value);
        if text.is_empty() {
            return;
        }
        if !self.options.contains(&text) {
            self.options.push(text.clone());
        }
        self.selected = text;
    }
}

#[derive(Debug, Clone, Default)]
pub struct NumberControl {
    pub text: String,
}

impl NumberControl {
    pub fn read(&self) -> Result<Value, IcaError> {
        coerce_number(&self.text)
    }

    pub fn write(&mut self, value: &Value) {
        self.text = if is_blank(value) {
            String::new()
        } else {
            value_text(value)
        };
    }
}

/// Nested key-value group.
#[derive(Debug, Clone)]
pub struct GroupControl {
    pub fields: Vec<FieldState>,
}

impl GroupControl {
    pub fn new(defs: &[FieldDef]) -> Self {
        Self {
            fields: defs.iter().map(FieldState::from_def).collect(),
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldControl> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.control)
    }

    pub fn read(&self) -> Result<Value, IcaError> {
        read_fields(&self.fields)
    }

    /// Update the sub-fields present in `value`; others keep their state.
    pub fn write(&mut self, value: &Value) {
        let Value::Object(map) = value else {
            return;
        };
        for field in &mut self.fields {
            if let Some(raw) = map.get(&field.name).filter(|v| !v.is_null()) {
                field.control.write(raw);
            }
        }
    }
}

pub(crate) fn read_fields(fields: &[FieldState]) -> Result<Value, IcaError> {
    let mut out = Map::new();
    for field in fields {
        out.insert(field.name.clone(), field.control.read()?);
    }
    Ok(Value::Object(out))
}

/// Repeatable rows over a fixed column set.
#[derive(Debug, Clone)]
pub struct TableControl {
    columns: Vec<FieldDef>,
    rows: Vec<Vec<FieldState>>,
}

impl TableControl {
    pub fn new(columns: Vec<FieldDef>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[FieldDef] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self) -> &mut [FieldState] {
        let row = self.columns.iter().map(FieldState::from_def).collect();
        self.rows.push(row);
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn remove_row(&mut self, index: usize) -> FormResult<()> {
        if index >= self.rows.len() {
            return Err(FormError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.rows.remove(index);
        Ok(())
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    pub fn read(&self) -> Result<Value, IcaError> {
        self.rows
            .iter()
            .map(|row| read_fields(row))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    /// Replace every row with one row per element of `value`.
    pub fn write(&mut self, value: &Value) {
        self.clear_rows();
        let Value::Array(items) = value else {
            return;
        };
        for item in items {
            let row = self.add_row();
            if let Value::Object(data) = item {
                for cell in row.iter_mut() {
                    let raw = data.get(&cell.name).unwrap_or(&Value::Null);
                    cell.control.write(raw);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ica_schema::{DialogMode, PathMode};
    use serde_json::json;

    fn number(name: &str) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind: FieldKind::Number,
        }
    }

    #[test]
    fn choice_defaults_to_first_option_and_grows() {
        let mut c = ChoiceControl::new(vec!["A".into(), "B".into()]);
        assert_eq!(c.read(), json!("A"));
        c.write(&json!("C"));
        assert_eq!(c.options(), ["A", "B", "C"]);
        assert_eq!(c.read(), json!("C"));
        c.write(&json!(""));
        assert_eq!(c.read(), json!("C"));
    }

    #[test]
    fn empty_choice_reads_empty_string() {
        let c = ChoiceControl::new(Vec::new());
        assert_eq!(c.read(), json!(""));
    }

    #[test]
    fn number_write_read_cycle() {
        let mut c = NumberControl::default();
        c.write(&json!(2.5));
        assert_eq!(c.read().unwrap(), json!(2.5));
        c.write(&json!(""));
        assert_eq!(c.text, "");
        assert_eq!(c.read().unwrap(), json!(""));
        c.text = "1e3".into();
        assert_eq!(c.read().unwrap(), json!(1000));
    }

    #[test]
    fn table_write_replaces_rows() {
        let mut t = TableControl::new(vec![number("a"), number("b")]);
        t.add_row();
        t.add_row();
        t.add_row();
        t.write(&json!([{"a": 1, "b": 2}]));
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.read().unwrap(), json!([{"a": 1, "b": 2}]));

        t.write(&json!("not a list"));
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn table_remove_row_removes_exactly_one() {
        let mut t = TableControl::new(vec![number("a")]);
        t.write(&json!([{"a": 1}, {"a": 2}, {"a": 3}]));
        t.remove_row(1).unwrap();
        assert_eq!(t.read().unwrap(), json!([{"a": 1}, {"a": 3}]));
        assert!(t.remove_row(5).is_err());
    }

    #[test]
    fn group_write_skips_missing_keys() {
        let mut g = GroupControl::new(&[number("x"), number("y")]);
        g.write(&json!({"x": 4}));
        g.write(&json!({"y": 5, "x": null}));
        assert_eq!(g.read().unwrap(), json!({"x": 4, "y": 5}));
    }

    #[test]
    fn path_appends_suffix_without_touching_disk() {
        let c = PathControl::new(PathOptions {
            mode: PathMode::File,
            dialog: DialogMode::Open,
            default_suffix: Some("run".into()),
            ..Default::default()
        });
        let missing = std::env::temp_dir().join("ica_no_such_dir").join("case");
        let normalized = c.normalize(&missing.to_string_lossy());
        assert!(normalized.ends_with("case.run"));
        assert!(!missing.parent().unwrap().exists());
        assert_eq!(c.normalize("a/b.txt"), "a/b.txt");
        assert_eq!(c.normalize("   "), "");
    }

    #[test]
    fn json_path_materializes_placeholder() {
        let dir = std::env::temp_dir().join("ica_form_materialize");
        let _ = std::fs::remove_dir_all(&dir);
        let mut c = PathControl::new(PathOptions {
            default_suffix: Some("json".into()),
            ..Default::default()
        });
        c.write(&json!(dir.join("nested").join("out").to_string_lossy()));
        let committed = c.commit();
        assert!(committed.ends_with("out.json"));
        assert!(std::path::Path::new(&committed).is_file());
        assert_eq!(c.read(), json!(committed));
    }

    #[test]
    fn path_read_returns_uncommitted_text() {
        let mut c = PathControl::new(PathOptions {
            default_suffix: Some("run".into()),
            ..Default::default()
        });
        c.write(&json!("/x/case"));
        assert_eq!(c.read(), json!("/x/case"));
        assert_eq!(c.commit(), "/x/case.run");
    }
}
