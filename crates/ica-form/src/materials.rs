//! The materials table: named rows carrying zero or more model entries.
//!
//! Each model entry is built from a draft whose parameter fields depend on the
//! chosen model. Rows read back in the document shape directly: a single model
//! as `Model`, several as `Models`.

use crate::control::FieldState;
use crate::{FormError, FormResult};
use ica_core::{IcaError, is_blank, stringify_value, value_text};
use ica_schema::MaterialsDef;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub name: String,
    /// Parameter name and stringified value, in entry order.
    pub parameters: Vec<(String, Value)>,
}

impl ModelEntry {
    /// `{"Name": .., "Parameters": [{name: value}, ..]}`
    pub fn model_value(&self) -> Value {
        let parameters: Vec<Value> = self
            .parameters
            .iter()
            .map(|(name, value)| {
                let mut entry = Map::new();
                entry.insert(name.clone(), value.clone());
                Value::Object(entry)
            })
            .collect();
        json!({
            "Name": self.name,
            "Parameters": parameters,
        })
    }

    /// `{"Model": {...}}`
    pub fn to_value(&self) -> Value {
        json!({ "Model": self.model_value() })
    }

    /// Rebuild an entry from a saved model mapping. Parameters may be a
    /// mapping or a list of one-entry mappings.
    pub fn from_saved(model: &Map<String, Value>) -> Self {
        let name = value_text(&stringify_value(model.get("Name").unwrap_or(&Value::Null)));
        let mut parameters = Vec::new();
        match model.get("Parameters") {
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    parameters.push((key.clone(), stringify_value(value)));
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    if let Value::Object(map) = item {
                        for (key, value) in map {
                            parameters.push((key.clone(), stringify_value(value)));
                        }
                    }
                }
            }
            _ => {}
        }
        Self { name, parameters }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRow {
    pub name: String,
    pub models: Vec<ModelEntry>,
}

impl MaterialRow {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            models: Vec::new(),
        }
    }

    pub fn read(&self) -> Map<String, Value> {
        let mut data = Map::new();
        if !self.name.is_empty() {
            data.insert("Name".to_string(), Value::String(self.name.clone()));
        }
        match self.models.as_slice() {
            [] => {}
            [single] => {
                data.insert("Model".to_string(), single.model_value());
            }
            many => {
                data.insert(
                    "Models".to_string(),
                    Value::Array(many.iter().map(ModelEntry::to_value).collect()),
                );
            }
        }
        data
    }

    /// Load a saved row: `Models` entries first, then a single `Model`.
    pub fn write(&mut self, data: &Map<String, Value>) {
        self.name = value_text(&stringify_value(data.get("Name").unwrap_or(&Value::Null)));
        self.models.clear();

        if let Some(Value::Array(items)) = data.get("Models") {
            for item in items {
                if let Some(model) = model_payload(item) {
                    self.models.push(ModelEntry::from_saved(model));
                }
            }
        }
        if let Some(model) = data.get("Model").and_then(model_payload) {
            self.models.push(ModelEntry::from_saved(model));
        }
    }
}

/// Accept both `{"Model": {...}}` wrappers and bare model mappings.
fn model_payload(raw: &Value) -> Option<&Map<String, Value>> {
    let Value::Object(map) = raw else {
        return None;
    };
    match map.get("Model") {
        Some(Value::Object(inner)) => Some(inner),
        _ => Some(map),
    }
}

#[derive(Debug, Clone)]
pub struct MaterialsControl {
    def: MaterialsDef,
    rows: Vec<MaterialRow>,
}

impl MaterialsControl {
    pub fn new(def: MaterialsDef) -> Self {
        Self {
            def,
            rows: Vec::new(),
        }
    }

    pub fn def(&self) -> &MaterialsDef {
        &self.def
    }

    pub fn rows(&self) -> &[MaterialRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self, name: Option<&str>) -> &mut MaterialRow {
        self.rows.push(MaterialRow::named(name.unwrap_or("")));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn row_mut(&mut self, index: usize) -> FormResult<&mut MaterialRow> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(FormError::RowOutOfRange { index, len })
    }

    pub fn remove_row(&mut self, index: usize) -> FormResult<()> {
        self.row_mut(index)?;
        self.rows.remove(index);
        Ok(())
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// Replace all rows with one bare row per name.
    pub fn populate_from_names(&mut self, names: &[String]) {
        self.clear_rows();
        for name in names {
            self.add_row(Some(name));
        }
    }

    /// Start configuring a model from the model list.
    pub fn draft(&self, model: &str) -> FormResult<ModelDraft> {
        if model.is_empty() || !self.def.model_options.iter().any(|m| m == model) {
            return Err(FormError::UnknownModel {
                model: model.to_string(),
            });
        }
        Ok(ModelDraft {
            model: model.to_string(),
            fields: self
                .def
                .parameters_for(model)
                .iter()
                .map(FieldState::from_def)
                .collect(),
        })
    }

    /// Attach `model` to row `row`, with `parameters` entered through the
    /// model's parameter fields.
    pub fn add_model(
        &mut self,
        row: usize,
        model: &str,
        parameters: &Map<String, Value>,
    ) -> FormResult<()> {
        let mut draft = self.draft(model)?;
        draft.write(parameters);
        let entry = draft.entry().map_err(|e| FormError::FieldRead {
            section: model.to_string(),
            field: "Parameters".to_string(),
            reason: e.to_string(),
        })?;
        self.row_mut(row)?.models.push(entry);
        Ok(())
    }

    pub fn remove_model(&mut self, row: usize, index: usize) -> FormResult<()> {
        let row = self.row_mut(row)?;
        if index >= row.models.len() {
            return Err(FormError::RowOutOfRange {
                index,
                len: row.models.len(),
            });
        }
        row.models.remove(index);
        Ok(())
    }

    /// Rows in document shape; rows with neither a name nor a model are left out.
    pub fn read(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(MaterialRow::read)
                .filter(|data| !data.is_empty())
                .map(Value::Object)
                .collect(),
        )
    }

    pub fn write(&mut self, value: &Value) {
        self.clear_rows();
        let Value::Array(items) = value else {
            return;
        };
        for item in items {
            if let Value::Object(data) = item {
                self.add_row(None).write(data);
            }
        }
    }
}

/// Parameter entry for one model before it is attached to a row.
#[derive(Debug, Clone)]
pub struct ModelDraft {
    model: String,
    fields: Vec<FieldState>,
}

impl ModelDraft {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn write(&mut self, parameters: &Map<String, Value>) {
        for field in &mut self.fields {
            if let Some(raw) = parameters.get(&field.name) {
                field.control.write(raw);
            }
        }
    }

    /// The finished entry; parameters left empty are not included.
    pub fn entry(&self) -> Result<ModelEntry, IcaError> {
        let mut parameters = Vec::new();
        for field in &self.fields {
            let value = field.control.read()?;
            if !is_blank(&value) {
                parameters.push((field.name.clone(), stringify_value(&value)));
            }
        }
        Ok(ModelEntry {
            name: self.model.clone(),
            parameters,
        })
    }
}
