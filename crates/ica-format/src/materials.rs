//! Materials table formatting.

use ica_core::{is_truthy, stringify_value, value_text};
use serde_json::{Map, Value, json};

/// `{"Model": {"Name": name, "Parameters": [{param: value}, ...]}}`
pub fn build_model_entry(model_name: &str, parameters: &Value) -> Value {
    let params: Vec<Value> = match parameters {
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| {
                let mut entry = Map::new();
                entry.insert(name.clone(), stringify_value(value));
                Value::Object(entry)
            })
            .collect(),
        _ => Vec::new(),
    };
    json!({
        "Model": {
            "Name": model_name,
            "Parameters": params,
        }
    })
}

fn entry_name(entry: &Value) -> &str {
    entry["Model"]["Name"].as_str().unwrap_or("")
}

fn has_parameters(entry: &Value) -> bool {
    entry["Model"]["Parameters"]
        .as_array()
        .is_some_and(|params| !params.is_empty())
}

/// A row is already in document shape when it has `Models`, or a `Model`
/// mapping. A plain-text `Model` is the row's chosen model instead.
fn is_prebuilt(row: &Map<String, Value>) -> bool {
    row.contains_key("Models") || row.get("Model").is_some_and(Value::is_object)
}

/// Format materials rows.
///
/// Raw rows carry `Name`, an optional chosen `Model` and `Parameters`: one
/// parameter mapping per model. Each mapping becomes a model entry; entries
/// without parameters are dropped unless the chosen model would otherwise be
/// lost, and the chosen model is listed first.
pub fn format_materials(rows: &Value) -> Value {
    let Value::Array(rows) = rows else {
        return Value::Array(Vec::new());
    };

    let mut output = Vec::new();
    for row in rows {
        let Value::Object(row) = row else {
            continue;
        };
        if is_prebuilt(row) {
            output.push(stringify_value(&Value::Object(row.clone())));
            continue;
        }

        let mut entry = Map::new();
        if let Some(name) = row.get("Name").filter(|name| is_truthy(name)) {
            entry.insert("Name".to_string(), stringify_value(name));
        }

        let model_choice = row
            .get("Model")
            .filter(|choice| is_truthy(choice))
            .map(|choice| value_text(&stringify_value(choice)));

        let mut model_entries: Vec<Value> = match row.get("Parameters") {
            Some(Value::Object(groups)) => groups
                .iter()
                .map(|(model, params)| build_model_entry(model, params))
                .collect(),
            _ => Vec::new(),
        };

        if let Some(choice) = &model_choice {
            model_entries.sort_by_key(|item| entry_name(item) != choice.as_str());
        }
        model_entries.retain(has_parameters);

        if model_entries.is_empty()
            && let Some(choice) = &model_choice
        {
            model_entries.push(build_model_entry(choice, &Value::Null));
        }

        match model_entries.len() {
            0 => {}
            1 => {
                if let Some(Value::Object(mut single)) = model_entries.pop()
                    && let Some(model) = single.remove("Model")
                {
                    entry.insert("Model".to_string(), model);
                }
            }
            _ => {
                entry.insert("Models".to_string(), Value::Array(model_entries));
            }
        }
        output.push(Value::Object(entry));
    }
    Value::Array(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COFFIN: &str = "FatigueModel: Modified Coffin Manson";
    const MISES: &str = "FailureModel: Von Mises Criterion";
    const HILL: &str = "FailureModel: Hill-Tsai Criterion";

    #[test]
    fn chosen_model_is_listed_first() {
        let rows = json!([{
            "Name": "Copper",
            "Model": MISES,
            "Parameters": {
                COFFIN: {"YoungModulus": 1.1e11, "Alpha": 0.5},
                MISES: {"Strength": 250.0},
            },
        }]);
        let out = format_materials(&rows);
        assert_eq!(
            out,
            json!([{
                "Name": "Copper",
                "Models": [
                    {"Model": {"Name": MISES, "Parameters": [{"Strength": 250}]}},
                    {"Model": {"Name": COFFIN, "Parameters": [
                        {"YoungModulus": 110_000_000_000_i64},
                        {"Alpha": 0.5},
                    ]}},
                ],
            }])
        );
    }

    #[test]
    fn single_entry_uses_singular_key() {
        let rows = json!([{"Name": "FR4", "Parameters": {MISES: {"Strength": ""}, HILL: {}}}]);
        assert_eq!(
            format_materials(&rows),
            json!([{"Name": "FR4", "Model": {"Name": MISES, "Parameters": [{"Strength": ""}]}}])
        );
    }

    #[test]
    fn chosen_model_without_parameters_is_kept() {
        let rows = json!([{"Name": "Solder", "Model": HILL, "Parameters": {HILL: {}}}]);
        assert_eq!(
            format_materials(&rows),
            json!([{"Name": "Solder", "Model": {"Name": HILL, "Parameters": []}}])
        );
    }

    #[test]
    fn rows_without_models_only_keep_name() {
        let rows = json!([{"Name": "Bare"}, {"Name": ""}, "junk"]);
        assert_eq!(format_materials(&rows), json!([{"Name": "Bare"}, {}]));
    }

    #[test]
    fn prebuilt_rows_pass_through() {
        let rows = json!([
            {"Name": "A", "Model": {"Name": MISES, "Parameters": [{"Strength": 2.0}]}},
            {"Name": "B", "Models": [{"Model": {"Name": HILL, "Parameters": [{"Xc": true}]}}]},
        ]);
        assert_eq!(
            format_materials(&rows),
            json!([
                {"Name": "A", "Model": {"Name": MISES, "Parameters": [{"Strength": 2}]}},
                {"Name": "B", "Models": [{"Model": {"Name": HILL, "Parameters": [{"Xc": "true"}]}}]},
            ])
        );
    }

    #[test]
    fn non_list_rows_format_to_empty() {
        assert_eq!(format_materials(&Value::Null), json!([]));
    }
}
