//! Per-solver payload formatting.

use crate::materials::format_materials;
use crate::run_metadata::derive_run_metadata;
use crate::solver::SolverKind;
use crate::FormatResult;
use ica_core::{SectionValues, capitalize, is_blank, stringify_value, value_text};
use ica_schema::{MATERIALS_FIELD, RUN_FILE_FIELD, SOURCE_SECTION};
use serde_json::{Map, Value};

/// A formatted document: `{output key: {...}}`.
pub type Payload = Map<String, Value>;

pub const RAMP_INCREMENT: &str = "Pressure increment (Pa)";
pub const RAMP_TIME: &str = "Time mark (s)";

/// Format `parameters` for `solver`. Only the run-file derivation of the
/// reliability source section can fail.
pub fn format_solver_payload(solver: &str, parameters: &SectionValues) -> FormatResult<Payload> {
    let kind = SolverKind::from_name(solver);
    let body = match &kind {
        SolverKind::MappingTool => format_mapping_tool(parameters),
        SolverKind::ReliabilityTools => format_reliability_tools(parameters)?,
        SolverKind::PressureOven => format_pressure_oven(parameters),
        SolverKind::Other(_) => format_sections(parameters),
    };
    tracing::debug!(solver, key = kind.output_key(), "payload formatted");

    let mut payload = Map::new();
    payload.insert(kind.output_key().to_string(), Value::Object(body));
    Ok(payload)
}

/// Every section under its capitalised name, values stringified.
fn format_sections(parameters: &SectionValues) -> Map<String, Value> {
    parameters
        .iter()
        .map(|(section, fields)| (capitalize(section), stringify_value(fields)))
        .collect()
}

pub fn format_mapping_tool(parameters: &SectionValues) -> Map<String, Value> {
    format_sections(parameters)
}

pub fn format_reliability_tools(parameters: &SectionValues) -> FormatResult<Map<String, Value>> {
    let mut formatted = Map::new();
    for (section, fields) in parameters {
        let value = match fields {
            Value::Object(fields) if section.eq_ignore_ascii_case(SOURCE_SECTION) => {
                Value::Object(format_reliability_source(fields)?)
            }
            _ => stringify_value(fields),
        };
        formatted.insert(capitalize(section), value);
    }
    Ok(formatted)
}

/// Source section: derived run metadata first, then the section's own fields.
pub fn format_reliability_source(fields: &Map<String, Value>) -> FormatResult<Map<String, Value>> {
    let run_file = fields
        .get(RUN_FILE_FIELD)
        .map(value_text)
        .unwrap_or_default();
    let mut formatted = derive_run_metadata(&run_file)?.into_map();

    for (name, value) in fields {
        if name == MATERIALS_FIELD {
            formatted.insert(name.clone(), format_materials(value));
        } else if name == RUN_FILE_FIELD {
            formatted
                .entry(name.clone())
                .or_insert_with(|| stringify_value(value));
        } else {
            formatted.insert(name.clone(), stringify_value(value));
        }
    }
    Ok(formatted)
}

fn section<'a>(parameters: &'a SectionValues, name: &str) -> Option<&'a Map<String, Value>> {
    parameters.get(name).and_then(Value::as_object)
}

fn specified(fields: Option<&Map<String, Value>>) -> Map<String, Value> {
    fields
        .into_iter()
        .flatten()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| (key.clone(), stringify_value(value)))
        .collect()
}

/// Flat pressure-oven document. Unset values are left out entirely, as are
/// groups with nothing set.
pub fn format_pressure_oven(parameters: &SectionValues) -> Map<String, Value> {
    let general = section(parameters, "general");
    let mut payload = Map::new();

    for key in ["OutputFolder", "Void shape (Cylindrical/Spherical)"] {
        if let Some(value) = general.and_then(|g| g.get(key)).filter(|v| !is_blank(v)) {
            payload.insert(key.to_string(), stringify_value(value));
        }
    }

    let material_properties = specified(section(parameters, "material properties"));
    if !material_properties.is_empty() {
        payload.insert(
            "MaterialProperties".to_string(),
            Value::Object(material_properties),
        );
    }

    let process_conditions = specified(section(parameters, "process conditions"));
    if !process_conditions.is_empty() {
        payload.insert(
            "ProcessConditions".to_string(),
            Value::Object(process_conditions),
        );
    }

    let ramp_rows = section(parameters, "pressure ramp profile")
        .and_then(|s| s.get("Pressure Ramp Profile"))
        .unwrap_or(&Value::Null);
    if let Some(profile) = format_pressure_ramp_profile(ramp_rows) {
        payload.insert("PressureRampProfile".to_string(), Value::Object(profile));
    }

    payload
}

/// Two parallel sequences from the ramp rows. Rows missing either value are
/// dropped from both; no complete row means no profile.
pub fn format_pressure_ramp_profile(rows: &Value) -> Option<Map<String, Value>> {
    let Value::Array(rows) = rows else {
        return None;
    };

    let mut increments = Vec::new();
    let mut time_marks = Vec::new();
    for row in rows {
        let Value::Object(row) = row else {
            continue;
        };
        let increment = row.get(RAMP_INCREMENT).filter(|v| !is_blank(v));
        let time_mark = row.get(RAMP_TIME).filter(|v| !is_blank(v));
        if let (Some(increment), Some(time_mark)) = (increment, time_mark) {
            increments.push(stringify_value(increment));
            time_marks.push(stringify_value(time_mark));
        }
    }

    if increments.is_empty() {
        return None;
    }
    let mut profile = Map::new();
    profile.insert(RAMP_INCREMENT.to_string(), Value::Array(increments));
    profile.insert(RAMP_TIME.to_string(), Value::Array(time_marks));
    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections(value: Value) -> SectionValues {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn ramp_profile_drops_incomplete_rows() {
        let rows = json!([
            {RAMP_INCREMENT: 10, RAMP_TIME: 1},
            {RAMP_INCREMENT: "", RAMP_TIME: 2},
            {RAMP_INCREMENT: 20, RAMP_TIME: 3},
        ]);
        assert_eq!(
            Value::Object(format_pressure_ramp_profile(&rows).unwrap()),
            json!({RAMP_INCREMENT: [10, 20], RAMP_TIME: [1, 3]})
        );
    }

    #[test]
    fn ramp_profile_without_complete_rows_is_absent() {
        assert!(format_pressure_ramp_profile(&json!([{RAMP_TIME: 2}])).is_none());
        assert!(format_pressure_ramp_profile(&json!([])).is_none());
        assert!(format_pressure_ramp_profile(&Value::Null).is_none());
    }

    #[test]
    fn pressure_oven_is_sparse() {
        let params = sections(json!({
            "general": {"OutputFolder": "", "Void shape (Cylindrical/Spherical)": "Spherical"},
            "material properties": {"Henry's coef. (mol N^-1 m^-1)": "", "Surface tension coef. (N m^-1)": 0.07},
            "process conditions": {"Working temperature (K)": ""},
            "pressure ramp profile": {"Pressure Ramp Profile": []},
        }));
        let payload = format_solver_payload("PressureOven", &params).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"PressureOven": {
                "Void shape (Cylindrical/Spherical)": "Spherical",
                "MaterialProperties": {"Surface tension coef. (N m^-1)": 0.07},
            }})
        );
    }

    #[test]
    fn pressure_oven_keeps_zero() {
        let params = sections(json!({"process conditions": {"Process time (s)": 0}}));
        let out = format_pressure_oven(&params);
        assert_eq!(out["ProcessConditions"], json!({"Process time (s)": 0}));
    }

    #[test]
    fn mapping_tool_nests_under_capitalised_sections() {
        let params = sections(json!({
            "source": {"MeshDirectory": "/m", "RunFolderPath": ""},
            "configuration": {"MappingMode": "Flatten"},
        }));
        let payload = format_solver_payload("MappingTool", &params).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"Maptools": {
                "Source": {"MeshDirectory": "/m", "RunFolderPath": ""},
                "Configuration": {"MappingMode": "Flatten"},
            }})
        );
    }

    #[test]
    fn unknown_solver_uses_its_own_name() {
        let params = sections(json!({"general": {"Flag": true, "Count": 2.0}}));
        let payload = format_solver_payload("DelamAlert", &params).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"DelamAlert": {"General": {"Flag": "true", "Count": 2}}})
        );
    }

    #[test]
    fn reliability_source_derives_metadata() {
        let params = sections(json!({
            "source": {
                "RunFile": " /proj/analysis/run_07/case3.run ",
                "Materials": [{"Name": "Copper"}],
            },
        }));
        let payload = format_solver_payload("ReliabilityTools", &params).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"ReliabilityTools": {"Source": {
                "RunFile": "/proj/analysis/run_07/case3.run",
                "RunName": "07",
                "ProjectName": "case",
                "ProjectFolder": "/proj",
                "Materials": [{"Name": "Copper"}],
            }}})
        );
    }

    #[test]
    fn reliability_without_run_file_fails() {
        let params = sections(json!({"source": {"RunFile": "", "Materials": []}}));
        assert!(format_solver_payload("ReliabilityTools", &params).is_err());
    }
}
