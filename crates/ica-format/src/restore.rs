//! Saved document → form sections.

use crate::payload::{RAMP_INCREMENT, RAMP_TIME};
use crate::solver::SolverKind;
use ica_core::{SectionValues, case_insensitive_get};
use ica_schema::{PRESSURE_OVEN, Schema};
use serde_json::{Map, Value};

/// Find the solver a document was saved for.
///
/// Candidates are the current solver followed by `solvers`, each tried
/// against its document aliases. A document with a single object entry
/// is attributed to that entry's solver, or to the current one.
pub fn select_solver_payload(
    document: &Value,
    current: Option<&str>,
    solvers: &[String],
) -> Option<(String, Map<String, Value>)> {
    let Value::Object(document) = document else {
        return None;
    };
    let current = current.filter(|name| !name.is_empty());

    let mut candidates: Vec<&str> = Vec::new();
    for name in current.into_iter().chain(solvers.iter().map(String::as_str)) {
        if !name.is_empty() && !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    for name in candidates {
        for alias in SolverKind::from_name(name).aliases() {
            if let Some(Value::Object(payload)) = case_insensitive_get(document, alias) {
                tracing::debug!(solver = name, alias, "document matched solver alias");
                return Some((name.to_string(), payload.clone()));
            }
        }
    }

    let mut objects = document.iter().filter_map(|(key, value)| match value {
        Value::Object(payload) => Some((key, payload)),
        _ => None,
    });
    let (key, payload) = objects.next()?;
    if objects.next().is_some() {
        return None;
    }
    let solver = match SolverKind::from_alias(key) {
        Some(kind) => kind.name().to_string(),
        None => current?.to_string(),
    };
    tracing::debug!(%solver, key = key.as_str(), "solver inferred from single entry");
    Some((solver, payload.clone()))
}

/// Split a solver payload back into the solver's form sections.
pub fn prepare_section_values(
    schema: &Schema,
    solver: &str,
    payload: &Map<String, Value>,
) -> SectionValues {
    if solver == PRESSURE_OVEN {
        return prepare_pressure_oven(payload);
    }

    let mut sections = SectionValues::new();
    for section in schema.sections(solver) {
        if let Some(Value::Object(fields)) = case_insensitive_get(payload, &section.name) {
            sections.insert(section.name.clone(), Value::Object(fields.clone()));
        }
    }
    sections
}

fn object_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    }
}

fn prepare_pressure_oven(payload: &Map<String, Value>) -> SectionValues {
    let text = |key: &str| {
        payload
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    };

    let mut general = Map::new();
    general.insert("OutputFolder".to_string(), text("OutputFolder"));
    general.insert(
        "Void shape (Cylindrical/Spherical)".to_string(),
        text("Void shape (Cylindrical/Spherical)"),
    );

    let mut ramp = Map::new();
    ramp.insert(
        "Pressure Ramp Profile".to_string(),
        Value::Array(ramp_rows(payload.get("PressureRampProfile"))),
    );

    let mut sections = SectionValues::new();
    sections.insert("general".to_string(), Value::Object(general));
    sections.insert(
        "material properties".to_string(),
        object_or_empty(payload.get("MaterialProperties")),
    );
    sections.insert(
        "process conditions".to_string(),
        object_or_empty(payload.get("ProcessConditions")),
    );
    sections.insert("pressure ramp profile".to_string(), Value::Object(ramp));
    sections
}

/// Zip the two ramp sequences back into rows, stopping at the shorter one.
fn ramp_rows(profile: Option<&Value>) -> Vec<Value> {
    let Some(Value::Object(profile)) = profile else {
        return Vec::new();
    };
    sequence(profile, RAMP_INCREMENT)
        .iter()
        .zip(sequence(profile, RAMP_TIME))
        .map(|(increment, time_mark)| {
            let mut row = Map::new();
            row.insert(RAMP_INCREMENT.to_string(), increment.clone());
            row.insert(RAMP_TIME.to_string(), time_mark.clone());
            Value::Object(row)
        })
        .collect()
}

fn sequence<'a>(profile: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match profile.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}
