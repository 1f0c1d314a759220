use ica_form::FormSession;
use ica_format::*;
use ica_schema::Schema;
use proptest::prelude::*;
use serde_json::{Value, json};

fn session_for(solver: &str) -> FormSession {
    let mut session = FormSession::new(Schema::builtin().unwrap());
    session.select_solver(solver);
    session
}

#[test]
fn untouched_pressure_oven_form_keeps_only_defaults() {
    let session = session_for("PressureOven");
    let (solver, values) = session.collect().unwrap();
    let payload = format_solver_payload(&solver, &values).unwrap();
    assert_eq!(
        Value::Object(payload),
        json!({"PressureOven": {"Void shape (Cylindrical/Spherical)": "Cylindrical"}})
    );
}

#[test]
fn pressure_oven_survives_save_and_restore() {
    let mut session = session_for("PressureOven");
    session
        .set_value("general", "Void shape (Cylindrical/Spherical)", &json!("Spherical"))
        .unwrap();
    session
        .set_value("process conditions", "Process time (s)", &json!("3600"))
        .unwrap();
    session
        .set_value(
            "pressure ramp profile",
            "Pressure Ramp Profile",
            &json!([
                {"Pressure increment (Pa)": "100", "Time mark (s)": "10"},
                {"Pressure increment (Pa)": "", "Time mark (s)": "20"},
            ]),
        )
        .unwrap();
    let (solver, values) = session.collect().unwrap();
    let payload = format_solver_payload(&solver, &values).unwrap();
    let document = Value::Object(payload.clone());
    assert_eq!(
        document["PressureOven"]["PressureRampProfile"],
        json!({"Pressure increment (Pa)": [100], "Time mark (s)": [10]})
    );

    let schema = Schema::builtin().unwrap();
    let (found, solver_payload) =
        select_solver_payload(&document, None, schema.solver_names()).unwrap();
    assert_eq!(found, "PressureOven");
    let sections = prepare_section_values(&schema, &found, &solver_payload);

    let mut restored = session_for("MappingTool");
    restored.load(&found, &sections);
    let (_, values) = restored.collect().unwrap();
    let again = format_solver_payload(&found, &values).unwrap();
    assert_eq!(again, payload);
}

#[test]
fn mapping_tool_document_loads_under_its_alias() {
    let mut session = session_for("MappingTool");
    session
        .set_value("configuration", "MappingMode", &json!("Flatten"))
        .unwrap();
    session
        .set_value("target", "ProjectName", &json!("Board"))
        .unwrap();
    let (solver, values) = session.collect().unwrap();
    let document = Value::Object(format_solver_payload(&solver, &values).unwrap());
    assert!(document.get("Maptools").is_some());

    let schema = Schema::builtin().unwrap();
    let (found, payload) =
        select_solver_payload(&document, Some("PressureOven"), schema.solver_names()).unwrap();
    assert_eq!(found, "MappingTool");
    let sections = prepare_section_values(&schema, &found, &payload);
    assert_eq!(sections["target"]["ProjectName"], json!("Board"));
    assert_eq!(sections["configuration"]["MappingMode"], json!("Flatten"));
}

#[test]
fn reliability_document_carries_materials_and_metadata() {
    let mut session = session_for("ReliabilityTools");
    session
        .set_value("source", "RunFile", &json!("/work/Proj/Analysis/Run12/proj12.run"))
        .unwrap();
    session
        .set_value(
            "source",
            "Materials",
            &json!([{
                "Name": "SAC305",
                "Model": {
                    "Name": "FatigueModel: Modified Coffin Manson",
                    "Parameters": {"Alpha": 0.5, "m": 2},
                },
            }]),
        )
        .unwrap();
    let (solver, values) = session.collect().unwrap();
    let document = Value::Object(format_solver_payload(&solver, &values).unwrap());
    let source = &document["ReliabilityTools"]["Source"];
    assert_eq!(source["RunName"], json!("12"));
    assert_eq!(source["ProjectName"], json!("proj"));
    assert_eq!(source["ProjectFolder"], json!("/work/Proj"));
    assert_eq!(source["Materials"][0]["Name"], json!("SAC305"));
    assert_eq!(
        source["Materials"][0]["Model"],
        json!({
            "Name": "FatigueModel: Modified Coffin Manson",
            "Parameters": [{"Alpha": 0.5}, {"m": 2}],
        })
    );
}

proptest! {
    #[test]
    fn every_solver_yields_one_top_level_key(
        index in 0usize..3,
        text in "[A-Za-z0-9 ]{0,12}",
        number in -1.0e6f64..1.0e6,
    ) {
        let names = ["MappingTool", "PressureOven", "ReliabilityTools"];
        let solver = names[index];
        let mut session = session_for(solver);
        match solver {
            "MappingTool" => {
                session.set_value("target", "RunName", &json!(text)).unwrap();
            }
            "PressureOven" => {
                session
                    .set_value("process conditions", "Initial pressure (Pa)", &json!(number))
                    .unwrap();
            }
            _ => {
                session
                    .set_value("source", "RunFile", &json!("/p/analysis/r1/p1.run"))
                    .unwrap();
            }
        }
        let (solver, values) = session.collect().unwrap();
        let payload = format_solver_payload(&solver, &values).unwrap();
        let expected = SolverKind::from_name(&solver).output_key().to_string();
        prop_assert_eq!(payload.keys().cloned().collect::<Vec<_>>(), vec![expected]);
    }
}
