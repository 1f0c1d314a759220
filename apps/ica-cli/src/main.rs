use clap::{Parser, Subcommand};
use ica_app::{
    AppError, AppResult, ConfigCache, DEFAULT_OUTPUT_FILE, RunRequest, RunTarget, load_document,
    normalize_tool_path, resolve_document_path, resolve_output_path, restore_document, run_tool,
    save_session,
};
use ica_form::{FormSession, RunFileOutcome, RunFileReader, read_run_file};
use ica_schema::{FieldDef, FieldKind, RUN_FILE_FIELD, SOURCE_SECTION, Schema, section_title};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ica-cli")]
#[command(about = "IC Advanced Tool - solver input builder and launcher", long_about = None)]
struct Cli {
    /// Structure file (YAML or JSON) replacing the built-in one
    #[arg(long, global = true)]
    structure: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FormArgs {
    /// Solver whose form is filled
    solver: String,
    /// Field assignment `<section>.<field>=<value>`; may be repeated
    #[arg(long = "set", value_name = "ASSIGNMENT")]
    sets: Vec<String>,
    /// JSON file of section → field → value; a source RunFile in it refreshes
    /// the materials table
    #[arg(long)]
    values: Option<PathBuf>,
    /// Output document path; `.json` is appended when it has no extension
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available solvers
    Solvers,
    /// Show the sections and fields of a solver
    Schema {
        /// Solver name
        solver: String,
    },
    /// Fill a solver form and merge it into the output document
    Save {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Load a saved document into the form and print the values
    Load {
        /// Saved document
        #[arg(default_value = DEFAULT_OUTPUT_FILE)]
        input: String,
        /// Solver to prefer when the document holds several
        #[arg(long)]
        solver: Option<String>,
    },
    /// Save the form for a run target and start the analysis tool on it
    Run {
        #[command(flatten)]
        form: FormArgs,
        /// Run target: MappingTool, ThermalCycleCalc, DelamAlert or PressureOven
        #[arg(long)]
        target: String,
        /// Analysis tool executable; defaults to the cached path
        #[arg(long)]
        tool: Option<String>,
    },
    /// List the materials declared in a run file
    Materials {
        /// Path to the .run file
        run_file: PathBuf,
    },
    /// Show or change the cached analysis tool path
    ToolPath {
        /// New path; an empty value clears it
        #[arg(long)]
        set: Option<String>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let working_dir = std::env::current_dir()?;
    let schema = match &cli.structure {
        Some(path) => Schema::from_path(path)?,
        None => Schema::builtin()?,
    };
    tracing::debug!(solvers = schema.solver_names().len(), "structure loaded");

    match cli.command {
        Commands::Solvers => cmd_solvers(&schema),
        Commands::Schema { solver } => cmd_schema(&schema, &solver),
        Commands::Save { form } => cmd_save(schema, &form, &working_dir),
        Commands::Load { input, solver } => cmd_load(schema, &input, solver.as_deref(), &working_dir),
        Commands::Run { form, target, tool } => {
            cmd_run(schema, &form, &target, tool.as_deref(), &working_dir)
        }
        Commands::Materials { run_file } => cmd_materials(&run_file),
        Commands::ToolPath { set } => cmd_tool_path(set.as_deref(), &working_dir),
    }
}

fn cmd_solvers(schema: &Schema) -> AppResult<()> {
    for name in schema.solver_names() {
        if schema.solver(name).is_some() {
            println!("{name}");
        } else {
            println!("{name} (no fields defined)");
        }
    }
    Ok(())
}

fn cmd_schema(schema: &Schema, solver: &str) -> AppResult<()> {
    let sections = schema.sections(solver);
    if sections.is_empty() {
        println!("{solver} has no fields defined");
        return Ok(());
    }
    for section in sections {
        println!("{}", section_title(&section.name));
        for field in &section.fields {
            print_field(field, 1);
        }
    }
    Ok(())
}

fn print_field(field: &FieldDef, depth: usize) {
    let indent = "  ".repeat(depth);
    match &field.kind {
        FieldKind::Text => println!("{indent}{}: text", field.name),
        FieldKind::Number => println!("{indent}{}: number", field.name),
        FieldKind::Path(options) => println!("{indent}{}: path ({})", field.name, options.caption),
        FieldKind::Choice { options } => {
            println!("{indent}{}: one of [{}]", field.name, options.join(", "))
        }
        FieldKind::Group { fields } => {
            println!("{indent}{}:", field.name);
            for sub in fields {
                print_field(sub, depth + 1);
            }
        }
        FieldKind::Table { columns } => {
            let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            println!("{indent}{}: table [{}]", field.name, names.join(", "));
        }
        FieldKind::Materials(def) => {
            println!("{indent}{}: materials", field.name);
            for group in &def.parameter_groups {
                let names: Vec<&str> = group.fields.iter().map(|f| f.name.as_str()).collect();
                println!("{indent}  {}: [{}]", group.model, names.join(", "));
            }
        }
    }
}

/// Split `<section>.<field>=<value>`. The value is parsed as JSON when it is
/// an array or object, otherwise taken verbatim.
fn parse_assignment(text: &str) -> Option<(String, String, Value)> {
    let (target, raw) = text.split_once('=')?;
    let (section, field) = target.split_once('.')?;
    let trimmed = raw.trim_start();
    let value = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(raw.to_string()))
    } else {
        Value::String(raw.to_string())
    };
    Some((section.trim().to_string(), field.trim().to_string(), value))
}

fn read_values_file(path: &Path) -> AppResult<Map<String, Value>> {
    match load_document(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::DocumentRead {
            path: path.to_path_buf(),
            reason: "expected an object of sections".to_string(),
        }),
    }
}

fn fill_session(schema: Schema, form: &FormArgs) -> AppResult<FormSession> {
    let mut session = FormSession::new(schema);
    session.select_solver(&form.solver);

    if let Some(path) = &form.values {
        let sections = read_values_file(path)?;
        session.store_mut()?.apply(&sections);

        let has_run_file = sections
            .get(SOURCE_SECTION)
            .and_then(Value::as_object)
            .is_some_and(|fields| {
                fields.keys().any(|key| key.eq_ignore_ascii_case(RUN_FILE_FIELD))
            });
        if has_run_file && session.store()?.field(SOURCE_SECTION, RUN_FILE_FIELD).is_ok() {
            let commit = session.commit_path(SOURCE_SECTION, RUN_FILE_FIELD, &RunFileReader)?;
            report_run_file(commit.run_file);
        }
    }

    for assignment in &form.sets {
        let Some((section, field, value)) = parse_assignment(assignment) else {
            eprintln!("Ignoring malformed assignment '{assignment}'");
            continue;
        };
        session.set_value(&section, &field, &value)?;

        if section.eq_ignore_ascii_case(SOURCE_SECTION) && field == RUN_FILE_FIELD {
            let commit = session.commit_path(&section, &field, &RunFileReader)?;
            report_run_file(commit.run_file);
        }
    }
    Ok(session)
}

fn report_run_file(outcome: Option<RunFileOutcome>) {
    match outcome {
        Some(RunFileOutcome::Populated(names)) => {
            println!("Materials from run file: {}", names.join(", "));
        }
        Some(RunFileOutcome::Failed {
            path,
            message,
            report: true,
        }) => {
            eprintln!("Unable to read materials from '{path}':\n{message}");
        }
        _ => {}
    }
}

fn cmd_save(schema: Schema, form: &FormArgs, working_dir: &Path) -> AppResult<()> {
    let output = resolve_output_path(&form.output, working_dir)?;
    let session = fill_session(schema, form)?;
    save_session(&session, &output, None)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

fn cmd_load(
    schema: Schema,
    input: &str,
    solver: Option<&str>,
    working_dir: &Path,
) -> AppResult<()> {
    let path = resolve_document_path(input, working_dir)?;
    let mut session = FormSession::new(schema);
    if let Some(solver) = solver {
        session.select_solver(solver);
    }
    let solver = restore_document(&mut session, &path)?;
    let (_, values) = session.collect()?;

    println!("Parameters for {solver} updated from '{}'", path.display());
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

fn cmd_run(
    schema: Schema,
    form: &FormArgs,
    target: &str,
    tool: Option<&str>,
    working_dir: &Path,
) -> AppResult<()> {
    if RunTarget::from_name(target).is_none() {
        let known: Vec<&str> = RunTarget::ALL.iter().map(|t| t.name()).collect();
        eprintln!("Known run targets: {}", known.join(", "));
    }

    let cache = ConfigCache::in_dir(working_dir);
    let tool_path = match tool {
        Some(path) => {
            let path = normalize_tool_path(path);
            cache.save_tool_path(&path);
            path
        }
        None => cache.load_tool_path(),
    };
    let output = resolve_output_path(&form.output, working_dir)?;
    let session = fill_session(schema, form)?;

    let request = RunRequest {
        target,
        tool_path: &tool_path,
        output_path: &output,
        working_dir,
    };
    let response = run_tool(&session, &request)?;
    println!("{}", response.command);
    println!("{}", response.message);
    if let Some(warnings) = response.warnings {
        println!("\nWarnings:\n{warnings}");
    }
    Ok(())
}

fn cmd_materials(run_file: &Path) -> AppResult<()> {
    for name in read_run_file(run_file)? {
        println!("{name}");
    }
    Ok(())
}

fn cmd_tool_path(set: Option<&str>, working_dir: &Path) -> AppResult<()> {
    let cache = ConfigCache::in_dir(working_dir);
    if let Some(path) = set {
        cache.save_tool_path(&normalize_tool_path(path));
    }
    let current = cache.load_tool_path();
    if current.is_empty() {
        println!("No analysis tool path cached");
    } else {
        println!("{current}");
    }
    Ok(())
}
