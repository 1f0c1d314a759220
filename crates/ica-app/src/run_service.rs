//! External analysis tool invocation.

use crate::document_service::save_values;
use crate::error::{AppError, AppResult};
use ica_core::expand_home;
use ica_form::{FormSession, PathControl};
use ica_schema::{DialogMode, PathMode, PathOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Solvers the external tool can run, with their command-line codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    MappingTool,
    ThermalCycleCalc,
    DelamAlert,
    PressureOven,
}

impl RunTarget {
    pub const ALL: [RunTarget; 4] = [
        RunTarget::MappingTool,
        RunTarget::ThermalCycleCalc,
        RunTarget::DelamAlert,
        RunTarget::PressureOven,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|target| target.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            RunTarget::MappingTool => "MappingTool",
            RunTarget::ThermalCycleCalc => "ThermalCycleCalc",
            RunTarget::DelamAlert => "DelamAlert",
            RunTarget::PressureOven => "PressureOven",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            RunTarget::MappingTool => "mt",
            RunTarget::ThermalCycleCalc => "tc",
            RunTarget::DelamAlert => "da",
            RunTarget::PressureOven => "po",
        }
    }
}

/// Request to run the tool against the current form.
pub struct RunRequest<'a> {
    pub target: &'a str,
    pub tool_path: &'a str,
    pub output_path: &'a Path,
    pub working_dir: &'a Path,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub command: String,
    pub output_path: PathBuf,
    pub message: String,
    /// Trimmed stderr of a successful run, if any.
    pub warnings: Option<String>,
}

/// Path entry for the analysis tool executable. The platform's executable
/// extension, if it has one, is appended when missing.
pub fn tool_path_control() -> PathControl {
    PathControl::new(PathOptions {
        mode: PathMode::File,
        dialog: DialogMode::Open,
        caption: "Select analysis tool".to_string(),
        filter: "Executables (*)".to_string(),
        default_suffix: Some(std::env::consts::EXE_EXTENSION.to_string()),
    })
}

/// Commit tool path text the way the tool entry does.
pub fn normalize_tool_path(text: &str) -> String {
    let mut control = tool_path_control();
    control.write(&Value::String(text.to_string()));
    control.commit()
}

/// Validate the executable path text; relative paths resolve against
/// `working_dir`.
pub fn resolve_executable(text: &str, working_dir: &Path) -> AppResult<PathBuf> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::MissingExecutable);
    }
    let mut path = PathBuf::from(expand_home(text));
    if !path.is_absolute() {
        path = working_dir.join(path);
    }
    if !path.exists() {
        return Err(AppError::ExecutableNotFound { path });
    }
    if path.is_dir() {
        return Err(AppError::ExecutableIsDirectory { path });
    }
    Ok(path)
}

/// Save the form formatted for the run target, then run the tool on it and
/// wait for it to finish.
pub fn run_tool(session: &FormSession, request: &RunRequest) -> AppResult<RunResponse> {
    let (_, values) = session.collect()?;

    let target = RunTarget::from_name(request.target).ok_or_else(|| AppError::InvalidRunTarget {
        target: request.target.to_string(),
    })?;
    let tool = resolve_executable(request.tool_path, request.working_dir)?;

    save_values(target.name(), &values, request.output_path)?;

    let parts = vec![
        tool.to_string_lossy().into_owned(),
        "--solver".to_string(),
        target.code().to_string(),
        "-i".to_string(),
        request.output_path.to_string_lossy().into_owned(),
    ];
    let command = format_command(&parts);
    tracing::debug!(%command, "starting analysis tool");

    let output = Command::new(&tool)
        .args(&parts[1..])
        .output()
        .map_err(|e| AppError::ToolStart {
            command: command.clone(),
            source: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        let details = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            match output.status.code() {
                Some(code) => format!("Process exited with code {code}."),
                None => "Process was terminated by a signal.".to_string(),
            }
        };
        return Err(AppError::ToolFailed { command, details });
    }

    let message = if stdout.is_empty() {
        "Analysis tool finished successfully.".to_string()
    } else {
        stdout
    };
    Ok(RunResponse {
        command,
        output_path: request.output_path.to_path_buf(),
        message,
        warnings: (!stderr.is_empty()).then_some(stderr),
    })
}

/// Render a command line for display, quoted for the host shell.
pub fn format_command(parts: &[String]) -> String {
    let quote: fn(&str) -> String = if cfg!(windows) { quote_windows } else { quote_posix };
    parts
        .iter()
        .map(|part| quote(part))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_posix(part: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);
    if !part.is_empty() && part.chars().all(safe) {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r#"'"'"'"#))
    }
}

fn quote_windows(part: &str) -> String {
    if !part.is_empty() && !part.contains([' ', '\t', '"']) {
        return part.to_string();
    }
    let mut quoted = String::from("\"");
    let mut backslashes = 0;
    for c in part.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.push_str(&"\\".repeat(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.push_str(&"\\".repeat(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.push_str(&"\\".repeat(backslashes * 2));
    quoted.push('"');
    quoted
}
