//! Known solvers and their document keys.

use ica_schema::{MAPPING_TOOL, PRESSURE_OVEN, RELIABILITY_TOOLS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverKind {
    MappingTool,
    ReliabilityTools,
    PressureOven,
    Other(String),
}

impl SolverKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            MAPPING_TOOL => SolverKind::MappingTool,
            RELIABILITY_TOOLS => SolverKind::ReliabilityTools,
            PRESSURE_OVEN => SolverKind::PressureOven,
            other => SolverKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SolverKind::MappingTool => MAPPING_TOOL,
            SolverKind::ReliabilityTools => RELIABILITY_TOOLS,
            SolverKind::PressureOven => PRESSURE_OVEN,
            SolverKind::Other(name) => name,
        }
    }

    /// Top-level key of the formatted document.
    pub fn output_key(&self) -> &str {
        match self {
            SolverKind::MappingTool => "Maptools",
            SolverKind::ReliabilityTools => RELIABILITY_TOOLS,
            SolverKind::PressureOven => PRESSURE_OVEN,
            SolverKind::Other(name) if name.is_empty() => "Solver",
            SolverKind::Other(name) => name,
        }
    }

    /// Document keys recognised as this solver when loading.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SolverKind::MappingTool => &["MappingTool", "Maptools"],
            SolverKind::ReliabilityTools => &["ReliabilityTools"],
            SolverKind::PressureOven => &["PressureOven"],
            SolverKind::Other(_) => &[],
        }
    }

    /// Solver whose alias matches `key`, ignoring case.
    pub fn from_alias(key: &str) -> Option<Self> {
        [
            SolverKind::MappingTool,
            SolverKind::ReliabilityTools,
            SolverKind::PressureOven,
        ]
        .into_iter()
        .find(|kind| kind.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(key)))
    }
}
