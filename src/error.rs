use crate::table::StepNumber;
use crate::validator::Finding;
use thiserror::Error;

/// Errors raised while reading table input or configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid step number '{0}': expected a positive integer with an optional '*' suffix")]
    InvalidStepNumber(String),

    #[error("Invalid end-code pattern '{pattern}': {message}")]
    InvalidEndCodePattern { pattern: String, message: String },

    #[error("Failed to parse table JSON: {0}")]
    JsonParseError(String),
}

/// Violations of the table invariants, reported by `EbdTable::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Step number '{0}' appears more than once")]
    DuplicateStepNumber(StepNumber),

    #[error("Step '{0}' has no outcomes")]
    NoOutcomes(StepNumber),

    #[error("Step '{0}' is a transition step and must not branch on outcome codes")]
    TransitionWithOutcomes(StepNumber),

    #[error("Step '{step}' terminates on outcome '{outcome}' with neither an end code nor a label")]
    EmptyTerminal { step: StepNumber, outcome: String },

    #[error("Step '{step}' uses outcome code '{code}', which is not part of the vocabulary")]
    UnknownOutcomeCode { step: StepNumber, code: String },

    #[error("Step '{step}' terminates with end code '{end_code}', which does not match the vocabulary")]
    InvalidEndCode { step: StepNumber, end_code: String },

    #[error("Step '{step}' continues at step '{target}' on outcome '{outcome}', but that step does not exist")]
    UnresolvedReference {
        step: StepNumber,
        outcome: String,
        target: StepNumber,
    },

    #[error("Step '{step}' declares a multi-result for outcome '{outcome}' with fewer than two resolutions")]
    DegenerateMultiResult { step: StepNumber, outcome: String },

    #[error("A multi-step instruction is anchored at step '{0}', which does not exist")]
    DanglingAnnotation(StepNumber),

    #[error("More than one multi-step instruction is anchored at step '{0}'")]
    DuplicateAnnotation(StepNumber),

    #[error("The multi-step instruction at step '{anchor}' ends at step '{until}', which precedes it or is not part of the table")]
    InvalidInstructionEnd { anchor: StepNumber, until: StepNumber },

    #[error("Row '{row}' could not be read: {message}")]
    InvalidRow { row: String, message: String },
}

/// Errors that abort the table-to-graph conversion. No partial graph is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Step number '{0}' appears more than once")]
    DuplicateStepNumber(StepNumber),

    #[error(
        "Step '{target}' not found, which is required by outcome '{outcome}' of step '{source_step}'"
    )]
    UnresolvedReference {
        source_step: StepNumber,
        outcome: String,
        target: StepNumber,
    },

    #[error("Multi-step instruction is anchored at step '{anchor}', which was not found in the table")]
    DanglingAnnotation { anchor: StepNumber },

    #[error("More than one multi-step instruction is anchored at step '{anchor}'")]
    DuplicateAnnotation { anchor: StepNumber },

    #[error("Table rejected before conversion: {0}")]
    InvalidTable(#[from] TableError),

    #[error("Failed to assemble graph: {0}")]
    Graph(#[from] GraphError),
}

/// Structural errors when assembling a graph from raw parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Edge #{edge} refers to node #{node}, but the graph only has {node_count} nodes")]
    EdgeOutOfBounds {
        edge: usize,
        node: usize,
        node_count: usize,
    },
}

/// Raised when a graph with fatal findings is handed to the render gate.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Graph has {} fatal finding(s), first: {}", .0.len(), first_finding(.0))]
    Fatal(Vec<Finding>),
}

impl ValidationError {
    pub fn findings(&self) -> &[Finding] {
        match self {
            ValidationError::Fatal(findings) => findings,
        }
    }
}

fn first_finding(findings: &[Finding]) -> String {
    findings
        .first()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "none".to_string())
}
