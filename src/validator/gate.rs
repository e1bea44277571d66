use super::{Finding, has_fatal, validate};
use crate::error::ValidationError;
use crate::graph::EbdGraph;
use std::ops::Deref;
use tracing::warn;

/// A graph that passed validation without fatal findings.
///
/// Renderers only accept this type, so a graph with fatal findings cannot be rendered.
/// Warnings are kept for the caller, e.g. to show a banner for looping decision trees.
#[derive(Debug, Clone)]
pub struct Validated<'g> {
    graph: &'g EbdGraph,
    warnings: Vec<Finding>,
}

impl<'g> Validated<'g> {
    pub fn check(graph: &'g EbdGraph) -> Result<Self, ValidationError> {
        let findings = validate(graph);
        if has_fatal(&findings) {
            let fatal = findings.into_iter().filter(Finding::is_fatal).collect();
            return Err(ValidationError::Fatal(fatal));
        }
        let warnings = findings;
        for finding in &warnings {
            warn!(ebd = %graph.metadata().ebd_code, "{}", finding);
        }
        Ok(Self { graph, warnings })
    }

    pub fn graph(&self) -> &'g EbdGraph {
        self.graph
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }
}

impl Deref for Validated<'_> {
    type Target = EbdGraph;

    fn deref(&self) -> &Self::Target {
        self.graph
    }
}
