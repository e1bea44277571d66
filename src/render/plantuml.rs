//! PlantUML renderer.
//!
//! Uses only the generic `rectangle` and arrow grammar, so loops back to earlier steps are
//! expressible. Styling is left to PlantUML defaults; annotations become notes beside
//! their anchor step.

use super::style::PlantUmlStyle;
use super::text::wrap;
use super::{DiagramRenderer, Dialect, edge_order, node_order};
use crate::graph::{EbdGraph, EdgeKind, Node, NodeIndex};
use crate::validator::Validated;
use std::fmt::Write;
use tracing::debug;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Default)]
pub struct PlantUmlRenderer {
    style: PlantUmlStyle,
}

impl PlantUmlRenderer {
    pub fn new(style: PlantUmlStyle) -> Self {
        Self { style }
    }

    fn label(&self, graph: &EbdGraph, index: NodeIndex) -> String {
        let width = self.style.wrap_width;
        let lines = match graph.node(index) {
            Node::Start => vec![graph.metadata().ebd_code.clone()],
            Node::Decision(decision) => step_lines(
                &decision.step_number.to_string(),
                &decision.description,
                decision.note.as_deref(),
                width,
            ),
            Node::Transition(transition) => step_lines(
                &transition.step_number.to_string(),
                &transition.description,
                transition.note.as_deref(),
                width,
            ),
            Node::Outcome(outcome) => {
                let mut lines: Vec<String> = outcome.end_code.iter().cloned().collect();
                if !outcome.label.is_empty() {
                    lines.extend(wrap(&outcome.label, width));
                }
                lines
            }
            Node::End => vec!["Ende".to_string()],
            Node::Empty => {
                let metadata = graph.metadata();
                let mut lines = vec![metadata.ebd_code.clone()];
                if let Some(remark) = metadata.remark.as_deref().filter(|r| !r.is_empty()) {
                    lines.extend(wrap(remark, width));
                }
                lines
            }
            Node::Annotation(annotation) => wrap(&annotation.text, width),
        };
        lines
            .iter()
            .flat_map(|line| line.lines())
            .map(|line| line.replace('\\', "\\\\").replace('"', "'"))
            .collect::<Vec<_>>()
            .join("\\n")
    }
}

fn step_lines(step: &str, description: &str, note: Option<&str>, width: usize) -> Vec<String> {
    let mut lines = wrap(&format!("{}: {}", step, description), width);
    if let Some(note) = note.filter(|n| !n.is_empty()) {
        lines.extend(wrap(note, width));
    }
    lines
}

/// PlantUML aliases must be plain identifiers. Outcomes without an end code are keyed by
/// free text, so they are addressed by arena position instead.
fn alias(graph: &EbdGraph, index: NodeIndex) -> String {
    let key = graph.key(index);
    let raw = match graph.node(index) {
        Node::Start => return "start".to_string(),
        Node::End => return "ende".to_string(),
        Node::Empty => return "empty".to_string(),
        Node::Decision(_) | Node::Transition(_) => format!("step_{}", key.replace('*', "_star")),
        Node::Outcome(outcome) if outcome.end_code.is_none() => format!("note_{}", index.index()),
        Node::Outcome(_) => format!("outcome_{}", key),
        Node::Annotation(_) => key.to_string(),
    };
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl DiagramRenderer for PlantUmlRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::PlantUml
    }

    fn render(&self, graph: &Validated<'_>) -> String {
        let graph = graph.graph();
        let order = node_order(graph);
        let metadata = graph.metadata();
        let mut out = String::from("@startuml\n");

        if metadata.ebd_name.is_empty() {
            let _ = writeln!(out, "title {}", metadata.ebd_code);
        } else {
            let _ = writeln!(out, "title {}: {}", metadata.ebd_code, metadata.ebd_name);
        }
        out.push('\n');

        for &index in &order {
            if graph.node(index).as_annotation().is_some() {
                continue;
            }
            let _ = writeln!(
                out,
                "rectangle \"{}\" as {}",
                self.label(graph, index),
                alias(graph, index)
            );
        }
        out.push('\n');

        for edge in edge_order(graph, &order) {
            let source = alias(graph, edge.source);
            let target = alias(graph, edge.target);
            match &edge.kind {
                EdgeKind::Start | EdgeKind::Transition => {
                    let _ = writeln!(out, "{source} --> {target}");
                }
                EdgeKind::Outcome(code) => {
                    let _ = writeln!(out, "{source} --> {target} : {code}");
                }
                EdgeKind::Annotates => {}
            }
        }

        if self.style.include_annotations {
            for &index in &order {
                let Some(annotation) = graph.node(index).as_annotation() else {
                    continue;
                };
                for anchor in graph.successors(index) {
                    out.push('\n');
                    let _ = writeln!(out, "note right of {}", alias(graph, anchor));
                    for part in wrap(&annotation.text, self.style.wrap_width) {
                        for line in part.lines() {
                            let _ = writeln!(out, "{INDENT}{line}");
                        }
                    }
                    out.push_str("end note\n");
                }
            }
        }

        out.push_str("@enduml\n");
        debug!(ebd = %metadata.ebd_code, nodes = graph.node_count(), "rendered plantuml diagram");
        out
    }
}
