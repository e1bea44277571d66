//! Graph → diagram text.
//!
//! Renderers only accept a [`Validated`] graph. Output is deterministic: nodes appear as
//! start (or placeholder) node, decision and transition steps by ascending step number,
//! outcomes and the end node in discovery order, then annotations by ascending anchor
//! step. Edges follow the position of their source node,
//! then their label, then the position of their target.

use crate::graph::{EbdGraph, Edge, NodeIndex, NodeKind};
use crate::validator::Validated;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

pub mod dot;
pub mod plantuml;
pub mod style;
pub mod text;

pub use dot::DotRenderer;
pub use plantuml::PlantUmlRenderer;
pub use style::*;

/// A target textual diagram dialect.
pub trait DiagramRenderer {
    fn dialect(&self) -> Dialect;

    /// Produces the full diagram text. Rendering an unchanged graph twice yields
    /// byte-identical output.
    fn render(&self, graph: &Validated<'_>) -> String;
}

/// The available diagram dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Graphviz DOT with per-kind styling and annotation placement.
    #[default]
    Dot,
    /// PlantUML, coarser styling, annotations as notes.
    PlantUml,
}

impl Dialect {
    /// A renderer for this dialect with default styling.
    pub fn renderer(self) -> Box<dyn DiagramRenderer> {
        match self {
            Dialect::Dot => Box::new(DotRenderer::default()),
            Dialect::PlantUml => Box::new(PlantUmlRenderer::default()),
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Dialect::Dot => "dot",
            Dialect::PlantUml => "puml",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Dot => f.write_str("dot"),
            Dialect::PlantUml => f.write_str("plantuml"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot" | "graphviz" => Ok(Dialect::Dot),
            "plantuml" | "puml" => Ok(Dialect::PlantUml),
            other => Err(format!("unknown diagram dialect '{}'", other)),
        }
    }
}

/// Renders with the default renderer of `dialect`.
pub fn render(graph: &Validated<'_>, dialect: Dialect) -> String {
    dialect.renderer().render(graph)
}

/// Node indices in render order.
pub(crate) fn node_order(graph: &EbdGraph) -> Vec<NodeIndex> {
    let starts = graph
        .nodes_of_kind(NodeKind::Start)
        .chain(graph.nodes_of_kind(NodeKind::Empty));
    let decisions = graph
        .nodes()
        .filter_map(|(i, n)| n.step_number().map(|s| (i, s)))
        .sorted_by_key(|(_, s)| *s)
        .map(|(i, _)| i);
    let outcomes = graph
        .nodes()
        .filter(|(_, n)| matches!(n.kind(), NodeKind::Outcome | NodeKind::End))
        .map(|(i, _)| i);
    let annotations = graph
        .nodes()
        .filter_map(|(i, n)| n.as_annotation().map(|a| (i, a.anchor)))
        .sorted_by_key(|(_, anchor)| *anchor)
        .map(|(i, _)| i);

    starts
        .chain(decisions)
        .chain(outcomes)
        .chain(annotations)
        .collect()
}

/// Edges in render order, given the node order from [`node_order`].
pub(crate) fn edge_order<'g>(graph: &'g EbdGraph, order: &[NodeIndex]) -> Vec<&'g Edge> {
    let mut position = vec![usize::MAX; graph.node_count()];
    for (rank, index) in order.iter().enumerate() {
        position[index.index()] = rank;
    }
    graph
        .edges()
        .iter()
        .sorted_by(|a, b| {
            position[a.source.index()]
                .cmp(&position[b.source.index()])
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| position[a.target.index()].cmp(&position[b.target.index()]))
        })
        .collect()
}
