//! Graphviz DOT renderer.

use super::style::DotStyle;
use super::text::{DOT_LINE_BREAK, escape_html, html_label, quote_id};
use super::{DiagramRenderer, Dialect, edge_order, node_order};
use crate::graph::{EbdGraph, Edge, EdgeKind, Node, NodeIndex};
use crate::validator::Validated;
use ahash::AHashSet;
use std::fmt::Write;
use tracing::debug;

const INDENT: &str = "    ";
const NODE_MARGIN: &str = "0.2,0.12";

#[derive(Debug, Clone, Default)]
pub struct DotRenderer {
    style: DotStyle,
}

impl DotRenderer {
    pub fn new(style: DotStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &DotStyle {
        &self.style
    }

    fn write_header(&self, graph: &EbdGraph, out: &mut String) {
        let metadata = graph.metadata();
        let title = format!(
            r#"<B><FONT POINT-SIZE="18">{}</FONT></B><BR align="left"/><BR/><B><FONT POINT-SIZE="16">{}</FONT></B><BR align="left"/><BR/><BR/><BR/>"#,
            escape_html(&metadata.chapter),
            escape_html(&metadata.section),
        );
        out.push_str("digraph D {\n");
        let attributes = [
            ("labelloc", "\"t\"".to_string()),
            ("label", format!("<{}>", title)),
            ("ratio", "\"compress\"".to_string()),
            ("concentrate", "true".to_string()),
            ("pack", "true".to_string()),
            ("rankdir", "TB".to_string()),
            ("packmode", "\"array\"".to_string()),
            ("size", "\"20,20\"".to_string()),
            ("fontsize", "12".to_string()),
            ("pad", "0.25".to_string()),
        ];
        for (key, value) in attributes {
            let _ = writeln!(out, "{INDENT}{key}={value};");
        }
    }

    fn label(&self, graph: &EbdGraph, index: NodeIndex) -> String {
        let width = self.style.wrap_width;
        match graph.node(index) {
            Node::Start => {
                let metadata = graph.metadata();
                format!(
                    r#"<B>{}</B>{DOT_LINE_BREAK}<FONT>{}<B>{}</B></FONT><BR align="center"/>"#,
                    escape_html(&metadata.ebd_code),
                    escape_html(&self.style.role_caption),
                    escape_html(&metadata.role),
                )
            }
            Node::Decision(decision) => self.step_label(
                &decision.step_number.to_string(),
                &decision.description,
                decision.note.as_deref(),
            ),
            Node::Transition(transition) => self.step_label(
                &transition.step_number.to_string(),
                &transition.description,
                transition.note.as_deref(),
            ),
            Node::Outcome(outcome) => {
                let mut label = String::new();
                if let Some(end_code) = &outcome.end_code {
                    let _ = write!(
                        label,
                        "<B>{}</B>{DOT_LINE_BREAK}{DOT_LINE_BREAK}",
                        escape_html(end_code)
                    );
                }
                if !outcome.label.is_empty() {
                    let _ = write!(
                        label,
                        "<FONT>{}{DOT_LINE_BREAK}</FONT>",
                        html_label(&outcome.label, width)
                    );
                }
                label
            }
            Node::End => "Ende".to_string(),
            Node::Empty => {
                let metadata = graph.metadata();
                let mut label = format!(
                    r#"<B>{}</B><BR align="center"/>"#,
                    escape_html(&metadata.ebd_code)
                );
                if let Some(remark) = metadata.remark.as_deref().filter(|r| !r.is_empty()) {
                    let _ = write!(
                        label,
                        r#"<FONT>{}</FONT><BR align="center"/>"#,
                        html_label(remark, width)
                    );
                }
                label
            }
            Node::Annotation(annotation) => format!(
                "<FONT><I>{}</I></FONT>{DOT_LINE_BREAK}",
                html_label(&annotation.text, self.style.annotation_wrap_width)
            ),
        }
    }

    fn step_label(&self, step: &str, description: &str, note: Option<&str>) -> String {
        let width = self.style.wrap_width;
        let mut label = format!(
            "<B>{}: </B>{}{DOT_LINE_BREAK}",
            escape_html(step),
            html_label(description, width)
        );
        if let Some(note) = note.filter(|n| !n.is_empty()) {
            let _ = write!(label, "<FONT>{}{DOT_LINE_BREAK}</FONT>", html_label(note, width));
        }
        label
    }

    fn write_node(&self, graph: &EbdGraph, index: NodeIndex, indent: &str, out: &mut String) {
        let node_style = self.style.node(graph.node(index).kind());
        let _ = writeln!(
            out,
            r#"{indent}{} [margin="{NODE_MARGIN}", shape={}, style="{}", penwidth=0.0, fillcolor="{}", label=<{}>, fontname="{}"];"#,
            quote_id(graph.key(index)),
            node_style.shape,
            node_style.style,
            node_style.fill_color,
            self.label(graph, index),
            node_style.font,
        );
    }

    /// Writes one cluster per instruction scope and returns the nodes placed in clusters.
    /// A node already placed by an earlier scope stays there.
    fn write_clusters(&self, graph: &EbdGraph, out: &mut String) -> AHashSet<NodeIndex> {
        let cluster = &self.style.cluster;
        let inner = format!("{INDENT}{INDENT}");
        let mut placed = AHashSet::new();

        for scope in graph.instruction_scopes() {
            let _ = writeln!(
                out,
                "{INDENT}subgraph {} {{",
                quote_id(&format!("cluster_{}", graph.key(scope.annotation)))
            );
            let _ = writeln!(out, "{inner}style=\"{}\";", cluster.style);
            let _ = writeln!(out, "{inner}bgcolor=\"{}\";", cluster.background);
            let _ = writeln!(out, "{inner}color=\"{}\";", cluster.border_color);
            let _ = writeln!(out, "{inner}penwidth={:.1};", cluster.pen_width);
            let _ = writeln!(out, "{inner}margin={};", cluster.margin);

            self.write_node(graph, scope.annotation, &inner, out);
            placed.insert(scope.annotation);
            for decision in graph.decisions_in(&scope) {
                if placed.insert(decision) {
                    self.write_node(graph, decision, &inner, out);
                }
            }
            let _ = writeln!(out, "{INDENT}}}");
        }
        placed
    }

    /// Pins every annotation to the rank of its anchor step so it sits beside the
    /// decision sequence rather than inside it.
    fn write_annotation_ranks(&self, graph: &EbdGraph, order: &[NodeIndex], out: &mut String) {
        for &index in order {
            if graph.node(index).as_annotation().is_none() {
                continue;
            }
            for anchor in graph.successors(index) {
                let _ = writeln!(
                    out,
                    "{INDENT}{{ rank=same; {}; {}; }}",
                    quote_id(graph.key(index)),
                    quote_id(graph.key(anchor))
                );
            }
        }
    }

    fn write_edge(&self, graph: &EbdGraph, edge: &Edge, out: &mut String) {
        let source = quote_id(graph.key(edge.source));
        let target = quote_id(graph.key(edge.target));
        let _ = match &edge.kind {
            EdgeKind::Start | EdgeKind::Transition => writeln!(
                out,
                r#"{INDENT}{source} -> {target} [color="{}"];"#,
                self.style.edge_color
            ),
            EdgeKind::Outcome(code) => writeln!(
                out,
                r#"{INDENT}{source} -> {target} [label=<<B>{}</B>>, color="{}", fontname="{}"];"#,
                escape_html(&code.as_str().to_uppercase()),
                self.style.edge_color,
                self.style.edge_font,
            ),
            EdgeKind::Annotates => {
                let annotation = &self.style.annotation_edge;
                writeln!(
                    out,
                    r#"{INDENT}{source} -> {target} [style={}, color="{}", arrowhead={}, constraint=false];"#,
                    annotation.style, annotation.color, annotation.arrowhead,
                )
            }
        };
    }
}

impl DiagramRenderer for DotRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Dot
    }

    fn render(&self, graph: &Validated<'_>) -> String {
        let graph = graph.graph();
        let order = node_order(graph);
        let mut out = String::new();

        self.write_header(graph, &mut out);

        let clustered = if self.style.cluster_instructions {
            self.write_clusters(graph, &mut out)
        } else {
            AHashSet::new()
        };
        for &index in &order {
            if !clustered.contains(&index) {
                self.write_node(graph, index, INDENT, &mut out);
            }
        }
        if !self.style.cluster_instructions {
            self.write_annotation_ranks(graph, &order, &mut out);
        }

        out.push('\n');
        for edge in edge_order(graph, &order) {
            self.write_edge(graph, edge, &mut out);
        }

        let _ = write!(
            out,
            "\n{INDENT}bgcolor=\"transparent\";\n{INDENT}fontname=\"{}\";\n}}\n",
            self.style.start.font
        );

        debug!(
            ebd = %graph.metadata().ebd_code,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            clusters = self.style.cluster_instructions,
            "rendered dot diagram"
        );
        out
    }
}
