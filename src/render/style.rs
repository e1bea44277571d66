use crate::graph::NodeKind;

/// Visual attributes of one node kind in the Graphviz output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStyle {
    pub shape: String,
    pub style: String,
    pub fill_color: String,
    pub font: String,
}

impl NodeStyle {
    pub fn new(shape: &str, style: &str, fill_color: &str, font: &str) -> Self {
        Self {
            shape: shape.to_string(),
            style: style.to_string(),
            fill_color: fill_color.to_string(),
            font: font.to_string(),
        }
    }
}

/// Styling of the dashed, arrowless edge between an annotation and its anchor step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEdgeStyle {
    pub style: String,
    pub color: String,
    pub arrowhead: String,
}

/// Border and background of instruction clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStyle {
    pub style: String,
    pub background: String,
    pub border_color: String,
    pub pen_width: f32,
    pub margin: u32,
}

pub const DEFAULT_FONT: &str = "Roboto, sans-serif";

/// Every policy constant of the Graphviz renderer.
///
/// The renderer holds this by value and never mutates it; build a modified copy with the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct DotStyle {
    pub start: NodeStyle,
    pub decision: NodeStyle,
    pub transition: NodeStyle,
    pub outcome: NodeStyle,
    pub end: NodeStyle,
    pub annotation: NodeStyle,
    pub empty: NodeStyle,
    pub edge_color: String,
    pub edge_font: String,
    pub annotation_edge: AnnotationEdgeStyle,
    pub cluster: ClusterStyle,
    /// Wrap width for step descriptions, notes and outcome labels.
    pub wrap_width: usize,
    /// Wrap width for multi-step instruction text.
    pub annotation_wrap_width: usize,
    /// Group each instruction with the steps in its scope.
    pub cluster_instructions: bool,
    /// Caption before the checking role on the start node.
    pub role_caption: String,
}

impl Default for DotStyle {
    fn default() -> Self {
        let rounded = "filled,rounded";
        Self {
            start: NodeStyle::new("box", rounded, "#8ba2d7", DEFAULT_FONT),
            decision: NodeStyle::new("box", rounded, "#c2cee9", DEFAULT_FONT),
            transition: NodeStyle::new("box", rounded, "#c2cee9", DEFAULT_FONT),
            outcome: NodeStyle::new("box", rounded, "#c4cac1", DEFAULT_FONT),
            end: NodeStyle::new("box", rounded, "#8ba2d7", DEFAULT_FONT),
            annotation: NodeStyle::new("note", "filled", "#e6f3ff", DEFAULT_FONT),
            empty: NodeStyle::new("box", rounded, "#7a8da1", DEFAULT_FONT),
            edge_color: "#88a0d6".to_string(),
            edge_font: DEFAULT_FONT.to_string(),
            annotation_edge: AnnotationEdgeStyle {
                style: "dashed".to_string(),
                color: "#888888".to_string(),
                arrowhead: "none".to_string(),
            },
            cluster: ClusterStyle {
                style: "dashed,rounded".to_string(),
                background: "#f0f7ff".to_string(),
                border_color: "#888888".to_string(),
                pen_width: 1.5,
                margin: 16,
            },
            wrap_width: 80,
            annotation_wrap_width: 50,
            cluster_instructions: false,
            role_caption: "Prüfende Rolle: ".to_string(),
        }
    }
}

impl DotStyle {
    pub fn node(&self, kind: NodeKind) -> &NodeStyle {
        match kind {
            NodeKind::Start => &self.start,
            NodeKind::Decision => &self.decision,
            NodeKind::Transition => &self.transition,
            NodeKind::Outcome => &self.outcome,
            NodeKind::End => &self.end,
            NodeKind::Annotation => &self.annotation,
            NodeKind::Empty => &self.empty,
        }
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn with_annotation_wrap_width(mut self, width: usize) -> Self {
        self.annotation_wrap_width = width;
        self
    }

    pub fn with_clusters(mut self, enabled: bool) -> Self {
        self.cluster_instructions = enabled;
        self
    }

    pub fn with_node_style(mut self, kind: NodeKind, style: NodeStyle) -> Self {
        match kind {
            NodeKind::Start => self.start = style,
            NodeKind::Decision => self.decision = style,
            NodeKind::Transition => self.transition = style,
            NodeKind::Outcome => self.outcome = style,
            NodeKind::End => self.end = style,
            NodeKind::Annotation => self.annotation = style,
            NodeKind::Empty => self.empty = style,
        }
        self
    }
}

/// Policy constants of the PlantUML renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantUmlStyle {
    pub wrap_width: usize,
    /// Emit multi-step instructions as notes next to their anchor step.
    pub include_annotations: bool,
}

impl Default for PlantUmlStyle {
    fn default() -> Self {
        Self {
            wrap_width: 80,
            include_annotations: true,
        }
    }
}
