use crate::error::{ConversionError, GraphError};
use crate::graph::{
    AnnotationNode, DecisionNode, EbdGraph, Edge, EdgeKind, Node, NodeIndex, OutcomeNode,
    TransitionNode,
};
use crate::table::{
    MultiStepInstruction, OutcomeCode, Resolution, StepNumber, TRANSITION, TableMetadata,
    TableRow, Terminal,
};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Accumulates nodes and edges while a table is converted.
///
/// The lookups live only as long as the builder; `finish` drops them and hands the
/// arena to an immutable [`EbdGraph`].
pub(super) struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    decisions: AHashMap<StepNumber, NodeIndex>,
    // Content-addressed: identical (end code, label) pairs resolve to one node.
    outcomes: AHashMap<Terminal, NodeIndex>,
    end: Option<NodeIndex>,
}

impl GraphBuilder {
    pub(super) fn new(row_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(row_count * 2 + 1),
            edges: Vec::with_capacity(row_count * 2 + 1),
            decisions: AHashMap::with_capacity(row_count),
            outcomes: AHashMap::new(),
            end: None,
        }
    }

    fn push_node(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    pub(super) fn add_start(&mut self) -> NodeIndex {
        self.push_node(Node::Start)
    }

    pub(super) fn add_empty(&mut self) -> NodeIndex {
        self.push_node(Node::Empty)
    }

    /// Adds the decision node of a row, or its transition node for a transition row.
    pub(super) fn add_step(&mut self, row: &TableRow) -> Result<NodeIndex, ConversionError> {
        if self.decisions.contains_key(&row.step_number) {
            return Err(ConversionError::DuplicateStepNumber(row.step_number));
        }
        let node = if row.is_transition() {
            Node::Transition(TransitionNode {
                step_number: row.step_number,
                description: row.description.clone(),
                note: row.note.clone(),
            })
        } else {
            let expected_outcomes = row
                .outcomes
                .iter()
                .map(|(code, result)| (code.clone(), result.arity()))
                .collect();
            Node::Decision(DecisionNode {
                step_number: row.step_number,
                description: row.description.clone(),
                note: row.note.clone(),
                expected_outcomes,
            })
        };
        let index = self.push_node(node);
        self.decisions.insert(row.step_number, index);
        Ok(index)
    }

    pub(super) fn connect_start(&mut self, start: NodeIndex, entry: StepNumber) {
        if let Some(&target) = self.decisions.get(&entry) {
            self.edges.push(Edge::new(start, target, EdgeKind::Start));
        }
    }

    /// Adds one edge per resolution of every outcome of the row.
    pub(super) fn connect_row(&mut self, row: &TableRow) -> Result<(), ConversionError> {
        let source = self.decisions[&row.step_number];
        if let Some(next) = row.transition {
            let target = self.decisions.get(&next).copied().ok_or_else(|| {
                ConversionError::UnresolvedReference {
                    source_step: row.step_number,
                    outcome: TRANSITION.to_string(),
                    target: next,
                }
            })?;
            self.edges.push(Edge::new(source, target, EdgeKind::Transition));
        }
        for (code, result) in &row.outcomes {
            let mut targets: AHashSet<NodeIndex> = AHashSet::new();
            for resolution in result.resolutions() {
                let target = self.resolve(row.step_number, code, resolution)?;
                if !targets.insert(target) {
                    debug!(
                        step = %row.step_number,
                        outcome = %code,
                        "multi-result resolves to the same node twice, keeping a single edge"
                    );
                    continue;
                }
                self.edges
                    .push(Edge::new(source, target, EdgeKind::Outcome(code.clone())));
            }
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        source_step: StepNumber,
        code: &OutcomeCode,
        resolution: Resolution,
    ) -> Result<NodeIndex, ConversionError> {
        match resolution {
            Resolution::ContinueAt(target) => self.decisions.get(&target).copied().ok_or_else(|| {
                ConversionError::UnresolvedReference {
                    source_step,
                    outcome: code.to_string(),
                    target,
                }
            }),
            Resolution::Terminal(terminal) => Ok(self.outcome_node(terminal)),
            Resolution::End => Ok(self.end_node()),
        }
    }

    fn end_node(&mut self) -> NodeIndex {
        if let Some(index) = self.end {
            return index;
        }
        let index = self.push_node(Node::End);
        self.end = Some(index);
        index
    }

    fn outcome_node(&mut self, terminal: Terminal) -> NodeIndex {
        if let Some(&index) = self.outcomes.get(&terminal) {
            return index;
        }
        let index = self.push_node(Node::Outcome(OutcomeNode {
            end_code: terminal.end_code.clone(),
            label: terminal.label.clone(),
        }));
        self.outcomes.insert(terminal, index);
        index
    }

    pub(super) fn add_annotation(
        &mut self,
        instruction: &MultiStepInstruction,
    ) -> Result<NodeIndex, ConversionError> {
        let anchor = self.decisions.get(&instruction.anchor).copied().ok_or(
            ConversionError::DanglingAnnotation {
                anchor: instruction.anchor,
            },
        )?;
        let index = self.push_node(Node::Annotation(AnnotationNode {
            anchor: instruction.anchor,
            text: instruction.text.clone(),
            until: instruction.until,
        }));
        self.edges.push(Edge::new(index, anchor, EdgeKind::Annotates));
        Ok(index)
    }

    pub(super) fn finish(self, metadata: TableMetadata) -> Result<EbdGraph, GraphError> {
        EbdGraph::new(metadata, self.nodes, self.edges)
    }
}
