use super::node::{Edge, EdgeKind, Node, NodeIndex, NodeKind};
use crate::error::GraphError;
use crate::table::{StepNumber, TableMetadata};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of annotation node keys, e.g. `msi_100`.
pub const ANNOTATION_KEY_PREFIX: &str = "msi";

/// Key of the single entry node.
pub const START_KEY: &str = "Start";

/// Key of the shared "Ende" node.
pub const END_KEY: &str = "Ende";

/// Key of the placeholder node of a table without rows.
pub const EMPTY_KEY: &str = "Empty";

/// Prefix for outcome keys that would otherwise collide with another node's key.
pub const OUTCOME_KEY_PREFIX: &str = "outcome";

/// The directed graph of an EBD.
///
/// Nodes are stored in an arena and addressed by [`NodeIndex`]. Every node also has a
/// textual key derived only from its domain identity (step number, answer code, anchor
/// step), so keys are stable across runs. A graph is never modified after construction.
/// Keys are unique for every graph built by the converter; [`EbdGraph::duplicate_keys`]
/// reports collisions in hand-assembled graphs.
#[derive(Debug, Clone)]
pub struct EbdGraph {
    metadata: TableMetadata,
    nodes: Vec<Node>,
    keys: Vec<String>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    by_key: AHashMap<String, NodeIndex>,
}

/// The range of steps a multi-step instruction applies to, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionScope {
    pub annotation: NodeIndex,
    pub start: StepNumber,
    /// `None` when the instruction applies up to the end of the table.
    pub end: Option<StepNumber>,
}

impl InstructionScope {
    pub fn contains(&self, step: StepNumber) -> bool {
        step >= self.start && self.end.is_none_or(|end| step <= end)
    }
}

/// Order-independent description of a graph, for comparing graphs built from
/// differently ordered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStructure {
    pub nodes: BTreeSet<(NodeKind, String)>,
    pub edges: BTreeSet<(String, String, String)>,
}

impl EbdGraph {
    /// Assembles a graph from its parts. Fails only if an edge points outside `nodes`.
    pub fn new(
        metadata: TableMetadata,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self, GraphError> {
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (position, edge) in edges.iter().enumerate() {
            for endpoint in [edge.source, edge.target] {
                if endpoint.0 >= nodes.len() {
                    return Err(GraphError::EdgeOutOfBounds {
                        edge: position,
                        node: endpoint.0,
                        node_count: nodes.len(),
                    });
                }
            }
            outgoing[edge.source.0].push(position);
            incoming[edge.target.0].push(position);
        }

        let keys = compute_keys(&nodes);
        let mut by_key = AHashMap::with_capacity(nodes.len());
        for (index, key) in keys.iter().enumerate() {
            by_key.entry(key.clone()).or_insert(NodeIndex(index));
        }

        Ok(Self {
            metadata,
            nodes,
            keys,
            edges,
            outgoing,
            incoming,
            by_key,
        })
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0]
    }

    pub fn key(&self, index: NodeIndex) -> &str {
        &self.keys[index.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes()
            .filter(move |(_, n)| n.kind() == kind)
            .map(|(i, _)| i)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outgoing(&self, index: NodeIndex) -> impl Iterator<Item = &Edge> {
        self.outgoing[index.0].iter().map(|&e| &self.edges[e])
    }

    pub fn incoming(&self, index: NodeIndex) -> impl Iterator<Item = &Edge> {
        self.incoming[index.0].iter().map(|&e| &self.edges[e])
    }

    pub fn out_degree(&self, index: NodeIndex) -> usize {
        self.outgoing[index.0].len()
    }

    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.incoming[index.0].len()
    }

    pub fn successors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.outgoing(index).map(|e| e.target)
    }

    pub fn predecessors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.incoming(index).map(|e| e.source)
    }

    pub fn find(&self, key: &str) -> Option<NodeIndex> {
        self.by_key.get(key).copied()
    }

    /// The decision or transition node of a step.
    pub fn decision(&self, step: StepNumber) -> Option<NodeIndex> {
        self.nodes()
            .find(|(_, n)| n.step_number() == Some(step))
            .map(|(i, _)| i)
    }

    pub fn start(&self) -> Option<NodeIndex> {
        self.nodes_of_kind(NodeKind::Start).next()
    }

    pub fn step_numbers(&self) -> BTreeSet<StepNumber> {
        self.nodes.iter().filter_map(Node::step_number).collect()
    }

    /// Computes the step range of every annotation, sorted by anchor step.
    ///
    /// An explicit end step wins. Otherwise a scope ends at the highest step below the
    /// next instruction's anchor, and the last scope is open-ended.
    pub fn instruction_scopes(&self) -> Vec<InstructionScope> {
        let steps = self.step_numbers();
        let annotations: Vec<_> = self
            .nodes()
            .filter_map(|(i, n)| n.as_annotation().map(|a| (i, a)))
            .sorted_by_key(|(_, a)| a.anchor)
            .collect();

        annotations
            .iter()
            .enumerate()
            .map(|(position, (index, annotation))| {
                let end = annotation.until.or_else(|| {
                    annotations.get(position + 1).and_then(|(_, next)| {
                        steps.range(annotation.anchor..next.anchor).next_back().copied()
                    })
                });
                InstructionScope {
                    annotation: *index,
                    start: annotation.anchor,
                    end,
                }
            })
            .collect()
    }

    /// Keys carried by more than one node, in ascending order.
    pub fn duplicate_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key.clone())
            .sorted()
            .collect()
    }

    /// Step nodes (decisions and transitions) within the scope, in ascending step order.
    pub fn decisions_in(&self, scope: &InstructionScope) -> Vec<NodeIndex> {
        self.nodes()
            .filter_map(|(i, n)| n.step_number().map(|s| (i, s)))
            .filter(|(_, s)| scope.contains(*s))
            .sorted_by_key(|(_, s)| *s)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn structure(&self) -> GraphStructure {
        let nodes = self
            .nodes()
            .map(|(i, n)| (n.kind(), self.key(i).to_string()))
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|e| {
                let label = match &e.kind {
                    EdgeKind::Start => "<start>".to_string(),
                    EdgeKind::Transition => "<transition>".to_string(),
                    EdgeKind::Annotates => "<annotates>".to_string(),
                    EdgeKind::Outcome(code) => code.to_string(),
                };
                (
                    self.key(e.source).to_string(),
                    self.key(e.target).to_string(),
                    label,
                )
            })
            .collect();
        GraphStructure { nodes, edges }
    }
}

/// Derives node keys from domain identities only.
///
/// Outcome nodes are keyed by their end code, or by their label when they have none. When
/// several outcomes share that identity the key gets a `_<n>` suffix, `n` being the
/// 1-based rank of the outcome in sorted order. An outcome key that collides with the key
/// of a step, annotation or fixed node is prefixed with `outcome_`.
fn compute_keys(nodes: &[Node]) -> Vec<String> {
    let mut outcomes_by_identity: BTreeMap<&str, BTreeSet<(Option<&str>, &str)>> = BTreeMap::new();
    for outcome in nodes.iter().filter_map(Node::as_outcome) {
        outcomes_by_identity
            .entry(outcome.identity())
            .or_default()
            .insert((outcome.end_code.as_deref(), outcome.label.as_str()));
    }

    let mut keys: Vec<String> = nodes
        .iter()
        .map(|node| match node {
            Node::Start => START_KEY.to_string(),
            Node::End => END_KEY.to_string(),
            Node::Empty => EMPTY_KEY.to_string(),
            Node::Decision(decision) => decision.step_number.to_string(),
            Node::Transition(transition) => transition.step_number.to_string(),
            Node::Outcome(outcome) => {
                let identity = outcome.identity();
                let variants = &outcomes_by_identity[identity];
                if variants.len() <= 1 {
                    identity.to_string()
                } else {
                    let rank = variants
                        .iter()
                        .position(|v| *v == (outcome.end_code.as_deref(), outcome.label.as_str()))
                        .unwrap_or_default();
                    format!("{}_{}", identity, rank + 1)
                }
            }
            Node::Annotation(annotation) => {
                format!("{}_{}", ANNOTATION_KEY_PREFIX, annotation.anchor)
            }
        })
        .collect();

    let reserved: AHashSet<String> = nodes
        .iter()
        .zip(&keys)
        .filter(|(node, _)| node.kind() != NodeKind::Outcome)
        .map(|(_, key)| key.clone())
        .collect();
    for (node, key) in nodes.iter().zip(keys.iter_mut()) {
        if node.kind() == NodeKind::Outcome && reserved.contains(key.as_str()) {
            *key = format!("{}_{}", OUTCOME_KEY_PREFIX, key);
        }
    }
    keys
}
