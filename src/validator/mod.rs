//! Post-conversion invariant checks.
//!
//! [`validate`] never fails: every problem becomes a [`Finding`]. Fatal findings block
//! rendering through the [`Validated`] gate, warnings (cycles) are passed on to the caller.

use crate::graph::{EbdGraph, EdgeKind, NodeIndex, NodeKind};
use crate::table::OutcomeCode;
use ahash::AHashSet;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

mod cycles;
mod gate;

pub use gate::Validated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Fatal => f.write_str("fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// The graph has zero or several start nodes.
    StartNodeCount { found: usize },
    /// Nodes that cannot be reached from the start node.
    Unreachable,
    /// A decision node has several edges for an outcome that allows only one.
    DuplicateOutcomeLabel { code: OutcomeCode },
    /// The outcome labels of a decision node differ from its source row's outcome codes.
    MalformedOutcomeSet {
        expected: Vec<OutcomeCode>,
        actual: Vec<OutcomeCode>,
    },
    /// A transition step without exactly one unconditional successor.
    MalformedTransition { edges: usize },
    /// Several nodes share one key, so the diagram would merge them.
    DuplicateKey { key: String },
    /// A back-edge closing a loop in the decision process.
    Cycle,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::Cycle => Severity::Warning,
            _ => Severity::Fatal,
        }
    }
}

/// One issue found in a graph, with the keys of the nodes involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub nodes: Vec<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, nodes: Vec<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            nodes,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes.join(", ");
        match &self.kind {
            FindingKind::StartNodeCount { found } => {
                write!(f, "[{}] expected exactly one start node, found {}", self.severity, found)
            }
            FindingKind::Unreachable => {
                write!(f, "[{}] unreachable from start: {}", self.severity, nodes)
            }
            FindingKind::DuplicateOutcomeLabel { code } => write!(
                f,
                "[{}] step {} has more than one '{}' edge",
                self.severity, nodes, code
            ),
            FindingKind::MalformedOutcomeSet { expected, actual } => write!(
                f,
                "[{}] step {} has outcomes [{}] but its row defines [{}]",
                self.severity,
                nodes,
                actual.iter().join(", "),
                expected.iter().join(", ")
            ),
            FindingKind::MalformedTransition { edges } => write!(
                f,
                "[{}] transition step {} has {} outgoing edges, expected one unconditional edge",
                self.severity, nodes, edges
            ),
            FindingKind::DuplicateKey { key } => {
                write!(f, "[{}] {} nodes share the key '{}'", self.severity, self.nodes.len(), key)
            }
            FindingKind::Cycle => {
                write!(f, "[{}] loop back-edge {}", self.severity, self.nodes.join(" -> "))
            }
        }
    }
}

/// Runs all checks in a fixed order: key uniqueness, start node count, reachability,
/// outcome label uniqueness, outcome label completeness, transitions, cycles.
///
/// A graph consisting of a single [`Empty`](crate::graph::Node::Empty) node is valid.
pub fn validate(graph: &EbdGraph) -> Vec<Finding> {
    let mut findings = Vec::new();
    if is_placeholder(graph) {
        return findings;
    }
    check_keys(graph, &mut findings);
    check_start(graph, &mut findings);
    check_reachability(graph, &mut findings);
    check_outcome_labels(graph, &mut findings);
    check_outcome_sets(graph, &mut findings);
    check_transitions(graph, &mut findings);
    check_cycles(graph, &mut findings);
    findings
}

/// True if any finding blocks rendering.
pub fn has_fatal(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_fatal)
}

fn is_placeholder(graph: &EbdGraph) -> bool {
    graph.node_count() == 1 && graph.nodes_of_kind(NodeKind::Empty).count() == 1
}

fn check_keys(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    for key in graph.duplicate_keys() {
        let holders = graph.nodes().filter(|(i, _)| graph.key(*i) == key).count();
        let nodes = vec![key.clone(); holders];
        findings.push(Finding::new(FindingKind::DuplicateKey { key }, nodes));
    }
}

fn check_start(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    let starts: Vec<_> = graph.nodes_of_kind(NodeKind::Start).collect();
    if starts.len() != 1 {
        findings.push(Finding::new(
            FindingKind::StartNodeCount {
                found: starts.len(),
            },
            starts.iter().map(|&i| graph.key(i).to_string()).collect(),
        ));
    }
}

/// Breadth-first search from the start node(s). Annotation edges count in both
/// directions since an annotation belongs to its anchor step.
fn check_reachability(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    let mut visited = vec![false; graph.node_count()];
    let mut queue: VecDeque<NodeIndex> = graph.nodes_of_kind(NodeKind::Start).collect();
    if queue.is_empty() {
        return;
    }
    for node in &queue {
        visited[node.index()] = true;
    }

    while let Some(node) = queue.pop_front() {
        let forward = graph.outgoing(node).map(|e| e.target);
        let annotations = graph
            .incoming(node)
            .filter(|e| e.kind == EdgeKind::Annotates)
            .map(|e| e.source);
        for next in forward.chain(annotations) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                queue.push_back(next);
            }
        }
    }

    let unreachable: Vec<String> = graph
        .nodes()
        .filter(|(i, _)| !visited[i.index()])
        .map(|(i, _)| graph.key(i).to_string())
        .collect();
    if !unreachable.is_empty() {
        findings.push(Finding::new(FindingKind::Unreachable, unreachable));
    }
}

/// A label may appear on several edges only when the row declares a multi-result for
/// it, and even then never twice towards the same target.
fn check_outcome_labels(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    for (index, node) in graph.nodes() {
        let Some(decision) = node.as_decision() else {
            continue;
        };
        let mut by_code: BTreeMap<&OutcomeCode, Vec<NodeIndex>> = BTreeMap::new();
        for edge in graph.outgoing(index) {
            if let EdgeKind::Outcome(code) = &edge.kind {
                by_code.entry(code).or_default().push(edge.target);
            }
        }
        for (code, targets) in by_code {
            let allowed = decision.expected_outcomes.get(code).copied().unwrap_or(1);
            let distinct: AHashSet<_> = targets.iter().collect();
            let duplicated = distinct.len() != targets.len() || (allowed <= 1 && targets.len() > 1);
            if duplicated {
                findings.push(Finding::new(
                    FindingKind::DuplicateOutcomeLabel { code: code.clone() },
                    vec![graph.key(index).to_string()],
                ));
            }
        }
    }
}

fn check_outcome_sets(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    for (index, node) in graph.nodes() {
        let Some(decision) = node.as_decision() else {
            continue;
        };
        let actual: BTreeSet<&OutcomeCode> = graph
            .outgoing(index)
            .filter_map(|e| e.kind.outcome_code())
            .collect();
        let expected: BTreeSet<&OutcomeCode> = decision.expected_outcomes.keys().collect();
        if actual != expected {
            findings.push(Finding::new(
                FindingKind::MalformedOutcomeSet {
                    expected: expected.into_iter().cloned().collect(),
                    actual: actual.into_iter().cloned().collect(),
                },
                vec![graph.key(index).to_string()],
            ));
        }
    }
}

/// A transition step has exactly one outgoing edge, and it is unconditional.
fn check_transitions(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    for index in graph.nodes_of_kind(NodeKind::Transition) {
        let edges = graph.out_degree(index);
        let unconditional = graph
            .outgoing(index)
            .filter(|e| e.kind == EdgeKind::Transition)
            .count();
        if edges != 1 || unconditional != 1 {
            findings.push(Finding::new(
                FindingKind::MalformedTransition { edges },
                vec![graph.key(index).to_string()],
            ));
        }
    }
}

fn check_cycles(graph: &EbdGraph, findings: &mut Vec<Finding>) {
    for (source, target) in cycles::back_edges(graph) {
        findings.push(Finding::new(
            FindingKind::Cycle,
            vec![graph.key(source).to_string(), graph.key(target).to_string()],
        ));
    }
}
