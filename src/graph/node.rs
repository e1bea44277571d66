use crate::table::{OutcomeCode, StepNumber};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a node in the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Discriminant of [`Node`], used to look up per-kind styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Start,
    Decision,
    Transition,
    Outcome,
    End,
    Annotation,
    Empty,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Start => "start",
            NodeKind::Decision => "decision",
            NodeKind::Transition => "transition",
            NodeKind::Outcome => "outcome",
            NodeKind::End => "end",
            NodeKind::Annotation => "annotation",
            NodeKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// A check step of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    pub step_number: StepNumber,
    pub description: String,
    pub note: Option<String>,
    /// How many outgoing edges each outcome code of the source row produces.
    pub expected_outcomes: BTreeMap<OutcomeCode, usize>,
}

/// A step without a decision that always continues at the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionNode {
    pub step_number: StepNumber,
    pub description: String,
    pub note: Option<String>,
}

/// A terminal result, shared by every step that ends with the same code and label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutcomeNode {
    pub end_code: Option<String>,
    pub label: String,
}

impl OutcomeNode {
    /// The end code, or the label for outcomes that only carry a remark.
    pub fn identity(&self) -> &str {
        self.end_code.as_deref().unwrap_or(&self.label)
    }
}

/// A multi-step instruction, attached to the step it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationNode {
    pub anchor: StepNumber,
    pub text: String,
    pub until: Option<StepNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Start,
    Decision(DecisionNode),
    Transition(TransitionNode),
    Outcome(OutcomeNode),
    /// The shared "Ende" node.
    End,
    Annotation(AnnotationNode),
    /// Sole node of an EBD published without a table.
    Empty,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Start => NodeKind::Start,
            Node::Decision(_) => NodeKind::Decision,
            Node::Transition(_) => NodeKind::Transition,
            Node::Outcome(_) => NodeKind::Outcome,
            Node::End => NodeKind::End,
            Node::Annotation(_) => NodeKind::Annotation,
            Node::Empty => NodeKind::Empty,
        }
    }

    pub fn as_decision(&self) -> Option<&DecisionNode> {
        match self {
            Node::Decision(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn as_outcome(&self) -> Option<&OutcomeNode> {
        match self {
            Node::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationNode> {
        match self {
            Node::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    pub fn as_transition(&self) -> Option<&TransitionNode> {
        match self {
            Node::Transition(transition) => Some(transition),
            _ => None,
        }
    }

    /// The step number of decision and transition nodes, `None` for every other kind.
    pub fn step_number(&self) -> Option<StepNumber> {
        match self {
            Node::Decision(decision) => Some(decision.step_number),
            Node::Transition(transition) => Some(transition.step_number),
            _ => None,
        }
    }
}

/// What an edge means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// From the start node to the entry step.
    Start,
    /// A transition taken when the source step yields this code.
    Outcome(OutcomeCode),
    /// From a transition step to the step it always continues at.
    Transition,
    /// From an annotation node to the step it is anchored at.
    Annotates,
}

impl EdgeKind {
    pub fn outcome_code(&self) -> Option<&OutcomeCode> {
        match self {
            EdgeKind::Outcome(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: NodeIndex, target: NodeIndex, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}
