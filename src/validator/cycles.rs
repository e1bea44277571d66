use crate::graph::{EbdGraph, EdgeKind, NodeIndex, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

/// Finds every back-edge of the graph with an iterative depth-first search.
///
/// Annotation edges are ignored. The search starts at the start node(s) and then at every
/// node not yet visited, so cycles outside the reachable part are found too. Each edge
/// closing a cycle (including self-loops) is reported once as `(source, target)`.
pub(crate) fn back_edges(graph: &EbdGraph) -> Vec<(NodeIndex, NodeIndex)> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut found = Vec::new();

    let roots: Vec<NodeIndex> = graph
        .nodes_of_kind(NodeKind::Start)
        .chain((0..graph.node_count()).map(NodeIndex::new))
        .collect();

    for root in roots {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        marks[root.index()] = Mark::OnStack;
        let mut stack = vec![Frame {
            node: root,
            successors: flow_successors(graph, root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.successors.len() {
                let target = frame.successors[frame.next];
                frame.next += 1;
                let source = frame.node;
                match marks[target.index()] {
                    Mark::Unvisited => {
                        marks[target.index()] = Mark::OnStack;
                        stack.push(Frame {
                            node: target,
                            successors: flow_successors(graph, target),
                            next: 0,
                        });
                    }
                    Mark::OnStack => found.push((source, target)),
                    Mark::Done => {}
                }
            } else {
                marks[frame.node.index()] = Mark::Done;
                stack.pop();
            }
        }
    }

    found
}

fn flow_successors(graph: &EbdGraph, node: NodeIndex) -> Vec<NodeIndex> {
    graph
        .outgoing(node)
        .filter(|e| e.kind != EdgeKind::Annotates)
        .map(|e| e.target)
        .collect()
}
