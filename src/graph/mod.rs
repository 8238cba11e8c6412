//! Graph compiler (spec §4.3): turns a parsed `Expr` into a DAG multigraph
//! with a single source node `0` and single sink node `1`.

use fnv::{FnvHashMap, FnvHashSet};
use petgraph::{algo::toposort, graph::DiGraph, graph::NodeIndex, visit::EdgeRef, Direction};

use crate::{definition::Expr, ko::Ko};

/// One edge of a compiled pathway graph.
///
/// `current_weight` from spec §3/§4.4 is deliberately absent here: it is a
/// per-evaluation-call logical overlay (a `HashMap<EdgeIndex, f64>`), never
/// stored on the shared, immutable graph (spec §5).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub label: Option<Ko>,
    pub base_weight: f64,
}

pub type Graph = DiGraph<(), Edge>;

#[derive(Debug, Clone)]
pub struct CompiledGraph {
    pub graph: Graph,
    pub start: NodeIndex,
    pub end: NodeIndex,
    pub ko_to_edges: FnvHashMap<Ko, Vec<(NodeIndex, NodeIndex)>>,
    pub optional_kos: FnvHashSet<Ko>,
}

impl CompiledGraph {
    /// The trivial graph for a blank/whitespace-only definition: a single
    /// unlabeled edge `0 -> 1` (spec §4.4 edge case).
    pub fn trivial() -> Self {
        let mut graph = Graph::new();
        let start = graph.add_node(());
        let end = graph.add_node(());
        graph.add_edge(
            start,
            end,
            Edge {
                label: None,
                base_weight: 1.0,
            },
        );
        CompiledGraph {
            graph,
            start,
            end,
            ko_to_edges: FnvHashMap::default(),
            optional_kos: FnvHashSet::default(),
        }
    }
}

/// Compiles an expression tree into a pathway graph, entry point
/// `compile(root, 0, 1)` of spec §4.3.
pub fn compile(expr: &Expr) -> CompiledGraph {
    let mut graph = Graph::new();
    let start = graph.add_node(());
    let end = graph.add_node(());
    let mut optional_kos = FnvHashSet::default();

    compile_into(&mut graph, expr, start, end, false, &mut optional_kos);

    let mut ko_to_edges: FnvHashMap<Ko, Vec<(NodeIndex, NodeIndex)>> = FnvHashMap::default();
    for edge_ref in graph.edge_references() {
        if let Some(ko) = &edge_ref.weight().label {
            ko_to_edges
                .entry(ko.clone())
                .or_default()
                .push((edge_ref.source(), edge_ref.target()));
        }
    }

    CompiledGraph {
        graph,
        start,
        end,
        ko_to_edges,
        optional_kos,
    }
}

fn compile_into(
    graph: &mut Graph,
    expr: &Expr,
    src: NodeIndex,
    dst: NodeIndex,
    in_optional: bool,
    optional_kos: &mut FnvHashSet<Ko>,
) {
    match expr {
        Expr::Leaf(ko) => {
            graph.add_edge(
                src,
                dst,
                Edge {
                    label: Some(ko.clone()),
                    base_weight: 1.0,
                },
            );
            if in_optional {
                optional_kos.insert(ko.clone());
            }
        }
        Expr::Seq(children) => {
            // Interior nodes are allocated up front, depth-first
            // left-to-right, before recursing into any child -- this is
            // what gives compile() its deterministic node numbering
            // (spec §4.3's tie-break/determinism note, spec §8 S1).
            let mut nodes = Vec::with_capacity(children.len() + 1);
            nodes.push(src);
            for _ in 0..children.len() - 1 {
                nodes.push(graph.add_node(()));
            }
            nodes.push(dst);
            for (i, child) in children.iter().enumerate() {
                compile_into(graph, child, nodes[i], nodes[i + 1], in_optional, optional_kos);
            }
        }
        Expr::Alt(children) => {
            for child in children {
                compile_into(graph, child, src, dst, in_optional, optional_kos);
            }
        }
        Expr::Optional(inner) => {
            compile_into(graph, inner, src, dst, true, optional_kos);
        }
    }
}

/// Checks invariants I1-I4 of spec §3. Returns a human-readable violation
/// description, or `None` if the graph is well-formed. Compilation by
/// construction always satisfies these; this is a defensive assertion
/// (spec §7's `GraphInvariantViolated`, treated as a bug if it ever fires).
pub fn check_invariants(compiled: &CompiledGraph) -> Option<String> {
    let CompiledGraph {
        graph, start, end, ko_to_edges, ..
    } = compiled;

    // I1: acyclic, with a topological sort placing start first, end last.
    let order = match toposort(graph, None) {
        Ok(order) => order,
        Err(_) => return Some("graph contains a cycle".to_string()),
    };
    if order.first() != Some(start) {
        return Some("start node is not first in topological order".to_string());
    }
    if order.last() != Some(end) {
        return Some("end node is not last in topological order".to_string());
    }

    // I2: every node but the end has an out-edge; every node but start has
    // an in-edge.
    for node in graph.node_indices() {
        if node != *end && graph.edges_directed(node, Direction::Outgoing).next().is_none() {
            return Some(format!("node {node:?} has no out-edge"));
        }
        if node != *start && graph.edges_directed(node, Direction::Incoming).next().is_none() {
            return Some(format!("node {node:?} has no in-edge"));
        }
    }

    // I4: ko_to_edges lists exactly the (u, v) pairs carrying each label.
    for edge_ref in graph.edge_references() {
        if let Some(ko) = &edge_ref.weight().label {
            let pair = (edge_ref.source(), edge_ref.target());
            match ko_to_edges.get(ko) {
                Some(pairs) if pairs.contains(&pair) => {}
                _ => return Some(format!("ko_to_edges missing entry for {ko} at {pair:?}")),
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse;

    fn ko(s: &str) -> Ko {
        s.parse().unwrap()
    }

    #[test]
    fn compiles_sequential_with_one_interior_node() {
        let expr = parse("K00844 K01810").unwrap();
        let compiled = compile(&expr);
        assert_eq!(compiled.graph.node_count(), 3);
        assert_eq!(compiled.graph.edge_count(), 2);
        assert!(check_invariants(&compiled).is_none());
        assert_eq!(compiled.ko_to_edges[&ko("K00844")].len(), 1);
        assert_eq!(compiled.ko_to_edges[&ko("K01810")].len(), 1);
    }

    #[test]
    fn compiles_alternation_as_parallel_edges() {
        let expr = parse("K00844,K01810").unwrap();
        let compiled = compile(&expr);
        assert_eq!(compiled.graph.node_count(), 2);
        assert_eq!(compiled.graph.edge_count(), 2);
        assert!(check_invariants(&compiled).is_none());
    }

    #[test]
    fn trivial_graph_has_single_unlabeled_edge() {
        let compiled = CompiledGraph::trivial();
        assert_eq!(compiled.graph.edge_count(), 1);
        assert!(compiled.ko_to_edges.is_empty());
        assert!(check_invariants(&compiled).is_none());
    }

    #[test]
    fn optional_kos_collected_under_minus() {
        let expr = parse("-K00844 K01810").unwrap();
        let compiled = compile(&expr);
        assert!(compiled.optional_kos.contains(&ko("K00844")));
        assert!(!compiled.optional_kos.contains(&ko("K01810")));
        // still realized as an edge and present in ko_to_edges.
        assert!(compiled.ko_to_edges.contains_key(&ko("K00844")));
    }

    #[test]
    fn parallel_edges_for_shared_ko_in_different_alternatives() {
        // Same KO usable along two different alternatives; both edges must
        // be independently enumerable (the multigraph requirement, spec §9).
        let expr = parse("(K00844,K01810) K00844").unwrap();
        let compiled = compile(&expr);
        assert_eq!(compiled.ko_to_edges[&ko("K00844")].len(), 2);
    }
}
