//! Evaluator (spec §4.4): scores a compiled pathway graph against an
//! observed KO set.

use std::collections::HashSet;

use fnv::FnvHashMap;
use petgraph::{graph::EdgeIndex, graph::NodeIndex, visit::EdgeRef};

use crate::{catalog::CatalogEntry, graph::Graph, ko::Ko};

/// Per-pathway evaluation output, spec §3.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub coverage: f64,
    pub most_complete_path: Vec<Ko>,
    pub number_of_best_paths: usize,
    pub required_kos_in_path: HashSet<Ko>,
    pub required_kos_missing_in_path: HashSet<Ko>,
    pub step_coverage: Vec<u8>,
}

/// Evaluates a single catalog entry against an observed KO set. Total on
/// all inputs, including the empty set (spec §4.4, §7).
pub fn evaluate(entry: &CatalogEntry, evaluation_kos: &HashSet<Ko>) -> EvaluationResult {
    let compiled = &entry.graph;
    let observed: HashSet<&Ko> = evaluation_kos
        .iter()
        .filter(|ko| compiled.ko_to_edges.contains_key(*ko))
        .collect();

    // spec §4.4 edge case: no evaluated KO touches this module at all (this
    // also covers the trivial definition, whose `ko_to_edges` is empty).
    if observed.is_empty() {
        let paths = enumerate_paths(&compiled.graph, compiled.start, compiled.end);
        return EvaluationResult {
            coverage: 0.0,
            most_complete_path: Vec::new(),
            number_of_best_paths: paths.len().max(1),
            required_kos_in_path: HashSet::new(),
            required_kos_missing_in_path: HashSet::new(),
            step_coverage: Vec::new(),
        };
    }

    let overrides = build_weight_overrides(&compiled.graph, &compiled.ko_to_edges, evaluation_kos);
    let paths = enumerate_paths(&compiled.graph, compiled.start, compiled.end);

    let mut scored: Vec<(f64, Vec<EdgeIndex>)> = paths
        .into_iter()
        .map(|path| {
            let base: f64 = path
                .iter()
                .map(|&e| compiled.graph[e].base_weight)
                .sum();
            let new: f64 = path
                .iter()
                .map(|&e| current_weight(&compiled.graph, &overrides, e))
                .sum();
            (new / base, path)
        })
        .collect();

    let m_star = scored
        .iter()
        .map(|(m, _)| *m)
        .fold(f64::INFINITY, f64::min);
    let epsilon = 1e-9;
    scored.retain(|(m, _)| (*m - m_star).abs() < epsilon);
    let number_of_best_paths = scored.len();

    // Tie-break: lexicographically smallest KO-label sequence (spec §4.4
    // step 4; every edge on a non-trivial path carries a label).
    let best = scored
        .into_iter()
        .map(|(_, path)| {
            let labels: Vec<Ko> = path
                .iter()
                .map(|&e| compiled.graph[e].label.clone().expect("non-trivial path edges are labeled"))
                .collect();
            (labels, path)
        })
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .expect("at least one source-to-sink path exists");

    let (most_complete_path, best_path_edges) = best;
    let path_ko_set: HashSet<Ko> = most_complete_path.iter().cloned().collect();

    let required_kos_in_path: HashSet<Ko> = path_ko_set
        .iter()
        .filter(|ko| evaluation_kos.contains(*ko) && !compiled.optional_kos.contains(*ko))
        .cloned()
        .collect();
    let required_kos_missing_in_path: HashSet<Ko> = path_ko_set
        .iter()
        .filter(|ko| !evaluation_kos.contains(*ko) && !compiled.optional_kos.contains(*ko))
        .cloned()
        .collect();

    let base: f64 = best_path_edges
        .iter()
        .map(|&e| compiled.graph[e].base_weight)
        .sum();
    let new: f64 = best_path_edges
        .iter()
        .map(|&e| current_weight(&compiled.graph, &overrides, e))
        .sum();
    let coverage = (base - new) / base;

    let step_coverage = best_path_edges
        .iter()
        .map(|&e| {
            if current_weight(&compiled.graph, &overrides, e) == 0.0 {
                1
            } else {
                0
            }
        })
        .collect();

    EvaluationResult {
        coverage,
        most_complete_path,
        number_of_best_paths,
        required_kos_in_path,
        required_kos_missing_in_path,
        step_coverage,
    }
}

fn current_weight(graph: &Graph, overrides: &FnvHashMap<EdgeIndex, f64>, edge: EdgeIndex) -> f64 {
    overrides.get(&edge).copied().unwrap_or(graph[edge].base_weight)
}

/// Builds the per-call weight override (spec §4.4 step 1, §5's
/// no-shared-mutation rule). For every observed KO and every distinct
/// `(u, v)` pair it labels, zero the first matching parallel edge only.
fn build_weight_overrides(
    graph: &Graph,
    ko_to_edges: &FnvHashMap<Ko, Vec<(NodeIndex, NodeIndex)>>,
    evaluation_kos: &HashSet<Ko>,
) -> FnvHashMap<EdgeIndex, f64> {
    let mut overrides = FnvHashMap::default();
    for (ko, pairs) in ko_to_edges {
        if !evaluation_kos.contains(ko) {
            continue;
        }
        let mut seen_pairs = HashSet::new();
        for &(u, v) in pairs {
            if !seen_pairs.insert((u, v)) {
                continue;
            }
            if let Some(edge_ref) = graph
                .edges_connecting(u, v)
                .find(|e| e.weight().label.as_ref() == Some(ko))
            {
                overrides.insert(edge_ref.id(), 0.0);
            }
        }
    }
    overrides
}

/// Enumerates every simple source-to-sink path as an ordered list of edge
/// ids, in a deterministic (left-to-right, recursive) order (spec §4.4
/// step 2, §9).
fn enumerate_paths(graph: &Graph, start: NodeIndex, end: NodeIndex) -> Vec<Vec<EdgeIndex>> {
    let mut results = Vec::new();
    let mut current = Vec::new();
    enumerate_from(graph, start, end, &mut current, &mut results);
    results
}

fn enumerate_from(
    graph: &Graph,
    node: NodeIndex,
    end: NodeIndex,
    current: &mut Vec<EdgeIndex>,
    results: &mut Vec<Vec<EdgeIndex>>,
) {
    if node == end {
        results.push(current.clone());
        return;
    }
    for edge_ref in graph.edges(node) {
        current.push(edge_ref.id());
        enumerate_from(graph, edge_ref.target(), end, current, results);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn entry(definition: &str) -> CatalogEntry {
        CatalogEntry::compile(
            "M_TEST".to_string(),
            "test module".to_string(),
            vec![],
            definition.to_string(),
        )
        .unwrap()
    }

    fn kos(xs: &[&str]) -> HashSet<Ko> {
        xs.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn path_kos(xs: &[&str]) -> Vec<Ko> {
        xs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn s1_full_sequential_coverage() {
        let e = entry("K00001 K00002");
        let res = evaluate(&e, &kos(&["K00001", "K00002"]));
        assert_eq!(res.coverage, 1.0);
        assert_eq!(res.most_complete_path, path_kos(&["K00001", "K00002"]));
        assert_eq!(res.step_coverage, vec![1, 1]);
    }

    #[test]
    fn s2_alternation_tie_break_is_lexicographic() {
        let e = entry("K00001,K00002");
        let res = evaluate(&e, &kos(&["K00001"]));
        assert_eq!(res.coverage, 1.0);
        assert_eq!(res.most_complete_path, path_kos(&["K00001"]));
        assert_eq!(res.step_coverage, vec![1]);
    }

    #[test]
    fn s3_mixed_full_coverage() {
        let e = entry("(K00001,K00002) K00003");
        let res = evaluate(&e, &kos(&["K00002", "K00003"]));
        assert_eq!(res.coverage, 1.0);
        assert_eq!(res.most_complete_path, path_kos(&["K00002", "K00003"]));
        assert_eq!(res.step_coverage, vec![1, 1]);
    }

    #[test]
    fn s4_mixed_partial_coverage() {
        let e = entry("(K00001,K00002) K00003");
        let res = evaluate(&e, &kos(&["K00003"]));
        assert_eq!(res.coverage, 0.5);
        assert_eq!(res.most_complete_path.len(), 2);
        assert_eq!(res.most_complete_path[1], "K00003".parse::<Ko>().unwrap());
        assert_eq!(res.step_coverage, vec![0, 1]);
    }

    #[test]
    fn p6_empty_input() {
        let e = entry("K00001 K00002");
        let res = evaluate(&e, &HashSet::new());
        assert_eq!(res.coverage, 0.0);
        assert!(res.most_complete_path.is_empty());
        assert!(res.step_coverage.is_empty());
    }

    #[test]
    fn p7_step_length_matches_path_length() {
        let e = entry("(K00001,K00002) K00003");
        for set in [kos(&["K00003"]), kos(&["K00002", "K00003"]), kos(&[])] {
            let res = evaluate(&e, &set);
            assert_eq!(res.step_coverage.len(), res.most_complete_path.len());
        }
    }

    #[test]
    fn p8_optional_kos_never_reported_missing() {
        let e = entry("-K00001 K00002");
        let res = evaluate(&e, &kos(&["K00002"]));
        assert_eq!(res.coverage, 0.5);
        assert!(!res.required_kos_missing_in_path.contains(&"K00001".parse::<Ko>().unwrap()));
    }

    #[test]
    fn trivial_definition_has_zero_coverage() {
        let e = entry("");
        let res = evaluate(&e, &kos(&["K00001"]));
        assert_eq!(res.coverage, 0.0);
        assert!(res.most_complete_path.is_empty());
    }

    #[test]
    fn p4_monotonicity() {
        let e = entry("(K00001,K00002) K00003");
        let a = kos(&["K00003"]);
        let mut b = a.clone();
        b.insert("K00002".parse().unwrap());
        let cov_a = evaluate(&e, &a).coverage;
        let cov_b = evaluate(&e, &b).coverage;
        assert!(cov_a <= cov_b);
    }
}
