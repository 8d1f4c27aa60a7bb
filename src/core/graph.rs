//! Dependency graph and calculation ordering for custom columns
//!
//! An edge A -> B means "A's formula references B's name". Detection is a
//! deliberate whole-word text match, not a parse of the formula: a column
//! name inside a string literal or a dotted node reference still counts.
//! That can over-order (false positive edges) but never under-orders, which
//! is the safe direction for a calculation schedule.

use crate::error::{GridCalcError, GridCalcResult};
use crate::types::ColumnDefinition;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Whole-word matcher for a column name inside formula text
fn name_pattern(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()
}

/// True when `formula` references `name` as a whole word
pub fn references_name(formula: &str, name: &str) -> bool {
    name_pattern(name).is_some_and(|re| re.is_match(formula))
}

/// Build the dependency graph for a column set
///
/// Every column gets a node; `graph[A]` holds the names A's formula
/// references. Self-references are excluded by construction.
pub fn build_dependency_graph(
    columns: &[ColumnDefinition],
) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = columns
        .iter()
        .map(|column| (column.name.clone(), BTreeSet::new()))
        .collect();

    for target in columns {
        let Some(pattern) = name_pattern(&target.name) else {
            continue;
        };
        for source in columns {
            if source.name == target.name {
                continue;
            }
            if pattern.is_match(&source.formula) {
                if let Some(deps) = graph.get_mut(&source.name) {
                    deps.insert(target.name.clone());
                }
            }
        }
    }

    graph
}

/// Topologically sort a dependency graph
///
/// Output order guarantees that for every edge A -> B, B precedes A
/// (dependencies are evaluated first). Deterministic for a given graph.
/// A cycle fails with `CircularDependency` naming the column at which it
/// was detected.
pub fn sort_graph(graph: &BTreeMap<String, BTreeSet<String>>) -> GridCalcResult<Vec<String>> {
    let mut digraph = DiGraph::new();
    let mut node_indices = HashMap::new();

    for name in graph.keys() {
        let idx = digraph.add_node(name.clone());
        node_indices.insert(name.clone(), idx);
    }

    // Edge dep -> dependent, so toposort yields dependencies first
    for (name, deps) in graph {
        for dep in deps {
            if let (Some(&dep_idx), Some(&name_idx)) =
                (node_indices.get(dep), node_indices.get(name))
            {
                digraph.add_edge(dep_idx, name_idx, ());
            }
        }
    }

    let order = toposort(&digraph, None)
        .map_err(|cycle| GridCalcError::CircularDependency(digraph[cycle.node_id()].clone()))?;

    Ok(order
        .iter()
        .filter_map(|idx| digraph.node_weight(*idx).cloned())
        .collect())
}

/// Calculation order for a column set: build the graph fresh and sort it.
/// Pure function of the definitions; re-run on every change.
pub fn calculation_order(columns: &[ColumnDefinition]) -> GridCalcResult<Vec<String>> {
    sort_graph(&build_dependency_graph(columns))
}
