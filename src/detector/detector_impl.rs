use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::core::{ModuleId, ReferenceKind};
use crate::graph::{ImportEdge, ModuleNode};

/// One hop of a cycle, with the reference that creates it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEdge {
    pub from: ModuleId,
    pub to: ModuleId,
    pub specifier: String,
    pub kind: ReferenceKind,
}

/// A simple import cycle
///
/// `modules` does not repeat the first module at the end; use
/// [`ModuleCycle::closed_path`] for the closed form. `edges[i]` goes from
/// `modules[i]` to `modules[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCycle {
    modules: Vec<ModuleId>,
    edges: Vec<CycleEdge>,
}

impl ModuleCycle {
    pub fn new(modules: Vec<ModuleId>, edges: Vec<CycleEdge>) -> Self {
        Self { modules, edges }
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn edges(&self) -> &[CycleEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains(id)
    }

    /// The modules with the first one repeated at the end
    pub fn closed_path(&self) -> Vec<&ModuleId> {
        self.modules.iter().chain(self.modules.first()).collect()
    }

    /// Rotate so that the smallest module comes first
    pub fn canonicalize(mut self) -> Self {
        let start = self
            .modules
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.modules.rotate_left(start);
        if self.edges.len() == self.modules.len() {
            self.edges.rotate_left(start);
        }
        self
    }
}

/// Caps on cycle enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleLimits {
    /// Stop after this many cycles
    pub max_cycles: Option<usize>,
    /// Ignore cycles with more modules than this
    pub max_length: Option<usize>,
}

/// Detector for import cycles in a module graph
///
/// Strongly connected components are found with Tarjan's algorithm; every
/// simple cycle inside a nontrivial component is then enumerated with
/// Johnson's circuit search.
pub struct CycleDetector {
    cycles: Vec<ModuleCycle>,
    limits: CycleLimits,
    truncated: bool,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-component search state
struct ComponentSearch<'g> {
    graph: &'g DiGraph<ModuleNode, ImportEdge>,
    /// Component nodes sorted by module id
    nodes: Vec<NodeIndex>,
    /// Local adjacency over positions in `nodes`
    adjacency: Vec<Vec<usize>>,
}

struct Frame {
    node: usize,
    next: usize,
    found: bool,
}

enum Flow {
    Continue,
    Stop,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::with_limits(CycleLimits::default())
    }

    pub fn with_limits(limits: CycleLimits) -> Self {
        Self {
            cycles: Vec::new(),
            limits,
            truncated: false,
        }
    }

    /// Find every simple cycle in the graph
    pub fn detect_cycles(&mut self, graph: &DiGraph<ModuleNode, ImportEdge>) {
        for scc in tarjan_scc(graph) {
            let self_loop = scc.len() == 1 && graph.contains_edge(scc[0], scc[0]);
            if scc.len() < 2 && !self_loop {
                continue;
            }

            debug!("searching component of {} modules", scc.len());
            let search = ComponentSearch::new(graph, scc);
            let mut found = Vec::new();
            let flow = self.search_component(&search, &mut found);

            let mut seen = HashSet::new();
            let mut found: Vec<ModuleCycle> = found
                .into_iter()
                .map(ModuleCycle::canonicalize)
                .filter(|cycle| seen.insert(cycle.modules.clone()))
                .collect();
            found.sort_by(|a, b| a.modules[0].cmp(&b.modules[0]).then(a.len().cmp(&b.len())));
            self.cycles.extend(found);

            if matches!(flow, Flow::Stop) {
                break;
            }
        }
    }

    fn search_component(&mut self, search: &ComponentSearch<'_>, found: &mut Vec<ModuleCycle>) -> Flow {
        let n = search.nodes.len();

        for start in 0..n {
            let mut blocked = vec![false; n];
            let mut blocked_by: Vec<HashSet<usize>> = vec![HashSet::new(); n];
            let mut path = vec![start];
            let mut stack = vec![Frame {
                node: start,
                next: 0,
                found: false,
            }];
            blocked[start] = true;

            while let Some(frame) = stack.last_mut() {
                let v = frame.node;

                if let Some(&w) = search.adjacency[v].get(frame.next) {
                    frame.next += 1;
                    if w < start {
                        continue;
                    }
                    if w == start {
                        frame.found = true;
                        if self.emit(search, &path, found) {
                            return Flow::Stop;
                        }
                        continue;
                    }
                    if blocked[w] {
                        continue;
                    }
                    if self.limits.max_length.is_some_and(|max| path.len() >= max) {
                        // Longer cycles are dropped; keep the pruned branch
                        // unblocked so shorter cycles through it still show up
                        frame.found = true;
                        self.truncated = true;
                        continue;
                    }
                    path.push(w);
                    blocked[w] = true;
                    stack.push(Frame {
                        node: w,
                        next: 0,
                        found: false,
                    });
                    continue;
                }

                let done = stack.pop().map(|f| f.found).unwrap_or(false);
                if done {
                    unblock(v, &mut blocked, &mut blocked_by);
                } else {
                    for &w in &search.adjacency[v] {
                        if w >= start {
                            blocked_by[w].insert(v);
                        }
                    }
                }
                path.pop();
                if let Some(parent) = stack.last_mut() {
                    parent.found |= done;
                }
            }
        }

        Flow::Continue
    }

    /// Record the cycle on `path`; returns true when the cycle cap is hit
    fn emit(&mut self, search: &ComponentSearch<'_>, path: &[usize], found: &mut Vec<ModuleCycle>) -> bool {
        if let Some(max) = self.limits.max_cycles
            && self.cycles.len() + found.len() >= max
        {
            self.truncated = true;
            return true;
        }
        found.push(search.cycle(path));
        false
    }

    pub fn cycles(&self) -> &[ModuleCycle] {
        &self.cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Whether a limit stopped the enumeration early
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'g> ComponentSearch<'g> {
    fn new(graph: &'g DiGraph<ModuleNode, ImportEdge>, mut nodes: Vec<NodeIndex>) -> Self {
        nodes.sort_by(|a, b| graph[*a].id.cmp(&graph[*b].id));
        let position: HashMap<NodeIndex, usize> =
            nodes.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();

        let adjacency = nodes
            .iter()
            .map(|&idx| {
                let mut targets: Vec<usize> = graph
                    .neighbors(idx)
                    .filter_map(|target| position.get(&target).copied())
                    .collect();
                targets.sort_unstable();
                targets.dedup();
                targets
            })
            .collect();

        Self {
            graph,
            nodes,
            adjacency,
        }
    }

    fn cycle(&self, path: &[usize]) -> ModuleCycle {
        let modules = path
            .iter()
            .map(|&local| self.graph[self.nodes[local]].id.clone())
            .collect();

        let edges = path
            .iter()
            .zip(path.iter().cycle().skip(1))
            .filter_map(|(&from, &to)| {
                let (from, to) = (self.nodes[from], self.nodes[to]);
                let edge = self
                    .graph
                    .edges_connecting(from, to)
                    .min_by_key(|edge| edge.weight().order)?;
                Some(CycleEdge {
                    from: self.graph[from].id.clone(),
                    to: self.graph[to].id.clone(),
                    specifier: edge.weight().specifier.clone(),
                    kind: edge.weight().kind,
                })
            })
            .collect();

        ModuleCycle::new(modules, edges)
    }
}

fn unblock(node: usize, blocked: &mut [bool], blocked_by: &mut [HashSet<usize>]) {
    let mut pending = vec![node];
    while let Some(u) = pending.pop() {
        if !blocked[u] {
            continue;
        }
        blocked[u] = false;
        pending.extend(blocked_by[u].drain());
    }
}

#[cfg(test)]
mod tests {
    use petgraph::graph::DiGraph;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{ModuleState, SkipReason};

    struct TestGraph {
        graph: DiGraph<ModuleNode, ImportEdge>,
    }

    impl TestGraph {
        fn new(names: &[&str]) -> Self {
            let mut graph = DiGraph::new();
            for name in names {
                graph.add_node(ModuleNode::new(
                    id(name),
                    0,
                    ModuleState::Skipped(SkipReason::External),
                ));
            }
            Self { graph }
        }

        fn edge(mut self, from: usize, to: usize) -> Self {
            let order = self.graph.edges(NodeIndex::new(from)).count();
            let specifier = format!("./{}", self.graph[NodeIndex::new(to)].id);
            self.graph.add_edge(
                NodeIndex::new(from),
                NodeIndex::new(to),
                ImportEdge {
                    specifier,
                    kind: ReferenceKind::Import,
                    order,
                },
            );
            self
        }

        fn detect(&self) -> CycleDetector {
            let mut detector = CycleDetector::new();
            detector.detect_cycles(&self.graph);
            detector
        }
    }

    fn id(name: &str) -> ModuleId {
        ModuleId::file(format!("/p/{name}"))
    }

    fn ids(names: &[&str]) -> Vec<ModuleId> {
        names.iter().map(|n| id(n)).collect()
    }

    #[test]
    fn test_no_cycles_in_linear_graph() {
        let detector = TestGraph::new(&["a", "b", "c"]).edge(0, 1).edge(1, 2).detect();

        assert_eq!(detector.cycle_count(), 0);
        assert!(!detector.has_cycles());
        assert!(!detector.is_truncated());
    }

    #[test]
    fn test_simple_two_node_cycle() {
        let detector = TestGraph::new(&["a", "b"]).edge(0, 1).edge(1, 0).detect();

        assert_eq!(detector.cycle_count(), 1);
        let cycle = &detector.cycles()[0];
        assert_eq!(cycle.modules(), ids(&["a", "b"]).as_slice());
        assert_eq!(
            cycle.closed_path(),
            vec![&id("a"), &id("b"), &id("a")]
        );
        assert_eq!(cycle.edges().len(), 2);
        assert_eq!(cycle.edges()[0].from, id("a"));
        assert_eq!(cycle.edges()[1].to, id("a"));
    }

    #[test]
    fn test_self_loop() {
        let detector = TestGraph::new(&["a", "b"]).edge(0, 0).edge(0, 1).detect();

        assert_eq!(detector.cycle_count(), 1);
        assert_eq!(detector.cycles()[0].modules(), ids(&["a"]).as_slice());
        assert_eq!(detector.cycles()[0].closed_path().len(), 2);
    }

    #[test]
    fn test_cycle_starts_at_smallest_module() {
        // created in the order c, a, b so the search does not start at `a`
        let detector = TestGraph::new(&["c", "a", "b"])
            .edge(0, 1)
            .edge(1, 2)
            .edge(2, 0)
            .detect();

        assert_eq!(detector.cycle_count(), 1);
        assert_eq!(detector.cycles()[0].modules(), ids(&["a", "b", "c"]).as_slice());
    }

    #[test]
    fn test_all_simple_cycles_in_component() {
        // a <-> b, b <-> c, a -> c
        let detector = TestGraph::new(&["a", "b", "c"])
            .edge(0, 1)
            .edge(1, 0)
            .edge(1, 2)
            .edge(2, 1)
            .edge(0, 2)
            .detect();

        let found: Vec<Vec<ModuleId>> = detector
            .cycles()
            .iter()
            .map(|c| c.modules().to_vec())
            .collect();
        assert_eq!(
            found,
            vec![
                ids(&["a", "b"]),
                ids(&["a", "c", "b"]),
                ids(&["b", "c"]),
            ]
        );
    }

    #[test]
    fn test_complete_graph_cycle_count() {
        // K4 has 20 simple directed cycles: 6 of length 2, 8 of length 3,
        // 6 of length 4
        let mut graph = TestGraph::new(&["a", "b", "c", "d"]);
        for from in 0..4 {
            for to in 0..4 {
                if from != to {
                    graph = graph.edge(from, to);
                }
            }
        }
        let detector = graph.detect();

        assert_eq!(detector.cycle_count(), 20);
        let unique: HashSet<Vec<ModuleId>> = detector
            .cycles()
            .iter()
            .map(|c| c.modules().to_vec())
            .collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_parallel_edges_do_not_duplicate_cycles() {
        let detector = TestGraph::new(&["a", "b"])
            .edge(0, 1)
            .edge(0, 1)
            .edge(1, 0)
            .detect();

        assert_eq!(detector.cycle_count(), 1);
    }

    #[test]
    fn test_separate_components() {
        let detector = TestGraph::new(&["a", "b", "c", "d", "e"])
            .edge(0, 1)
            .edge(1, 0)
            .edge(1, 2)
            .edge(2, 3)
            .edge(3, 2)
            .edge(3, 4)
            .detect();

        assert_eq!(detector.cycle_count(), 2);
        for cycle in detector.cycles() {
            let closed = cycle.closed_path();
            assert_eq!(closed.first(), closed.last());
        }
    }

    #[test]
    fn test_max_cycles_truncates() {
        let mut graph = TestGraph::new(&["a", "b", "c"]);
        for from in 0..3 {
            for to in 0..3 {
                if from != to {
                    graph = graph.edge(from, to);
                }
            }
        }
        let mut detector = CycleDetector::with_limits(CycleLimits {
            max_cycles: Some(2),
            max_length: None,
        });
        detector.detect_cycles(&graph.graph);

        assert_eq!(detector.cycle_count(), 2);
        assert!(detector.is_truncated());
    }

    #[test]
    fn test_max_length_drops_long_cycles() {
        // a -> b -> c -> a plus a <-> b
        let graph = TestGraph::new(&["a", "b", "c"])
            .edge(0, 1)
            .edge(1, 2)
            .edge(2, 0)
            .edge(1, 0);
        let mut detector = CycleDetector::with_limits(CycleLimits {
            max_cycles: None,
            max_length: Some(2),
        });
        detector.detect_cycles(&graph.graph);

        assert_eq!(detector.cycle_count(), 1);
        assert_eq!(detector.cycles()[0].modules(), ids(&["a", "b"]).as_slice());
        assert!(detector.is_truncated());
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let cycle = ModuleCycle::new(ids(&["c", "a", "b"]), Vec::new()).canonicalize();
        assert_eq!(cycle.modules(), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(cycle.clone().canonicalize(), cycle);
    }

    #[test]
    fn test_cycle_edge_uses_first_reference() {
        let mut graph = TestGraph::new(&["a", "b"]).edge(1, 0);
        graph.graph.add_edge(
            NodeIndex::new(0),
            NodeIndex::new(1),
            ImportEdge {
                specifier: "./b.js".to_string(),
                kind: ReferenceKind::Require,
                order: 1,
            },
        );
        graph.graph.add_edge(
            NodeIndex::new(0),
            NodeIndex::new(1),
            ImportEdge {
                specifier: "./b".to_string(),
                kind: ReferenceKind::Import,
                order: 0,
            },
        );

        let detector = graph.detect();
        assert_eq!(detector.cycles()[0].edges()[0].specifier, "./b");
    }
}
