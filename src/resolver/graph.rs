//! The dependency graph and its construction.
//!
//! Edges point from a dependency to its dependent: `a -> b` means `b`
//! requires `a`, so `a` must be built first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, trace};

use crate::core::PackageRef;
use crate::resolver::errors::ResolveError;
use crate::resolver::introspect::RecipeIntrospector;

/// Directed graph of packages to build.
///
/// Node indices follow discovery order, which is what makes the
/// topological order reproducible.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PackageRef, ()>,
    nodes: HashMap<PackageRef, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Add a package. Adding an existing package is a no-op.
    pub fn add_node(&mut self, pkg: PackageRef) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&pkg) {
            return idx;
        }
        let idx = self.graph.add_node(pkg.clone());
        self.nodes.insert(pkg, idx);
        idx
    }

    /// Record that `dependent` requires `dependency`.
    ///
    /// Both nodes are added if missing. Self-loops and duplicate edges are
    /// ignored.
    pub fn add_edge(&mut self, dependency: &PackageRef, dependent: &PackageRef) {
        if dependency == dependent {
            return;
        }
        let from = self.add_node(dependency.clone());
        let to = self.add_node(dependent.clone());
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Every `(dependency, dependent)` pair.
    pub fn edges(&self) -> Vec<(&PackageRef, &PackageRef)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .collect();
        edges.sort();
        edges
            .into_iter()
            .map(|(from, to)| (&self.graph[from], &self.graph[to]))
            .collect()
    }

    /// Find a dependency cycle, if any.
    ///
    /// The cycle is returned in "requires" order and repeats its first
    /// package at the end: `[a, b, a]` means `a` requires `b` requires `a`.
    pub fn find_cycle(&self) -> Option<Vec<PackageRef>> {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .min_by_key(|scc| scc.iter().min().copied())?;

        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let start = *component.iter().min()?;

        // Breadth-first over dependencies until we get back to the start.
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let mut deps: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .filter(|n| members.contains(n))
                .collect();
            deps.sort();

            for dep in deps {
                if dep == start {
                    let mut path = vec![start];
                    let mut node = current;
                    let mut tail = Vec::new();
                    while node != start {
                        tail.push(node);
                        node = parent[&node];
                    }
                    path.extend(tail.into_iter().rev());
                    path.push(start);
                    return Some(path.into_iter().map(|n| self.graph[n].clone()).collect());
                }
                if dep != start && !parent.contains_key(&dep) {
                    parent.insert(dep, current);
                    queue.push_back(dep);
                }
            }
        }

        None
    }

    /// Order every package so that dependencies come before dependents.
    ///
    /// Among packages that are ready at the same time, the one discovered
    /// first wins, so the same graph always yields the same order.
    pub fn topological_order(&self) -> Result<Vec<PackageRef>, ResolveError> {
        let mut pending: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let count = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, count)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = pending
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx].clone());
            for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(self.cycle_error());
        }

        Ok(order)
    }

    fn cycle_error(&self) -> ResolveError {
        let cycle = self
            .find_cycle()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        ResolveError::CyclicDependency { cycle }
    }
}

/// Expands a set of seed packages into their full dependency graph.
pub struct DependencyGraphBuilder<'a> {
    introspector: &'a RecipeIntrospector<'a>,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(introspector: &'a RecipeIntrospector<'a>) -> Self {
        DependencyGraphBuilder { introspector }
    }

    /// Discover the transitive dependencies of `seeds`.
    ///
    /// Each package's recipe is evaluated exactly once. Any recipe error
    /// aborts the build; so does a cycle, and no partial graph is returned.
    pub fn build(&self, seeds: &[PackageRef]) -> Result<DependencyGraph, ResolveError> {
        let mut graph = DependencyGraph::new();
        let mut queue: VecDeque<PackageRef> = VecDeque::new();
        let mut discovered: HashMap<PackageRef, Vec<PackageRef>> = HashMap::new();
        let mut required_by: HashMap<PackageRef, PackageRef> = HashMap::new();

        for seed in seeds {
            graph.add_node(seed.clone());
            queue.push_back(seed.clone());
        }

        while let Some(current) = queue.pop_front() {
            if discovered.contains_key(&current) {
                trace!("{} already discovered", current);
                continue;
            }

            let deps = self
                .introspector
                .dependencies_of(&current)
                .map_err(|err| err.required_by(required_by.get(&current)))?;
            debug!("{} requires {:?}", current, deps.iter().map(ToString::to_string).collect::<Vec<_>>());

            for dep in &deps {
                if dep == &current {
                    return Err(ResolveError::CyclicDependency {
                        cycle: vec![current.to_string(), current.to_string()],
                    });
                }

                graph.add_edge(dep, &current);
                required_by
                    .entry(dep.clone())
                    .or_insert_with(|| current.clone());

                if !discovered.contains_key(dep) {
                    queue.push_back(dep.clone());
                }
            }

            discovered.insert(current, deps);
        }

        if graph.find_cycle().is_some() {
            return Err(graph.cycle_error());
        }

        debug!("dependency graph has {} package(s)", graph.len());
        Ok(graph)
    }
}
