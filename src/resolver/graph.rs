//! The resolved dependency graph.
//!
//! Once resolution completes the graph is read-only: one node per package
//! name, each carrying the chosen summary and its frozen configuration
//! snapshot. Iteration orders are stable so downstream consumers
//! (generation, builds, printing) are deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Topo;

use crate::core::{ConfigSnapshot, PackageId, RecipeSummary};

/// One resolved package: summary plus frozen configuration.
#[derive(Debug, Clone)]
pub struct PackageNode {
    summary: RecipeSummary,
    snapshot: ConfigSnapshot,
}

impl PackageNode {
    /// Get the package ID.
    pub fn id(&self) -> &PackageId {
        self.summary.package_id()
    }

    /// Get the recipe summary.
    pub fn summary(&self) -> &RecipeSummary {
        &self.summary
    }

    /// Get the frozen configuration snapshot.
    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }
}

/// The resolved package graph.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    /// Edge structure; an edge a -> b means a requires b
    graph: DiGraph<PackageId, ()>,

    /// Map from PackageId to node index
    pkg_to_node: HashMap<PackageId, NodeIndex>,

    /// Map from package name to PackageId (single version per name)
    name_to_pkg: BTreeMap<String, PackageId>,

    /// Node payloads, ordered by PackageId
    nodes: BTreeMap<PackageId, PackageNode>,

    /// The root package, when this graph has one
    root: Option<PackageId>,
}

impl PackageGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        PackageGraph::default()
    }

    /// Add a package to the graph. Adding an existing ID is a no-op.
    pub fn add_package(&mut self, summary: RecipeSummary, snapshot: ConfigSnapshot) {
        let pkg_id = summary.package_id().clone();
        if self.pkg_to_node.contains_key(&pkg_id) {
            return;
        }

        let node = self.graph.add_node(pkg_id.clone());
        self.pkg_to_node.insert(pkg_id.clone(), node);
        self.name_to_pkg
            .insert(summary.name().to_string(), pkg_id.clone());
        self.nodes
            .insert(pkg_id, PackageNode { summary, snapshot });
    }

    /// Mark a package as the graph root.
    pub fn set_root(&mut self, pkg_id: PackageId) {
        self.root = Some(pkg_id);
    }

    /// Get the root package ID.
    pub fn root(&self) -> Option<&PackageId> {
        self.root.as_ref()
    }

    /// Get the root node.
    pub fn root_node(&self) -> Option<&PackageNode> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    /// Add a requirement edge between packages.
    pub fn add_edge(&mut self, from: &PackageId, to: &PackageId) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.pkg_to_node.get(from), self.pkg_to_node.get(to))
        {
            if !self.graph.contains_edge(from_node, to_node) {
                self.graph.add_edge(from_node, to_node, ());
            }
        }
    }

    /// Get a package ID by name.
    pub fn package_by_name(&self, name: &str) -> Option<&PackageId> {
        self.name_to_pkg.get(name)
    }

    /// Get the node for a package.
    pub fn get(&self, pkg_id: &PackageId) -> Option<&PackageNode> {
        self.nodes.get(pkg_id)
    }

    /// Iterate over all packages ordered by ID.
    pub fn packages(&self) -> impl Iterator<Item = (&PackageId, &PackageNode)> {
        self.nodes.iter()
    }

    /// Iterate over all non-root packages ordered by ID.
    pub fn dependencies(&self) -> impl Iterator<Item = (&PackageId, &PackageNode)> {
        self.nodes
            .iter()
            .filter(move |(id, _)| self.root.as_ref() != Some(id))
    }

    /// Get the number of packages.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a package with the given name is present.
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_to_pkg.contains_key(name)
    }

    /// Get direct dependencies of a package, sorted by ID.
    pub fn deps(&self, pkg_id: &PackageId) -> Vec<PackageId> {
        let Some(&node) = self.pkg_to_node.get(pkg_id) else {
            return Vec::new();
        };
        let mut deps: Vec<PackageId> = self.graph.neighbors(node).map(|n| self.graph[n].clone()).collect();
        deps.sort();
        deps
    }

    /// Get packages that directly depend on the given package, sorted by ID.
    pub fn dependents(&self, pkg_id: &PackageId) -> Vec<PackageId> {
        let Some(&node) = self.pkg_to_node.get(pkg_id) else {
            return Vec::new();
        };
        let mut dependents: Vec<PackageId> = self
            .graph
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        dependents.sort();
        dependents
    }

    /// Get packages in topological order (dependencies before dependents).
    pub fn topological_order(&self) -> Vec<PackageId> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::new();

        while let Some(node) = topo.next(&self.graph) {
            order.push(self.graph[node].clone());
        }

        // Topo yields a before b for an edge a -> b; an edge means "a
        // requires b", so reverse to put dependencies first.
        order.reverse();
        order
    }

    /// Find a dependency cycle, if any.
    ///
    /// Returns the packages along one cycle, starting and ending at the
    /// same name, chosen deterministically.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let sccs = petgraph::algo::tarjan_scc(&self.graph);
        for scc in sccs {
            let cyclic = scc.len() > 1
                || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0]));
            if cyclic {
                return Some(self.cycle_path(&scc));
            }
        }
        None
    }

    /// Reconstruct a walk around one strongly connected component.
    fn cycle_path(&self, scc: &[NodeIndex]) -> Vec<String> {
        let members: BTreeSet<NodeIndex> = scc.iter().copied().collect();
        let Some(start) = scc
            .iter()
            .copied()
            .min_by(|a, b| self.graph[*a].cmp(&self.graph[*b]))
        else {
            return Vec::new();
        };
        let name_of = |n: NodeIndex| self.graph[n].name().to_string();

        // Shortest path from a successor of start back to start.
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        let mut successors: Vec<NodeIndex> = self
            .graph
            .neighbors(start)
            .filter(|n| members.contains(n))
            .collect();
        successors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for next in successors {
            if next == start {
                // Self-requirement
                return vec![name_of(start), name_of(start)];
            }
            parent.entry(next).or_insert(start);
            queue.push_back(next);
        }

        while let Some(node) = queue.pop_front() {
            let mut nexts: Vec<NodeIndex> = self
                .graph
                .neighbors(node)
                .filter(|n| members.contains(n))
                .collect();
            nexts.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

            for next in nexts {
                if next == start {
                    let mut chain = vec![node];
                    let mut current = node;
                    while current != start {
                        current = parent[&current];
                        chain.push(current);
                    }
                    chain.reverse();
                    let mut names: Vec<String> = chain.into_iter().map(name_of).collect();
                    names.push(name_of(start));
                    return names;
                }
                if !parent.contains_key(&next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        // A strongly connected component always closes; this is a guard for
        // corrupted state.
        scc.iter().map(|&n| name_of(n)).collect()
    }
}
