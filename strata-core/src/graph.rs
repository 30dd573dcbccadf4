//! Dependency graph management using petgraph.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::Package;
use crate::runtime::check_duplicates;
use crate::workspace::Workspace;

/// Directed graph of package dependencies.
///
/// Edges point from a dependency (parent) to its dependent (child), so
/// parents always come before children in [`PackageGraph::consume_tree`].
#[derive(Debug, Clone)]
pub struct PackageGraph {
    graph: DiGraph<Package, ()>,
    node_map: HashMap<Package, NodeIndex>,
}

/// A package in a [`PackageGraph`] together with its links.
///
/// Equality and hashing only consider the wrapped package, never the links.
#[derive(Clone, Copy)]
pub struct Node<'g> {
    graph: &'g PackageGraph,
    index: NodeIndex,
}

impl<'g> Node<'g> {
    #[inline]
    pub fn package(&self) -> &'g Package {
        &self.graph.graph[self.index]
    }

    /// Packages this node depends on.
    pub fn parents(&self) -> impl Iterator<Item = Node<'g>> + 'g {
        self.neighbors(Direction::Incoming)
    }

    /// Packages depending on this node.
    pub fn children(&self) -> impl Iterator<Item = Node<'g>> + 'g {
        self.neighbors(Direction::Outgoing)
    }

    fn neighbors(&self, direction: Direction) -> impl Iterator<Item = Node<'g>> + 'g {
        let graph = self.graph;
        graph
            .graph
            .neighbors_directed(self.index, direction)
            .map(move |index| Node { graph, index })
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.package() == other.package()
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package().hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.package().label_path())
    }
}

impl PackageGraph {
    /// Builds the graph of every package in `workspace` from their explicit and
    /// runtime-derived dependencies.
    pub fn build(workspace: &Workspace) -> Result<Self> {
        Self::from_dependencies(workspace.packages()?, |package| package.depends_on(workspace))
    }

    /// Builds a graph over `packages`, asking `dependencies` for the parents of
    /// each one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if a dependency is not one of
    /// `packages`, and [`Error::DuplicateDependency`] if a package lists the same
    /// dependency twice.
    pub fn from_dependencies<F>(packages: &[Package], mut dependencies: F) -> Result<Self>
    where
        F: FnMut(&Package) -> Result<Vec<Package>>,
    {
        let mut graph = DiGraph::with_capacity(packages.len(), packages.len());
        let mut node_map = HashMap::with_capacity(packages.len());

        for package in packages {
            if !node_map.contains_key(package) {
                let index = graph.add_node(package.clone());
                node_map.insert(package.clone(), index);
            }
        }

        let mut parents: Vec<(NodeIndex, Vec<NodeIndex>)> = Vec::with_capacity(node_map.len());
        for index in graph.node_indices() {
            let package = &graph[index];
            let deps = dependencies(package)?;
            check_duplicates(package, "dependencies", &deps)?;

            let resolved = deps
                .iter()
                .map(|dep| {
                    node_map.get(dep).copied().ok_or_else(|| {
                        Error::PackageNotFound(format!(
                            "{} (dependency of {})",
                            dep.label_path(),
                            package.label_path()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            parents.push((index, resolved));
        }

        for (child, parent_indices) in parents {
            for parent in parent_indices {
                graph.add_edge(parent, child, ());
            }
        }

        debug!(
            packages = graph.node_count(),
            edges = graph.edge_count(),
            "built package graph"
        );
        Ok(Self { graph, node_map })
    }

    /// Returns a new graph with every edge reversed.
    ///
    /// Running over the inverted graph visits dependents before their
    /// dependencies, e.g. for `clean`.
    pub fn invert(&self) -> Self {
        let mut graph = self.graph.clone();
        graph.reverse();
        Self {
            graph,
            node_map: self.node_map.clone(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, package: &Package) -> Option<Node<'_>> {
        self.node_map
            .get(package)
            .map(|&index| Node { graph: self, index })
    }

    /// Every node, in the order the packages were given.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        self.graph
            .node_indices()
            .map(move |index| Node { graph: self, index })
    }

    /// Visits every node after all of its parents, calling `apply` with the node
    /// and its level (the length of the longest chain of parents above it).
    ///
    /// `apply` may return any iterable; the results are flattened. Nodes sharing
    /// a level are visited in package order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if some nodes can never be visited.
    pub fn consume_tree<'g, F, I>(&'g self, mut apply: F) -> Result<Vec<I::Item>>
    where
        F: FnMut(Node<'g>, usize) -> I,
        I: IntoIterator,
    {
        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut current: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|index| pending[index.index()] == 0)
            .collect();

        let mut results = Vec::new();
        let mut visited = 0;
        let mut level = 0;

        while !current.is_empty() {
            let mut next = Vec::new();
            for &index in &current {
                visited += 1;
                results.extend(apply(Node { graph: self, index }, level));

                for child in self.graph.neighbors_directed(index, Direction::Outgoing) {
                    pending[child.index()] -= 1;
                    if pending[child.index()] == 0 {
                        next.push(child);
                    }
                }
            }
            next.sort();
            current = next;
            level += 1;
        }

        if visited < self.graph.node_count() {
            let stuck: Vec<&str> = self
                .graph
                .node_indices()
                .filter(|index| pending[index.index()] > 0)
                .map(|index| self.graph[index].label_path())
                .collect();
            return Err(Error::CycleDetected(stuck.join(", ")));
        }

        Ok(results)
    }

    /// Every package, dependencies before dependents.
    pub fn order(&self) -> Result<Vec<Package>> {
        self.consume_tree(|node, _| Some(node.package().clone()))
    }

    /// Transitive dependencies of `package`, excluding itself.
    pub fn ancestors(&self, package: &Package) -> Vec<Package> {
        self.expand(std::slice::from_ref(package), true, false)
            .into_iter()
            .filter(|p| p != package)
            .collect()
    }

    /// Transitive dependents of `package`, excluding itself.
    pub fn descendants(&self, package: &Package) -> Vec<Package> {
        self.expand(std::slice::from_ref(package), false, true)
            .into_iter()
            .filter(|p| p != package)
            .collect()
    }

    /// Grows `initial` with the ancestors (dependencies) and/or descendants
    /// (dependents) of each package, transitively.
    ///
    /// Packages unknown to the graph are ignored. Each package appears once.
    pub fn expand(
        &self,
        initial: &[Package],
        with_ancestors: bool,
        with_descendants: bool,
    ) -> Vec<Package> {
        fn recurse<'g>(
            node: Node<'g>,
            with_ancestors: bool,
            with_descendants: bool,
            seen: &mut HashSet<Node<'g>>,
            packages: &mut Vec<Package>,
        ) {
            if !seen.insert(node) {
                return;
            }
            packages.push(node.package().clone());

            if with_ancestors {
                for parent in node.parents() {
                    recurse(parent, with_ancestors, with_descendants, seen, packages);
                }
            }
            if with_descendants {
                for child in node.children() {
                    recurse(child, with_ancestors, with_descendants, seen, packages);
                }
            }
        }

        let mut seen = HashSet::new();
        let mut packages = Vec::new();
        for node in initial.iter().filter_map(|package| self.node(package)) {
            recurse(node, with_ancestors, with_descendants, &mut seen, &mut packages);
        }
        packages
    }
}
