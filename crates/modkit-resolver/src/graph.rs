//! Reason graph of a finished resolution.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use modkit_core::module::ModuleKey;

use crate::reason::SelectionReason;
use crate::resolver::RelationshipResolver;

/// A node: the user's request itself, or a resolved module.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ReasonNode {
    Root,
    Module(ModuleKey),
}

impl ReasonNode {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Module(key) => Some(&key.identifier),
        }
    }
}

impl fmt::Display for ReasonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("(requested)"),
            Self::Module(key) => write!(f, "{key}"),
        }
    }
}

/// Edge label: the relationship that pulled the target in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonEdge {
    Requested,
    Depends,
    Recommends,
    Suggests,
}

impl ReasonEdge {
    fn suffix(self) -> &'static str {
        match self {
            Self::Requested | Self::Depends => "",
            Self::Recommends => " (recommended)",
            Self::Suggests => " (suggested)",
        }
    }
}

/// Parent-to-child view of why each module was selected.
pub struct ReasonGraph {
    graph: DiGraph<ReasonNode, ReasonEdge>,
    /// Identifier to node index.
    index: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl ReasonGraph {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(ReasonNode::Root);
        Self {
            graph,
            index: HashMap::new(),
            root,
        }
    }

    /// Build the graph from every module in `resolver`, optional ones and
    /// metapackages included.
    pub fn from_resolver(resolver: &RelationshipResolver) -> Self {
        let mut g = Self::new();
        let modules = resolver.selected();
        for module in modules {
            g.add_module(module.key());
        }
        for module in modules {
            let child = g.add_module(module.key());
            for reason in resolver.reasons_for(&module.identifier) {
                let (parent, edge) = match reason {
                    SelectionReason::UserRequested => (g.root, ReasonEdge::Requested),
                    SelectionReason::Installed => continue,
                    SelectionReason::Depends(p) => (g.add_module(p.clone()), ReasonEdge::Depends),
                    SelectionReason::Recommended(p) => {
                        (g.add_module(p.clone()), ReasonEdge::Recommends)
                    }
                    SelectionReason::Suggested(p) => (g.add_module(p.clone()), ReasonEdge::Suggests),
                };
                g.add_edge(parent, child, edge);
            }
        }
        g
    }

    /// Add or retrieve the node for `key`'s identifier.
    pub fn add_module(&mut self, key: ModuleKey) -> NodeIndex {
        if let Some(&idx) = self.index.get(&key.identifier) {
            return idx;
        }
        let identifier = key.identifier.clone();
        let idx = self.graph.add_node(ReasonNode::Module(key));
        self.index.insert(identifier, idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: ReasonEdge) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn find(&self, identifier: &str) -> Option<NodeIndex> {
        self.index.get(identifier).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &ReasonNode {
        &self.graph[idx]
    }

    /// Children of a node, in insertion order.
    pub fn selected_by(&self, idx: NodeIndex) -> Vec<(NodeIndex, ReasonEdge)> {
        let mut out: Vec<(NodeIndex, ReasonEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
            .collect();
        out.sort_by_key(|(n, _)| n.index());
        out
    }

    /// Parents of a node, in insertion order.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, ReasonEdge)> {
        let mut out: Vec<(NodeIndex, ReasonEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
            .collect();
        out.sort_by_key(|(n, _)| n.index());
        out
    }

    /// Render the selection tree below the user's requests.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let mut visited = HashSet::from([self.root]);
        let children = self.selected_by(self.root);
        let count = children.len();
        for (i, (idx, edge)) in children.into_iter().enumerate() {
            self.print_subtree(&mut output, idx, edge, "", i == count - 1, 1, max_depth, &mut visited);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: ReasonEdge,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}{}\n", edge.suffix()));

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let children = self.selected_by(idx);
        let count = children.len();
        for (i, (child, edge)) in children.into_iter().enumerate() {
            self.print_subtree(
                output,
                child,
                edge,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// A path from the user's requests down to `identifier`.
    pub fn why(&self, identifier: &str) -> Option<Vec<&ReasonNode>> {
        let target = self.find(identifier)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (child, _) in self.selected_by(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Render everything that led to `identifier`, walking up to the root.
    pub fn print_inverted_tree(&self, identifier: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(identifier) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::from([idx]);
        let parents = self.dependents_of(idx);
        let count = parents.len();
        for (i, (parent, edge)) in parents.into_iter().enumerate() {
            self.print_inverted_subtree(&mut output, parent, edge, "", i == count - 1, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: ReasonEdge,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}{}\n", self.graph[idx], edge.suffix()));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let parents = self.dependents_of(idx);
        let count = parents.len();
        for (i, (parent, edge)) in parents.into_iter().enumerate() {
            self.print_inverted_subtree(output, parent, edge, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }

    /// Number of module nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReasonGraph {
    fn default() -> Self {
        Self::new()
    }
}
