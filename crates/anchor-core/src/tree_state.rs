//! UI tree expansion-state capture and restore.
//!
//! A [`TreeState`] is a snapshot of which branches of a UI tree were
//! expanded, recorded as identity chains ([`PathElement`] sequences) rather
//! than as node references. Because the chains carry only stable identity
//! data (key, type name, sibling index, optional raw identity payload), a
//! snapshot can be reapplied after the tree has been rebuilt from scratch —
//! the degenerate form of the pointer restoration problem.
//!
//! Restore is loose by design: each captured path is rematched from the
//! root, the canonical key + type comparison first, with an index- or
//! identity-based fallback selectable by the caller. A path that no longer
//! matches is silently abandoned; branches the tree lost simply stay
//! collapsed.

use std::collections::HashSet;

/// Opaque identifier for a node of a host UI tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UiNodeId(u64);

impl UiNodeId {
    /// Create a node id from a raw numeric identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity data a UI tree reports for one of its nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEntry {
    /// String identity of the node's value (display string when the host has
    /// nothing better).
    pub key: String,
    /// Concrete type/category name of the node's descriptor.
    pub type_name: String,
    /// Optional raw identity payload for nodes lacking a descriptor-based
    /// key.
    pub identity: Option<String>,
}

impl UiEntry {
    /// Create an entry with a key and type name.
    pub fn new(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            identity: None,
        }
    }

    /// Attach a raw identity payload.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }
}

/// Adapter over a host UI tree.
///
/// Paths are slices of node ids from the root to a node, so hosts whose
/// expansion state is keyed by path (rather than by node) can implement the
/// adapter without extra bookkeeping.
pub trait UiTree {
    /// The tree root.
    fn root(&self) -> UiNodeId;

    /// Children of a node, in display order.
    fn children(&self, node: UiNodeId) -> Vec<UiNodeId>;

    /// Identity data for a node.
    fn entry(&self, node: UiNodeId) -> UiEntry;

    /// Whether the path's last node is expanded.
    fn is_expanded(&self, path: &[UiNodeId]) -> bool;

    /// Expand the path's last node.
    fn expand(&mut self, path: &[UiNodeId]);
}

/// One hop of a captured expansion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    /// Captured identity key.
    pub key: String,
    /// Captured descriptor type name.
    pub type_name: String,
    /// Position among siblings at capture time. `None` after a persisted
    /// round trip — the index is capture-time-only and is not serialized.
    pub index: Option<usize>,
    /// Optional raw identity payload.
    pub identity: Option<String>,
}

impl PathElement {
    /// Canonical match: key and type name both equal.
    pub fn matches_entry(&self, entry: &UiEntry) -> bool {
        self.key == entry.key && self.type_name == entry.type_name
    }

    /// Alternate match by sibling position.
    pub fn matches_index(&self, index: usize) -> bool {
        self.index == Some(index)
    }

    /// Alternate match by raw identity payload.
    pub fn matches_identity(&self, entry: &UiEntry) -> bool {
        self.identity.is_some() && self.identity == entry.identity
    }
}

/// Alternate matcher applied when the canonical key + type match fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFallback {
    /// Canonical matching only.
    #[default]
    None,
    /// Fall back to the captured sibling index.
    Index,
    /// Fall back to the raw identity payload.
    Identity,
}

/// Snapshot of a UI tree's expanded paths.
///
/// Immutable once captured; restore never mutates the state, so one snapshot
/// can be applied to several rebuilt trees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeState {
    paths: Vec<Vec<PathElement>>,
}

impl TreeState {
    /// Build a state from raw paths (used by persistence round trips).
    pub fn from_paths(paths: Vec<Vec<PathElement>>) -> Self {
        Self { paths }
    }

    /// The captured paths, outermost hop first, in capture order.
    pub fn paths(&self) -> &[Vec<PathElement>] {
        &self.paths
    }

    /// Whether no path was captured.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Capture every expanded path of the tree.
    pub fn capture(tree: &dyn UiTree) -> Self {
        let root = tree.root();
        let mut paths = Vec::new();
        let mut node_path = vec![root];
        let mut chain = vec![element_for(tree, root, 0)];
        collect_expanded(tree, &mut node_path, &mut chain, &mut paths);
        Self { paths }
    }

    /// Capture the expanded paths of the subtree at `path` (the chain from
    /// the root to the subtree node, inclusive).
    ///
    /// Captured chains still start at the tree root, so the state can later
    /// be applied either to the whole tree or to the equivalent subtree.
    pub fn capture_under(tree: &dyn UiTree, path: &[UiNodeId]) -> Self {
        let Some(prefix) = prefix_elements(tree, path) else {
            return Self::default();
        };
        let mut paths = Vec::new();
        let mut node_path = path.to_vec();
        let mut chain = prefix;
        collect_expanded(tree, &mut node_path, &mut chain, &mut paths);
        Self { paths }
    }

    /// Reapply the captured expansion to a tree using canonical matching
    /// only.
    pub fn apply_to(&self, tree: &mut dyn UiTree) {
        self.apply_with(tree, MatchFallback::None);
    }

    /// Reapply the captured expansion with the given fallback matcher.
    ///
    /// Paths that fail to match are abandoned silently; nothing below the
    /// last matched ancestor is expanded for them.
    pub fn apply_with(&self, tree: &mut dyn UiTree, fallback: MatchFallback) {
        let root = tree.root();
        for path in &self.paths {
            if path.is_empty() {
                continue;
            }
            let mut node_path = vec![root];
            apply_path(tree, path, 0, &mut node_path, 0, fallback);
        }
    }

    /// Reapply the captured expansion starting at the subtree node `path`
    /// points to, aligning each captured chain at that node's depth.
    pub fn apply_under(&self, tree: &mut dyn UiTree, path: &[UiNodeId], fallback: MatchFallback) {
        if path.is_empty() {
            return;
        }
        let position = path.len() - 1;
        let sibling_index = sibling_index_of(tree, path);
        for captured in &self.paths {
            if position >= captured.len() {
                continue;
            }
            let mut node_path = path.to_vec();
            apply_path(tree, captured, position, &mut node_path, sibling_index, fallback);
        }
    }
}

fn element_for(tree: &dyn UiTree, node: UiNodeId, index: usize) -> PathElement {
    let entry = tree.entry(node);
    PathElement {
        key: entry.key,
        type_name: entry.type_name,
        index: Some(index),
        identity: entry.identity,
    }
}

/// Record the current path if expanded, then descend; collapsed branches are
/// neither recorded nor entered.
fn collect_expanded(
    tree: &dyn UiTree,
    node_path: &mut Vec<UiNodeId>,
    chain: &mut Vec<PathElement>,
    out: &mut Vec<Vec<PathElement>>,
) {
    if !tree.is_expanded(node_path) {
        return;
    }
    out.push(chain.clone());
    let node = *node_path.last().expect("node path is never empty");
    for (index, child) in tree.children(node).into_iter().enumerate() {
        node_path.push(child);
        chain.push(element_for(tree, child, index));
        collect_expanded(tree, node_path, chain, out);
        chain.pop();
        node_path.pop();
    }
}

/// Path elements for the chain from the root to `path`'s last node, or
/// `None` when the chain is broken (a hop is not a child of its
/// predecessor).
fn prefix_elements(tree: &dyn UiTree, path: &[UiNodeId]) -> Option<Vec<PathElement>> {
    if path.is_empty() || path[0] != tree.root() {
        return None;
    }
    let mut elements = vec![element_for(tree, path[0], 0)];
    for hop in 1..path.len() {
        let siblings = tree.children(path[hop - 1]);
        let index = siblings.iter().position(|&child| child == path[hop])?;
        elements.push(element_for(tree, path[hop], index));
    }
    Some(elements)
}

fn sibling_index_of(tree: &dyn UiTree, path: &[UiNodeId]) -> usize {
    if path.len() < 2 {
        return 0;
    }
    tree.children(path[path.len() - 2])
        .iter()
        .position(|&child| child == path[path.len() - 1])
        .unwrap_or(0)
}

/// Match one hop and recurse. Returns whether this hop matched; the first
/// matching child terminates the sibling scan, and a non-matching subtree
/// leaves everything below the last matched ancestor untouched.
fn apply_path(
    tree: &mut dyn UiTree,
    path: &[PathElement],
    position: usize,
    node_path: &mut Vec<UiNodeId>,
    sibling_index: usize,
    fallback: MatchFallback,
) -> bool {
    let node = *node_path.last().expect("node path is never empty");
    let entry = tree.entry(node);
    let element = &path[position];

    let matched = element.matches_entry(&entry)
        || match fallback {
            MatchFallback::None => false,
            MatchFallback::Index => element.matches_index(sibling_index),
            MatchFallback::Identity => element.matches_identity(&entry),
        };
    if !matched {
        return false;
    }

    if !tree.is_expanded(node_path) {
        tree.expand(node_path);
    }
    if position + 1 == path.len() {
        return true;
    }

    for (index, child) in tree.children(node).into_iter().enumerate() {
        node_path.push(child);
        let child_matched = apply_path(tree, path, position + 1, node_path, index, fallback);
        node_path.pop();
        if child_matched {
            break;
        }
    }
    true
}

/// In-memory [`UiTree`] implementation.
///
/// A minimal arena-backed tree model for headless hosts and tests; expansion
/// state is kept per node.
#[derive(Debug, Clone, Default)]
pub struct UiTreeModel {
    nodes: Vec<ModelNode>,
}

#[derive(Debug, Clone)]
struct ModelNode {
    entry: UiEntry,
    children: Vec<usize>,
    expanded: bool,
}

impl UiTreeModel {
    /// Create a model with the given root entry (collapsed).
    pub fn new(root: UiEntry) -> Self {
        Self {
            nodes: vec![ModelNode {
                entry: root,
                children: Vec::new(),
                expanded: false,
            }],
        }
    }

    /// Append a child (collapsed) and return its id.
    pub fn add_child(&mut self, parent: UiNodeId, entry: UiEntry) -> UiNodeId {
        let id = self.nodes.len();
        self.nodes.push(ModelNode {
            entry,
            children: Vec::new(),
            expanded: false,
        });
        self.nodes[parent.get() as usize].children.push(id);
        UiNodeId::from_raw(id as u64)
    }

    /// Replace a node's identity data (e.g. after a rename).
    pub fn set_entry(&mut self, node: UiNodeId, entry: UiEntry) {
        self.nodes[node.get() as usize].entry = entry;
    }

    /// Set a node's expansion state directly.
    pub fn set_expanded(&mut self, node: UiNodeId, expanded: bool) {
        self.nodes[node.get() as usize].expanded = expanded;
    }

    /// Collapse every node.
    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = false;
        }
    }

    /// Ids of all currently expanded nodes.
    pub fn expanded_nodes(&self) -> HashSet<UiNodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.expanded)
            .map(|(id, _)| UiNodeId::from_raw(id as u64))
            .collect()
    }
}

impl UiTree for UiTreeModel {
    fn root(&self) -> UiNodeId {
        UiNodeId::from_raw(0)
    }

    fn children(&self, node: UiNodeId) -> Vec<UiNodeId> {
        self.nodes[node.get() as usize]
            .children
            .iter()
            .map(|&id| UiNodeId::from_raw(id as u64))
            .collect()
    }

    fn entry(&self, node: UiNodeId) -> UiEntry {
        self.nodes[node.get() as usize].entry.clone()
    }

    fn is_expanded(&self, path: &[UiNodeId]) -> bool {
        path.last()
            .is_some_and(|node| self.nodes[node.get() as usize].expanded)
    }

    fn expand(&mut self, path: &[UiNodeId]) {
        if let Some(node) = path.last() {
            self.nodes[node.get() as usize].expanded = true;
        }
    }
}
