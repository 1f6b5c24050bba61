//! Host tree contract.
//!
//! The pointer core never owns or builds trees; it observes nodes provided by
//! the host through two narrow traits:
//!
//! - [`TreeNode`]: one node of a derived tree (kind, validity, range,
//!   containing file, children)
//! - [`TreeProvider`]: derives the current tree for a file and answers
//!   file-level questions (validity, injected-document topology)
//!
//! Node handles are `Arc<dyn TreeNode>`; node identity is allocation identity.
//! A host that rebuilds its tree after an edit hands out fresh allocations, so
//! stale handles are detected by [`TreeNode::is_valid`] rather than by
//! comparing contents.

use crate::document::FileKey;
use crate::range::NodeRange;
use std::sync::Arc;

/// Shared handle to a host tree node.
pub type NodeHandle = Arc<dyn TreeNode>;

/// One node of a host-derived tree.
///
/// Implementations are expected to be cheap to query; restoration walks
/// children repeatedly.
pub trait TreeNode: Send + Sync {
    /// The node's concrete kind/category name (e.g. a syntax kind).
    ///
    /// Restoration never returns a node whose kind differs from the kind the
    /// pointer recorded at creation time.
    fn kind(&self) -> &str;

    /// Whether the node is still part of a live tree.
    ///
    /// A node becomes invalid when its subtree is deleted or replaced by a
    /// re-parse; resolution treats invalid nodes as absent.
    fn is_valid(&self) -> bool;

    /// The node's character range within its containing document, if it has
    /// a physical position.
    fn range(&self) -> Option<NodeRange>;

    /// The file this node belongs to, if any.
    fn containing_file(&self) -> Option<FileKey>;

    /// Child nodes, in document order.
    fn children(&self) -> Vec<NodeHandle>;

    /// Whether the node is backed by real document text.
    ///
    /// Compiled or synthesized nodes report `false`; they have no stable
    /// coordinate system and get a hard (strong-reference) pointer.
    fn is_physical(&self) -> bool {
        true
    }

    /// Whether the node represents a whole file (the tree root standing for
    /// the file itself).
    fn is_file_root(&self) -> bool {
        false
    }
}

/// Host-side tree derivation and file topology.
pub trait TreeProvider: Send + Sync {
    /// Derive (or fetch the cached) current tree for a file, returning its
    /// root node. `None` if the file no longer exists.
    fn derive_tree(&self, file: FileKey) -> Option<NodeHandle>;

    /// Whether the file still exists and can be derived from.
    fn is_file_valid(&self, file: FileKey) -> bool;

    /// For an injected (nested) document: the host file and the character
    /// range of the hosting fragment within it. `None` for top-level files.
    fn injection_host(&self, file: FileKey) -> Option<(FileKey, NodeRange)> {
        let _ = file;
        None
    }

    /// The injected document hosted by the given node, if any.
    fn injected_file(&self, host: &NodeHandle) -> Option<FileKey> {
        let _ = host;
        None
    }
}

/// Check whether two handles refer to the same node allocation.
pub fn same_node(a: &NodeHandle, b: &NodeHandle) -> bool {
    node_key(a) == node_key(b)
}

/// Identity key of a node allocation, usable as a map key while the node is
/// alive. Compares data pointers only, so handles with distinct vtable copies
/// still agree.
pub(crate) fn node_key(node: &NodeHandle) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

/// Find the innermost node whose range equals `range` exactly, descending
/// from `root`.
///
/// When `kind` is given, only nodes of that kind match. The search follows
/// the unique containment chain: at each level it descends into the first
/// child whose range contains the target, remembering the deepest exact
/// match seen on the way down. If no node matches exactly, the result is
/// `None` — restoration never guesses a best-effort neighbor.
pub fn find_node_at(root: &NodeHandle, range: NodeRange, kind: Option<&str>) -> Option<NodeHandle> {
    let mut best: Option<NodeHandle> = None;
    let mut current = Arc::clone(root);

    loop {
        if current.range() == Some(range) && kind.is_none_or(|k| current.kind() == k) {
            best = Some(Arc::clone(&current));
        }
        let next = current.children().into_iter().find(|child| {
            child
                .range()
                .is_some_and(|child_range| child_range.contains_range(range))
        });
        match next {
            Some(child) => current = child,
            None => break,
        }
    }

    best
}
