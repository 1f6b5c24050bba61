//! The durable node handle.
//!
//! A [`NodePointer`] survives edits and tree regeneration through a two-tier
//! scheme: a weak cache of the last-resolved node, consulted first, and the
//! pointer's restoration strategy, consulted on miss. A successful resolve
//! refreshes the cache so repeated calls are O(1) until the tree changes
//! again.
//!
//! Resolution never returns a node of a different kind than the one recorded
//! at creation time, and never returns a node that reports itself invalid.
//! Both cases, like plain not-found, surface as `None`.

use crate::document::FileKey;
use crate::info::ElementInfo;
use crate::range::NodeRange;
use crate::tree::{NodeHandle, TreeNode, TreeProvider, same_node};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Durable handle to a node in a mutable tree.
///
/// Obtained from [`PointerScope::pointer_for`](crate::PointerScope::pointer_for);
/// the scope guarantees at most one live pointer per distinct node.
///
/// Equality is "points to the same logical node": both sides are resolved
/// (using their caches when fresh) and the restored nodes compared by
/// identity. Two pointers created independently, at different times, for the
/// same node compare equal. `NodePointer` deliberately does not implement
/// `Hash` — equality depends on the current tree, not on stored coordinates.
pub struct NodePointer {
    provider: Arc<dyn TreeProvider>,
    info: ElementInfo,
    /// Node kind recorded at creation time.
    kind: String,
    /// Weak cache of the last-resolved node.
    cached: Mutex<Option<Weak<dyn TreeNode>>>,
    disposed: AtomicBool,
}

impl NodePointer {
    pub(crate) fn new(
        provider: Arc<dyn TreeProvider>,
        info: ElementInfo,
        node: &NodeHandle,
    ) -> Self {
        Self {
            provider,
            info,
            kind: node.kind().to_string(),
            cached: Mutex::new(Some(Arc::downgrade(node))),
            disposed: AtomicBool::new(false),
        }
    }

    /// The node kind this pointer was created for.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Resolve the pointer to a live node.
    ///
    /// Returns `None` when the node cannot be located, was structurally
    /// replaced, changed kind, or reports itself invalid — all expected
    /// outcomes after the tree changed shape, never errors.
    pub fn resolve(&self) -> Option<NodeHandle> {
        if self.disposed.load(Ordering::Acquire) {
            return None;
        }
        if let Some(node) = self.cached_node() {
            return Some(node);
        }

        let restored = self
            .info
            .restore(self.provider.as_ref())
            .filter(|node| node.kind() == self.kind && node.is_valid());

        let mut cached = self.cached.lock().unwrap();
        *cached = restored.as_ref().map(Arc::downgrade);
        restored
    }

    /// The file containing the pointed-to node, if it can be determined.
    ///
    /// Prefers the cached node, then the strategy's still-valid file, and
    /// finally falls back to resolving the node and asking it directly.
    pub fn containing_file(&self) -> Option<FileKey> {
        if let Some(node) = self.cached_node() {
            return node.containing_file();
        }
        if let Some(file) = self.info.virtual_file() {
            if self.provider.is_file_valid(file) {
                return Some(file);
            }
        }
        self.resolve().and_then(|node| node.containing_file())
    }

    /// The file the pointer's stored coordinates live in, without resolving.
    pub fn virtual_file(&self) -> Option<FileKey> {
        self.info.virtual_file()
    }

    /// The current (edit-adjusted) stored range, if the strategy keeps one.
    pub fn range(&self) -> Option<NodeRange> {
        self.info.range()
    }

    /// Dispose the pointer: release the strategy's held references and stop
    /// delivering edit notifications to it. A disposed pointer resolves to
    /// `None` forever.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.info.dispose();
        self.cached.lock().unwrap().take();
    }

    /// Whether the pointer has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Upgrade the weak cache, filtering nodes the tree has invalidated.
    fn cached_node(&self) -> Option<NodeHandle> {
        let cached = self.cached.lock().unwrap();
        cached
            .as_ref()
            .and_then(Weak::upgrade)
            .filter(|node| node.is_valid())
    }

    pub(crate) fn info(&self) -> &ElementInfo {
        &self.info
    }
}

/// Resolution-based comparison shared by `PartialEq` and
/// [`PointerScope::point_to_same_element`](crate::PointerScope::point_to_same_element).
pub(crate) fn point_to_same_element(a: &NodePointer, b: &NodePointer) -> bool {
    match (a.resolve(), b.resolve()) {
        (Some(left), Some(right)) => same_node(&left, &right),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for NodePointer {
    fn eq(&self, other: &Self) -> bool {
        point_to_same_element(self, other)
    }
}

impl Eq for NodePointer {}

impl std::fmt::Debug for NodePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodePointer")
            .field("kind", &self.kind)
            .field("virtual_file", &self.info.virtual_file())
            .field("range", &self.info.range())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
