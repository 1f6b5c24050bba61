//! The pointer scope: per-project registry, cache, and notification hub.
//!
//! A [`PointerScope`] owns a weak table from node identity to pointer. It
//! hands out at most one live pointer per distinct node, which makes pointer
//! equality cheap in the common case (same `Arc`) and correct in the general
//! one (resolution-based comparison). The scope holds no strong reference to
//! nodes and none to pointers: entries disappear once the host drops the
//! node and callers drop the pointer.
//!
//! The scope is also the single subscription point for document changes:
//! [`PointerScope::documents_changed`] fans an applied edit out to every live
//! strategy watching that document, so stored ranges stay shifted without
//! each pointer subscribing individually.

use crate::access::{AccessPolicy, PermissiveAccess};
use crate::document::{DocEdit, DocumentChangeKind, DocumentStore, FileKey};
use crate::info::{ElementInfo, FileInfo, HardInfo, InjectedInfo, RangeInfo, StrategyFactory};
use crate::pointer::{NodePointer, point_to_same_element};
use crate::tree::{NodeHandle, TreeProvider, node_key};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

/// Builder for a [`PointerScope`].
///
/// The access policy and the strategy-factory chain are fixed at scope
/// construction; factories are consulted in registration order.
pub struct ScopeBuilder {
    provider: Arc<dyn TreeProvider>,
    access: Arc<dyn AccessPolicy>,
    factories: Vec<Box<dyn StrategyFactory>>,
}

impl ScopeBuilder {
    /// Start building a scope over the given tree provider.
    pub fn new(provider: Arc<dyn TreeProvider>) -> Self {
        Self {
            provider,
            access: Arc::new(PermissiveAccess),
            factories: Vec::new(),
        }
    }

    /// Use a host access policy instead of [`PermissiveAccess`].
    pub fn access(mut self, access: Arc<dyn AccessPolicy>) -> Self {
        self.access = access;
        self
    }

    /// Append a custom strategy factory to the chain.
    pub fn strategy_factory(mut self, factory: Box<dyn StrategyFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Build the scope.
    pub fn build(self) -> Arc<PointerScope> {
        Arc::new(PointerScope {
            provider: self.provider,
            access: self.access,
            factories: self.factories,
            entries: RwLock::new(HashMap::new()),
        })
    }
}

/// Per-project owner of the weak node-to-pointer table.
///
/// Dropping the scope disposes every pointer it ever handed out that is
/// still alive, deterministically releasing held references.
pub struct PointerScope {
    provider: Arc<dyn TreeProvider>,
    access: Arc<dyn AccessPolicy>,
    factories: Vec<Box<dyn StrategyFactory>>,
    entries: RwLock<HashMap<usize, Weak<NodePointer>>>,
}

impl PointerScope {
    /// Create a scope with a permissive access policy and no custom
    /// factories. Use [`ScopeBuilder`] for more.
    pub fn new(provider: Arc<dyn TreeProvider>) -> Arc<Self> {
        ScopeBuilder::new(provider).build()
    }

    /// Get or create the pointer for `node`.
    ///
    /// Requires a read permit. Returns the existing pointer when one is
    /// already registered for the node, so repeated requests for the same
    /// node yield the same `Arc`.
    pub fn pointer_for(&self, node: &NodeHandle) -> Arc<NodePointer> {
        self.access.assert_read_allowed();
        let key = node_key(node);

        if let Some(existing) = self.lookup(key) {
            return existing;
        }

        let info = self.create_info(node);
        let pointer = Arc::new(NodePointer::new(Arc::clone(&self.provider), info, node));

        let mut entries = self.entries.write().unwrap();
        // Another reader may have registered the node concurrently.
        if let Some(existing) = entries
            .get(&key)
            .and_then(Weak::upgrade)
            .filter(|pointer| !pointer.is_disposed())
        {
            return existing;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.insert(key, Arc::downgrade(&pointer));
        pointer
    }

    /// Whether two pointers currently point to the same logical node.
    ///
    /// Requires a read permit. Two pointers that both fail to resolve are
    /// considered equal (they point to the same absence).
    pub fn point_to_same_element(&self, a: &NodePointer, b: &NodePointer) -> bool {
        self.access.assert_read_allowed();
        point_to_same_element(a, b)
    }

    /// Fan an applied edit out to every live strategy watching `file`.
    ///
    /// Must be called after the edit is applied and before any subsequent
    /// resolve observes the new document version; requires write access.
    pub fn documents_changed(&self, file: FileKey, edit: &DocEdit) {
        self.access.assert_write_allowed();
        for pointer in self.live_pointers() {
            if !pointer.is_disposed() && pointer.info().watches_file(file) {
                pointer.info().adjust_for_edit(file, edit);
            }
        }
        self.prune();
    }

    /// Notify strategies watching `file` that the document reached a
    /// quiescent committed state.
    pub fn document_synced(&self, file: FileKey) {
        for pointer in self.live_pointers() {
            if !pointer.is_disposed() && pointer.info().watches_file(file) {
                pointer.info().document_synced();
            }
        }
    }

    /// Subscribe this scope to a [`DocumentStore`], wiring edit and sync
    /// notifications. The subscription holds only a weak reference to the
    /// scope and goes quiet once the scope is dropped.
    pub fn attach(self: &Arc<Self>, store: &mut DocumentStore) {
        let weak = Arc::downgrade(self);
        store.subscribe(move |change| {
            let Some(scope) = weak.upgrade() else {
                return;
            };
            match change.kind {
                DocumentChangeKind::Edited(edit) => scope.documents_changed(change.file, &edit),
                DocumentChangeKind::Synced => scope.document_synced(change.file),
            }
        });
    }

    /// Number of live, undisposed pointers currently registered.
    pub fn live_pointer_count(&self) -> usize {
        self.live_pointers()
            .iter()
            .filter(|pointer| !pointer.is_disposed())
            .count()
    }

    /// The tree provider this scope resolves against.
    pub fn provider(&self) -> &Arc<dyn TreeProvider> {
        &self.provider
    }

    fn lookup(&self, key: usize) -> Option<Arc<NodePointer>> {
        let entries = self.entries.read().unwrap();
        entries
            .get(&key)
            .and_then(Weak::upgrade)
            .filter(|pointer| !pointer.is_disposed())
    }

    /// Snapshot the live pointers without holding the table lock during
    /// strategy callbacks.
    fn live_pointers(&self) -> Vec<Arc<NodePointer>> {
        let entries = self.entries.read().unwrap();
        entries.values().filter_map(Weak::upgrade).collect()
    }

    fn prune(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.retain(|_, weak| {
            weak.upgrade()
                .is_some_and(|pointer| !pointer.is_disposed())
        });
    }

    /// Strategy selection, run once per pointer at creation time.
    ///
    /// Non-physical nodes and nodes without a file or range get a hard
    /// strategy; then the factory chain is consulted; then whole-file,
    /// injected-range, and plain range strategies in that order.
    fn create_info(&self, node: &NodeHandle) -> ElementInfo {
        let coordinates = match (node.containing_file(), node.range()) {
            (Some(file), Some(range)) if node.is_physical() => (file, range),
            _ => return ElementInfo::Hard(HardInfo::new(Arc::clone(node))),
        };
        let (file, range) = coordinates;

        for factory in &self.factories {
            if let Some(strategy) = factory.create(node, self.provider.as_ref()) {
                return ElementInfo::Custom(strategy);
            }
        }

        if node.is_file_root() {
            return ElementInfo::File(FileInfo::new(file));
        }

        if let Some((host_file, host_range)) = self.provider.injection_host(file) {
            return ElementInfo::Injected(InjectedInfo::new(
                file,
                host_file,
                host_range,
                node.kind(),
                range,
            ));
        }

        ElementInfo::Range(RangeInfo::new(file, node.kind(), range))
    }
}

impl Drop for PointerScope {
    fn drop(&mut self) {
        // Deterministic teardown: dispose everything still alive instead of
        // relying on incidental collection.
        let entries = self.entries.get_mut().unwrap();
        for pointer in entries.values().filter_map(Weak::upgrade) {
            pointer.dispose();
        }
        entries.clear();
    }
}
