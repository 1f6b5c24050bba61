//! Restoration strategies.
//!
//! Every pointer is bound, once, at creation time, to one restoration
//! strategy — the recipe for re-locating its node after the tree has been
//! rebuilt. The built-in strategies form a closed set:
//!
//! - **Hard**: a strong node reference, for nodes with no stable coordinate
//!   system (compiled/synthesized nodes). Trades reclaimability for
//!   correctness.
//! - **File**: the containing file only; restoration re-derives "the file as
//!   a node".
//! - **Range**: file + adjustable character range + kind; restoration
//!   re-derives the file's tree and searches for the exact range/kind pair.
//! - **InjectedRange**: as Range, but for a node inside a nested document;
//!   restoration first locates the hosting fragment, then the node within
//!   the injected document's own tree.
//!
//! Hosts can extend the set through [`StrategyFactory`], consulted in
//! registration order before the built-in selection runs.
//!
//! Restoration failure is an expected outcome (`None`), never an error.

use crate::document::{DocEdit, FileKey};
use crate::range::NodeRange;
use crate::tree::{NodeHandle, TreeProvider, find_node_at};
use std::sync::Mutex;

/// A custom restoration strategy produced by a [`StrategyFactory`].
///
/// Methods mirror the built-in strategies; defaults are no-ops so factories
/// only implement what their coordinate system needs. Strategies that hold
/// document-relative state should report their document via
/// [`ElementStrategy::virtual_file`] so edit and sync notifications reach
/// them.
pub trait ElementStrategy: Send + Sync {
    /// Re-locate the node, or `None` if it cannot be found.
    fn restore(&self, provider: &dyn TreeProvider) -> Option<NodeHandle>;

    /// The file this strategy's coordinates live in, if any.
    fn virtual_file(&self) -> Option<FileKey> {
        None
    }

    /// The current (edit-adjusted) stored range, if the strategy keeps one.
    fn range(&self) -> Option<NodeRange> {
        None
    }

    /// Release held references. Called once, when the pointer is disposed.
    fn dispose(&self) {}

    /// Hook invoked after the strategy's document finishes a quiescent
    /// commit; an opportunity to drop soft caches.
    fn document_synced(&self) {}

    /// Shift stored coordinates for an edit applied to `file`.
    fn adjust_for_edit(&self, file: FileKey, edit: &DocEdit) {
        let _ = (file, edit);
    }
}

/// Factory for custom restoration strategies, tried in registration order
/// before the built-in selection.
pub trait StrategyFactory: Send + Sync {
    /// Produce a strategy for `node`, or `None` to pass to the next factory.
    fn create(
        &self,
        node: &NodeHandle,
        provider: &dyn TreeProvider,
    ) -> Option<Box<dyn ElementStrategy>>;
}

/// The restoration strategy bound to a pointer. Closed tagged union plus the
/// factory escape hatch.
pub(crate) enum ElementInfo {
    Hard(HardInfo),
    File(FileInfo),
    Range(RangeInfo),
    Injected(InjectedInfo),
    Custom(Box<dyn ElementStrategy>),
}

impl ElementInfo {
    pub(crate) fn restore(&self, provider: &dyn TreeProvider) -> Option<NodeHandle> {
        match self {
            ElementInfo::Hard(info) => info.restore(),
            ElementInfo::File(info) => info.restore(provider),
            ElementInfo::Range(info) => info.restore(provider),
            ElementInfo::Injected(info) => info.restore(provider),
            ElementInfo::Custom(strategy) => strategy.restore(provider),
        }
    }

    pub(crate) fn virtual_file(&self) -> Option<FileKey> {
        match self {
            ElementInfo::Hard(info) => info.node.lock().unwrap().as_ref()?.containing_file(),
            ElementInfo::File(info) => Some(info.file),
            ElementInfo::Range(info) => Some(info.file),
            ElementInfo::Injected(info) => Some(info.file),
            ElementInfo::Custom(strategy) => strategy.virtual_file(),
        }
    }

    pub(crate) fn range(&self) -> Option<NodeRange> {
        match self {
            ElementInfo::Hard(info) => info.node.lock().unwrap().as_ref()?.range(),
            ElementInfo::File(_) => None,
            ElementInfo::Range(info) => Some(*info.range.lock().unwrap()),
            ElementInfo::Injected(info) => Some(*info.local_range.lock().unwrap()),
            ElementInfo::Custom(strategy) => strategy.range(),
        }
    }

    pub(crate) fn dispose(&self) {
        match self {
            ElementInfo::Hard(info) => {
                info.node.lock().unwrap().take();
            }
            ElementInfo::File(_) | ElementInfo::Range(_) | ElementInfo::Injected(_) => {}
            ElementInfo::Custom(strategy) => strategy.dispose(),
        }
    }

    pub(crate) fn document_synced(&self) {
        if let ElementInfo::Custom(strategy) = self {
            strategy.document_synced();
        }
        // Built-in strategies keep no soft per-commit state.
    }

    pub(crate) fn adjust_for_edit(&self, file: FileKey, edit: &DocEdit) {
        match self {
            ElementInfo::Hard(_) | ElementInfo::File(_) => {}
            ElementInfo::Range(info) => {
                if info.file == file {
                    let mut range = info.range.lock().unwrap();
                    *range = range.adjusted_for(edit);
                }
            }
            ElementInfo::Injected(info) => {
                if info.host_file == file {
                    let mut range = info.host_range.lock().unwrap();
                    *range = range.adjusted_for(edit);
                }
                if info.file == file {
                    let mut range = info.local_range.lock().unwrap();
                    *range = range.adjusted_for(edit);
                }
            }
            ElementInfo::Custom(strategy) => strategy.adjust_for_edit(file, edit),
        }
    }

    /// Files this strategy wants edit/sync notifications for.
    pub(crate) fn watches_file(&self, file: FileKey) -> bool {
        match self {
            ElementInfo::Injected(info) => info.host_file == file || info.file == file,
            _ => self.virtual_file() == Some(file),
        }
    }
}

/// Strong-reference strategy for nodes without stable coordinates.
pub(crate) struct HardInfo {
    node: Mutex<Option<NodeHandle>>,
}

impl HardInfo {
    pub(crate) fn new(node: NodeHandle) -> Self {
        Self {
            node: Mutex::new(Some(node)),
        }
    }

    fn restore(&self) -> Option<NodeHandle> {
        self.node
            .lock()
            .unwrap()
            .clone()
            .filter(|node| node.is_valid())
    }
}

/// Whole-file strategy: restoration re-fetches the file's root node.
pub(crate) struct FileInfo {
    file: FileKey,
}

impl FileInfo {
    pub(crate) fn new(file: FileKey) -> Self {
        Self { file }
    }

    fn restore(&self, provider: &dyn TreeProvider) -> Option<NodeHandle> {
        if !provider.is_file_valid(self.file) {
            return None;
        }
        provider.derive_tree(self.file)
    }
}

/// Range strategy: file + edit-adjusted range + kind.
pub(crate) struct RangeInfo {
    file: FileKey,
    kind: String,
    range: Mutex<NodeRange>,
}

impl RangeInfo {
    pub(crate) fn new(file: FileKey, kind: &str, range: NodeRange) -> Self {
        Self {
            file,
            kind: kind.to_string(),
            range: Mutex::new(range),
        }
    }

    fn restore(&self, provider: &dyn TreeProvider) -> Option<NodeHandle> {
        let root = provider.derive_tree(self.file)?;
        let range = *self.range.lock().unwrap();
        find_node_at(&root, range, Some(&self.kind))
    }
}

/// Injected-range strategy: locate the hosting fragment in the host file,
/// then the node within the injected document's tree. Both stored ranges are
/// adjusted independently against their own documents.
pub(crate) struct InjectedInfo {
    /// The injected document the node lives in.
    file: FileKey,
    /// The top-level document hosting the injected fragment.
    host_file: FileKey,
    /// Range of the hosting fragment within `host_file`.
    host_range: Mutex<NodeRange>,
    /// Range of the node within `file`.
    local_range: Mutex<NodeRange>,
    kind: String,
}

impl InjectedInfo {
    pub(crate) fn new(
        file: FileKey,
        host_file: FileKey,
        host_range: NodeRange,
        kind: &str,
        local_range: NodeRange,
    ) -> Self {
        Self {
            file,
            host_file,
            host_range: Mutex::new(host_range),
            local_range: Mutex::new(local_range),
            kind: kind.to_string(),
        }
    }

    fn restore(&self, provider: &dyn TreeProvider) -> Option<NodeHandle> {
        let host_root = provider.derive_tree(self.host_file)?;
        let host_range = *self.host_range.lock().unwrap();
        let fragment = find_node_at(&host_root, host_range, None)?;
        let injected = provider.injected_file(&fragment)?;
        let injected_root = provider.derive_tree(injected)?;
        let local_range = *self.local_range.lock().unwrap();
        find_node_at(&injected_root, local_range, Some(&self.kind))
    }
}
