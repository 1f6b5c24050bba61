#![warn(missing_docs)]
//! Anchor Core - Durable Pointers into Mutable Trees
//!
//! # Overview
//!
//! `anchor-core` is a headless kernel for one problem: holding on to a node
//! of a tree that keeps getting rebuilt. A host derives a tree (typically a
//! syntax tree) from a versioned document; the tree is thrown away and
//! re-derived after every batch of edits. A [`NodePointer`] is a durable
//! handle that survives this churn: it re-locates its node from stable
//! coordinates when asked, or fails cleanly when the node is gone.
//!
//! The same re-identification theme appears in UI trees: [`TreeState`]
//! captures which branches of a tree view were expanded and reapplies the
//! expansion to a rebuilt tree, matching nodes loosely by key, type, index,
//! or identity.
//!
//! # Core Features
//!
//! - **Two-tier resolution**: weak cache of the last-resolved node first,
//!   deterministic restoration strategy on miss
//! - **Pluggable restoration**: closed strategy set (hard / file / range /
//!   injected range) plus a factory chain for host-specific coordinates
//! - **Per-scope registry**: weak node-to-pointer table, one pointer per
//!   node, centralized edit fan-out
//! - **Conservative range shifting**: stored ranges follow document edits,
//!   kept wide when a boundary is ambiguous
//! - **Expansion-state snapshots**: capture/restore of expanded UI tree
//!   paths with caller-selected fallback matching
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  PointerScope (registry, edit fan-out)      │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  NodePointer (weak cache + equality)        │  ← The handle
//! ├─────────────────────────────────────────────┤
//! │  ElementInfo strategies (restoration)       │  ← Re-location
//! ├─────────────────────────────────────────────┤
//! │  NodeRange / DocEdit (coordinate shifting)  │  ← Stable coordinates
//! ├─────────────────────────────────────────────┤
//! │  Document / DocumentStore (versioned text)  │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Tree derivation itself stays in the host, behind [`TreeProvider`] and
//! [`TreeNode`]; the host's read/write discipline is asserted through
//! [`AccessPolicy`].
//!
//! # Quick Start
//!
//! ## Documents and edits
//!
//! ```rust
//! use anchor_core::{DocumentChangeKind, DocumentStore};
//!
//! let mut store = DocumentStore::new();
//! let file = store.add_document("fn main() {}\n");
//!
//! store.subscribe(|change| {
//!     if let DocumentChangeKind::Edited(edit) = change.kind {
//!         println!("edit at {} ({:+})", edit.offset, edit.length_delta());
//!     }
//! });
//!
//! let edit = store.edit(file, 3, 4, "run").unwrap();
//! assert_eq!(edit.length_delta(), -1);
//! assert_eq!(store.document(file).unwrap().text(), "fn run() {}\n");
//! ```
//!
//! ## Tree expansion state
//!
//! ```rust
//! use anchor_core::{MatchFallback, TreeState, UiEntry, UiTree, UiTreeModel};
//!
//! let mut tree = UiTreeModel::new(UiEntry::new("project", "ProjectNode"));
//! let module = tree.add_child(tree.root(), UiEntry::new("core", "ModuleNode"));
//! tree.set_expanded(tree.root(), true);
//! tree.set_expanded(module, true);
//!
//! let state = TreeState::capture(&tree);
//! tree.collapse_all();
//! state.apply_with(&mut tree, MatchFallback::Index);
//! assert_eq!(tree.expanded_nodes().len(), 2);
//! ```
//!
//! # Module Description
//!
//! - [`document`] - versioned rope-backed documents and the edit feed
//! - [`range`] - character ranges and the conservative shift policy
//! - [`tree`] - host tree contract and the exact-range restoration search
//! - [`access`] - read/write access precondition checks
//! - [`info`] - restoration strategies and the factory chain
//! - [`pointer`] - the durable handle
//! - [`registry`] - the per-scope pointer table
//! - [`tree_state`] - UI tree expansion capture/restore
//!
//! # Failure Model
//!
//! Not-found, kind-mismatch, and invalidated-node conditions all surface as
//! `None` from [`NodePointer::resolve`] — they are expected outcomes of the
//! tree changing shape, never errors. Only caller misuse (editing an unknown
//! file, violating the access discipline) is reported as an error or
//! assertion.
//!
//! # Persistence
//!
//! Tree-state snapshots round-trip through JSON via the companion
//! `anchor-core-persist` crate, which keeps serde out of the core.

pub mod access;
pub mod document;
pub mod info;
pub mod pointer;
pub mod range;
pub mod registry;
pub mod tree;
pub mod tree_state;

pub use access::{AccessPolicy, PermissiveAccess};
pub use document::{
    DocEdit, Document, DocumentChange, DocumentChangeCallback, DocumentChangeKind, DocumentError,
    DocumentStore, FileKey,
};
pub use info::{ElementStrategy, StrategyFactory};
pub use pointer::NodePointer;
pub use range::NodeRange;
pub use registry::{PointerScope, ScopeBuilder};
pub use tree::{NodeHandle, TreeNode, TreeProvider, find_node_at, same_node};
pub use tree_state::{
    MatchFallback, PathElement, TreeState, UiEntry, UiNodeId, UiTree, UiTreeModel,
};
