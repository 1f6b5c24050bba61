#![warn(missing_docs)]
//! JSON persistence for `anchor-core` tree expansion state.
//!
//! A [`TreeState`](anchor_core::TreeState) is a list of expansion paths,
//! each an ordered chain of path elements. The persisted form keeps, per
//! element, the identity key, the descriptor type name, and the optional
//! literal identity payload — and nothing else. The capture-time sibling
//! index is deliberately not serialized: it is only meaningful against the
//! exact tree it was captured from, so a deserialized element carries
//! `index: None` and index-fallback matching simply fails for it.
//!
//! Ordering is significant and preserved both for the set of paths and for
//! the elements within each path.
//!
//! This crate keeps serde out of `anchor-core` itself; hosts that persist
//! through another structured format can map [`TreeState::paths`] by hand.
//!
//! [`TreeState::paths`]: anchor_core::TreeState::paths
//!
//! # Example
//!
//! ```rust
//! use anchor_core::{TreeState, UiEntry, UiTree, UiTreeModel};
//!
//! let mut tree = UiTreeModel::new(UiEntry::new("root", "ProjectNode"));
//! tree.set_expanded(tree.root(), true);
//!
//! let state = TreeState::capture(&tree);
//! let json = anchor_core_persist::to_json(&state).unwrap();
//! let restored = anchor_core_persist::from_json(&json).unwrap();
//! assert_eq!(restored.paths().len(), state.paths().len());
//! ```

use anchor_core::{PathElement, TreeState};
use serde::{Deserialize, Serialize};

/// Error type for persistence operations.
#[derive(Debug)]
pub enum PersistError {
    /// JSON encoding or decoding failed.
    Json(serde_json::Error),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Json(err) => {
                write!(f, "JSON error: {}", err)
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Json(err)
    }
}

/// Persisted form of one path element: key, type, optional identity payload.
#[derive(Debug, Serialize, Deserialize)]
struct PathElementRecord {
    key: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
}

/// Persisted form of a whole snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct TreeStateRecord {
    paths: Vec<Vec<PathElementRecord>>,
}

/// Serialize a tree state to JSON.
pub fn to_json(state: &TreeState) -> Result<String, PersistError> {
    let record = TreeStateRecord {
        paths: state
            .paths()
            .iter()
            .map(|path| {
                path.iter()
                    .map(|element| PathElementRecord {
                        key: element.key.clone(),
                        type_name: element.type_name.clone(),
                        identity: element.identity.clone(),
                    })
                    .collect()
            })
            .collect(),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Deserialize a tree state from JSON.
///
/// Restored elements carry no sibling index; only canonical and identity
/// matching remain effective for them.
pub fn from_json(json: &str) -> Result<TreeState, PersistError> {
    let record: TreeStateRecord = serde_json::from_str(json)?;
    let paths = record
        .paths
        .into_iter()
        .map(|path| {
            path.into_iter()
                .map(|element| PathElement {
                    key: element.key,
                    type_name: element.type_name,
                    index: None,
                    identity: element.identity,
                })
                .collect()
        })
        .collect();
    Ok(TreeState::from_paths(paths))
}
