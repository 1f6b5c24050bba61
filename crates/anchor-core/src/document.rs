//! Versioned text documents and the document edit feed.
//!
//! Trees are derived from documents; pointer coordinates are expressed in
//! character offsets within a document. This module provides:
//!
//! - [`Document`]: a mutable, versioned text buffer backed by a rope
//! - [`DocEdit`]: the structured record of one applied edit
//! - [`DocumentStore`]: an owner of documents keyed by [`FileKey`], with a
//!   subscriber list that is notified **after** each mutation and before any
//!   subsequent read can observe the new version
//!
//! Hosts that bring their own document model only need to reproduce the edit
//! feed: deliver a [`DocEdit`] per applied edit to the pointer scope so stored
//! ranges stay correctly shifted.

use ropey::Rope;
use std::collections::HashMap;

/// Opaque identifier for a document/file known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileKey(u64);

impl FileKey {
    /// Create a file key from a raw numeric identifier.
    ///
    /// Hosts that manage their own file table can mint keys directly;
    /// [`DocumentStore`] mints sequential keys on its own.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A single applied text edit, expressed in character offsets.
///
/// An edit is a replace: `deleted_len` characters at `offset` were removed,
/// then `inserted_len` characters were inserted at the same position. Pure
/// insertions have `deleted_len == 0`, pure deletions `inserted_len == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocEdit {
    /// Start character offset of the edit (pre-edit coordinates).
    pub offset: usize,
    /// Number of characters removed.
    pub deleted_len: usize,
    /// Number of characters inserted.
    pub inserted_len: usize,
}

impl DocEdit {
    /// Net change in document length, in characters.
    pub fn length_delta(&self) -> isize {
        self.inserted_len as isize - self.deleted_len as isize
    }
}

/// Error type for document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The file key is not present in the store.
    UnknownFile(FileKey),
    /// The edit range is out of bounds for the document.
    InvalidRange {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
    },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::UnknownFile(file) => {
                write!(f, "Unknown file: {}", file.get())
            }
            DocumentError::InvalidRange { start, end } => {
                write!(f, "Invalid range: {}..{}", start, end)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// A mutable, versioned text buffer.
///
/// The version number increments after every applied edit, so derived state
/// (parse trees, caches) can be keyed to a document version and detected as
/// stale in O(1).
pub struct Document {
    /// Rope storage for O(log n) edits on large documents.
    rope: Rope,
    /// Version number, incremented after each applied edit.
    version: u64,
}

impl Document {
    /// Create a document from initial text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
        }
    }

    /// Current document version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Document length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace `[offset, offset + deleted_len)` with `inserted` and bump the
    /// version. Returns the structured edit record.
    pub fn replace(
        &mut self,
        offset: usize,
        deleted_len: usize,
        inserted: &str,
    ) -> Result<DocEdit, DocumentError> {
        let end = offset + deleted_len;
        if end > self.rope.len_chars() {
            return Err(DocumentError::InvalidRange { start: offset, end });
        }
        if deleted_len > 0 {
            self.rope.remove(offset..end);
        }
        if !inserted.is_empty() {
            self.rope.insert(offset, inserted);
        }
        self.version += 1;
        Ok(DocEdit {
            offset,
            deleted_len,
            inserted_len: inserted.chars().count(),
        })
    }
}

/// A document change event delivered to [`DocumentStore`] subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    /// The document that changed.
    pub file: FileKey,
    /// What happened.
    pub kind: DocumentChangeKind,
}

/// The kind of a [`DocumentChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChangeKind {
    /// An edit was applied. Delivered after the mutation, before any
    /// subsequent read of the new version.
    Edited(DocEdit),
    /// The document reached a quiescent committed state (derived trees are in
    /// sync with the text). Restoration strategies may drop soft caches.
    Synced,
}

/// Document change callback function type.
pub type DocumentChangeCallback = Box<dyn FnMut(&DocumentChange) + Send>;

/// Owner of a set of documents, keyed by [`FileKey`].
///
/// The store is the single mutation entry point for the documents it owns:
/// every applied edit is broadcast to subscribers in order, so a pointer scope
/// attached to the store observes each edit exactly once.
#[derive(Default)]
pub struct DocumentStore {
    documents: HashMap<FileKey, Document>,
    callbacks: Vec<DocumentChangeCallback>,
    next_key: u64,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with the given initial text, returning its key.
    pub fn add_document(&mut self, text: &str) -> FileKey {
        let key = FileKey(self.next_key);
        self.next_key += 1;
        self.documents.insert(key, Document::from_text(text));
        key
    }

    /// Remove a document from the store. Pointers into it will fail to
    /// restore from then on.
    pub fn remove_document(&mut self, file: FileKey) -> Option<Document> {
        self.documents.remove(&file)
    }

    /// Get a document by key.
    pub fn document(&self, file: FileKey) -> Option<&Document> {
        self.documents.get(&file)
    }

    /// Check whether a document is present.
    pub fn contains(&self, file: FileKey) -> bool {
        self.documents.contains_key(&file)
    }

    /// Apply a replace edit to a document and notify subscribers.
    pub fn edit(
        &mut self,
        file: FileKey,
        offset: usize,
        deleted_len: usize,
        inserted: &str,
    ) -> Result<DocEdit, DocumentError> {
        let document = self
            .documents
            .get_mut(&file)
            .ok_or(DocumentError::UnknownFile(file))?;
        let edit = document.replace(offset, deleted_len, inserted)?;
        self.notify(&DocumentChange {
            file,
            kind: DocumentChangeKind::Edited(edit),
        });
        Ok(edit)
    }

    /// Mark a document as committed/quiescent and notify subscribers.
    pub fn sync(&mut self, file: FileKey) -> Result<(), DocumentError> {
        if !self.documents.contains_key(&file) {
            return Err(DocumentError::UnknownFile(file));
        }
        self.notify(&DocumentChange {
            file,
            kind: DocumentChangeKind::Synced,
        });
        Ok(())
    }

    /// Subscribe to document changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify(&mut self, change: &DocumentChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}
