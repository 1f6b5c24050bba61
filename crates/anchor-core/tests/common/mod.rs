//! Shared test fixture: a tiny tree provider over [`DocumentStore`].
//!
//! The toy grammar derives, per file, a `file` root covering the whole
//! document, `word` leaves for maximal alphanumeric runs, and nested `group`
//! nodes for balanced parentheses. Trees are cached per document version;
//! nodes from an older version report themselves invalid.

#![allow(dead_code)]

use anchor_core::{
    DocumentStore, FileKey, NodeHandle, NodeRange, PointerScope, TreeNode, TreeProvider,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

pub struct TestNode {
    kind: String,
    text: String,
    range: Option<NodeRange>,
    file: Option<FileKey>,
    children: Vec<NodeHandle>,
    generation: u64,
    physical: bool,
    file_root: bool,
    valid: AtomicBool,
    provider: Weak<FixtureProvider>,
}

impl TestNode {
    /// A synthetic (non-physical) node: no file, no range, hard-pointer
    /// territory.
    pub fn synthetic(kind: &str) -> Arc<TestNode> {
        Arc::new(TestNode {
            kind: kind.to_string(),
            text: String::new(),
            range: None,
            file: None,
            children: Vec::new(),
            generation: 0,
            physical: false,
            file_root: false,
            valid: AtomicBool::new(true),
            provider: Weak::new(),
        })
    }

    /// Force the node invalid, as if its subtree had been deleted.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TreeNode for TestNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn is_valid(&self) -> bool {
        if !self.valid.load(Ordering::Acquire) {
            return false;
        }
        if !self.physical {
            return true;
        }
        // Physical nodes go stale as soon as their document moves on.
        let (Some(file), Some(provider)) = (self.file, self.provider.upgrade()) else {
            return false;
        };
        provider.document_version(file) == Some(self.generation)
    }

    fn range(&self) -> Option<NodeRange> {
        self.range
    }

    fn containing_file(&self) -> Option<FileKey> {
        self.file
    }

    fn children(&self) -> Vec<NodeHandle> {
        self.children.clone()
    }

    fn is_physical(&self) -> bool {
        self.physical
    }

    fn is_file_root(&self) -> bool {
        self.file_root
    }
}

pub struct FixtureProvider {
    store: Arc<Mutex<DocumentStore>>,
    trees: Mutex<HashMap<FileKey, (u64, NodeHandle)>>,
    /// injected file -> (host file, fragment range in host at registration)
    injection_hosts: Mutex<HashMap<FileKey, (FileKey, NodeRange)>>,
    /// host file -> injected file
    injected_files: Mutex<HashMap<FileKey, FileKey>>,
    self_ref: Mutex<Weak<FixtureProvider>>,
}

impl FixtureProvider {
    pub fn new(store: Arc<Mutex<DocumentStore>>) -> Arc<FixtureProvider> {
        let provider = Arc::new(FixtureProvider {
            store,
            trees: Mutex::new(HashMap::new()),
            injection_hosts: Mutex::new(HashMap::new()),
            injected_files: Mutex::new(HashMap::new()),
            self_ref: Mutex::new(Weak::new()),
        });
        *provider.self_ref.lock().unwrap() = Arc::downgrade(&provider);
        provider
    }

    pub fn register_injection(&self, host: FileKey, fragment: NodeRange, injected: FileKey) {
        self.injection_hosts
            .lock()
            .unwrap()
            .insert(injected, (host, fragment));
        self.injected_files.lock().unwrap().insert(host, injected);
    }

    fn document_version(&self, file: FileKey) -> Option<u64> {
        let store = self.store.lock().unwrap();
        store.document(file).map(|document| document.version())
    }

    fn parse(&self, file: FileKey, text: &str, generation: u64) -> NodeHandle {
        let chars: Vec<char> = text.chars().collect();
        let children = self.parse_children(&chars, 0, chars.len(), file, generation);
        Arc::new(TestNode {
            kind: "file".to_string(),
            text: text.to_string(),
            range: Some(NodeRange::new(0, chars.len())),
            file: Some(file),
            children,
            generation,
            physical: true,
            file_root: true,
            valid: AtomicBool::new(true),
            provider: self.self_ref.lock().unwrap().clone(),
        })
    }

    fn parse_children(
        &self,
        chars: &[char],
        start: usize,
        end: usize,
        file: FileKey,
        generation: u64,
    ) -> Vec<NodeHandle> {
        let mut nodes: Vec<NodeHandle> = Vec::new();
        let mut i = start;
        while i < end {
            let c = chars[i];
            if c.is_alphanumeric() || c == '_' {
                let mut j = i;
                while j < end && (chars[j].is_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                nodes.push(self.leaf("word", chars, i, j, file, generation));
                i = j;
            } else if c == '(' {
                match matching_paren(chars, i, end) {
                    Some(close) => {
                        let children =
                            self.parse_children(chars, i + 1, close, file, generation);
                        let mut node = self.leaf_parts("group", chars, i, close + 1, file, generation);
                        node.children = children;
                        nodes.push(Arc::new(node));
                        i = close + 1;
                    }
                    None => i += 1,
                }
            } else {
                i += 1;
            }
        }
        nodes
    }

    fn leaf(
        &self,
        kind: &str,
        chars: &[char],
        start: usize,
        end: usize,
        file: FileKey,
        generation: u64,
    ) -> NodeHandle {
        Arc::new(self.leaf_parts(kind, chars, start, end, file, generation))
    }

    fn leaf_parts(
        &self,
        kind: &str,
        chars: &[char],
        start: usize,
        end: usize,
        file: FileKey,
        generation: u64,
    ) -> TestNode {
        TestNode {
            kind: kind.to_string(),
            text: chars[start..end].iter().collect(),
            range: Some(NodeRange::new(start, end)),
            file: Some(file),
            children: Vec::new(),
            generation,
            physical: true,
            file_root: false,
            valid: AtomicBool::new(true),
            provider: self.self_ref.lock().unwrap().clone(),
        }
    }
}

fn matching_paren(chars: &[char], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().take(end).skip(open) {
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

impl TreeProvider for FixtureProvider {
    fn derive_tree(&self, file: FileKey) -> Option<NodeHandle> {
        let (version, text) = {
            let store = self.store.lock().unwrap();
            let document = store.document(file)?;
            (document.version(), document.text())
        };
        let mut trees = self.trees.lock().unwrap();
        if let Some((cached_version, root)) = trees.get(&file) {
            if *cached_version == version {
                return Some(Arc::clone(root));
            }
        }
        let root = self.parse(file, &text, version);
        trees.insert(file, (version, Arc::clone(&root)));
        Some(root)
    }

    fn is_file_valid(&self, file: FileKey) -> bool {
        self.store.lock().unwrap().contains(file)
    }

    fn injection_host(&self, file: FileKey) -> Option<(FileKey, NodeRange)> {
        self.injection_hosts.lock().unwrap().get(&file).copied()
    }

    fn injected_file(&self, host: &NodeHandle) -> Option<FileKey> {
        if host.kind() != "group" {
            return None;
        }
        let file = host.containing_file()?;
        self.injected_files.lock().unwrap().get(&file).copied()
    }
}

/// Everything a pointer test needs, wired together.
pub struct Fixture {
    pub store: Arc<Mutex<DocumentStore>>,
    pub provider: Arc<FixtureProvider>,
    pub scope: Arc<PointerScope>,
}

impl Fixture {
    pub fn with_text(text: &str) -> (Fixture, FileKey) {
        let mut fixture = Fixture::empty();
        let file = fixture.add_file(text);
        (fixture, file)
    }

    pub fn empty() -> Fixture {
        let store = Arc::new(Mutex::new(DocumentStore::new()));
        let provider = FixtureProvider::new(Arc::clone(&store));
        let scope = PointerScope::new(provider.clone() as Arc<dyn TreeProvider>);
        scope.attach(&mut store.lock().unwrap());
        Fixture {
            store,
            provider,
            scope,
        }
    }

    pub fn add_file(&mut self, text: &str) -> FileKey {
        self.store.lock().unwrap().add_document(text)
    }

    pub fn edit(&self, file: FileKey, offset: usize, deleted_len: usize, inserted: &str) {
        self.store
            .lock()
            .unwrap()
            .edit(file, offset, deleted_len, inserted)
            .unwrap();
    }

    pub fn root(&self, file: FileKey) -> NodeHandle {
        self.provider.derive_tree(file).unwrap()
    }

    /// First node of the given kind whose source text matches, in document
    /// order.
    pub fn find(&self, file: FileKey, kind: &str, text: &str) -> NodeHandle {
        let source: Vec<char> = self
            .store
            .lock()
            .unwrap()
            .document(file)
            .unwrap()
            .text()
            .chars()
            .collect();
        fn walk(node: &NodeHandle, source: &[char], kind: &str, text: &str) -> Option<NodeHandle> {
            if node.kind() == kind {
                if let Some(range) = node.range() {
                    let node_text: String = source[range.start..range.end].iter().collect();
                    if node_text == text {
                        return Some(Arc::clone(node));
                    }
                }
            }
            node.children()
                .iter()
                .find_map(|child| walk(child, source, kind, text))
        }
        walk(&self.root(file), &source, kind, text)
            .unwrap_or_else(|| panic!("no {kind} node with text {text:?}"))
    }
}
