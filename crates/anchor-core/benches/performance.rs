use anchor_core::{
    DocEdit, FileKey, MatchFallback, NodeHandle, NodeRange, PointerScope, TreeProvider, TreeState,
    UiEntry, UiTreeModel,
};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Provider with no trees; enough for hard-pointer and fan-out paths.
struct NullProvider;

impl TreeProvider for NullProvider {
    fn derive_tree(&self, _file: FileKey) -> Option<NodeHandle> {
        None
    }

    fn is_file_valid(&self, _file: FileKey) -> bool {
        false
    }
}

/// Minimal synthetic node for hard pointers.
struct BenchNode {
    kind: String,
    valid: AtomicBool,
}

impl anchor_core::TreeNode for BenchNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn is_valid(&self) -> bool {
        self.valid.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn range(&self) -> Option<NodeRange> {
        None
    }

    fn containing_file(&self) -> Option<FileKey> {
        None
    }

    fn children(&self) -> Vec<NodeHandle> {
        Vec::new()
    }

    fn is_physical(&self) -> bool {
        false
    }
}

fn bench_range_adjustment(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let edits: Vec<DocEdit> = (0..10_000)
        .map(|_| DocEdit {
            offset: rng.gen_range(0..100_000),
            deleted_len: rng.gen_range(0..16),
            inserted_len: rng.gen_range(0..16),
        })
        .collect();

    c.bench_function("range_adjust/10k_edits", |b| {
        b.iter(|| {
            let mut range = NodeRange::new(50_000, 50_100);
            for edit in &edits {
                range = range.adjusted_for(edit);
            }
            black_box(range);
        })
    });
}

fn bench_pointer_registry(c: &mut Criterion) {
    let nodes: Vec<NodeHandle> = (0..10_000)
        .map(|i| {
            Arc::new(BenchNode {
                kind: format!("kind-{}", i % 8),
                valid: AtomicBool::new(true),
            }) as NodeHandle
        })
        .collect();

    c.bench_function("registry/10k_pointer_for", |b| {
        b.iter_batched(
            || PointerScope::new(Arc::new(NullProvider)),
            |scope| {
                for node in &nodes {
                    black_box(scope.pointer_for(node));
                }
            },
            BatchSize::LargeInput,
        )
    });

    let scope = PointerScope::new(Arc::new(NullProvider));
    let pointers: Vec<_> = nodes.iter().map(|node| scope.pointer_for(node)).collect();
    c.bench_function("registry/10k_resolve_cached", |b| {
        b.iter(|| {
            for pointer in &pointers {
                black_box(pointer.resolve());
            }
        })
    });
}

fn wide_tree(depth: usize, fanout: usize) -> UiTreeModel {
    let mut tree = UiTreeModel::new(UiEntry::new("root", "ProjectNode"));
    let root = tree.root();
    let mut frontier = vec![root];
    tree.set_expanded(root, true);
    for level in 0..depth {
        let mut next = Vec::new();
        for &parent in &frontier {
            for child in 0..fanout {
                let id = tree.add_child(
                    parent,
                    UiEntry::new(format!("n{level}-{child}"), "ModuleNode"),
                );
                tree.set_expanded(id, true);
                next.push(id);
            }
        }
        frontier = next;
    }
    tree
}

fn bench_tree_state(c: &mut Criterion) {
    // 1 + 8 + 64 + 512 + 4096 expanded nodes.
    let tree = wide_tree(4, 8);

    c.bench_function("tree_state/capture_4k_nodes", |b| {
        b.iter(|| black_box(TreeState::capture(&tree)))
    });

    let state = TreeState::capture(&tree);
    c.bench_function("tree_state/apply_4k_nodes", |b| {
        b.iter_batched(
            || {
                let mut fresh = tree.clone();
                fresh.collapse_all();
                fresh
            },
            |mut fresh| {
                state.apply_with(&mut fresh, MatchFallback::Index);
                black_box(fresh);
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_range_adjustment,
    bench_pointer_registry,
    bench_tree_state
);
criterion_main!(benches);
