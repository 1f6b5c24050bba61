use anchor_core::{MatchFallback, TreeState, UiEntry, UiTree, UiTreeModel};

fn main() {
    // A project view: root -> src -> parser, plus a sibling "docs" module.
    let mut tree = UiTreeModel::new(UiEntry::new("demo", "ProjectNode"));
    let src = tree.add_child(tree.root(), UiEntry::new("src", "ModuleNode"));
    let parser = tree.add_child(src, UiEntry::new("parser", "PackageNode"));
    tree.add_child(tree.root(), UiEntry::new("docs", "ModuleNode"));

    tree.set_expanded(tree.root(), true);
    tree.set_expanded(src, true);
    tree.set_expanded(parser, true);

    // Snapshot the expansion, then "restart": everything collapses.
    let state = TreeState::capture(&tree);
    tree.collapse_all();

    // The module was renamed between sessions; the canonical key match fails
    // for it, but the index fallback still lines it up by position.
    tree.set_entry(src, UiEntry::new("source", "ModuleNode"));
    state.apply_with(&mut tree, MatchFallback::Index);

    assert_eq!(tree.expanded_nodes().len(), 3);
    println!("re-expanded {} nodes", tree.expanded_nodes().len());
}
