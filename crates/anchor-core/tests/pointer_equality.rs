mod common;

use common::Fixture;

#[test]
fn test_equality_is_reflexive() {
    let (fixture, file) = Fixture::with_text("aa bb cc");
    let pointer = fixture.scope.pointer_for(&fixture.find(file, "word", "bb"));
    assert_eq!(*pointer, *pointer);
}

#[test]
fn test_equality_is_symmetric_and_transitive() {
    let (fixture, file) = Fixture::with_text("aa bb cc");
    let word = fixture.find(file, "word", "bb");

    let first = fixture.scope.pointer_for(&word);

    // Recreate pointers for the same logical node from fresh tree walks at
    // later points in time; all three must agree.
    fixture.edit(file, 0, 0, "x ");
    let second = fixture.scope.pointer_for(&fixture.find(file, "word", "bb"));

    fixture.edit(file, 0, 0, "y ");
    let third = fixture.scope.pointer_for(&fixture.find(file, "word", "bb"));

    assert_eq!(*first, *second);
    assert_eq!(*second, *first);
    assert_eq!(*second, *third);
    assert_eq!(*first, *third);
}

#[test]
fn test_pointers_created_independently_for_same_node_are_equal() {
    let (fixture, file) = Fixture::with_text("aa target");
    let early = fixture.scope.pointer_for(&fixture.find(file, "word", "target"));

    // An edit later, a second capture carries different stored coordinates
    // (the first pointer's range was shifted, the second's was captured
    // post-edit) yet both resolve to the same node.
    fixture.edit(file, 0, 0, "pad ");
    let late = fixture.scope.pointer_for(&fixture.find(file, "word", "target"));

    assert_ne!(early.range(), None);
    assert_eq!(early.range(), late.range());
    assert_eq!(*early, *late);
    assert!(fixture.scope.point_to_same_element(&early, &late));
}

#[test]
fn test_pointers_to_distinct_nodes_are_unequal() {
    let (fixture, file) = Fixture::with_text("aa bb");
    let first = fixture.scope.pointer_for(&fixture.find(file, "word", "aa"));
    let second = fixture.scope.pointer_for(&fixture.find(file, "word", "bb"));
    assert_ne!(*first, *second);
    assert!(!fixture.scope.point_to_same_element(&first, &second));
}

#[test]
fn test_dead_pointers_compare_equal_to_each_other_only() {
    let (fixture, file) = Fixture::with_text("aa bb cc");
    let first_dead = fixture.scope.pointer_for(&fixture.find(file, "word", "aa"));
    let second_dead = fixture.scope.pointer_for(&fixture.find(file, "word", "cc"));
    let live = fixture.scope.pointer_for(&fixture.find(file, "word", "bb"));

    // Delete "aa" and "cc"; "bb" survives at a shifted position.
    fixture.edit(file, 6, 2, "");
    fixture.edit(file, 0, 2, "");

    assert!(first_dead.resolve().is_none());
    assert!(second_dead.resolve().is_none());
    assert!(live.resolve().is_some());

    // Both point to the same absence.
    assert_eq!(*first_dead, *second_dead);
    assert_ne!(*first_dead, *live);
    assert_ne!(*live, *second_dead);
}
