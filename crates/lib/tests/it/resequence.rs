//! The repair path for missing position data.
//!
//! Positions can go missing when data is loaded from outside the lifecycle
//! hooks. The next insert or update into such a group first rebuilds the
//! order 1..N by creation order; `resequence` does the same on demand.

use lineup::Value;

use crate::helpers::ListFixture;

const PARENT_1: &[(&str, Value)] = &[("parent_id", Value::Integer(1))];
const PARENT_2: &[(&str, Value)] = &[("parent_id", Value::Integer(2))];

#[test]
fn insert_into_an_uninitialized_group_repairs_it_first() {
    let fixture = ListFixture::standard();
    for _ in 0..4 {
        fixture.create(&[]);
    }
    fixture.null_out_positions(&[]);

    let id = fixture.create(&[]);

    assert_eq!(fixture.reload(id).integer("position"), Some(5));
    assert_eq!(fixture.positions(&[]), [1, 2, 3, 4, 5]);
    // Repaired order follows creation order.
    assert_eq!(fixture.ids_by_position(&[]), [1, 2, 3, 4, 5]);
}

#[test]
fn update_of_a_row_without_a_previous_position_rebuilds_the_group() {
    let fixture = ListFixture::standard();
    for _ in 0..4 {
        fixture.create(&[]);
    }
    fixture.null_out_positions(&[]);

    let first = fixture.reload(lineup::RowId(1));
    fixture.set_position(&first, 3).unwrap();

    assert_eq!(fixture.positions(&[]), [1, 2, 3, 4]);
    assert_eq!(fixture.ids_by_position(&[]), [1, 2, 3, 4]);
}

#[test]
fn explicit_resequence_rebuilds_by_creation_order() {
    let fixture = ListFixture::standard();
    for _ in 0..4 {
        fixture.create(&[]);
    }
    // Scramble positions behind the hooks' back.
    for (id, position) in [(1, 40), (2, 17), (3, 23), (4, 9)] {
        fixture
            .store
            .update(
                crate::helpers::SOURCE,
                lineup::RowId(id),
                [("position".to_string(), Value::Integer(position))],
                None,
            )
            .unwrap();
    }

    fixture.list.resequence(&[]).unwrap();

    assert_eq!(fixture.positions(&[]), [1, 2, 3, 4]);
    assert_eq!(fixture.ids_by_position(&[]), [1, 2, 3, 4]);
}

#[test]
fn resequencing_one_group_leaves_the_sibling_group_alone() {
    let fixture = ListFixture::scoped();
    for _ in 0..3 {
        fixture.create(PARENT_1);
    }
    for _ in 0..3 {
        fixture.create(PARENT_2);
    }
    fixture.null_out_positions(PARENT_1);

    fixture.list.resequence(&[Value::Integer(1)]).unwrap();

    assert_eq!(fixture.positions(PARENT_1), [1, 2, 3]);
    assert_eq!(fixture.positions(PARENT_2), [1, 2, 3]);
    assert_eq!(fixture.ids_by_position(PARENT_2), [4, 5, 6]);
}

#[test]
fn clearing_a_position_rebuilds_the_group() {
    let fixture = ListFixture::standard();
    for _ in 0..4 {
        fixture.create(&[]);
    }

    let second = fixture.row_at(&[], 2);
    fixture.update(&second, &[("position", Value::Null)]).unwrap();

    assert_eq!(fixture.positions(&[]), [1, 2, 3, 4]);
    assert_eq!(fixture.ids_by_position(&[]), [1, 2, 3, 4]);
}

#[test]
fn leaving_a_group_with_a_cleared_position_still_closes_the_old_gap() {
    let fixture = ListFixture::scoped();
    for _ in 0..3 {
        fixture.create(PARENT_1);
    }
    for _ in 0..2 {
        fixture.create(PARENT_2);
    }

    let moved = fixture.row_at(PARENT_1, 2);
    fixture
        .update(
            &moved,
            &[("parent_id", Value::Integer(2)), ("position", Value::Null)],
        )
        .unwrap();

    assert_eq!(fixture.positions(PARENT_1), [1, 2]);
    // The arriving row is slotted by creation order during the rebuild.
    assert_eq!(fixture.positions(PARENT_2), [1, 2, 3]);
}
