//! Position assignment when rows are created.

use lineup::{PendingRow, Value};

use crate::helpers::ListFixture;

#[test]
fn first_row_gets_position_one() {
    let fixture = ListFixture::standard();
    let id = fixture.create(&[]);
    assert_eq!(fixture.reload(id).integer("position"), Some(1));
}

#[test]
fn each_new_row_appends_to_the_list() {
    let fixture = ListFixture::standard();
    for expected in 1..=4 {
        let id = fixture.create(&[]);
        assert_eq!(fixture.reload(id).integer("position"), Some(expected));
    }
    assert_eq!(fixture.positions(&[]), [1, 2, 3, 4]);
}

#[test]
fn caller_supplied_position_is_overwritten() {
    let fixture = ListFixture::standard();
    fixture.create(&[]);

    // New rows always append; a specific rank is reached by updating the
    // row after it exists.
    let mut pending = PendingRow::new(vec![]);
    pending.position = Some(42);
    fixture.list.on_before_insert(&mut pending).unwrap();
    assert_eq!(pending.position, Some(2));
}

#[test]
fn custom_position_column_appends_the_same_way() {
    let fixture = ListFixture::custom_column();
    for expected in 1..=4 {
        let id = fixture.create(&[]);
        assert_eq!(fixture.reload(id).integer("pos"), Some(expected));
    }
}

#[test]
fn scoped_groups_count_independently() {
    let fixture = ListFixture::scoped();
    let a = fixture.create(&[]);
    let b = fixture.create(&[("parent_id", Value::Integer(1))]);
    let c = fixture.create(&[("parent_id", Value::Integer(1))]);
    let d = fixture.create(&[("parent_id", Value::Integer(2))]);

    assert_eq!(fixture.reload(a).integer("position"), Some(1));
    assert_eq!(fixture.reload(b).integer("position"), Some(1));
    assert_eq!(fixture.reload(c).integer("position"), Some(2));
    assert_eq!(fixture.reload(d).integer("position"), Some(1));
}

#[test]
fn rows_without_a_scope_value_form_their_own_group() {
    let fixture = ListFixture::scoped();
    fixture.create(&[("parent_id", Value::Integer(1))]);
    let orphan_first = fixture.create(&[]);
    let orphan_second = fixture.create(&[]);

    assert_eq!(fixture.reload(orphan_first).integer("position"), Some(1));
    assert_eq!(fixture.reload(orphan_second).integer("position"), Some(2));
    assert_eq!(
        fixture.positions(&[("parent_id", Value::Null)]),
        [1, 2],
        "NULL-parent rows order independently"
    );
}
