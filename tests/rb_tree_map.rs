use std::collections::BTreeMap;

use ordtree::{CursorError, RbTreeMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    // Smaller than TEST_SIZE so that keys collide.
    -2_000i64..2_000i64
}

// ─── Worked examples ────────────────────────────────────────────────────────

fn letters() -> RbTreeMap<i32, &'static str> {
    let mut map = RbTreeMap::new();
    map.insert(10, "a");
    map.insert(20, "b");
    map.insert(5, "c");
    map.insert(15, "d");
    map
}

#[test]
fn iterates_in_ascending_key_order() {
    let map = letters();
    let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, vec![(5, "c"), (10, "a"), (15, "d"), (20, "b")]);
}

#[test]
fn removal_drops_only_the_removed_key() {
    let mut map = letters();
    assert_eq!(map.remove(&10), Some("a"));
    assert_eq!(map.get(&10), None);
    let entries: Vec<_> = map.into_iter().collect();
    assert_eq!(entries, vec![(5, "c"), (15, "d"), (20, "b")]);
}

#[test]
fn overwrite_keeps_a_single_entry() {
    let mut map = letters();
    assert_eq!(map.insert(15, "D"), Some("d"));
    assert_eq!(map.len(), 4);
    assert_eq!(map[&15], "D");
}

#[test]
fn missing_keys() {
    let mut map = letters();
    assert_eq!(map.remove(&7), None);
    assert!(!map.contains_key(&7));
    assert_eq!(map.successor(&20), None);
    assert_eq!(map.successor(&-1), Some((&5, &"c")));
    assert_eq!(map.successor(&12), Some((&15, &"d")));

    let empty: RbTreeMap<i32, i32> = RbTreeMap::new();
    assert_eq!(empty.first_key_value(), None);
    assert_eq!(empty.last_key_value(), None);
    assert_eq!(empty.iter().next(), None);
}

#[test]
fn clear_then_reuse() {
    let mut map: RbTreeMap<u32, u32> = (0..1_000).map(|k| (k, k)).collect();
    map.clear();
    assert!(map.is_empty());
    map.extend([(3, 30), (1, 10)]);
    assert_eq!(map.first_key_value(), Some((&1, &10)));
    assert_eq!(map.last_key_value(), Some((&3, &30)));
}

#[test]
fn sorted_insertions_stay_logarithmic() {
    // Ascending and descending runs are the classic worst case for unbalanced trees; the map must
    // still answer and iterate correctly.
    let mut map = RbTreeMap::new();
    for key in 0..10_000u32 {
        map.insert(key, ());
    }
    for key in (10_000..20_000u32).rev() {
        map.insert(key, ());
    }
    assert_eq!(map.len(), 20_000);
    assert!(map.keys().copied().eq(0..20_000));
    for key in (0..20_000u32).step_by(2) {
        map.remove(&key);
    }
    assert!(map.keys().copied().eq((1..20_000).step_by(2)));
}

#[test]
fn iter_mut_updates_values() {
    let mut map = letters();
    for (_, value) in &mut map {
        *value = if *value == "a" { "A" } else { *value };
    }
    assert_eq!(map.get(&10), Some(&"A"));
}

#[test]
fn reverse_keys_order_descending() {
    use std::cmp::Reverse;

    let map: RbTreeMap<Reverse<i32>, i32> = [3, 9, 1, 5, 7].into_iter().map(|k| (Reverse(k), k * 10)).collect();
    let keys: Vec<i32> = map.keys().map(|Reverse(k)| *k).collect();
    assert_eq!(keys, vec![9, 7, 5, 3, 1]);
    assert_eq!(map.get(&Reverse(5)), Some(&50));
    assert_eq!(map.first_key_value(), Some((&Reverse(9), &90)));
    assert_eq!(map.successor(&Reverse(5)), Some((&Reverse(3), &30)));
    assert_eq!(map.successor(&Reverse(6)), Some((&Reverse(5), &50)));
    assert_eq!(map.successor(&Reverse(1)), None);
}

// ─── Stale cursors ──────────────────────────────────────────────────────────

#[test]
fn cursor_goes_stale_after_insert() {
    let mut map = letters();
    let mut cursor = map.cursor();
    assert_eq!(cursor.next(&map), Ok(Some((&5, &"c"))));
    map.insert(1, "z");
    assert!(matches!(cursor.next(&map), Err(CursorError::Stale { .. })));
}

#[test]
fn cursor_goes_stale_after_remove() {
    let mut map = letters();
    let mut cursor = map.cursor();
    cursor.next(&map).unwrap();
    map.remove(&20);
    assert!(cursor.is_stale(&map));
    assert!(matches!(cursor.next(&map), Err(CursorError::Stale { .. })));
}

#[test]
fn cursor_goes_stale_after_overwrite() {
    let mut map = letters();
    let mut cursor = map.cursor();
    cursor.next(&map).unwrap();
    map.insert(5, "same key, new value");
    assert!(matches!(cursor.next(&map), Err(CursorError::Stale { .. })));
}

#[test]
fn cursor_write_invalidates_other_cursors() {
    let mut map = letters();
    let mut writer = map.cursor();
    let mut reader = map.cursor();
    reader.next(&map).unwrap();

    writer.next(&map).unwrap();
    assert_eq!(writer.set_value(&mut map, "C"), Ok("c"));
    assert_eq!(writer.next(&map), Ok(Some((&10, &"a"))));
    assert!(matches!(reader.next(&map), Err(CursorError::Stale { .. })));
}

#[test]
fn lookups_do_not_invalidate_cursors() {
    let map = letters();
    let mut cursor = map.cursor();
    cursor.next(&map).unwrap();
    let _ = map.get(&15);
    let _ = map.successor(&5);
    let _ = map.iter().count();
    assert_eq!(cursor.next(&map), Ok(Some((&10, &"a"))));
}

#[test]
fn cursor_rejects_a_clone_of_its_map() {
    let map = letters();
    let mut copy = map.clone();
    let mut cursor = map.cursor();
    assert_eq!(cursor.next(&copy), Err(CursorError::ForeignMap));
    assert_eq!(cursor.set_value(&mut copy, "z"), Err(CursorError::ForeignMap));
    assert_eq!(copy[&5], "c");
    assert_eq!(cursor.next(&map), Ok(Some((&5, &"c"))));
}

// ─── Randomized comparison against BTreeMap ─────────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    Successor(i64),
    FirstLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::Successor),
        1 => Just(MapOp::FirstLast),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both RbTreeMap and BTreeMap and asserts
    /// identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut rb_map: RbTreeMap<i64, i64> = RbTreeMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(rb_map.insert(*k, *v), bt_map.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(rb_map.remove(k), bt_map.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(rb_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::Successor(k) => {
                    let expected = bt_map.range(k + 1..).next();
                    prop_assert_eq!(rb_map.successor(k), expected, "successor({})", k);
                }
                MapOp::FirstLast => {
                    prop_assert_eq!(rb_map.first_key_value(), bt_map.first_key_value());
                    prop_assert_eq!(rb_map.last_key_value(), bt_map.last_key_value());
                }
            }
            prop_assert_eq!(rb_map.len(), bt_map.len());
        }

        prop_assert!(rb_map.iter().eq(bt_map.iter()));
    }

    /// A cursor over an untouched map yields exactly what the borrowing iterator yields.
    #[test]
    fn cursor_matches_iter(keys in proptest::collection::vec(key_strategy(), 0..500)) {
        let map: RbTreeMap<i64, usize> = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        let mut cursor = map.cursor();
        let mut walked = Vec::new();
        while let Some(entry) = cursor.next(&map).unwrap() {
            walked.push(entry);
        }
        prop_assert_eq!(walked, map.iter().collect::<Vec<_>>());
    }
}
