use std::collections::BTreeMap;

use ordtree::{VebError, VebMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn count_occurrences(map: &mut VebMap<u32>, keys: &[u64]) {
    for &key in keys {
        match map.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                map.insert(key, 1).unwrap();
            }
        }
    }
}

// ─── Worked examples ────────────────────────────────────────────────────────

#[test]
fn put_or_increment() {
    let mut map = VebMap::with_bits(32).unwrap();
    count_occurrences(&mut map, &[1, 4, 3, 3, 5, 7]);
    let entries: Vec<_> = map.iter().map(|(k, v)| (k, *v)).collect();
    assert_eq!(entries, vec![(1, 1), (3, 2), (4, 1), (5, 1), (7, 1)]);
}

#[test]
fn large_keys_keep_their_values() {
    let mut map = VebMap::new();
    let keys = [u64::from(u32::MAX), 0, 1 << 31, 65_536, 65_535, 12_345_678];
    for key in keys {
        map.insert(key, format!("v{key}")).unwrap();
    }
    for key in keys {
        assert_eq!(map.get(key).map(String::as_str), Some(format!("v{key}").as_str()));
    }
    let mut sorted = keys;
    sorted.sort_unstable();
    assert_eq!(map.keys().collect::<Vec<_>>(), sorted);
    assert_eq!(map.first_key_value(), Some((0, &String::from("v0"))));
    assert_eq!(map.max_key(), Some(u64::from(u32::MAX)));
}

#[test]
fn removing_everything_leaves_an_empty_map() {
    let mut map = VebMap::with_bits(20).unwrap();
    for key in (0..50_000u64).step_by(37) {
        map.insert(key, key).unwrap();
    }
    for key in (0..50_000u64).step_by(37).collect::<Vec<_>>().into_iter().rev() {
        assert_eq!(map.remove(key), Some(key));
    }
    assert!(map.is_empty());
    assert_eq!(map.min_key(), None);
    assert_eq!(map.successor(0), None);
}

#[test]
fn out_of_domain_puts_are_rejected() {
    let mut map = VebMap::with_bits(12).unwrap();
    assert_eq!(map.insert(4_096, 'x'), Err(VebError::OutOfDomain { key: 4_096, bits: 12 }));
    assert_eq!(map.insert(4_095, 'y'), Ok(None));
    assert_eq!(map.get(4_096), None);
    assert_eq!(map.remove(4_096), None);
    assert_eq!(map.len(), 1);
}

#[test]
fn values_iterate_in_key_order() {
    let map: VebMap<&str> = [(30, "c"), (10, "a"), (20, "b")].into_iter().collect();
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(map.iter().len(), 3);
}

// ─── Randomized comparison against BTreeMap ─────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn counting_matches_btreemap(keys in proptest::collection::vec(0u64..5_000, 0..3_000)) {
        let mut map = VebMap::with_bits(13).unwrap();
        count_occurrences(&mut map, &keys);

        let mut model = BTreeMap::new();
        for key in &keys {
            *model.entry(*key).or_insert(0u32) += 1;
        }

        prop_assert_eq!(map.len(), model.len());
        prop_assert!(map.iter().eq(model.iter().map(|(k, v)| (*k, v))));

        map.retain(|key, _| key % 3 != 0);
        model.retain(|key, _| key % 3 != 0);
        prop_assert!(map.iter().eq(model.iter().map(|(k, v)| (*k, v))));
    }
}
