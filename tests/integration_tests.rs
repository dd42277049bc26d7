use std::collections::HashMap;

use openaddr::open_table::{HashFn, OpenAddressTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maps each key to itself so home slots are predictable.
fn identity() -> HashFn<fn(&u64) -> u64> {
    let hash: fn(&u64) -> u64 = |key| *key;
    HashFn(hash)
}

/// The full lifecycle on a fresh table: ten inserts, five erasures, one
/// access-or-default, one late insert, then a verification sweep.
#[test]
fn integration_insert_erase_access() {
    let mut table: OpenAddressTable<u64, String, _> = OpenAddressTable::with_hasher(identity());

    for key in 1..=10u64 {
        assert!(table.insert(key, format!("v{key}")));
    }
    assert_eq!(table.len(), 10);

    for key in [2u64, 4, 6, 8, 10] {
        assert_eq!(table.erase(&key), 1);
    }
    assert_eq!(table.len(), 5);

    // Key 4 was erased, so this inserts a fresh default value.
    assert_eq!(*table.get_or_insert_default(4), "");
    assert_eq!(table.len(), 6);

    assert!(table.insert(11, "v11".to_string()));

    assert_eq!(table.get(&1), Some(&"v1".to_string()));
    assert_eq!(table.get(&4), Some(&String::new()));
    assert_eq!(table.get(&11), Some(&"v11".to_string()));
    assert_eq!(table.get(&2), None);
    assert_eq!(table.erase(&2), 0);
}

/// Every insert below the growth threshold is retrievable with its exact
/// original value.
#[test]
fn integration_round_trip_before_growth() {
    let mut table = OpenAddressTable::new();
    for key in 0..10u32 {
        assert!(table.insert(key, key.wrapping_mul(0x9E37)));
    }
    assert_eq!(table.capacity(), 20);
    for key in 0..10u32 {
        assert_eq!(table.get(&key), Some(&key.wrapping_mul(0x9E37)));
    }
}

/// Crossing the half-load threshold doubles the capacity and keeps every
/// entry retrievable.
#[test]
fn integration_growth_preserves_entries() {
    let mut table = OpenAddressTable::new();
    let initial_capacity = table.capacity();

    for key in 0..100u64 {
        assert!(table.insert(key, format!("value-{key}")));
    }
    assert!(table.capacity() > initial_capacity);
    assert!(2 * table.len() <= table.capacity());

    for key in 0..100u64 {
        assert_eq!(table.get(&key), Some(&format!("value-{key}")));
    }
}

/// Insert a batch, erase every other key, refill with new keys, and force a
/// growth: survivors keep their values and erased keys stay absent.
#[test]
fn integration_tombstones_survive_growth() {
    let mut table = OpenAddressTable::new();

    for key in 0..10u64 {
        assert!(table.insert(key, key * 3));
    }
    for key in (0..10u64).step_by(2) {
        assert_eq!(table.erase(&key), 1);
    }
    assert_eq!(table.len(), 5);

    // These reuse freed slots, then push the table over the threshold.
    for key in 1000..1008u64 {
        assert!(table.insert(key, key * 3));
    }
    assert!(table.capacity() > 20);

    for key in (1..10u64).step_by(2) {
        assert_eq!(table.get(&key), Some(&(key * 3)));
    }
    for key in 1000..1008u64 {
        assert_eq!(table.get(&key), Some(&(key * 3)));
    }
    for key in (0..10u64).step_by(2) {
        assert_eq!(table.get(&key), None);
    }
}

/// A randomized mix of inserts, erasures, and lookups checked against the
/// standard library map at every step.
#[test]
fn integration_stress_against_std_map() {
    let mut rng = StdRng::seed_from_u64(0x0A11_BEEF);
    let mut table = OpenAddressTable::new();
    let mut model: HashMap<u16, u32> = HashMap::new();

    for _ in 0..10_000 {
        let key: u16 = rng.gen_range(0..512);
        match rng.gen_range(0..10) {
            0..=5 => {
                let val: u32 = rng.gen();
                let expect_new = !model.contains_key(&key);
                if expect_new {
                    model.insert(key, val);
                }
                assert_eq!(table.insert(key, val), expect_new);
            }
            6..=8 => {
                let expect_removed = usize::from(model.remove(&key).is_some());
                assert_eq!(table.erase(&key), expect_removed);
            }
            _ => {
                assert_eq!(table.get(&key), model.get(&key));
            }
        }
        assert_eq!(table.len(), model.len());
    }

    for (key, val) in &model {
        assert_eq!(table.get(key), Some(val));
    }
}
