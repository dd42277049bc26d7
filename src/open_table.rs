//! # OpenAddressTable
//!
//! This module implements a generic open-addressing hash table with linear
//! probing. All entries live directly in one contiguous bucket array;
//! collisions are resolved by probing forward (wrapping at the array end)
//! rather than by chaining.
//!
//! Deletion is lazy: erasing a key flips its bucket to a tombstone that keeps
//! occupying a slot until the next growth rebuilds the array and reclaims it.
//! The table doubles its capacity whenever the load factor would exceed one
//! half, which bounds the expected probe-sequence length.
//!
//! The hash function is injected at construction time. Any type implementing
//! [`KeyHash`] works; [`HashFn`] wraps a plain closure and [`RandomKeyHash`]
//! (the default) hashes any `K: Hash` with a per-instance random state.
//!
//! ## Example
//!
//! ```rust
//! use openaddr::open_table::OpenAddressTable;
//!
//! let mut table = OpenAddressTable::new();
//! assert!(table.insert("apple", 3));
//! assert!(table.insert("pear", 5));
//!
//! // A second insert of the same key is a no-op.
//! assert!(!table.insert("apple", 99));
//! assert_eq!(table.get(&"apple"), Some(&3));
//!
//! // Erasing reports how many entries were removed (0 or 1).
//! assert_eq!(table.erase(&"pear"), 1);
//! assert_eq!(table.erase(&"pear"), 0);
//! assert_eq!(table.len(), 1);
//! ```

use std::collections::TryReserveError;
use std::hash::Hash;
use std::mem;

use ahash::RandomState;
use thiserror::Error;

/// Number of buckets a freshly constructed table starts with.
const INITIAL_CAPACITY: usize = 20;

/// A pluggable hash function from keys to unsigned integers.
///
/// The only requirement is determinism: equal keys must hash equally for the
/// lifetime of the table instance. No distribution properties are assumed.
pub trait KeyHash<K> {
    fn hash_key(&self, key: &K) -> u64;
}

/// Adapter turning any `Fn(&K) -> u64` closure into a [`KeyHash`].
#[derive(Clone)]
pub struct HashFn<F>(pub F);

impl<K, F> KeyHash<K> for HashFn<F>
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        (self.0)(key)
    }
}

/// The default hasher: a randomly seeded `ahash` state applied to any
/// hashable key. Seeds are drawn once per table, so equal keys hash equally
/// within an instance.
#[derive(Clone, Default)]
pub struct RandomKeyHash(RandomState);

impl<K: Hash> KeyHash<K> for RandomKeyHash {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }
}

/// Errors surfaced by the fallible parts of the API.
#[derive(Debug, Error)]
pub enum TableError {
    /// The backing array for a growth step could not be allocated. The table
    /// is left exactly as it was before the failing operation.
    #[error("failed to allocate a bucket array of {requested} slots: {source}")]
    OutOfMemory {
        requested: usize,
        source: TryReserveError,
    },
}

/// One slot of the bucket array.
///
/// `Deleted` is a tombstone: the entry is logically gone, but the slot stays
/// non-empty so probe sequences that were built past it keep working. It is
/// reclaimed either by a later insert or by the next growth rebuild.
enum Bucket<K, V> {
    Empty,
    Occupied { key: K, val: V },
    Deleted,
}

/// Outcome of a probe sequence: either the slot holding the key, or the slot
/// a new entry for that key should be installed into.
enum Probe {
    Found(usize),
    Vacant(usize),
}

/// An open-addressing hash table with linear probing and tombstone deletion.
///
/// Keys need equality only; values are opaque. The hash function is supplied
/// by the `H` type parameter and defaults to [`RandomKeyHash`].
pub struct OpenAddressTable<K, V, H = RandomKeyHash> {
    buckets: Vec<Bucket<K, V>>,
    num_elements: usize,
    hasher: H,
}

impl<K, V> OpenAddressTable<K, V> {
    /// Creates an empty table with the default capacity and hasher.
    pub fn new() -> Self {
        Self::with_hasher(RandomKeyHash::default())
    }
}

impl<K, V> Default for OpenAddressTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> OpenAddressTable<K, V, H> {
    /// Creates an empty table with the default capacity and the given hasher.
    pub fn with_hasher(hasher: H) -> Self {
        let mut buckets = Vec::with_capacity(INITIAL_CAPACITY);
        buckets.resize_with(INITIAL_CAPACITY, || Bucket::Empty);
        Self {
            buckets,
            num_elements: 0,
            hasher,
        }
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_elements
    }

    /// Returns `true` if the table holds no live entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_elements == 0
    }

    /// Returns the current number of bucket slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current load factor (live entries divided by capacity).
    /// Never exceeds one half after an insert returns.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.num_elements as f64 / self.buckets.len() as f64
    }
}

impl<K, V, H> OpenAddressTable<K, V, H>
where
    K: Eq,
    H: KeyHash<K>,
{
    /// Inserts a key/value pair.
    ///
    /// Returns `false` and changes nothing if the key is already present.
    /// Otherwise installs the entry into the first tombstone or empty slot on
    /// its probe path and returns `true`, growing the table afterwards if the
    /// load factor would exceed one half.
    ///
    /// # Panics
    ///
    /// Panics if a growth step fails to allocate. Use [`try_insert`] to
    /// handle allocation failure as an error instead.
    ///
    /// [`try_insert`]: OpenAddressTable::try_insert
    pub fn insert(&mut self, key: K, val: V) -> bool {
        match self.try_insert(key, val) {
            Ok(inserted) => inserted,
            Err(err) => panic!("open-addressing table growth failed: {err}"),
        }
    }

    /// Fallible variant of [`insert`](OpenAddressTable::insert).
    ///
    /// If growing the table fails, the entry installed by this call is rolled
    /// back, the table is left exactly as it was before the call, and
    /// [`TableError::OutOfMemory`] is returned.
    pub fn try_insert(&mut self, key: K, val: V) -> Result<bool, TableError> {
        let slot = match self.probe(&key) {
            Probe::Found(_) => return Ok(false),
            Probe::Vacant(slot) => slot,
        };

        // The displaced bucket is Empty or Deleted; keep it for rollback.
        let displaced = mem::replace(&mut self.buckets[slot], Bucket::Occupied { key, val });
        self.num_elements += 1;

        if 2 * self.num_elements > self.buckets.len() {
            if let Err(err) = self.rehash_and_grow() {
                self.buckets[slot] = displaced;
                self.num_elements -= 1;
                return Err(err);
            }
        }

        Ok(true)
    }

    /// Removes the entry for `key`, returning how many entries were removed
    /// (0 or 1).
    ///
    /// Removal only flips the bucket to a tombstone; the array never shrinks
    /// and neighboring entries are never relocated.
    pub fn erase(&mut self, key: &K) -> usize {
        match self.probe(key) {
            Probe::Found(slot) => {
                self.buckets[slot] = Bucket::Deleted;
                self.num_elements -= 1;
                1
            }
            Probe::Vacant(_) => 0,
        }
    }

    /// Returns a reference to the value stored for `key`, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        match self.probe(key) {
            Probe::Found(slot) => Some(self.value_at(slot)),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value stored for `key`, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.probe(key) {
            Probe::Found(slot) => Some(self.value_at_mut(slot)),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting a
    /// default value first if the key is absent.
    ///
    /// The insert attempt is made unconditionally and its outcome ignored; a
    /// fresh probe then locates the authoritative slot, so an existing value
    /// is never overwritten.
    ///
    /// # Panics
    ///
    /// Panics if a growth step triggered by the insert fails to allocate.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default,
    {
        self.insert(key.clone(), V::default());
        match self.probe(&key) {
            Probe::Found(slot) => self.value_at_mut(slot),
            Probe::Vacant(_) => unreachable!("key is absent immediately after insert"),
        }
    }

    /// The slot a key maps to before any probing.
    #[inline]
    fn home_slot(&self, key: &K) -> usize {
        (self.hasher.hash_key(key) % self.buckets.len() as u64) as usize
    }

    /// The single search primitive behind insert, erase, and lookup.
    ///
    /// Probes linearly from the key's home slot. Occupied slots holding other
    /// keys and tombstones are skipped; the walk stops at a matching slot or
    /// at the first empty one. The first tombstone seen along the way is
    /// remembered and returned as the vacant candidate, so inserts reclaim
    /// tombstones greedily. The candidate is only returned once the whole
    /// path up to an empty slot has been checked for the key, keeping
    /// duplicate detection ahead of tombstone reuse.
    fn probe(&self, key: &K) -> Probe {
        let capacity = self.buckets.len();
        let mut index = self.home_slot(key);
        let mut first_tombstone = None;

        for _ in 0..capacity {
            match &self.buckets[index] {
                Bucket::Empty => return Probe::Vacant(first_tombstone.unwrap_or(index)),
                Bucket::Occupied { key: occupant, .. } if occupant == key => {
                    return Probe::Found(index);
                }
                Bucket::Deleted if first_tombstone.is_none() => first_tombstone = Some(index),
                _ => {}
            }
            index = (index + 1) % capacity;
        }

        // A full cycle without an empty slot. Live entries are at most half
        // the table, so the remaining slots must include a tombstone.
        Probe::Vacant(first_tombstone.expect("full probe cycle over a table with no tombstone"))
    }

    /// Rebuilds the bucket array at double the capacity.
    ///
    /// Every occupied bucket of the old array is re-probed against the new
    /// capacity (hashes are never cached) and moved over; empty buckets and
    /// tombstones are dropped, so the rebuild reclaims all tombstone slots.
    /// The new array is fully reserved before anything is touched, making the
    /// swap atomic from the caller's perspective.
    fn rehash_and_grow(&mut self) -> Result<(), TableError> {
        let new_capacity = self.buckets.len() * 2;

        let mut fresh = Vec::new();
        fresh
            .try_reserve_exact(new_capacity)
            .map_err(|source| TableError::OutOfMemory {
                requested: new_capacity,
                source,
            })?;
        fresh.resize_with(new_capacity, || Bucket::Empty);

        let old = mem::replace(&mut self.buckets, fresh);
        for bucket in old {
            if let Bucket::Occupied { key, val } = bucket {
                let slot = match self.probe(&key) {
                    Probe::Vacant(slot) => slot,
                    Probe::Found(_) => unreachable!("two occupied buckets held the same key"),
                };
                self.buckets[slot] = Bucket::Occupied { key, val };
            }
        }

        Ok(())
    }

    fn value_at(&self, slot: usize) -> &V {
        match &self.buckets[slot] {
            Bucket::Occupied { val, .. } => val,
            _ => unreachable!("probe returned a slot that is not occupied"),
        }
    }

    fn value_at_mut(&mut self, slot: usize) -> &mut V {
        match &mut self.buckets[slot] {
            Bucket::Occupied { val, .. } => val,
            _ => unreachable!("probe returned a slot that is not occupied"),
        }
    }
}
