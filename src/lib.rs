//! # openaddr
//!
//! This crate provides a generic open-addressing hash table. All entries live
//! in a single contiguous bucket array; collisions are resolved by linear
//! probing, deletion is lazy via tombstones, and the table doubles its
//! capacity whenever the load factor would exceed one half, reclaiming every
//! tombstone in the process.
//!
//! Keys only need equality; the hash function is injected at construction and
//! defaults to a randomly seeded `ahash` state.

pub mod open_table;
