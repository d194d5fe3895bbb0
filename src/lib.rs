// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Persistent immutable maps for Rust
//!
//! This library provides a family of persistent associative maps. An
//! update to a persistent map returns a *new* map value, leaving every
//! previously obtained map value exactly as it was; the versions share
//! the bulk of their structure, so an update costs O(log n) freshly
//! allocated nodes rather than a full copy.
//!
//! Three interchangeable backends implement one contract
//! ([`PersistentMap`]):
//!
//! * [`HashMap`][hashmap::HashMap] — a hash array mapped trie. Unordered,
//!   effectively O(1) access, needs `Hash + Eq` keys. The right default
//!   when you don't care about ordering.
//! * [`RbMap`][rbmap::RbMap] — a red-black binary search tree. Ordered
//!   iteration and range scans, one entry per node, cheapest
//!   path-copying for write-heavy workloads.
//! * [`BTreeMap`][btreemap::BTreeMap] — a B-tree with a configurable
//!   branching factor ([`BTreeSpec`][btreemap::BTreeSpec]). Ordered, fat
//!   cache-friendly nodes, the best reader throughput of the ordered
//!   backends.
//!
//! The key strategy — a [`BuildHasher`][std::hash::BuildHasher] for the
//! hash map, a [`Comparator`][compare::Comparator] for the ordered maps —
//! is supplied when a map is created and inherited by every map derived
//! from it.
//!
//! # In-place mutation
//!
//! These types also expose a mutable API (`insert`, `remove`, `get_mut`)
//! in the style of [`std::collections`]. It is implemented as
//! copy-on-write: a node is only ever mutated while it is uniquely
//! owned, and is copied first if any other map still references it, so
//! mutating one map can never be observed through another. When a
//! subtree isn't shared, this makes batch construction considerably
//! cheaper than going through the persistent API.
//!
//! # Thread safety
//!
//! Map values are ordinary immutable values: any number of threads can
//! read any version concurrently, and any number of writers can derive
//! new versions from a shared base, all without synchronization. The
//! library deliberately offers no shared "latest version" cell; if you
//! need one, put a map in an [`arc_swap`] or a mutex and swap whole map
//! values through it.
//!
//! By default nodes are reference counted with [`std::sync::Arc`]
//! through the [`archery`] pointer abstraction; the `Generic*` forms of
//! each type can be instantiated with [`RcK`][shared_ptr::RcK] instead
//! to trade `Send + Sync` for cheaper counter updates.
//!
//! # Feature flags
//!
//! * `serde`: `Serialize`/`Deserialize` for all map types.
//! * `proptest`: strategies for generating maps in property tests.
//! * `quickcheck`, `arbitrary`: `Arbitrary` impls for the map types.
//! * `triomphe`: use `triomphe::Arc` as the default shared pointer.
//! * `small-chunks`: shrink the trie fan-out and the default B-tree
//!   order, so structural edge cases show up in small tests.
//!
//! [`arc_swap`]: https://docs.rs/arc-swap/
//! [`archery`]: https://docs.rs/archery/

#![deny(unsafe_code, nonstandard_style)]
#![warn(rust_2018_idioms)]

#[macro_use]
mod util;

mod config;
mod error;
mod nodes;

pub mod compare;
pub mod map;
pub mod shared_ptr;

mod btree;
mod hash;
mod rb;

pub use crate::btree::map as btreemap;
pub use crate::hash::map as hashmap;
pub use crate::rb::map as rbmap;

pub use crate::btreemap::{BTreeMap, BTreeSpec, GenericBTreeMap};
pub use crate::compare::{Comparator, NaturalOrder};
pub use crate::error::Error;
pub use crate::hashmap::{GenericHashMap, HashMap};
pub use crate::map::{PersistentMap, WithDefault, WithDefaultValue};
pub use crate::rbmap::{GenericRbMap, RbMap};

#[cfg(feature = "arbitrary")]
mod arbitrary;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;
#[cfg(feature = "quickcheck")]
mod quickcheck;
#[cfg(feature = "serde")]
mod ser;

#[cfg(test)]
pub mod test;
