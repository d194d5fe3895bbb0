// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// The level size of the hash trie, in bits.
/// Branching factor is 2 ^ HASH_LEVEL_SIZE.
#[cfg(feature = "small-chunks")]
pub(crate) const HASH_LEVEL_SIZE: usize = 2;
#[cfg(not(feature = "small-chunks"))]
pub(crate) const HASH_LEVEL_SIZE: usize = 5;

/// The branching factor of B-tree maps built without an explicit order.
// Must be at least 4 so a full node can split into two legal halves.
// Value of 6 chosen to improve test coverage, specifically so that both
// deletion node merging and borrowing are exercised.
#[cfg(feature = "small-chunks")]
pub(crate) const DEFAULT_BTREE_ORDER: usize = 6;
#[cfg(not(feature = "small-chunks"))]
pub(crate) const DEFAULT_BTREE_ORDER: usize = 64;
