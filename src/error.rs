// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error values returned by fallible map operations.
//!
//! Structural events inside the trees (splits, merges, rotations, branch
//! collapses) always resolve internally and are never surfaced here.

use crate::btree::map::MIN_ORDER;

/// The error type for map operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required key was absent from the map.
    #[error("key not found in map")]
    NotFound,
    /// A B-tree was configured with an order too small to split a full
    /// node into two legal halves.
    #[error("invalid B-tree order {0}, must be at least {MIN_ORDER}")]
    InvalidOrder(usize),
}
