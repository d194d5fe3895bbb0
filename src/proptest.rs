// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies for the map types.
//!
//! These are only available when using the `proptest` feature flag.

use std::hash::Hash;
use std::ops::Range;

use ::proptest::collection::vec;
use ::proptest::strategy::{BoxedStrategy, Strategy};

use crate::{BTreeMap, HashMap, RbMap};

/// A strategy for a hash map of a given size.
///
/// # Examples
///
/// ```rust,no_run
/// # use ::proptest::proptest;
/// proptest! {
///     #[test]
///     fn proptest_works(ref m in immap::proptest::hash_map(0..9999, ".*", 10..100)) {
///         assert!(m.len() < 100);
///         assert!(m.len() >= 10);
///     }
/// }
/// ```
pub fn hash_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<HashMap<K::Value, V::Value>>
where
    K::Value: Hash + Eq + Clone,
    V::Value: Clone,
{
    vec((key, value), size.clone())
        .prop_map(HashMap::from)
        .prop_filter("Map minimum size".to_owned(), move |m| {
            m.len() >= size.start
        })
        .boxed()
}

/// A strategy for a red-black map of a given size.
pub fn rb_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<RbMap<K::Value, V::Value>>
where
    K::Value: Ord + Clone,
    V::Value: Clone,
{
    vec((key, value), size.clone())
        .prop_map(RbMap::from)
        .prop_filter("Map minimum size".to_owned(), move |m| {
            m.len() >= size.start
        })
        .boxed()
}

/// A strategy for a B-tree map of a given size, using the default
/// branching factor.
pub fn btree_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<BTreeMap<K::Value, V::Value>>
where
    K::Value: Ord + Clone,
    V::Value: Clone,
{
    vec((key, value), size.clone())
        .prop_map(BTreeMap::from)
        .prop_filter("Map minimum size".to_owned(), move |m| {
            m.len() >= size.start
        })
        .boxed()
}
