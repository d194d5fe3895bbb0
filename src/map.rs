// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The contract shared by every map backend.
//!
//! [`PersistentMap`] is implemented by [`GenericHashMap`], [`GenericRbMap`]
//! and [`GenericBTreeMap`], so code can be written against any backend and
//! handed whichever one fits its workload: the hash trie for cheap unordered
//! access, the red-black tree for ordered access with minimal node size, the
//! B-tree for ordered access with cache-friendly fat nodes.
//!
//! [`GenericHashMap`]: ../hashmap/struct.GenericHashMap.html
//! [`GenericRbMap`]: ../rbmap/struct.GenericRbMap.html
//! [`GenericBTreeMap`]: ../btreemap/struct.GenericBTreeMap.html

use crate::error::Error;

/// A persistent map: updates return new map values, old values stay valid.
///
/// All operations observe a fixed snapshot. Iterators are lazy, finite and
/// restartable: each call to [`iter`][PersistentMap::iter] starts a fresh
/// traversal, and since the map value itself never changes, later updates
/// elsewhere can't be observed through it.
pub trait PersistentMap<K, V>: Sized {
    /// The iterator returned by [`iter`][PersistentMap::iter].
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)> + Clone
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Get the value for a key. Absence is `None`, never an error.
    fn get(&self, key: &K) -> Option<&V>;

    /// Construct a new map with the key bound to the value, leaving this
    /// map as it was.
    #[must_use]
    fn update(&self, key: K, value: V) -> Self;

    /// Construct a new map with the key absent, leaving this map as it
    /// was.
    #[must_use]
    fn without(&self, key: &K) -> Self;

    /// The number of entries in the map.
    fn len(&self) -> usize;

    /// Iterate over the entries. Ordering is backend-defined: ascending
    /// for the ordered backends, unspecified for the hash trie.
    fn iter(&self) -> Self::Iter<'_>;

    /// Test whether the map is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test for the presence of a key.
    #[inline]
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get the value for a key which is required to be present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    #[inline]
    fn get_required(&self, key: &K) -> Result<&V, Error> {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Compare the entries of two maps, regardless of backend: equal when
    /// both maps hold exactly the same key/value pairs. Iteration order
    /// does not participate.
    fn same_entries<M>(&self, other: &M) -> bool
    where
        M: PersistentMap<K, V>,
        V: PartialEq,
    {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

/// A map wrapper whose `get` computes a default from the key instead of
/// reporting absence.
///
/// # Examples
///
/// ```
/// # use immap::{HashMap, PersistentMap, WithDefault};
/// let map = HashMap::unit("one", 1).with_default(|k: &&str| k.len() as i32);
/// assert_eq!(1, map.get(&"one"));
/// assert_eq!(5, map.get(&"three"));
/// ```
#[derive(Clone, Debug)]
pub struct WithDefault<M, F> {
    map: M,
    default: F,
}

impl<M, F> WithDefault<M, F> {
    pub fn new(map: M, default: F) -> Self {
        WithDefault { map, default }
    }

    /// The wrapped map.
    pub fn as_map(&self) -> &M {
        &self.map
    }

    /// Unwrap the map, discarding the default.
    pub fn into_map(self) -> M {
        self.map
    }

    /// Get the value for a key, falling back to the computed default.
    pub fn get<K, V>(&self, key: &K) -> V
    where
        M: PersistentMap<K, V>,
        F: Fn(&K) -> V,
        V: Clone,
    {
        match self.map.get(key) {
            Some(value) => value.clone(),
            None => (self.default)(key),
        }
    }

    /// Construct a new wrapped map with the key bound to the value,
    /// keeping the same default.
    #[must_use]
    pub fn update<K, V>(&self, key: K, value: V) -> Self
    where
        M: PersistentMap<K, V>,
        F: Clone,
    {
        WithDefault {
            map: self.map.update(key, value),
            default: self.default.clone(),
        }
    }

    /// Construct a new wrapped map with the key absent, keeping the same
    /// default.
    #[must_use]
    pub fn without<K, V>(&self, key: &K) -> Self
    where
        M: PersistentMap<K, V>,
        F: Clone,
    {
        WithDefault {
            map: self.map.without(key),
            default: self.default.clone(),
        }
    }

    pub fn len<K, V>(&self) -> usize
    where
        M: PersistentMap<K, V>,
    {
        self.map.len()
    }

    pub fn is_empty<K, V>(&self) -> bool
    where
        M: PersistentMap<K, V>,
    {
        self.map.is_empty()
    }

    pub fn contains_key<K, V>(&self, key: &K) -> bool
    where
        M: PersistentMap<K, V>,
    {
        self.map.contains_key(key)
    }
}

/// A map wrapper whose `get` substitutes a fixed value for absence.
///
/// # Examples
///
/// ```
/// # use immap::{HashMap, PersistentMap, WithDefaultValue};
/// let map = HashMap::unit("one", 1).with_default_value(0);
/// assert_eq!(&1, map.get(&"one"));
/// assert_eq!(&0, map.get(&"three"));
/// ```
#[derive(Clone, Debug)]
pub struct WithDefaultValue<M, V> {
    map: M,
    default: V,
}

impl<M, V> WithDefaultValue<M, V> {
    pub fn new(map: M, default: V) -> Self {
        WithDefaultValue { map, default }
    }

    /// The wrapped map.
    pub fn as_map(&self) -> &M {
        &self.map
    }

    /// Unwrap the map, discarding the default.
    pub fn into_map(self) -> M {
        self.map
    }

    /// Get the value for a key, falling back to the default value.
    pub fn get<K>(&self, key: &K) -> &V
    where
        M: PersistentMap<K, V>,
    {
        self.map.get(key).unwrap_or(&self.default)
    }

    /// Construct a new wrapped map with the key bound to the value,
    /// keeping the same default.
    #[must_use]
    pub fn update<K>(&self, key: K, value: V) -> Self
    where
        M: PersistentMap<K, V>,
        V: Clone,
    {
        WithDefaultValue {
            map: self.map.update(key, value),
            default: self.default.clone(),
        }
    }

    /// Construct a new wrapped map with the key absent, keeping the same
    /// default.
    #[must_use]
    pub fn without<K>(&self, key: &K) -> Self
    where
        M: PersistentMap<K, V>,
        V: Clone,
    {
        WithDefaultValue {
            map: self.map.without(key),
            default: self.default.clone(),
        }
    }

    pub fn len<K>(&self) -> usize
    where
        M: PersistentMap<K, V>,
    {
        self.map.len()
    }

    pub fn is_empty<K>(&self) -> bool
    where
        M: PersistentMap<K, V>,
    {
        self.map.is_empty()
    }

    pub fn contains_key<K>(&self, key: &K) -> bool
    where
        M: PersistentMap<K, V>,
    {
        self.map.contains_key(key)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{BTreeMap, Error, HashMap, RbMap};

    fn backends(entries: &[(i32, i32)]) -> (HashMap<i32, i32>, RbMap<i32, i32>, BTreeMap<i32, i32>) {
        let hash: HashMap<i32, i32> = entries.iter().cloned().collect();
        let rb: RbMap<i32, i32> = entries.iter().cloned().collect();
        let btree: BTreeMap<i32, i32> = entries.iter().cloned().collect();
        (hash, rb, btree)
    }

    #[test]
    fn backends_agree_after_identical_operations() {
        let entries: Vec<(i32, i32)> = (0..256).map(|i| (i * 37 % 101, i)).collect();
        let (mut hash, mut rb, mut btree) = backends(&[]);
        for (k, v) in &entries {
            hash = hash.update(*k, *v);
            rb = rb.update(*k, *v);
            btree = btree.update(*k, *v);
        }
        for k in [3, 17, 99, 100, 44] {
            hash = hash.without(&k);
            rb = rb.without(&k);
            btree = btree.without(&k);
        }
        assert!(hash.same_entries(&rb));
        assert!(rb.same_entries(&btree));
        assert!(btree.same_entries(&hash));
        assert_eq!(hash.len(), rb.len());
        assert_eq!(rb.len(), btree.len());
    }

    #[test]
    fn backends_agree_across_btree_orders() {
        let entries: Vec<(i32, i32)> = (0..300).map(|i| (i * 7 % 271, i)).collect();
        let (hash, rb, _) = backends(&entries);
        for order in [4, 5, 7, 16] {
            let mut btree = BTreeMap::with_order(order).unwrap();
            for (k, v) in &entries {
                btree.insert(*k, *v);
            }
            assert!(btree.same_entries(&hash));
            assert!(btree.same_entries(&rb));
        }
    }

    #[test]
    fn same_entries_detects_differences() {
        let (hash, rb, btree) = backends(&[(1, 1), (2, 2)]);
        assert!(hash.same_entries(&rb));
        let rb2 = rb.update(2, 3);
        assert!(!hash.same_entries(&rb2));
        let btree2 = btree.without(&1);
        assert!(!btree2.same_entries(&hash));
    }

    #[test]
    fn get_required_reports_absence() {
        let (hash, rb, btree) = backends(&[(1, 10)]);
        assert_eq!(Ok(&10), hash.get_required(&1));
        assert_eq!(Err(Error::NotFound), hash.get_required(&2));
        assert_eq!(Ok(&10), rb.get_required(&1));
        assert_eq!(Err(Error::NotFound), rb.get_required(&2));
        assert_eq!(Ok(&10), btree.get_required(&1));
        assert_eq!(Err(Error::NotFound), btree.get_required(&2));
    }

    #[test]
    fn with_default_computes_from_key() {
        let map = RbMap::unit(2, 20).with_default(|k: &i32| k * 10);
        assert_eq!(20, map.get(&2));
        assert_eq!(70, map.get(&7));
        let map = map.update(7, 0);
        assert_eq!(0, map.get(&7));
        assert_eq!(20, map.without(&2).get(&2));
    }

    #[test]
    fn with_default_value_substitutes_fixed_value() {
        let map = HashMap::unit("hit", 1).with_default_value(-1);
        assert_eq!(&1, map.get(&"hit"));
        assert_eq!(&-1, map.get(&"miss"));
        assert_eq!(1, map.len());
        assert!(map.contains_key(&"hit"));
        assert!(!map.contains_key(&"miss"));
    }

    #[test]
    fn contract_iteration_is_restartable() {
        let (_, rb, _) = backends(&[(1, 1), (2, 2), (3, 3)]);
        let first: Vec<_> = rb.iter().collect();
        let second: Vec<_> = rb.iter().collect();
        assert_eq!(first, second);
    }
}
