// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered map backed by a persistent red-black tree.
//!
//! Entries are kept sorted by the map's [`Comparator`], so iteration
//! yields them in ascending key order and range scans come for free.
//! Lookups, updates and removals are O(log n); nodes are small (one
//! entry each), which keeps the cost of path-copying low for write-heavy
//! workloads.
//!
//! For a map with fatter nodes and better cache behavior on reads, see
//! [`btreemap`][crate::btreemap]; for an unordered map without the `Ord`
//! requirement, see [`hashmap`][crate::hashmap].

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections;
use std::fmt::{Debug, Error as FmtError, Formatter};
use std::iter::{FromIterator, FusedIterator};
use std::ops::{Index, IndexMut, RangeBounds};

use archery::SharedPointerKind;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::Error;
use crate::map::{PersistentMap, WithDefault, WithDefaultValue};
use crate::nodes::rbtree::{
    blacken_root, insert as node_insert, lookup, lookup_mut, max as node_max, min as node_min,
    remove as node_remove, ConsumingIter as NodeConsumingIter, Iter as NodeIter, Link,
};
use crate::shared_ptr::DefaultSharedPtr;

/// Construct a red-black map from a sequence of key/value pairs.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate immap;
/// # use immap::RbMap;
/// # fn main() {
/// assert_eq!(
///   rbmap!{
///     1 => 11,
///     2 => 22,
///     3 => 33
///   },
///   RbMap::from(vec![(1, 11), (2, 22), (3, 33)])
/// );
/// # }
/// ```
#[macro_export]
macro_rules! rbmap {
    () => { $crate::rbmap::RbMap::new() };

    ( $( $key:expr => $value:expr ),* ) => {{
        let mut map = $crate::rbmap::RbMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};

    ( $( $key:expr => $value:expr ,)* ) => {{
        let mut map = $crate::rbmap::RbMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};
}

/// Type alias for [`GenericRbMap`] that uses [`NaturalOrder`] as the
/// comparator and [`DefaultSharedPtr`] as the pointer type.
///
/// [GenericRbMap]: ./struct.GenericRbMap.html
/// [NaturalOrder]: ../compare/struct.NaturalOrder.html
/// [DefaultSharedPtr]: ../shared_ptr/type.DefaultSharedPtr.html
pub type RbMap<K, V> = GenericRbMap<K, V, NaturalOrder, DefaultSharedPtr>;

/// An ordered map backed by a persistent red-black tree.
///
/// The ordering strategy is the `C: Comparator<K>` parameter, a value
/// supplied when the map is created and inherited by every map derived
/// from it. The tree maintains the red-black invariants — black root, no
/// red node with a red child, equal black counts on every path — by
/// rebuilding the nodes along the traversal path; published nodes are
/// never touched.
pub struct GenericRbMap<K, V, C, P: SharedPointerKind> {
    size: usize,
    root: Link<K, V, P>,
    comparator: C,
}

impl<K, V, P> GenericRbMap<K, V, NaturalOrder, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Construct a map with a single mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate immap;
    /// # use immap::RbMap;
    /// let map = RbMap::unit(123, "onetwothree");
    /// assert_eq!(
    ///   map.get(&123),
    ///   Some(&"onetwothree")
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn unit(key: K, value: V) -> Self {
        GenericRbMap::new().update(key, value)
    }
}

impl<K, V, C, P: SharedPointerKind> GenericRbMap<K, V, C, P> {
    /// Construct an empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::default()
    }

    /// Construct an empty map ordered by the provided comparator.
    ///
    /// The comparator is carried by every map derived from this one.
    #[inline]
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        GenericRbMap {
            size: 0,
            root: None,
            comparator,
        }
    }

    /// Get a reference to the map's comparator.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Test whether a map is empty.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the size of a map.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Test whether two maps refer to the same content in memory.
    ///
    /// Time: O(1)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => archery::SharedPointer::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Discard all elements from the map.
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Get an iterator over the key/value pairs of the map, in
    /// ascending key order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter {
            it: NodeIter::new(&self.root, self.size),
        }
    }

    /// Get an iterator over the map's keys, in ascending order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, P> {
        Keys { it: self.iter() }
    }

    /// Get an iterator over the map's values, in ascending key order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, P> {
        Values { it: self.iter() }
    }

    /// Get an iterator over a range of keys, in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate immap;
    /// # use immap::RbMap;
    /// let map = rbmap!{1 => 1, 2 => 2, 3 => 3, 4 => 4};
    /// let hits: Vec<i32> = map.range(2..4).map(|(k, _)| *k).collect();
    /// assert_eq!(vec![2, 3], hits);
    /// ```
    #[must_use]
    pub fn range<R, BK>(&self, range: R) -> Iter<'_, K, V, P>
    where
        R: RangeBounds<BK>,
        K: Borrow<BK>,
        C: Comparator<BK> + Comparator<K>,
        BK: ?Sized,
    {
        Iter {
            it: NodeIter::range(&self.root, &self.comparator, self.size, range),
        }
    }

    /// Get the smallest key and its value.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_min(&self) -> Option<(&K, &V)> {
        node_min(&self.root).map(|node| node.entry())
    }

    /// Get the largest key and its value.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_max(&self) -> Option<(&K, &V)> {
        node_max(&self.root).map(|node| node.entry())
    }

    /// Wrap the map so that lookups compute a default value from the
    /// key instead of reporting absence.
    #[must_use]
    pub fn with_default<F>(self, default: F) -> WithDefault<Self, F> {
        WithDefault::new(self, default)
    }

    /// Wrap the map so that lookups substitute a fixed value for
    /// absence.
    #[must_use]
    pub fn with_default_value(self, default: V) -> WithDefaultValue<Self, V> {
        WithDefaultValue::new(self, default)
    }

    /// Get the value for a key from the map.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate immap;
    /// # use immap::RbMap;
    /// let map = rbmap!{123 => "lol"};
    /// assert_eq!(
    ///   map.get(&123),
    ///   Some(&"lol")
    /// );
    /// ```
    #[must_use]
    pub fn get<BK>(&self, key: &BK) -> Option<&V>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        lookup(&self.root, &self.comparator, key).map(|node| node.value())
    }

    /// Get the key/value pair for a key from the map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_key_value<BK>(&self, key: &BK) -> Option<(&K, &V)>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        lookup(&self.root, &self.comparator, key).map(|node| node.entry())
    }

    /// Get the value for a key which must be present.
    ///
    /// Time: O(log n)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn get_required<BK>(&self, key: &BK) -> Result<&V, Error>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Test for the presence of a key in the map.
    ///
    /// Time: O(log n)
    #[inline]
    #[must_use]
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        self.get(key).is_some()
    }
}

impl<K, V, C, P> GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Clone,
    P: SharedPointerKind,
{
    /// Get a mutable reference to the value for a key.
    ///
    /// This is a copy-on-write operation: nodes shared with other maps
    /// are copied before this map mutates them, so other maps are never
    /// disturbed.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_mut<BK>(&mut self, key: &BK) -> Option<&mut V>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        lookup_mut(&mut self.root, &self.comparator.clone(), key).map(|(_, v)| v)
    }

    /// Insert a key/value mapping into the map, returning the previous
    /// value if the key was present.
    ///
    /// Time: O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Comparator<K>,
    {
        let comparator = self.comparator.clone();
        let result = node_insert(&mut self.root, &comparator, key, value);
        blacken_root(&mut self.root);
        if result.is_none() {
            self.size += 1;
        }
        result
    }

    /// Remove a key/value pair from the map, if it exists, and return
    /// the removed value.
    ///
    /// Time: O(log n)
    pub fn remove<BK>(&mut self, key: &BK) -> Option<V>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        self.remove_with_key(key).map(|(_, v)| v)
    }

    /// Remove a key/value pair from the map, if it exists, and return
    /// the removed key and value.
    ///
    /// Time: O(log n)
    pub fn remove_with_key<BK>(&mut self, key: &BK) -> Option<(K, V)>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        let comparator = self.comparator.clone();
        let (removed, _) = node_remove(&mut self.root, &comparator, key);
        blacken_root(&mut self.root);
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    /// Construct a new map by inserting a key/value mapping, leaving
    /// this map as it was.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate immap;
    /// # use immap::RbMap;
    /// let map = rbmap!{};
    /// assert_eq!(
    ///   map.update(123, "123"),
    ///   rbmap!{123 => "123"}
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn update(&self, key: K, value: V) -> Self
    where
        C: Comparator<K>,
    {
        let mut out = self.clone();
        out.insert(key, value);
        out
    }

    /// Construct a new map by inserting a key/value mapping. If the map
    /// already has a mapping for the given key, the provided function is
    /// called with the old value and the new value, and its result is
    /// inserted.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn update_with<F>(&self, key: K, value: V, f: F) -> Self
    where
        C: Comparator<K>,
        F: FnOnce(V, V) -> V,
    {
        match self.extract_with_key(&key) {
            None => self.update(key, value),
            Some((_, v2, m)) => m.update(key, f(v2, value)),
        }
    }

    /// Update the value for a given key by calling a function with the
    /// current value (or its absence) and overwriting it with the
    /// function's return value.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn alter<F>(&self, f: F, key: K) -> Self
    where
        C: Comparator<K>,
        F: FnOnce(Option<V>) -> Option<V>,
    {
        let pop = self.extract_with_key(&key);
        match (f(pop.as_ref().map(|(_, v, _)| v.clone())), pop) {
            (None, None) => self.clone(),
            (Some(v), None) => self.update(key, v),
            (None, Some((_, _, m))) => m,
            (Some(v), Some((_, _, m))) => m.update(key, v),
        }
    }

    /// Construct a new map without the given key, leaving this map as
    /// it was.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn without<BK>(&self, key: &BK) -> Self
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        match self.extract_with_key(key) {
            None => self.clone(),
            Some((_, _, map)) => map,
        }
    }

    /// Remove a key/value pair from the map, if it exists, and return
    /// the removed value as well as the updated map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn extract<BK>(&self, key: &BK) -> Option<(V, Self)>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        self.extract_with_key(key).map(|(_, v, m)| (v, m))
    }

    /// Remove a key/value pair from the map, if it exists, and return
    /// the removed key and value as well as the updated map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn extract_with_key<BK>(&self, key: &BK) -> Option<(K, V, Self)>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        let mut out = self.clone();
        out.remove_with_key(key).map(|(k, v)| (k, v, out))
    }

    /// Verify the red-black invariants. Test use only.
    #[cfg(test)]
    pub(crate) fn check_sane(&self)
    where
        C: Comparator<K>,
    {
        assert_eq!(
            self.size,
            crate::nodes::rbtree::check_sane(&self.root, &self.comparator)
        );
    }
}

impl<K, V, C, P> PersistentMap<K, V> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Clone,
    P: SharedPointerKind,
{
    type Iter<'a>
        = Iter<'a, K, V, P>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    #[inline]
    fn get(&self, key: &K) -> Option<&V> {
        lookup(&self.root, &self.comparator, key).map(|node| node.value())
    }

    #[inline]
    fn update(&self, key: K, value: V) -> Self {
        GenericRbMap::update(self, key, value)
    }

    #[inline]
    fn without(&self, key: &K) -> Self {
        GenericRbMap::without(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        GenericRbMap::len(self)
    }

    #[inline]
    fn iter(&self) -> Iter<'_, K, V, P> {
        GenericRbMap::iter(self)
    }
}

// Core traits

impl<K, V, C, P> Clone for GenericRbMap<K, V, C, P>
where
    C: Clone,
    P: SharedPointerKind,
{
    /// Clone a map.
    ///
    /// Time: O(1)
    #[inline]
    fn clone(&self) -> Self {
        GenericRbMap {
            size: self.size,
            root: self.root.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<K, V, C, P1, P2> PartialEq<GenericRbMap<K, V, C, P2>> for GenericRbMap<K, V, C, P1>
where
    V: PartialEq,
    C: Comparator<K>,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &GenericRbMap<K, V, C, P2>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|((k1, v1), (k2, v2))| {
                self.comparator.cmp(k1, k2) == Ordering::Equal && v1 == v2
            })
    }
}

impl<K, V, C, P> Eq for GenericRbMap<K, V, C, P>
where
    V: Eq,
    C: Comparator<K>,
    P: SharedPointerKind,
{
}

impl<K, V, C, P> Default for GenericRbMap<K, V, C, P>
where
    C: Default,
    P: SharedPointerKind,
{
    fn default() -> Self {
        GenericRbMap {
            size: 0,
            root: None,
            comparator: C::default(),
        }
    }
}

impl<K, V, C, RK, RV, P> Extend<(RK, RV)> for GenericRbMap<K, V, C, P>
where
    K: Clone + From<RK>,
    V: Clone + From<RV>,
    C: Comparator<K> + Clone,
    P: SharedPointerKind,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (RK, RV)>,
    {
        for (key, value) in iter {
            self.insert(From::from(key), From::from(value));
        }
    }
}

impl<BK, K, V, C, P> Index<&BK> for GenericRbMap<K, V, C, P>
where
    BK: ?Sized,
    K: Borrow<BK>,
    C: Comparator<BK>,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &BK) -> &Self::Output {
        match self.get(key) {
            None => panic!("GenericRbMap::index: invalid key"),
            Some(value) => value,
        }
    }
}

impl<BK, K, V, C, P> IndexMut<&BK> for GenericRbMap<K, V, C, P>
where
    BK: ?Sized,
    K: Clone + Borrow<BK>,
    V: Clone,
    C: Comparator<BK> + Clone,
    P: SharedPointerKind,
{
    fn index_mut(&mut self, key: &BK) -> &mut Self::Output {
        match self.get_mut(key) {
            None => panic!("GenericRbMap::index_mut: invalid key"),
            Some(value) => value,
        }
    }
}

impl<K, V, C, P> Debug for GenericRbMap<K, V, C, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut d = f.debug_map();
        for (k, v) in NodeIter::new(&self.root, self.size) {
            d.entry(k, v);
        }
        d.finish()
    }
}

// Iterators

/// An iterator over the key/value pairs of a map, in ascending key
/// order.
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    it: NodeIter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Iter<'a, K, V, P> {}

/// An iterator over the keys of a map, in ascending order.
pub struct Keys<'a, K, V, P: SharedPointerKind> {
    it: Iter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Clone for Keys<'a, K, V, P> {
    fn clone(&self) -> Self {
        Keys {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Keys<'a, K, V, P> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Keys<'a, K, V, P> {}

/// An iterator over the values of a map, in ascending key order.
pub struct Values<'a, K, V, P: SharedPointerKind> {
    it: Iter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Clone for Values<'a, K, V, P> {
    fn clone(&self) -> Self {
        Values {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Values<'a, K, V, P> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Values<'a, K, V, P> {}

/// A consuming iterator over the key/value pairs of a map, in ascending
/// key order.
pub struct ConsumingIter<K, V, P: SharedPointerKind> {
    it: NodeConsumingIter<K, V, P>,
}

impl<K, V, P> Iterator for ConsumingIter<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> ExactSizeIterator for ConsumingIter<K, V, P> {}

impl<K: Clone, V: Clone, P: SharedPointerKind> FusedIterator for ConsumingIter<K, V, P> {}

impl<'a, K, V, C, P: SharedPointerKind> IntoIterator for &'a GenericRbMap<K, V, C, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, P> IntoIterator for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);
    type IntoIter = ConsumingIter<K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        ConsumingIter {
            it: NodeConsumingIter::new(self.root, self.size),
        }
    }
}

// Conversions

impl<K, V, C, P> FromIterator<(K, V)> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from_iter<T>(i: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::default();
        for (k, v) in i {
            map.insert(k, v);
        }
        map
    }
}

impl<'a, K, V, C, P> From<&'a [(K, V)]> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: &'a [(K, V)]) -> Self {
        m.iter().cloned().collect()
    }
}

impl<K, V, C, P> From<Vec<(K, V)>> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: Vec<(K, V)>) -> Self {
        m.into_iter().collect()
    }
}

impl<K, V, C, S, P> From<collections::HashMap<K, V, S>> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: collections::HashMap<K, V, S>) -> Self {
        m.into_iter().collect()
    }
}

impl<K, V, C, P> From<collections::BTreeMap<K, V>> for GenericRbMap<K, V, C, P>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: collections::BTreeMap<K, V>) -> Self {
        m.into_iter().collect()
    }
}

// Tests

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::is_sorted;
    #[rustfmt::skip]
    use ::proptest::{collection, num::i16, proptest};
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    assert_impl_all!(RbMap<i32, i32>: Send, Sync);
    assert_not_impl_any!(RbMap<i32, *const i32>: Send, Sync);
    assert_covariant!(RbMap<T, i32> in T);
    assert_covariant!(RbMap<i32, T> in T);

    #[test]
    fn safe_mutation() {
        let v1: RbMap<usize, usize> = (0..131_072).map(|i| (i, i)).collect();
        let mut v2 = v1.clone();
        v2.insert(131_000, 23);
        assert_eq!(Some(&23), v2.get(&131_000));
        assert_eq!(Some(&131_000), v1.get(&131_000));
    }

    #[test]
    fn iterates_in_ascending_order() {
        let map: RbMap<i32, i32> = vec![(4, 4), (1, 1), (3, 3), (2, 2)].into_iter().collect();
        let keys: Vec<i32> = map.keys().cloned().collect();
        assert_eq!(vec![1, 2, 3, 4], keys);
    }

    #[test]
    fn min_max() {
        let map = rbmap! {3 => "c", 1 => "a", 2 => "b"};
        assert_eq!(Some((&1, &"a")), map.get_min());
        assert_eq!(Some((&3, &"c")), map.get_max());
        assert_eq!(None, RbMap::<i32, i32>::new().get_min());
    }

    #[test]
    fn range_scans() {
        let map: RbMap<i32, i32> = (0..100).map(|i| (i, i)).collect();
        let hits: Vec<i32> = map.range(10..20).map(|(k, _)| *k).collect();
        assert_eq!((10..20).collect::<Vec<_>>(), hits);
        let hits: Vec<i32> = map.range(90..).map(|(k, _)| *k).collect();
        assert_eq!((90..100).collect::<Vec<_>>(), hits);
        let hits: Vec<i32> = map.range(..=5).map(|(k, _)| *k).collect();
        assert_eq!((0..=5).collect::<Vec<_>>(), hits);
        assert_eq!(0, map.range(42..13).count());
        assert_eq!(0, map.range(200..300).count());
        assert_eq!(100, map.range::<_, i32>(..).count());
    }

    #[test]
    fn custom_comparator_reverses_order() {
        use crate::compare::Reversed;
        let mut map: GenericRbMap<i32, i32, Reversed<NaturalOrder>, DefaultSharedPtr> =
            GenericRbMap::with_comparator(Reversed(NaturalOrder));
        for i in 0..32 {
            map.insert(i, i);
        }
        let keys: Vec<i32> = map.keys().cloned().collect();
        let expected: Vec<i32> = (0..32).rev().collect();
        assert_eq!(expected, keys);
        assert_eq!(Some(&7), map.get(&7));
        map.check_sane();
    }

    #[test]
    fn shotgun_updates_preserve_invariants() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(42);
        let mut map: RbMap<i16, i16> = RbMap::new();
        let mut model = collections::BTreeMap::new();
        for _ in 0..100_000 {
            let key = rng.random::<i16>() % 512;
            if rng.random::<bool>() {
                map.insert(key, key);
                model.insert(key, key);
            } else {
                map.remove(&key);
                model.remove(&key);
            }
            assert_eq!(model.len(), map.len());
        }
        map.check_sane();
        let entries: Vec<(i16, i16)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i16, i16)> = model.into_iter().collect();
        assert_eq!(expected, entries);
    }

    #[test]
    fn old_versions_survive_updates() {
        let base: RbMap<i32, i32> = (0..64).map(|i| (i, i)).collect();
        let mut map = base.clone();
        for i in 0..64 {
            map = map.without(&i);
            map = map.update(i + 100, i);
        }
        assert_eq!(64, base.len());
        for i in 0..64 {
            assert_eq!(Some(&i), base.get(&i));
        }
    }

    #[test]
    fn deep_removal_rebalances() {
        let mut map: RbMap<i32, i32> = (0..1024).map(|i| (i, i)).collect();
        map.check_sane();
        for i in (0..1024).step_by(2) {
            assert_eq!(Some(i), map.remove(&i));
            map.check_sane();
        }
        assert_eq!(512, map.len());
        for i in (1..1024).step_by(2) {
            assert_eq!(Some(&i), map.get(&i));
        }
    }

    proptest! {
        #[test]
        fn update_and_length(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let mut map: RbMap<i16, i16> = RbMap::new();
            for (index, (k, v)) in m.iter().enumerate() {
                map = map.update(*k, *v);
                assert_eq!(Some(v), map.get(k));
                assert_eq!(index + 1, map.len());
            }
            map.check_sane();
        }

        #[test]
        fn iterate_sorted(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let map: RbMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            assert!(is_sorted(map.keys()));
            assert_eq!(m.len(), map.iter().count());
        }

        #[test]
        fn equality(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let map1: RbMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            let map2: RbMap<i16, i16> = m.iter().rev().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(map1, map2);
        }

        #[test]
        fn remove_all(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let mut map: RbMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            for k in m.keys() {
                let l = map.len();
                assert_eq!(m.get(k), map.get(k));
                map.remove(k);
                assert_eq!(None, map.get(k));
                assert_eq!(l - 1, map.len());
            }
            assert!(map.is_empty());
        }

        #[test]
        fn delete_and_reinsert(
            ref input in collection::btree_map(i16::ANY, i16::ANY, 1..500),
            index_rand in ::proptest::num::usize::ANY
        ) {
            let index = *input.keys().nth(index_rand % input.len()).unwrap();
            let map1: RbMap<_, _> = input.iter().map(|(k, v)| (*k, *v)).collect();
            let (val, map2) = map1.extract(&index).unwrap();
            let map3 = map2.update(index, val);
            for key in map2.keys() {
                assert!(*key != index);
            }
            assert_eq!(map1.len(), map2.len() + 1);
            assert_eq!(map1, map3);
        }

        #[test]
        fn range_matches_model(
            ref m in collection::btree_map(0..1000_i16, i16::ANY, 0..300),
            lo in 0..1000_i16,
            hi in 0..1000_i16
        ) {
            let map: RbMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            let (lo, hi) = (lo.min(hi), lo.max(hi));
            let expected: Vec<i16> = m.range(lo..hi).map(|(k, _)| *k).collect();
            let actual: Vec<i16> = map.range(lo..hi).map(|(k, _)| *k).collect();
            assert_eq!(expected, actual);
        }
    }
}
