// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered map backed by a persistent B-tree.
//!
//! Entries are kept sorted by the map's [`Comparator`]; unlike the
//! red-black backend, entries are packed into fat leaf nodes, so reads
//! touch far fewer cache lines and iteration is a simple left-to-right
//! walk over the leaves. The branching factor is chosen per map through
//! a [`BTreeSpec`] and inherited by every map derived from it.
//!
//! Structural maintenance is the classic B-tree discipline: an insert
//! that overfills a node splits it at the midpoint and hands the
//! separator to the parent; a removal that drains a node below its
//! minimum borrows from a sibling or merges with one, possibly all the
//! way up, and a root reduced to a single child is replaced by that
//! child. All of it happens on freshly rebuilt nodes; published nodes
//! are never touched.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections;
use std::fmt::{Debug, Error as FmtError, Formatter};
use std::iter::{FromIterator, FusedIterator};
use std::ops::{Index, IndexMut, RangeBounds};

use archery::{SharedPointer, SharedPointerKind};

use crate::compare::{Comparator, NaturalOrder};
use crate::config::DEFAULT_BTREE_ORDER;
use crate::error::Error;
use crate::map::{PersistentMap, WithDefault, WithDefaultValue};
use crate::nodes::btree::{
    ConsumingIter as NodeConsumingIter, InsertAction, Iter as NodeIter, Node, RemoveAction,
};
use crate::shared_ptr::DefaultSharedPtr;

/// The smallest legal branching factor: a full node must be able to
/// split into two nodes that both satisfy the minimum key count.
pub const MIN_ORDER: usize = 4;

/// Construct a B-tree map from a sequence of key/value pairs, using the
/// default branching factor.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate immap;
/// # use immap::BTreeMap;
/// # fn main() {
/// assert_eq!(
///   btreemap!{
///     1 => 11,
///     2 => 22,
///     3 => 33
///   },
///   BTreeMap::from(vec![(1, 11), (2, 22), (3, 33)])
/// );
/// # }
/// ```
#[macro_export]
macro_rules! btreemap {
    () => { $crate::btreemap::BTreeMap::new() };

    ( $( $key:expr => $value:expr ),* ) => {{
        let mut map = $crate::btreemap::BTreeMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};

    ( $( $key:expr => $value:expr ,)* ) => {{
        let mut map = $crate::btreemap::BTreeMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};
}

/// The configuration of a B-tree map: the branching factor (`order`, the
/// maximum number of children per node) and the ordering strategy. Fixed
/// when a map is created and inherited by every map derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BTreeSpec<C = NaturalOrder> {
    order: usize,
    comparator: C,
}

impl<C> BTreeSpec<C> {
    /// Construct a spec with the given order and the default comparator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is less than
    /// [`MIN_ORDER`]. This is checked here, at configuration time, not
    /// when a node first splits.
    pub fn new(order: usize) -> Result<Self, Error>
    where
        C: Default,
    {
        Self::with_comparator(order, C::default())
    }

    /// Construct a spec with the given order and comparator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is less than
    /// [`MIN_ORDER`].
    pub fn with_comparator(order: usize, comparator: C) -> Result<Self, Error> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder(order));
        }
        Ok(BTreeSpec { order, comparator })
    }

    /// The branching factor.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// The ordering strategy.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<C: Default> Default for BTreeSpec<C> {
    fn default() -> Self {
        BTreeSpec {
            order: DEFAULT_BTREE_ORDER,
            comparator: C::default(),
        }
    }
}

/// Type alias for [`GenericBTreeMap`] that uses [`NaturalOrder`] as the
/// comparator and [`DefaultSharedPtr`] as the pointer type.
///
/// [GenericBTreeMap]: ./struct.GenericBTreeMap.html
/// [NaturalOrder]: ../compare/struct.NaturalOrder.html
/// [DefaultSharedPtr]: ../shared_ptr/type.DefaultSharedPtr.html
pub type BTreeMap<K, V> = GenericBTreeMap<K, V, NaturalOrder, DefaultSharedPtr>;

/// An ordered map backed by a persistent B-tree with a configurable
/// branching factor.
///
/// Values live only in the leaves; branch nodes hold routing separators.
/// Every leaf sits at the same depth, and every node except the root
/// holds between `⌈order/2⌉ − 1` and `order − 1` keys.
pub struct GenericBTreeMap<K, V, C, P: SharedPointerKind> {
    size: usize,
    root: Option<SharedPointer<Node<K, V, P>, P>>,
    spec: BTreeSpec<C>,
}

impl<K, V, P> GenericBTreeMap<K, V, NaturalOrder, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Construct a map with a single mapping, using the default spec.
    #[inline]
    #[must_use]
    pub fn unit(key: K, value: V) -> Self {
        GenericBTreeMap::new().update(key, value)
    }
}

impl<K, V, C, P: SharedPointerKind> GenericBTreeMap<K, V, C, P> {
    /// Construct an empty map with the default spec.
    #[inline]
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::default()
    }

    /// Construct an empty map from a spec.
    #[inline]
    #[must_use]
    pub fn with_spec(spec: BTreeSpec<C>) -> Self {
        GenericBTreeMap {
            size: 0,
            root: None,
            spec,
        }
    }

    /// Construct an empty map with the given branching factor and the
    /// default comparator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is less than
    /// [`MIN_ORDER`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use immap::{BTreeMap, Error};
    /// assert!(BTreeMap::<i32, i32>::with_order(4).is_ok());
    /// assert_eq!(
    ///   Err(Error::InvalidOrder(3)),
    ///   BTreeMap::<i32, i32>::with_order(3).map(|_| ())
    /// );
    /// ```
    pub fn with_order(order: usize) -> Result<Self, Error>
    where
        C: Default,
    {
        Ok(Self::with_spec(BTreeSpec::new(order)?))
    }

    /// Get a reference to the map's spec.
    #[must_use]
    pub fn spec(&self) -> &BTreeSpec<C> {
        &self.spec
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
            (Some(a), Some(b)) => SharedPointer::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Discard all elements from the map, keeping the spec.
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
            it: NodeIter::new(self.root.as_deref(), self.size),
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
    /// # use immap::BTreeMap;
    /// let map = btreemap!{1 => 1, 2 => 2, 3 => 3, 4 => 4};
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
            it: NodeIter::range(
                self.root.as_deref(),
                &self.spec.comparator,
                self.size,
                range,
            ),
        }
    }

    /// Get the smallest key and its value.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_min(&self) -> Option<(&K, &V)> {
        self.root.as_deref().and_then(Node::min)
    }

    /// Get the largest key and its value.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_max(&self) -> Option<(&K, &V)> {
        self.root.as_deref().and_then(Node::max)
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
    /// # use immap::BTreeMap;
    /// let map = btreemap!{123 => "lol"};
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
        self.root
            .as_deref()
            .and_then(|root| root.lookup(&self.spec.comparator, key))
            .map(|(_, v)| v)
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
        self.root
            .as_deref()
            .and_then(|root| root.lookup(&self.spec.comparator, key))
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

impl<K, V, C, P> GenericBTreeMap<K, V, C, P>
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
        let comparator = self.spec.comparator.clone();
        let root = self.root.as_mut()?;
        SharedPointer::make_mut(root)
            .lookup_mut(&comparator, key)
            .map(|(_, v)| v)
    }

    /// Insert a key/value mapping into the map, returning the previous
    /// value if the key was present.
    ///
    /// If the insertion overfills a leaf, the leaf is split at its
    /// midpoint and the split cascades upward; if the root itself
    /// splits, a new root is created and the tree grows one level.
    ///
    /// Time: O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Comparator<K>,
    {
        let order = self.spec.order;
        let root_ptr = self
            .root
            .get_or_insert_with(|| SharedPointer::new(Node::default()));
        let action =
            SharedPointer::make_mut(root_ptr).insert(&self.spec.comparator, order, key, value);
        match action {
            InsertAction::Inserted => {
                self.size += 1;
                None
            }
            InsertAction::Replaced(old) => Some(old),
            InsertAction::Split(separator, right) => {
                let left = self.root.take().unwrap();
                self.root = Some(SharedPointer::new(Node::new_from_split(
                    left, separator, right,
                )));
                self.size += 1;
                None
            }
        }
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
    /// A removal that drains a node below its minimum key count is
    /// repaired on the way back up by borrowing from or merging with a
    /// sibling; a root branch reduced to a single child is replaced by
    /// that child, shrinking the tree one level.
    ///
    /// Time: O(log n)
    pub fn remove_with_key<BK>(&mut self, key: &BK) -> Option<(K, V)>
    where
        BK: ?Sized,
        K: Borrow<BK>,
        C: Comparator<BK>,
    {
        let order = self.spec.order;
        let root_ptr = self.root.as_mut()?;
        let action = SharedPointer::make_mut(root_ptr).remove(&self.spec.comparator, order, key);
        let removed = match action {
            RemoveAction::NotFound => return None,
            RemoveAction::Removed(k, v) | RemoveAction::Underflowed(k, v) => (k, v),
        };
        self.size -= 1;
        // The root is exempt from the minimum key count, but a root
        // branch left with a single child is replaced by that child, and
        // a drained root leaf empties the map.
        let collapsed = match SharedPointer::make_mut(root_ptr) {
            Node::Branch(branch) => branch.pop_single_child(),
            Node::Leaf(_) => None,
        };
        if let Some(child) = collapsed {
            *root_ptr = child;
        } else if root_ptr.is_empty_leaf() {
            self.root = None;
        }
        Some(removed)
    }

    /// Construct a new map by inserting a key/value mapping, leaving
    /// this map as it was.
    ///
    /// Time: O(log n)
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

    /// Verify the B-tree invariants. Test use only.
    #[cfg(test)]
    pub(crate) fn check_sane(&self)
    where
        C: Comparator<K>,
    {
        match &self.root {
            None => assert_eq!(0, self.size),
            Some(root) => assert_eq!(
                self.size,
                crate::nodes::btree::check_sane(root, &self.spec.comparator, self.spec.order)
            ),
        }
    }
}

impl<K, V, C, P> PersistentMap<K, V> for GenericBTreeMap<K, V, C, P>
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
        GenericBTreeMap::get(self, key)
    }

    #[inline]
    fn update(&self, key: K, value: V) -> Self {
        GenericBTreeMap::update(self, key, value)
    }

    #[inline]
    fn without(&self, key: &K) -> Self {
        GenericBTreeMap::without(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        GenericBTreeMap::len(self)
    }

    #[inline]
    fn iter(&self) -> Iter<'_, K, V, P> {
        GenericBTreeMap::iter(self)
    }
}

// Core traits

impl<K, V, C, P> Clone for GenericBTreeMap<K, V, C, P>
where
    C: Clone,
    P: SharedPointerKind,
{
    /// Clone a map.
    ///
    /// Time: O(1)
    #[inline]
    fn clone(&self) -> Self {
        GenericBTreeMap {
            size: self.size,
            root: self.root.clone(),
            spec: self.spec.clone(),
        }
    }
}

impl<K, V, C, P1, P2> PartialEq<GenericBTreeMap<K, V, C, P2>> for GenericBTreeMap<K, V, C, P1>
where
    V: PartialEq,
    C: Comparator<K>,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    /// Maps are equal when they hold the same entries under the shared
    /// ordering strategy; the branching factor does not participate.
    fn eq(&self, other: &GenericBTreeMap<K, V, C, P2>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|((k1, v1), (k2, v2))| {
                self.spec.comparator.cmp(k1, k2) == Ordering::Equal && v1 == v2
            })
    }
}

impl<K, V, C, P> Eq for GenericBTreeMap<K, V, C, P>
where
    V: Eq,
    C: Comparator<K>,
    P: SharedPointerKind,
{
}

impl<K, V, C, P> Default for GenericBTreeMap<K, V, C, P>
where
    C: Default,
    P: SharedPointerKind,
{
    fn default() -> Self {
        Self::with_spec(BTreeSpec::default())
    }
}

impl<K, V, C, RK, RV, P> Extend<(RK, RV)> for GenericBTreeMap<K, V, C, P>
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

impl<BK, K, V, C, P> Index<&BK> for GenericBTreeMap<K, V, C, P>
where
    BK: ?Sized,
    K: Borrow<BK>,
    C: Comparator<BK>,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &BK) -> &Self::Output {
        match self.get(key) {
            None => panic!("GenericBTreeMap::index: invalid key"),
            Some(value) => value,
        }
    }
}

impl<BK, K, V, C, P> IndexMut<&BK> for GenericBTreeMap<K, V, C, P>
where
    BK: ?Sized,
    K: Clone + Borrow<BK>,
    V: Clone,
    C: Comparator<BK> + Clone,
    P: SharedPointerKind,
{
    fn index_mut(&mut self, key: &BK) -> &mut Self::Output {
        match self.get_mut(key) {
            None => panic!("GenericBTreeMap::index_mut: invalid key"),
            Some(value) => value,
        }
    }
}

impl<K, V, C, P> Debug for GenericBTreeMap<K, V, C, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut d = f.debug_map();
        for (k, v) in NodeIter::new(self.root.as_deref(), self.size) {
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

impl<'a, K, V, C, P: SharedPointerKind> IntoIterator for &'a GenericBTreeMap<K, V, C, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, P> IntoIterator for GenericBTreeMap<K, V, C, P>
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

impl<K, V, C, P> FromIterator<(K, V)> for GenericBTreeMap<K, V, C, P>
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

impl<'a, K, V, C, P> From<&'a [(K, V)]> for GenericBTreeMap<K, V, C, P>
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

impl<K, V, C, P> From<Vec<(K, V)>> for GenericBTreeMap<K, V, C, P>
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

impl<K, V, C, S, P> From<collections::HashMap<K, V, S>> for GenericBTreeMap<K, V, C, P>
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

impl<K, V, C, P> From<collections::BTreeMap<K, V>> for GenericBTreeMap<K, V, C, P>
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
    use crate::nodes::btree::{leaf_keys, root_keys};
    use crate::test::is_sorted;
    #[rustfmt::skip]
    use ::proptest::{collection, num::i16, proptest};
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    assert_impl_all!(BTreeMap<i32, i32>: Send, Sync);
    assert_not_impl_any!(BTreeMap<i32, *const i32>: Send, Sync);
    assert_covariant!(BTreeMap<T, i32> in T);
    assert_covariant!(BTreeMap<i32, T> in T);

    fn fixture_leaf(order: usize, keys: &[i32]) -> BTreeMap<i32, i32> {
        let mut map = BTreeMap::with_order(order).unwrap();
        for k in keys {
            map.insert(*k, *k);
        }
        assert_eq!(1, leaf_keys(map.root.as_deref().unwrap()).len());
        map
    }

    #[test]
    fn spec_rejects_undersized_order() {
        assert_eq!(Err(Error::InvalidOrder(0)), BTreeSpec::<NaturalOrder>::new(0).map(|_| ()));
        assert_eq!(Err(Error::InvalidOrder(3)), BTreeSpec::<NaturalOrder>::new(3).map(|_| ()));
        assert_eq!(4, BTreeSpec::<NaturalOrder>::new(4).unwrap().order());
    }

    #[test]
    fn leaf_split_at_midpoint_inserting_in_the_middle() {
        // Nine keys overflow an order-9 leaf; the split point depends
        // only on the key count, and the separator is the right half's
        // first key.
        let mut map = fixture_leaf(9, &[110, 120, 130, 140, 150, 160, 170, 180]);
        map.insert(121, 999);
        let root = map.root.as_deref().unwrap();
        assert_eq!(
            vec![vec![110, 120, 121, 130, 140], vec![150, 160, 170, 180]],
            leaf_keys(root)
        );
        assert_eq!(vec![150], root_keys(root));
        assert_eq!(Some(&999), map.get(&121));
        map.check_sane();
    }

    #[test]
    fn leaf_split_at_midpoint_inserting_at_the_start() {
        let mut map = fixture_leaf(9, &[110, 120, 130, 140, 150, 160, 170, 180]);
        map.insert(101, 999);
        let root = map.root.as_deref().unwrap();
        assert_eq!(
            vec![vec![101, 110, 120, 130, 140], vec![150, 160, 170, 180]],
            leaf_keys(root)
        );
        assert_eq!(vec![150], root_keys(root));
        map.check_sane();
    }

    #[test]
    fn leaf_split_at_midpoint_inserting_at_the_end() {
        let mut map = fixture_leaf(9, &[110, 120, 130, 140, 150, 160, 170, 180]);
        map.insert(181, 999);
        let root = map.root.as_deref().unwrap();
        assert_eq!(
            vec![vec![110, 120, 130, 140, 150], vec![160, 170, 180, 181]],
            leaf_keys(root)
        );
        assert_eq!(vec![160], root_keys(root));
        map.check_sane();
    }

    #[test]
    fn replacing_a_value_never_splits() {
        let mut map = fixture_leaf(6, &[110, 120, 130, 140, 150]);
        map.insert(130, 999);
        let root = map.root.as_deref().unwrap();
        assert_eq!(vec![vec![110, 120, 130, 140, 150]], leaf_keys(root));
        assert_eq!(Some(&999), map.get(&130));
        assert_eq!(5, map.len());
        map.check_sane();
    }

    #[test]
    fn root_split_grows_and_collapse_shrinks() {
        let mut map = BTreeMap::with_order(4).unwrap();
        for i in 0..64 {
            map.insert(i, i);
            map.check_sane();
        }
        assert_eq!(64, map.len());
        for i in 0..64 {
            assert_eq!(Some(i), map.remove(&i));
            map.check_sane();
        }
        assert!(map.is_empty());
        assert!(map.root.is_none());
    }

    #[test]
    fn safe_mutation() {
        let v1: BTreeMap<usize, usize> = (0..131_072).map(|i| (i, i)).collect();
        let mut v2 = v1.clone();
        v2.insert(131_000, 23);
        assert_eq!(Some(&23), v2.get(&131_000));
        assert_eq!(Some(&131_000), v1.get(&131_000));
    }

    #[test]
    fn min_max() {
        let map = btreemap! {3 => "c", 1 => "a", 2 => "b"};
        assert_eq!(Some((&1, &"a")), map.get_min());
        assert_eq!(Some((&3, &"c")), map.get_max());
        assert_eq!(None, BTreeMap::<i32, i32>::new().get_min());
    }

    #[test]
    fn range_scans() {
        let map: BTreeMap<i32, i32> = (0..1000).map(|i| (i, i)).collect();
        let hits: Vec<i32> = map.range(100..200).map(|(k, _)| *k).collect();
        assert_eq!((100..200).collect::<Vec<_>>(), hits);
        let hits: Vec<i32> = map.range(990..).map(|(k, _)| *k).collect();
        assert_eq!((990..1000).collect::<Vec<_>>(), hits);
        let hits: Vec<i32> = map.range(..=5).map(|(k, _)| *k).collect();
        assert_eq!((0..=5).collect::<Vec<_>>(), hits);
        assert_eq!(0, map.range(500..400).count());
        assert_eq!(0, map.range(2000..3000).count());
        assert_eq!(1000, map.range::<_, i32>(..).count());
    }

    #[test]
    fn equal_content_across_orders() {
        let entries: Vec<(i32, i32)> = (0..500).map(|i| (i * 13 % 499, i)).collect();
        let small: BTreeMap<i32, i32> = {
            let mut map = BTreeMap::with_order(4).unwrap();
            map.extend(entries.clone());
            map
        };
        let large: BTreeMap<i32, i32> = {
            let mut map = BTreeMap::with_order(64).unwrap();
            map.extend(entries);
            map
        };
        assert_eq!(small, large);
    }

    #[test]
    fn shotgun_updates_preserve_invariants() {
        use rand::{Rng, SeedableRng};
        for order in [4, 5, 6, 9] {
            let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(42);
            let mut map: BTreeMap<i16, i16> = BTreeMap::with_order(order).unwrap();
            let mut model = collections::BTreeMap::new();
            for _ in 0..25_000 {
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
    }

    #[test]
    fn old_versions_survive_updates() {
        let base: BTreeMap<i32, i32> = (0..256).map(|i| (i, i)).collect();
        let mut map = base.clone();
        for i in 0..256 {
            map = map.without(&i);
        }
        assert!(map.is_empty());
        assert_eq!(256, base.len());
        for i in 0..256 {
            assert_eq!(Some(&i), base.get(&i));
        }
    }

    proptest! {
        #[test]
        fn update_and_length(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let mut map: BTreeMap<i16, i16> = BTreeMap::with_order(5).unwrap();
            for (index, (k, v)) in m.iter().enumerate() {
                map = map.update(*k, *v);
                assert_eq!(Some(v), map.get(k));
                assert_eq!(index + 1, map.len());
            }
            map.check_sane();
        }

        #[test]
        fn iterate_sorted(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let map: BTreeMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            assert!(is_sorted(map.keys()));
            assert_eq!(m.len(), map.iter().count());
        }

        #[test]
        fn remove_all(ref m in collection::btree_map(i16::ANY, i16::ANY, 0..500)) {
            let mut map: BTreeMap<i16, i16> = BTreeMap::with_order(4).unwrap();
            for (k, v) in m.iter() {
                map.insert(*k, *v);
            }
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
            let map1: BTreeMap<_, _> = input.iter().map(|(k, v)| (*k, *v)).collect();
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
            let map: BTreeMap<i16, i16> = m.iter().map(|(k, v)| (*k, *v)).collect();
            let (lo, hi) = (lo.min(hi), lo.max(hi));
            let expected: Vec<i16> = m.range(lo..hi).map(|(k, _)| *k).collect();
            let actual: Vec<i16> = map.range(lo..hi).map(|(k, _)| *k).collect();
            assert_eq!(expected, actual);
        }
    }
}
