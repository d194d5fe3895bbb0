// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::slice::Iter as SliceIter;

use archery::{SharedPointer, SharedPointerKind};
use bitmaps::{Bits, BitsImpl};
use imbl_sized_chunks::sparse_chunk::{Iter as ChunkIter, SparseChunk};

use crate::util::clone_ref;

pub(crate) use crate::config::HASH_LEVEL_SIZE as HASH_SHIFT;
pub(crate) const HASH_WIDTH: usize = 2_usize.pow(HASH_SHIFT as u32);
pub(crate) type HashBits = <BitsImpl<HASH_WIDTH> as Bits>::Store; // a uint of HASH_WIDTH bits
pub(crate) const HASH_MASK: HashBits = (HASH_WIDTH - 1) as HashBits;

pub(crate) fn hash_key<K: Hash + ?Sized, S: BuildHasher>(bh: &S, key: &K) -> HashBits {
    let mut hasher = bh.build_hasher();
    key.hash(&mut hasher);
    hasher.finish() as HashBits
}

#[inline]
fn mask(hash: HashBits, shift: usize) -> HashBits {
    hash >> shift & HASH_MASK
}

/// An entry stored in the trie: a value carrying its own key, which the
/// trie compares by `Eq` after routing by hash bits.
pub trait HashValue {
    type Key: Eq;

    fn extract_key(&self) -> &Self::Key;
}

/// A sparse branch node: a presence bitmap plus a compacted array holding
/// only the occupied slots.
pub(crate) struct Node<A, P: SharedPointerKind> {
    data: SparseChunk<Entry<A, P>, HASH_WIDTH>,
}

impl<A: Clone, P: SharedPointerKind> Clone for Node<A, P> {
    fn clone(&self) -> Self {
        Node {
            data: self.data.clone(),
        }
    }
}

/// A bucket of entries whose hash codes are fully equal, distinguished by
/// key equality alone.
pub(crate) struct CollisionNode<A> {
    hash: HashBits,
    data: Vec<A>,
}

impl<A: Clone> Clone for CollisionNode<A> {
    fn clone(&self) -> Self {
        CollisionNode {
            hash: self.hash,
            data: self.data.clone(),
        }
    }
}

pub(crate) enum Entry<A, P: SharedPointerKind> {
    Value(A, HashBits),
    Collision(SharedPointer<CollisionNode<A>, P>),
    Node(SharedPointer<Node<A, P>, P>),
}

impl<A: Clone, P: SharedPointerKind> Clone for Entry<A, P> {
    fn clone(&self) -> Self {
        match self {
            Entry::Value(value, hash) => Entry::Value(value.clone(), *hash),
            Entry::Collision(coll) => Entry::Collision(coll.clone()),
            Entry::Node(node) => Entry::Node(node.clone()),
        }
    }
}

impl<A, P: SharedPointerKind> Entry<A, P> {
    fn is_value(&self) -> bool {
        matches!(self, Entry::Value(_, _))
    }

    fn unwrap_value(self) -> A {
        match self {
            Entry::Value(a, _) => a,
            _ => panic!("nodes::hamt::Entry::unwrap_value: unwrapped a non-value"),
        }
    }
}

impl<A, P: SharedPointerKind> From<CollisionNode<A>> for Entry<A, P> {
    fn from(node: CollisionNode<A>) -> Self {
        Entry::Collision(SharedPointer::new(node))
    }
}

impl<A, P: SharedPointerKind> Default for Node<A, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, P: SharedPointerKind> Node<A, P> {
    #[inline]
    pub(crate) fn new() -> Self {
        Node {
            data: SparseChunk::new(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn unit(index: usize, entry: Entry<A, P>) -> Self {
        let mut node = Node::new();
        node.data.insert(index, entry);
        node
    }

    #[inline]
    fn pair(index1: usize, entry1: Entry<A, P>, index2: usize, entry2: Entry<A, P>) -> Self {
        let mut node = Node::new();
        node.data.insert(index1, entry1);
        node.data.insert(index2, entry2);
        node
    }

    fn pop(&mut self) -> Entry<A, P> {
        self.data.pop().unwrap()
    }
}

impl<A: HashValue, P: SharedPointerKind> Node<A, P> {
    fn merge_values(value1: A, hash1: HashBits, value2: A, hash2: HashBits, shift: usize) -> Self {
        let index1 = mask(hash1, shift) as usize;
        let index2 = mask(hash2, shift) as usize;
        if index1 != index2 {
            // Both values fit on the same level.
            Node::pair(
                index1,
                Entry::Value(value1, hash1),
                index2,
                Entry::Value(value2, hash2),
            )
        } else if shift + HASH_SHIFT >= HASH_WIDTH {
            // If we're at the bottom, we've got a collision.
            Node::unit(index1, Entry::from(CollisionNode::new(hash1, value1, value2)))
        } else {
            // Pass the values down a level.
            let node = Node::merge_values(value1, hash1, value2, hash2, shift + HASH_SHIFT);
            Node::unit(index1, Entry::Node(SharedPointer::new(node)))
        }
    }

    pub(crate) fn get<BK>(&self, hash: HashBits, shift: usize, key: &BK) -> Option<&A>
    where
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        let index = mask(hash, shift) as usize;
        match self.data.get(index) {
            Some(Entry::Value(value, _)) => {
                if key == value.extract_key().borrow() {
                    Some(value)
                } else {
                    None
                }
            }
            Some(Entry::Collision(coll)) => coll.get(key),
            Some(Entry::Node(child)) => child.get(hash, shift + HASH_SHIFT, key),
            None => None,
        }
    }

    pub(crate) fn get_mut<BK>(&mut self, hash: HashBits, shift: usize, key: &BK) -> Option<&mut A>
    where
        A: Clone,
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        let index = mask(hash, shift) as usize;
        match self.data.get_mut(index) {
            Some(Entry::Value(value, _)) => {
                if key == value.extract_key().borrow() {
                    Some(value)
                } else {
                    None
                }
            }
            Some(Entry::Collision(coll_ref)) => {
                let coll = SharedPointer::make_mut(coll_ref);
                coll.get_mut(key)
            }
            Some(Entry::Node(child_ref)) => {
                let child = SharedPointer::make_mut(child_ref);
                child.get_mut(hash, shift + HASH_SHIFT, key)
            }
            None => None,
        }
    }

    pub(crate) fn insert(&mut self, hash: HashBits, shift: usize, value: A) -> Option<A>
    where
        A: Clone,
    {
        let index = mask(hash, shift) as usize;
        let merging = match self.data.get_mut(index) {
            None => false,
            Some(Entry::Value(current, _)) => current.extract_key() != value.extract_key(),
            Some(Entry::Collision(coll_ref)) => {
                let coll = SharedPointer::make_mut(coll_ref);
                return coll.insert(value);
            }
            Some(Entry::Node(child_ref)) => {
                let child = SharedPointer::make_mut(child_ref);
                return child.insert(hash, shift + HASH_SHIFT, value);
            }
        };
        if merging {
            // The slot holds a value whose hash shares this level's bit
            // group with the new key. Push both down a level, or into a
            // collision bucket if there are no hash bits left to branch on.
            let (old_value, old_hash) = match self.data.remove(index) {
                Some(Entry::Value(v, h)) => (v, h),
                _ => unreachable!(),
            };
            let entry = if shift + HASH_SHIFT >= HASH_WIDTH {
                Entry::from(CollisionNode::new(hash, old_value, value))
            } else {
                Entry::Node(SharedPointer::new(Node::merge_values(
                    old_value,
                    old_hash,
                    value,
                    hash,
                    shift + HASH_SHIFT,
                )))
            };
            self.data.insert(index, entry);
            return None;
        }
        // Either the slot was empty, in which case we insert a new entry,
        // or it held a value with the same key, which we replace.
        self.data
            .insert(index, Entry::Value(value, hash))
            .map(Entry::unwrap_value)
    }

    pub(crate) fn remove<BK>(&mut self, hash: HashBits, shift: usize, key: &BK) -> Option<A>
    where
        A: Clone,
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        let index = mask(hash, shift) as usize;
        let mut new_entry = None;
        let mut removed = None;
        match self.data.get_mut(index) {
            None => return None,
            Some(Entry::Value(value, _)) => {
                if key != value.extract_key().borrow() {
                    // Key wasn't in the map.
                    return None;
                } // Otherwise, fall through to the removal.
            }
            Some(Entry::Collision(coll_ref)) => {
                let coll = SharedPointer::make_mut(coll_ref);
                removed = coll.remove(key);
                if coll.len() == 1 {
                    // A single remaining entry no longer collides with
                    // anything; lift it back into a plain value slot.
                    new_entry = Some(coll.pop());
                } else {
                    return removed;
                }
            }
            Some(Entry::Node(child_ref)) => {
                let child = SharedPointer::make_mut(child_ref);
                match child.remove(hash, shift + HASH_SHIFT, key) {
                    None => return None,
                    Some(value) => {
                        if child.len() == 1
                            && child.data[child.data.first_index().unwrap()].is_value()
                        {
                            // If the child now contains only a single value
                            // entry, pull it up one level and discard the
                            // child, so chains of single-entry branches
                            // can't accumulate.
                            removed = Some(value);
                            new_entry = Some(child.pop());
                        } else {
                            return Some(value);
                        }
                    }
                }
            }
        }
        if let Some(entry) = new_entry {
            self.data.insert(index, entry);
            return removed;
        }
        self.data.remove(index).map(Entry::unwrap_value)
    }

    /// Walk the subtree checking structural invariants, returning the
    /// number of entries found. Test use only.
    #[cfg(test)]
    pub(crate) fn check_sane(&self, shift: usize) -> usize {
        let mut count = 0;
        for index in self.data.indices() {
            match &self.data[index] {
                Entry::Value(_, hash) => {
                    assert_eq!(
                        index,
                        mask(*hash, shift) as usize,
                        "value entry routed to the wrong slot"
                    );
                    count += 1;
                }
                Entry::Collision(coll) => {
                    assert!(coll.len() > 1, "undersized collision node");
                    assert_eq!(
                        index,
                        mask(coll.hash, shift) as usize,
                        "collision node routed to the wrong slot"
                    );
                    count += coll.len();
                }
                Entry::Node(child) => {
                    assert!(child.len() > 0, "empty branch node");
                    assert!(
                        !(child.len() == 1
                            && child.data[child.data.first_index().unwrap()].is_value()),
                        "uncollapsed single-value branch node"
                    );
                    count += child.check_sane(shift + HASH_SHIFT);
                }
            }
        }
        count
    }
}

impl<A: HashValue> CollisionNode<A> {
    fn new(hash: HashBits, value1: A, value2: A) -> Self {
        CollisionNode {
            hash,
            data: vec![value1, value2],
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get<BK>(&self, key: &BK) -> Option<&A>
    where
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        self.data
            .iter()
            .find(|&entry| key == entry.extract_key().borrow())
    }

    fn get_mut<BK>(&mut self, key: &BK) -> Option<&mut A>
    where
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        self.data
            .iter_mut()
            .find(|entry| key == entry.extract_key().borrow())
    }

    fn insert(&mut self, value: A) -> Option<A> {
        for item in &mut self.data {
            if value.extract_key() == item.extract_key() {
                return Some(std::mem::replace(item, value));
            }
        }
        self.data.push(value);
        None
    }

    fn remove<BK>(&mut self, key: &BK) -> Option<A>
    where
        BK: Eq + ?Sized,
        A::Key: Borrow<BK>,
    {
        let loc = self
            .data
            .iter()
            .position(|item| key == item.extract_key().borrow());
        loc.map(|index| self.data.remove(index))
    }

    fn pop<P: SharedPointerKind>(&mut self) -> Entry<A, P> {
        Entry::Value(self.data.pop().unwrap(), self.hash)
    }
}

// Ref iterator

pub(crate) struct Iter<'a, A, P: SharedPointerKind> {
    count: usize,
    stack: Vec<ChunkIter<'a, Entry<A, P>, HASH_WIDTH>>,
    collision: Option<(HashBits, SliceIter<'a, A>)>,
}

// We impl Clone instead of deriving it, because we want Clone even if A isn't.
impl<'a, A, P: SharedPointerKind> Clone for Iter<'a, A, P> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            stack: self.stack.clone(),
            collision: self.collision.clone(),
        }
    }
}

impl<'a, A, P: SharedPointerKind> Iter<'a, A, P>
where
    A: 'a,
{
    pub(crate) fn new(root: Option<&'a Node<A, P>>, size: usize) -> Self {
        let mut result = Iter {
            count: size,
            stack: Vec::with_capacity((HASH_WIDTH / HASH_SHIFT) + 1),
            collision: None,
        };
        if let Some(root) = root {
            result.stack.push(root.data.iter());
        }
        result
    }
}

impl<'a, A, P: SharedPointerKind> Iterator for Iter<'a, A, P>
where
    A: 'a,
{
    type Item = (&'a A, HashBits);

    fn next(&mut self) -> Option<Self::Item> {
        'outer: loop {
            if let Some((hash, ref mut coll)) = self.collision {
                match coll.next() {
                    None => self.collision = None,
                    Some(value) => {
                        self.count -= 1;
                        return Some((value, hash));
                    }
                };
            }

            while let Some(current) = self.stack.last_mut() {
                match current.next() {
                    Some(Entry::Value(value, hash)) => {
                        self.count -= 1;
                        return Some((value, *hash));
                    }
                    Some(Entry::Node(child)) => {
                        self.stack.push(child.data.iter());
                    }
                    Some(Entry::Collision(coll)) => {
                        self.collision = Some((coll.hash, coll.data.iter()));
                        continue 'outer;
                    }
                    None => {
                        self.stack.pop();
                    }
                }
            }
            return None;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a, A, P: SharedPointerKind> ExactSizeIterator for Iter<'a, A, P> where A: 'a {}

impl<'a, A, P: SharedPointerKind> FusedIterator for Iter<'a, A, P> where A: 'a {}

// Consuming iterator

pub(crate) struct Drain<A, P: SharedPointerKind> {
    count: usize,
    stack: Vec<SharedPointer<Node<A, P>, P>>,
    collision: Option<CollisionNode<A>>,
}

impl<A, P: SharedPointerKind> Drain<A, P> {
    pub(crate) fn new(root: Option<SharedPointer<Node<A, P>, P>>, size: usize) -> Self {
        let mut result = Drain {
            count: size,
            stack: Vec::with_capacity((HASH_WIDTH / HASH_SHIFT) + 1),
            collision: None,
        };
        if let Some(root) = root {
            result.stack.push(root);
        }
        result
    }
}

impl<A, P: SharedPointerKind> Iterator for Drain<A, P>
where
    A: Clone,
{
    type Item = (A, HashBits);

    fn next(&mut self) -> Option<Self::Item> {
        'outer: loop {
            if let Some(coll) = &mut self.collision {
                match coll.data.pop() {
                    None => self.collision = None,
                    Some(value) => {
                        self.count -= 1;
                        return Some((value, coll.hash));
                    }
                };
            }

            while let Some(current) = self.stack.last_mut() {
                match SharedPointer::make_mut(current).data.pop() {
                    Some(Entry::Value(value, hash)) => {
                        self.count -= 1;
                        return Some((value, hash));
                    }
                    Some(Entry::Node(child)) => {
                        self.stack.push(child);
                    }
                    Some(Entry::Collision(coll)) => {
                        self.collision = Some(clone_ref(coll));
                        continue 'outer;
                    }
                    None => {
                        self.stack.pop();
                    }
                }
            }
            return None;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<A, P: SharedPointerKind> ExactSizeIterator for Drain<A, P> where A: Clone {}

impl<A, P: SharedPointerKind> FusedIterator for Drain<A, P> where A: Clone {}

impl<A: fmt::Debug, P: SharedPointerKind> fmt::Debug for Node<A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Node[ ")?;
        for i in self.data.indices() {
            write!(f, "{}: ", i)?;
            match &self.data[i] {
                Entry::Value(v, h) => write!(f, "{:?} :: {}, ", v, h)?,
                Entry::Collision(c) => write!(f, "Coll{:?} :: {}", c.data, c.hash)?,
                Entry::Node(n) => write!(f, "{:?}, ", n)?,
            }
        }
        write!(f, " ]")
    }
}
