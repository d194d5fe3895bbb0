// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use ::quickcheck::{Arbitrary, Gen};

use crate::shared_ptr::SharedPointerKind;
use crate::{GenericBTreeMap, GenericHashMap, GenericRbMap};

impl<K, V, S, P> Arbitrary for GenericHashMap<K, V, S, P>
where
    K: Hash + Eq + Clone + Arbitrary + Sync,
    V: Clone + Arbitrary + Sync,
    S: BuildHasher + Clone + Default + Send + Sync + 'static,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericHashMap::from_iter(Vec::<(K, V)>::arbitrary(g))
    }
}

impl<K, V, P> Arbitrary for GenericRbMap<K, V, crate::NaturalOrder, P>
where
    K: Ord + Clone + Arbitrary + Sync,
    V: Clone + Arbitrary + Sync,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericRbMap::from_iter(Vec::<(K, V)>::arbitrary(g))
    }
}

impl<K, V, P> Arbitrary for GenericBTreeMap<K, V, crate::NaturalOrder, P>
where
    K: Ord + Clone + Arbitrary + Sync,
    V: Clone + Arbitrary + Sync,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericBTreeMap::from_iter(Vec::<(K, V)>::arbitrary(g))
    }
}
