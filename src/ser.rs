// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Serde support for the map types.
//!
//! Maps serialize as plain maps of entries. Deserializing rebuilds the
//! map with the strategy type's `Default` value, so only maps whose
//! strategy can be reconstructed that way are deserializable; a strategy
//! without `Default` (one carrying out-of-band state, say) simply has no
//! `Deserialize` impl.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use archery::SharedPointerKind;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::btreemap::GenericBTreeMap;
use crate::compare::Comparator;
use crate::hashmap::GenericHashMap;
use crate::rbmap::GenericRbMap;

struct MapVisitor<'de, S, K, V> {
    phantom_s: PhantomData<S>,
    phantom_k: PhantomData<K>,
    phantom_v: PhantomData<V>,
    phantom_lifetime: PhantomData<&'de ()>,
}

impl<'de, S, K, V> MapVisitor<'de, S, K, V> {
    pub(crate) fn new() -> MapVisitor<'de, S, K, V> {
        MapVisitor {
            phantom_s: PhantomData,
            phantom_k: PhantomData,
            phantom_v: PhantomData,
            phantom_lifetime: PhantomData,
        }
    }
}

impl<'de, S, K, V> Visitor<'de> for MapVisitor<'de, S, K, V>
where
    S: From<Vec<(K, V)>>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = S;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<Access>(self, mut access: Access) -> Result<Self::Value, Access::Error>
    where
        Access: MapAccess<'de>,
    {
        let mut v: Vec<(K, V)> = match access.size_hint() {
            None => Vec::new(),
            Some(l) => Vec::with_capacity(l),
        };
        while let Some(i) = access.next_entry()? {
            v.push(i)
        }
        Ok(From::from(v))
    }
}

// HashMap

impl<'de, K, V, S, P> Deserialize<'de> for GenericHashMap<K, V, S, P>
where
    K: Deserialize<'de> + Hash + Eq + Clone,
    V: Deserialize<'de> + Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    fn deserialize<D>(des: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        des.deserialize_map(MapVisitor::<'de, GenericHashMap<K, V, S, P>, K, V>::new())
    }
}

impl<K, V, S, P> Serialize for GenericHashMap<K, V, S, P>
where
    K: Serialize,
    V: Serialize,
    P: SharedPointerKind,
{
    fn serialize<Ser>(&self, ser: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut s = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            s.serialize_entry(k, v)?;
        }
        s.end()
    }
}

// RbMap

impl<'de, K, V, C, P> Deserialize<'de> for GenericRbMap<K, V, C, P>
where
    K: Deserialize<'de> + Clone,
    V: Deserialize<'de> + Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn deserialize<D>(des: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        des.deserialize_map(MapVisitor::<'de, GenericRbMap<K, V, C, P>, K, V>::new())
    }
}

impl<K, V, C, P> Serialize for GenericRbMap<K, V, C, P>
where
    K: Serialize,
    V: Serialize,
    P: SharedPointerKind,
{
    fn serialize<Ser>(&self, ser: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut s = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            s.serialize_entry(k, v)?;
        }
        s.end()
    }
}

// BTreeMap

impl<'de, K, V, C, P> Deserialize<'de> for GenericBTreeMap<K, V, C, P>
where
    K: Deserialize<'de> + Clone,
    V: Deserialize<'de> + Clone,
    C: Comparator<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn deserialize<D>(des: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        des.deserialize_map(MapVisitor::<'de, GenericBTreeMap<K, V, C, P>, K, V>::new())
    }
}

impl<K, V, C, P> Serialize for GenericBTreeMap<K, V, C, P>
where
    K: Serialize,
    V: Serialize,
    P: SharedPointerKind,
{
    fn serialize<Ser>(&self, ser: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut s = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            s.serialize_entry(k, v)?;
        }
        s.end()
    }
}

// Tests

#[cfg(test)]
mod test {
    use crate::proptest::{btree_map, hash_map, rb_map};
    use crate::{BTreeMap, HashMap, RbMap};
    use proptest::num::i32;
    use proptest::proptest;
    use serde_json::{from_str, to_string};

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn ser_hashmap(ref v in hash_map(i32::ANY, i32::ANY, 0..100)) {
            assert_eq!(v, &from_str::<HashMap<i32, i32>>(&to_string(&v).unwrap()).unwrap());
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn ser_rbmap(ref v in rb_map(i32::ANY, i32::ANY, 0..100)) {
            assert_eq!(v, &from_str::<RbMap<i32, i32>>(&to_string(&v).unwrap()).unwrap());
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn ser_btreemap(ref v in btree_map(i32::ANY, i32::ANY, 0..100)) {
            assert_eq!(v, &from_str::<BTreeMap<i32, i32>>(&to_string(&v).unwrap()).unwrap());
        }
    }
}
