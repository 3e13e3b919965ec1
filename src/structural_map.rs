use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt::{self, Debug},
};

use serde::{
    de::{SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};


/// A key whose identity is its content.
///
/// Two keys with equal [`canonical`](Self::canonical) forms address the same entry of a [`StructuralMap`],
/// whether or not they are the same value.
///
/// Record keys usually canonicalize to their identifying field:
///
/// ```
/// use cards_by_cats::StructuralKey;
///
/// #[derive(Clone)]
/// struct Collection {
///     id: String,
///     title: String,
/// }
/// impl StructuralKey for Collection {
///     type Canonical = String;
///     fn canonical(&self) -> String {
///         self.id.clone()
///     }
/// }
/// ```
pub trait StructuralKey: Clone {
    type Canonical: Ord + Clone;
    fn canonical(&self) -> Self::Canonical;
}

macro_rules! impl_structural_key_by_self {
    ($($t:ty),*) => {
        $(
            impl StructuralKey for $t {
                type Canonical = $t;
                fn canonical(&self) -> Self::Canonical {
                    self.clone()
                }
            }
        )*
    };
}
impl_structural_key_by_self!(
    String, bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

impl StructuralKey for &'static str {
    type Canonical = &'static str;
    fn canonical(&self) -> Self::Canonical {
        *self
    }
}
impl<T: StructuralKey> StructuralKey for Option<T> {
    type Canonical = Option<T::Canonical>;
    fn canonical(&self) -> Self::Canonical {
        self.as_ref().map(|k| k.canonical())
    }
}
impl<T: StructuralKey> StructuralKey for Vec<T> {
    type Canonical = Vec<T::Canonical>;
    fn canonical(&self) -> Self::Canonical {
        self.iter().map(|k| k.canonical()).collect()
    }
}

macro_rules! impl_structural_key_for_tuple {
    ($($name:ident $idx:tt),*) => {
        impl<$($name: StructuralKey),*> StructuralKey for ($($name,)*) {
            type Canonical = ($($name::Canonical,)*);
            fn canonical(&self) -> Self::Canonical {
                ($(self.$idx.canonical(),)*)
            }
        }
    };
}
impl_structural_key_for_tuple!(A 0);
impl_structural_key_for_tuple!(A 0, B 1);
impl_structural_key_for_tuple!(A 0, B 1, C 2);
impl_structural_key_for_tuple!(A 0, B 1, C 2, D 3);

/// Map that compares keys by their [`StructuralKey::canonical`] form.
///
/// Entries are iterated in the order their canonical key was first inserted.
/// Replacing the value of an existing entry keeps its position and takes over the new key value.
pub struct StructuralMap<K: StructuralKey, V> {
    index: BTreeMap<K::Canonical, usize>,
    entries: Vec<(K, V)>,
}

impl<K: StructuralKey, V> StructuralMap<K, V> {
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let i = *self.index.get(&key.canonical())?;
        Some(&self.entries[i].1)
    }
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = *self.index.get(&key.canonical())?;
        Some(&mut self.entries[i].1)
    }
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(&key.canonical())
    }

    /// Inserts `value`, or replaces the value of the entry whose key is structurally equal to `key`.
    ///
    /// Returns the replaced value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        match self.index.entry(key.canonical()) {
            Entry::Occupied(e) => {
                let (old_key, old_value) = &mut self.entries[*e.get()];
                *old_key = key;
                Some(std::mem::replace(old_value, value))
            }
            Entry::Vacant(e) => {
                e.insert(self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn for_each(&self, mut f: impl FnMut(&V, &K)) {
        for (k, v) in &self.entries {
            f(v, k);
        }
    }
    pub fn map_values<T>(&self, mut f: impl FnMut(&V, &K) -> T) -> Vec<T> {
        self.entries.iter().map(|(k, v)| f(v, k)).collect()
    }
}
impl<K: StructuralKey, V: Clone> Clone for StructuralMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            entries: self.entries.clone(),
        }
    }
}
impl<K: StructuralKey, V> Default for StructuralMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
impl<K: StructuralKey, V: PartialEq> PartialEq for StructuralMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}
impl<K: StructuralKey, V: Eq> Eq for StructuralMap<K, V> {}

impl<K: StructuralKey + Debug, V: Debug> Debug for StructuralMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: StructuralKey, V> FromIterator<(K, V)> for StructuralMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
impl<K: StructuralKey, V> Extend<(K, V)> for StructuralMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
impl<K: StructuralKey, V> IntoIterator for StructuralMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
impl<'a, K: StructuralKey, V> IntoIterator for &'a StructuralMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(entry_ref as fn(&'a (K, V)) -> (&'a K, &'a V))
    }
}

fn entry_ref<K, V>((k, v): &(K, V)) -> (&K, &V) {
    (k, v)
}

impl<K, V> Serialize for StructuralMap<K, V>
where
    K: StructuralKey + Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}
impl<'de, K, V> Deserialize<'de> for StructuralMap<K, V>
where
    K: StructuralKey + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<StructuralMap<K, V>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor<K, V>(std::marker::PhantomData<(K, V)>);
        impl<'de, K, V> Visitor<'de> for PairsVisitor<K, V>
        where
            K: StructuralKey + Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = StructuralMap<K, V>;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a sequence of key-value pairs")
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut map = StructuralMap::new();
                while let Some((k, v)) = seq.next_element::<(K, V)>()? {
                    map.set(k, v);
                }
                Ok(map)
            }
        }
        deserializer.deserialize_seq(PairsVisitor(std::marker::PhantomData))
    }
}
