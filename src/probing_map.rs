//! Separate chaining over a fixed number of buckets

use log::{debug, trace};

use crate::{
    direct_map::empty_slots,
    entry::Entry,
    error::{AddResult, MapError, Rejected, Result},
    hasher::StringHasher,
    utils::CollisionMap,
};

/// A fixed-capacity map where each bucket holds a chain of entries.
///
/// Keys hashing to the same bucket are appended to that bucket's chain, so the map
/// never runs out of room. Every entry keeps its key and lookups compare keys along
/// the whole chain.
#[derive(Debug, Clone)]
pub struct ProbingMap<V> {
    /// One optional chain per bucket; an allocated chain is never empty
    slots: Box<[Option<Vec<Entry<V>>>]>,
    /// Computes the bucket of a key
    hasher: StringHasher,
    /// Number of entries across all chains
    size: usize,
}

impl<V> Default for ProbingMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ProbingMap<V> {
    /// Creates a map with [`crate::DEFAULT_CAPACITY`] buckets
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(StringHasher::default())
    }

    /// Creates a map with `capacity` buckets
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        StringHasher::new(capacity).map(Self::with_hasher)
    }

    /// Creates an empty table sized by the hasher
    fn with_hasher(hasher: StringHasher) -> Self {
        Self { slots: empty_slots(hasher.capacity()), hasher, size: 0 }
    }

    /// Returns the chain of the bucket `key` hashes to
    fn chain(&self, key: &str) -> Result<Option<&[Entry<V>]>> {
        let index = self.hasher.index(key)?;
        Ok(self.slots.get(index).and_then(Option::as_deref))
    }

    /// Stores `value` under `key`, chaining it behind any colliding entries.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys and
    /// [`MapError::DuplicateKey`] if the key is already stored. The rejected value
    /// comes back inside the [`Rejected`].
    pub fn add(&mut self, key: &str, value: V) -> AddResult<V> {
        let index = match self.hasher.index(key) {
            Ok(index) => index,
            Err(error) => return Err(Rejected::new(error, value)),
        };
        let capacity = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(Rejected::new(MapError::OutOfBounds { index, capacity }, value));
        };

        match slot {
            Some(chain) => {
                if chain.iter().any(|entry| entry.matches(key)) {
                    debug!("rejecting duplicate key {key:?}");
                    let error = MapError::DuplicateKey { key: key.to_owned() };
                    return Err(Rejected::new(error, value));
                }
                chain.push(Entry::new(key, value));
                debug!("chained key {key:?} at index {index}, chain length {}", chain.len());
            }
            None => {
                *slot = Some(vec![Entry::new(key, value)]);
                trace!("stored key {key:?} at index {index}");
            }
        }

        self.size = self.size.saturating_add(1);
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// The whole chain is compared key by key, including chains of one entry.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        Ok(self
            .chain(key)?
            .and_then(|chain| chain.iter().find(|entry| entry.matches(key)))
            .map(Entry::value))
    }

    /// Number of entries in the bucket `key` hashes to
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn chain_len(&self, key: &str) -> Result<usize> {
        Ok(self.chain(key)?.map_or(0, <[Entry<V>]>::len))
    }

    /// Length of the longest chain in the table
    #[must_use]
    pub fn longest_chain(&self) -> usize {
        self.slots.iter().flatten().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of entries across all chains
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of buckets in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the stored key-value pairs, bucket by bucket in insertion order
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots.iter().flatten().flatten().map(|entry| (entry.key(), entry.value()))
    }
}

impl<V> CollisionMap<V> for ProbingMap<V> {
    fn add(&mut self, key: &str, value: V) -> AddResult<V> {
        Self::add(self, key, value)
    }

    fn get(&self, key: &str) -> Result<Option<&V>> {
        Self::get(self, key)
    }

    fn size(&self) -> usize {
        Self::size(self)
    }

    fn capacity(&self) -> usize {
        Self::capacity(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut map = ProbingMap::new();
        assert_eq!(map.add("abc", 1), Ok(()));
        assert_eq!(map.add("abd", 2), Ok(()));

        assert_eq!(map.get("abc"), Ok(Some(&1)));
        assert_eq!(map.get("abd"), Ok(Some(&2)));
        assert_eq!(map.get("abe"), Ok(None));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_colliding_keys_share_a_chain() {
        // All of these land in bucket 1 of a 16 slot table
        let keys = ["a", "q", "A", "Q", "1", "!"];
        let mut map = ProbingMap::with_capacity(16).unwrap();
        for (value, key) in keys.iter().enumerate() {
            map.add(key, value).unwrap();
        }

        for (value, key) in keys.iter().enumerate() {
            assert_eq!(map.get(key), Ok(Some(&value)), "key {key}");
        }
        assert_eq!(map.chain_len("a"), Ok(keys.len()));
        assert_eq!(map.longest_chain(), keys.len());
        assert_eq!(map.size(), keys.len());
    }

    #[test]
    fn test_single_entry_chain_checks_key() {
        let mut map = ProbingMap::with_capacity(16).unwrap();
        map.add("a", 1).unwrap();

        // Same bucket, different key
        assert_eq!(map.get("q"), Ok(None));
    }

    #[test]
    fn test_missing_key_in_long_chain() {
        let mut map = ProbingMap::with_capacity(16).unwrap();
        map.add("a", 1).unwrap();
        map.add("q", 2).unwrap();

        assert_eq!(map.get("A"), Ok(None));
        assert_eq!(map.get("b"), Ok(None));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut map = ProbingMap::with_capacity(16).unwrap();
        map.add("a", 1).unwrap();
        map.add("q", 2).unwrap();

        let duplicate = |key: &str, value: i32| -> AddResult<i32> {
            Err(Rejected::new(MapError::DuplicateKey { key: key.to_string() }, value))
        };
        assert_eq!(map.add("q", 3), duplicate("q", 3));
        assert_eq!(map.add("a", 4), duplicate("a", 4));
        assert_eq!(map.get("q"), Ok(Some(&2)));
        assert_eq!(map.size(), 2);
        assert_eq!(map.chain_len("a"), Ok(2));
    }

    #[test]
    fn test_duplicate_hands_value_back() {
        let mut map = ProbingMap::with_capacity(16).unwrap();
        map.add("a", vec![1]).unwrap();
        map.add("q", vec![2]).unwrap();

        let rejected = map.add("q", vec![3, 4]).unwrap_err();
        assert_eq!(rejected.error, MapError::DuplicateKey { key: "q".to_string() });
        assert_eq!(rejected.into_value(), vec![3, 4]);

        let rejected = map.add("", vec![5]).unwrap_err();
        assert_eq!(rejected.error, MapError::InvalidKey { key: String::new() });
        assert_eq!(rejected.value, vec![5]);
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_prefix_is_not_a_duplicate() {
        let mut map = ProbingMap::with_capacity(1).unwrap();
        map.add("abc", 1).unwrap();

        assert_eq!(map.add("ab", 2), Ok(()));
        assert_eq!(map.add("abcd", 3), Ok(()));
        assert_eq!(map.get("ab"), Ok(Some(&2)));
        assert_eq!(map.get("abc"), Ok(Some(&1)));
    }

    #[test]
    fn test_size_can_exceed_capacity() {
        let mut map = ProbingMap::with_capacity(1).unwrap();
        for i in 0..10 {
            map.add(&format!("key-{i}"), i).unwrap();
        }

        assert_eq!(map.size(), 10);
        assert_eq!(map.capacity(), 1);
        assert_eq!(map.get("key-7"), Ok(Some(&7)));
    }

    #[test]
    fn test_empty_table() {
        let map: ProbingMap<i32> = ProbingMap::default();
        assert_eq!(map.size(), 0);
        assert_eq!(map.longest_chain(), 0);
        assert_eq!(map.chain_len("a"), Ok(0));
        assert_eq!(map.get(""), Err(MapError::InvalidKey { key: String::new() }));
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_iter_yields_chains_in_insertion_order() {
        let mut map = ProbingMap::with_capacity(16).unwrap();
        map.add("q", 2).unwrap();
        map.add("a", 1).unwrap();
        map.add("p", 0).unwrap();

        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("p", &0), ("q", &2), ("a", &1)]);
    }
}
