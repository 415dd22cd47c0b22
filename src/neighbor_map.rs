//! Open addressing that searches outwards from the home index

use std::iter::FusedIterator;

use log::{debug, trace};

use crate::{
    direct_map::empty_slots,
    entry::Entry,
    error::{AddResult, MapError, Rejected, Result},
    hasher::StringHasher,
    utils::CollisionMap,
};

/// Slot indices visited when searching outwards from a home index.
///
/// Starting at `home` the sequence alternates left and right with a growing offset:
/// `home, home - 1, home + 1, home - 2, home + 2, ...`. Indices outside the table are
/// skipped, and the sequence ends once both sides have left it, so every slot is
/// visited exactly once.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    /// Index the sequence radiates from
    home: usize,
    /// Number of slots in the table
    capacity: usize,
    /// Distance from `home` of the next candidates
    offset: usize,
    /// Whether the left candidate at `offset` is tried next
    left_next: bool,
    /// Whether `home` itself has been yielded
    started: bool,
}

impl ProbeSequence {
    /// Creates the sequence for `home` in a table of `capacity` slots
    #[must_use]
    pub fn new(home: usize, capacity: usize) -> Self {
        Self { home, capacity, offset: 1, left_next: true, started: false }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.home >= self.capacity {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.home);
        }

        loop {
            let left = self.home.checked_sub(self.offset);
            let right = self.home.checked_add(self.offset).filter(|&index| index < self.capacity);
            if left.is_none() && right.is_none() {
                return None;
            }

            if self.left_next {
                self.left_next = false;
                if left.is_some() {
                    return left;
                }
            } else {
                self.left_next = true;
                self.offset = self.offset.saturating_add(1);
                if right.is_some() {
                    return right;
                }
            }
        }
    }
}

impl FusedIterator for ProbeSequence {}

/// Where a probe for a key came to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is stored at this index
    Found(usize),
    /// The key is absent and this is the first free slot in its sequence
    Vacant(usize),
    /// Every slot was visited without finding the key or a free slot
    Exhausted,
}

/// A fixed-capacity map resolving collisions by moving entries to nearby slots.
///
/// When a key's home slot is taken the entry goes to the closest free slot, trying
/// one step left, one step right, two steps left, and so on (see [`ProbeSequence`]).
/// Lookups replay the same sequence and stop at the first free slot.
///
/// Every slot holds at most one entry, so the map fills up after `capacity` adds.
#[derive(Debug, Clone)]
pub struct NeighborMap<V> {
    /// One optional entry per slot, possibly away from its home index
    slots: Box<[Option<Entry<V>>]>,
    /// Computes the home index of a key
    hasher: StringHasher,
    /// Number of stored entries
    size: usize,
}

impl<V> Default for NeighborMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NeighborMap<V> {
    /// Creates a map with [`crate::DEFAULT_CAPACITY`] slots
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(StringHasher::default())
    }

    /// Creates a map with `capacity` slots
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

    /// Walks the probe sequence of `key` and returns where it ended, with the number
    /// of slots inspected.
    ///
    /// Entries are never removed, so every slot before a stored key in its sequence
    /// stays occupied. Stopping at the first free slot is therefore enough to rule
    /// the key out.
    fn probe(&self, key: &str) -> Result<(Probe, usize)> {
        let home = self.hasher.index(key)?;
        let mut inspected: usize = 0;

        for index in ProbeSequence::new(home, self.slots.len()) {
            inspected = inspected.saturating_add(1);
            match self.slots.get(index) {
                Some(Some(entry)) if entry.matches(key) => {
                    return Ok((Probe::Found(index), inspected));
                }
                Some(Some(_)) => {}
                Some(None) => return Ok((Probe::Vacant(index), inspected)),
                None => {
                    return Err(MapError::OutOfBounds { index, capacity: self.slots.len() });
                }
            }
        }

        Ok((Probe::Exhausted, inspected))
    }

    /// Stores `value` under `key` in the nearest free slot of its probe sequence.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys,
    /// [`MapError::DuplicateKey`] if the key is already stored and
    /// [`MapError::TableFull`] when no free slot is left. The rejected value comes
    /// back inside the [`Rejected`].
    pub fn add(&mut self, key: &str, value: V) -> AddResult<V> {
        let capacity = self.slots.len();
        let (probe, inspected) = match self.probe(key) {
            Ok(outcome) => outcome,
            Err(error) => return Err(Rejected::new(error, value)),
        };

        let index = match probe {
            Probe::Vacant(index) => index,
            Probe::Found(_) => {
                debug!("rejecting duplicate key {key:?}");
                let error = MapError::DuplicateKey { key: key.to_owned() };
                return Err(Rejected::new(error, value));
            }
            Probe::Exhausted => {
                debug!("rejecting key {key:?}: all {capacity} slots are taken");
                let error = MapError::TableFull { key: key.to_owned(), capacity };
                return Err(Rejected::new(error, value));
            }
        };

        let Some(slot) = self.slots.get_mut(index) else {
            return Err(Rejected::new(MapError::OutOfBounds { index, capacity }, value));
        };
        *slot = Some(Entry::new(key, value));
        self.size = self.size.saturating_add(1);

        if inspected > 1 {
            debug!("relocated key {key:?} to index {index} after {inspected} probes");
        } else {
            trace!("stored key {key:?} at index {index}");
        }
        Ok(())
    }

    /// Returns the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        match self.probe(key)? {
            (Probe::Found(index), _) => {
                Ok(self.slots.get(index).and_then(Option::as_ref).map(Entry::value))
            }
            (Probe::Vacant(_) | Probe::Exhausted, _) => Ok(None),
        }
    }

    /// Number of slots a lookup of `key` inspects
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn probe_count(&self, key: &str) -> Result<usize> {
        self.probe(key).map(|(_, inspected)| inspected)
    }

    /// Number of stored entries
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the stored key-value pairs in slot order
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots.iter().filter_map(Option::as_ref).map(|entry| (entry.key(), entry.value()))
    }
}

impl<V> CollisionMap<V> for NeighborMap<V> {
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

    // 16 is 1 modulo 5, so in a 5 slot table a key's home is its byte sum modulo 5.
    // 'a', 'f', 'k', 'p', 'u' and 'z' all start at index 2.
    const SAME_HOME: [&str; 6] = ["a", "f", "k", "p", "u", "z"];

    /// The outcome of an `add` turned down with `error`
    fn rejected<V>(error: MapError, value: V) -> AddResult<V> {
        Err(Rejected::new(error, value))
    }

    /// The outcome of an `add` of `key` into a full table of `capacity` slots
    fn table_full<V>(key: &str, capacity: usize, value: V) -> AddResult<V> {
        rejected(MapError::TableFull { key: key.to_string(), capacity }, value)
    }

    #[test]
    fn test_probe_sequence_from_middle() {
        assert_eq!(ProbeSequence::new(2, 5).collect::<Vec<_>>(), vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn test_probe_sequence_skips_out_of_range_side() {
        assert_eq!(ProbeSequence::new(0, 5).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(ProbeSequence::new(1, 5).collect::<Vec<_>>(), vec![1, 0, 2, 3, 4]);
        assert_eq!(ProbeSequence::new(4, 5).collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
        assert_eq!(ProbeSequence::new(0, 1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_probe_sequence_visits_every_slot_once() {
        for capacity in 1..40 {
            for home in 0..capacity {
                let mut visited: Vec<usize> = ProbeSequence::new(home, capacity).collect();
                visited.sort_unstable();
                assert_eq!(visited, (0..capacity).collect::<Vec<_>>(), "home {home} of {capacity}");
            }
        }
    }

    #[test]
    fn test_probe_sequence_is_fused() {
        let mut sequence = ProbeSequence::new(0, 1);
        assert_eq!(sequence.next(), Some(0));
        assert_eq!(sequence.next(), None);
        assert_eq!(sequence.next(), None);
        assert_eq!(ProbeSequence::new(3, 3).next(), None);
    }

    #[test]
    fn test_add_and_get() {
        let mut map = NeighborMap::new();
        assert_eq!(map.add("abc", 1), Ok(()));
        assert_eq!(map.add("abd", 2), Ok(()));

        assert_eq!(map.get("abc"), Ok(Some(&1)));
        assert_eq!(map.get("abd"), Ok(Some(&2)));
        assert_eq!(map.get("abe"), Ok(None));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_colliding_keys_are_relocated() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        for (value, key) in SAME_HOME.iter().take(5).enumerate() {
            map.add(key, value).unwrap();
        }

        // Placed at 2, 1, 3, 0, 4
        assert_eq!(
            map.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            vec!["p", "f", "a", "k", "u"]
        );
        for (value, key) in SAME_HOME.iter().take(5).enumerate() {
            assert_eq!(map.get(key), Ok(Some(&value)), "key {key}");
        }
        assert_eq!(map.probe_count("a"), Ok(1));
        assert_eq!(map.probe_count("u"), Ok(5));
    }

    #[test]
    fn test_full_table_is_rejected() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        for key in SAME_HOME.iter().take(5) {
            map.add(key, ()).unwrap();
        }

        assert_eq!(map.add("z", ()), table_full("z", 5, ()));
        // 'b' starts elsewhere but the table has no room left
        assert_eq!(map.add("b", ()), table_full("b", 5, ()));
        assert_eq!(map.size(), 5);
        assert_eq!(map.get("z"), Ok(None));
        assert_eq!(map.probe_count("z"), Ok(5));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        map.add("a", 1).unwrap();
        map.add("f", 2).unwrap();

        assert_eq!(map.add("f", 3), rejected(MapError::DuplicateKey { key: "f".to_string() }, 3));
        assert_eq!(map.add("a", 4), rejected(MapError::DuplicateKey { key: "a".to_string() }, 4));
        assert_eq!(map.get("f"), Ok(Some(&2)));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_duplicate_detected_in_full_table() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        for key in SAME_HOME.iter().take(5) {
            map.add(key, ()).unwrap();
        }

        assert_eq!(map.add("u", ()), rejected(MapError::DuplicateKey { key: "u".to_string() }, ()));
    }

    #[test]
    fn test_full_table_hands_value_back() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        for key in SAME_HOME.iter().take(5) {
            map.add(key, key.to_uppercase()).unwrap();
        }

        let rejected = map.add("z", String::from("Z")).unwrap_err();
        assert_eq!(rejected.error, MapError::TableFull { key: "z".to_string(), capacity: 5 });

        // A larger table takes the value the full one turned down
        let mut larger = NeighborMap::with_capacity(6).unwrap();
        larger.add("z", rejected.into_value()).unwrap();
        assert_eq!(larger.get("z").unwrap().map(String::as_str), Some("Z"));
    }

    #[test]
    fn test_missing_key_stops_at_free_slot() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        map.add("a", 1).unwrap();
        map.add("f", 2).unwrap();
        map.add("k", 3).unwrap();

        // Visits 2, 1, 3 then the free slot 0
        assert_eq!(map.get("p"), Ok(None));
        assert_eq!(map.probe_count("p"), Ok(4));
    }

    #[test]
    fn test_relocation_into_other_home() {
        let mut map = NeighborMap::with_capacity(5).unwrap();
        map.add("a", 1).unwrap();
        map.add("f", 2).unwrap();
        // 'e' is 101, home 1, which 'f' took; the next candidate is 0
        map.add("e", 3).unwrap();

        assert_eq!(map.get("e"), Ok(Some(&3)));
        assert_eq!(map.probe_count("e"), Ok(2));
        assert_eq!(map.iter().next(), Some(("e", &3)));
        assert_eq!(map.get("f"), Ok(Some(&2)));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            NeighborMap::<u8>::with_capacity(0),
            Err(MapError::InvalidCapacity { capacity: 0 })
        ));

        let mut map = NeighborMap::new();
        assert_eq!(map.add("", 1), rejected(MapError::InvalidKey { key: String::new() }, 1));
        assert_eq!(map.probe_count("ß"), Err(MapError::InvalidKey { key: "ß".to_string() }));
        assert_eq!(map.size(), 0);
    }

    #[test]
    fn test_fills_every_slot() {
        let mut map = NeighborMap::with_capacity(64).unwrap();
        for i in 0..64 {
            map.add(&format!("k{i}"), i).unwrap();
        }

        assert_eq!(map.size(), map.capacity());
        for i in 0..64 {
            assert_eq!(map.get(&format!("k{i}")), Ok(Some(&i)));
        }
        assert_eq!(map.add("one-more", 64), table_full("one-more", 64, 64));
    }
}
