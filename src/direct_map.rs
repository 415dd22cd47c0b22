//! Maps that give every bucket exactly one slot and reject collisions

use log::{debug, trace};

use crate::{
    entry::Entry,
    error::{AddResult, MapError, Rejected, Result},
    hasher::StringHasher,
    utils::CollisionMap,
};

/// Builds a table of `capacity` empty slots
pub(crate) fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

/// A fixed-capacity map storing bare values, one per bucket.
///
/// Two keys hashing to the same bucket are a hard error: the second `add` fails with
/// [`MapError::Collision`] and hands the value back, so the caller can pick another
/// key or another map.
///
/// Because keys are not stored, [`DirectMap::get`] cannot tell keys sharing a bucket
/// apart. Looking up a key that was never added returns whatever value occupies its
/// bucket. Use [`KeyedDirectMap`] when that matters.
#[derive(Debug, Clone)]
pub struct DirectMap<V> {
    /// One optional value per bucket
    slots: Box<[Option<V>]>,
    /// Computes the bucket of a key
    hasher: StringHasher,
    /// Number of stored values
    size: usize,
}

impl<V> Default for DirectMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DirectMap<V> {
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

    /// Stores `value` in the bucket of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys and [`MapError::Collision`]
    /// when the bucket already holds a value, whichever key stored it. The rejected
    /// value comes back inside the [`Rejected`].
    pub fn add(&mut self, key: &str, value: V) -> AddResult<V> {
        let index = match self.hasher.index(key) {
            Ok(index) => index,
            Err(error) => return Err(Rejected::new(error, value)),
        };
        let capacity = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(Rejected::new(MapError::OutOfBounds { index, capacity }, value));
        };

        if slot.is_some() {
            debug!("rejecting key {key:?}: index {index} is taken");
            return Err(Rejected::new(MapError::Collision { key: key.to_owned(), index }, value));
        }

        *slot = Some(value);
        self.size = self.size.saturating_add(1);
        trace!("stored key {key:?} at index {index}");
        Ok(())
    }

    /// Returns the value in the bucket of `key`, if any.
    ///
    /// The value is not checked against the key; see the type documentation.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        let index = self.hasher.index(key)?;
        Ok(self.slots.get(index).and_then(Option::as_ref))
    }

    /// Returns true if adding `key` now would collide
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn is_occupied(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of stored values
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the stored values in slot order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<V> CollisionMap<V> for DirectMap<V> {
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

/// A fixed-capacity map storing one [`Entry`] per bucket.
///
/// Collisions are still rejected, but keys are kept next to their values so a lookup
/// only succeeds for the key that was actually stored.
#[derive(Debug, Clone)]
pub struct KeyedDirectMap<V> {
    /// One optional entry per bucket
    slots: Box<[Option<Entry<V>>]>,
    /// Computes the bucket of a key
    hasher: StringHasher,
    /// Number of stored entries
    size: usize,
}

impl<V> Default for KeyedDirectMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedDirectMap<V> {
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

    /// Stores `value` under `key` in the key's bucket.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys, [`MapError::DuplicateKey`]
    /// if the bucket holds `key` already and [`MapError::Collision`] if it holds
    /// another key. The rejected value comes back inside the [`Rejected`].
    pub fn add(&mut self, key: &str, value: V) -> AddResult<V> {
        let index = match self.hasher.index(key) {
            Ok(index) => index,
            Err(error) => return Err(Rejected::new(error, value)),
        };
        let capacity = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(Rejected::new(MapError::OutOfBounds { index, capacity }, value));
        };

        if let Some(entry) = slot.as_ref() {
            let error = if entry.matches(key) {
                debug!("rejecting duplicate key {key:?}");
                MapError::DuplicateKey { key: key.to_owned() }
            } else {
                debug!("rejecting key {key:?}: index {index} holds {:?}", entry.key());
                MapError::Collision { key: key.to_owned(), index }
            };
            return Err(Rejected::new(error, value));
        }

        *slot = Some(Entry::new(key, value));
        self.size = self.size.saturating_add(1);
        trace!("stored key {key:?} at index {index}");
        Ok(())
    }

    /// Returns the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] for malformed keys.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        let index = self.hasher.index(key)?;
        Ok(self
            .slots
            .get(index)
            .and_then(Option::as_ref)
            .filter(|entry| entry.matches(key))
            .map(Entry::value))
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

impl<V> CollisionMap<V> for KeyedDirectMap<V> {
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
