//! The operations every map variant shares

use crate::error::{AddResult, Rejected, Result};

/// Common surface of the fixed-capacity map variants.
///
/// Lets callers and benchmarks swap collision strategies without changing code.
pub trait CollisionMap<V> {
    /// Stores `value` under `key`
    ///
    /// # Errors
    ///
    /// Fails with the variant's rejection reason; the map is left unchanged and the
    /// value is handed back inside the [`Rejected`].
    fn add(&mut self, key: &str, value: V) -> AddResult<V>;

    /// Looks up the value stored under `key`
    ///
    /// # Errors
    ///
    /// Fails only for malformed keys.
    fn get(&self, key: &str) -> Result<Option<&V>>;

    /// Number of successful `add` calls
    fn size(&self) -> usize;

    /// Number of slots in the backing table
    fn capacity(&self) -> usize;

    /// Returns true if nothing has been added yet
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns true if a value is found under `key`
    ///
    /// # Errors
    ///
    /// Fails only for malformed keys.
    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Adds every pair in order and returns how many were stored.
    ///
    /// Stops at the first rejected pair; pairs added before it stay in the map.
    ///
    /// # Errors
    ///
    /// Returns the rejection of the first pair that was not stored, holding its value.
    /// Pairs after it are not consumed.
    fn add_all<K, I>(&mut self, pairs: I) -> std::result::Result<usize, Rejected<V>>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
        Self: Sized,
    {
        let mut added: usize = 0;
        for (key, value) in pairs {
            self.add(key.as_ref(), value)?;
            added = added.saturating_add(1);
        }
        Ok(added)
    }
}
