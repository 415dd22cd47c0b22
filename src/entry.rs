//! Key-value pair stored by the keyed map variants

/// A stored key together with its value.
///
/// Keeping the key next to the value is what lets a map tell colliding keys apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    /// The key the value was added under
    key: String,
    /// The stored value
    value: V,
}

impl<V> Entry<V> {
    /// Pairs `key` with `value`
    #[must_use]
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self { key: key.into(), value }
    }

    /// The key the entry was stored under
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored value
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns true if the entry was stored under exactly `key`
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.key == key
    }

    /// Splits the entry back into its key and value
    #[must_use]
    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}
