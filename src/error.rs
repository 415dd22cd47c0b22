//! Error type shared by every map variant

use thiserror::Error;

/// Errors reported by the hasher and the map variants.
///
/// A failed `add` never alters the table or the entry count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The key was empty or contained non-ASCII characters
    #[error("invalid key {key:?}: keys must be non-empty ASCII strings")]
    InvalidKey {
        /// The rejected key
        key: String,
    },

    /// A table was requested with zero slots
    #[error("invalid capacity {capacity}: a table needs at least one slot")]
    InvalidCapacity {
        /// The rejected capacity
        capacity: usize,
    },

    /// The key's slot is already taken and the map does not resolve collisions
    #[error("collision detected at index {index} for key {key:?}")]
    Collision {
        /// The key that could not be stored
        key: String,
        /// The occupied slot
        index: usize,
    },

    /// The key is already stored in the map
    #[error("key {key:?} already exists")]
    DuplicateKey {
        /// The duplicated key
        key: String,
    },

    /// Every slot reachable from the key's home index is taken
    #[error("no free slot for key {key:?} in a table of {capacity} slots")]
    TableFull {
        /// The key that could not be stored
        key: String,
        /// Number of slots in the table
        capacity: usize,
    },

    /// A computed index fell outside the table.
    ///
    /// Hashed indices always lie inside the table, so callers never see this
    /// variant; it is returned in place of a panic if that invariant is broken.
    #[error("index {index} out of bounds for a table of {capacity} slots")]
    OutOfBounds {
        /// The offending index
        index: usize,
        /// Number of slots in the table
        capacity: usize,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MapError>;

/// An `add` that was turned down, handing the unstored value back.
///
/// Nothing is lost on a rejected insert: the caller can retry with another key or
/// another map using [`Rejected::into_value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct Rejected<V> {
    /// Why the value was not stored
    pub error: MapError,
    /// The value that was not stored
    pub value: V,
}

impl<V> Rejected<V> {
    /// Pairs a rejection reason with the value it applies to
    #[must_use]
    pub fn new(error: MapError, value: V) -> Self {
        Self { error, value }
    }

    /// Takes the unstored value back
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> From<Rejected<V>> for MapError {
    fn from(rejected: Rejected<V>) -> Self {
        rejected.error
    }
}

/// Outcome of an `add`
pub type AddResult<V> = std::result::Result<(), Rejected<V>>;
