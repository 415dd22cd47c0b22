//! Shift-and-add string hashing shared by all map variants

use crate::error::{MapError, Result};

/// Number of slots used by `new()` on every map variant
pub const DEFAULT_CAPACITY: usize = 513;

/// Bits the accumulator is shifted by before each character is added
const SHIFT: u32 = 4;

/// Maps ASCII string keys onto bucket indices in `[0, capacity)`.
///
/// Each byte is folded in with `acc = (acc << 4) + byte` using wrapping 64-bit
/// arithmetic, then the accumulator is reduced modulo the capacity. Keys of up to
/// 14 characters never overflow the accumulator; longer keys lose their high bits.
///
/// The hash is deterministic and clusters on common prefixes. It offers no
/// protection against adversarial keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringHasher {
    /// Number of buckets indices are reduced to
    capacity: usize,
}

impl Default for StringHasher {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY }
    }
}

impl StringHasher {
    /// Creates a hasher producing indices in `[0, capacity)`
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MapError::InvalidCapacity { capacity });
        }
        Ok(Self { capacity })
    }

    /// Number of buckets this hasher spreads keys over
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Computes the home index of `key`
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidKey`] when the key is empty or not ASCII.
    pub fn index(&self, key: &str) -> Result<usize> {
        hash(key, self.capacity)
    }
}

/// Computes the bucket index of `key` in a table of `capacity` slots
///
/// # Errors
///
/// Returns [`MapError::InvalidKey`] for an empty or non-ASCII key and
/// [`MapError::InvalidCapacity`] when `capacity` is zero.
pub fn hash(key: &str, capacity: usize) -> Result<usize> {
    validate_key(key)?;

    let acc = key
        .bytes()
        .fold(0_u64, |acc, byte| acc.wrapping_shl(SHIFT).wrapping_add(u64::from(byte)));

    u64::try_from(capacity)
        .ok()
        .and_then(|modulus| acc.checked_rem(modulus))
        .and_then(|index| usize::try_from(index).ok())
        .ok_or(MapError::InvalidCapacity { capacity })
}

/// Checks that a key is a non-empty ASCII string
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || !key.is_ascii() {
        return Err(MapError::InvalidKey { key: key.to_owned() });
    }
    Ok(())
}
