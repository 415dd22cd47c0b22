//! # Collision Maps
//!
//! Fixed-capacity hash maps over ASCII string keys, one per collision strategy.
//!
//! All variants share the same shift-and-add [`StringHasher`] and never resize:
//!
//! - `DirectMap`: one bare value per bucket; a collision rejects the insert and lookups
//!   cannot tell colliding keys apart
//! - `KeyedDirectMap`: one entry per bucket; collisions are rejected but lookups check keys
//! - `ProbingMap`: separate chaining, each bucket holds a list of entries
//! - `NeighborMap`: open addressing, colliding entries move to the nearest free slot
//!   searching alternately left and right of their home index
//!
//! ## Basic Usage
//!
//! ```rust
//! use collision_maps::{DirectMap, MapError, NeighborMap, ProbingMap};
//!
//! // With 16 slots "a" and "q" hash to the same bucket
//! let mut direct = DirectMap::with_capacity(16)?;
//! direct.add("a", 1)?;
//! let rejected = direct.add("q", 2).unwrap_err();
//! assert_eq!(rejected.error, MapError::Collision { key: "q".to_string(), index: 1 });
//!
//! // The rejected value comes back and can go into a map that chains collisions
//! let mut chained = ProbingMap::with_capacity(16)?;
//! chained.add("a", 1)?;
//! chained.add("q", rejected.into_value())?;
//! assert_eq!(chained.get("q")?, Some(&2));
//!
//! let mut neighbor = NeighborMap::with_capacity(16)?;
//! neighbor.add("a", 1)?;
//! neighbor.add("q", 2)?;
//! assert_eq!(neighbor.get("a")?, Some(&1));
//! assert_eq!(neighbor.get("q")?, Some(&2));
//! assert_eq!(neighbor.size(), 2);
//! # Ok::<(), MapError>(())
//! ```
//!
//! ## Swapping Strategies
//!
//! ```rust
//! use collision_maps::{CollisionMap, KeyedDirectMap, NeighborMap};
//!
//! fn load(map: &mut impl CollisionMap<u32>) -> collision_maps::Result<usize> {
//!     Ok(map.add_all([("red", 1), ("green", 2), ("blue", 3)])?)
//! }
//!
//! let mut keyed = KeyedDirectMap::new();
//! let mut neighbor = NeighborMap::new();
//! assert_eq!(load(&mut keyed)?, 3);
//! assert_eq!(load(&mut neighbor)?, 3);
//! assert!(neighbor.contains_key("green")?);
//! # Ok::<(), collision_maps::MapError>(())
//! ```

/// Maps with one slot per bucket that reject collisions
mod direct_map;
/// Key-value pair stored by the keyed variants
mod entry;
/// Error types and result aliases
mod error;
/// Shift-and-add string hashing
mod hasher;
/// Open addressing with alternating neighbour probing
mod neighbor_map;
/// Separate chaining
mod probing_map;
/// Trait shared by all map variants
mod utils;

pub use direct_map::{DirectMap, KeyedDirectMap};
pub use entry::Entry;
pub use error::{AddResult, MapError, Rejected, Result};
pub use hasher::{DEFAULT_CAPACITY, StringHasher, hash};
pub use neighbor_map::{NeighborMap, ProbeSequence};
pub use probing_map::ProbingMap;
pub use utils::CollisionMap;
