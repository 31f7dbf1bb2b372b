//! Hash containers used by the registry and the caches.
//!
//! - [`HashMap`] / [`HashSet`]: `hashbrown` containers with a fixed `foldhash` seed,
//!   so iteration order of a given build is reproducible.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`] that skips re-hashing.

use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A09E667F3BCC909);

/// Hash state with a fixed seed, based on `foldhash`.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<K> = hashbrown::HashSet<K, FixedHashState>;

// -----------------------------------------------------------------------------
// TypeIdMap

/// Passes the `u64` written by [`TypeId`]'s `Hash` impl straight through.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`].
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher::default()
    }
}

/// A map with [`TypeId`] keys.
pub type TypeIdMap<V> = hashbrown::HashMap<TypeId, V, NoOpHashState>;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::hash::BuildHasher;

    use super::{FixedHashState, TypeIdMap};

    #[test]
    fn fixed_state_is_stable() {
        let a = FixedHashState.hash_one("name");
        let b = FixedHashState.hash_one("name");
        assert_eq!(a, b);
    }

    #[test]
    fn type_id_map_roundtrip() {
        let mut map = TypeIdMap::<&str>::default();
        map.insert(TypeId::of::<u8>(), "u8");
        map.insert(TypeId::of::<i64>(), "i64");
        assert_eq!(map.get(&TypeId::of::<u8>()), Some(&"u8"));
        assert_eq!(map.get(&TypeId::of::<i64>()), Some(&"i64"));
        assert!(map.get(&TypeId::of::<u16>()).is_none());
    }
}
