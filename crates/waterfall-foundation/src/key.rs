//! Stable item identity.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Stable identity of a data item as seen by the layout engine.
///
/// Keys must be unique within a data set and stable across renders; they are
/// what makes incremental packing possible (already-positioned items are
/// recognized by key and skipped on the next data change).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub u64);

/// Folds any hashable row key into an [`ItemKey`].
pub fn item_key_of<K: Hash + ?Sized>(key: &K) -> ItemKey {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    ItemKey(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable() {
        assert_eq!(item_key_of("feed-17"), item_key_of("feed-17"));
        assert_eq!(item_key_of(&42u32), item_key_of(&42u32));
    }

    #[test]
    fn test_distinct_keys_differ() {
        assert_ne!(item_key_of("feed-17"), item_key_of("feed-18"));
    }
}
