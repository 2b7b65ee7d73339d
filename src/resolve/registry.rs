use crate::model::{ContentKey, Id};
use std::collections::HashMap;

/// Outcome of resolving a content key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A fresh ID was minted; the caller must queue the record
    New(Id),
    Existing(Id),
}

impl Resolved {
    pub fn id(&self) -> Id {
        match self {
            Self::New(id) | Self::Existing(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}

/// Content-key registry and ID counter for one entity kind
///
/// IDs start at 1 and are never reused. The address cache only lives for
/// the current run; the key map is rebuilt from durable rows on startup.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    keys: HashMap<ContentKey, Id>,
    addresses: HashMap<String, Id>,
    next_id: Id,
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KindRegistry {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            addresses: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a persisted row; the first row seen for a key wins
    pub fn seed(&mut self, key: ContentKey, id: Id) {
        self.keys.entry(key).or_insert(id);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    pub fn lookup(&self, key: &ContentKey) -> Option<Id> {
        self.keys.get(key).copied()
    }

    /// Returns the ID registered for `key`, minting the next one if absent
    pub fn resolve(&mut self, key: ContentKey) -> Resolved {
        if let Some(id) = self.lookup(&key) {
            return Resolved::Existing(id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.keys.insert(key, id);
        Resolved::New(id)
    }

    /// ID of an address already resolved during this run
    pub fn cached(&self, address: &str) -> Option<Id> {
        self.addresses.get(address).copied()
    }

    pub fn remember(&mut self, address: &str, id: Id) {
        self.addresses.insert(address.to_string(), id);
    }

    pub fn next_id(&self) -> Id {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> ContentKey {
        ContentKey::new(&[name, ""])
    }

    #[test]
    fn test_resolve_is_stable() {
        let mut registry = KindRegistry::new();

        let first = registry.resolve(key("Bahia"));
        let again = registry.resolve(key("  BAHIA "));
        let other = registry.resolve(key("Santos"));

        assert_eq!(first, Resolved::New(1));
        assert_eq!(again, Resolved::Existing(1));
        assert_eq!(other, Resolved::New(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_seed_continues_after_max_id() {
        let mut registry = KindRegistry::new();
        registry.seed(key("a"), 4);
        registry.seed(key("b"), 9);
        registry.seed(key("c"), 2);

        assert_eq!(registry.next_id(), 10);
        assert_eq!(registry.resolve(key("b")), Resolved::Existing(9));
        assert_eq!(registry.resolve(key("d")), Resolved::New(10));
    }

    #[test]
    fn test_seed_first_seen_wins() {
        let mut registry = KindRegistry::new();
        registry.seed(key("dup"), 3);
        registry.seed(key("dup"), 5);

        assert_eq!(registry.lookup(&key("dup")), Some(3));
        assert_eq!(registry.next_id(), 6);
    }

    #[test]
    fn test_address_cache() {
        let mut registry = KindRegistry::new();
        assert_eq!(registry.cached("https://example.com/estadio/1"), None);

        registry.remember("https://example.com/estadio/1", 7);
        assert_eq!(registry.cached("https://example.com/estadio/1"), Some(7));
    }
}
