use std::collections::{HashMap, VecDeque};
use time::OffsetDateTime;

/// What a revisit record needs to know about the record it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisitEntry {
    pub record_id: String,
    pub payload_digest: String,
    pub target_uri: String,
    pub date: OffsetDateTime,
}

/// Bounded map from a payload key (body hash) to the record that first
/// stored that payload in the current file.
///
/// When full, the entry inserted longest ago is evicted. Replacing an
/// existing key keeps its original position in the eviction order.
#[derive(Debug, Clone)]
pub struct RevisitCache {
    capacity: usize,
    entries: HashMap<String, RevisitEntry>,
    order: VecDeque<String>,
}

impl RevisitCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RevisitEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: RevisitEntry) {
        if self.capacity == 0 {
            return;
        }
        let key = key.into();
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                },
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry(id: &str) -> RevisitEntry {
        RevisitEntry {
            record_id: format!("<urn:uuid:{id}>"),
            payload_digest: format!("sha256:{id}"),
            target_uri: "https://www.epa.gov/".to_string(),
            date: datetime!(2017-03-01 12:00:00 UTC),
        }
    }

    #[test]
    fn test_get_after_insert() {
        let mut cache = RevisitCache::new(4);
        assert!(cache.is_empty());
        cache.insert("hash-a", entry("a"));
        assert_eq!(cache.get("hash-a"), Some(&entry("a")));
        assert_eq!(cache.get("hash-b"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_insertion() {
        let mut cache = RevisitCache::new(2);
        cache.insert("a", entry("a"));
        cache.insert("b", entry("b"));
        // Reading doesn't refresh an entry.
        assert!(cache.get("a").is_some());
        cache.insert("c", entry("c"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = RevisitCache::new(2);
        cache.insert("a", entry("a"));
        cache.insert("b", entry("b"));
        cache.insert("a", entry("a2"));
        assert_eq!(cache.get("a").map(|e| e.record_id.as_str()), Some("<urn:uuid:a2>"));
        cache.insert("c", entry("c"));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = RevisitCache::new(2);
        cache.insert("a", entry("a"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
        cache.insert("b", entry("b"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = RevisitCache::new(0);
        cache.insert("a", entry("a"));
        assert!(cache.is_empty());
    }
}
