//! Capability and range cache
//!
//! A control's `GET_INFO` bitmap and its min/max/res never change while the
//! device stays open, so each is fetched at most once per control. Failed
//! fetches are not recorded; the next lookup asks the device again.

use protocol::{Capabilities, ControlKey, Range};
use std::collections::HashMap;

/// Per-device memo of control discovery data, keyed by `(unit, selector)`
#[derive(Debug, Default)]
pub struct ControlCache {
    capabilities: HashMap<ControlKey, Capabilities>,
    ranges: HashMap<ControlKey, Range>,
}

impl ControlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached capabilities for `key`, calling `fetch` on a miss
    pub fn capabilities<E>(
        &mut self,
        key: ControlKey,
        fetch: impl FnOnce() -> Result<Capabilities, E>,
    ) -> Result<Capabilities, E> {
        if let Some(caps) = self.capabilities.get(&key) {
            return Ok(*caps);
        }
        let caps = fetch()?;
        self.capabilities.insert(key, caps);
        Ok(caps)
    }

    /// Cached range for `key`, calling `fetch` on a miss
    pub fn range<E>(
        &mut self,
        key: ControlKey,
        fetch: impl FnOnce() -> Result<Range, E>,
    ) -> Result<Range, E> {
        if let Some(range) = self.ranges.get(&key) {
            return Ok(*range);
        }
        let range = fetch()?;
        self.ranges.insert(key, range);
        Ok(range)
    }

    pub fn cached_capabilities(&self, key: ControlKey) -> Option<Capabilities> {
        self.capabilities.get(&key).copied()
    }

    pub fn cached_range(&self, key: ControlKey) -> Option<Range> {
        self.ranges.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(unit: u8, selector: u8) -> ControlKey {
        ControlKey { unit, selector }
    }

    #[test]
    fn test_fetches_once() {
        let mut cache = ControlCache::new();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(Capabilities::from_info(0x03))
        };

        for _ in 0..5 {
            let caps = cache.capabilities(key(2, 4), fetch).unwrap();
            assert!(caps.supports_set);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failure_not_cached() {
        let mut cache = ControlCache::new();

        let err = cache.range(key(2, 2), || Err::<Range, _>("timeout"));
        assert_eq!(err, Err("timeout"));
        assert!(cache.cached_range(key(2, 2)).is_none());

        let range = cache
            .range(key(2, 2), || Ok::<_, &str>(Range::new(-64, 64, 1)))
            .unwrap();
        assert_eq!(range.min, -64);
        assert_eq!(cache.cached_range(key(2, 2)), Some(range));
    }

    #[test]
    fn test_same_unit_different_selector_do_not_collide() {
        let mut cache = ControlCache::new();
        cache
            .range(key(2, 2), || Ok::<_, ()>(Range::new(-64, 64, 1)))
            .unwrap();
        cache
            .range(key(2, 3), || Ok::<_, ()>(Range::new(0, 95, 1)))
            .unwrap();

        assert_eq!(cache.cached_range(key(2, 2)).unwrap().max, 64);
        assert_eq!(cache.cached_range(key(2, 3)).unwrap().max, 95);
        assert!(cache.cached_range(key(1, 2)).is_none());
    }

    #[test]
    fn test_capabilities_and_ranges_independent() {
        let mut cache = ControlCache::new();
        cache
            .capabilities(key(1, 4), || Ok::<_, ()>(Capabilities::from_info(0x01)))
            .unwrap();
        assert!(cache.cached_range(key(1, 4)).is_none());
        assert!(cache.cached_capabilities(key(1, 4)).is_some());
    }
}
