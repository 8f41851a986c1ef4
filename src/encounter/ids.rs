//! Identifier generation for roster entries

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Issues unique string identifiers (`c_1`, `c_2`, ...)
///
/// Identifiers are never reused, even after the entry they named is removed.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator using the default `c` prefix
    pub fn new() -> Self {
        Self::with_prefix("c")
    }

    /// Create a generator with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    /// Create a shared instance
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Issue the next identifier
    pub fn next(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", self.prefix, n)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next(), "c_1");
        assert_eq!(ids.next(), "c_2");
        assert_eq!(ids.next(), "c_3");
    }

    #[test]
    fn test_custom_prefix() {
        let ids = IdGenerator::with_prefix("env");
        assert_eq!(ids.next(), "env_1");
    }

    #[test]
    fn test_shared_generator_never_repeats() {
        let ids = IdGenerator::shared();
        let other = ids.clone();

        let mut seen = HashSet::new();
        for _ in 0..50 {
            assert!(seen.insert(ids.next()));
            assert!(seen.insert(other.next()));
        }
    }
}
