// packages/engine/src/invocation/sequence.rs
//! Process-wide invocation sequencer
//!
//! Every intercepted call takes one number from the global sequencer. The
//! numbers are unique across all threads and mocks and give invocation
//! history its total order. Gaps are possible, duplicates are not. The
//! counter lives for the lifetime of the process and is never persisted.

use crate::utils::errors::{EngineError, Result};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Base used when the global sequencer is first touched without `init_global`
pub const DEFAULT_BASE: u64 = 1;

static GLOBAL: OnceCell<Sequencer> = OnceCell::new();

/// Monotonic counter handing out unique sequence numbers
#[derive(Debug)]
pub struct Sequencer {
    next: AtomicU64,
}

impl Sequencer {
    pub const fn starting_at(base: u64) -> Self {
        Self {
            next: AtomicU64::new(base),
        }
    }

    /// Take the next number
    pub fn next(&self) -> u64 {
        // A single read-modify-write; uniqueness does not depend on ordering.
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Number the next call to `next` would return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::starting_at(DEFAULT_BASE)
    }
}

/// Initialize the global sequencer with an explicit base
///
/// Fails once the sequencer is in use, since rebasing would allow duplicates.
pub fn init_global(base: u64) -> Result<()> {
    GLOBAL.set(Sequencer::starting_at(base)).map_err(|_| {
        EngineError::Config("Global sequencer already initialized".to_string())
    })?;
    info!("Global sequencer initialized at {}", base);
    Ok(())
}

/// The global sequencer
pub fn global() -> &'static Sequencer {
    GLOBAL.get_or_init(Sequencer::default)
}

/// Take the next global sequence number
pub fn next() -> u64 {
    global().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_strictly_increasing() {
        let sequencer = Sequencer::starting_at(10);
        assert_eq!(sequencer.next(), 10);
        assert_eq!(sequencer.next(), 11);
        assert_eq!(sequencer.peek(), 12);
    }

    #[test]
    fn test_global_next_increases() {
        let a = next();
        let b = next();
        assert!(b > a);
    }

    #[test]
    fn test_init_global_after_use_fails() {
        let _ = next();
        assert!(matches!(init_global(500), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_concurrent_numbers_are_distinct() {
        let sequencer = Arc::new(Sequencer::default());
        let mut handles = vec![];

        for _ in 0..8 {
            let s = Arc::clone(&sequencer);
            handles.push(thread::spawn(move || {
                (0..1000).map(|_| s.next()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for n in handle.join().unwrap() {
                assert!(seen.insert(n), "duplicate sequence number {}", n);
            }
        }
        assert_eq!(seen.len(), 8000);
    }

    proptest! {
        #[test]
        fn prop_numbers_pairwise_distinct(base in 0u64..1_000_000, threads in 1usize..6, per_thread in 1usize..200) {
            let sequencer = Arc::new(Sequencer::starting_at(base));
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let s = Arc::clone(&sequencer);
                    thread::spawn(move || (0..per_thread).map(|_| s.next()).collect::<Vec<_>>())
                })
                .collect();

            let mut seen = HashSet::new();
            for handle in handles {
                for n in handle.join().unwrap() {
                    prop_assert!(n >= base);
                    prop_assert!(seen.insert(n));
                }
            }
            prop_assert_eq!(seen.len(), threads * per_thread);
        }
    }
}
