//! Nonce generation
//!
//! The exchange rejects any private request whose nonce is not strictly
//! greater than the last one it accepted for the same API key. Sources here
//! never hand out a value less than or equal to one they already produced.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A request nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce(u64);

impl Nonce {
    /// Wrap a raw value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Produces strictly increasing nonces
///
/// Implementations must be safe to call from concurrent tasks and must never
/// return a value less than or equal to any value they returned before.
pub trait NonceSource: Send + Sync {
    /// Next nonce
    fn next_nonce(&self) -> Nonce;
}

/// Wall-clock nonce with microsecond resolution
///
/// Two calls inside the same microsecond (or a clock step backwards) still
/// get distinct, increasing values: the source bumps past the last value it
/// issued instead of reusing the clock reading.
#[derive(Debug, Default)]
pub struct TimestampNonce {
    last: AtomicU64,
}

impl TimestampNonce {
    /// Create a new source
    pub fn new() -> Self {
        Self::default()
    }

    fn now_micros() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default()
    }
}

impl NonceSource for TimestampNonce {
    fn next_nonce(&self) -> Nonce {
        let now = Self::now_micros();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(current.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Nonce(next),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Deterministic counter, for tests and replayable sessions
#[derive(Debug)]
pub struct CounterNonce {
    next: AtomicU64,
}

impl CounterNonce {
    /// Start counting at `start`
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl NonceSource for CounterNonce {
    fn next_nonce(&self) -> Nonce {
        Nonce(self.next.fetch_add(1, Ordering::AcqRel))
    }
}

impl<F> NonceSource for F
where
    F: Fn() -> Nonce + Send + Sync,
{
    fn next_nonce(&self) -> Nonce {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_nonce_is_numeric() {
        let nonce = TimestampNonce::new().next_nonce().to_string();
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
        assert!(nonce.len() >= 16);
    }

    #[test]
    fn test_same_tick_still_increases() {
        let source = TimestampNonce::new();
        let a = source.next_nonce();
        let b = source.next_nonce();
        let c = source.next_nonce();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_concurrent_issuance_is_unique() {
        let source = Arc::new(TimestampNonce::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                thread::spawn(move || (0..500).map(|_| source.next_nonce()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<Nonce> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_counter_nonce() {
        let source = CounterNonce::starting_at(1);
        assert_eq!(source.next_nonce(), Nonce::new(1));
        assert_eq!(source.next_nonce(), Nonce::new(2));
    }

    #[test]
    fn test_closure_source() {
        let fixed = || Nonce::new(7);
        assert_eq!(fixed.next_nonce().value(), 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_timestamp_nonce_strictly_increasing(
            jitter in proptest::collection::vec(0u64..200, 1..64)
        ) {
            let source = TimestampNonce::new();
            let mut previous = source.next_nonce();
            for micros in jitter {
                if micros > 150 {
                    thread::sleep(Duration::from_micros(micros));
                }
                let next = source.next_nonce();
                prop_assert!(next > previous, "{} !> {}", next, previous);
                previous = next;
            }
        }

        #[test]
        fn prop_counter_nonce_strictly_increasing(start in 0u64..u64::MAX / 2, n in 1usize..200) {
            let source = CounterNonce::starting_at(start);
            let values: Vec<_> = (0..n).map(|_| source.next_nonce()).collect();
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
