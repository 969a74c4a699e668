//! Ordered fallback combinator
//!
//! Evaluates a list of candidate strategies in order and stops at the first
//! success. Adding or removing a tier is a change to the candidate list, not
//! to control flow.
//!
//! ```rust,ignore
//! let outcome = first_success(&tiers, |index, tier| run_tier(index, tier)).await;
//! match outcome {
//!     Ok(success) => success.value,
//!     Err(exhausted) => default,
//! }
//! ```

use std::fmt;
use std::future::Future;

/// A failed attempt at one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure<E> {
    /// Zero-based position of the tier in the candidate list
    pub index: usize,
    /// Error reported by the tier
    pub error: E,
}

/// Result of a successful fallback evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSuccess<T, E> {
    /// Value produced by the winning tier
    pub value: T,
    /// Zero-based position of the winning tier
    pub tier: usize,
    /// Failures of the tiers tried before the winner
    pub failures: Vec<TierFailure<E>>,
}

/// Every tier failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackExhausted<E> {
    /// One failure per tier, in evaluation order
    pub failures: Vec<TierFailure<E>>,
}

impl<E> FallbackExhausted<E> {
    /// Error from the last tier tried, if any tier existed
    pub fn last_error(&self) -> Option<&E> {
        self.failures.last().map(|failure| &failure.error)
    }
}

impl<E: fmt::Display> fmt::Display for FallbackExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_error() {
            Some(last) => {
                write!(f, "all {} fallback tiers failed (last: {last})", self.failures.len())
            }
            None => write!(f, "no fallback tiers configured"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FallbackExhausted<E> {}

/// Try each candidate in order until one succeeds.
///
/// `attempt` receives the candidate's index and a reference to it. Tiers
/// after the first success are never invoked.
///
/// # Errors
///
/// Returns [`FallbackExhausted`] with every tier's error when all fail, or
/// with no failures when `candidates` is empty.
pub async fn first_success<'a, C, T, E, F, Fut>(
    candidates: &'a [C],
    mut attempt: F,
) -> Result<FallbackSuccess<T, E>, FallbackExhausted<E>>
where
    F: FnMut(usize, &'a C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match attempt(index, candidate).await {
            Ok(value) => return Ok(FallbackSuccess { value, tier: index, failures }),
            Err(error) => failures.push(TierFailure { index, error }),
        }
    }

    Err(FallbackExhausted { failures })
}

#[cfg(test)]
mod tests {
    //! Unit tests for resilience::fallback.
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Validates `first_success` behavior for the primary succeeds scenario.
    ///
    /// Assertions:
    /// - Confirms the first tier wins and later tiers are never called.
    #[tokio::test]
    async fn test_first_tier_wins() {
        let calls = AtomicUsize::new(0);
        let tiers = [10_u64, 20, 30];

        let outcome = first_success(&tiers, |_, value| {
            calls.fetch_add(1, Ordering::SeqCst);
            let value = *value;
            async move { Ok::<_, String>(value) }
        })
        .await
        .expect("first tier succeeds");

        assert_eq!(outcome.value, 10);
        assert_eq!(outcome.tier, 0);
        assert!(outcome.failures.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Validates `first_success` behavior for the secondary fallback scenario.
    ///
    /// Assertions:
    /// - Confirms the secondary value is returned with the primary's failure.
    #[tokio::test]
    async fn test_falls_through_to_secondary() {
        let tiers = ["missing", "present"];

        let outcome = first_success(&tiers, |index, name| {
            let name = *name;
            async move {
                if index == 0 {
                    Err(format!("{name} collection absent"))
                } else {
                    Ok(42_u64)
                }
            }
        })
        .await
        .expect("secondary succeeds");

        assert_eq!(outcome.value, 42);
        assert_eq!(outcome.tier, 1);
        assert_eq!(
            outcome.failures,
            vec![TierFailure { index: 0, error: "missing collection absent".to_string() }]
        );
    }

    /// Validates `first_success` behavior for the exhausted scenario.
    ///
    /// Assertions:
    /// - Confirms every failure is reported in order.
    /// - Confirms the display string names the last error.
    #[tokio::test]
    async fn test_all_tiers_fail() {
        let tiers = [1, 2];

        let exhausted = first_success(&tiers, |index, _| async move {
            Err::<u64, _>(format!("tier {index} down"))
        })
        .await
        .expect_err("all tiers fail");

        assert_eq!(exhausted.failures.len(), 2);
        assert_eq!(exhausted.last_error().map(String::as_str), Some("tier 1 down"));
        assert_eq!(exhausted.to_string(), "all 2 fallback tiers failed (last: tier 1 down)");
    }

    /// Validates `first_success` behavior for the empty candidate list.
    ///
    /// Assertions:
    /// - Confirms an exhausted outcome with no failures.
    #[tokio::test]
    async fn test_empty_candidates() {
        let tiers: [u8; 0] = [];
        let exhausted =
            first_success(&tiers, |_, _| async { Ok::<u64, String>(1) }).await.expect_err("empty");
        assert!(exhausted.failures.is_empty());
        assert_eq!(exhausted.to_string(), "no fallback tiers configured");
    }
}
