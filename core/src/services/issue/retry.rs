//! Bounded retry for code-uniqueness collisions.
//!
//! Uniqueness of short and long codes is enforced only by the store's
//! unique indexes; when an insert loses that race the engine regenerates
//! both codes and tries again, a bounded number of times.

use std::future::Future;

/// What one insert attempt produced
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    /// Attempt succeeded
    Done(T),
    /// A code-uniqueness index fired; regenerate and retry
    Collision,
    /// The request-UUID index fired; never retried
    Conflict,
    /// Unrecoverable failure; never retried
    Fatal(E),
}

/// Why the retry loop gave up
#[derive(Debug)]
pub enum RetryFailure<E> {
    /// Every attempt collided
    RetriesExhausted,
    /// An attempt reported a request-UUID conflict
    Conflict,
    /// An attempt failed fatally
    Fatal(E),
}

/// Run `attempt` until it succeeds or the collision budget is spent
///
/// `attempt` receives the zero-based attempt number. `max_attempts` counts
/// total attempts, so a retry count of 3 means four inserts at most.
pub async fn retry_collisions<T, E, F, Fut>(
    max_attempts: u32,
    mut attempt: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T, E>>,
{
    for n in 0..max_attempts.max(1) {
        match attempt(n).await {
            AttemptOutcome::Done(value) => return Ok(value),
            AttemptOutcome::Collision => continue,
            AttemptOutcome::Conflict => return Err(RetryFailure::Conflict),
            AttemptOutcome::Fatal(err) => return Err(RetryFailure::Fatal(err)),
        }
    }
    Err(RetryFailure::RetriesExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_attempt_success() {
        let result: Result<u32, RetryFailure<()>> =
            retry_collisions(4, |n| async move { AttemptOutcome::Done(n) }).await;
        assert!(matches!(result, Ok(0)));
    }

    #[tokio::test]
    async fn test_retries_after_collisions() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RetryFailure<()>> = retry_collisions(4, |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    AttemptOutcome::Collision
                } else {
                    AttemptOutcome::Done(n)
                }
            }
        })
        .await;
        assert!(matches!(result, Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure<()>> = retry_collisions(3, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { AttemptOutcome::Collision }
        })
        .await;
        assert!(matches!(result, Err(RetryFailure::RetriesExhausted)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_conflict_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure<()>> = retry_collisions(5, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { AttemptOutcome::Conflict }
        })
        .await;
        assert!(matches!(result, Err(RetryFailure::Conflict)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fatal_stops_immediately() {
        let result: Result<(), RetryFailure<&str>> =
            retry_collisions(5, |_| async { AttemptOutcome::Fatal("disk full") }).await;
        match result {
            Err(RetryFailure::Fatal(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
