//! Bounded retry with a recovery callback.
//!
//! The per-item control loop needs "try up to N times, run a recovery step
//! between attempts" in one place instead of ad-hoc loops.

use std::future::Future;

use tracing::warn;

use crate::error::{AppError, AttemptError, Result};

/// Run `op` up to `max_attempts` times, invoking `recover` between attempts.
///
/// `op` receives the 1-based attempt number. `recover` runs after every
/// failed attempt except the last; it is for restoring context (reload,
/// re-navigate, pause), not for producing a value. When all attempts fail,
/// the result is [`AttemptError::RetriesExhausted`] carrying the last error.
pub async fn with_recovery<T, Op, OpFut, Rec, RecFut>(
    max_attempts: u32,
    op: Op,
    recover: Rec,
) -> Result<T>
where
    Op: Fn(u32) -> OpFut,
    OpFut: Future<Output = Result<T>>,
    Rec: Fn(u32) -> RecFut,
    RecFut: Future<Output = ()>,
{
    let mut last_error = String::from("no attempt was made");

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("attempt {}/{} failed: {}", attempt, max_attempts, e);
                last_error = e.to_string();
                if attempt < max_attempts {
                    recover(attempt).await;
                }
            }
        }
    }

    Err(AppError::Attempt(AttemptError::RetriesExhausted {
        attempts: max_attempts,
        last_error,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn returns_first_success_without_recovery() {
        let calls = Arc::new(AtomicU32::new(0));
        let recoveries = Arc::new(AtomicU32::new(0));

        let result = with_recovery(
            3,
            |_attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, AppError>(42)
                }
            },
            |_attempt| {
                let recoveries = recoveries.clone();
                async move {
                    recoveries.fetch_add(1, Ordering::SeqCst);
                }
            },
        )
        .await;

        assert_eq!(result.expect("should succeed"), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(recoveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn succeeds_on_a_later_attempt() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_recovery(
            3,
            |attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(AppError::Other("flaky".to_string()))
                    } else {
                        Ok("done")
                    }
                }
            },
            |_attempt| async {},
        )
        .await;

        assert_eq!(result.expect("second attempt should succeed"), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn performs_exactly_max_attempts_then_gives_up() {
        let calls = Arc::new(AtomicU32::new(0));
        let recoveries = Arc::new(AtomicU32::new(0));

        let result = with_recovery(
            3,
            |_attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(AppError::Other("always fails".to_string()))
                }
            },
            |_attempt| {
                let recoveries = recoveries.clone();
                async move {
                    recoveries.fetch_add(1, Ordering::SeqCst);
                }
            },
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // recovery runs between attempts, not after the last one
        assert_eq!(recoveries.load(Ordering::SeqCst), 2);

        let err = result.expect_err("should give up");
        let rendered = err.to_string();
        assert!(rendered.contains("3 attempts"), "got: {}", rendered);
        assert!(rendered.contains("always fails"), "got: {}", rendered);
    }
}
