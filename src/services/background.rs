//! Best-effort secondary writes.
//!
//! Some writes only keep denormalized data tidy: linking a profile after
//! registration, pushing recomputed rating stats after a vote. Their failures
//! are logged here and never reach the primary operation's result.

use std::future::Future;

use crate::connectors::ConnectorError;

/// Runs `task` to completion and swallows its error after logging it.
///
/// Returns `Some(value)` on success, `None` when the task failed.
pub async fn best_effort<T, F>(task: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, ConnectorError>>,
{
    match fut.await {
        Ok(value) => {
            tracing::debug!(task, "best-effort task completed");
            Some(value)
        }
        Err(err) => {
            tracing::warn!(task, error = %err, "best-effort task failed, continuing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_passes_value_through() {
        let value = best_effort("noop", async { Ok::<_, ConnectorError>(7) }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let value: Option<()> = best_effort("push_stats", async {
            Err(ConnectorError::ServiceUnavailable("down".into()))
        })
        .await;
        assert!(value.is_none());
    }
}
