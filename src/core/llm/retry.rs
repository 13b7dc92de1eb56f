use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Rate limits, transient unavailability, and timeouts are worth retrying;
/// everything else (bad request, auth failure) fails immediately.
fn is_retryable(err: &anyhow::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("429")
        || msg.contains("503")
        || msg.contains("rate limit")
        || msg.contains("timed out")
        || msg.contains("timeout")
        || msg.contains("unavailable")
        || msg.contains("overloaded")
}

/// Run `f` up to `MAX_RETRIES + 1` times with exponential backoff and jitter.
pub(crate) async fn with_retry<T, F, Fut>(mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= MAX_RETRIES || !is_retryable(&err) {
                    return Err(err);
                }
                let backoff = INITIAL_DELAY * 2u32.pow(attempt);
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));
                warn!(
                    "LLM call failed, retrying ({}/{}) after {:?}: {}",
                    attempt + 1,
                    MAX_RETRIES,
                    backoff + jitter,
                    err
                );
                tokio::time::sleep(backoff + jitter).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(anyhow::anyhow!("API error 429: rate limit"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("API error 401: invalid api key")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("service unavailable")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[test]
    fn timeout_counts_as_retryable() {
        assert!(is_retryable(&anyhow::anyhow!(
            "openai call timed out after 60s"
        )));
        assert!(!is_retryable(&anyhow::anyhow!("model not found")));
    }
}
