use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs a fallible HTTP request up to `attempts` times, sleeping
/// `delay_ms` between tries. Returns the first success or the last error.
pub async fn with_retry<F, Fut, T>(mut request: F, attempts: usize, delay_ms: u64) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!("Request attempt {attempt}/{attempts} failed: {err}");
                last_err = Some(Error::from(err));
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request was never attempted")))
}
