use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs `operation` until it succeeds, at most `retries + 1` times, sleeping `delay_ms`
/// between attempts. The last error is returned when every attempt fails.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(Into::<Error>::into) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(attempt, retries, error = %err, "Request failed, retrying");
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Fetches `url` and decodes the JSON body, retrying transport and HTTP status failures.
pub async fn fetch_json<T>(client: &reqwest::Client, url: &str, retries: usize) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
{
    use anyhow::Context;

    debug!("Requesting {}", url);
    let response = with_retry(
        || async {
            client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
        },
        retries,
        500,
    )
    .await
    .with_context(|| format!("Failed to fetch {url}"))?;

    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse response from {url}"))
}
