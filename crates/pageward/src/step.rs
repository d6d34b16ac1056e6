//! Named test steps.
//!
//! Page-object operations run inside a step so logs read as a sequence of
//! user-level actions ("Open Text Box Page", "Fill Text Box Form") with
//! timing and the failing step clearly marked.

use crate::result::PagewardResult;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

/// Run `fut` as the step `name`
pub async fn step<T, F>(name: &str, fut: F) -> PagewardResult<T>
where
    F: Future<Output = PagewardResult<T>>,
{
    let span = tracing::info_span!("step", name = %name);
    async move {
        let start = Instant::now();
        tracing::debug!("step started");
        let result = fut.await;
        let elapsed_ms = start.elapsed().as_millis();
        match &result {
            Ok(_) => tracing::info!(elapsed_ms, "step passed"),
            Err(err) => tracing::warn!(elapsed_ms, error = %err, "step failed"),
        }
        result
    }
    .instrument(span)
    .await
}
