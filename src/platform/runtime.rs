use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[cfg(target_arch = "wasm32")]
pub type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + 'static>>;

/// Deadline used when `now + duration` does not fit in an `Instant` (about 30 years).
#[cfg(not(target_arch = "wasm32"))]
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Returns a future that resolves once `duration` has elapsed, counted from this call.
///
/// The deadline is fixed here, but the Tokio sleep is only registered on first poll so the
/// future can be created outside a runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn timer(duration: Duration) -> BoxedFuture<()> {
    let now = tokio::time::Instant::now();
    let deadline = now
        .checked_add(duration)
        .unwrap_or_else(|| now + FAR_FUTURE);
    Box::pin(async move {
        tokio::time::sleep_until(deadline).await;
    })
}

/// Returns a future that resolves once `duration` has elapsed, counted from this call.
#[cfg(target_arch = "wasm32")]
pub fn timer(duration: Duration) -> BoxedFuture<()> {
    use gloo_timers::future::TimeoutFuture;

    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    Box::pin(TimeoutFuture::new(millis))
}
