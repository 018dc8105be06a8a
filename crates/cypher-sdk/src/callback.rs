//! Callback adapters for callers that prefer completion callbacks to awaiting

use std::future::Future;

use tokio::task::JoinHandle;

/// Await `future` and hand its result to `callback`, exactly once
pub async fn with_callback<T, F, C>(future: F, callback: C)
where
    F: Future<Output = T>,
    C: FnOnce(T),
{
    callback(future.await)
}

/// Run `future` on the tokio runtime and deliver its result to `callback`
pub fn spawn_with_callback<T, F, C>(future: F, callback: C) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    tokio::spawn(with_callback(future, callback))
}
