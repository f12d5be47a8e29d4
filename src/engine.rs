use crate::error::{ComicDlError, Result};
use std::future::Future;
use std::sync::mpsc;
use std::thread;

/// Isolation layer for crawl jobs. The fetch engine assumes it owns its
/// event loop for the whole of one run, so every job gets a dedicated
/// worker thread with a single-use, current-thread runtime that is torn
/// down when the job finishes. The caller blocks until the result comes
/// back over the channel; a worker that dies before delivering one is an
/// engine failure, distinct from any traversal outcome.
pub struct EngineRunner;

impl EngineRunner {
    pub fn run<T, F, Fut>(job: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>>,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("crawl-engine".to_string())
            .spawn(move || {
                let result = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(job()),
                    Err(e) => Err(ComicDlError::engine(format!(
                        "failed to start crawl runtime: {e}"
                    ))),
                };
                // The parent may have stopped listening; nothing to do then.
                let _ = tx.send(result);
            })
            .map_err(|e| ComicDlError::engine(format!("failed to spawn crawl worker: {e}")))?;

        let result = rx.recv().map_err(|_| {
            ComicDlError::engine("crawl worker terminated before delivering a result")
        });
        let _ = handle.join();
        result?
    }
}
