// ABOUTME: Serialized write queue for the backlog document
// ABOUTME: One worker task runs submitted jobs strictly in submission order

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::StorageError;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Per-process write serializer.
///
/// Job N+1 starts only after job N has finished, regardless of how many
/// callers submit concurrently. Once submitted, a job runs to completion even
/// if the caller stops waiting for it. Clones share the same worker.
#[derive(Clone)]
pub struct WriteQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl WriteQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                job().await;
            }
            debug!("Write queue worker stopped");
        });

        Self { sender }
    }

    /// Run `job` on the queue and wait for its result.
    ///
    /// A panicking job is reported as `StorageError::JobPanicked` and does not
    /// stop the worker.
    pub async fn run<T, E, F, Fut>(&self, job: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (respond, response) = oneshot::channel();

        let task: Job = Box::new(move || {
            async move {
                let outcome = AssertUnwindSafe(async move { job().await })
                    .catch_unwind()
                    .await;
                let result = outcome.unwrap_or_else(|_| {
                    error!("Backlog write job panicked");
                    Err(E::from(StorageError::JobPanicked))
                });
                // The caller may have gone away; the write itself already happened
                let _ = respond.send(result);
            }
            .boxed()
        });

        self.sender
            .send(task)
            .map_err(|_| E::from(StorageError::QueueClosed))?;

        response
            .await
            .map_err(|_| E::from(StorageError::QueueClosed))?
    }
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::new()
    }
}
