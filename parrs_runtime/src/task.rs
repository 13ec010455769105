//! Task futures.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use thiserror::Error;

use crate::LocalityId;

/// A task failure.
///
/// A task whose dependency failed resolves to the error of that dependency without running.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task panicked.
    #[error("task on {locality} panicked: {message}")]
    Panicked {
        /// The locality the task ran on.
        locality: LocalityId,
        /// The panic message.
        message: String,
    },
    /// The task was dropped before it completed.
    #[error("task was dropped before completion")]
    Canceled,
}

impl TaskError {
    pub(crate) fn from_panic(locality: LocalityId, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { locality, message }
    }
}

/// The result of a task.
pub type TaskResult<T> = Result<Arc<T>, TaskError>;

/// A handle to the eventual result of a task.
///
/// A task future can be cloned and awaited by any number of dependents, which all observe the same result.
/// Awaiting inside another task suspends that task; [`wait`](TaskFuture::wait) blocks the calling thread.
pub struct TaskFuture<T> {
    inner: Shared<BoxFuture<'static, TaskResult<T>>>,
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<T: Send + Sync + 'static> TaskFuture<T> {
    /// Create a task future from a future resolving to a task result.
    pub fn new(future: impl Future<Output = TaskResult<T>> + Send + 'static) -> Self {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// Create a task future that is already resolved to `value`.
    #[must_use]
    pub fn ready(value: T) -> Self {
        Self::new(futures::future::ready(Ok(Arc::new(value))))
    }

    /// Create a task future that is already resolved to `error`.
    #[must_use]
    pub fn failed(error: TaskError) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    /// Block the calling thread until the task completes and return its result.
    ///
    /// Must not be called from within a task: use `.await` there.
    ///
    /// # Errors
    /// Returns the [`TaskError`] of the task or of one of its dependencies.
    pub fn wait(&self) -> TaskResult<T> {
        futures::executor::block_on(self.clone())
    }
}

impl<T> TaskFuture<T> {
    /// Returns true if the task has completed.
    ///
    /// Does not block. A completed task is observed even if nothing has awaited it yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.peek().is_some()
    }

    /// Return the result of the task if it has completed, without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<&TaskResult<T>> {
        if self.inner.peek().is_none() {
            // A completed poll stores the output in the state shared by all clones
            let _ = self.inner.clone().now_or_never();
        }
        self.inner.peek()
    }
}

impl<T> Future for TaskFuture<T> {
    type Output = TaskResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

/// Wait for all `futures` within a task, failing with the first error.
///
/// # Errors
/// Returns the [`TaskError`] of the first failed task.
pub async fn try_join_all<T, I>(futures: I) -> Result<Vec<Arc<T>>, TaskError>
where
    I: IntoIterator<Item = TaskFuture<T>>,
{
    futures::future::try_join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_future_ready() {
        let future = TaskFuture::ready(5);
        assert_eq!(*future.wait().unwrap(), 5);
        assert!(future.is_ready());
        let copy = future.clone();
        assert_eq!(*futures::executor::block_on(copy).unwrap(), 5);
    }

    #[test]
    fn task_future_ready_without_wait() {
        assert!(TaskFuture::ready(5).is_ready());
        let future = TaskFuture::<u8>::failed(TaskError::Canceled);
        assert_eq!(future.peek(), Some(&Err(TaskError::Canceled)));
    }

    #[test]
    fn task_future_pending_until_sent() {
        let (sender, receiver) = futures::channel::oneshot::channel::<u8>();
        let future = TaskFuture::new(receiver.map(|value| value.map(Arc::new).map_err(|_| TaskError::Canceled)));
        assert!(!future.is_ready());
        assert!(future.peek().is_none());
        sender.send(3).unwrap();
        assert!(future.is_ready());
        assert_eq!(future.peek().cloned().unwrap().map(|v| *v), Ok(3));
    }

    #[test]
    fn task_future_failed() {
        let future = TaskFuture::<u8>::failed(TaskError::Canceled);
        assert_eq!(future.wait().unwrap_err(), TaskError::Canceled);
    }

    #[test]
    fn task_future_chain_propagates() {
        let failed = TaskFuture::<u8>::failed(TaskError::Canceled);
        let dependent = TaskFuture::new(async move {
            let value = failed.await?;
            Ok(Arc::new(*value + 1))
        });
        assert_eq!(dependent.wait().unwrap_err(), TaskError::Canceled);
    }

    #[test]
    fn task_error_from_panic() {
        let locality = LocalityId::new(2);
        let error = TaskError::from_panic(locality, &"boom");
        assert_eq!(error.to_string(), "task on locality 2 panicked: boom");
        let error = TaskError::from_panic(locality, &String::from("bang"));
        assert!(matches!(error, TaskError::Panicked { message, .. } if message == "bang"));
    }

    #[test]
    fn try_join_all_tasks() {
        let futures = vec![TaskFuture::ready(1), TaskFuture::ready(2)];
        let values = futures::executor::block_on(try_join_all(futures)).unwrap();
        assert_eq!(values.iter().map(|v| **v).collect::<Vec<_>>(), vec![1, 2]);
    }
}
