//! Exposes blocking, lazily iterated operations as async streams.
//!
//! The operation itself runs on tokio's blocking pool, and so does every
//! pull from the iterator it returns: the iterator is moved into the worker
//! for one `next()` call and moved back with the item. Nothing is pulled
//! before the consumer polls for it, so items arrive in production order
//! and a consumer that stops early never causes further pulls. Dropping the
//! stream while a pull is in flight lets that worker call finish; its
//! result is discarded.
//!
//! An error, whether from starting the operation or from a pull, is yielded
//! at the position it occurred and ends the stream.

use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{GraphStoreError, Result};

/// Blocking iterator handed over to the worker pool
pub type BlockingIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Async sequence produced by the bridge
pub type ResultStream<T> = BoxStream<'static, Result<T>>;

enum State<F, T> {
    Start(F),
    Pulling(BlockingIter<T>),
    Done,
}

/// Run `produce` on a worker and stream the items of the iterator it returns
pub fn stream_blocking<T, F>(produce: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<BlockingIter<T>> + Send + 'static,
{
    stream::unfold(State::Start(produce), |state| async move {
        let iter = match state {
            State::Start(produce) => match tokio::task::spawn_blocking(produce).await {
                Ok(Ok(iter)) => iter,
                Ok(Err(e)) => return Some((Err(e), State::Done)),
                Err(e) => return Some((Err(GraphStoreError::Worker(e)), State::Done)),
            },
            State::Pulling(iter) => iter,
            State::Done => return None,
        };
        pull(iter).await
    })
    .boxed()
}

/// Like [`stream_blocking`] for operations that return all their items at once
pub fn stream_blocking_vec<T, F>(produce: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Vec<T>> + Send + 'static,
{
    stream_blocking(move || {
        let items = produce()?;
        Ok(Box::new(items.into_iter().map(Ok)) as BlockingIter<T>)
    })
}

/// Run a single blocking call on a worker
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

async fn pull<F, T>(mut iter: BlockingIter<T>) -> Option<(Result<T>, State<F, T>)>
where
    T: Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let item = iter.next();
        (iter, item)
    })
    .await;

    match joined {
        Ok((iter, Some(Ok(item)))) => Some((Ok(item), State::Pulling(iter))),
        Ok((_, Some(Err(e)))) => Some((Err(e), State::Done)),
        Ok((_, None)) => None,
        Err(e) => Some((Err(GraphStoreError::Worker(e)), State::Done)),
    }
}
