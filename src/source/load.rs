//! Per-view fetch lifecycle.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::FetchError;

/// Where a view's data is in its lifecycle.
///
/// `Unloaded → Loading → Loaded | Errored`. The only way back is a fresh
/// mount, which starts over.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Unloaded,
    Loading,
    Loaded(T),
    Errored(FetchError),
}

impl<T> Default for Load<T> {
    fn default() -> Self {
        Load::Unloaded
    }
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Load::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Load::Errored(e) => Some(e),
            _ => None,
        }
    }

    /// Settle a loading state with a fetch result.
    pub fn settle(&mut self, result: Result<T, FetchError>) {
        *self = match result {
            Ok(data) => Load::Loaded(data),
            Err(e) => Load::Errored(e),
        };
    }
}

/// A fetch running on the tokio runtime, polled from the UI loop.
///
/// Dropping it discards the result; the request itself is left to finish.
#[derive(Debug)]
pub struct PendingFetch<T> {
    receiver: oneshot::Receiver<Result<T, FetchError>>,
}

impl<T: Send + 'static> PendingFetch<T> {
    /// Spawn the fetch on the given runtime.
    pub fn spawn<F>(runtime: &Handle, fetch: F) -> Self
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        runtime.spawn(async move {
            // Receiver gone means the view was torn down
            let _ = tx.send(fetch.await);
        });
        Self { receiver: rx }
    }

    /// Take the result if the fetch has finished. Non-blocking.
    pub fn poll(&mut self) -> Option<Result<T, FetchError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                Some(Err(FetchError::Network("Fetch task ended without a result".to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_pending_fetch_delivers_result() {
        let fetch = async { Ok::<_, FetchError>(42u32) };
        let mut pending = PendingFetch::spawn(&Handle::current(), fetch);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(pending.poll(), Some(Ok(42)));
    }

    #[tokio::test]
    async fn test_pending_fetch_empty_until_done() {
        let mut pending = PendingFetch::spawn(&Handle::current(), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, FetchError>(())
        });
        assert_eq!(pending.poll(), None);
    }

    #[tokio::test]
    async fn test_panicked_fetch_surfaces_as_error() {
        let mut pending = PendingFetch::spawn(&Handle::current(), async {
            if true {
                panic!("boom");
            }
            Ok::<u32, FetchError>(0)
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(pending.poll(), Some(Err(FetchError::Network(_)))));
    }

    #[test]
    fn test_load_settle() {
        let mut load: Load<Vec<u8>> = Load::Loading;
        assert!(load.is_loading());
        load.settle(Ok(vec![1, 2]));
        assert_eq!(load.loaded(), Some(&vec![1, 2]));

        let mut load: Load<Vec<u8>> = Load::Loading;
        load.settle(Err(FetchError::Parse("bad".to_string())));
        assert_eq!(load.error(), Some(&FetchError::Parse("bad".to_string())));
    }
}
