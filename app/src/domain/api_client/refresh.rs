//! Single-flight coordination of token refreshes.
//!
//! Every request records the refresh generation before it reads the bearer
//! token. When it sees a 401 it asks for a refresh *of that generation*. The
//! first caller runs the refresh; callers that queued behind it for the same
//! generation reuse the outcome instead of refreshing again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use super::ApiError;

#[derive(Default)]
pub(crate) struct SingleFlightRefresh {
    generation: AtomicU64,
    last_outcome: Mutex<Option<Result<String, ApiError>>>,
}

impl SingleFlightRefresh {
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Refresh unless a refresh newer than `observed` already finished.
    pub(crate) async fn refresh<F, Fut>(&self, observed: u64, run: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ApiError>>,
    {
        let mut last_outcome = self.last_outcome.lock().await;
        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(outcome) = last_outcome.as_ref() {
                return outcome.clone();
            }
        }
        let outcome = run().await;
        *last_outcome = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn stale_generations_reuse_the_previous_outcome() {
        let refresh = SingleFlightRefresh::default();
        let runs = AtomicUsize::new(0);
        let observed = refresh.generation();

        let first = refresh
            .refresh(observed, || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok("token-1".to_owned())
            })
            .await;
        let second = refresh
            .refresh(observed, || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok("token-2".to_owned())
            })
            .await;

        assert_eq!(first, Ok("token-1".to_owned()));
        assert_eq!(second, Ok("token-1".to_owned()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn current_generation_refreshes_again() {
        let refresh = SingleFlightRefresh::default();
        refresh
            .refresh(refresh.generation(), || async { Ok("token-1".to_owned()) })
            .await
            .expect("first refresh");

        let next = refresh
            .refresh(refresh.generation(), || async { Ok("token-2".to_owned()) })
            .await;
        assert_eq!(next, Ok("token-2".to_owned()));
        assert_eq!(refresh.generation(), 2);
    }
}
