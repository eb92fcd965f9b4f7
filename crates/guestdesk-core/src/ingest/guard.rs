use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::{ExtractionError, ExtractionResult, Stage};
use crate::providers::ProviderResult;

/// Bounds every provider call of one extraction run with a timeout and a
/// shared cancellation token.
#[derive(Debug, Clone)]
pub struct CallGuard {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallGuard {
    #[must_use]
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run<T, F>(&self, stage: Stage, call: F) -> ExtractionResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled { stage });
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ExtractionError::Cancelled { stage }),
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Ok(result) => result.map_err(|e| ExtractionError::from_provider(stage, e)),
                Err(_) => Err(ExtractionError::TimedOut { stage, after: self.timeout }),
            },
        }
    }
}
