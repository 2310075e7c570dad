use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    error::Error,
    executor::SubmissionExecutor,
    types::{RunOutcome, RunRequest},
    Result,
};

/// A submission run executing on its own tokio task
pub struct BackgroundRun {
    handle: JoinHandle<Result<RunOutcome>>,
}

impl BackgroundRun {
    /// Wait for the run; a panicked or aborted task becomes `Error::Background`
    pub async fn join(self) -> Result<RunOutcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Background("run was aborted".to_string())),
            Err(e) => {
                error!("Background run panicked: {}", e);
                Err(Error::Background(e.to_string()))
            }
        }
    }

    /// Best-effort cancellation. The child is killed when its handle drops.
    pub fn abort(&self) {
        debug!("Aborting background run");
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Start `executor.run(request)` on a new task
pub fn spawn_run(executor: Arc<SubmissionExecutor>, request: RunRequest) -> BackgroundRun {
    info!("Starting background run of {}", executor.layout().name());
    let handle = tokio::spawn(async move { executor.run(&request).await });
    BackgroundRun { handle }
}
