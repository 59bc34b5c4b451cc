//! The background task that renders artifacts for new records.
//!
//! Handlers enqueue the IDs of freshly created records; the worker
//! renders them one at a time and records the outcome on the record.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, o, warn, Logger};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::certificates::Certificates;
use crate::errors::BackendError;
use crate::render::{Artifacts, RenderError, RenderJob, Renderer};

/// How long a render attempt may take and how many attempts to make.
#[derive(Clone, Copy, Debug)]
pub struct RenderPolicy {
    pub timeout: Duration,
    pub attempts: u8,
}

/// The sending end of the render queue.
#[derive(Clone)]
pub struct RenderQueue {
    sender: mpsc::Sender<Uuid>,
}

impl RenderQueue {
    /// Queues rendering for the given record. Never waits: a full queue
    /// is an error, like a closed one.
    pub fn enqueue(&self, id: Uuid) -> Result<(), BackendError> {
        use mpsc::error::TrySendError;

        self.sender.try_send(id).map_err(|e| match e {
            TrySendError::Full(_) => BackendError::QueueFull,
            TrySendError::Closed(_) => BackendError::QueueClosed,
        })
    }
}

/// Starts the worker. It stops once every [`RenderQueue`] clone has been
/// dropped and the queue has drained.
pub fn spawn(
    logger: Arc<Logger>,
    certificates: Certificates,
    renderer: Arc<dyn Renderer>,
    output_dir: PathBuf,
    policy: RenderPolicy,
    capacity: usize,
) -> (RenderQueue, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<Uuid>(capacity.max(1));

    let handle = tokio::spawn(async move {
        while let Some(id) = receiver.recv().await {
            let logger = logger.new(o!("id" => id.to_string()));

            if let Err(e) = process(&logger, &certificates, &*renderer, &output_dir, policy, id).await {
                error!(logger, "Failed to record render outcome"; "error" => %e);
            }
        }

        debug!(logger, "Render queue closed");
    });

    (RenderQueue { sender }, handle)
}

async fn process(
    logger: &Logger,
    certificates: &Certificates,
    renderer: &dyn Renderer,
    output_dir: &Path,
    policy: RenderPolicy,
    id: Uuid,
) -> Result<(), BackendError> {
    let record = certificates.get(&id).await?;
    let job = RenderJob::new(&record, output_dir);

    debug!(logger, "Rendering artifacts...");

    match render_with_retries(logger, renderer, job, policy).await {
        Ok(Artifacts {
            certificate_path,
            poster_path,
        }) => {
            certificates
                .attach_artifacts(&id, certificate_path, poster_path)
                .await?;
            info!(logger, "Rendered artifacts");
        }
        Err(e) => {
            error!(logger, "Giving up on rendering"; "error" => %e);
            certificates.record_failure(&id, e.to_string()).await?;
        }
    }

    Ok(())
}

async fn render_with_retries(
    logger: &Logger,
    renderer: &dyn Renderer,
    job: RenderJob,
    policy: RenderPolicy,
) -> Result<Artifacts, RenderError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match tokio::time::timeout(policy.timeout, renderer.render(job.clone())).await {
            Ok(Ok(artifacts)) => return Ok(artifacts),
            Ok(Err(e)) => e,
            Err(_) => RenderError::TimedOut(policy.timeout),
        };

        warn!(logger, "Render attempt failed"; "attempt" => attempt, "of" => attempts, "error" => %error);

        if attempt >= attempts {
            return Err(error);
        }

        attempt += 1;
    }
}
