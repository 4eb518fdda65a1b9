use std::sync::Arc;

use tokio::sync::mpsc;

use crate::features::scans::models::GeoTarget;
use crate::features::scans::services::EnrichmentService;

/// Sending half handed to the sync service. Cheap to clone.
#[derive(Clone)]
pub struct EnrichmentQueue {
    sender: mpsc::UnboundedSender<Vec<GeoTarget>>,
    service: Arc<EnrichmentService>,
}

impl EnrichmentQueue {
    /// Queue one sync batch worth of targets. Never blocks.
    pub fn enqueue(&self, targets: Vec<GeoTarget>) {
        if let Err(mpsc::error::SendError(targets)) = self.sender.send(targets) {
            // Worker has stopped; run the batch on its own task instead of dropping it
            tracing::warn!(
                "Enrichment worker unavailable, spawning detached task for {} scans",
                targets.len()
            );
            let service = Arc::clone(&self.service);
            tokio::spawn(async move {
                service.enrich(&targets).await;
            });
        }
    }
}

/// Background worker that geocodes queued batches in arrival order
pub struct EnrichmentWorker {
    receiver: mpsc::UnboundedReceiver<Vec<GeoTarget>>,
    service: Arc<EnrichmentService>,
}

impl EnrichmentWorker {
    pub fn channel(service: Arc<EnrichmentService>) -> (EnrichmentQueue, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = EnrichmentQueue {
            sender,
            service: Arc::clone(&service),
        };
        (queue, Self { receiver, service })
    }

    /// Process batches until every queue handle has been dropped and the
    /// channel is drained.
    pub async fn run(mut self) {
        tracing::info!("Starting enrichment worker");

        while let Some(targets) = self.receiver.recv().await {
            let summary = self.service.enrich(&targets).await;
            tracing::info!(
                total = targets.len(),
                resolved = summary.resolved,
                unresolved = summary.unresolved,
                update_failed = summary.update_failed,
                "Enrichment batch processed"
            );
        }

        tracing::info!("Enrichment worker stopped, queue drained");
    }
}
