use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::backend::{BackendApi, BackendError};
use crate::domain::cart::CartSnapshot;
use crate::domain::recommendation::Recommendation;

struct AppliedCart {
    seq: u64,
    snapshot: CartSnapshot,
}

/// The rendered state: cart snapshot plus recommendation list, each replaced
/// wholesale by full backend reads. The backend is the single source of
/// truth; nothing is merged or patched client-side.
///
/// Concurrent scans can leave two cart refetches in flight, and responses
/// may resolve out of issue order. Each refetch is tagged with a sequence
/// number at issue time; a response older than the newest one already
/// applied is discarded, so the view can never go backwards.
pub struct ViewState {
    backend: Arc<dyn BackendApi>,
    cart: RwLock<AppliedCart>,
    recommendations: RwLock<Vec<Recommendation>>,
    issued: AtomicU64,
    changed: watch::Sender<u64>,
}

impl ViewState {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            cart: RwLock::new(AppliedCart {
                seq: 0,
                snapshot: CartSnapshot::default(),
            }),
            recommendations: RwLock::new(Vec::new()),
            issued: AtomicU64::new(0),
            changed: watch::channel(0).0,
        }
    }

    /// Receiver that ticks every time a new cart snapshot is applied.
    pub fn watch_changes(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    pub async fn cart(&self) -> CartSnapshot {
        self.cart.read().await.snapshot.clone()
    }

    pub async fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations.read().await.clone()
    }

    /// Full cart read, wholesale replace. Invoked on session start and after
    /// every successful scan.
    pub async fn refresh_cart(&self) -> Result<(), BackendError> {
        // Sequence is taken at issue time, before the request goes out.
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.backend.fetch_cart().await?;

        let mut cart = self.cart.write().await;
        if seq < cart.seq {
            debug!(seq, applied = cart.seq, "discarding stale cart response");
            return Ok(());
        }

        cart.seq = seq;
        debug!(seq, fetched_at = %snapshot.fetched_at, "applying cart snapshot");
        cart.snapshot = snapshot;
        let _ = self.changed.send(seq);
        Ok(())
    }

    /// Full recommendation read. Fetched once per session load.
    pub async fn refresh_recommendations(&self) -> Result<(), BackendError> {
        let fresh = self.backend.fetch_recommendations().await?;
        *self.recommendations.write().await = fresh;
        Ok(())
    }
}
