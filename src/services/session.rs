use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::BackendApi;
use crate::config::AppConfig;
use crate::domain::scan::ScanEvent;
use crate::services::debounce::ScanDebouncer;
use crate::services::decoder::{DecoderController, FrameDecoder};
use crate::services::notify::Notifier;
use crate::services::reconciler::CartReconciler;
use crate::services::view_state::ViewState;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// One checkout session: owns the debouncer exclusively, drives the decoder
/// lifecycle, and fans accepted scans out to the reconciler without blocking
/// further decode delivery.
///
/// Operator commands share the decode event stream: the exact payloads
/// `:bill`, `:stop` and `:quit` are intercepted before the debouncer and can
/// therefore never be scanned as barcodes. Anything else, colon-prefixed or
/// not, is a barcode payload. A barcode that must collide with one of those
/// three strings needs a dedicated control channel instead.
pub struct ScanSession {
    id: Uuid,
    debouncer: ScanDebouncer,
    controller: DecoderController,
    reconciler: Arc<CartReconciler>,
    view: Arc<ViewState>,
    notifier: Arc<dyn Notifier>,
    bill_url: String,
    events: Option<mpsc::Receiver<ScanEvent>>,
}

impl ScanSession {
    pub fn new(
        config: &AppConfig,
        decoder: Arc<dyn FrameDecoder>,
        backend: Arc<dyn BackendApi>,
        view: Arc<ViewState>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let bill_url = backend.bill_url();
        Self {
            id: Uuid::new_v4(),
            debouncer: ScanDebouncer::new(config.debounce_window()),
            controller: DecoderController::new(decoder),
            reconciler: Arc::new(CartReconciler::new(backend, view.clone(), notifier.clone())),
            view,
            notifier,
            bill_url,
            events: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start (or restart) the decoder. A still-live previous instance is
    /// stopped first, so events are never delivered twice. Returns false
    /// when the capture device refuses to start; scanning state is then back
    /// at not-scanning.
    pub async fn start_scanning(&mut self) -> bool {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        match self.controller.start(tx).await {
            Ok(()) => {
                info!(session = %self.id, "scanning started");
                self.events = Some(rx);
                true
            }
            Err(e) => {
                warn!(session = %self.id, "scanning could not start: {e}");
                self.notifier.camera_unavailable(&e.to_string());
                self.events = None;
                false
            }
        }
    }

    pub async fn stop_scanning(&mut self) {
        self.controller.stop().await;
        self.events = None;
    }

    /// Consume decode events until the decoder closes its side or the
    /// operator stops the session. Reconciliation runs on spawned tasks so a
    /// slow backend round trip never holds up the next decode.
    pub async fn run(&mut self) {
        let Some(mut events) = self.events.take() else {
            debug!(session = %self.id, "run called without an active decoder");
            return;
        };

        let mut in_flight = JoinSet::new();

        while let Some(event) = events.recv().await {
            if event.payload == ":bill" {
                self.generate_bill().await;
                continue;
            }
            if event.payload == ":stop" || event.payload == ":quit" {
                break;
            }
            if !self.debouncer.accept(&event.payload, event.at) {
                continue;
            }
            let reconciler = self.reconciler.clone();
            in_flight.spawn(async move {
                reconciler.on_scan(&event.payload).await;
            });
        }

        // Drain outstanding reconciliations, then release the decoder.
        while in_flight.join_next().await.is_some() {}
        self.stop_scanning().await;
        info!(session = %self.id, "scanning session ended");
    }

    /// Fire-and-forget hand-off of the printable bill. Matching the
    /// reference client, an empty cart has nothing to bill.
    pub async fn generate_bill(&self) {
        if self.view.cart().await.is_empty() {
            info!(session = %self.id, "bill requested with an empty cart, ignoring");
            return;
        }
        self.notifier.show_bill(&self.bill_url);
    }
}
