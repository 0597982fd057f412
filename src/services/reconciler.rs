use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{BackendApi, BackendError};
use crate::services::notify::Notifier;
use crate::services::view_state::ViewState;

/// Turns an accepted scan into a backend submission and, on success, exactly
/// one cart refetch. Every failure is handled here: surfaced to the operator
/// with its cause category, never retried, never propagated.
pub struct CartReconciler {
    backend: Arc<dyn BackendApi>,
    view: Arc<ViewState>,
    notifier: Arc<dyn Notifier>,
}

impl CartReconciler {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        view: Arc<ViewState>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            view,
            notifier,
        }
    }

    /// Invoked only for payloads the debouncer accepted.
    pub async fn on_scan(&self, payload: &str) {
        info!(barcode = payload, "submitting scan");

        match self.backend.submit_scan(payload).await {
            Ok(product) => {
                self.notifier.item_added(&product);
                if let Err(e) = self.view.refresh_cart().await {
                    // The item is in the cart server-side; the next refetch
                    // will pick it up.
                    warn!("cart refresh after scan failed: {e}");
                }
            }
            Err(BackendError::Rejected { message }) => {
                info!(barcode = payload, "backend rejected scan: {message}");
                self.notifier.scan_rejected(&message);
            }
            Err(e) if e.is_transport() => {
                warn!(barcode = payload, "scan did not reach backend: {e}");
                self.notifier.backend_unreachable(&e.to_string());
            }
            Err(e) => {
                warn!(barcode = payload, "scan failed: {e}");
                self.notifier.scan_failed(&e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackendApi;
    use crate::domain::cart::{CartItem, CartSnapshot};
    use crate::services::notify::recording::{Notification, RecordingNotifier};

    fn milk_snapshot() -> CartSnapshot {
        CartSnapshot {
            products: vec![CartItem {
                name: "Milk".to_string(),
                quantity: 2,
                price: 2.5,
            }],
            total_price: 5.0,
            ..CartSnapshot::default()
        }
    }

    fn reconciler(
        backend: MockBackendApi,
    ) -> (CartReconciler, Arc<ViewState>, Arc<RecordingNotifier>) {
        let backend: Arc<dyn BackendApi> = Arc::new(backend);
        let view = Arc::new(ViewState::new(backend.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        (
            CartReconciler::new(backend, view.clone(), notifier.clone()),
            view,
            notifier,
        )
    }

    #[tokio::test]
    async fn successful_scan_refetches_cart_once() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_submit_scan()
            .withf(|barcode| barcode == "8901234567890")
            .times(1)
            .returning(|_| Ok("Milk".to_string()));
        backend
            .expect_fetch_cart()
            .times(1)
            .returning(|| Ok(milk_snapshot()));

        let (reconciler, view, notifier) = reconciler(backend);
        reconciler.on_scan("8901234567890").await;

        let cart = view.cart().await;
        assert_eq!(cart.products, milk_snapshot().products);
        assert_eq!(cart.total_price, 5.0);
        assert_eq!(
            notifier.events(),
            vec![Notification::ItemAdded("Milk".to_string())]
        );
    }

    #[tokio::test]
    async fn concurrent_scans_both_reconcile() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_submit_scan()
            .times(2)
            .returning(|barcode| Ok(barcode.to_string()));
        backend
            .expect_fetch_cart()
            .times(2)
            .returning(|| Ok(milk_snapshot()));

        let (reconciler, _view, notifier) = reconciler(backend);

        // Two different barcodes in rapid succession both pass the debounce
        // filter; nothing serializes their round trips.
        futures::future::join_all([reconciler.on_scan("A"), reconciler.on_scan("B")]).await;

        let added: Vec<_> = notifier
            .events()
            .into_iter()
            .filter(|e| matches!(e, Notification::ItemAdded(_)))
            .collect();
        assert_eq!(added.len(), 2);
    }

    #[tokio::test]
    async fn rejected_scan_never_touches_the_cart() {
        let mut backend = MockBackendApi::new();
        backend.expect_submit_scan().times(1).returning(|_| {
            Err(BackendError::Rejected {
                message: "Unknown barcode".to_string(),
            })
        });
        backend.expect_fetch_cart().times(0);

        let (reconciler, view, notifier) = reconciler(backend);
        reconciler.on_scan("000").await;

        assert!(view.cart().await.is_empty());
        assert_eq!(
            notifier.events(),
            vec![Notification::ScanRejected("Unknown barcode".to_string())]
        );
    }

    #[tokio::test]
    async fn unreachable_backend_gets_a_connectivity_message() {
        let mut backend = MockBackendApi::new();
        backend.expect_submit_scan().times(1).returning(|_| {
            Err(BackendError::Unreachable {
                detail: "connection refused".to_string(),
            })
        });
        backend.expect_fetch_cart().times(0);

        let (reconciler, _view, notifier) = reconciler(backend);
        reconciler.on_scan("123").await;

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Notification::BackendUnreachable(message) => {
                assert!(message.contains("Network error"));
            }
            other => panic!("expected connectivity notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_status_is_surfaced_as_transport_failure() {
        let mut backend = MockBackendApi::new();
        backend.expect_submit_scan().times(1).returning(|_| {
            Err(BackendError::Status {
                code: 500,
                message: "Internal Server Error".to_string(),
            })
        });
        backend.expect_fetch_cart().times(0);

        let (reconciler, _view, notifier) = reconciler(backend);
        reconciler.on_scan("123").await;

        let events = notifier.events();
        match &events[0] {
            Notification::BackendUnreachable(message) => {
                assert!(message.contains("500"));
            }
            other => panic!("expected connectivity notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_refetch_after_success_is_not_fatal() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_submit_scan()
            .times(1)
            .returning(|_| Ok("Milk".to_string()));
        backend.expect_fetch_cart().times(1).returning(|| {
            Err(BackendError::Unreachable {
                detail: "connection reset".to_string(),
            })
        });

        let (reconciler, view, notifier) = reconciler(backend);
        reconciler.on_scan("123").await;

        // Success was still notified; the cart just stays on its last
        // snapshot until the next refetch.
        assert_eq!(
            notifier.events(),
            vec![Notification::ItemAdded("Milk".to_string())]
        );
        assert!(view.cart().await.is_empty());
    }
}
