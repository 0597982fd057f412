/// User-facing notifications, one method per failure/outcome category so the
/// cause partition survives whatever presentation sits behind the trait. The
/// reference client used blocking alerts; a non-blocking rendering is fine as
/// long as the category and detail come through.
pub trait Notifier: Send + Sync {
    /// A recognized product was added to the cart.
    fn item_added(&self, product: &str);

    /// The backend processed the scan but matched no product.
    fn scan_rejected(&self, message: &str);

    /// No usable response from the backend (connectivity or bad status).
    fn backend_unreachable(&self, message: &str);

    /// Any other scan failure.
    fn scan_failed(&self, message: &str);

    /// Capture device denied or unavailable; scanning has been reset.
    fn camera_unavailable(&self, message: &str);

    /// Hand the printable bill view off to the operator.
    fn show_bill(&self, url: &str);
}

/// Prints to the terminal. The BEL on success stands in for the reference
/// client's beep; if the terminal swallows it, cart state is unaffected.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn item_added(&self, product: &str) {
        println!("\x07Added: {product}");
    }

    fn scan_rejected(&self, message: &str) {
        println!("{message}");
    }

    fn backend_unreachable(&self, message: &str) {
        println!("{message}. Check that the backend is running.");
    }

    fn scan_failed(&self, message: &str) {
        println!("Error: {message}");
    }

    fn camera_unavailable(&self, message: &str) {
        println!("{message}");
    }

    fn show_bill(&self, url: &str) {
        println!("Bill ready: {url}");
    }
}

/// Captures notifications for assertions.
pub mod recording {
    use super::Notifier;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Notification {
        ItemAdded(String),
        ScanRejected(String),
        BackendUnreachable(String),
        ScanFailed(String),
        CameraUnavailable(String),
        ShowBill(String),
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<Notification> {
            self.events.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn item_added(&self, product: &str) {
            self.events
                .lock()
                .push(Notification::ItemAdded(product.to_string()));
        }

        fn scan_rejected(&self, message: &str) {
            self.events
                .lock()
                .push(Notification::ScanRejected(message.to_string()));
        }

        fn backend_unreachable(&self, message: &str) {
            self.events
                .lock()
                .push(Notification::BackendUnreachable(message.to_string()));
        }

        fn scan_failed(&self, message: &str) {
            self.events
                .lock()
                .push(Notification::ScanFailed(message.to_string()));
        }

        fn camera_unavailable(&self, message: &str) {
            self.events
                .lock()
                .push(Notification::CameraUnavailable(message.to_string()));
        }

        fn show_bill(&self, url: &str) {
            self.events
                .lock()
                .push(Notification::ShowBill(url.to_string()));
        }
    }
}
