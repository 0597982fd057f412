use std::time::Instant;

/// One successful decode of a barcode payload. Ephemeral: consumed by the
/// debouncer as soon as it arrives, never stored.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub payload: String,
    pub at: Instant,
}

impl ScanEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            at: Instant::now(),
        }
    }
}
