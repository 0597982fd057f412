use std::time::{Duration, Instant};
use tracing::trace;

/// Suppresses repeated decodes of the barcode currently in front of the
/// scanner. A held barcode decodes many times per second; without this every
/// frame would hit the backend and add a duplicate cart line.
///
/// The check compares only against the immediately previous accepted payload,
/// not a rolling set: scanning A, then B, then A again inside the window is
/// three accepted scans. That is deliberate - alternating items quickly is a
/// legitimate checkout pattern.
#[derive(Debug)]
pub struct ScanDebouncer {
    window: Duration,
    last_payload: Option<String>,
    last_accepted: Option<Instant>,
}

impl ScanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_payload: None,
            last_accepted: None,
        }
    }

    /// Returns false iff `payload` equals the previous accepted payload and
    /// `now` falls inside the debounce window. Rejection leaves the state
    /// untouched; acceptance records `(payload, now)`.
    pub fn accept(&mut self, payload: &str, now: Instant) -> bool {
        if let (Some(last), Some(at)) = (self.last_payload.as_deref(), self.last_accepted) {
            if last == payload && now.duration_since(at) < self.window {
                trace!(payload, "duplicate decode suppressed");
                return false;
            }
        }

        self.last_payload = Some(payload.to_string());
        self.last_accepted = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn debouncer() -> ScanDebouncer {
        ScanDebouncer::new(Duration::from_millis(2000))
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(1999, false)]
    #[case(2000, true)]
    #[case(2500, true)]
    fn same_payload_suppressed_inside_window(#[case] delta_ms: u64, #[case] expected: bool) {
        let mut debouncer = debouncer();
        let t0 = Instant::now();

        assert!(debouncer.accept("8901234567890", t0));
        assert_eq!(
            debouncer.accept("8901234567890", t0 + Duration::from_millis(delta_ms)),
            expected
        );
    }

    #[test]
    fn alternating_payloads_all_accepted() {
        let mut debouncer = debouncer();
        let t0 = Instant::now();

        assert!(debouncer.accept("A", t0));
        assert!(debouncer.accept("B", t0 + Duration::from_millis(1)));
        assert!(debouncer.accept("A", t0 + Duration::from_millis(2)));
    }

    #[test]
    fn rejection_does_not_extend_the_window() {
        let mut debouncer = debouncer();
        let t0 = Instant::now();

        assert!(debouncer.accept("A", t0));
        // Rejected at t0+1500; must not refresh the timestamp.
        assert!(!debouncer.accept("A", t0 + Duration::from_millis(1500)));
        // 2000ms after the original accept, the payload is fresh again.
        assert!(debouncer.accept("A", t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn window_is_configurable() {
        let mut debouncer = ScanDebouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();

        assert!(debouncer.accept("A", t0));
        assert!(debouncer.accept("A", t0 + Duration::from_millis(500)));
    }
}
