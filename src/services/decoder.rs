use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::domain::scan::ScanEvent;

#[derive(Debug, Error)]
pub enum DecoderError {
    /// Capture device access was denied or unavailable. Fatal to the
    /// scanning session; the session resets to not-scanning.
    #[error("Failed to start camera. Please ensure you gave permission ({0})")]
    PermissionDenied(String),

    #[error("decoder failed to start: {0}")]
    StartFailed(String),
}

/// A source of decode events. Implementations own their capture loop and
/// swallow per-frame decode failures - those are transient and never
/// surfaced. Stopping must be idempotent and must not fail when nothing is
/// running.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Begin emitting events into `sink`. Returns once emission is underway.
    async fn start(&self, sink: mpsc::Sender<ScanEvent>) -> Result<(), DecoderError>;

    /// Stop emitting and release the capture resources.
    async fn stop(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Drives a decoder through an explicit lifecycle. Exactly one instance may
/// be live at a time: starting while a previous start is underway or running
/// first drives a full stop, so two live instances can never deliver
/// duplicate events.
pub struct DecoderController {
    decoder: Arc<dyn FrameDecoder>,
    phase: Mutex<DecoderPhase>,
}

impl DecoderController {
    pub fn new(decoder: Arc<dyn FrameDecoder>) -> Self {
        Self {
            decoder,
            phase: Mutex::new(DecoderPhase::Idle),
        }
    }

    pub fn phase(&self) -> DecoderPhase {
        *self.phase.lock()
    }

    pub async fn start(&self, sink: mpsc::Sender<ScanEvent>) -> Result<(), DecoderError> {
        if self.phase() != DecoderPhase::Idle {
            debug!("previous decoder instance still live, stopping it first");
            self.stop().await;
        }

        *self.phase.lock() = DecoderPhase::Starting;
        match self.decoder.start(sink).await {
            Ok(()) => {
                *self.phase.lock() = DecoderPhase::Running;
                debug!("decoder running");
                Ok(())
            }
            Err(e) => {
                *self.phase.lock() = DecoderPhase::Idle;
                Err(e)
            }
        }
    }

    /// Idempotent: stopping from Idle is a no-op on the decoder's resources.
    /// On teardown this runs unconditionally, even mid-start.
    pub async fn stop(&self) {
        *self.phase.lock() = DecoderPhase::Stopping;
        self.decoder.stop().await;
        *self.phase.lock() = DecoderPhase::Idle;
    }
}

/// Line-oriented decoder over stdin. Covers both production strategies: a
/// keyboard-wedge barcode scanner types payloads terminated by Enter
/// (continuous mode), and prompted mode writes a prompt before each read for
/// a human operator. One component, parameterized - not two variants.
pub struct LineDecoder {
    prompt: Option<&'static str>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LineDecoder {
    pub fn keyboard() -> Self {
        Self {
            prompt: None,
            task: Mutex::new(None),
        }
    }

    pub fn prompted() -> Self {
        Self {
            prompt: Some("Scan> "),
            task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl FrameDecoder for LineDecoder {
    async fn start(&self, sink: mpsc::Sender<ScanEvent>) -> Result<(), DecoderError> {
        let prompt = self.prompt;
        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                if let Some(text) = prompt {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let payload = line.trim();
                        if payload.is_empty() {
                            continue;
                        }
                        if sink.send(ScanEvent::new(payload)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        // Transient read failure; treat like a frame that
                        // failed to decode.
                        trace!("input read error ignored: {e}");
                    }
                }
            }
        });

        *self.task.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            debug!("line decoder stopped");
        }
    }
}

/// Test decoder that replays a fixed list of payloads and records every
/// lifecycle call.
pub mod scripted {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Start,
        Stop,
    }

    pub struct ScriptedDecoder {
        payloads: Mutex<Vec<String>>,
        deny: bool,
        calls: Mutex<Vec<Call>>,
        task: Mutex<Option<JoinHandle<()>>>,
    }

    impl ScriptedDecoder {
        pub fn new(payloads: &[&str]) -> Self {
            Self {
                payloads: Mutex::new(payloads.iter().map(|p| p.to_string()).collect()),
                deny: false,
                calls: Mutex::new(Vec::new()),
                task: Mutex::new(None),
            }
        }

        /// A decoder whose capture device always refuses to start.
        pub fn denied() -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                deny: true,
                calls: Mutex::new(Vec::new()),
                task: Mutex::new(None),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl FrameDecoder for ScriptedDecoder {
        async fn start(&self, sink: mpsc::Sender<ScanEvent>) -> Result<(), DecoderError> {
            self.calls.lock().push(Call::Start);
            if self.deny {
                return Err(DecoderError::PermissionDenied(
                    "camera access denied".to_string(),
                ));
            }

            let payloads = std::mem::take(&mut *self.payloads.lock());
            let handle = tokio::spawn(async move {
                for payload in payloads {
                    if sink.send(ScanEvent::new(payload)).await.is_err() {
                        warn!("scripted decoder sink closed early");
                        break;
                    }
                }
            });

            *self.task.lock() = Some(handle);
            Ok(())
        }

        async fn stop(&self) {
            self.calls.lock().push(Call::Stop);
            if let Some(handle) = self.task.lock().take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::{Call, ScriptedDecoder};
    use super::*;

    #[tokio::test]
    async fn restart_stops_previous_instance_first() {
        let decoder = Arc::new(ScriptedDecoder::new(&[]));
        let controller = DecoderController::new(decoder.clone());

        let (tx1, _rx1) = mpsc::channel(8);
        controller.start(tx1).await.unwrap();
        assert_eq!(controller.phase(), DecoderPhase::Running);

        let (tx2, _rx2) = mpsc::channel(8);
        controller.start(tx2).await.unwrap();

        assert_eq!(decoder.calls(), vec![Call::Start, Call::Stop, Call::Start]);
        assert_eq!(controller.phase(), DecoderPhase::Running);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let decoder = Arc::new(ScriptedDecoder::new(&[]));
        let controller = DecoderController::new(decoder.clone());

        controller.stop().await;
        controller.stop().await;

        assert_eq!(controller.phase(), DecoderPhase::Idle);
    }

    #[tokio::test]
    async fn denied_start_returns_to_idle() {
        let decoder = Arc::new(ScriptedDecoder::denied());
        let controller = DecoderController::new(decoder);

        let (tx, _rx) = mpsc::channel(8);
        let err = controller.start(tx).await.unwrap_err();

        assert!(matches!(err, DecoderError::PermissionDenied(_)));
        assert_eq!(controller.phase(), DecoderPhase::Idle);
    }

    #[tokio::test]
    async fn scripted_decoder_emits_all_payloads() {
        let decoder = ScriptedDecoder::new(&["123", "456"]);
        let (tx, mut rx) = mpsc::channel(8);

        decoder.start(tx).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().payload, "123");
        assert_eq!(rx.recv().await.unwrap().payload, "456");
        assert!(rx.recv().await.is_none());
    }
}
