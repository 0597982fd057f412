pub mod debounce;
pub mod decoder;
pub mod notify;
pub mod reconciler;
pub mod session;
pub mod view_state;

pub use debounce::ScanDebouncer;
pub use decoder::{DecoderController, DecoderError, DecoderPhase, FrameDecoder, LineDecoder};
pub use notify::{Notifier, TerminalNotifier};
pub use reconciler::CartReconciler;
pub use session::ScanSession;
pub use view_state::ViewState;
