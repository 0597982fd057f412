use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use smartcart::backend::{BackendApi, HttpBackend};
use smartcart::config::{AppConfig, DecoderKind};
use smartcart::services::{FrameDecoder, LineDecoder, ScanSession, TerminalNotifier, ViewState};
use smartcart::ui::{render_cart, render_recommendations};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let backend: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(&config)?);
    let notifier = Arc::new(TerminalNotifier);
    let view = Arc::new(ViewState::new(backend.clone()));

    // Initial load. Failures are logged, not fatal: the backend may come up
    // after the client.
    if let Err(e) = view.refresh_cart().await {
        warn!("initial cart fetch failed: {e}");
    }
    if let Err(e) = view.refresh_recommendations().await {
        warn!("recommendation fetch failed: {e}");
    }

    println!("Smart Shopping Scanner");
    println!("{}", render_cart(&view.cart().await, &config.currency));
    print!(
        "{}",
        render_recommendations(&view.recommendations().await, &config.currency)
    );

    // Re-render whenever a new cart snapshot lands.
    let mut changes = view.watch_changes();
    {
        let view = view.clone();
        let currency = config.currency.clone();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                println!("{}", render_cart(&view.cart().await, &currency));
            }
        });
    }

    let decoder: Arc<dyn FrameDecoder> = match config.decoder {
        DecoderKind::Keyboard => Arc::new(LineDecoder::keyboard()),
        DecoderKind::Prompt => Arc::new(LineDecoder::prompted()),
    };

    let mut session = ScanSession::new(&config, decoder, backend, view, notifier);
    if session.start_scanning().await {
        session.run().await;
    }

    Ok(())
}
