use std::time::Duration;

use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use crate::mix_spec::MixSpec;
use crate::selector::InputHandle;

/// Follow a peer's selection published at `uri`, reconnecting after
/// `backoff` whenever the connection drops.
pub async fn run_mirror(uri: String, inputs: InputHandle, backoff: Duration) {
    loop {
        match follow(&uri, &inputs).await {
            Ok(()) => log::warn!("Mirror {} closed. Retrying in {:?}", uri, backoff),
            Err(e) => log::warn!("Mirror {}: {:#}. Retrying in {:?}", uri, e, backoff),
        }
        tokio::time::sleep(backoff).await;
    }
}

async fn follow(uri: &str, inputs: &InputHandle) -> anyhow::Result<()> {
    let (mut ws, _) = tokio_tungstenite::connect_async(uri).await?;
    log::info!("Mirroring selection from {}", uri);

    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => match MixSpec::from_json(&text) {
                Ok(spec) => inputs.remote(spec),
                Err(e) => log::debug!("Ignoring mirror message: {}", e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(())
}
