use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::broadcast::Broadcast;
use crate::mixer::Frame;

mod serial; pub use serial::*;
mod opc; pub use opc::*;
mod websocket; pub use websocket::*;

/// A physical or network sink for one object's frames.
#[async_trait]
pub trait Link: Send {
    fn name(&self) -> String;

    async fn connect(&mut self) -> anyhow::Result<()>;

    /// Forward one frame. An error means the link is gone.
    async fn send(&mut self, frame: &Frame) -> anyhow::Result<()>;
}

/// Follow `frames` into `link` forever, reconnecting after `backoff` when the
/// link fails. Only this task ever sees the failure.
pub async fn drive<L: Link>(mut link: L, frames: Arc<Broadcast<Frame>>, backoff: Duration) {
    loop {
        log::info!("Connecting to {}", link.name());
        if let Err(e) = link.connect().await {
            log::warn!("Could not connect to {}: {:#}. Retrying in {:?}", link.name(), e, backoff);
            tokio::time::sleep(backoff).await;
            continue;
        }
        log::info!("Connected to {}", link.name());

        loop {
            let frame = frames.next().await;
            if let Err(e) = link.send(&frame).await {
                log::warn!("Lost {}: {:#}. Retrying in {:?}", link.name(), e, backoff);
                break;
            }
        }
        tokio::time::sleep(backoff).await;
    }
}
