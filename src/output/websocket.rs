use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use crate::broadcast::Broadcast;
use crate::mix_spec::MixSpec;
use crate::mixer::Frame;
use crate::protocol::texture;

/// Browser visualizer: one RGBA texture per frame to every client.
pub async fn serve_visualizer(port: u16, frames: Arc<Broadcast<Frame>>) -> anyhow::Result<()> {
    serve(port, "visualizer", frames, |frame: &Frame| {
        Message::Binary(texture::encode(&frame.segments))
    })
    .await
}

/// Mirror publisher: the selection as JSON once per tick.
pub async fn serve_mix_specs(port: u16, specs: Arc<Broadcast<MixSpec>>) -> anyhow::Result<()> {
    serve(port, "mirror", specs, |spec: &MixSpec| Message::Text(spec.to_json())).await
}

/// Accept websocket clients on `port` and stream every value published to
/// `cell` to each of them. A client that goes away only ends its own task.
pub async fn serve<T, F>(port: u16, name: &'static str, cell: Arc<Broadcast<T>>, encode: F) -> anyhow::Result<()>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> Message + Copy + Send + Sync + 'static,
{
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding {} websocket on port {}", name, port))?;
    log::info!("Serving {} websocket on port {}", name, port);

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("{}: accept failed: {}", name, e);
                continue;
            }
        };
        let cell = cell.clone();
        tokio::spawn(async move {
            match stream_to(stream, addr, cell, encode).await {
                Ok(()) => log::info!("{}: client {} disconnected", name, addr),
                Err(e) => log::info!("{}: client {} dropped: {:#}", name, addr, e),
            }
        });
    }
}

async fn stream_to<T, F>(stream: TcpStream, addr: SocketAddr, cell: Arc<Broadcast<T>>, encode: F) -> anyhow::Result<()>
where
    F: Fn(&T) -> Message,
{
    let ws = tokio_tungstenite::accept_async(stream).await?;
    log::info!("Websocket client {} connected", addr);
    let (mut tx, mut rx) = ws.split();

    loop {
        tokio::select! {
            value = cell.next() => tx.send(encode(&*value)).await?,
            msg = rx.next() => match msg {
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }
}
