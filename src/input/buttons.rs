use anyhow::Context;
use futures::StreamExt;
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use crate::selector::InputHandle;

/// What a browser button panel sends.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    Press(String),
    Release(String),
}

impl ButtonEvent {
    /// A bare id is a press.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        serde_json::from_str(text).unwrap_or_else(|_| ButtonEvent::Press(text.to_owned()))
    }

    pub fn apply(self, inputs: &InputHandle) {
        match self {
            ButtonEvent::Press(id) => inputs.press(id),
            ButtonEvent::Release(id) => inputs.release(id),
        }
    }
}

pub async fn serve_buttons(port: u16, inputs: InputHandle) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding buttons websocket on port {}", port))?;
    log::info!("Serving buttons websocket on port {}", port);

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("buttons: accept failed: {}", e);
                continue;
            }
        };
        let inputs = inputs.clone();
        tokio::spawn(async move {
            if let Err(e) = read_buttons(stream, &inputs).await {
                log::info!("buttons: client {} dropped: {:#}", addr, e);
            }
        });
    }
}

async fn read_buttons(stream: TcpStream, inputs: &InputHandle) -> anyhow::Result<()> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => {
                let event = ButtonEvent::parse(&text);
                log::debug!("Browser button {:?}", event);
                event.apply(inputs);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_events() {
        assert_eq!(ButtonEvent::parse("0x2"), ButtonEvent::Press("0x2".into()));
        assert_eq!(ButtonEvent::parse(r#"{"press": "0x2"}"#), ButtonEvent::Press("0x2".into()));
        assert_eq!(ButtonEvent::parse(r#"{"release": "0x2"}"#), ButtonEvent::Release("0x2".into()));
    }

    #[test]
    fn events_reach_inputs() {
        let inputs = InputHandle::new();
        ButtonEvent::parse("1x0").apply(&inputs);
        ButtonEvent::parse(r#"{"release": "0x2"}"#).apply(&inputs);
        let pending = inputs.take();
        assert_eq!(pending.pressed, vec!["1x0"]);
        assert_eq!(pending.released, vec!["0x2"]);
    }
}
