use std::collections::HashSet;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::config::SerialConfig;
use crate::mixer::Frame;
use crate::protocol::bar::{self, BROADCAST_UID, HANDSHAKE_BAUD};

use super::Link;

/// Bars that reset fall back to their bootloader, so the handshake repeats.
const HANDSHAKE_INTERVAL: Duration = Duration::from_secs(1);

/// LED bars daisy-chained on one serial port.
pub struct SerialLink {
    config: SerialConfig,
    port: Option<SerialStream>,
    last_handshake: Option<Instant>,
    oversized: HashSet<u8>,
}

impl SerialLink {
    pub fn new(config: SerialConfig) -> Self {
        Self { config, port: None, last_handshake: None, oversized: HashSet::new() }
    }

    fn open(&self, baud: u32) -> anyhow::Result<SerialStream> {
        tokio_serial::new(&self.config.device, baud)
            .open_native_async()
            .with_context(|| format!("opening {} at {} baud", self.config.device, baud))
    }

    /// Wake the bars at the bootloader rate, switch them to the configured
    /// rate, then follow them there.
    async fn handshake(&mut self) -> anyhow::Result<()> {
        self.port = None;

        let prescaler = bar::prescaler(self.config.baudrate);
        let baud = bar::effective_baud(prescaler);

        let mut port = self.open(HANDSHAKE_BAUD)?;
        port.write_all(&bar::start_application(BROADCAST_UID)).await?;
        port.write_all(&bar::set_prescaler(BROADCAST_UID, prescaler)).await?;
        port.flush().await?;
        drop(port);

        log::trace!("{}: handshake done, running at {} baud", self.config.device, baud);
        self.port = Some(self.open(baud)?);
        self.last_handshake = Some(Instant::now());
        Ok(())
    }
}

#[async_trait]
impl Link for SerialLink {
    fn name(&self) -> String {
        format!("serial {}", self.config.device)
    }

    async fn connect(&mut self) -> anyhow::Result<()> {
        self.handshake().await
    }

    async fn send(&mut self, frame: &Frame) -> anyhow::Result<()> {
        if self.last_handshake.map_or(true, |t| t.elapsed() >= HANDSHAKE_INTERVAL) {
            self.handshake().await?;
        }

        let mut out = Vec::new();
        for uid in &self.config.uids {
            let Some(segment) = frame.segment(*uid) else { continue };
            match bar::set_leds(*uid, &segment.colors, self.config.color_format) {
                Ok(msg) => out.extend_from_slice(&msg),
                Err(e) => {
                    if self.oversized.insert(*uid) {
                        log::warn!("{}: {}", self.config.device, e);
                    }
                }
            }
        }

        let port = self.port.as_mut().context("port closed")?;
        port.write_all(&out).await?;
        Ok(())
    }
}
