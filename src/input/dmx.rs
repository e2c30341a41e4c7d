use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tokio_serial::{SerialPortBuilderExt, StopBits};

use crate::config::DmxConfig;
use crate::protocol::dmx::{self, Decoder};
use crate::selector::InputHandle;

/// Sample the console colour from a DMX widget forever. A missing or lost
/// widget clears the override and is retried after `backoff`.
pub async fn run_dmx(config: DmxConfig, inputs: InputHandle, backoff: Duration) {
    loop {
        match read_dmx(&config, &inputs).await {
            Ok(()) => log::warn!("DMX widget {} closed", config.device),
            Err(e) => log::warn!("DMX widget {}: {:#}", config.device, e),
        }
        inputs.console_lost();
        tokio::time::sleep(backoff).await;
    }
}

async fn read_dmx(config: &DmxConfig, inputs: &InputHandle) -> anyhow::Result<()> {
    let mut port = tokio_serial::new(&config.device, dmx::BAUD)
        .stop_bits(StopBits::Two)
        .open_native_async()
        .with_context(|| format!("opening {}", config.device))?;
    log::info!("DMX widget {} connected", config.device);

    let mut decoder = Decoder::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = port.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        decoder.extend(&buf[..n]);

        while let Some(packet) = decoder.next_packet() {
            match packet {
                Ok(packet) => {
                    if let Some(color) = packet.color(config.start_channel) {
                        log::trace!("DMX colour {:?}", color);
                        inputs.set_color(color);
                    }
                }
                Err(e) => log::debug!("DMX packet dropped: {}", e),
            }
        }
    }
}
