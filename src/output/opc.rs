use anyhow::Context;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::OpcConfig;
use crate::mixer::Frame;
use crate::protocol::opc;

use super::Link;

/// Segments relayed to an Open Pixel Control server, one channel per uid.
pub struct OpcLink {
    config: OpcConfig,
    stream: Option<TcpStream>,
}

impl OpcLink {
    pub fn new(config: OpcConfig) -> Self {
        Self { config, stream: None }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.config.server_ip, self.config.server_port)
    }
}

#[async_trait]
impl Link for OpcLink {
    fn name(&self) -> String {
        format!("OPC server {}", self.addr())
    }

    async fn connect(&mut self) -> anyhow::Result<()> {
        let stream = TcpStream::connect(self.addr()).await?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> anyhow::Result<()> {
        let mut out = Vec::new();
        for (i, uid) in self.config.uids.iter().enumerate() {
            if let Some(segment) = frame.segment(*uid) {
                out.extend(opc::put_pixels((i + 1) as u8, &segment.colors));
            }
        }

        let stream = self.stream.as_mut().context("not connected")?;
        if let Err(e) = stream.write_all(&out).await {
            self.stream = None;
            return Err(e.into());
        }
        Ok(())
    }
}
