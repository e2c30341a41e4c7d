use crate::color::Rgb;
use crate::error::ProtocolError;

pub const START: u8 = 0x7E;
pub const END: u8 = 0xE7;
pub const LABEL_RECEIVED_DMX: u8 = 5;

pub const BAUD: u32 = 57_600;
const MAX_PAYLOAD: usize = 600;

/// One widget packet: `START label len_lo len_hi payload END`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub label: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    /// DMX channel `n`, 1-based. Received-DMX payloads carry a status byte and
    /// the start code ahead of channel 1.
    pub fn channel(&self, n: usize) -> Option<u8> {
        if self.label != LABEL_RECEIVED_DMX || n == 0 {
            return None;
        }
        self.payload.get(n + 1).copied()
    }

    /// Channels `start..start + 3` as a colour.
    pub fn color(&self, start: usize) -> Option<Rgb> {
        Some(Rgb::new(self.channel(start)?, self.channel(start + 1)?, self.channel(start + 2)?))
    }
}

/// Reassembles packets from a byte stream.
#[derive(Default)]
pub struct Decoder {
    buf: Vec<u8>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// The next complete packet, if any. A broken packet is reported once and
    /// decoding resumes at the following start byte.
    pub fn next_packet(&mut self) -> Option<Result<Packet, ProtocolError>> {
        match self.buf.iter().position(|b| *b == START) {
            Some(i) => {
                self.buf.drain(..i);
            }
            None => {
                self.buf.clear();
                return None;
            }
        }
        if self.buf.len() < 4 {
            return None;
        }

        let len = u16::from_le_bytes([self.buf[2], self.buf[3]]) as usize;
        if len > MAX_PAYLOAD {
            self.buf.drain(..1);
            return Some(Err(ProtocolError::Malformed("oversized dmx packet")));
        }
        let total = 4 + len + 1;
        if self.buf.len() < total {
            return None;
        }
        if self.buf[total - 1] != END {
            self.buf.drain(..1);
            return Some(Err(ProtocolError::Malformed("dmx packet without end byte")));
        }

        let frame: Vec<u8> = self.buf.drain(..total).collect();
        Some(Ok(Packet { label: frame[1], payload: frame[4..total - 1].to_vec() }))
    }
}
