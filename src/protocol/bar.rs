use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ProtocolError;

pub const MAGIC: u8 = 0x55;
pub const BROADCAST_UID: u8 = 0;

pub const CMD_SET_LEDS: u8 = 1;
pub const CMD_SET_PRESCALER: u8 = 2;
pub const CMD_BOOTLOADER: u8 = 3;

/// Bootloader opcodes, CRC16 framed.
pub const OP_START_APPLICATION: u8 = 0x06;
pub const OP_WRITE_MULTIPLE: u8 = 0x10;

pub const CLOCK_HZ: u32 = 16_000_000;
/// Rate the bootloader listens at and every handshake starts from.
pub const HANDSHAKE_BAUD: u32 = 9600;

/// Data bytes per flash frame, sent as 16 registers.
pub const FLASH_PAGE: usize = 32;
pub const FLASH_FRAME_LEN: usize = 6 + FLASH_PAGE + 2;

/// Channel order a strip expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorFormat {
    #[default]
    Grb,
    Gbr,
    Rgb,
    Bgr,
    Rbg,
}

impl ColorFormat {
    /// Reads the buffer's three channels as `(r, g, b)` for this strip.
    fn split(self, c: Rgb) -> (u8, u8, u8) {
        let [c0, c1, c2] = c.channels();
        match self {
            ColorFormat::Rgb => (c0, c1, c2),
            ColorFormat::Bgr => (c2, c1, c0),
            ColorFormat::Grb => (c1, c0, c2),
            ColorFormat::Gbr => (c2, c0, c1),
            ColorFormat::Rbg => (c0, c2, c1),
        }
    }

    /// Packs one LED into two bytes, 5 bits red, 6 green, 5 blue.
    pub fn pack(self, c: Rgb) -> [u8; 2] {
        let (r, g, b) = self.split(c);
        [
            ((g << 3) & 0xE0) | ((b >> 3) & 0x1F),
            (r & 0xF8) | ((g >> 5) & 0x07),
        ]
    }
}

/// CRC-8, polynomial 0x07, zero init.
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |mut crc, byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
        }
        crc
    })
}

/// CRC-16/MODBUS.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0xFFFFu16, |mut crc, byte| {
        crc ^= *byte as u16;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xA001 } else { crc >> 1 };
        }
        crc
    })
}

pub fn set_leds(uid: u8, colors: &[Rgb], format: ColorFormat) -> Result<Vec<u8>, ProtocolError> {
    let len = u8::try_from(colors.len()).map_err(|_| ProtocolError::TooManyLeds { uid, len: colors.len() })?;

    let mut msg = Vec::with_capacity(5 + 2 * colors.len());
    msg.extend_from_slice(&[MAGIC, uid, CMD_SET_LEDS, len]);
    for c in colors {
        msg.extend_from_slice(&format.pack(*c));
    }
    msg.push(crc8(&msg[4..]));
    Ok(msg)
}

pub fn set_prescaler(uid: u8, prescaler: u8) -> Vec<u8> {
    vec![MAGIC, uid, CMD_SET_PRESCALER, prescaler, crc8(&[prescaler])]
}

pub fn enter_bootloader(uid: u8) -> Vec<u8> {
    let header = [MAGIC, uid, CMD_BOOTLOADER];
    vec![MAGIC, uid, CMD_BOOTLOADER, crc8(&header)]
}

/// Tells a bar sitting in its bootloader to run the LED application.
pub fn start_application(uid: u8) -> [u8; 8] {
    let mut msg = [uid, OP_START_APPLICATION, 0, 0, 0, 0, 0, 0];
    let [lo, hi] = crc16(&msg[..6]).to_le_bytes();
    msg[6] = lo;
    msg[7] = hi;
    msg
}

pub fn flash_frame(uid: u8, address: u16, data: &[u8]) -> [u8; FLASH_FRAME_LEN] {
    let mut frame = [0xFF; FLASH_FRAME_LEN];
    let [addr_hi, addr_lo] = address.to_be_bytes();
    frame[..6].copy_from_slice(&[uid, OP_WRITE_MULTIPLE, addr_hi, addr_lo, 0x00, (FLASH_PAGE / 2) as u8]);

    let n = data.len().min(FLASH_PAGE);
    frame[6..6 + n].copy_from_slice(&data[..n]);

    let [lo, hi] = crc16(&frame[..38]).to_le_bytes();
    frame[38] = lo;
    frame[39] = hi;
    frame
}

/// Splits a firmware image loaded at `base` into flash frames.
pub fn flash_frames(uid: u8, base: u16, image: &[u8]) -> Vec<[u8; FLASH_FRAME_LEN]> {
    image
        .chunks(FLASH_PAGE)
        .enumerate()
        .map(|(i, page)| flash_frame(uid, base.wrapping_add((i * FLASH_PAGE) as u16), page))
        .collect()
}

/// Checks the trailing little-endian CRC16 of a bootloader frame and returns
/// the body.
pub fn check_crc16(frame: &[u8]) -> Result<&[u8], ProtocolError> {
    if frame.len() < 3 {
        return Err(ProtocolError::Truncated);
    }
    let (body, tail) = frame.split_at(frame.len() - 2);
    let actual = u16::from_le_bytes([tail[0], tail[1]]);
    let expected = crc16(body);
    if expected != actual {
        return Err(ProtocolError::BadCrc { expected, actual });
    }
    Ok(body)
}

/// A decoded `0x55` bar message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarMessage {
    SetLeds { uid: u8, pixels: Vec<[u8; 2]> },
    SetPrescaler { uid: u8, prescaler: u8 },
    Bootloader { uid: u8 },
}

impl BarMessage {
    /// Parses one message from the start of `bytes`, returning it and the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), ProtocolError> {
        let header = bytes.get(..3).ok_or(ProtocolError::Truncated)?;
        if header[0] != MAGIC {
            return Err(ProtocolError::Malformed("missing magic"));
        }
        let uid = header[1];

        match header[2] {
            CMD_SET_LEDS => {
                let n = *bytes.get(3).ok_or(ProtocolError::Truncated)? as usize;
                let end = 4 + 2 * n;
                let payload = bytes.get(4..end).ok_or(ProtocolError::Truncated)?;
                let actual = *bytes.get(end).ok_or(ProtocolError::Truncated)?;
                verify8(crc8(payload), actual)?;
                let pixels = payload.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
                Ok((BarMessage::SetLeds { uid, pixels }, end + 1))
            }
            CMD_SET_PRESCALER => {
                let body = bytes.get(3..5).ok_or(ProtocolError::Truncated)?;
                verify8(crc8(&body[..1]), body[1])?;
                Ok((BarMessage::SetPrescaler { uid, prescaler: body[0] }, 5))
            }
            CMD_BOOTLOADER => {
                let actual = *bytes.get(3).ok_or(ProtocolError::Truncated)?;
                verify8(crc8(header), actual)?;
                Ok((BarMessage::Bootloader { uid }, 4))
            }
            _ => Err(ProtocolError::Malformed("unknown command")),
        }
    }
}

fn verify8(expected: u8, actual: u8) -> Result<(), ProtocolError> {
    if expected != actual {
        return Err(ProtocolError::BadCrc { expected: expected as u16, actual: actual as u16 });
    }
    Ok(())
}

/// UART divisor for `baud`, truncated.
pub fn prescaler(baud: u32) -> u8 {
    (CLOCK_HZ / baud.max(1) / 8).clamp(1, u8::MAX as u32) as u8
}

/// The rate both ends actually run at for `prescaler`.
pub fn effective_baud(prescaler: u8) -> u32 {
    CLOCK_HZ / (8 * prescaler.max(1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_check_values() {
        assert_eq!(crc8(b"123456789"), 0xF4);
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn set_leds_grb() {
        let colors = [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)];
        let msg = set_leds(1, &colors, ColorFormat::Grb).unwrap();
        assert_eq!(msg, vec![0x55, 0x01, 0x01, 0x03, 0xE0, 0x07, 0x00, 0xF8, 0x1F, 0x00, 0x21]);
    }

    #[test]
    fn color_formats() {
        let c = Rgb::new(0xF8, 0, 0);
        assert_eq!(ColorFormat::Rgb.pack(c), [0x00, 0xF8]);
        assert_eq!(ColorFormat::Bgr.pack(c), [0x1F, 0x00]);
        assert_eq!(ColorFormat::Grb.pack(c), [0xC0, 0x07]);
    }

    #[test]
    fn too_many_leds() {
        let colors = vec![Rgb::OFF; 256];
        assert_eq!(
            set_leds(4, &colors, ColorFormat::Rgb),
            Err(ProtocolError::TooManyLeds { uid: 4, len: 256 })
        );
    }

    #[test]
    fn handshake_messages() {
        assert_eq!(prescaler(250_000), 8);
        assert_eq!(effective_baud(8), 250_000);
        assert_eq!(prescaler(500_000), 4);
        assert_eq!(set_prescaler(0, 4), vec![0x55, 0x00, 0x02, 0x04, 0x1C]);
        assert_eq!(enter_bootloader(0), vec![0x55, 0x00, 0x03, 0xED]);
        assert_eq!(start_application(1), [0x01, 0x06, 0, 0, 0, 0, 0x89, 0xCA]);
        assert_eq!(start_application(0), [0x00, 0x06, 0, 0, 0, 0, 0x88, 0x1B]);
    }

    #[test]
    fn flash_frames_are_padded() {
        let image: Vec<u8> = (0..40).collect();
        let frames = flash_frames(3, 0x0100, &image);
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..6], &[3, 0x10, 0x01, 0x00, 0x00, 0x10]);
        assert_eq!(&frames[1][..4], &[3, 0x10, 0x01, 0x20]);
        assert_eq!(frames[1][6 + 8], 0xFF);
        assert!(check_crc16(&frames[1]).is_ok());
    }

    #[test]
    fn decode_rejects_bad_crc() {
        let mut msg = set_leds(2, &[Rgb::WHITE], ColorFormat::Rgb).unwrap();
        let (decoded, used) = BarMessage::decode(&msg).unwrap();
        assert_eq!(used, msg.len());
        assert!(matches!(decoded, BarMessage::SetLeds { uid: 2, ref pixels } if pixels.len() == 1));

        let last = msg.len() - 1;
        msg[last] ^= 0xFF;
        assert!(matches!(BarMessage::decode(&msg), Err(ProtocolError::BadCrc { .. })));
        assert_eq!(BarMessage::decode(&msg[..3]), Err(ProtocolError::Truncated));
    }
}
