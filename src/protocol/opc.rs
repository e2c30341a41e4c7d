use crate::color::Rgb;

pub const CMD_SET_PIXELS: u8 = 0;
/// Channel 0 addresses every strand behind the relay.
pub const ALL_CHANNELS: u8 = 0;

/// One set-pixel-colours packet. Pixels beyond the 16-bit length field are
/// dropped.
pub fn put_pixels(channel: u8, pixels: &[Rgb]) -> Vec<u8> {
    let pixels = &pixels[..pixels.len().min(u16::MAX as usize / 3)];
    let [len_hi, len_lo] = ((pixels.len() * 3) as u16).to_be_bytes();

    let mut msg = Vec::with_capacity(4 + pixels.len() * 3);
    msg.extend_from_slice(&[channel, CMD_SET_PIXELS, len_hi, len_lo]);
    for c in pixels {
        msg.extend_from_slice(&c.channels());
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_payload() {
        let msg = put_pixels(2, &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
        assert_eq!(msg, vec![2, 0, 0, 6, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn length_is_big_endian() {
        let msg = put_pixels(ALL_CHANNELS, &vec![Rgb::OFF; 100]);
        assert_eq!(&msg[..4], &[0, 0, 0x01, 0x2C]);
        assert_eq!(msg.len(), 4 + 300);
    }
}
