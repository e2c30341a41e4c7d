use crate::segment::Segment;

pub const TEXTURE_WIDTH: usize = 128;
pub const TEXTURE_HEIGHT: usize = 128;
pub const TEXTURE_SIZE: usize = TEXTURE_WIDTH * TEXTURE_HEIGHT * 4;

/// Lays every LED of `segments` out in order as RGBA texels. Alpha stays 0
/// and LEDs past the texture are dropped.
pub fn encode(segments: &[Segment]) -> Vec<u8> {
    let mut out = vec![0u8; TEXTURE_SIZE];
    let leds = segments.iter().flat_map(|s| s.colors.iter());
    for (texel, c) in out.chunks_exact_mut(4).zip(leds) {
        texel[..3].copy_from_slice(&c.channels());
    }
    out
}
