use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF:     Self = Self::new(0,   0,   0);
    pub const WHITE:   Self = Self::new(255, 255, 255);

    pub const RED:     Self = Self::new(255, 0,   0);
    pub const ORANGE:  Self = Self::new(255, 64,  0);
    pub const YELLOW:  Self = Self::new(255, 255, 0);
    pub const LIME:    Self = Self::new(0,   255, 0);
    pub const MINT:    Self = Self::new(0,   255, 68);
    pub const CYAN:    Self = Self::new(0,   204, 255);
    pub const BLUE:    Self = Self::new(0,   0,   255);
    pub const VIOLET:  Self = Self::new(136, 0,   255);
    pub const MAGENTA: Self = Self::new(255, 0,   255);
    pub const PINK:    Self = Self::new(255, 97,  204);

    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    pub fn hsv(h: f32, s: f32, v: f32) -> Self {
        let mix = |a: f32, b: f32, t: f32| a + (b - a) * t;
        let r = v * mix(1.0, (((h + 1.0      ).fract() * 6.0 - 3.0).abs() - 1.0).clamp(0.0, 1.0), s);
        let g = v * mix(1.0, (((h + 0.6666666).fract() * 6.0 - 3.0).abs() - 1.0).clamp(0.0, 1.0), s);
        let b = v * mix(1.0, (((h + 0.3333333).fract() * 6.0 - 3.0).abs() - 1.0).clamp(0.0, 1.0), s);
        Self::new(byte(r), byte(g), byte(b))
    }

    /// Blend towards `other`, `t` = 0 keeps `self`, `t` = 1 yields `other`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| byte((a as f32 + (b as f32 - a as f32) * t) / 255.0);
        Self::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn byte(fr: f32) -> u8 {
    (fr.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.channels()
    }
}

pub mod palettes {
    use super::Rgb;

    pub const TROPICAL: &[Rgb] = &[
        Rgb::new(242, 207, 51),
        Rgb::new(245, 112, 76),
        Rgb::new(32,  158, 179),
        Rgb::new(240, 167, 141),
    ];

    pub const BLUES: &[Rgb] = &[
        Rgb::new(127, 178, 240),
        Rgb::new(65,  146, 217),
        Rgb::new(2,   136, 209),
        Rgb::new(0,   75,  141),
    ];

    pub const FIRE: &[Rgb] = &[
        Rgb::new(0x00, 0x00, 0x00),
        Rgb::new(0x22, 0x00, 0x00),
        Rgb::new(0x88, 0x00, 0x00),
        Rgb::new(0xFF, 0x00, 0x00),
        Rgb::new(0xFF, 0x66, 0x00),
        Rgb::new(0xFF, 0xCC, 0x00),
    ];

    pub const COOL: &[Rgb] = &[
        Rgb::new(0x00, 0x00, 0xFF),
        Rgb::new(0x00, 0x99, 0xDD),
        Rgb::new(0x44, 0x44, 0x88),
        Rgb::new(0x99, 0x00, 0xDD),
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Tropical,
    Blues,
    Fire,
    Cool,
}

impl Palette {
    pub fn colors(&self) -> &'static [Rgb] {
        match self {
            Palette::Tropical => palettes::TROPICAL,
            Palette::Blues => palettes::BLUES,
            Palette::Fire => palettes::FIRE,
            Palette::Cool => palettes::COOL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_primaries() {
        assert_eq!(Rgb::hsv(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::hsv(1.0 / 3.0, 1.0, 1.0), Rgb::LIME);
        assert_eq!(Rgb::hsv(0.5, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(Rgb::RED.lerp(Rgb::BLUE, 0.0), Rgb::RED);
        assert_eq!(Rgb::RED.lerp(Rgb::BLUE, 1.0), Rgb::BLUE);
    }

    #[test]
    fn serde_as_triple() {
        let c: Rgb = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(c, Rgb::new(1, 2, 3));
        assert_eq!(serde_json::to_string(&c).unwrap(), "[1,2,3]");
    }
}
