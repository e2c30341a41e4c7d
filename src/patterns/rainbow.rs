use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainbowParams {
    /// Hue revolutions per second.
    pub speed: f32,
    /// How many times the full spectrum repeats along a strip.
    pub repeat: f32,
    pub saturation: f32,
    pub value: f32,
}

impl std::default::Default for RainbowParams {
    fn default() -> Self {
        Self { speed: 0.2, repeat: 1.0, saturation: 1.0, value: 0.8 }
    }
}

pub struct Rainbow {
    params: RainbowParams,
    hue: f32,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl Rainbow {
    pub fn new(params: RainbowParams, filter: SegmentFilter) -> Self {
        Self { params, hue: 0.0, segments: Vec::new(), filter }
    }
}

impl Pattern for Rainbow {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn reset(&mut self) {
        self.hue = 0.0;
    }

    fn animate(&mut self, delta: f32) {
        let RainbowParams { speed, repeat, saturation, value } = self.params;
        self.hue = (self.hue + delta * speed).fract();

        for segment in &mut self.segments {
            let n = segment.colors.len().max(1) as f32;
            for (i, color) in segment.colors.iter_mut().enumerate() {
                let h = self.hue + repeat * i as f32 / n;
                *color = Rgb::hsv(h.fract(), saturation, value);
            }
        }
    }

    segment_accessors!();
}
