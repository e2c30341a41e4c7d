use serde::{Deserialize, Serialize};

use crate::color::{Palette, Rgb};
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlinkParams {
    pub palette: Palette,
    /// Colour changes per second.
    pub fps: f32,
}

impl std::default::Default for BlinkParams {
    fn default() -> Self {
        Self { palette: Palette::Tropical, fps: 0.5 }
    }
}

/// Whole-object colour cycling through a palette.
pub struct Blink {
    params: BlinkParams,
    elapsed: f32,
    index: usize,
    override_color: Option<Rgb>,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl Blink {
    pub fn new(params: BlinkParams, filter: SegmentFilter) -> Self {
        Self {
            params,
            elapsed: f32::INFINITY,
            index: 0,
            override_color: None,
            segments: Vec::new(),
            filter,
        }
    }
}

impl Pattern for Blink {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn reset(&mut self) {
        // first animate after a reset shows palette[0] immediately
        self.elapsed = f32::INFINITY;
        self.index = 0;
    }

    fn animate(&mut self, delta: f32) {
        if let Some(color) = self.override_color {
            self.segments.iter_mut().for_each(|s| s.fill(color));
            return;
        }

        self.elapsed += delta;
        if self.elapsed < 1.0 / self.params.fps {
            return;
        }

        let palette = self.params.palette.colors();
        let color = palette[self.index % palette.len()];
        self.index = (self.index + 1) % palette.len();
        self.elapsed = 0.0;
        self.segments.iter_mut().for_each(|s| s.fill(color));
    }

    fn set_color(&mut self, color: Option<Rgb>) {
        self.override_color = color;
    }

    segment_accessors!();
}
