use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolidParams {
    pub color: Rgb,
}

impl std::default::Default for SolidParams {
    fn default() -> Self {
        Self { color: Rgb::WHITE }
    }
}

pub struct Solid {
    params: SolidParams,
    color: Option<Rgb>,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl Solid {
    pub fn new(params: SolidParams, filter: SegmentFilter) -> Self {
        Self { params, color: None, segments: Vec::new(), filter }
    }
}

impl Pattern for Solid {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn reset(&mut self) {}

    fn animate(&mut self, _delta: f32) {
        let color = self.color.unwrap_or(self.params.color);
        for segment in &mut self.segments {
            segment.fill(color);
        }
    }

    fn set_color(&mut self, color: Option<Rgb>) {
        self.color = color;
    }

    segment_accessors!();
}
