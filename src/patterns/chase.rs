use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChaseParams {
    pub color: Rgb,
    pub background: Rgb,
    /// Full step cycles per second.
    pub speed: f32,
    pub step_size: usize,
}

impl std::default::Default for ChaseParams {
    fn default() -> Self {
        Self {
            color: Rgb::RED,
            background: Rgb::OFF,
            speed: 1.5,
            step_size: 3,
        }
    }
}

/// Every `step_size`-th LED lit, marching along each strip.
pub struct TheaterChase {
    params: ChaseParams,
    phase: f32,
    override_color: Option<Rgb>,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl TheaterChase {
    pub fn new(params: ChaseParams, filter: SegmentFilter) -> Self {
        Self { params, phase: 0.0, override_color: None, segments: Vec::new(), filter }
    }

    fn offset(&self) -> usize {
        (self.phase * self.params.step_size as f32) as usize
    }
}

impl Pattern for TheaterChase {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn initialize(&mut self) {
        let background = self.params.background;
        self.segments.iter_mut().for_each(|s| s.fill(background));
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.initialize();
    }

    fn animate(&mut self, delta: f32) {
        let step = self.params.step_size.max(1);
        let foreground = self.override_color.unwrap_or(self.params.color);
        let background = self.params.background;

        self.phase = (self.phase + delta * self.params.speed).fract();
        let offset = self.offset().min(step - 1);

        for segment in &mut self.segments {
            for (i, color) in segment.colors.iter_mut().enumerate() {
                *color = if i % step == offset { foreground } else { background };
            }
        }
    }

    fn set_color(&mut self, color: Option<Rgb>) {
        self.override_color = color;
    }

    segment_accessors!();
}
