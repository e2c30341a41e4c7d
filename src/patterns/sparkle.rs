use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SparkleParams {
    pub color: Rgb,
    pub background: Rgb,
    /// Chance per LED per tick of lighting up.
    pub probability: f32,
    /// Fraction of the previous colour kept each tick.
    pub decay: f32,
}

impl std::default::Default for SparkleParams {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            background: Rgb::OFF,
            probability: 0.001,
            decay: 0.95,
        }
    }
}

pub struct Sparkle {
    params: SparkleParams,
    rng: StdRng,
    override_color: Option<Rgb>,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl Sparkle {
    pub fn new(params: SparkleParams, filter: SegmentFilter) -> Self {
        Self {
            params,
            rng: StdRng::from_entropy(),
            override_color: None,
            segments: Vec::new(),
            filter,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Pattern for Sparkle {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn initialize(&mut self) {
        let background = self.params.background;
        self.segments.iter_mut().for_each(|s| s.fill(background));
    }

    fn reset(&mut self) {
        self.initialize();
    }

    fn animate(&mut self, _delta: f32) {
        let SparkleParams { background, probability, decay, .. } = self.params;
        let spark = self.override_color.unwrap_or(self.params.color);

        for segment in &mut self.segments {
            for color in segment.colors.iter_mut() {
                *color = background.lerp(*color, decay);
                if self.rng.gen::<f32>() < probability {
                    *color = spark;
                }
            }
        }
    }

    fn set_color(&mut self, color: Option<Rgb>) {
        self.override_color = color;
    }

    segment_accessors!();
}
