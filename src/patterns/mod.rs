use serde::{Deserialize, Serialize};

use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::Mask;

/// Implements the segment/filter accessors of [`Pattern`] for a struct with
/// `segments` and `filter` fields.
macro_rules! segment_accessors {
    () => {
        fn segments(&self) -> &[$crate::segment::Segment] {
            &self.segments
        }

        fn segments_mut(&mut self) -> &mut [$crate::segment::Segment] {
            &mut self.segments
        }

        fn filter(&self) -> &$crate::pattern::SegmentFilter {
            &self.filter
        }
    };
}

mod solid; pub use solid::*;
mod blink; pub use blink::*;
mod chase; pub use chase::*;
mod sparkle; pub use sparkle::*;
mod rainbow; pub use rainbow::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternKind {
    Solid(SolidParams),
    Blink(BlinkParams),
    TheaterChase(ChaseParams),
    Sparkle(SparkleParams),
    Rainbow(RainbowParams),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MaskFields")]
pub struct SegmentMask {
    pub uid: u8,
    #[serde(flatten)]
    pub mask: Mask,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MaskFields {
    uid: u8,
    start: usize,
    end: usize,
}

impl From<MaskFields> for SegmentMask {
    fn from(m: MaskFields) -> Self {
        Self { uid: m.uid, mask: Mask::new(m.start, m.end) }
    }
}

/// One entry of the pattern table: the effect, its parameters and where it
/// is allowed to draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecFields")]
pub struct PatternSpec {
    pub params: PatternKind,
    #[serde(flatten)]
    pub filter: SegmentFilter,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masks: Vec<SegmentMask>,
}

impl PatternSpec {
    pub fn new(params: PatternKind) -> Self {
        Self { params, filter: SegmentFilter::all(), masks: Vec::new() }
    }

    pub fn filter(mut self, filter: SegmentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn mask(mut self, uid: u8, mask: Mask) -> Self {
        self.masks.push(SegmentMask { uid, mask });
        self
    }

    /// Unprepared pattern; the library binds segments and initializes it.
    pub fn build(&self) -> Box<dyn Pattern> {
        let filter = self.filter.clone();
        match &self.params {
            PatternKind::Solid(p) => Box::new(Solid::new(p.clone(), filter)),
            PatternKind::Blink(p) => Box::new(Blink::new(p.clone(), filter)),
            PatternKind::TheaterChase(p) => Box::new(TheaterChase::new(p.clone(), filter)),
            PatternKind::Sparkle(p) => Box::new(Sparkle::new(p.clone(), filter)),
            PatternKind::Rainbow(p) => Box::new(Rainbow::new(p.clone(), filter)),
        }
    }
}

/// Serialized form of [`PatternSpec`]. Spelled out instead of flattened so
/// that misspelled keys are rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecFields {
    params: PatternKind,
    #[serde(default)]
    include_segments: Vec<u8>,
    #[serde(default)]
    exclude_segments: Vec<u8>,
    #[serde(default)]
    masks: Vec<SegmentMask>,
}

impl From<SpecFields> for PatternSpec {
    fn from(f: SpecFields) -> Self {
        Self {
            params: f.params,
            filter: SegmentFilter { include: f.include_segments, exclude: f.exclude_segments },
            masks: f.masks,
        }
    }
}

impl From<PatternKind> for PatternSpec {
    fn from(params: PatternKind) -> Self {
        Self::new(params)
    }
}
