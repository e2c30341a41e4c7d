use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ConfigError;

pub type Point = [f32; 3];

/// LED index range `[start, end)` a mixing layer is allowed to write.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Mask {
    pub start: usize,
    pub end: usize,
}

impl Mask {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Clamped to a strip of `num_leds`, never inverted.
    pub fn range(&self, num_leds: usize) -> Range<usize> {
        let end = self.end.min(num_leds);
        self.start.min(end)..end
    }
}

/// One physical LED strip.
#[derive(Clone, Debug)]
pub struct Segment {
    pub uid: u8,
    pub colors: Vec<Rgb>,
    pub mask: Option<Mask>,
    positions: Arc<[Point]>,
}

impl Segment {
    pub fn new(uid: u8, positions: Vec<Point>) -> Self {
        Self {
            uid,
            colors: vec![Rgb::OFF; positions.len()],
            mask: None,
            positions: positions.into(),
        }
    }

    pub fn num_leds(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// LEDs a layer sourced from this segment may touch.
    pub fn writable(&self) -> Range<usize> {
        match self.mask {
            Some(mask) => mask.range(self.num_leds()),
            None => 0..self.num_leds(),
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.colors.iter_mut().for_each(|c| *c = color);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentConfig {
    pub uid: u8,
    pub num_leds: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f32>,
    pub led_positions: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
}

/// Geometry of one addressable object, as loaded from its LED config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedLayout {
    pub led_segments: Vec<SegmentConfig>,
}

impl LedLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let layout: Self = serde_json::from_str(&text).map_err(|e| ConfigError::json(path, e))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for s in &self.led_segments {
            if !seen.insert(s.uid) {
                return Err(ConfigError::Layout(format!("duplicate segment uid {}", s.uid)));
            }
            if s.num_leds != s.led_positions.len() {
                return Err(ConfigError::Layout(format!(
                    "segment {} declares {} leds but has {} positions",
                    s.uid, s.num_leds, s.led_positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Fresh, zeroed segments for a pattern or mixer to own.
    pub fn segments(&self) -> Vec<Segment> {
        self.led_segments
            .iter()
            .map(|s| {
                let mut segment = Segment::new(s.uid, s.led_positions.clone());
                segment.mask = s.mask;
                segment
            })
            .collect()
    }

    pub fn total_leds(&self) -> usize {
        self.led_segments.iter().map(|s| s.num_leds).sum()
    }

    /// Straight strips along x, handy for tests and for bench setups without geometry.
    pub fn linear(strips: &[(u8, usize)]) -> Self {
        let led_segments = strips
            .iter()
            .enumerate()
            .map(|(row, &(uid, num_leds))| SegmentConfig {
                uid,
                num_leds,
                name: None,
                length: None,
                led_positions: (0..num_leds).map(|i| [i as f32, row as f32, 0.0]).collect(),
                mask: None,
            })
            .collect();
        Self { led_segments }
    }
}
