use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color::{Palette, Rgb};
use crate::error::ConfigError;
use crate::pattern::SegmentFilter;
use crate::patterns::*;

/// The role a pattern plays in selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Group {
    /// Auto-advancing base layers.
    Rotation,
    /// Directly selectable base layers, never auto-advanced.
    Manual,
    /// Overlays, any number active, held while the button is down.
    SpecialEffect,
    /// Mutually exclusive replacement layers.
    Eyes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EntryFields")]
pub struct PatternEntry {
    pub id: String,
    #[serde(flatten)]
    pub spec: PatternSpec,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryFields {
    id: String,
    params: PatternKind,
    #[serde(default)]
    include_segments: Vec<u8>,
    #[serde(default)]
    exclude_segments: Vec<u8>,
    #[serde(default)]
    masks: Vec<SegmentMask>,
}

impl From<EntryFields> for PatternEntry {
    fn from(f: EntryFields) -> Self {
        let spec = PatternSpec {
            params: f.params,
            filter: SegmentFilter { include: f.include_segments, exclude: f.exclude_segments },
            masks: f.masks,
        };
        Self { id: f.id, spec }
    }
}

impl PatternEntry {
    pub fn new(id: impl Into<String>, spec: impl Into<PatternSpec>) -> Self {
        Self { id: id.into(), spec: spec.into() }
    }
}

/// Static, load-time table of every pattern instance, partitioned into
/// disjoint groups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    pub rotation: Vec<PatternEntry>,
    pub manual: Vec<PatternEntry>,
    pub special_effects: Vec<PatternEntry>,
    pub eyes: Vec<PatternEntry>,
}

impl PatternConfig {
    pub fn groups(&self) -> [(Group, &[PatternEntry]); 4] {
        [
            (Group::Rotation, &self.rotation),
            (Group::Manual, &self.manual),
            (Group::SpecialEffect, &self.special_effects),
            (Group::Eyes, &self.eyes),
        ]
    }

    pub fn entries(&self) -> impl Iterator<Item = (Group, &PatternEntry)> {
        self.groups()
            .into_iter()
            .flat_map(|(group, entries)| entries.iter().map(move |e| (group, e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (_, entry) in self.entries() {
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::DuplicatePattern(entry.id.clone()));
            }
            if !entry.spec.filter.is_valid() {
                return Err(ConfigError::ConflictingFilter(entry.id.clone()));
            }
        }
        if self.rotation.is_empty() && self.manual.is_empty() {
            return Err(ConfigError::NoBasePattern);
        }
        Ok(())
    }
}

/// Eye strips of the art car.
const EYE_SEGMENTS: [u8; 2] = [50, 51];

impl PatternConfig {
    pub fn builtin() -> Self {
        Self {
            rotation: vec![
                PatternEntry::new("0x0", PatternKind::Rainbow(RainbowParams::default())),
                PatternEntry::new("1x0", PatternKind::TheaterChase(ChaseParams {
                    color: Rgb::new(255, 255, 2),
                    ..Default::default()
                })),
                PatternEntry::new("2x0", PatternKind::Blink(BlinkParams {
                    palette: Palette::Tropical,
                    fps: 0.5,
                })),
                PatternEntry::new("3x0", PatternKind::Blink(BlinkParams {
                    palette: Palette::Cool,
                    fps: 1.0,
                })),
            ],
            manual: vec![
                PatternEntry::new("0x1", PatternKind::Solid(SolidParams { color: Rgb::WHITE })),
                PatternEntry::new("1x1", PatternKind::Blink(BlinkParams {
                    palette: Palette::Fire,
                    fps: 4.0,
                })),
            ],
            special_effects: vec![
                PatternEntry::new("0x2", PatternKind::Sparkle(SparkleParams {
                    probability: 0.01,
                    ..Default::default()
                })),
                PatternEntry::new("1x2", PatternKind::TheaterChase(ChaseParams {
                    color: Rgb::BLUE,
                    speed: 3.0,
                    step_size: 6,
                    ..Default::default()
                })),
            ],
            eyes: vec![
                PatternEntry::new(
                    "0x3",
                    PatternSpec::new(PatternKind::Solid(SolidParams { color: Rgb::RED }))
                        .filter(SegmentFilter::include(EYE_SEGMENTS)),
                ),
                PatternEntry::new(
                    "1x3",
                    PatternSpec::new(PatternKind::Rainbow(RainbowParams { speed: 1.0, ..Default::default() }))
                        .filter(SegmentFilter::include(EYE_SEGMENTS)),
                ),
            ],
        }
    }
}
