use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::color::Rgb;
use crate::error::CacheError;
use crate::pattern::{Pattern, SegmentFilter};
use crate::segment::{LedLayout, Segment};

/// Stable content hash of an object's LED layout.
pub fn layout_hash(layout: &LedLayout) -> String {
    let bytes = serde_json::to_vec(layout).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    pub num_steps: usize,
    #[serde(default)]
    pub include_segments: Vec<u8>,
    #[serde(default)]
    pub exclude_segments: Vec<u8>,
}

/// Records live patterns to disk once and replays them afterwards.
pub struct PatternCache {
    root: PathBuf,
    layout: LedLayout,
    hash: String,
    animation_rate: f32,
    duration: f32,
}

impl PatternCache {
    pub fn new(root: impl Into<PathBuf>, layout: &LedLayout, animation_rate: f32, duration: f32) -> Self {
        let hash = layout_hash(layout);
        log::info!("LED config hash: {}", hash);
        Self {
            root: root.into(),
            layout: layout.clone(),
            hash,
            animation_rate,
            duration,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn num_steps(&self) -> usize {
        ((self.duration * self.animation_rate) as usize).max(1)
    }

    pub fn pattern_dir(&self, pattern_id: &str) -> PathBuf {
        self.root.join(&self.hash).join(pattern_id)
    }

    fn index_path(&self, pattern_id: &str) -> PathBuf {
        self.pattern_dir(pattern_id).join("index.json")
    }

    pub fn snapshot_path(&self, pattern_id: &str, step: usize) -> PathBuf {
        let low = step / 1000 * 1000;
        let high = low + 999;
        self.pattern_dir(pattern_id)
            .join(format!("{:06}-{:06}", low, high))
            .join(format!("{:06}.bin", step))
    }

    fn frame_len(&self) -> usize {
        self.layout.total_leds() * 3
    }

    /// Replay from disk if present, otherwise record `live` and replay that.
    /// The replay keeps the masks of `live`'s segments.
    pub fn load_or_record(&self, pattern_id: &str, live: &mut dyn Pattern) -> Result<CachedPattern, CacheError> {
        let mut cached = match self.load(pattern_id) {
            Ok(cached) => {
                log::info!("Pattern {} served from cache ({} steps)", pattern_id, cached.frames.len());
                cached
            }
            Err(e) => {
                log::info!("Pattern {} not cached: {}", pattern_id, e);
                self.record(pattern_id, live)?;
                self.load(pattern_id)?
            }
        };
        cached.copy_masks(live.segments());
        Ok(cached)
    }

    pub fn load(&self, pattern_id: &str) -> Result<CachedPattern, CacheError> {
        let path = self.index_path(pattern_id);
        let text = fs::read_to_string(&path).map_err(|e| CacheError::io(&path, e))?;
        let index: CacheIndex =
            serde_json::from_str(&text).map_err(|source| CacheError::Index { path: path.clone(), source })?;
        if index.num_steps == 0 {
            return Err(CacheError::Empty(path));
        }

        let expected = self.frame_len();
        let mut frames = Vec::with_capacity(index.num_steps);
        for step in 0..index.num_steps {
            let path = self.snapshot_path(pattern_id, step);
            let bytes = fs::read(&path).map_err(|e| CacheError::io(&path, e))?;
            if bytes.len() != expected {
                return Err(CacheError::SnapshotSize { path, expected, actual: bytes.len() });
            }
            frames.push(bytes);
        }

        let filter = SegmentFilter {
            include: index.include_segments,
            exclude: index.exclude_segments,
        };
        Ok(CachedPattern::new(self.layout.segments(), filter, frames))
    }

    /// Drive `live` for the cache duration and persist one snapshot per tick.
    /// The index is written last so an interrupted recording reads as a miss.
    pub fn record(&self, pattern_id: &str, live: &mut dyn Pattern) -> Result<(), CacheError> {
        let dir = self.pattern_dir(pattern_id);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;
        }

        let steps = self.num_steps();
        let delta = 1.0 / self.animation_rate;
        log::info!("Caching pattern {} ({} steps)", pattern_id, steps);

        live.reset();
        for step in 0..steps {
            live.animate(delta);
            let path = self.snapshot_path(pattern_id, step);
            write_file(&path, &snapshot(live.segments()))?;
        }
        live.reset();

        let filter = live.filter();
        let index = CacheIndex {
            num_steps: steps,
            include_segments: filter.include.clone(),
            exclude_segments: filter.exclude.clone(),
        };
        let json = serde_json::to_vec(&index).unwrap_or_default();
        write_file(&self.index_path(pattern_id), &json)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| CacheError::io(path, e))
}

fn snapshot(segments: &[Segment]) -> Vec<u8> {
    segments
        .iter()
        .flat_map(|s| s.colors.iter().flat_map(|c| c.channels()))
        .collect()
}

/// A pattern replaying recorded snapshots, looping after the last step.
pub struct CachedPattern {
    frames: Vec<Vec<u8>>,
    step: usize,

    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl CachedPattern {
    pub fn new(segments: Vec<Segment>, filter: SegmentFilter, frames: Vec<Vec<u8>>) -> Self {
        Self { frames, step: 0, segments, filter }
    }

    pub fn num_steps(&self) -> usize {
        self.frames.len()
    }

    /// Take over the masks of the same-uid segments in `source`.
    pub fn copy_masks(&mut self, source: &[Segment]) {
        for segment in &mut self.segments {
            if let Some(s) = source.iter().find(|s| s.uid == segment.uid) {
                segment.mask = s.mask;
            }
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Pattern for CachedPattern {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn reset(&mut self) {
        self.step = 0;
    }

    fn animate(&mut self, _delta: f32) {
        let Some(frame) = self.frames.get(self.step) else {
            return;
        };
        let mut bytes = frame.chunks_exact(3);
        for segment in &mut self.segments {
            for (color, rgb) in segment.colors.iter_mut().zip(&mut bytes) {
                *color = Rgb::new(rgb[0], rgb[1], rgb[2]);
            }
        }
        self.step = (self.step + 1) % self.frames.len();
    }

    fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    fn filter(&self) -> &SegmentFilter {
        &self.filter
    }
}
