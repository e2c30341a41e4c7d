use std::sync::Arc;

use crate::color::Rgb;
use crate::pattern::Pattern;
use crate::segment::{LedLayout, Segment};

/// One compositor output for one object. Never mutated once published.
#[derive(Clone, Debug)]
pub struct Frame {
    pub object_id: Arc<str>,
    pub tick: u64,
    pub segments: Vec<Segment>,
}

impl Frame {
    pub fn segment(&self, uid: u8) -> Option<&Segment> {
        self.segments.iter().find(|s| s.uid == uid)
    }
}

/// Resolved layers for one tick.
pub struct Layers<'a> {
    pub base: &'a dyn Pattern,
    pub replace: Option<&'a dyn Pattern>,
    pub mix: Vec<&'a dyn Pattern>,
}

/// Composites base, replace and mix layers into per-segment buffers.
pub struct Mixer {
    segments: Vec<Segment>,
}

impl Mixer {
    pub fn new(layout: &LedLayout) -> Self {
        Self { segments: layout.segments() }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn mix(&mut self, layers: &Layers<'_>) -> &[Segment] {
        for (index, segment) in self.segments.iter_mut().enumerate() {
            segment.fill(Rgb::OFF);

            if let Some(source) = counterpart(layers.base.segments(), segment.uid, index) {
                copy(segment, source);
            }

            if let Some(replace) = layers.replace {
                if replace.filter().selects(segment.uid) {
                    if let Some(source) = counterpart(replace.segments(), segment.uid, index) {
                        copy(segment, source);
                    }
                }
            }

            // list order matters once a channel saturates
            for pattern in &layers.mix {
                if let Some(source) = counterpart(pattern.segments(), segment.uid, index) {
                    add(segment, source);
                }
            }
        }
        &self.segments
    }
}

/// Same-uid segment of a source pattern; usually at the same index.
fn counterpart(segments: &[Segment], uid: u8, index: usize) -> Option<&Segment> {
    match segments.get(index) {
        Some(s) if s.uid == uid => Some(s),
        _ => segments.iter().find(|s| s.uid == uid),
    }
}

fn copy(dst: &mut Segment, src: &Segment) {
    let range = clip(src, dst);
    dst.colors[range.clone()].copy_from_slice(&src.colors[range]);
}

fn add(dst: &mut Segment, src: &Segment) {
    let range = clip(src, dst);
    for (d, s) in dst.colors[range.clone()].iter_mut().zip(&src.colors[range]) {
        d.r = saturating_add(d.r, s.r);
        d.g = saturating_add(d.g, s.g);
        d.b = saturating_add(d.b, s.b);
    }
}

/// Clamp the accumulator to `255 - source` first so the sum cannot wrap.
fn saturating_add(acc: u8, source: u8) -> u8 {
    let cap = 255 - source;
    acc.min(cap) + source
}

fn clip(src: &Segment, dst: &Segment) -> std::ops::Range<usize> {
    let range = src.writable();
    let end = range.end.min(dst.colors.len()).min(src.colors.len());
    range.start.min(end)..end
}
