use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::segment::{LedLayout, Segment};

/// Which of a pattern's segments it affects when layered as a replacement.
///
/// `include` wins when non-empty, otherwise `exclude` removes segments from
/// the full set. A filter with both lists populated is rejected at load time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentFilter {
    #[serde(default, rename = "include_segments", skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<u8>,
    #[serde(default, rename = "exclude_segments", skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<u8>,
}

impl SegmentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn include(uids: impl IntoIterator<Item = u8>) -> Self {
        Self { include: uids.into_iter().collect(), exclude: Vec::new() }
    }

    pub fn exclude(uids: impl IntoIterator<Item = u8>) -> Self {
        Self { include: Vec::new(), exclude: uids.into_iter().collect() }
    }

    pub fn is_valid(&self) -> bool {
        self.include.is_empty() || self.exclude.is_empty()
    }

    pub fn selects(&self, uid: u8) -> bool {
        if !self.include.is_empty() {
            self.include.contains(&uid)
        } else {
            !self.exclude.contains(&uid)
        }
    }
}

/// The contract every visual effect satisfies, whether computed live or
/// replayed from the cache.
///
/// `animate` runs on the scheduler thread and must never block on I/O.
pub trait Pattern: Send {
    /// Bind to the object's segments. Called once, before `initialize`.
    fn prepare_segments(&mut self, layout: &LedLayout);

    fn initialize(&mut self) {}

    /// Back to the initial visual state. Idempotent.
    fn reset(&mut self);

    fn animate(&mut self, delta: f32);

    fn segments(&self) -> &[Segment];

    fn segments_mut(&mut self) -> &mut [Segment];

    fn filter(&self) -> &SegmentFilter;

    /// Console colour override. Patterns without a colour parameter ignore it.
    fn set_color(&mut self, _color: Option<Rgb>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_selection() {
        assert!(SegmentFilter::all().selects(7));
        assert!(SegmentFilter::include([1, 2]).selects(2));
        assert!(!SegmentFilter::include([1, 2]).selects(3));
        assert!(!SegmentFilter::exclude([3]).selects(3));
        assert!(SegmentFilter::exclude([3]).selects(4));
    }

    #[test]
    fn both_lists_invalid() {
        let filter = SegmentFilter { include: vec![1], exclude: vec![2] };
        assert!(!filter.is_valid());
        assert!(SegmentFilter::include([1]).is_valid());
    }
}
