use std::collections::HashMap;

use crate::cache::PatternCache;
use crate::error::ConfigError;
use crate::mix_spec::MixSpec;
use crate::pattern::Pattern;
use crate::pattern_config::{Group, PatternConfig};
use crate::segment::LedLayout;
use crate::selector::Command;

/// Every pattern instance for one object, addressable by id.
pub struct PatternLibrary {
    patterns: HashMap<String, Box<dyn Pattern>>,
    groups: HashMap<String, Group>,
}

impl PatternLibrary {
    pub fn new(config: &PatternConfig, layout: &LedLayout) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut patterns = HashMap::new();
        let mut groups = HashMap::new();
        for (group, entry) in config.entries() {
            let mut pattern = entry.spec.build();
            pattern.prepare_segments(layout);
            for m in &entry.spec.masks {
                match pattern.segments_mut().iter_mut().find(|s| s.uid == m.uid) {
                    Some(segment) => segment.mask = Some(m.mask),
                    None => log::warn!("Pattern {}: mask for unknown segment {} ignored", entry.id, m.uid),
                }
            }
            pattern.initialize();

            patterns.insert(entry.id.clone(), pattern);
            groups.insert(entry.id.clone(), group);
        }

        Ok(Self { patterns, groups })
    }

    /// Swap live patterns for cache-backed replays. A pattern whose cache
    /// cannot be read or written keeps rendering live.
    pub fn use_cache(&mut self, cache: &PatternCache) {
        let mut ids: Vec<String> = self.patterns.keys().cloned().collect();
        ids.sort();
        for id in ids {
            let Some(live) = self.patterns.get_mut(&id) else { continue };
            match cache.load_or_record(&id, live.as_mut()) {
                Ok(cached) => {
                    self.patterns.insert(id, Box::new(cached));
                }
                Err(e) => log::warn!("Caching of pattern {} failed, rendering live: {}", id, e),
            }
        }
    }

    pub fn group(&self, id: &str) -> Option<Group> {
        self.groups.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Pattern> {
        self.patterns.get(id).map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Pattern + 'static)> {
        self.patterns.get_mut(id).map(|p| p.as_mut())
    }

    pub fn reset(&mut self, id: &str) {
        if let Some(pattern) = self.patterns.get_mut(id) {
            log::trace!("Reset pattern {}", id);
            pattern.reset();
        }
    }

    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::Reset(id) => self.reset(id),
            Command::SetColor(id, color) => {
                if let Some(pattern) = self.patterns.get_mut(id) {
                    pattern.set_color(*color);
                }
            }
        }
    }

    /// Advance every pattern the mix references, each exactly once.
    pub fn animate(&mut self, spec: &MixSpec, delta: f32) {
        for id in spec.ids() {
            if let Some(pattern) = self.patterns.get_mut(id) {
                pattern.animate(delta);
            }
        }
    }
}
