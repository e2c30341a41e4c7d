use serde::{Deserialize, Serialize};

/// The active layer set for one tick: one base, at most one replacement and
/// any number of overlays in application order.
///
/// Field names follow the mirroring wire format.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixSpec {
    #[serde(rename = "current_pattern_id")]
    pub base: String,
    #[serde(rename = "replace_pattern_ids", default)]
    pub replace: Vec<String>,
    #[serde(rename = "current_effect_pattern_ids", default)]
    pub effects: Vec<String>,
}

impl MixSpec {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into(), ..Default::default() }
    }

    /// Every referenced id once, base first, in layer order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(1 + self.replace.len() + self.effects.len());
        for id in std::iter::once(&self.base).chain(&self.replace).chain(&self.effects) {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
