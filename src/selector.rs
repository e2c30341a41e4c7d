use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::color::Rgb;
use crate::mix_spec::MixSpec;
use crate::pattern_config::{Group, PatternConfig};

/// Control events accumulated between two ticks.
#[derive(Debug, Default)]
pub struct PendingInputs {
    pub pressed: Vec<String>,
    pub released: Vec<String>,
    pub color: Option<Rgb>,
    pub console_lost: bool,
    pub remote: Option<MixSpec>,
}

/// Cloneable handle input tasks use to feed the selector.
#[derive(Clone, Default)]
pub struct InputHandle {
    pending: Arc<Mutex<PendingInputs>>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, id: impl Into<String>) {
        let id = id.into();
        let mut pending = self.pending.lock();
        if !pending.pressed.contains(&id) {
            pending.pressed.push(id);
        }
    }

    pub fn release(&self, id: impl Into<String>) {
        let id = id.into();
        let mut pending = self.pending.lock();
        if !pending.released.contains(&id) {
            pending.released.push(id);
        }
    }

    pub fn set_color(&self, color: Rgb) {
        let mut pending = self.pending.lock();
        pending.color = Some(color);
        pending.console_lost = false;
    }

    pub fn console_lost(&self) {
        let mut pending = self.pending.lock();
        pending.color = None;
        pending.console_lost = true;
    }

    pub fn remote(&self, spec: MixSpec) {
        self.pending.lock().remote = Some(spec);
    }

    pub fn take(&self) -> PendingInputs {
        std::mem::take(&mut *self.pending.lock())
    }
}

/// Button lights reflecting the selection.
pub trait Indicators: Send {
    fn activate(&mut self, id: &str);
    fn deactivate(&mut self, id: &str);
}

pub struct NoIndicators;

impl Indicators for NoIndicators {
    fn activate(&mut self, _id: &str) {}
    fn deactivate(&mut self, _id: &str) {}
}

/// Side effects the owner of the patterns has to carry out after a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reset(String),
    SetColor(String, Option<Rgb>),
}

#[derive(Debug, Default)]
pub struct Selection {
    pub spec: MixSpec,
    pub commands: Vec<Command>,
}

/// Folds control events and elapsed time into the active layer set.
pub struct Selector {
    groups: HashMap<String, Group>,
    rotation: Vec<String>,
    rotation_index: usize,
    rotation_period: Duration,
    last_switch: Instant,

    base: String,
    eyes: Option<String>,
    effects: Vec<String>,
    console: Option<Rgb>,

    inputs: InputHandle,
    indicators: Box<dyn Indicators>,
}

impl Selector {
    /// `initial` is used when it names a base pattern, otherwise the first
    /// rotation entry (or first manual one) starts.
    pub fn new(
        config: &PatternConfig,
        initial: Option<&str>,
        rotation_period: Duration,
        now: Instant,
        inputs: InputHandle,
        mut indicators: Box<dyn Indicators>,
    ) -> Self {
        let groups: HashMap<String, Group> = config.entries().map(|(g, e)| (e.id.clone(), g)).collect();
        let rotation: Vec<String> = config.rotation.iter().map(|e| e.id.clone()).collect();

        let preferred = initial.filter(|id| match groups.get(*id) {
            Some(Group::Rotation | Group::Manual) => true,
            _ => {
                log::warn!("Initial pattern {} is not a base pattern, ignoring", id);
                false
            }
        });
        let base = preferred
            .map(str::to_owned)
            .or_else(|| rotation.first().cloned())
            .or_else(|| config.manual.first().map(|e| e.id.clone()))
            .unwrap_or_default();
        let rotation_index = rotation.iter().position(|id| *id == base).unwrap_or(0);

        indicators.activate(&base);
        log::info!("Starting with pattern {}", base);

        Self {
            groups,
            rotation,
            rotation_index,
            rotation_period,
            last_switch: now,
            base,
            eyes: None,
            effects: Vec::new(),
            console: None,
            inputs,
            indicators,
        }
    }

    pub fn inputs(&self) -> &InputHandle {
        &self.inputs
    }

    pub fn spec(&self) -> MixSpec {
        MixSpec {
            base: self.base.clone(),
            replace: self.eyes.iter().cloned().collect(),
            effects: self.effects.clone(),
        }
    }

    pub fn tick(&mut self, now: Instant) -> Selection {
        let PendingInputs { pressed, released, color, console_lost, remote } = self.inputs.take();
        let mut commands = Vec::new();

        if let Some(spec) = remote {
            self.apply_remote(spec, now, &mut commands);
        }

        for id in &pressed {
            self.press(id, now, &mut commands);
        }

        for id in &released {
            if self.groups.get(id) == Some(&Group::SpecialEffect) {
                log::debug!("Effect {} released", id);
                self.effects.retain(|e| e != id);
                self.indicators.deactivate(id);
                commands.push(Command::Reset(id.clone()));
            }
        }

        if self.rotates() && now.saturating_duration_since(self.last_switch) >= self.rotation_period {
            self.rotation_index = (self.rotation_index + 1) % self.rotation.len();
            let next = self.rotation[self.rotation_index].clone();
            log::info!("Rotating to pattern {}", next);
            self.switch_base(next, now, &mut commands);
        }

        if console_lost && self.console.take().is_some() {
            log::info!("Console lost, clearing colour override");
            commands.push(Command::SetColor(self.base.clone(), None));
        }
        if let Some(color) = color {
            self.console = Some(color);
        }
        if let Some(color) = self.console {
            commands.push(Command::SetColor(self.base.clone(), Some(color)));
        }

        Selection { spec: self.spec(), commands }
    }

    fn rotates(&self) -> bool {
        !self.rotation.is_empty() && self.groups.get(&self.base) == Some(&Group::Rotation)
    }

    fn press(&mut self, id: &str, now: Instant, commands: &mut Vec<Command>) {
        match self.groups.get(id).copied() {
            Some(Group::Rotation) => {
                log::debug!("Rotation pattern {} selected", id);
                if let Some(index) = self.rotation.iter().position(|r| r == id) {
                    self.rotation_index = index;
                }
                self.switch_base(id.to_owned(), now, commands);
            }
            Some(Group::Manual) => {
                log::debug!("Manual pattern {} selected", id);
                self.switch_base(id.to_owned(), now, commands);
            }
            Some(Group::SpecialEffect) => {
                if !self.effects.iter().any(|e| e == id) {
                    log::debug!("Effect {} pressed", id);
                    self.effects.push(id.to_owned());
                    self.indicators.activate(id);
                }
            }
            Some(Group::Eyes) => {
                let previous = self.eyes.take();
                if let Some(previous) = &previous {
                    self.indicators.deactivate(previous);
                }
                if previous.as_deref() != Some(id) {
                    log::debug!("Eyes {} on", id);
                    self.indicators.activate(id);
                    self.eyes = Some(id.to_owned());
                } else {
                    log::debug!("Eyes {} off", id);
                }
            }
            None => log::trace!("Ignoring unknown button {}", id),
        }
    }

    fn switch_base(&mut self, id: String, now: Instant, commands: &mut Vec<Command>) {
        self.indicators.deactivate(&self.base);
        if self.console.is_some() && self.base != id {
            commands.push(Command::SetColor(self.base.clone(), None));
        }
        self.base = id;
        self.indicators.activate(&self.base);
        self.last_switch = now;
    }

    fn apply_remote(&mut self, spec: MixSpec, now: Instant, commands: &mut Vec<Command>) {
        match self.groups.get(&spec.base) {
            Some(Group::Rotation | Group::Manual) => {
                if spec.base != self.base {
                    log::debug!("Remote base {}", spec.base);
                    if let Some(index) = self.rotation.iter().position(|r| *r == spec.base) {
                        self.rotation_index = index;
                    }
                    self.switch_base(spec.base.clone(), now, commands);
                }
            }
            _ => log::trace!("Ignoring remote base {}", spec.base),
        }

        let eyes = spec
            .replace
            .iter()
            .find(|id| self.groups.get(*id) == Some(&Group::Eyes))
            .cloned();
        if eyes != self.eyes {
            if let Some(previous) = &self.eyes {
                self.indicators.deactivate(previous);
            }
            if let Some(id) = &eyes {
                self.indicators.activate(id);
            }
            self.eyes = eyes;
        }

        let effects: Vec<String> = spec
            .effects
            .into_iter()
            .filter(|id| self.groups.get(id) == Some(&Group::SpecialEffect))
            .collect();
        for id in &self.effects {
            if !effects.contains(id) {
                self.indicators.deactivate(id);
                commands.push(Command::Reset(id.clone()));
            }
        }
        for id in &effects {
            if !self.effects.contains(id) {
                self.indicators.activate(id);
            }
        }
        self.effects = effects;
    }
}
