use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::broadcast::Broadcast;
use crate::mix_spec::MixSpec;
use crate::library::PatternLibrary;
use crate::mixer::{Frame, Layers, Mixer};
use crate::selector::{Selection, Selector};
use crate::time::{self, FpsCounter};

/// Everything rendered for one addressable object.
pub struct Pipeline {
    id: Arc<str>,
    library: PatternLibrary,
    mixer: Mixer,
    frames: Arc<Broadcast<Frame>>,
}

impl Pipeline {
    pub fn new(id: impl Into<Arc<str>>, library: PatternLibrary, mixer: Mixer) -> Self {
        Self {
            id: id.into(),
            library,
            mixer,
            frames: Arc::new(Broadcast::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frames(&self) -> Arc<Broadcast<Frame>> {
        self.frames.clone()
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    fn render(&mut self, selection: &Selection, delta: f32, tick: u64) {
        for command in &selection.commands {
            self.library.apply(command);
        }
        self.library.animate(&selection.spec, delta);

        let spec = &selection.spec;
        let Some(base) = self.library.get(&spec.base) else {
            log::warn!("{}: base pattern {} missing, frame dropped", self.id, spec.base);
            return;
        };
        let layers = Layers {
            base,
            replace: spec.replace.first().and_then(|id| self.library.get(id)),
            mix: spec.effects.iter().filter_map(|id| self.library.get(id)).collect(),
        };
        let segments = self.mixer.mix(&layers).to_vec();

        self.frames.publish(Frame { object_id: self.id.clone(), tick, segments });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The slot had already passed; nothing ran.
    Skipped,
    /// Rendered; the next slot starts at `next`.
    Rendered { next: Instant },
}

/// Fixed-rate driver: selector, animate, mix, publish.
pub struct Scheduler {
    selector: Selector,
    pipelines: Vec<Pipeline>,
    mix_specs: Arc<Broadcast<MixSpec>>,

    period: Duration,
    delta: f32,
    slot: Instant,
    tick: u64,
    fps: FpsCounter,
}

impl Scheduler {
    pub fn new(selector: Selector, pipelines: Vec<Pipeline>, rate: f32, report_interval: Duration, now: Instant) -> Self {
        let period = time::period(rate);
        Self {
            selector,
            pipelines,
            mix_specs: Arc::new(Broadcast::new()),
            period,
            delta: period.as_secs_f32(),
            slot: now,
            tick: 0,
            fps: FpsCounter::new(report_interval, now),
        }
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn mix_specs(&self) -> Arc<Broadcast<MixSpec>> {
        self.mix_specs.clone()
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Run the current slot `[slot, slot + period)` if `now` has not passed
    /// it yet. Patterns always advance by the nominal period.
    pub fn step(&mut self, now: Instant) -> Step {
        let end = self.slot + self.period;
        if now >= end {
            log::warn!("Frame {} skipped, {:?} behind", self.tick, now - self.slot);
            self.slot = end;
            self.fps.skipped();
            return Step::Skipped;
        }

        let selection = self.selector.tick(self.slot);
        for pipeline in &mut self.pipelines {
            pipeline.render(&selection, self.delta, self.tick);
        }
        self.mix_specs.publish(selection.spec);

        self.tick += 1;
        self.slot = end;
        self.fps.rendered();
        if let Some(report) = self.fps.poll(now) {
            log::info!("Animation: {:.1} fps, {} skipped", report.fps, report.skipped);
        }
        Step::Rendered { next: end }
    }

    pub async fn run(mut self) {
        log::info!("Animating {} objects every {:?}", self.pipelines.len(), self.period);
        loop {
            if let Step::Rendered { next } = self.step(Instant::now()) {
                tokio::time::sleep_until(next.into()).await;
            }
        }
    }
}
