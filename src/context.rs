use std::time::Instant;

use anyhow::Context as _;

use crate::cache::PatternCache;
use crate::config::Config;
use crate::input::{self, launchpad};
use crate::library::PatternLibrary;
use crate::mixer::Mixer;
use crate::output::{self, OpcLink, SerialLink};
use crate::pattern_config::PatternConfig;
use crate::scheduler::{Pipeline, Scheduler};
use crate::segment::LedLayout;
use crate::selector::{Indicators, InputHandle, NoIndicators, Selector};

/// Owns the run configuration and wires devices, pipelines and links
/// together.
pub struct Context {
    config: Config,
    patterns: PatternConfig,
    inputs: InputHandle,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let patterns = config.patterns();
        Self { config, patterns, inputs: InputHandle::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn inputs(&self) -> &InputHandle {
        &self.inputs
    }

    /// One pipeline per object. Recording missing cache entries happens here
    /// and can take a while.
    pub fn pipelines(&self) -> anyhow::Result<Vec<Pipeline>> {
        let settings = &self.config.settings;
        let mut pipelines = Vec::with_capacity(self.config.objects.len());

        for object in &self.config.objects {
            let layout = LedLayout::load(&object.led_config)
                .with_context(|| format!("loading LED layout of {}", object.id))?;
            log::info!("{}: {} segments, {} leds", object.id, layout.led_segments.len(), layout.total_leds());

            let mut library = PatternLibrary::new(&self.patterns, &layout)
                .with_context(|| format!("building patterns of {}", object.id))?;
            if let Some(cache) = &settings.cache {
                let cache = PatternCache::new(&cache.directory, &layout, settings.animation_rate, cache.duration);
                library.use_cache(&cache);
            }

            pipelines.push(Pipeline::new(object.id.as_str(), library, Mixer::new(&layout)));
        }
        Ok(pipelines)
    }

    fn indicators(&self) -> Box<dyn Indicators> {
        match &self.config.launchpad {
            Some(pad) => Box::new(launchpad::spawn(
                pad.port.clone(),
                self.inputs.clone(),
                self.config.settings.reconnect_interval(),
            )),
            None => Box::new(NoIndicators),
        }
    }

    pub fn scheduler(&self) -> anyhow::Result<Scheduler> {
        let settings = &self.config.settings;
        let pipelines = self.pipelines()?;

        let now = Instant::now();
        let selector = Selector::new(
            &self.patterns,
            settings.initial_pattern.as_deref(),
            settings.rotation_period(),
            now,
            self.inputs.clone(),
            self.indicators(),
        );
        Ok(Scheduler::new(selector, pipelines, settings.animation_rate, settings.fps_report_interval(), now))
    }

    /// Device polling and remote control tasks.
    pub fn spawn_inputs(&self) {
        let backoff = self.config.settings.reconnect_interval();

        if let Some(dmx) = self.config.dmx.clone() {
            tokio::spawn(input::run_dmx(dmx, self.inputs.clone(), backoff));
        }

        if let Some(port) = self.config.buttons_port {
            let inputs = self.inputs.clone();
            tokio::spawn(async move {
                if let Err(e) = input::serve_buttons(port, inputs).await {
                    log::error!("Buttons server stopped: {:#}", e);
                }
            });
        }

        if let Some(uri) = self.config.mirror.as_ref().and_then(|m| m.subscribe_uri.clone()) {
            tokio::spawn(input::run_mirror(uri, self.inputs.clone(), backoff));
        }
    }

    /// One task per output link, each following its object's frames.
    pub fn spawn_outputs(&self, scheduler: &Scheduler) {
        let backoff = self.config.settings.reconnect_interval();

        for (object, pipeline) in self.config.objects.iter().zip(scheduler.pipelines()) {
            for serial in &object.serial {
                tokio::spawn(output::drive(SerialLink::new(serial.clone()), pipeline.frames(), backoff));
            }

            if let Some(opc) = &object.opc {
                tokio::spawn(output::drive(OpcLink::new(opc.clone()), pipeline.frames(), backoff));
            }

            if let Some(viz) = &object.visualizer {
                let (port, frames) = (viz.port, pipeline.frames());
                tokio::spawn(async move {
                    if let Err(e) = output::serve_visualizer(port, frames).await {
                        log::error!("Visualizer stopped: {:#}", e);
                    }
                });
            }
        }

        if let Some(port) = self.config.mirror.as_ref().and_then(|m| m.publish_port) {
            let specs = scheduler.mix_specs();
            tokio::spawn(async move {
                if let Err(e) = output::serve_mix_specs(port, specs).await {
                    log::error!("Mirror publisher stopped: {:#}", e);
                }
            });
        }
    }
}
