use artcar_lights::color::Rgb;
use artcar_lights::mixer::{Layers, Mixer};
use artcar_lights::pattern::{Pattern, SegmentFilter};
use artcar_lights::segment::{LedLayout, Mask, Segment};

/// Paints every bound LED one colour.
struct Fill {
    color: Rgb,
    segments: Vec<Segment>,
    filter: SegmentFilter,
}

impl Fill {
    fn new(layout: &LedLayout, color: Rgb, filter: SegmentFilter) -> Self {
        let mut fill = Self { color, segments: Vec::new(), filter };
        fill.prepare_segments(layout);
        fill.animate(0.0);
        fill
    }

    fn masked(mut self, uid: u8, mask: Mask) -> Self {
        for s in self.segments.iter_mut().filter(|s| s.uid == uid) {
            s.mask = Some(mask);
        }
        self
    }
}

impl Pattern for Fill {
    fn prepare_segments(&mut self, layout: &LedLayout) {
        self.segments = layout.segments();
    }

    fn reset(&mut self) {}

    fn animate(&mut self, _delta: f32) {
        for s in &mut self.segments {
            s.fill(self.color);
        }
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

fn layout() -> LedLayout {
    LedLayout::linear(&[(1, 4), (2, 4), (50, 2)])
}

#[test]
fn mix_layers_saturate() {
    let layout = layout();
    let base = Fill::new(&layout, Rgb::new(200, 0, 10), SegmentFilter::all());
    let a = Fill::new(&layout, Rgb::new(100, 100, 0), SegmentFilter::all());
    let b = Fill::new(&layout, Rgb::new(100, 100, 0), SegmentFilter::all());

    let mut mixer = Mixer::new(&layout);
    let out = mixer.mix(&Layers { base: &base, replace: None, mix: vec![&a as &dyn Pattern, &b] });
    for segment in out {
        assert!(segment.colors.iter().all(|c| *c == Rgb::new(255, 200, 10)));
    }
}

#[test]
fn many_mix_layers_never_wrap() {
    let layout = layout();
    let base = Fill::new(&layout, Rgb::new(250, 250, 250), SegmentFilter::all());
    let layers: Vec<Fill> = (0..8).map(|_| Fill::new(&layout, Rgb::new(255, 1, 60), SegmentFilter::all())).collect();

    let mut mixer = Mixer::new(&layout);
    let out = mixer.mix(&Layers {
        base: &base,
        replace: None,
        mix: layers.iter().map(|l| l as &dyn Pattern).collect(),
    });
    assert_eq!(out[0].colors[0], Rgb::new(255, 255, 255));
}

#[test]
fn replace_touches_only_selected_segments() {
    let layout = layout();
    let base = Fill::new(&layout, Rgb::BLUE, SegmentFilter::all());
    let eyes = Fill::new(&layout, Rgb::RED, SegmentFilter::include([50]));

    let mut mixer = Mixer::new(&layout);
    let out = mixer.mix(&Layers { base: &base, replace: Some(&eyes), mix: vec![] });
    assert_eq!(out[0].colors, vec![Rgb::BLUE; 4]);
    assert_eq!(out[1].colors, vec![Rgb::BLUE; 4]);
    assert_eq!(out[2].colors, vec![Rgb::RED; 2]);

    let not_eyes = Fill::new(&layout, Rgb::LIME, SegmentFilter::exclude([50]));
    let out = mixer.mix(&Layers { base: &base, replace: Some(&not_eyes), mix: vec![] });
    assert_eq!(out[0].colors, vec![Rgb::LIME; 4]);
    assert_eq!(out[2].colors, vec![Rgb::BLUE; 2]);
}

#[test]
fn masks_limit_writes() {
    let layout = layout();
    let base = Fill::new(&layout, Rgb::BLUE, SegmentFilter::all()).masked(1, Mask::new(0, 2));
    let overlay = Fill::new(&layout, Rgb::RED, SegmentFilter::all()).masked(1, Mask::new(1, 3));

    let mut mixer = Mixer::new(&layout);
    let out = mixer.mix(&Layers { base: &base, replace: None, mix: vec![&overlay as &dyn Pattern] });
    assert_eq!(
        out[0].colors,
        vec![Rgb::BLUE, Rgb::new(255, 0, 255), Rgb::RED, Rgb::OFF]
    );
    assert_eq!(out[1].colors, vec![Rgb::MAGENTA; 4]);
}

#[test]
fn every_tick_starts_from_black() {
    let layout = layout();
    let white = Fill::new(&layout, Rgb::WHITE, SegmentFilter::all());
    let masked = Fill::new(&layout, Rgb::RED, SegmentFilter::all()).masked(2, Mask::new(0, 1));

    let mut mixer = Mixer::new(&layout);
    mixer.mix(&Layers { base: &white, replace: None, mix: vec![] });
    let out = mixer.mix(&Layers { base: &masked, replace: None, mix: vec![] });
    assert_eq!(out[1].colors, vec![Rgb::RED, Rgb::OFF, Rgb::OFF, Rgb::OFF]);
}
