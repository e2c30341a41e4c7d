use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use artcar_lights::color::Rgb;
use artcar_lights::mix_spec::MixSpec;
use artcar_lights::pattern_config::{PatternConfig, PatternEntry};
use artcar_lights::patterns::{PatternKind, SolidParams, SparkleParams};
use artcar_lights::selector::{Command, Indicators, InputHandle, Selector};

const PERIOD: Duration = Duration::from_secs(600);

#[derive(Clone, Default)]
struct Lit(Arc<Mutex<BTreeSet<String>>>);

impl Lit {
    fn ids(&self) -> Vec<String> {
        self.0.lock().iter().cloned().collect()
    }
}

impl Indicators for Lit {
    fn activate(&mut self, id: &str) {
        self.0.lock().insert(id.to_owned());
    }

    fn deactivate(&mut self, id: &str) {
        self.0.lock().remove(id);
    }
}

fn solid() -> PatternKind {
    PatternKind::Solid(SolidParams::default())
}

fn config() -> PatternConfig {
    PatternConfig {
        rotation: vec![PatternEntry::new("a", solid()), PatternEntry::new("b", solid()), PatternEntry::new("c", solid())],
        manual: vec![PatternEntry::new("m", solid())],
        special_effects: vec![
            PatternEntry::new("sparkle", PatternKind::Sparkle(SparkleParams::default())),
            PatternEntry::new("flash", solid()),
        ],
        eyes: vec![PatternEntry::new("e1", solid()), PatternEntry::new("e2", solid())],
    }
}

struct Setup {
    selector: Selector,
    inputs: InputHandle,
    lit: Lit,
    t0: Instant,
}

fn setup() -> Setup {
    let t0 = Instant::now();
    let inputs = InputHandle::new();
    let lit = Lit::default();
    let selector = Selector::new(&config(), None, PERIOD, t0, inputs.clone(), Box::new(lit.clone()));
    Setup { selector, inputs, lit, t0 }
}

fn resets(commands: &[Command], id: &str) -> usize {
    commands.iter().filter(|c| **c == Command::Reset(id.to_owned())).count()
}

#[test]
fn starts_on_first_rotation_pattern() {
    let mut s = setup();
    assert_eq!(s.selector.tick(s.t0).spec, MixSpec::new("a"));
    assert_eq!(s.lit.ids(), vec!["a"]);
}

#[test]
fn base_switch_resets_rotation_timer() {
    let mut s = setup();
    s.selector.tick(s.t0);

    let pressed_at = s.t0 + PERIOD / 2;
    s.inputs.press("b");
    assert_eq!(s.selector.tick(pressed_at).spec.base, "b");
    assert_eq!(s.lit.ids(), vec!["b"]);

    // a full period after the press, not after startup
    assert_eq!(s.selector.tick(s.t0 + PERIOD).spec.base, "b");
    assert_eq!(s.selector.tick(pressed_at + PERIOD - Duration::from_millis(1)).spec.base, "b");
    assert_eq!(s.selector.tick(pressed_at + PERIOD).spec.base, "c");
}

#[test]
fn rotation_cycles_in_order() {
    let mut s = setup();
    let mut seen = vec![s.selector.tick(s.t0).spec.base];
    let step = Duration::from_secs(1);
    let mut now = s.t0;
    while seen.len() < 5 {
        now += step;
        let base = s.selector.tick(now).spec.base;
        if base != *seen.last().unwrap() {
            assert_eq!(now - s.t0, PERIOD * seen.len() as u32);
            seen.push(base);
        }
    }
    assert_eq!(seen, vec!["a", "b", "c", "a", "b"]);
}

#[test]
fn manual_pattern_is_not_rotated_away() {
    let mut s = setup();
    s.inputs.press("m");
    assert_eq!(s.selector.tick(s.t0).spec.base, "m");
    assert_eq!(s.selector.tick(s.t0 + PERIOD * 3).spec.base, "m");

    // rotation resumes from the pressed pattern
    s.inputs.press("b");
    s.selector.tick(s.t0 + PERIOD * 3);
    assert_eq!(s.selector.tick(s.t0 + PERIOD * 4).spec.base, "c");
}

#[test]
fn effect_toggle_resets_once() {
    let mut s = setup();
    s.inputs.press("sparkle");
    let selection = s.selector.tick(s.t0);
    assert_eq!(selection.spec.effects, vec!["sparkle"]);
    assert_eq!(resets(&selection.commands, "sparkle"), 0);
    assert!(s.lit.ids().contains(&"sparkle".to_owned()));

    s.inputs.press("sparkle");
    assert_eq!(s.selector.tick(s.t0).spec.effects, vec!["sparkle"]);

    s.inputs.release("sparkle");
    let selection = s.selector.tick(s.t0);
    assert!(selection.spec.effects.is_empty());
    assert_eq!(resets(&selection.commands, "sparkle"), 1);
    assert!(!s.lit.ids().contains(&"sparkle".to_owned()));

    assert_eq!(resets(&s.selector.tick(s.t0).commands, "sparkle"), 0);
}

#[test]
fn effects_keep_press_order() {
    let mut s = setup();
    s.inputs.press("flash");
    s.inputs.press("sparkle");
    assert_eq!(s.selector.tick(s.t0).spec.effects, vec!["flash", "sparkle"]);
}

#[test]
fn eyes_are_mutually_exclusive() {
    let mut s = setup();
    let mut now = s.t0;
    for id in ["e1", "e2", "e2", "e1", "e1", "e2"] {
        s.inputs.press(id);
        now += Duration::from_millis(50);
        let spec = s.selector.tick(now).spec;
        assert!(spec.replace.len() <= 1);
    }

    s.inputs.press("e1");
    assert_eq!(s.selector.tick(now).spec.replace, vec!["e1"]);
    s.inputs.press("e2");
    assert_eq!(s.selector.tick(now).spec.replace, vec!["e2"]);
    assert!(!s.lit.ids().contains(&"e1".to_owned()));
    s.inputs.press("e2");
    assert!(s.selector.tick(now).spec.replace.is_empty());
    assert!(!s.lit.ids().contains(&"e2".to_owned()));
}

#[test]
fn unknown_ids_are_ignored() {
    let mut s = setup();
    s.inputs.press("9x9");
    s.inputs.release("nope");
    let selection = s.selector.tick(s.t0);
    assert_eq!(selection.spec, MixSpec::new("a"));
    assert!(selection.commands.is_empty());
}

#[test]
fn remote_update_replaces_selection() {
    let mut s = setup();
    s.inputs.press("sparkle");
    s.inputs.press("flash");
    s.selector.tick(s.t0);

    let later = s.t0 + PERIOD / 2;
    s.inputs.remote(MixSpec {
        base: "c".into(),
        replace: vec!["e2".into(), "e1".into()],
        effects: vec!["flash".into(), "unknown".into()],
    });
    let selection = s.selector.tick(later);
    assert_eq!(selection.spec.base, "c");
    assert_eq!(selection.spec.replace, vec!["e2"]);
    assert_eq!(selection.spec.effects, vec!["flash"]);
    assert_eq!(resets(&selection.commands, "sparkle"), 1);
    assert_eq!(resets(&selection.commands, "flash"), 0);
    assert_eq!(s.lit.ids(), vec!["c", "e2", "flash"]);

    // the new base restarted the timer
    assert_eq!(s.selector.tick(s.t0 + PERIOD).spec.base, "c");
    assert_eq!(s.selector.tick(later + PERIOD).spec.base, "a");
}

#[test]
fn console_colour_follows_base() {
    let mut s = setup();
    s.inputs.set_color(Rgb::new(10, 20, 30));
    let selection = s.selector.tick(s.t0);
    assert_eq!(selection.commands, vec![Command::SetColor("a".into(), Some(Rgb::new(10, 20, 30)))]);

    s.inputs.press("m");
    let selection = s.selector.tick(s.t0);
    assert_eq!(
        selection.commands,
        vec![
            Command::SetColor("a".into(), None),
            Command::SetColor("m".into(), Some(Rgb::new(10, 20, 30))),
        ]
    );

    s.inputs.console_lost();
    let selection = s.selector.tick(s.t0);
    assert_eq!(selection.commands, vec![Command::SetColor("m".into(), None)]);
    assert!(s.selector.tick(s.t0).commands.is_empty());
}
