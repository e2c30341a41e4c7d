use std::fs;

use artcar_lights::cache::PatternCache;
use artcar_lights::error::CacheError;
use artcar_lights::library::PatternLibrary;
use artcar_lights::pattern::{Pattern, SegmentFilter};
use artcar_lights::pattern_config::{PatternConfig, PatternEntry};
use artcar_lights::patterns::{PatternKind, PatternSpec, Rainbow, RainbowParams, SolidParams};
use artcar_lights::segment::{LedLayout, Mask};

const RATE: f32 = 20.0;

fn layout() -> LedLayout {
    LedLayout::linear(&[(1, 5), (50, 2)])
}

fn live(filter: SegmentFilter) -> Rainbow {
    let mut rainbow = Rainbow::new(RainbowParams { speed: 1.0, ..Default::default() }, filter);
    rainbow.prepare_segments(&layout());
    rainbow
}

#[test]
fn records_then_replays_in_a_loop() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PatternCache::new(dir.path(), &layout(), RATE, 0.5);
    assert_eq!(cache.num_steps(), 10);

    let mut recorded = live(SegmentFilter::include([50]));
    let mut cached = cache.load_or_record("sweep", &mut recorded).unwrap();
    assert_eq!(cached.num_steps(), 10);
    assert_eq!(cached.filter(), &SegmentFilter::include([50]));
    assert!(cache.pattern_dir("sweep").join("index.json").exists());
    assert!(cache.pattern_dir("sweep").starts_with(dir.path().join(cache.hash())));

    let mut reference = live(SegmentFilter::all());
    let mut first = None;
    for _ in 0..10 {
        reference.animate(1.0 / RATE);
        cached.animate(1.0 / RATE);
        assert_eq!(cached.segments()[0].colors, reference.segments()[0].colors);
        assert_eq!(cached.segments()[1].colors, reference.segments()[1].colors);
        first.get_or_insert_with(|| cached.segments()[0].colors.clone());
    }

    cached.animate(1.0 / RATE);
    assert_eq!(Some(cached.segments()[0].colors.clone()), first);

    cached.reset();
    assert_eq!(cached.step(), 0);
}

#[test]
fn hit_skips_recording() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PatternCache::new(dir.path(), &layout(), RATE, 0.2);
    cache.record("sweep", &mut live(SegmentFilter::all())).unwrap();

    let snapshot = cache.snapshot_path("sweep", 0);
    let recorded = fs::metadata(&snapshot).unwrap().modified().unwrap();
    let cached = cache.load_or_record("sweep", &mut live(SegmentFilter::all())).unwrap();
    assert_eq!(cached.num_steps(), 4);
    assert_eq!(fs::metadata(&snapshot).unwrap().modified().unwrap(), recorded);
}

#[test]
fn corrupt_snapshot_is_rerecorded() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PatternCache::new(dir.path(), &layout(), RATE, 0.2);
    cache.record("sweep", &mut live(SegmentFilter::all())).unwrap();

    fs::write(cache.snapshot_path("sweep", 2), [0u8; 3]).unwrap();
    assert!(matches!(cache.load("sweep"), Err(CacheError::SnapshotSize { expected: 21, actual: 3, .. })));

    let cached = cache.load_or_record("sweep", &mut live(SegmentFilter::all())).unwrap();
    assert_eq!(cached.num_steps(), 4);
}

#[test]
fn layout_change_misses() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PatternCache::new(dir.path(), &layout(), RATE, 0.2);
    cache.record("sweep", &mut live(SegmentFilter::all())).unwrap();

    let other = PatternCache::new(dir.path(), &LedLayout::linear(&[(1, 6)]), RATE, 0.2);
    assert_ne!(other.hash(), cache.hash());
    assert!(matches!(other.load("sweep"), Err(CacheError::Io { .. })));
}

#[test]
fn library_serves_cached_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let layout = layout();
    let cache = PatternCache::new(dir.path(), &layout, RATE, 0.1);

    let mut library = PatternLibrary::new(&PatternConfig::builtin(), &layout).unwrap();
    library.use_cache(&cache);
    for id in ["0x0", "1x0", "0x2", "1x3"] {
        assert!(cache.pattern_dir(id).join("index.json").exists(), "{} not cached", id);
        assert!(library.get(id).is_some());
    }
    assert_eq!(library.get("1x3").unwrap().filter(), &SegmentFilter::include([50, 51]));
}

#[test]
fn empty_index_is_rerecorded() {
    let dir = tempfile::tempdir().unwrap();
    let cache = PatternCache::new(dir.path(), &layout(), RATE, 0.2);
    cache.record("sweep", &mut live(SegmentFilter::all())).unwrap();

    fs::write(cache.pattern_dir("sweep").join("index.json"), r#"{ "num_steps": 0 }"#).unwrap();
    assert!(matches!(cache.load("sweep"), Err(CacheError::Empty(_))));

    let cached = cache.load_or_record("sweep", &mut live(SegmentFilter::all())).unwrap();
    assert_eq!(cached.num_steps(), 4);
}

#[test]
fn cached_patterns_keep_their_masks() {
    let dir = tempfile::tempdir().unwrap();
    let layout = layout();
    let cache = PatternCache::new(dir.path(), &layout, RATE, 0.1);

    let solid = PatternSpec::new(PatternKind::Solid(SolidParams::default())).mask(1, Mask::new(1, 3));
    let config = PatternConfig { manual: vec![PatternEntry::new("masked", solid)], ..Default::default() };

    // first pass records, second one is a cache hit
    for _ in 0..2 {
        let mut library = PatternLibrary::new(&config, &layout).unwrap();
        library.use_cache(&cache);
        let segments = library.get("masked").unwrap().segments();
        assert_eq!(segments[0].mask, Some(Mask::new(1, 3)));
        assert_eq!(segments[1].mask, None);
    }
}
