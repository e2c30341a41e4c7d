use artcar_lights::config::{Config, DEFAULT_PATH};
use artcar_lights::context::Context;
use artcar_lights::error::ConfigError;
use artcar_lights::library::PatternLibrary;
use artcar_lights::segment::LedLayout;

#[test]
fn bundled_config_loads() {
    let config = Config::load(DEFAULT_PATH).unwrap();
    let car = &config.objects[0];
    assert!(car.led_config.ends_with("config/car.json"));

    let layout = LedLayout::load(&car.led_config).unwrap();
    assert_eq!(layout.total_leds(), 136);
    PatternLibrary::new(&config.patterns(), &layout).unwrap();
}

#[test]
fn pipelines_follow_objects() {
    let mut config = Config::load(DEFAULT_PATH).unwrap();
    config.settings.cache = None;
    let ctx = Context::new(config);
    let pipelines = ctx.pipelines().unwrap();
    assert_eq!(pipelines.len(), 1);
    assert_eq!(pipelines[0].id(), "car");
}

#[test]
fn bad_layout_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(
        &path,
        r#"{ "led_segments": [ { "uid": 1, "num_leds": 2, "led_positions": [[0, 0, 0]] } ] }"#,
    )
    .unwrap();
    assert!(matches!(LedLayout::load(&path), Err(ConfigError::Layout(_))));

    let missing = dir.path().join("missing.json");
    assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
}
