use layer_tree::compositor::layers::testing::MockLayer;
use layer_tree::compositor::layers::{ClipBehavior, Paint, Rect, RecordingCanvas};
use layer_tree::compositor::SceneBuilder;
use layer_tree::{DrawCommand, Layer, Settings};
use std::fs;

#[test]
fn test_settings_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("layer-tree.toml");

    let mut settings = Settings::default();
    settings.frame.width = 1080.0;
    settings.frame.height = 1920.0;
    settings.frame.device_pixel_ratio = 3.0;
    settings.debug.checkerboard_offscreen_layers = true;
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    // Unset overrides are not written out.
    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("checked_paint"));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Settings::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"), "{err:#}");
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[frame]\nwidth = \"wide\"\n").unwrap();
    let err = Settings::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse"), "{err:#}");
}

#[test]
fn test_loaded_settings_drive_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.toml");
    fs::write(
        &path,
        "[frame]\nwidth = 100.0\nheight = 100.0\ndevice_pixel_ratio = 2.0\n\n\
         [debug]\ncheckerboard_offscreen_layers = true\nchecked_paint = true\n",
    )
    .unwrap();
    let settings = Settings::load(&path).unwrap();

    let leaf = MockLayer::new(Rect::new(0.0, 0.0, 200.0, 200.0));
    let observer = leaf.observer();
    let mut builder = SceneBuilder::with_settings(settings);
    builder
        .push_clip_rect(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            ClipBehavior::AntiAliasWithSaveLayer,
        )
        .add_layer(Box::new(leaf))
        .pop();
    let frame = builder.build().preroll(1);

    // 100 physical pixels at ratio 2 is 50 logical pixels, narrowed by the clip.
    assert_eq!(observer.parent_cull_rect(), Rect::new(0.0, 0.0, 40.0, 40.0));
    assert_eq!(frame.tree().root().paint_bounds(), Rect::new(0.0, 0.0, 40.0, 40.0));

    let mut canvas = RecordingCanvas::new();
    frame.paint(&mut canvas).unwrap();
    let fills = canvas
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::DrawRect(_, paint) if *paint == Paint::checkerboard()))
        .count();
    assert_eq!(fills, 1);
}
