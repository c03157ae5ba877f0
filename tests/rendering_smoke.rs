//! Capture strategy smoke tests: every template renders through both
//! strategies at the fixed canvas size, in both output formats.

use pokethumb::readiness::ResolvedImages;
use pokethumb::rendering::raster::DirectRaster;
use pokethumb::rendering::svg::VectorCapture;
use pokethumb::rendering::{template, CaptureStrategy};
use pokethumb::{
    imageref::DEFAULT_RELAY, EditorState, OutputFormat, Template, CANVAS_HEIGHT, CANVAS_WIDTH,
};

fn strategies() -> Vec<Box<dyn CaptureStrategy>> {
    vec![Box::new(VectorCapture), Box::new(DirectRaster)]
}

#[test]
fn every_template_captures_to_png_at_fixed_size() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    for template_kind in [Template::Classic, Template::Impact] {
        editor.fields_mut().template = template_kind;
        let scene = template::build_scene(&editor);
        for strategy in strategies() {
            let bytes = strategy
                .capture(&scene, &ResolvedImages::default(), OutputFormat::Png)
                .unwrap_or_else(|e| panic!("{} failed on {:?}: {}", strategy.name(), template_kind, e));
            assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        }
    }
}

#[test]
fn every_template_captures_to_jpeg() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    for template_kind in [Template::Classic, Template::Impact] {
        editor.fields_mut().template = template_kind;
        let scene = template::build_scene(&editor);
        for strategy in strategies() {
            let bytes = strategy
                .capture(&scene, &ResolvedImages::default(), OutputFormat::Jpeg)
                .unwrap();
            assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        }
    }
}

#[test]
fn embedded_artwork_shows_up_in_both_strategies() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    editor.fields_mut().template = Template::Impact;

    let source = "card.png".to_string();
    let mut scene = template::build_scene(&editor);
    // Impact renders no image node for an empty reference; add one directly
    scene.push(pokethumb::rendering::scene::Node::Image(
        pokethumb::rendering::scene::ImageNode {
            x: 0.0,
            y: 0.0,
            width: CANVAS_WIDTH as f32,
            height: CANVAS_HEIGHT as f32,
            source: source.clone(),
        },
    ));

    let mut images = ResolvedImages::default();
    images.insert_ready(
        source,
        image::RgbaImage::from_pixel(16, 16, image::Rgba([0, 128, 255, 255])),
    );

    for strategy in strategies() {
        let bytes = strategy
            .capture(&scene, &images, OutputFormat::Png)
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        // The full-bleed blit lands on top; probe a pixel not covered by
        // the banner or strips
        let px = img.get_pixel(640, 220);
        assert!(px[2] > 200, "expected blue artwork pixel, got {:?}", px);
    }
}
