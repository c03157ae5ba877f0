//! Golden tests over the serialized scene: the composition for a given
//! field set is stable, and the two templates actually differ.

use pokethumb::readiness::ResolvedImages;
use pokethumb::rendering::svg::{scene_digest, scene_to_svg};
use pokethumb::rendering::template;
use pokethumb::{imageref::DEFAULT_RELAY, EditorState, Template, Trend};

#[test]
fn default_scene_digest_is_stable_across_builds() {
    let editor = EditorState::new(DEFAULT_RELAY);
    let images = ResolvedImages::default();
    let a = scene_digest(&template::build_scene(&editor), &images);
    let b = scene_digest(&template::build_scene(&editor), &images);
    assert_eq!(a, b);
}

#[test]
fn templates_produce_different_scenes_from_the_same_fields() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    let images = ResolvedImages::default();

    editor.fields_mut().template = Template::Classic;
    let classic = scene_digest(&template::build_scene(&editor), &images);

    editor.fields_mut().template = Template::Impact;
    let impact = scene_digest(&template::build_scene(&editor), &images);

    assert_ne!(classic, impact);
}

#[test]
fn field_values_flow_into_the_markup() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    editor.fields_mut().title = "PIKACHU EX".to_string();
    editor.fields_mut().price = "$1,234".to_string();
    editor.fields_mut().change_percent = "42".to_string();
    editor.fields_mut().trend = Trend::Down;

    let svg = scene_to_svg(&template::build_scene(&editor), &ResolvedImages::default());
    assert!(svg.contains("PIKACHU EX"));
    assert!(svg.contains("$1,234"));
    // Change figure re-signed from the trend
    assert!(svg.contains("-42%"));
}

#[test]
fn trend_changes_the_scene() {
    let mut editor = EditorState::new(DEFAULT_RELAY);
    let images = ResolvedImages::default();

    editor.fields_mut().trend = Trend::Up;
    let up = scene_digest(&template::build_scene(&editor), &images);

    editor.fields_mut().trend = Trend::Down;
    let down = scene_digest(&template::build_scene(&editor), &images);

    assert_ne!(up, down);
}
