//! End-to-end tests: scene files in, script text out.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use mapscript::cli::build::{self, BuildArgs};
use mapscript::emit::{compress, emit, EmitOptions};
use mapscript::output::Printer;
use mapscript::{
    discover, parse_scene, validate_scene, Coordinate, Marker, MarkerIcon, PlaceTable,
    RegistrationPolicy, Scene,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

fn parse(source: &str) -> Scene {
    parse_scene(source, &PlaceTable::new(), RegistrationPolicy::Strict).unwrap()
}

fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_fixture_scene_is_valid() {
    let scene = parse(&load_fixture("harbor.map.yaml"));
    let result = validate_scene(&scene);
    assert!(result.is_ok(), "unexpected diagnostics: {:?}", result);
}

#[test]
fn test_emission_is_deterministic() {
    let source = load_fixture("harbor.map.yaml");

    let mut first = parse(&source);
    let mut second = parse(&source);
    let a = emit(&mut first, &EmitOptions::default()).unwrap();
    let b = emit(&mut second, &EmitOptions::default()).unwrap();
    assert_eq!(a, b);

    // Emitting the same scene again does not change it
    let again = emit(&mut first, &EmitOptions::default()).unwrap();
    assert_eq!(a, again);
}

#[test]
fn test_marker_data_is_memoized() {
    let mut scene = parse(&load_fixture("harbor.map.yaml"));

    scene.marker_data().unwrap();
    emit(&mut scene, &EmitOptions::default()).unwrap();
    assert_eq!(scene.extraction_passes(), 1);

    scene.register(Marker::new(coord(32.73, -117.15)));
    scene.marker_data().unwrap();
    assert_eq!(scene.extraction_passes(), 2);
}

#[test]
fn test_shared_icon_is_emitted_once() {
    let mut scene = parse(&load_fixture("harbor.map.yaml"));
    let script = emit(&mut scene, &EmitOptions::default()).unwrap();

    assert_eq!(count(&script, "new google.maps.MarkerImage("), 1);
    assert_eq!(count(&script, "icon: this.marker_icons[0]"), 2);
}

#[test]
fn test_bind_statement() {
    let mut scene = parse(&load_fixture("harbor.map.yaml"));
    let script = emit(&mut scene, &EmitOptions::default()).unwrap();

    assert_eq!(count(&script, ".bindTo("), 1);
    assert!(script.contains("harbor.shapes[0].bindTo('center', harbor.markers[0], 'position');"));
}

#[test]
fn test_single_marker_fits_bounds() {
    let mut scene = parse("map:\n  id: solo\nentities:\n  - type: marker\n    position: [10, 20]\n");
    let script = emit(&mut scene, &EmitOptions::default()).unwrap();

    assert_eq!(count(&script, "this.bounds.extend(this.markers[0].position);"), 1);
    assert_eq!(count(&script, "this.map.fitBounds(this.bounds);"), 1);
}

#[test]
fn test_stagger_schedules_last_marker() {
    let source = r#"
map:
  id: stagger
  center: [0, 0]
  stagger_markers: 100
entities:
  - type: marker
    position: [0, 0]
  - type: marker
    position: [1, 1]
  - type: marker
    position: [2, 2]
"#;
    let mut scene = parse(source);
    let script = emit(&mut scene, &EmitOptions::default()).unwrap();

    assert!(script.contains("this.markers[2] = {"));
    assert!(script.contains("setTimeout(promote(i), i * 100);"));
    assert!(script.contains("setTimeout(promote(2), 200);"));
}

#[test]
fn test_compression_keeps_tokens() {
    let source = load_fixture("harbor.map.yaml");
    let mut scene = parse(&source);

    let plain = emit(&mut scene, &EmitOptions::default()).unwrap();
    let small = emit(&mut scene, &EmitOptions::compressed()).unwrap();

    let squash = |s: &str| s.split_whitespace().collect::<String>();
    assert!(small.len() < plain.len());
    assert_eq!(squash(&plain), squash(&small));
    assert_eq!(compress(&small), small);
}

#[test]
fn test_handles_register_across_scenes() {
    let mut first = Scene::default();
    let mut marker = Marker::new(coord(5.0, 5.0));
    marker.icon = Some(MarkerIcon::new("pin.png", 20, 32));
    let handle = first.register(marker);

    let mut second = Scene::default();
    let copied = second.register(handle);
    assert_eq!(copied.owner(), second.id());
    assert_eq!(copied.index(), 0);

    let a = emit(&mut first, &EmitOptions::default()).unwrap();
    let b = emit(&mut second, &EmitOptions::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_discover_fixture_project() {
    let discovery = discover(fixtures_dir()).unwrap();
    assert!(discovery.has_manifest);
    assert_eq!(discovery.scan.total(), 1);

    let scenes = discovery.load().unwrap();
    // The scene's own places win over the manifest's
    let center = scenes[0].scene.settings().center.unwrap();
    assert_eq!(center, coord(32.7157, -117.1611));
}

#[test]
fn test_cli_build_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("harbor.map.yaml");
    fs::write(&scene_path, load_fixture("harbor.map.yaml")).unwrap();
    let output = dir.path().join("dist");

    let args = BuildArgs {
        files: vec![scene_path],
        output: Some(output.clone()),
        compress: false,
        html: true,
        strict: true,
        stdout: false,
    };
    build::run(args, &Printer::new()).unwrap();

    let script = fs::read_to_string(output.join("harbor.js")).unwrap();
    let page = fs::read_to_string(output.join("harbor.html")).unwrap();
    assert!(script.starts_with("var harbor;"));
    assert!(page.contains(&script));
}
