//! Integration tests for the Draft API
//!
//! These tests exercise composition across sources, rendering and loading
//! from disk through the public interface only.

use std::{fs, thread};

use drafter::{
    Draft, DraftError, Entity, Order, ParameterSpec, Value,
    config::AppConfig,
    export::{Format, Options},
    geometry::Point,
};
use drafter_core::{Error, MAX_CALL_DEPTH};
use tempfile::tempdir;

const WASHER: &str = r#"
parameters:
  - $r: 5
sketch:
  - circle: [0, 0, $r]
  - circle: [0, 0, '$r / 2']
"#;

const PLATE: &str = r#"
parameters:
  - $w: 40
  - $h: 20
reference:
  - $hole:sketch:
      - user.washer: 3
      - hide:
sketch:
  - rectangle: [0, 0, $w, $h]
  - name: '"frame"'
  - stroke: ['"red"', 2]
  - sketch:
      - add: $hole
"#;

fn draft() -> Draft {
    let mut draft = Draft::default();
    draft.add_document("washer", WASHER).unwrap();
    draft.add_document("plate", PLATE).unwrap();
    draft
}

fn entities(draft: &Draft, name: &str, args: &[Value]) -> Vec<Entity> {
    draft
        .evaluate(name, args)
        .unwrap()
        .node()
        .subtree_entities(Order::Pre)
        .cloned()
        .collect()
}

#[test]
fn test_document_arguments() {
    let draft = draft();
    let radii: Vec<f64> = entities(&draft, "washer", &[Value::Number(8.0)])
        .iter()
        .filter_map(|entity| match entity {
            Entity::Circle { radius, .. } => Some(*radius),
            _ => None,
        })
        .collect();
    assert_eq!(radii, [8.0, 4.0]);
}

#[test]
fn test_sources_call_each_other() {
    let draft = draft();
    let kinds: Vec<_> = entities(&draft, "plate", &[])
        .iter()
        .map(Entity::kind)
        .collect();
    assert_eq!(kinds, ["polycurve", "circle", "circle"]);
}

#[test]
fn test_function_sources() {
    let mut draft = draft();
    draft.add_function(
        "marker",
        vec![ParameterSpec::new("x", 0.0), ParameterSpec::new("y", 0.0)],
        |sketch, args| {
            let x = args.first().cloned().unwrap_or(Value::Number(0.0));
            let y = args.get(1).cloned().unwrap_or(Value::Number(0.0));
            sketch.call("point", &[x, y])
        },
    );
    draft
        .add_document("markers", "sketch:\n  - user.marker: [1, 2]\n  - user.marker:\n")
        .unwrap();

    assert_eq!(
        entities(&draft, "markers", &[]),
        vec![
            Entity::Point {
                position: Point::new(1.0, 2.0)
            },
            Entity::Point {
                position: Point::new(0.0, 0.0)
            },
        ]
    );
}

#[test]
fn test_render_svg_skips_hidden_nodes() {
    let svg = draft()
        .render("plate", &[], Format::Svg, &Options::new())
        .unwrap();
    assert!(svg.contains("<svg"), "{svg}");
    assert!(svg.contains("<path"));
    assert!(svg.contains(r#"data-name="frame""#));
    assert!(!svg.contains("<circle"));
}

#[test]
fn test_render_json_and_debug() {
    let draft = draft();
    let json = draft
        .render("plate", &[], Format::Json, &Options::new())
        .unwrap();
    let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(tree["children"].is_array());
    assert!(!json.contains("\"circle\""));

    let dump = draft
        .render("plate", &[], Format::Debug, &Options::new())
        .unwrap();
    assert!(dump.contains("(hidden)"));
    assert!(dump.contains("circle"));
}

#[test]
fn test_render_options() {
    let options: Options = [("padding".to_string(), "0".to_string())]
        .into_iter()
        .collect();
    let svg = draft()
        .render("plate", &[Value::Number(10.0), Value::Number(5.0)], Format::Svg, &options)
        .unwrap();
    assert!(svg.contains(r#"viewBox="0 0 10 5""#), "{svg}");

    let options: Options = [("precision".to_string(), "many".to_string())]
        .into_iter()
        .collect();
    let err = draft()
        .render("plate", &[], Format::Svg, &options)
        .unwrap_err();
    assert!(matches!(err, DraftError::Export(_)));
}

#[test]
fn test_evaluation_errors_name_the_source() {
    let mut draft = Draft::default();
    draft
        .add_document("broken", "sketch:\n  - point: [$nowhere, 0]\n")
        .unwrap();
    match draft.evaluate("broken", &[]).unwrap_err() {
        DraftError::Evaluate { name, source } => {
            assert_eq!(name, "broken");
            assert_eq!(source, Error::UnboundReference("nowhere".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_self_reference_hits_the_recursion_limit() {
    let mut draft = Draft::default();
    draft
        .add_document("forever", "sketch:\n  - user.forever:\n")
        .unwrap();
    let err = draft.evaluate("forever", &[]).unwrap_err();
    assert!(
        matches!(
            err,
            DraftError::Evaluate {
                source: Error::RecursionLimit { .. },
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn test_self_reference_fits_a_default_thread_stack() {
    let worker = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let mut draft = Draft::default();
            draft
                .add_document("forever", "sketch:\n  - user.forever:\n")
                .unwrap();
            match draft.evaluate("forever", &[]).unwrap_err() {
                DraftError::Evaluate { source, .. } => source,
                other => panic!("unexpected error: {other}"),
            }
        })
        .unwrap();
    let source = worker.join().unwrap();
    assert!(
        matches!(
            &source,
            Error::RecursionLimit { feature, limit }
                if feature == "user.forever" && *limit == MAX_CALL_DEPTH
        ),
        "{source}"
    );
}

#[test]
fn test_load_directory_with_features_subdirectory() {
    let dir = tempdir().unwrap();
    let features = dir.path().join("sketch-features");
    fs::create_dir(&features).unwrap();
    fs::write(features.join("washer.yaml"), WASHER).unwrap();
    fs::write(features.join("plate.yml"), PLATE).unwrap();
    fs::write(features.join("notes.txt"), "not a document").unwrap();
    fs::write(dir.path().join("index.json"), "{}").unwrap();

    let draft = Draft::load(dir.path().join("index.json"), AppConfig::default()).unwrap();
    assert_eq!(draft.sources().collect::<Vec<_>>(), ["plate", "washer"]);
    assert!(draft.evaluate("plate", &[]).is_ok());
}

#[test]
fn test_load_single_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("washer.yaml");
    fs::write(&path, WASHER).unwrap();

    let draft = Draft::load(&path, AppConfig::default()).unwrap();
    assert_eq!(draft.sources().collect::<Vec<_>>(), ["washer"]);

    let other = dir.path().join("washer.js");
    fs::write(&other, "").unwrap();
    assert!(matches!(
        Draft::load(&other, AppConfig::default()),
        Err(DraftError::UnsupportedFile(_))
    ));
}

#[test]
fn test_load_reports_malformed_documents() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.yaml"), "reference:\n  - $x: 1\n").unwrap();

    let err = Draft::load(dir.path(), AppConfig::default()).unwrap_err();
    assert!(matches!(err, DraftError::MalformedDocument { ref name, .. } if name == "bad"));
    assert!(matches!(
        Draft::load(dir.path().join("missing"), AppConfig::default()),
        Err(DraftError::Io(_))
    ));
}
