use assert_cmd::Command;
use inkmargin_core::{
    EngineConfig, Mode, Point, StaticPages, Stroke, StrokeStyle, SurfaceLifecycleCoordinator,
};
use inkmargin_storage::{save_sidecar, Sidecar};
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn inkmargin() -> Command {
    Command::cargo_bin("inkmargin").expect("binary should be built")
}

fn json_stdout(command: &mut Command) -> Value {
    let output = command.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

fn write_sidecar(dir: &Path) -> PathBuf {
    let pages = StaticPages::uniform(2, 100.0, 100.0);
    let mut engine = SurfaceLifecycleCoordinator::in_memory(pages, EngineConfig::default())
        .expect("engine should build");
    engine.set_current_page(0).expect("page should exist");
    engine.set_mode(Mode::Drawing);
    let points = vec![Point::new(100.0, 100.0), Point::new(120.0, 110.0)];
    engine.add_stroke(Stroke::new(points, StrokeStyle::pen()));
    engine.add_stroke(Stroke::new(vec![Point::new(10.0, 10.0)], StrokeStyle::pen()));
    engine.add_stroke(Stroke::new(vec![Point::new(260.0, 10.0)], StrokeStyle::pen()));

    let blobs = engine.export_page_blobs().expect("export should succeed");
    let mut sidecar = Sidecar::from_blobs(2, &blobs);
    sidecar.pages.insert(1, "@@ broken @@".to_owned());

    save_sidecar(&dir.join("paper.pdf"), &sidecar).expect("save should succeed")
}

#[test]
fn frame_centers_page_without_margins() {
    let value = json_stdout(inkmargin().args(["frame", "--width", "100", "--height", "100"]));

    assert_eq!(value["margins_enabled"], false);
    assert_eq!(value["surface"]["width"].as_f64(), Some(280.0));
    assert_eq!(value["page"]["x"].as_f64(), Some(90.0));
    assert_eq!(value["page"]["y"].as_f64(), Some(90.0));
    assert_eq!(value["page"]["width"].as_f64(), Some(100.0));
}

#[test]
fn frame_places_anchor_and_swaps_rotation() {
    let value = json_stdout(inkmargin().args([
        "frame",
        "--width",
        "100",
        "--height",
        "200",
        "--rotation",
        "90",
        "--anchor",
        "bottom-right",
        "--scale",
        "0.5",
        "--expansion-factor",
        "2",
    ]));

    assert_eq!(value["rotation"], 90);
    assert_eq!(value["true_size"]["width"].as_f64(), Some(200.0));
    assert_eq!(value["true_size"]["height"].as_f64(), Some(100.0));
    assert_eq!(value["surface"]["width"].as_f64(), Some(400.0));
    assert_eq!(value["page"]["x"].as_f64(), Some(300.0));
    assert_eq!(value["page"]["y"].as_f64(), Some(150.0));
}

#[test]
fn frame_rejects_bad_input() {
    inkmargin()
        .args(["frame", "--width", "100", "--height", "100", "--rotation", "45"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid rotation 45"));

    inkmargin()
        .args(["frame", "--width", "100", "--height", "100", "--anchor", "middle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown anchor: middle"));

    inkmargin()
        .args(["frame", "--width", "100", "--height", "100", "--scale", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid margin scale"));
}

#[test]
fn inspect_reports_per_page_counts() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let sidecar = write_sidecar(temp.path());

    let value = json_stdout(inkmargin().arg("inspect").arg(&sidecar));

    assert_eq!(value["version"], 1);
    assert_eq!(value["page_count"], 2);
    let pages = value["pages"].as_array().expect("pages should be an array");
    assert_eq!(pages.len(), 2);

    assert_eq!(pages[0]["index"], 0);
    assert_eq!(pages[0]["format"], "current");
    assert_eq!(pages[0]["page_anchored"], 1);
    assert_eq!(pages[0]["margin_anchored"], 2);

    assert_eq!(pages[1]["format"], "undecodable");
    assert!(pages[1]["error"].is_string());
}

#[test]
fn inspect_fails_for_missing_file() {
    inkmargin()
        .arg("inspect")
        .arg("/nonexistent/paper.pdf.inkmargin.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn inspect_fails_for_invalid_sidecar() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("bad.inkmargin.json");
    std::fs::write(&path, "not json").expect("write should succeed");

    inkmargin()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read sidecar"));
}

#[test]
fn version_prints_package_version() {
    inkmargin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
