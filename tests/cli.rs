use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn flight_graph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flight-graph"))
}

#[test]
fn headless_run_prints_final_positions() {
    let output = flight_graph()
        .arg(fixture("flights.json"))
        .args(["--headless", "--ticks", "120"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let snapshot: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["tick"], 120);
    assert_eq!(snapshot["mode"], "network");

    let particles = snapshot["particles"].as_array().unwrap();
    // ANC has no routes and no weight, so it carries no flow.
    assert_eq!(particles.len(), 7);
    assert!(particles.iter().all(|particle| particle["id"] != "ANC"));
    for particle in particles {
        assert!(particle["x"].as_f64().unwrap().is_finite());
        assert!(particle["y"].as_f64().unwrap().is_finite());
    }
}

#[test]
fn headless_map_mode_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("snapshot.json");

    let status = flight_graph()
        .arg(fixture("flights.json"))
        .args(["--headless", "--mode", "map", "--ticks", "300"])
        .arg("--output")
        .arg(&output_path)
        .status()
        .unwrap();
    assert!(status.success());

    let raw = std::fs::read_to_string(&output_path).unwrap();
    let snapshot: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["mode"], "map");

    let particles = snapshot["particles"].as_array().unwrap();
    let seattle = particles
        .iter()
        .find(|particle| particle["id"] == "SEA")
        .unwrap();
    let miami = particles
        .iter()
        .find(|particle| particle["id"] == "MIA")
        .unwrap();
    // North up, west left.
    assert!(seattle["x"].as_f64().unwrap() < miami["x"].as_f64().unwrap());
    assert!(seattle["y"].as_f64().unwrap() < miami["y"].as_f64().unwrap());
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{ "alpha_decay": 0.5 }"#).unwrap();

    let output = flight_graph()
        .arg(fixture("flights.json"))
        .arg("--config")
        .arg(&config_path)
        .args(["--headless", "--ticks", "40"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["state"], "resting");
}

#[test]
fn invalid_config_is_rejected() {
    let status = flight_graph()
        .arg(fixture("flights.json"))
        .args(["--headless", "--velocity-decay", "1.5"])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn missing_dataset_fails_with_context() {
    let output = flight_graph()
        .arg(fixture("does-not-exist.json"))
        .arg("--headless")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read flight dataset"), "stderr: {stderr}");
}
