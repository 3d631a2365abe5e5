use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

const CONFIG: &str = "\
selection:
  min_pt: 20.0
  max_abs_eta: 2.4
ranker:
  type: chi2
  terms:
    - expression: mass-top-lep
      mean: 172.5
      variance: 400.0
    - expression: mass-top-had
      mean: 172.5
      variance: 625.0
    - expression: mass-w-had
      mean: 80.4
      variance: 144.0
";

fn ttreco() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ttreco"))
}

fn read_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn generate_then_reconstruct() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let truth = dir.path().join("truth.jsonl");
    let config = dir.path().join("config.yaml");
    let out = dir.path().join("results.jsonl");
    fs::write(&config, CONFIG).unwrap();

    let status = ttreco()
        .args(["generate", "--seed", "11", "--events", "25", "--out"])
        .arg(&events)
        .arg("--truth")
        .arg(&truth)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(read_lines(&events).len(), 25);
    assert_eq!(read_lines(&truth).len(), 25);

    let status = ttreco()
        .args([
            "--log-level",
            "warn",
            "reconstruct",
            "--threads",
            "2",
            "--config",
        ])
        .arg(&config)
        .arg("--events")
        .arg(&events)
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let records = read_lines(&out);
    assert_eq!(records.len(), 25);
    for (idx, record) in records.iter().enumerate() {
        assert_eq!(record["event"], idx);
        let success = record["code"] == 0;
        assert_eq!(success, record["status"] == "success");
        assert_eq!(success, !record["observables"].is_null());
    }

    let summary = fs::read(dir.path().join("results.summary.json")).unwrap();
    let summary: Value = serde_json::from_slice(&summary).unwrap();
    assert_eq!(summary["events"], 25);
    assert_eq!(summary["config_hash"].as_str().unwrap().len(), 64);
    let counted: u64 = summary["status_counts"]
        .as_object()
        .unwrap()
        .values()
        .map(|count| count.as_u64().unwrap())
        .sum();
    assert_eq!(counted, 25);
}

#[test]
fn invalid_config_exits_non_zero() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let events = dir.path().join("events.jsonl");
    fs::write(&config, CONFIG.replace("variance: 144.0", "variance: 0.0")).unwrap();
    fs::write(&events, "").unwrap();

    let status = ttreco()
        .arg("reconstruct")
        .arg("--config")
        .arg(&config)
        .arg("--events")
        .arg(&events)
        .arg("--out")
        .arg(dir.path().join("results.jsonl"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn solve_nu_prints_two_candidates() {
    let output = ttreco()
        .args(["solve-nu", "--lepton", "40,0,0,0", "--met", "30,0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["branch"]["kind"], "two_roots");
    assert_eq!(report["candidates"].as_array().unwrap().len(), 2);
}
