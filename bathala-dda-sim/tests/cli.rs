use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "bathala-dda-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("calibration-lock"));
}

#[test]
fn cli_runs_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "calibration-lock,duplicate-guard,unknown",
            "--iterations",
            "1",
            "--seeds",
            "1,tikbalang",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Bathala DDA Simulator"));
    assert!(stderr.contains("Unknown scenario"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = report.as_array().expect("array of results");
    assert_eq!(runs.len(), 4);
    assert!(runs.iter().all(|run| run["passed"] == true));
}

#[test]
fn cli_random_walk_honours_combat_override() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let output_path = temp_path("csv");
    let status = Command::new(exe)
        .args([
            "--report",
            "csv",
            "--scenarios",
            "random-walk",
            "--combats",
            "25",
            "--iterations",
            "2",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let row = content.lines().nth(1).expect("result row");
    assert!(row.starts_with("random-walk,1337,true,2,2,25,"));
}

#[test]
fn cli_same_seed_reproduces_digest() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let run = |label: &str| {
        let output_path = temp_path(label);
        let status = Command::new(exe)
            .args([
                "--report",
                "csv",
                "--scenarios",
                "random-walk",
                "--seeds",
                "0xBEEF",
                "--output",
            ])
            .arg(&output_path)
            .status()
            .expect("run cli");
        assert!(status.success());
        std::fs::read_to_string(output_path).expect("read output")
    };
    let digest = |csv: &str| {
        csv.lines()
            .nth(1)
            .and_then(|row| row.split(',').nth(8))
            .map(ToString::to_string)
    };
    let first = run("digest-a");
    let second = run("digest-b");
    assert!(digest(&first).is_some());
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn cli_rejects_invalid_config() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let config_path = temp_path("bad-config");
    std::fs::write(
        &config_path,
        r#"{ "scaling": { "learning": { "bonus": -1.0, "penalty": 1.0 } } }"#,
    )
    .expect("write config");
    let output = Command::new(exe)
        .args(["--scenarios", "mixed-run", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid engine configuration"));
}

#[test]
fn cli_rejects_unrecognised_seed() {
    let exe = env!("CARGO_BIN_EXE_bathala-dda-sim");
    let output = Command::new(exe)
        .args(["--scenarios", "mixed-run", "--seeds", "not a seed!"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}
