use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONCAT_JOB: &str = r#"{
    "inputs": ["a.mp4", "b.mp4"],
    "operations": { "concat": true },
    "output": "out.mp4"
}"#;

fn write_job(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn splice(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("splice").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SPLICE_CONFIG")
        .env_remove("SPLICE_LOG_LEVEL")
        .env_remove("SPLICE_LOG_FORMAT")
        .env_remove("SPLICE_OUTPUT_DIR")
        .env_remove("SPLICE_DEFAULT_DURATION")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    splice(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_build_prints_one_argument_per_line() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    splice(&dir)
        .args(["build", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-i\na.mp4\n-i\nb.mp4\n-filter_complex\n"))
        .stdout(predicate::str::contains("-map\n[outv]\n-map\n[outa]\nout.mp4"));
}

#[test]
fn test_build_json_output() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    let output = splice(&dir)
        .args(["build", "--format", "json", "--job"])
        .arg(&job)
        .output()
        .unwrap();
    assert!(output.status.success());

    let args: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(args.first().map(String::as_str), Some("-i"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn test_build_shell_output_quotes_graph() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    splice(&dir)
        .args(["build", "--format", "shell", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ffmpeg -i a.mp4 -i b.mp4 -filter_complex '"))
        .stdout(predicate::str::contains("-map '[outv]'"));
}

#[test]
fn test_build_with_output_dir_and_threads() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    splice(&dir)
        .args(["build", "--output-dir", "renders", "--threads", "3", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("-threads\n3\nrenders/out.mp4"));
}

#[test]
fn test_build_rejects_zero_threads() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    splice(&dir)
        .args(["build", "--threads", "0", "--job"])
        .arg(&job)
        .assert()
        .failure();
}

#[test]
fn test_build_from_yaml_job() {
    let dir = TempDir::new().unwrap();
    let job = write_job(
        &dir,
        "job.yaml",
        "inputs:\n  - path: v.mp4\n    startTime: 5\n    duration: 10\noutput: trimmed.mp4\n",
    );

    splice(&dir)
        .args(["build", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("trim=start=5:duration=10"))
        .stdout(predicate::str::contains("atrim=start=5:duration=10"));
}

#[test]
fn test_config_file_disables_encoding_options() {
    let dir = TempDir::new().unwrap();
    let job = write_job(
        &dir,
        "job.json",
        r#"{"inputs": ["a.mp4"], "operations": {"preset": "fast"}, "output": "out.mp4"}"#,
    );
    write_job(&dir, "splice.toml", "[builder.features]\nencoding = false\n");

    splice(&dir)
        .args(["build", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("-preset").not());
}

#[test]
fn test_config_file_is_reported_once_logging_runs() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);
    write_job(&dir, "splice.toml", "[builder]\ndefault_input_duration = 4.0\n");

    splice(&dir)
        .args(["--log-level", "info", "build", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration from splice.toml"));
}

#[test]
fn test_plan_prints_timeline() {
    let dir = TempDir::new().unwrap();
    let job = write_job(
        &dir,
        "job.json",
        r#"{
            "inputs": [{ "path": "clip.mp4", "duration": 10 }],
            "gaps": { "video": [{ "startFrame": 150, "length": 30 }] },
            "output": "out.mp4"
        }"#,
    );

    splice(&dir)
        .args(["plan", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("__GAP__ (video)"))
        .stdout(predicate::str::contains("Total: 00:00:11.000"));
}

#[test]
fn test_plan_json() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    let output = splice(&dir)
        .args(["plan", "--json", "--job"])
        .arg(&job)
        .output()
        .unwrap();
    assert!(output.status.success());

    let timeline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(timeline["segments"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_validate_success() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.json", CONCAT_JOB);

    splice(&dir)
        .args(["validate", "--job"])
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("Job is valid: 2 inputs, 2 timeline segments"));
}

#[test]
fn test_validate_rejects_subtitle_format() {
    let dir = TempDir::new().unwrap();
    let job = write_job(
        &dir,
        "job.json",
        r#"{"inputs": ["a.mp4"], "operations": {"subtitles": "notes.txt"}, "output": "out.mp4"}"#,
    );

    splice(&dir)
        .args(["validate", "--job"])
        .arg(&job)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Job is invalid"));
}

#[test]
fn test_unknown_job_extension() {
    let dir = TempDir::new().unwrap();
    let job = write_job(&dir, "job.xml", "<job/>");

    splice(&dir)
        .args(["build", "--job"])
        .arg(&job)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported job file extension"));
}

#[test]
fn test_missing_job_file() {
    let dir = TempDir::new().unwrap();

    splice(&dir)
        .args(["build", "--job", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load job"));
}
