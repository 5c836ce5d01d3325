//! The build wrapper shells out to a generator and a build tool; these
//! tests substitute `true`/`false` so no real toolchain is needed.
#![cfg(unix)]

use std::path::Path;

use viz_replay::Error;
use viz_replay::buildtool::{BuildAction, BuildTool};
use viz_replay::config::BuildConfig;

fn config_under(root: &Path) -> BuildConfig {
    BuildConfig {
        source_dir: root.join("pipeline"),
        build_dir: root.join("build"),
        components_dir: root.join("components"),
        vendor_dir: root.join("vendor"),
        install_root: root.join("dist"),
        cflags: Some("-O2".to_string()),
        cxxflags: None,
    }
}

#[test]
fn clean_on_missing_build_dir_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_under(tmp.path());
    let tool = BuildTool::with_programs(cfg.clone(), "true", "true");

    tool.run(BuildAction::Clean).unwrap();
    assert!(!cfg.build_dir.exists());
}

#[test]
fn clean_removes_an_existing_build_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_under(tmp.path());
    std::fs::create_dir_all(cfg.build_dir.join("deep/nested")).unwrap();

    let tool = BuildTool::with_programs(cfg.clone(), "true", "true");
    tool.run(BuildAction::Clean).unwrap();
    assert!(!cfg.build_dir.exists());
}

#[test]
fn build_twice_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_under(tmp.path());
    let tool = BuildTool::with_programs(cfg.clone(), "true", "true");

    tool.run(BuildAction::Build).unwrap();
    assert!(cfg.build_dir.is_dir());

    // Second invocation reuses the existing build dir without error.
    tool.run(BuildAction::Build).unwrap();
    assert!(cfg.build_dir.is_dir());
}

#[test]
fn failing_generator_propagates_its_exit_status() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_under(tmp.path());
    let tool = BuildTool::with_programs(cfg, "false", "true");

    let err = tool.run(BuildAction::Build).unwrap_err();
    match err {
        Error::ExitStatus(status) => assert_eq!(status.code(), Some(1)),
        other => panic!("expected ExitStatus, got {other:?}"),
    }
}

#[test]
fn failing_build_tool_propagates_its_exit_status() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_under(tmp.path());
    let tool = BuildTool::with_programs(cfg, "true", "false");

    let err = tool.run(BuildAction::Build).unwrap_err();
    assert!(matches!(err, Error::ExitStatus(_)));
}

#[test]
fn wrapper_binary_forwards_the_action() {
    let tmp = tempfile::tempdir().unwrap();

    let exe = env!("CARGO_BIN_EXE_pipeline-build");
    let output = std::process::Command::new(exe)
        .arg("mrproper")
        .output()
        .expect("failed to run pipeline-build binary");
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("unsupported action"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // `clean` with a config pointing at an empty tempdir is a no-op.
    let config_path = tmp.path().join("viz.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{"build": {{"build_dir": "{}"}}}}"#,
            tmp.path().join("build").display()
        ),
    )
    .unwrap();

    let output = std::process::Command::new(exe)
        .args(["--config", config_path.to_str().unwrap(), "clean"])
        .output()
        .expect("failed to run pipeline-build binary");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
