//! CLI integration tests for fpgaforge.
//!
//! These tests drive the binary from project creation through script
//! generation. No vendor tool is needed: scripts are written, never run.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the fpgaforge binary command, isolated from the user's global config.
fn fpgaforge(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fpgaforge").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Initialize a project for `backend` in `dir`.
fn init(dir: &Path, backend: &str) {
    fpgaforge(dir)
        .args(["init", "--name", "blink", "--backend", backend])
        .current_dir(dir)
        .assert()
        .success();
}

// ============================================================================
// fpgaforge init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = temp_dir();
    init(tmp.path(), "openflow");

    assert!(tmp.path().join("Fpga.toml").exists());
    assert!(tmp.path().join("hdl/top.v").exists());

    let manifest = fs::read_to_string(tmp.path().join("Fpga.toml")).unwrap();
    assert!(manifest.contains("backend = \"openflow\""));
    assert!(manifest.contains("part = \"hx8k-ct256\""));
}

#[test]
fn test_init_refuses_existing_manifest() {
    let tmp = temp_dir();
    init(tmp.path(), "vivado");

    fpgaforge(tmp.path())
        .args(["init"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_unknown_backend() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["init", "--backend", "icecube"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid backend `icecube`"))
        .stderr(predicate::str::contains(
            "vivado, ise, quartus, libero, diamond, openflow",
        ));
    assert!(!tmp.path().join("Fpga.toml").exists());
}

// ============================================================================
// fpgaforge generate
// ============================================================================

#[test]
fn test_generate_openflow() {
    let tmp = temp_dir();
    init(tmp.path(), "openflow");

    fpgaforge(tmp.path())
        .args(["generate"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bash openflow.sh"));

    let script = fs::read_to_string(tmp.path().join("results/openflow.sh")).unwrap();
    assert!(script.contains("PROJECT=blink"));
    assert!(script.contains("PART=hx8k-ct256"));
    assert!(script.contains("read_verilog -defer"));
    assert!(script.contains("hdl/top.v"));
    assert!(!script.contains("#FILES#"));
}

#[test]
fn test_generate_from_subdirectory() {
    let tmp = temp_dir();
    init(tmp.path(), "vivado");

    fpgaforge(tmp.path())
        .args(["generate", "--task", "syn", "--strategy", "area"])
        .current_dir(tmp.path().join("hdl"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "vivado -mode batch -notrace -quiet -source vivado.tcl",
        ));

    let script = fs::read_to_string(tmp.path().join("results/vivado.tcl")).unwrap();
    assert!(script.contains("xc7k160t-3-fbg484"));
}

#[test]
fn test_generate_backend_override() {
    let tmp = temp_dir();
    init(tmp.path(), "vivado");

    fpgaforge(tmp.path())
        .args(["generate", "--backend", "quartus", "--part", "10cl025yu256c8g"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("quartus_sh --script quartus.tcl"));

    assert!(tmp.path().join("results/quartus.tcl").exists());
}

#[test]
fn test_generate_invalid_strategy() {
    let tmp = temp_dir();
    init(tmp.path(), "vivado");

    fpgaforge(tmp.path())
        .args(["generate", "--strategy", "fastest"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid strategy `fastest`"))
        .stderr(predicate::str::contains("none, area, speed, power"));
}

#[test]
fn test_generate_malformed_part() {
    let tmp = temp_dir();
    init(tmp.path(), "ise");

    fpgaforge(tmp.path())
        .args(["generate", "--part", "xc6slx9-csg324"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed part `xc6slx9-csg324`"))
        .stderr(predicate::str::contains("DEVICE-SPEED-PACKAGE"));
}

#[test]
fn test_generate_without_manifest() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["generate"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fpga.toml"))
        .stderr(predicate::str::contains("fpgaforge init"));
}

#[test]
fn test_generate_template_override() {
    let tmp = temp_dir();
    init(tmp.path(), "openflow");

    let templates = tmp.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("openflow.sh"), "echo #PROJECT# #DEVICE#\n").unwrap();

    fpgaforge(tmp.path())
        .args(["generate", "--template-dir"])
        .arg(&templates)
        .current_dir(tmp.path())
        .assert()
        .success();

    let script = fs::read_to_string(tmp.path().join("results/openflow.sh")).unwrap();
    assert_eq!(script, "echo blink hx8k\n");
}

// ============================================================================
// fpgaforge transfer
// ============================================================================

#[test]
fn test_transfer_openflow() {
    let tmp = temp_dir();
    init(tmp.path(), "openflow");

    fpgaforge(tmp.path())
        .args(["transfer"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bash openflow-prog.sh"));

    let script = fs::read_to_string(tmp.path().join("results/openflow-prog.sh")).unwrap();
    assert!(script.contains("blink.bit"));
}

#[test]
fn test_transfer_unsupported_backend() {
    let tmp = temp_dir();
    init(tmp.path(), "libero");

    fpgaforge(tmp.path())
        .args(["transfer"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "`transfer` is not supported by the libero backend",
        ));
}

#[test]
fn test_transfer_memory_needs_part() {
    let tmp = temp_dir();
    init(tmp.path(), "vivado");

    fpgaforge(tmp.path())
        .args(["transfer", "--devtype", "spi"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing memory part"));

    fpgaforge(tmp.path())
        .args(["transfer", "--devtype", "spi", "--mempart", "s25fl128sxxxxxx0-spi-x1_x2_x4"])
        .args(["--width", "4"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

// ============================================================================
// fpgaforge context / part
// ============================================================================

#[test]
fn test_context_json() {
    let tmp = temp_dir();
    init(tmp.path(), "openflow");

    let output = fpgaforge(tmp.path())
        .args(["context", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let ctx: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ctx["PART"], "hx8k-ct256");
    assert_eq!(ctx["FAMILY"], "ice40");
    assert_eq!(ctx["PROJECT"], "blink");
    assert_eq!(ctx["BIT"], "1");
}

#[test]
fn test_part_rewrites() {
    let tmp = temp_dir();
    let output = fpgaforge(tmp.path())
        .args(["part", "hx4k-ct256", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let part: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(part["family"], "ice40");
    assert_eq!(part["device"], "hx8k");
    assert_eq!(part["package"], "ct256:4k");

    fpgaforge(tmp.path())
        .args(["part", "HX8K-CT256"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device:   hx8k"))
        .stdout(predicate::str::contains("Package:  ct256"));
}

#[test]
fn test_part_libero_normalization() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["part", "mpf100t-fcg484", "--backend", "libero"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mpf100t-STD-fcg484"))
        .stdout(predicate::str::contains("PolarFire"));
}

#[test]
fn test_part_malformed() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["part", "a-b-c-d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed part `a-b-c-d`"));
}

// ============================================================================
// fpgaforge backend / completions
// ============================================================================

#[test]
fn test_backend_list() {
    let tmp = temp_dir();
    let assert = fpgaforge(tmp.path())
        .args(["backend", "list"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for name in ["vivado", "ise", "quartus", "libero", "diamond", "openflow"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn test_backend_show() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["backend", "show", "libero"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libero SCRIPT:libero.tcl"))
        .stdout(predicate::str::contains("not supported"));

    fpgaforge(tmp.path())
        .args(["backend", "show", "cmake"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid backend `cmake`"));
}

#[test]
fn test_completions() {
    let tmp = temp_dir();
    fpgaforge(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fpgaforge"));
}
