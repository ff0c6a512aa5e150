//! CLI integration tests for alfa-build and alfa-release.
//!
//! Builds run with `--dry-run` from a `scripts/` directory inside a temporary
//! project tree, so the default layout applies and nothing is compiled.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn alfa_build() -> Command {
    Command::cargo_bin("alfa-build").unwrap()
}

fn alfa_release() -> Command {
    Command::cargo_bin("alfa-release").unwrap()
}

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

/// Create an engine tree and return its `scripts/` directory.
fn engine_project(tmp: &TempDir) -> PathBuf {
    let root = tmp.path();
    for rel in [
        "src/configs.cpp",
        "src/game/Board.cpp",
        "src/math/cpu/gemm.cpp",
        "src/math/cuda/gemm.cpp",
        "test/game/test_Board.cpp",
        "contrib/gtest/gtest-all.cc",
        "training_launcher/launcher.cpp",
    ] {
        touch(root, rel);
    }
    let scripts = root.join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    scripts
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// alfa-build
// ============================================================================

#[test]
fn test_dry_run_prints_matrix_in_order() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);

    let output = alfa_build()
        .args(["gcc", "no_cuda", "--dry-run", "--platform", "linux"])
        .current_dir(&scripts)
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    // release: 2 compiles, archive, link; debug: same; test: link
    assert_eq!(lines.len(), 9, "{:#?}", lines);
    assert!(lines[0].starts_with("g++ -m64 -std=c++17 -fopenmp -c"));
    assert!(lines[0].contains("-O3"));
    assert!(lines[2].starts_with("ar rcs ../bin/cpu_alfa.a"));
    assert!(lines[3].contains("-o ../bin/cpu_release_launcher.out"));
    assert!(lines[4].contains("-O0"));
    assert!(lines[6].starts_with("ar rcs ../bin/cpu_alfa_d.a"));
    assert!(lines[8].contains("-o ../bin/cpu_test_launcher.out"));
    assert!(lines[8].contains("gtest-all.cc"));
    assert!(lines.iter().all(|l| !l.contains("math/cpu") && !l.contains("math/cuda")));

    assert!(!tmp.path().join("bin").exists());
}

#[test]
fn test_accelerator_adds_cuda_libraries() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);

    alfa_build()
        .args(["gcc", "--dry-run", "--platform", "linux"])
        .current_dir(&scripts)
        .assert()
        .success()
        .stdout(predicate::str::contains("ar rcs ../bin/alfa.a"))
        .stdout(predicate::str::contains("cuda_math.a -lcudart -lcublas"))
        .stdout(predicate::str::contains("cuda_math_d.a -lcudart -lcublas"))
        .stdout(predicate::str::contains("-DUSE_CUDA"));
}

#[test]
fn test_msvc_rejected_on_linux() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);

    alfa_build()
        .args(["msvc", "--dry-run", "--platform", "linux"])
        .current_dir(&scripts)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn test_unknown_compiler() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);

    alfa_build()
        .args(["clang", "--dry-run"])
        .current_dir(&scripts)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown compiler `clang`"));
}

#[test]
fn test_msvc_plan_on_windows() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);

    let output = alfa_build()
        .args(["msvc", "no_cuda", "--plan", "--platform", "win32"])
        .current_dir(&scripts)
        .output()
        .unwrap();
    assert!(output.status.success());

    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["target"], "release");
    assert!(plans[2]["library"].is_null());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("vcvars64.bat"));
    assert!(text.contains("cpu_alfa.lib"));
    assert!(text.contains("cpu_test_launcher.exe"));
}

#[test]
fn test_layout_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let scripts = engine_project(&tmp);
    fs::write(
        scripts.join("alfa-build.toml"),
        "[layout]\noutput_dir = \"out/\"\nobjects_dir = \"out/obj/\"\n",
    )
    .unwrap();

    alfa_build()
        .args(["gcc", "no_cuda", "--dry-run", "--platform", "linux"])
        .current_dir(&scripts)
        .assert()
        .success()
        .stdout(predicate::str::contains("ar rcs out/cpu_alfa.a out/obj/configs.o"));
}

#[test]
fn test_missing_source_tree_still_links() {
    let tmp = TempDir::new().unwrap();
    let scripts = tmp.path().join("scripts");
    fs::create_dir_all(&scripts).unwrap();

    alfa_build()
        .args(["gcc", "no_cuda", "--dry-run", "--platform", "linux"])
        .current_dir(&scripts)
        .assert()
        .success()
        .stdout(predicate::str::contains("ar rcs ../bin/cpu_alfa.a\n"))
        .stdout(predicate::str::contains("cpu_release_launcher.out"));
}

// ============================================================================
// alfa-release
// ============================================================================

#[test]
fn test_release_requires_player() {
    let tmp = TempDir::new().unwrap();

    alfa_release()
        .arg("--build-dir")
        .arg(tmp.path().join("build"))
        .arg("--dest-root")
        .arg(tmp.path())
        .args(["--platform", "linux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ag_player_cpu"));

    assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
}
