//! End-to-end pipeline tests driving the real binary against a
//! temporary Java source tree. The delegated simplification is disabled
//! so runs are hermetic and deterministic.

use std::path::{Path, PathBuf};
use std::process::Command;

fn run_archmap(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_archmap");
    Command::new(bin).args(args).output().expect("failed to run archmap binary")
}

fn write_tree(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    for (path, content) in files {
        let full = dir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    dir
}

fn animal_tree(name: &str) -> PathBuf {
    write_tree(
        name,
        &[
            (
                "com/app/Animal.java",
                "package com.app;\n\npublic abstract class Animal {\n    protected int age;\n\n    public abstract void speak();\n}\n",
            ),
            (
                "com/app/Dog.java",
                "package com.app;\n\npublic class Dog extends Animal {\n    private String name;\n\n    public void speak() {}\n}\n",
            ),
            (
                "com/app/Trainer.java",
                "package com.app;\n\npublic class Trainer {\n    private Dog pupil;\n}\n",
            ),
        ],
    )
}

fn diagram_args(dir: &Path, out: &Path) -> Vec<String> {
    vec![
        "diagram".to_string(),
        dir.to_string_lossy().to_string(),
        "--out".to_string(),
        out.to_string_lossy().to_string(),
        "--no-simplify".to_string(),
    ]
}

#[test]
fn full_pipeline_produces_expected_edges() {
    let dir = animal_tree("archmap_e2e_edges");
    let out = dir.join("out");
    let args = diagram_args(&dir, &out);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = run_archmap(&arg_refs);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let full = std::fs::read_to_string(out.join("architecture_full.puml")).unwrap();
    assert!(full.contains("abstract class \"com.app.Animal\""));
    assert!(full.contains("\"com.app.Animal\" <|-- \"com.app.Dog\" : extends"));
    assert!(full.contains("\"com.app.Trainer\" *-- \"com.app.Dog\" : has"));
    // Exactly one inheritance and one composition edge.
    assert_eq!(full.matches("<|--").count(), 1);
    assert_eq!(full.matches("*--").count(), 1);

    // The simplified view collapses Trainer but keeps the inheritance edge.
    let simplified =
        std::fs::read_to_string(out.join("architecture_simplified_view.puml")).unwrap();
    assert!(simplified.contains("\"com.app.Animal\" <|-- \"com.app.Dog\" : extends"));
    assert!(simplified.contains("\"com.app.other\""));
    assert!(!simplified.contains("class \"com.app.Trainer\""));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn full_diagram_is_byte_identical_across_runs() {
    let dir = animal_tree("archmap_e2e_determinism");
    let out_a = dir.join("out_a");
    let out_b = dir.join("out_b");

    for out in [&out_a, &out_b] {
        let args = diagram_args(&dir, out);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        assert!(run_archmap(&arg_refs).status.success());
    }

    let first = std::fs::read_to_string(out_a.join("architecture_full.puml")).unwrap();
    let second = std::fs::read_to_string(out_b.join("architecture_full.puml")).unwrap();
    assert_eq!(first, second);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn one_invalid_file_is_reported_but_not_fatal() {
    let dir = write_tree(
        "archmap_e2e_resilience",
        &[
            ("Good.java", "package app;\npublic class Good {}\n"),
            ("Broken.java", "public class { this is not java"),
        ],
    );
    let out = dir.join("out");
    let args = diagram_args(&dir, &out);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = run_archmap(&arg_refs);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Recorded 1 diagnostics"));
    assert!(stdout.contains("Broken.java"));

    let report = std::fs::read_to_string(out.join("model.yaml")).unwrap();
    assert!(report.contains("Broken.java"));
    assert!(report.contains("app.Good"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn model_command_writes_report_only() {
    let dir = animal_tree("archmap_e2e_model");
    let out = dir.join("out");

    let output = run_archmap(&[
        "model",
        dir.to_string_lossy().as_ref(),
        "--out",
        out.to_string_lossy().as_ref(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Model assembled: 3 entities"));

    assert!(out.join("model.yaml").exists());
    assert!(!out.join("architecture_full.puml").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exclude_pattern_drops_matching_files() {
    let dir = write_tree(
        "archmap_e2e_exclude",
        &[
            ("Main.java", "package app;\npublic class Main {}\n"),
            ("MainTest.java", "package app;\npublic class MainTest {}\n"),
        ],
    );
    let out = dir.join("out");

    let output = run_archmap(&[
        "model",
        dir.to_string_lossy().as_ref(),
        "--out",
        out.to_string_lossy().as_ref(),
        "--exclude",
        ".*Test\\.java",
    ]);
    assert!(output.status.success());

    let report = std::fs::read_to_string(out.join("model.yaml")).unwrap();
    assert!(report.contains("app.Main"));
    assert!(!report.contains("MainTest"));

    let _ = std::fs::remove_dir_all(&dir);
}
