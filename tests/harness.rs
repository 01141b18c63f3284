//! Golden-file test harness for sugarc.
//!
//! Discovers `.input.c` files under `tests/fixtures/`, runs the pipeline
//! (parse → desugar → codegen), and compares output against the
//! corresponding `.expected.c` file.
//!
//! Files under `tests/fixtures/errors/` are plain `.c` files whose first line
//! is `// error: <Kind>`; lowering them must fail with that kind.
//!
//! Set `SG_UPDATE_FIXTURES=1` to overwrite expected files with actual output.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use sg_ast::SyntaxFlags;
use sg_codegen::{emit_program, Config};
use sg_desugar::{desugar_program, LowerError};
use sg_parser::parse_program;

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/sg_test/, so go up two levels to workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

fn collect_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir(dir)
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

enum Failure {
    Parse(String),
    Lower(LowerError),
}

fn run_pipeline(source: &str, filename: &str) -> Result<String, Failure> {
    let parsed = parse_program(source, filename, &SyntaxFlags::default())
        .map_err(|e| Failure::Parse(e.message))?;
    let program = desugar_program(parsed.program).map_err(Failure::Lower)?;
    Ok(emit_program(&program, &Config::default()))
}

fn describe(failure: &Failure) -> String {
    match failure {
        Failure::Parse(message) => format!("parse error: {message}"),
        Failure::Lower(err) => format!("lowering error: {err}"),
    }
}

fn verify_plain_c(output: &str, filename: &str) -> Result<()> {
    parse_program(output, filename, &SyntaxFlags::plain()).map_err(|e| anyhow!(e.message))?;
    Ok(())
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_files(&fixtures, ".input.c");

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("SG_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = PathBuf::from(
            input_path
                .to_str()
                .unwrap()
                .replace(".input.c", ".expected.c"),
        );
        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let actual = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: {}", describe(&e)));
                continue;
            }
        };

        if let Err(e) = verify_plain_c(&actual, &format!("{test_name}.output")) {
            failures.push(format!("{test_name}: output is not plain C: {e}"));
            continue;
        }

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!(
                    "{test_name}: failed to read {}: {e}",
                    expected_path.display()
                ));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn roundtrip_tests() {
    let fixtures = fixtures_dir().join("roundtrip");
    let input_files = collect_files(&fixtures, ".input.c");
    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let output = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: {}", describe(&e)));
                continue;
            }
        };

        if let Err(e) = verify_plain_c(&output, &format!("{test_name}.output")) {
            failures.push(format!(
                "{test_name}: output is not plain C: {e}\n--- output ---\n{}",
                output.trim()
            ));
            continue;
        }

        // Lowering plain C is the identity.
        match run_pipeline(&output, &test_name) {
            Ok(again) if again == output => {}
            Ok(again) => failures.push(format!(
                "{test_name}: output is not a fixed point\n--- first ---\n{}\n--- second ---\n{}",
                output.trim(),
                again.trim()
            )),
            Err(e) => failures.push(format!("{test_name}: re-lowering: {}", describe(&e))),
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} roundtrip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn error_fixture_tests() {
    let fixtures = fixtures_dir().join("errors");
    let files = collect_files(&fixtures, ".c");
    assert!(!files.is_empty(), "No error fixtures in {}", fixtures.display());
    let mut failures = Vec::new();

    for path in &files {
        let test_name = path.file_name().unwrap().to_str().unwrap().to_string();
        let source = std::fs::read_to_string(path).unwrap();
        let Some(expected) = source
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("// error: "))
            .map(str::trim)
        else {
            failures.push(format!("{test_name}: first line must be `// error: <Kind>`"));
            continue;
        };

        match run_pipeline(&source, &path.display().to_string()) {
            Err(Failure::Lower(err)) if err.kind.as_str() == expected => {}
            Err(e) => failures.push(format!("{test_name}: expected {expected}, got {}", describe(&e))),
            Ok(output) => failures.push(format!(
                "{test_name}: expected {expected}, but lowering succeeded:\n{}",
                output.trim()
            )),
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} error fixture(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
