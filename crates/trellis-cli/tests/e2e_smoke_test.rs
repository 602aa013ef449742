use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use trellis::TrellisError;
use trellis_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos"))
}

/// A configuration using deterministic text metrics, so that results do
/// not depend on the fonts installed on the machine.
fn fixed_metrics_config(dir: &TempDir) -> String {
    let path = dir.path().join("config.toml");
    fs::write(&path, "[layout]\ntext_metrics = \"fixed\"\n").expect("Failed to write config");
    path.to_string_lossy().to_string()
}

fn args(input: &Path, output: &Path, config: &str, diagram: usize) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: Some(config.to_string()),
        diagram,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = fixed_metrics_config(&temp_dir);

    let valid_demos = collect_json_files(demos_path());
    assert!(!valid_demos.is_empty(), "No demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir.path().join(format!(
            "{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args(demo_path, &output_path, &config, 0)) {
            Ok(()) => {
                let svg = fs::read_to_string(&output_path).expect("Failed to read output");
                assert!(svg.contains("<svg"), "{}: not an SVG", demo_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = fixed_metrics_config(&temp_dir);

    let error_demos = collect_json_files(demos_path().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args(demo_path, &output_path, &config, 0)) {
            Err(TrellisError::Load { .. }) => {}
            Err(other) => panic!("{}: unexpected error {other}", demo_path.display()),
            Ok(()) => unexpectedly_succeeded.push(demo_path.clone()),
        }
        assert!(!output_path.exists());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_diagram_selection() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = fixed_metrics_config(&temp_dir);
    let input = demos_path().join("multi_diagram.json");

    let second = temp_dir.path().join("second.svg");
    run(&args(&input, &second, &config, 1)).expect("Second diagram should render");
    let svg = fs::read_to_string(&second).expect("Failed to read output");
    assert!(svg.contains("annotates the link"));

    let missing = temp_dir.path().join("missing.svg");
    let err = run(&args(&input, &missing, &config, 2)).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::NoSuchDiagram { index: 2, count: 2 }
    ));
}
