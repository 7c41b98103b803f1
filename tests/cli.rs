mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use predicates::str::contains;

#[test]
fn inspect_prints_a_preview_table() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args(["inspect", "-i", fixture_path("orders.csv").to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Widget"))
        .stdout(contains("price"));
}

#[test]
fn inspect_rejects_unknown_extensions() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("data.parquet", "a,b\n1,2\n");
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args(["inspect", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("unsupported file type"));
}

#[test]
fn inspect_writes_a_dataset_summary() {
    let workspace = TestWorkspace::new();
    let summary_path = workspace.path().join("orders.summary.json");
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "inspect",
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "--summary",
            summary_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let raw = fs::read_to_string(&summary_path).expect("read summary");
    let summary: serde_json::Value = serde_json::from_str(&raw).expect("parse summary");
    assert_eq!(summary["fileType"], "csv");
    assert_eq!(summary["rows"], 2);
    assert_eq!(summary["columns"][1], "price");
}

#[test]
fn columns_profiles_names_without_data() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args(["columns", "--names", "created_at,unit_price,region", "--json"])
        .assert()
        .success()
        .stdout(contains("\"dataType\": \"date\""))
        .stdout(contains("\"source\": \"heuristic\""));
}

#[test]
fn columns_requires_some_input() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args(["columns"])
        .assert()
        .failure()
        .stderr(contains("Provide --input, --summary, or --names"));
}

#[test]
fn plot_emits_a_chart_specification() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "-C",
            "price,date",
        ])
        .assert()
        .success()
        .stdout(contains("\"type\": \"bar\""))
        .stdout(contains("\"xAxis\": \"price\""));
}

#[test]
fn plot_rejects_single_column_selections() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "-C",
            "price",
        ])
        .assert()
        .failure()
        .stderr(contains("at least 2 columns"));
}

#[test]
fn plot_rejects_oversized_selections() {
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            fixture_path("orders.csv").to_str().unwrap(),
            "-C",
            "a,b,c,d,e",
        ])
        .assert()
        .failure()
        .stderr(contains("between 2 and 4"));
}

#[test]
fn summary_driven_plot_degrades_without_the_blob() {
    let workspace = TestWorkspace::new();
    let bytes = fs::read(fixture_path("orders.csv")).expect("read fixture");
    let input = workspace.write_bytes("orders.csv", &bytes);
    let summary_path = workspace.path().join("orders.summary.json");

    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "inspect",
            "-i",
            input.to_str().unwrap(),
            "--summary",
            summary_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    // Blob still present: real data, bar chart.
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "plot",
            "--summary",
            summary_path.to_str().unwrap(),
            "-C",
            "price,date",
        ])
        .assert()
        .success()
        .stdout(contains("\"type\": \"bar\""));

    // Blob deleted: the same request still renders, with placeholder data.
    fs::remove_file(&input).expect("delete blob");
    Command::cargo_bin("tabchart")
        .expect("binary exists")
        .args([
            "plot",
            "--summary",
            summary_path.to_str().unwrap(),
            "-C",
            "price,date",
        ])
        .assert()
        .success()
        .stdout(contains("\"type\": \"scatter\""));
}
