//! Integration tests for the stockcast binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog management
//! - Movement recording and history display
//! - The forecast report
//! - Journal rollup

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use stock_core::{JsonlSink, Movement, MovementSink};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stockcast"))
}

fn add_product(data_dir: &Path, id: i64, name: &str, min: i64, max: i64) {
    cli()
        .arg("add-product")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--id", &id.to_string(), "--name", name])
        .args(["--min", &min.to_string(), "--max", &max.to_string()])
        .assert()
        .success();
}

/// Write a movement dated `days_ago` straight into the journal
fn seed_movement(data_dir: &Path, id: i64, product_id: i64, days_ago: i64, quantity: i64) {
    let date = Utc::now() - Duration::days(days_ago);
    JsonlSink::new(data_dir.join("wal/movements.wal"))
        .append(&Movement::new(id, product_id, date, quantity))
        .expect("Failed to seed journal");
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Warehouse stock tracking and stockout forecasting",
        ));
}

#[test]
fn test_forecast_on_empty_catalog() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No products in catalog"));
}

#[test]
fn test_add_and_list_products() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_product(data_dir, 1, "T-shirt", 10, 200);
    add_product(data_dir, 2, "Manteau", 5, 40);
    add_product(data_dir, 3, "t-shirt col V", 0, 50);

    let catalog = fs::read_to_string(data_dir.join("products.csv")).unwrap();
    assert!(catalog.starts_with("id,name,stock_min,stock_max"));

    cli()
        .arg("products")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--prefix", "T-SHIRT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T-shirt (0)"))
        .stdout(predicate::str::contains("t-shirt col V (0)"))
        .stdout(predicate::str::contains("Manteau").not());
}

#[test]
fn test_add_product_rejects_bad_limits() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("add-product")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--id", "1", "--name", "Scarf", "--min", "30", "--max", "10"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("products.csv").exists());
}

#[test]
fn test_record_movement_logged_to_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_product(data_dir, 1, "T-shirt", 10, 200);

    cli()
        .arg("record")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["1", "420"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Movement recorded"))
        .stdout(predicate::str::contains("T-shirt (420)"));

    cli()
        .arg("record")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["1", "-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T-shirt (400)"));

    let journal = fs::read_to_string(data_dir.join("wal/movements.wal")).unwrap();
    let lines: Vec<serde_json::Value> = journal
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["id"], 2);
    assert_eq!(lines[1]["quantity"], -20);
}

#[test]
fn test_record_unknown_product_fails() {
    let temp_dir = setup_test_dir();
    add_product(temp_dir.path(), 1, "T-shirt", 10, 200);

    cli()
        .arg("record")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["7", "5"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("wal/movements.wal").exists());
}

#[test]
fn test_movements_newest_first() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_product(data_dir, 1, "Manteau", 5, 100);

    seed_movement(data_dir, 1, 1, 3, -10);
    seed_movement(data_dir, 2, 1, 20, 100);
    seed_movement(data_dir, 3, 1, 1, -5);

    let output = cli()
        .arg("movements")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("1")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);

    assert!(stdout.contains("Manteau (85)"));
    let pos = |needle: &str| stdout.find(needle).expect(needle);
    assert!(pos("#3 ") < pos("#1 "));
    assert!(pos("#1 ") < pos("#2 "));
}

#[test]
fn test_forecast_report() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_product(data_dir, 1, "Manteau", 5, 100);
    add_product(data_dir, 2, "Echarpe", 0, 50);
    add_product(data_dir, 3, "Bonnet", 0, 50);

    // 100 in, 10 out over 10 days: 1.00 per day
    seed_movement(data_dir, 1, 1, 10, 100);
    seed_movement(data_dir, 2, 1, 0, -10);
    // Restocked, never consumed
    seed_movement(data_dir, 3, 2, 4, 30);
    // 20 in, 12 out over 4 days: 3.00 per day
    seed_movement(data_dir, 4, 3, 4, 20);
    seed_movement(data_dir, 5, 3, 2, -12);

    let expected_date = (Utc::now() + Duration::days(90))
        .format("%Y-%m-%d")
        .to_string();

    let output = cli()
        .arg("forecast")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);

    assert!(stdout.contains("Stockout date"));
    assert!(stdout.contains("1.00"));
    assert!(stdout.contains("3.00"));
    assert!(stdout.contains("0.00"));
    assert!(stdout.contains(&expected_date), "{}", stdout);

    // Latest stockout first, unprojected last
    let pos = |needle: &str| stdout.find(needle).expect(needle);
    assert!(pos("Manteau") < pos("Bonnet"));
    assert!(pos("Bonnet") < pos("Echarpe"));
}

#[test]
fn test_forecast_rejects_invalid_catalog() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("products.csv"),
        "id,name,stock_min,stock_max\n1,Hat,0,5\n1,Cap,0,5\n",
    )
    .unwrap();

    cli()
        .arg("forecast")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate product id 1"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_product(data_dir, 1, "T-shirt", 10, 200);

    for quantity in ["50", "-5", "-7"] {
        cli()
            .arg("record")
            .arg("--data-dir")
            .arg(data_dir)
            .args(["1", quantity])
            .assert()
            .success();
    }

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 movements"));

    let csv_content = fs::read_to_string(data_dir.join("movements.csv")).unwrap();
    assert!(csv_content.starts_with("id,product_id,date,quantity"));

    // History survives the rollup
    cli()
        .arg("movements")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("T-shirt (38)"));

    // Ids continue after the rollup
    cli()
        .arg("record")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["1", "1"])
        .assert()
        .success();
    let journal = fs::read_to_string(data_dir.join("wal/movements.wal")).unwrap();
    assert!(journal.contains("\"id\":4"));
}

#[test]
fn test_rollup_with_cleanup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_product(data_dir, 1, "T-shirt", 10, 200);

    cli()
        .arg("record")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["1", "5"])
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned up 1 processed journal"));

    let entries: Vec<_> = fs::read_dir(data_dir.join("wal"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".wal.processed"))
        .collect();
    assert_eq!(entries.len(), 0);
}

#[test]
fn test_cleanup_without_live_journal() {
    let temp_dir = setup_test_dir();
    let wal_dir = temp_dir.path().join("wal");
    fs::create_dir_all(&wal_dir).unwrap();
    fs::write(wal_dir.join("movements.wal.processed"), "").unwrap();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"))
        .stdout(predicate::str::contains("Cleaned up 1 processed journal"));

    assert!(!wal_dir.join("movements.wal.processed").exists());
}

#[test]
fn test_empty_rollup() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}
