#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use assert_cmd::Command;
use setup_sheets_lib::{db, PartStore};
use tempfile::tempdir;

#[path = "util.rs"]
mod util;

#[test]
fn status_reports_an_empty_database() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("sheets.sqlite3");

    let output = Command::cargo_bin("setup-sheets")?
        .args(["--db", db_path.to_str().unwrap(), "status"])
        .output()?;
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Schema version : 1"));
    assert!(stdout.contains("Setup sheets   : 0"));

    let json_output = Command::cargo_bin("setup-sheets")?
        .args(["--db", db_path.to_str().unwrap(), "status", "--json"])
        .output()?;
    assert!(json_output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&json_output.stdout)?;
    assert_eq!(report.get("parts").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(
        report.get("schema_version").and_then(|v| v.as_i64()),
        Some(db::SCHEMA_VERSION)
    );
    Ok(())
}

#[test]
fn list_prints_and_filters_stored_sheets() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("sheets.sqlite3");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let pool = db::open_sqlite_pool(&db_path).await?;
        db::init_schema(&pool).await?;
        let store = PartStore::new(pool.clone());
        store.insert(&util::sample_part("Bracket-7")).await?;
        store.insert(&util::sample_part("Spacer")).await?;
        pool.close().await;
        anyhow::Ok(())
    })?;

    let output = Command::cargo_bin("setup-sheets")?
        .args(["--db", db_path.to_str().unwrap(), "list"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bracket-7"));
    assert!(stdout.contains("Spacer"));

    let filtered = Command::cargo_bin("setup-sheets")?
        .args(["--db", db_path.to_str().unwrap(), "list", "--search", "bracket"])
        .output()?;
    assert!(filtered.status.success());
    let stdout = String::from_utf8_lossy(&filtered.stdout);
    assert!(stdout.contains("Bracket-7"));
    assert!(!stdout.contains("Spacer"));
    Ok(())
}

#[test]
fn show_prints_tool_lists() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("sheets.sqlite3");

    let runtime = tokio::runtime::Runtime::new()?;
    let id = runtime.block_on(async {
        let pool = db::open_sqlite_pool(&db_path).await?;
        db::init_schema(&pool).await?;
        let store = PartStore::new(pool.clone());
        let id = store.insert(&util::sample_part("Bracket-7")).await?;
        pool.close().await;
        anyhow::Ok(id)
    })?;

    let output = Command::cargo_bin("setup-sheets")?
        .args(["--db", db_path.to_str().unwrap(), "show", &id.to_string()])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bracket-7"));
    assert!(stdout.contains("T1"));
    assert!(stdout.contains("Face"));
    Ok(())
}
