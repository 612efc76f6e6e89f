use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANUAL: &str = "Resetting: hold the recessed reset button on the back panel for ten seconds until the status light blinks amber.\n\
Warranty: the manufacturer covers defects in materials and workmanship for two years from purchase, excluding water damage.\n\
Support: contact the help desk by email with the serial number printed on the label underneath the unit.";

/// Helper to run the CLI binary against `document` with small chunks
fn run_cli(temp_dir: &TempDir, document: &Path, args: &[&str]) -> Result<Output> {
    let config = temp_dir.path().join("docqa.toml");
    std::fs::write(
        &config,
        "[chunking]\nchunk_size = 150\noverlap = 10\n\n[embedding]\nprovider = \"hashing\"\ndimension = 128\n",
    )?;

    let output = Command::new(env!("CARGO_BIN_EXE_docqa-retriever"))
        .arg("--config")
        .arg(&config)
        .arg("--document")
        .arg(document)
        .args(args)
        .output()?;
    Ok(output)
}

fn write_manual(temp_dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = temp_dir.path().join("manual.txt");
    std::fs::write(&path, MANUAL)?;
    Ok(path)
}

#[test]
fn test_cli_help() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_docqa-retriever"))
        .arg("--help")
        .output()?;
    assert!(
        output.status.success(),
        "CLI help command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Query a reference document"));
    for command in ["chunks", "search", "sections", "status"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
    Ok(())
}

#[test]
fn test_cli_chunks_json() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = write_manual(&temp_dir)?;

    let output = run_cli(&temp_dir, &document, &["chunks", "--format", "json"])?;
    assert!(
        output.status.success(),
        "chunks failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let chunks: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let chunks = chunks.as_array().expect("chunk list");
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["index"], 0);
    assert_eq!(chunks[0]["source_offset"], 0);
    assert!(chunks[1]["text"].as_str().unwrap_or_default().contains("Warranty"));
    Ok(())
}

#[test]
fn test_cli_search_finds_passage() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = write_manual(&temp_dir)?;

    let output = run_cli(
        &temp_dir,
        &document,
        &["search", "warranty defects workmanship", "-k", "1"],
    )?;
    assert!(
        output.status.success(),
        "search failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("[Passage 1 | similarity "));
    assert!(stdout.contains("workmanship"));
    assert!(!stdout.contains("[Passage 2"));
    Ok(())
}

#[test]
fn test_cli_status_json() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = write_manual(&temp_dir)?;

    let output = run_cli(&temp_dir, &document, &["status", "--format", "json"])?;
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(status["initialized"], true);
    assert_eq!(status["generation_id"], 1);
    assert_eq!(status["dimension"], 128);
    assert_eq!(status["provider"], "hashing");
    Ok(())
}

#[test]
fn test_cli_missing_document() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let missing = temp_dir.path().join("absent.txt");

    // Diagnostic path reports the failure
    let search = run_cli(&temp_dir, &missing, &["search", "reset button"])?;
    assert!(!search.status.success());
    let stderr = String::from_utf8(search.stderr)?;
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("absent.txt"));

    // Production path degrades to no output
    let sections = run_cli(&temp_dir, &missing, &["sections", "reset button"])?;
    assert!(sections.status.success());
    assert!(sections.stdout.is_empty());
    Ok(())
}

#[test]
fn test_cli_rejects_unknown_format() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = write_manual(&temp_dir)?;

    let output = run_cli(&temp_dir, &document, &["status", "--format", "xml"])?;
    assert!(!output.status.success());
    Ok(())
}
