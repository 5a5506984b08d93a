//! Walks every `fixtures/<name>.schema.json` and checks the result against
//! `fixtures/<name>.fields.json`.
//!
//! `cargo run -p dev-test-runner [-- <fixtures dir>]`
mod expect;

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use expect::{from_str_with_path, Expectation};

static SCHEMA_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<name>.+)\.schema\.json$").unwrap());

fn fixture_pairs(dir: &Path) -> Result<Vec<(String, PathBuf, PathBuf)>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let Some(caps) = SCHEMA_FILE.captures(file_name) else { continue };
        let name = caps["name"].to_string();
        let expected = dir.join(format!("{name}.fields.json"));
        out.push((name, path, expected));
    }
    out.sort();
    Ok(out)
}

fn check(schema_path: &Path, expected_path: &Path) -> Result<Vec<String>> {
    let schema_src = std::fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read {}", schema_path.display()))?;
    let schema: serde_json::Value = from_str_with_path(&schema_src)
        .with_context(|| format!("failed to parse {}", schema_path.display()))?;
    let expected_src = std::fs::read_to_string(expected_path)
        .with_context(|| format!("failed to read {}", expected_path.display()))?;
    let expectation: Expectation = from_str_with_path(&expected_src)
        .with_context(|| format!("failed to parse {}", expected_path.display()))?;

    let actual = match &expectation.reference {
        Some(reference) => field_docs::document_reference(&schema, reference)?,
        None => field_docs::document_schema(&schema)?,
    };
    Ok(expectation.mismatches(&actual))
}

fn main() -> Result<()> {
    let dir = std::env::args().nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"));

    let mut failed = 0usize;
    let pairs = fixture_pairs(&dir)?;
    for (name, schema_path, expected_path) in &pairs {
        match check(schema_path, expected_path) {
            Ok(mismatches) if mismatches.is_empty() => eprintln!("✅ {name}"),
            Ok(mismatches) => {
                failed += 1;
                eprintln!("❌ {name}");
                for m in mismatches {
                    eprintln!("   {m}");
                }
            }
            Err(error) => {
                failed += 1;
                eprintln!("❌ {name}: {error:#}");
            }
        }
    }
    eprintln!("{} fixtures, {failed} failed", pairs.len());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
