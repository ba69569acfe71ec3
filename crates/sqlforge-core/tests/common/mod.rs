#![allow(dead_code)]

use std::path::PathBuf;

use sqlforge_core::{Batch, GenerateOptions, GenerationContext, MemorySource, Operation};
use tempfile::TempDir;

pub fn context(operation: Operation, rows: &[&[&str]]) -> GenerationContext {
    let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
    GenerationContext::new().with_source(MemorySource::new().with_sheet(operation, rows))
}

pub fn without_banners() -> GenerateOptions {
    GenerateOptions {
        banners: false,
        ..GenerateOptions::default()
    }
}

pub fn strict() -> GenerateOptions {
    GenerateOptions {
        strict_identifiers: true,
        ..GenerateOptions::default()
    }
}

pub fn statements(batch: &Batch) -> Vec<&str> {
    batch.statements().collect()
}

/// Writes `contents` to `config.json` in a fresh temporary directory.
/// The directory lives as long as the returned guard.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let path = dir.path().join("config.json");
    std::fs::write(&path, contents).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    (dir, path)
}
