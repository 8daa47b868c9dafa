//! Quote snapshot loading

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use trainsched_core::QuoteSnapshot;

/// Snapshot file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Toml,
    Json,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(SnapshotFormat::Toml),
            Some("json") => Ok(SnapshotFormat::Json),
            Some(other) => bail!("unsupported snapshot extension '.{other}' (expected .toml or .json)"),
            None => bail!("snapshot file {} has no extension", path.display()),
        }
    }
}

/// Read and parse a quote snapshot
pub fn load_snapshot(path: &Path) -> Result<QuoteSnapshot> {
    let format = SnapshotFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_snapshot(&text, format).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_snapshot(text: &str, format: SnapshotFormat) -> Result<QuoteSnapshot> {
    let snapshot = match format {
        SnapshotFormat::Toml => toml::from_str(text)?,
        SnapshotFormat::Json => serde_json::from_str(text)?,
    };
    Ok(snapshot)
}
