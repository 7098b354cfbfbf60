use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn stmtx_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".stmtx"))
}

pub fn ensure_stmtx_home() -> Result<PathBuf> {
    let dir = stmtx_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a statement file from disk.
pub fn read_statement(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

/// Name shown in reports: the file name when there is one.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
