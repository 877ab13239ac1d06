//! Comma-delimited table helpers.
//!
//! Tables are small and written through plain buffered writers; values never
//! contain commas (scene names are normalized, channel labels validated).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Read a delimited table: header cells plus one record per non-empty line.
pub fn read_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut lines = content.lines();
    let header: Vec<String> = lines
        .next()
        .with_context(|| format!("{}: empty table", path.display()))?
        .split(',')
        .map(|s| s.to_string())
        .collect();
    let mut rows = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<String> = line.split(',').map(|s| s.to_string()).collect();
        if fields.len() != header.len() {
            bail!(
                "{}:{} expected {} fields, found {}",
                path.display(),
                idx + 2,
                header.len(),
                fields.len()
            );
        }
        rows.push(fields);
    }
    Ok((header, rows))
}

/// Write a whole table at once (header plus rows).
pub fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{}", header.join(","))?;
    for row in rows {
        writeln!(w, "{}", row.join(","))?;
    }
    w.flush()?;
    Ok(())
}

/// Best-effort file removal: failures are reported to the caller as a flag,
/// never as an error.
pub fn remove_best_effort(path: &Path) -> bool {
    std::fs::remove_file(path).is_ok()
}
