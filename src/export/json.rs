use super::model::SessionExport;
use crate::errors::AppResult;
use std::path::Path;

/// Write sessions as pretty-printed JSON.
pub fn write_json(path: &Path, rows: &[SessionExport]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)?;
    Ok(())
}
