//! Snapshot persistence.

use crate::errors::Result;
use crate::market::MarketSnapshot;
use std::path::Path;

/// Pretty-printed JSON form of a snapshot.
pub fn snapshot_to_json(snapshot: &MarketSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Overwrite `path` with the latest snapshot.
pub async fn write_snapshot(path: &Path, snapshot: &MarketSnapshot) -> Result<()> {
    let json = snapshot_to_json(snapshot)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
