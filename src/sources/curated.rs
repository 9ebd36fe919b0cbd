//! Curated fallback: a hand-maintained JSON array of items.

use crate::models::CuratedItem;
use crate::utils::read_json_or;
use std::path::Path;
use tracing::{info, instrument};

/// Load the curated file. A missing or malformed file yields no items.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_curated(path: &Path) -> Vec<CuratedItem> {
    let items: Vec<CuratedItem> = read_json_or(path, Vec::new()).await;
    info!(count = items.len(), "Loaded curated items");
    items
}
