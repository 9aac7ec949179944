use crate::cache;
use crate::catalog;
use crate::error::{AdvisorError, Result};

pub struct SyncResult {
    pub model_count: usize,
    pub provider_count: usize,
    pub path: std::path::PathBuf,
}

/// Download a catalog TOML from `url`, validate it, and write it to the cache.
/// Nothing is written if the download does not parse.
pub async fn sync_catalog(url: &str) -> Result<SyncResult> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()?;
    let path = cache::cache_path(cache::CATALOG_FILE)
        .ok_or_else(|| AdvisorError::Io("cannot determine cache directory".into()))?;

    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(AdvisorError::Other(format!(
            "catalog download failed (HTTP {})",
            resp.status().as_u16()
        )));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| AdvisorError::Io(format!("failed to read catalog response: {e}")))?;

    let parsed = catalog::parse_catalog(&text)?;

    std::fs::write(&path, &text)
        .map_err(|e| AdvisorError::Io(format!("failed to write catalog cache: {e}")))?;
    tracing::info!(url, models = parsed.len(), path = %path.display(), "catalog synced");

    Ok(SyncResult {
        model_count: parsed.len(),
        provider_count: parsed.providers().len(),
        path,
    })
}
