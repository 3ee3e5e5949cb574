use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::color::ColorVariant;
use super::data_url;

/// Short id for one generated portrait (e.g., "hp_1a2b3c4d")
pub fn new_portrait_id() -> String {
    let uuid = Uuid::new_v4();
    format!("hp_{}", &uuid.to_string()[..8])
}

/// File name for a portrait generated at `at`
pub fn portrait_file_name(id: &str, color: ColorVariant, at: DateTime<Utc>, mime_type: &str) -> String {
    format!(
        "portrait_{}_{}_{}.{}",
        color.as_str(),
        at.format("%Y%m%d_%H%M%S"),
        id.trim_start_matches("hp_"),
        data_url::extension_for_mime(mime_type)
    )
}

/// Decode a generated portrait and write it into `output_dir`
pub async fn save_portrait(
    image: &str,
    output_dir: &Path,
    id: &str,
    color: ColorVariant,
    at: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mime_type = data_url::decode(image).mime_type;
    let path = output_dir.join(portrait_file_name(id, color, at, &mime_type));

    let bytes = data_url::to_bytes(image).context("Failed to decode base64 image")?;
    fs::write(&path, &bytes).await?;

    tracing::info!("Saved portrait to: {}", path.display());
    Ok(path)
}
