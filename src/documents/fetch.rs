use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::types::{AppError, AppResult};

/// Stream `url` to `dest`, returning the number of bytes written.
///
/// Fails on a non-success status or once the body grows past `max_bytes`;
/// a partially written file is removed before returning the error.
pub async fn download_to(client: &Client, url: &str, dest: &Path, max_bytes: u64) -> AppResult<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Extraction(format!("Download request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Extraction(format!("Download returned {}", status)));
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes {
            return Err(AppError::Extraction(format!(
                "Document is {} bytes, limit is {}",
                length, max_bytes
            )));
        }
    }

    let written = match write_stream(response, dest, max_bytes).await {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(dest).await;
            return Err(e);
        }
    };

    info!(url = %url, bytes = written, "Document downloaded");
    Ok(written)
}

async fn write_stream(response: reqwest::Response, dest: &Path, max_bytes: u64) -> AppResult<u64> {
    let mut file = fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::Extraction(format!("Download interrupted: {}", e)))?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(AppError::Extraction(format!(
                "Document exceeds the {} byte limit",
                max_bytes
            )));
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    debug!(path = %dest.display(), bytes = written, "Download flushed");
    Ok(written)
}
