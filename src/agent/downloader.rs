// MEDIASCOUT Downloader — Ranked Candidate Acquisition
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Walks the scored candidate list best-first and fetches until the
// request quantity is met. Every payload passes the download guard and
// an in-memory decode check before anything is written under the output
// directory; a candidate that fails any step is skipped, never fatal.

use chrono::Utc;
use image::GenericImageView;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::agent::core::{AgentConfig, MediaRequest, MediaResult, MediaType};
use crate::agent::download_guard::DownloadGuard;
use crate::agent::retry::{with_retry, FetchError};
use crate::agent::scoring::ScoredCandidate;

/// Download the ranked candidates in order until `request.quantity` files
/// are on disk or the list runs out. URLs already fetched this session
/// are skipped without touching the network.
pub async fn download_candidates(
    http: &reqwest::Client,
    config: &AgentConfig,
    ranked: &[ScoredCandidate],
    request: &MediaRequest,
    output_dir: &Path,
    downloaded_urls: &mut HashSet<String>,
) -> Vec<MediaResult> {
    let subdir = output_dir.join(request.context_tag());
    let mut results: Vec<MediaResult> = Vec::new();

    for scored in ranked {
        if results.len() >= request.quantity {
            break;
        }
        let candidate = &scored.candidate;

        if downloaded_urls.contains(&candidate.url) {
            debug!("[DOWNLOAD] Skipping duplicate URL: {}", candidate.url);
            continue;
        }
        if let Err(reason) = DownloadGuard::validate_url(&candidate.url) {
            warn!("[DOWNLOAD] 🛡️ Skipping '{}': {}", candidate.title, reason);
            continue;
        }

        info!(
            "[DOWNLOAD] 📥 Fetching {}/{}: {}",
            results.len() + 1,
            request.quantity,
            candidate.title
        );

        let (bytes, content_type) = match fetch_bytes(http, config, &candidate.url).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!("[DOWNLOAD] ⚠️ Skipping '{}': {}", candidate.title, err);
                continue;
            }
        };

        if request.media_type == MediaType::Image {
            if let Err(reason) = validate_image_bytes(&bytes, config) {
                warn!("[DOWNLOAD] ⚠️ Rejected '{}': {}", candidate.title, reason);
                continue;
            }
        }

        let ext = infer_extension(&content_type, &candidate.url, ".bin");
        if let Err(err) = fs::create_dir_all(&subdir) {
            warn!("[DOWNLOAD] ❌ Cannot create {:?}: {}", subdir, err);
            break;
        }

        let filename = format!(
            "{}_{}{}",
            DownloadGuard::sanitize_filename(&candidate.id),
            Utc::now().timestamp(),
            ext
        );
        let filepath = subdir.join(filename);

        if let Err(err) = fs::write(&filepath, &bytes) {
            warn!("[DOWNLOAD] ❌ Write failed for {:?}: {}", filepath, err);
            continue;
        }

        // Post-write screening; a rejected file must not stay on disk.
        if let Err(reason) = DownloadGuard::validate_downloaded_file(&filepath) {
            warn!("[DOWNLOAD] 🛡️ Removing rejected file {:?}: {}", filepath, reason);
            let _ = fs::remove_file(&filepath);
            continue;
        }

        let file_size = bytes.len() as u64;
        let sha256 = hex_digest(&bytes);
        info!(
            "[DOWNLOAD] ✅ Saved: {:?} ({:.0} KB)",
            filepath,
            file_size as f64 / 1024.0
        );

        downloaded_urls.insert(candidate.url.clone());
        results.push(MediaResult {
            id: candidate.id.clone(),
            url: candidate.url.clone(),
            local_path: filepath,
            title: candidate.title.clone(),
            license: candidate.license.clone(),
            source: candidate.source.clone(),
            media_type: request.media_type,
            resolution: candidate.resolution.clone(),
            file_size,
            sha256,
            quality_score: scored.quality_score,
            relevance_score: scored.relevance_score,
            style_confidence: scored.style_confidence,
            final_score: scored.final_score,
            metadata: candidate.metadata.clone(),
            downloaded_at: Utc::now().to_rfc3339(),
        });
    }

    results
}

/// One GET through the retry helper; returns body bytes and content type.
async fn fetch_bytes(
    http: &reqwest::Client,
    config: &AgentConfig,
    url: &str,
) -> Result<(Vec<u8>, String), FetchError> {
    with_retry(config.retry_policy(), || {
        let request = http.get(url).timeout(config.download_timeout);
        async move {
            let response = request.send().await.map_err(FetchError::from_reqwest)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
            Ok((bytes.to_vec(), content_type))
        }
    })
    .await
}

/// Decode the payload in memory and enforce the dimension floor and the
/// size ceiling before anything touches disk.
fn validate_image_bytes(bytes: &[u8], config: &AgentConfig) -> Result<(u32, u32), String> {
    let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
    if size_mb > config.max_file_size_mb {
        return Err(format!("Too large: {:.1} MB", size_mb));
    }

    let img = image::load_from_memory(bytes).map_err(|e| format!("Invalid image: {}", e))?;
    let (width, height) = img.dimensions();
    if width < config.min_image_width || height < config.min_image_height {
        return Err(format!("Too small: {}x{}", width, height));
    }

    Ok((width, height))
}

/// Map a content-type header to a file extension, falling back to the URL
/// suffix and finally to `fallback`.
pub fn infer_extension(content_type: &str, url: &str, fallback: &str) -> String {
    let ct = content_type.to_lowercase();
    for (needle, ext) in [
        ("jpeg", ".jpg"),
        ("jpg", ".jpg"),
        ("png", ".png"),
        ("webp", ".webp"),
        ("gif", ".gif"),
        ("mp4", ".mp4"),
        ("webm", ".webm"),
        ("mpeg", ".mpeg"),
        ("mp3", ".mp3"),
        ("wav", ".wav"),
    ] {
        if ct.contains(needle) {
            return ext.to_string();
        }
    }

    // No usable header; try the URL path with any query string stripped.
    let path = url.split('?').next().unwrap_or(url);
    if let Some((_, suffix)) = path.rsplit_once('.') {
        if !suffix.is_empty()
            && suffix.len() <= 4
            && suffix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return format!(".{}", suffix.to_lowercase());
        }
    }

    fallback.to_string()
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
