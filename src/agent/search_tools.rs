// MEDIASCOUT Search Tools — Multi-Source Stock Media Discovery
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// One HTTP client, three free providers: Unsplash, Pexels, Pixabay.
// A provider that errors, rate-limits, or returns garbage contributes
// zero candidates; the search as a whole never fails. Provider JSON is
// consumed by documented field paths, never by full deserialization,
// because these APIs add and drop fields without notice.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent::core::{AgentConfig, MediaType};
use crate::agent::retry::{with_retry, FetchError, RetryPolicy};

/// User agent sent on every search and download request.
pub const USER_AGENT: &str = "Mozilla/5.0 (MediaScout Agent)";

/// Descriptive fields a provider attaches to a search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateMetadata {
    pub photographer: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub page_url: Option<String>,
}

/// A transient search hit; lives only between search and download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub id: String,
    pub url: String,
    pub title: String,
    pub source: String,
    pub license: String,
    pub resolution: Option<String>,
    #[serde(default)]
    pub metadata: CandidateMetadata,
}

/// Issues search requests against every configured source.
pub struct SearchClient {
    http: reqwest::Client,
    retry: RetryPolicy,
    api_timeout: Duration,
    results_per_source: usize,
    unsplash_key: Option<String>,
    pexels_key: Option<String>,
    pixabay_key: Option<String>,
}

impl SearchClient {
    /// Build a client, picking API keys up from the environment.
    ///
    /// Missing keys are tolerated: Unsplash and Pexels are still queried
    /// (and answer 401, which is absorbed like any other source failure);
    /// Pixabay requires the key as a query parameter and is skipped.
    pub fn from_env(http: reqwest::Client, config: &AgentConfig) -> Self {
        let unsplash_key = env_key("UNSPLASH_ACCESS_KEY");
        let pexels_key = env_key("PEXELS_API_KEY");
        let pixabay_key = env_key("PIXABAY_API_KEY");

        let configured: Vec<&str> = [
            ("Unsplash", unsplash_key.is_some()),
            ("Pexels", pexels_key.is_some()),
            ("Pixabay", pixabay_key.is_some()),
        ]
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();

        if configured.is_empty() {
            warn!("[SEARCH] No API keys configured; sources may reject requests");
        } else {
            info!("[SEARCH] Configured sources: {}", configured.join(", "));
        }

        Self {
            http,
            retry: config.retry_policy(),
            api_timeout: config.api_timeout,
            results_per_source: config.results_per_source,
            unsplash_key,
            pexels_key,
            pixabay_key,
        }
    }

    /// Search every source for one query and deduplicate by URL.
    pub async fn search(&self, query: &str, media_type: MediaType) -> Vec<MediaCandidate> {
        info!("[SEARCH] 🌐 Searching sources for: '{}'", query);
        let mut candidates = Vec::new();

        match self.search_unsplash(query, media_type).await {
            Ok(hits) => {
                info!("[SEARCH]    ✓ Unsplash: {} results", hits.len());
                candidates.extend(hits);
            }
            Err(err) => warn!("[SEARCH]    ⚠️ Unsplash: {}", err),
        }

        match self.search_pexels(query, media_type).await {
            Ok(hits) => {
                info!("[SEARCH]    ✓ Pexels: {} results", hits.len());
                candidates.extend(hits);
            }
            Err(err) => warn!("[SEARCH]    ⚠️ Pexels: {}", err),
        }

        match self.search_pixabay(query, media_type).await {
            Ok(hits) => {
                info!("[SEARCH]    ✓ Pixabay: {} results", hits.len());
                candidates.extend(hits);
            }
            Err(err) => warn!("[SEARCH]    ⚠️ Pixabay: {}", err),
        }

        dedup_by_url(candidates)
    }

    async fn search_unsplash(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<MediaCandidate>, FetchError> {
        if media_type != MediaType::Image {
            return Ok(Vec::new());
        }

        let per_page = self.results_per_source.to_string();
        let data = with_retry(self.retry, || {
            let request = self
                .http
                .get("https://api.unsplash.com/search/photos")
                .query(&[
                    ("query", query),
                    ("order_by", "relevant"),
                    ("per_page", per_page.as_str()),
                ])
                .timeout(self.api_timeout);
            let request = match &self.unsplash_key {
                Some(key) => request.header("Authorization", format!("Client-ID {}", key)),
                None => request,
            };
            send_json(request)
        })
        .await?;

        Ok(parse_unsplash_results(&data))
    }

    async fn search_pexels(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<MediaCandidate>, FetchError> {
        let endpoint = match media_type {
            MediaType::Image => "https://api.pexels.com/v1/search",
            MediaType::Video => "https://api.pexels.com/videos/search",
        };

        let per_page = self.results_per_source.to_string();
        let data = with_retry(self.retry, || {
            let request = self
                .http
                .get(endpoint)
                .query(&[("query", query), ("per_page", per_page.as_str())])
                .timeout(self.api_timeout);
            let request = match &self.pexels_key {
                Some(key) => request.header("Authorization", key.as_str()),
                None => request,
            };
            send_json(request)
        })
        .await?;

        let hits = match media_type {
            MediaType::Image => parse_pexels_photos(&data),
            MediaType::Video => parse_pexels_videos(&data),
        };
        Ok(hits)
    }

    async fn search_pixabay(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<MediaCandidate>, FetchError> {
        if media_type != MediaType::Image {
            return Ok(Vec::new());
        }
        let key = match &self.pixabay_key {
            Some(key) => key.clone(),
            None => {
                debug!("[SEARCH] Pixabay key not set; skipping source");
                return Ok(Vec::new());
            }
        };

        let per_page = self.results_per_source.to_string();
        let data = with_retry(self.retry, || {
            let request = self
                .http
                .get("https://pixabay.com/api/")
                .query(&[
                    ("key", key.as_str()),
                    ("q", query),
                    ("image_type", "illustration"),
                    ("safesearch", "true"),
                    ("per_page", per_page.as_str()),
                ])
                .timeout(self.api_timeout);
            send_json(request)
        })
        .await?;

        Ok(parse_pixabay_hits(&data))
    }
}

/// Send a request and parse the body as JSON, mapping failures into the
/// fetch taxonomy so the retry helper can classify them.
async fn send_json(request: reqwest::RequestBuilder) -> Result<Value, FetchError> {
    let response = request.send().await.map_err(FetchError::from_reqwest)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| FetchError::Malformed(err.to_string()))
}

/// Keep the first occurrence of each URL across all sources.
pub fn dedup_by_url(candidates: Vec<MediaCandidate>) -> Vec<MediaCandidate> {
    let mut seen = HashSet::new();
    let unique: Vec<MediaCandidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect();
    debug!("[SEARCH] Deduplicated to {} unique candidates", unique.len());
    unique
}

/// Unsplash: `results[].urls.regular`; descriptions double as titles.
fn parse_unsplash_results(data: &Value) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();

    for photo in data["results"].as_array().map(Vec::as_slice).unwrap_or_default() {
        let url = match photo["urls"]["regular"].as_str() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };
        let id = photo["id"].as_str().unwrap_or("unknown");
        let description = photo["description"]
            .as_str()
            .or_else(|| photo["alt_description"].as_str());
        let width = photo["width"].as_u64().unwrap_or(0);
        let height = photo["height"].as_u64().unwrap_or(0);
        let tags = photo["tags"]
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t["title"].as_str())
                    .take(5)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        candidates.push(MediaCandidate {
            id: format!("unsplash_{}", id),
            url,
            title: description.unwrap_or("Unsplash Photo").to_string(),
            source: "unsplash".to_string(),
            license: "cc0".to_string(),
            resolution: Some(format!("{}x{}", width, height)),
            metadata: CandidateMetadata {
                photographer: photo["user"]["name"].as_str().map(str::to_string),
                description: description.map(str::to_string),
                tags,
                page_url: photo["links"]["html"].as_str().map(str::to_string),
            },
        });
    }

    candidates
}

/// Pexels images: `photos[].src.original`.
fn parse_pexels_photos(data: &Value) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();

    for photo in data["photos"].as_array().map(Vec::as_slice).unwrap_or_default() {
        let url = match photo["src"]["original"].as_str() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };
        let id = photo["id"].as_u64().unwrap_or(0);
        let alt = photo["alt"].as_str().filter(|alt| !alt.is_empty());
        let width = photo["width"].as_u64().unwrap_or(0);
        let height = photo["height"].as_u64().unwrap_or(0);

        candidates.push(MediaCandidate {
            id: format!("pexels_img_{}", id),
            url,
            title: alt
                .map(str::to_string)
                .unwrap_or_else(|| format!("Pexels Photo {}", id)),
            source: "pexels".to_string(),
            license: "free-commercial".to_string(),
            resolution: Some(format!("{}x{}", width, height)),
            metadata: CandidateMetadata {
                photographer: photo["photographer"].as_str().map(str::to_string),
                description: alt.map(str::to_string),
                tags: Vec::new(),
                page_url: photo["photographer_url"].as_str().map(str::to_string),
            },
        });
    }

    candidates
}

/// Pexels videos: `videos[].video_files[0].link`.
fn parse_pexels_videos(data: &Value) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();

    for video in data["videos"].as_array().map(Vec::as_slice).unwrap_or_default() {
        let url = match video["video_files"][0]["link"].as_str() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };
        let id = video["id"].as_u64().unwrap_or(0);
        let width = video["width"].as_u64().unwrap_or(0);
        let height = video["height"].as_u64().unwrap_or(0);

        candidates.push(MediaCandidate {
            id: format!("pexels_vid_{}", id),
            url,
            title: format!("Pexels Video {}", id),
            source: "pexels".to_string(),
            license: "free-commercial".to_string(),
            resolution: Some(format!("{}x{}", width, height)),
            metadata: CandidateMetadata {
                photographer: video["user"]["name"].as_str().map(str::to_string),
                description: None,
                tags: Vec::new(),
                page_url: video["url"].as_str().map(str::to_string),
            },
        });
    }

    candidates
}

/// Pixabay: `hits[].largeImageURL`; tags arrive as one comma-joined string.
fn parse_pixabay_hits(data: &Value) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();

    for hit in data["hits"].as_array().map(Vec::as_slice).unwrap_or_default() {
        let url = match hit["largeImageURL"].as_str() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };
        let id = hit["id"].as_u64().unwrap_or(0);
        let tags: Vec<String> = hit["tags"]
            .as_str()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let width = hit["imageWidth"].as_u64().unwrap_or(0);
        let height = hit["imageHeight"].as_u64().unwrap_or(0);
        let title = if tags.is_empty() {
            format!("Pixabay Illustration {}", id)
        } else {
            format!("Pixabay: {}", tags.join(", "))
        };

        candidates.push(MediaCandidate {
            id: format!("pixabay_{}", id),
            url,
            title,
            source: "pixabay".to_string(),
            license: "free".to_string(),
            resolution: Some(format!("{}x{}", width, height)),
            metadata: CandidateMetadata {
                photographer: hit["user"].as_str().map(str::to_string),
                description: None,
                tags,
                page_url: hit["pageURL"].as_str().map(str::to_string),
            },
        });
    }

    candidates
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(id: &str, url: &str) -> MediaCandidate {
        MediaCandidate {
            id: id.to_string(),
            url: url.to_string(),
            title: id.to_string(),
            source: "unsplash".to_string(),
            license: "cc0".to_string(),
            resolution: None,
            metadata: CandidateMetadata::default(),
        }
    }

    #[test]
    fn test_dedup_by_url_keeps_first() {
        let unique = dedup_by_url(vec![
            candidate("first", "https://example.com/a.png"),
            candidate("second", "https://example.com/a.png"),
            candidate("third", "https://example.com/b.png"),
        ]);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].id, "first");
        assert_eq!(unique[1].id, "third");
    }

    #[test]
    fn test_parse_unsplash_results() {
        let data = json!({
            "results": [
                {
                    "id": "xyz1",
                    "description": "cartoon kids learning",
                    "width": 1920,
                    "height": 1080,
                    "urls": { "regular": "https://images.unsplash.com/xyz1" },
                    "user": { "name": "Jo Artist" },
                    "tags": [ { "title": "cartoon" }, { "title": "kids" } ],
                    "links": { "html": "https://unsplash.com/photos/xyz1" }
                },
                {
                    "id": "broken",
                    "urls": {}
                }
            ]
        });

        let hits = parse_unsplash_results(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "unsplash_xyz1");
        assert_eq!(hits[0].url, "https://images.unsplash.com/xyz1");
        assert_eq!(hits[0].license, "cc0");
        assert_eq!(hits[0].resolution.as_deref(), Some("1920x1080"));
        assert_eq!(hits[0].metadata.tags, vec!["cartoon", "kids"]);
        assert_eq!(hits[0].metadata.photographer.as_deref(), Some("Jo Artist"));
    }

    #[test]
    fn test_parse_pexels_photos() {
        let data = json!({
            "photos": [
                {
                    "id": 42,
                    "width": 1280,
                    "height": 720,
                    "alt": "family playing together",
                    "photographer": "A. Lens",
                    "photographer_url": "https://pexels.com/@alens",
                    "src": { "original": "https://images.pexels.com/42.jpeg" }
                }
            ]
        });

        let hits = parse_pexels_photos(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "pexels_img_42");
        assert_eq!(hits[0].title, "family playing together");
        assert_eq!(hits[0].license, "free-commercial");
        assert_eq!(hits[0].resolution.as_deref(), Some("1280x720"));
    }

    #[test]
    fn test_parse_pexels_videos() {
        let data = json!({
            "videos": [
                {
                    "id": 7,
                    "width": 1920,
                    "height": 1080,
                    "url": "https://pexels.com/video/7",
                    "user": { "name": "V. Maker" },
                    "video_files": [ { "link": "https://videos.pexels.com/7.mp4" } ]
                }
            ]
        });

        let hits = parse_pexels_videos(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "pexels_vid_7");
        assert_eq!(hits[0].url, "https://videos.pexels.com/7.mp4");
        assert_eq!(hits[0].title, "Pexels Video 7");
    }

    #[test]
    fn test_parse_pixabay_hits_splits_tags() {
        let data = json!({
            "hits": [
                {
                    "id": 99,
                    "largeImageURL": "https://pixabay.com/get/99.png",
                    "tags": "cartoon, children, school",
                    "imageWidth": 800,
                    "imageHeight": 600,
                    "user": "illu_maker",
                    "pageURL": "https://pixabay.com/illustrations/99/"
                }
            ]
        });

        let hits = parse_pixabay_hits(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "pixabay_99");
        assert_eq!(hits[0].license, "free");
        assert_eq!(hits[0].metadata.tags, vec!["cartoon", "children", "school"]);
        assert!(hits[0].title.contains("cartoon"));
    }

    #[test]
    fn test_parse_malformed_shapes_yield_empty() {
        let data = json!({ "unexpected": true });
        assert!(parse_unsplash_results(&data).is_empty());
        assert!(parse_pexels_photos(&data).is_empty());
        assert!(parse_pexels_videos(&data).is_empty());
        assert!(parse_pixabay_hits(&data).is_empty());

        let scalar = json!(3);
        assert!(parse_unsplash_results(&scalar).is_empty());
        assert!(parse_pixabay_hits(&scalar).is_empty());
    }
}
