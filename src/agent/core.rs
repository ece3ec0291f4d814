// MEDIASCOUT Agent Core — The Gathering Pipeline
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Central orchestrator powering the CLI: expands a request into search
// queries, fans them across the stock-media sources, scores and ranks
// the candidates, downloads the winners, and emits a JSON-ready report.
// A request with zero successful downloads yields a partial report, not
// an error; failure detail lives in logs and report structures.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::agent::download_guard::DownloadGuard;
use crate::agent::downloader;
use crate::agent::report::GatheringReport;
use crate::agent::retry::RetryPolicy;
use crate::agent::scoring::{self, StyleLexicon};
use crate::agent::search_tools::{self, CandidateMetadata, SearchClient, USER_AGENT};

/// Tunable knobs for one gathering session.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    // Search
    pub max_search_queries: usize,
    pub results_per_source: usize,

    // Scoring thresholds and weights
    pub min_final_score: f64,
    pub style_confidence_weight: f64,
    pub quality_weight: f64,
    pub relevance_weight: f64,

    // Scoring defaults
    pub base_quality_score: f64,
    pub base_relevance_score: f64,
    pub base_style_confidence: f64,

    // Quality bonuses
    pub quality_bonus_fhd: f64,
    pub quality_bonus_hd: f64,
    pub quality_bonus_cc0: f64,
    pub quality_bonus_free: f64,

    // Relevance calculation
    pub keyword_match_weight: f64,

    // Download constraints
    pub min_image_width: u32,
    pub min_image_height: u32,
    pub max_file_size_mb: f64,
    pub download_timeout: Duration,
    pub api_timeout: Duration,

    // Retry
    pub max_retries: u32,
    pub retry_delay_base: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_search_queries: 5,
            results_per_source: 5,
            min_final_score: 50.0,
            style_confidence_weight: 0.2,
            quality_weight: 0.4,
            relevance_weight: 0.6,
            base_quality_score: 75.0,
            base_relevance_score: 50.0,
            base_style_confidence: 0.5,
            quality_bonus_fhd: 15.0,
            quality_bonus_hd: 10.0,
            quality_bonus_cc0: 10.0,
            quality_bonus_free: 5.0,
            keyword_match_weight: 40.0,
            min_image_width: 400,
            min_image_height: 300,
            max_file_size_mb: 25.0,
            download_timeout: Duration::from_secs(10),
            api_timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_delay_base: 1.0,
        }
    }
}

impl AgentConfig {
    /// Preset tuned for cartoon/illustration retrieval: heavier style
    /// weighting and a lower acceptance floor, relying on style
    /// confidence to separate illustrations from photographs.
    pub fn cartoon_optimized() -> Self {
        Self {
            min_final_score: 45.0,
            style_confidence_weight: 0.3,
            quality_weight: 0.3,
            relevance_weight: 0.5,
            base_quality_score: 70.0,
            base_style_confidence: 0.4,
            ..Self::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay_secs: self.retry_delay_base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    High,
    Professional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    Free,
    Cc0,
    Commercial,
    Any,
}

/// One gathering request; immutable once handed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRequest {
    pub query: String,
    pub media_type: MediaType,
    pub quantity: usize,
    pub quality: QualityTier,
    pub licensing: LicenseTier,
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(default)]
    pub constraints: HashMap<String, String>,
}

impl MediaRequest {
    pub fn new(query: &str, media_type: MediaType) -> Self {
        Self {
            query: query.to_string(),
            media_type,
            quantity: 5,
            quality: QualityTier::High,
            licensing: LicenseTier::Free,
            context: HashMap::new(),
            constraints: HashMap::new(),
        }
    }

    /// The requested visual style, when the constraints carry one.
    pub fn style(&self) -> Option<&str> {
        self.constraints
            .get("style")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Subdirectory tag for downloads, derived from the handout context.
    pub fn context_tag(&self) -> String {
        match self.context.get("handout") {
            Some(handout) => DownloadGuard::sanitize_filename(&format!("handout_{}", handout)),
            None => "other".to_string(),
        }
    }
}

/// Persisted record of one successfully downloaded file.
/// Written once, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResult {
    pub id: String,
    pub url: String,
    pub local_path: PathBuf,
    pub title: String,
    pub license: String,
    pub source: String,
    pub media_type: MediaType,
    pub resolution: Option<String>,
    pub file_size: u64,
    pub sha256: String,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub style_confidence: f64,
    pub final_score: f64,
    #[serde(default)]
    pub metadata: CandidateMetadata,
    pub downloaded_at: String,
}

/// The agent itself. One instance owns one output directory, one session
/// download-dedup set, and one results accumulator.
pub struct MediaAgent {
    output_dir: PathBuf,
    config: AgentConfig,
    lexicon: StyleLexicon,
    search: SearchClient,
    http: reqwest::Client,
    downloaded_urls: HashSet<String>,
    results: Vec<MediaResult>,
    session_id: String,
}

impl MediaAgent {
    pub fn new(output_dir: &Path, config: AgentConfig) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output dir {:?}", output_dir))?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let search = SearchClient::from_env(http.clone(), &config);

        let session_id = format!("session_{}", Utc::now().format("%Y%m%d%H%M%S"));

        info!("[AGENT] ✅ Media gathering agent initialized");
        debug!("[AGENT]    Output directory: {:?}", output_dir);
        debug!("[AGENT]    Session: {}", session_id);

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            config,
            lexicon: StyleLexicon::default(),
            search,
            http,
            downloaded_urls: HashSet::new(),
            results: Vec::new(),
            session_id,
        })
    }

    /// Run one request through the full pipeline:
    /// expand → search → score → rank → download → report.
    pub async fn process_request(&mut self, request: &MediaRequest) -> GatheringReport {
        info!(
            "[AGENT] 📥 Processing request: '{}' ({} x {:?})",
            request.query, request.quantity, request.media_type
        );
        debug!("[AGENT]    Constraints: {:?}", request.constraints);

        let queries = expand_query(&request.query, self.config.max_search_queries);
        info!("[AGENT] 🔍 Expanded into {} search queries", queries.len());

        let mut candidates = Vec::new();
        for query in &queries {
            candidates.extend(self.search.search(query, request.media_type).await);
        }
        let candidates = search_tools::dedup_by_url(candidates);
        info!("[AGENT]    Found {} unique candidates", candidates.len());

        let scored: Vec<_> = candidates
            .iter()
            .map(|candidate| {
                scoring::score_candidate(
                    candidate,
                    &request.query,
                    request.style(),
                    &self.lexicon,
                    &self.config,
                )
            })
            .collect();
        let ranked = scoring::rank_candidates(scored, &self.config);
        info!(
            "[AGENT]    {} candidates above the acceptance floor",
            ranked.len()
        );

        let results = downloader::download_candidates(
            &self.http,
            &self.config,
            &ranked,
            request,
            &self.output_dir,
            &mut self.downloaded_urls,
        )
        .await;
        info!("[AGENT]    Downloaded {} media assets", results.len());

        self.results.extend(results.iter().cloned());
        GatheringReport::build(&self.session_id, request, results)
    }

    /// Everything the pipeline would search, without touching the network.
    pub fn plan_queries(&self, request: &MediaRequest) -> Vec<String> {
        expand_query(&request.query, self.config.max_search_queries)
    }

    /// All results accumulated across this session's requests.
    pub fn results(&self) -> &[MediaResult] {
        &self.results
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Derive search query variations: the original first, then audience
/// swaps and educational framings, deduplicated and capped.
pub fn expand_query(query: &str, max_queries: usize) -> Vec<String> {
    let mut queries = vec![query.to_string()];

    let variations = [
        query.replace("children", "kids"),
        query.replace("children", "students"),
        format!("educational {}", query),
        format!("learning {}", query),
    ];
    for variation in variations {
        if !queries.contains(&variation) {
            queries.push(variation);
        }
    }

    queries.truncate(max_queries);
    queries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_query_original_first_and_unique() {
        let queries = expand_query("children learning with teacher", 5);

        assert_eq!(queries[0], "children learning with teacher");
        assert!(queries.contains(&"kids learning with teacher".to_string()));
        assert!(queries.contains(&"students learning with teacher".to_string()));

        let mut unique = queries.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), queries.len());
    }

    #[test]
    fn test_expand_query_without_children_keyword() {
        // The replacements are no-ops, so they collapse into the original.
        let queries = expand_query("family support", 5);
        assert_eq!(
            queries,
            vec![
                "family support".to_string(),
                "educational family support".to_string(),
                "learning family support".to_string(),
            ]
        );
    }

    #[test]
    fn test_expand_query_respects_cap() {
        let queries = expand_query("children learning", 2);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0], "children learning");
    }

    #[test]
    fn test_request_style_accessor() {
        let mut request = MediaRequest::new("query", MediaType::Image);
        assert_eq!(request.style(), None);

        request
            .constraints
            .insert("style".to_string(), String::new());
        assert_eq!(request.style(), None);

        request
            .constraints
            .insert("style".to_string(), "cartoon".to_string());
        assert_eq!(request.style(), Some("cartoon"));
    }

    #[test]
    fn test_request_context_tag() {
        let mut request = MediaRequest::new("query", MediaType::Image);
        assert_eq!(request.context_tag(), "other");

        request
            .context
            .insert("handout".to_string(), "1_slp_info".to_string());
        assert_eq!(request.context_tag(), "handout_1_slp_info");

        // Hostile context values cannot escape the output directory.
        request
            .context
            .insert("handout".to_string(), "../../etc".to_string());
        assert!(!request.context_tag().contains(".."));
        assert!(!request.context_tag().contains('/'));
    }

    #[test]
    fn test_cartoon_optimized_preset() {
        let config = AgentConfig::cartoon_optimized();
        assert_eq!(config.min_final_score, 45.0);
        assert_eq!(config.style_confidence_weight, 0.3);
        assert_eq!(config.base_style_confidence, 0.4);
        // Untouched knobs keep their defaults.
        assert_eq!(config.max_search_queries, 5);
        assert_eq!(config.quality_bonus_fhd, 15.0);
    }
}
