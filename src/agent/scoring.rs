// MEDIASCOUT Candidate Scoring
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Three independent signals per search candidate: technical quality,
// keyword relevance, and style confidence. They combine into one weighted
// final score used to rank and filter before download. Everything here
// works on text and metadata only; nothing opens the image bytes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::agent::core::AgentConfig;
use crate::agent::search_tools::MediaCandidate;

/// Positive/negative indicator keywords for one visual style.
#[derive(Debug, Clone)]
pub struct StyleKeywords {
    pub positive: Vec<&'static str>,
    pub negative: Vec<&'static str>,
}

/// Lexicon mapping style names to their indicator keyword sets.
pub struct StyleLexicon {
    styles: HashMap<&'static str, StyleKeywords>,
}

impl Default for StyleLexicon {
    fn default() -> Self {
        let mut styles = HashMap::new();
        styles.insert(
            "cartoon",
            StyleKeywords {
                positive: vec![
                    "cartoon", "illustration", "animated", "illustrated", "comic",
                    "drawing", "vector", "art", "sketch", "hand-drawn", "cute",
                    "stylized", "graphic", "design",
                ],
                negative: vec![
                    "photo", "photograph", "real", "stock photo", "people", "person",
                    "portrait", "candid", "camera", "photographer",
                ],
            },
        );
        styles.insert(
            "photo",
            StyleKeywords {
                positive: vec![
                    "photo", "photograph", "real", "stock photo", "professional",
                    "portrait", "landscape", "scene", "candid",
                ],
                negative: vec!["cartoon", "illustration", "animated", "drawn", "vector"],
            },
        );
        styles.insert(
            "watercolor",
            StyleKeywords {
                positive: vec![
                    "watercolor", "watercolour", "painting", "artistic", "brush",
                    "painted", "ink", "wash",
                ],
                negative: vec!["photo", "photograph", "vector", "digital"],
            },
        );
        Self { styles }
    }
}

impl StyleLexicon {
    pub fn get(&self, style: &str) -> Option<&StyleKeywords> {
        self.styles.get(style)
    }
}

/// A candidate with its scores attached, ready for ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: MediaCandidate,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub style_confidence: f64,
    pub final_score: f64,
}

/// Technical quality estimate (0-100) from resolution and license.
pub fn quality_score(candidate: &MediaCandidate, config: &AgentConfig) -> f64 {
    let mut score = config.base_quality_score;

    if let Some((width, height)) = candidate.resolution.as_deref().and_then(parse_resolution) {
        if width >= 1920 && height >= 1080 {
            score += config.quality_bonus_fhd;
        } else if width >= 1280 && height >= 720 {
            score += config.quality_bonus_hd;
        }
    }

    if candidate.license == "cc0" {
        score += config.quality_bonus_cc0;
    } else if candidate.license.to_lowercase().contains("free") {
        score += config.quality_bonus_free;
    }

    score.clamp(0.0, 100.0)
}

/// Keyword relevance (0-100): how much of the query shows up in the
/// candidate's title, tags, or description.
pub fn relevance_score(candidate: &MediaCandidate, query: &str, config: &AgentConfig) -> f64 {
    let mut score = config.base_relevance_score;

    let title = candidate.title.to_lowercase();
    let description = candidate
        .metadata
        .description
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let tags: Vec<String> = candidate
        .metadata
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();

    if !words.is_empty() {
        let mut matched = 0usize;
        for word in &words {
            if title.contains(*word)
                || description.contains(*word)
                || tags.iter().any(|tag| tag.contains(*word))
            {
                matched += 1;
            }
        }
        score += (matched as f64 / words.len() as f64) * config.keyword_match_weight;
        debug!(
            "[SCORE] Keyword match {}/{} for '{}'",
            matched,
            words.len(),
            candidate.id
        );
    }

    score.clamp(0.0, 100.0)
}

/// Style confidence (0-1) from keyword presence/absence.
///
/// A request without a style constraint gets the neutral baseline, as does
/// an unknown style name (graceful degradation, not an error).
pub fn style_confidence(
    candidate: &MediaCandidate,
    style: Option<&str>,
    lexicon: &StyleLexicon,
    config: &AgentConfig,
) -> f64 {
    let style = match style {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return config.base_style_confidence,
    };

    let keywords = match lexicon.get(style.as_str()) {
        Some(keywords) => keywords,
        None => {
            warn!("[SCORE] Unknown style '{}', using baseline confidence", style);
            return config.base_style_confidence;
        }
    };

    let haystack = format!(
        "{} {} {} {}",
        candidate.title,
        candidate.metadata.tags.join(" "),
        candidate.metadata.description.as_deref().unwrap_or(""),
        candidate.source
    )
    .to_lowercase();

    let mut confidence = config.base_style_confidence;

    if !keywords.positive.is_empty() {
        let hits = keywords
            .positive
            .iter()
            .copied()
            .filter(|kw| haystack.contains(kw))
            .count();
        confidence += 0.3 * hits as f64 / keywords.positive.len() as f64;
    }
    if !keywords.negative.is_empty() {
        let hits = keywords
            .negative
            .iter()
            .copied()
            .filter(|kw| haystack.contains(kw))
            .count();
        confidence -= 0.3 * hits as f64 / keywords.negative.len() as f64;
    }

    confidence.clamp(0.0, 1.0)
}

/// Weighted combination of the three component signals, clamped to 0-100.
pub fn final_score(
    quality: f64,
    relevance: f64,
    style_confidence: f64,
    config: &AgentConfig,
) -> f64 {
    let technical = relevance * config.relevance_weight + quality * config.quality_weight;
    let style = style_confidence * 100.0 * config.style_confidence_weight;
    (technical + style).clamp(0.0, 100.0)
}

/// Score one candidate against the request.
pub fn score_candidate(
    candidate: &MediaCandidate,
    query: &str,
    style: Option<&str>,
    lexicon: &StyleLexicon,
    config: &AgentConfig,
) -> ScoredCandidate {
    let quality = quality_score(candidate, config);
    let relevance = relevance_score(candidate, query, config);
    let confidence = style_confidence(candidate, style, lexicon, config);
    let combined = final_score(quality, relevance, confidence, config);

    debug!(
        "[SCORE] {}: final={:.1} (q={:.0} r={:.0} style={:.2})",
        candidate.id, combined, quality, relevance, confidence
    );

    ScoredCandidate {
        candidate: candidate.clone(),
        quality_score: quality,
        relevance_score: relevance,
        style_confidence: confidence,
        final_score: combined,
    }
}

/// Drop candidates under the acceptance floor and rank the rest best-first.
pub fn rank_candidates(
    mut scored: Vec<ScoredCandidate>,
    config: &AgentConfig,
) -> Vec<ScoredCandidate> {
    scored.retain(|s| s.final_score >= config.min_final_score);
    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let (width, height) = resolution.split_once('x')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::search_tools::CandidateMetadata;

    fn cartoon_candidate() -> MediaCandidate {
        MediaCandidate {
            id: "unsplash_abc".to_string(),
            url: "https://images.example.com/abc".to_string(),
            title: "Cute cartoon illustration of children learning".to_string(),
            source: "unsplash".to_string(),
            license: "cc0".to_string(),
            resolution: Some("1920x1080".to_string()),
            metadata: CandidateMetadata {
                photographer: Some("Test Artist".to_string()),
                description: Some("hand-drawn classroom scene".to_string()),
                tags: vec!["cartoon".to_string(), "education".to_string()],
                page_url: None,
            },
        }
    }

    fn photo_candidate() -> MediaCandidate {
        MediaCandidate {
            id: "pexels_img_7".to_string(),
            url: "https://images.example.com/photo".to_string(),
            title: "Stock photo of a real person portrait".to_string(),
            source: "pexels".to_string(),
            license: "free-commercial".to_string(),
            resolution: Some("1280x720".to_string()),
            metadata: CandidateMetadata {
                photographer: Some("Camera Person".to_string()),
                description: Some("candid camera shot".to_string()),
                tags: vec!["photograph".to_string()],
                page_url: None,
            },
        }
    }

    #[test]
    fn test_quality_score_fhd_cc0() {
        let config = AgentConfig::default();
        // 75 base + 15 FHD + 10 CC0, clamped at 100
        assert_eq!(quality_score(&cartoon_candidate(), &config), 100.0);
    }

    #[test]
    fn test_quality_score_hd_free_license() {
        let config = AgentConfig::default();
        // 75 base + 10 HD + 5 free-substring
        assert_eq!(quality_score(&photo_candidate(), &config), 90.0);
    }

    #[test]
    fn test_quality_score_unparseable_resolution() {
        let config = AgentConfig::default();
        let mut candidate = cartoon_candidate();
        candidate.resolution = Some("high-res".to_string());
        // 75 base + 10 CC0 only
        assert_eq!(quality_score(&candidate, &config), 85.0);
    }

    #[test]
    fn test_relevance_score_full_match() {
        let config = AgentConfig::default();
        let score = relevance_score(&cartoon_candidate(), "cartoon children learning", &config);
        // 50 base + (3/3) * 40
        assert_eq!(score, 90.0);
    }

    #[test]
    fn test_relevance_score_no_match() {
        let config = AgentConfig::default();
        let score = relevance_score(&cartoon_candidate(), "zebra quantum", &config);
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_relevance_score_partial_match() {
        let config = AgentConfig::default();
        let score = relevance_score(&cartoon_candidate(), "cartoon zebra", &config);
        // 50 base + (1/2) * 40
        assert_eq!(score, 70.0);
    }

    #[test]
    fn test_style_confidence_no_constraint_is_baseline() {
        let config = AgentConfig::default();
        let lexicon = StyleLexicon::default();
        // Candidate content must not matter when no style is requested.
        assert_eq!(
            style_confidence(&photo_candidate(), None, &lexicon, &config),
            config.base_style_confidence
        );
        assert_eq!(
            style_confidence(&cartoon_candidate(), Some(""), &lexicon, &config),
            config.base_style_confidence
        );
    }

    #[test]
    fn test_style_confidence_positive_match_beats_baseline() {
        let config = AgentConfig::default();
        let lexicon = StyleLexicon::default();
        let confidence = style_confidence(&cartoon_candidate(), Some("cartoon"), &lexicon, &config);
        assert!(confidence > config.base_style_confidence);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn test_style_confidence_negative_keywords_drop_below_baseline() {
        let config = AgentConfig::default();
        let lexicon = StyleLexicon::default();
        let confidence = style_confidence(&photo_candidate(), Some("cartoon"), &lexicon, &config);
        assert!(confidence < config.base_style_confidence);
        assert!(confidence >= 0.0);
    }

    #[test]
    fn test_style_confidence_unknown_style_is_baseline() {
        let config = AgentConfig::default();
        let lexicon = StyleLexicon::default();
        assert_eq!(
            style_confidence(&cartoon_candidate(), Some("claymation"), &lexicon, &config),
            config.base_style_confidence
        );
    }

    #[test]
    fn test_final_score_all_zero_is_zero() {
        let config = AgentConfig::default();
        assert_eq!(final_score(0.0, 0.0, 0.0, &config), 0.0);
    }

    #[test]
    fn test_final_score_monotonic_in_relevance() {
        let config = AgentConfig::default();
        let low = final_score(50.0, 40.0, 0.5, &config);
        let high = final_score(50.0, 80.0, 0.5, &config);
        assert!(high >= low);
    }

    #[test]
    fn test_score_candidate_ranges() {
        let config = AgentConfig::default();
        let lexicon = StyleLexicon::default();
        let scored = score_candidate(
            &cartoon_candidate(),
            "children learning",
            Some("cartoon"),
            &lexicon,
            &config,
        );
        assert!((0.0..=100.0).contains(&scored.quality_score));
        assert!((0.0..=100.0).contains(&scored.relevance_score));
        assert!((0.0..=1.0).contains(&scored.style_confidence));
        assert!((0.0..=100.0).contains(&scored.final_score));
    }

    #[test]
    fn test_rank_candidates_filters_and_sorts() {
        let config = AgentConfig::default();
        let make = |id: &str, final_score: f64| ScoredCandidate {
            candidate: MediaCandidate {
                id: id.to_string(),
                url: format!("https://example.com/{}", id),
                title: id.to_string(),
                source: "unsplash".to_string(),
                license: "cc0".to_string(),
                resolution: None,
                metadata: CandidateMetadata::default(),
            },
            quality_score: 0.0,
            relevance_score: 0.0,
            style_confidence: 0.0,
            final_score,
        };

        let ranked = rank_candidates(
            vec![make("mid", 60.0), make("low", 40.0), make("top", 80.0)],
            &config,
        );

        // min_final_score 50 drops "low"; the rest are best-first.
        let ids: Vec<&str> = ranked.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "mid"]);
    }
}
