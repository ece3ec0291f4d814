// MEDIASCOUT Reporting — JSON Run Artifacts
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Every gathering run and validation batch ends in a pretty-printed JSON
// report. Errors never surface synchronously; they land here for
// post-hoc inspection.

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::agent::core::{MediaRequest, MediaResult};
use crate::agent::validator::{average_overall, MediaImage};

// ---------------------------------------------------------------------------
// Gathering report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GatheringSummary {
    pub total_requested: usize,
    pub total_retrieved: usize,
    /// Percentage of the requested quantity actually retrieved.
    pub retrieval_rate: f64,
    pub quality_avg: f64,
    pub relevance_avg: f64,
    pub style_confidence_avg: f64,
    pub final_score_avg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatheringReport {
    pub request_id: String,
    pub timestamp: String,
    /// "success" when anything was retrieved, "partial" otherwise.
    pub status: String,
    pub request: MediaRequest,
    pub results: Vec<MediaResult>,
    pub summary: GatheringSummary,
}

impl GatheringReport {
    pub fn build(request_id: &str, request: &MediaRequest, results: Vec<MediaResult>) -> Self {
        let total_requested = request.quantity;
        let total_retrieved = results.len();
        let retrieval_rate = if total_requested > 0 {
            total_retrieved as f64 / total_requested as f64 * 100.0
        } else {
            0.0
        };

        let summary = GatheringSummary {
            total_requested,
            total_retrieved,
            retrieval_rate,
            quality_avg: mean(&results, |r| r.quality_score),
            relevance_avg: mean(&results, |r| r.relevance_score),
            style_confidence_avg: mean(&results, |r| r.style_confidence),
            final_score_avg: mean(&results, |r| r.final_score),
        };

        Self {
            request_id: request_id.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: if results.is_empty() { "partial" } else { "success" }.to_string(),
            request: request.clone(),
            results,
            summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationMetadata {
    pub generated_at: String,
    pub handout_name: String,
    pub total_images: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub average_overall_score: f64,
    pub average_cartoon_confidence: f64,
    pub average_content_score: f64,
    pub average_quality_score: f64,
    pub average_diversity_score: f64,
    pub average_appropriateness_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub total_recommendations: usize,
    pub items: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub metadata: ValidationMetadata,
    pub summary: ValidationSummary,
    pub passed_validations: Vec<MediaImage>,
    pub failed_validations: Vec<MediaImage>,
    pub recommendations: Recommendations,
}

impl ValidationReport {
    pub fn build(valid: Vec<MediaImage>, failed: Vec<MediaImage>, handout_name: Option<&str>) -> Self {
        let total = valid.len() + failed.len();

        let summary = ValidationSummary {
            passed: valid.len(),
            failed: failed.len(),
            pass_rate: if total > 0 {
                valid.len() as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            average_overall_score: average_overall(&valid),
            average_cartoon_confidence: mean(&valid, |r| r.cartoon_confidence),
            average_content_score: mean(&valid, |r| r.content_score),
            average_quality_score: mean(&valid, |r| r.quality_score),
            average_diversity_score: mean(&valid, |r| r.diversity_score),
            average_appropriateness_score: mean(&valid, |r| r.appropriateness_score),
        };

        let recommendations = build_recommendations(&valid, &failed);

        Self {
            metadata: ValidationMetadata {
                generated_at: Utc::now().to_rfc3339(),
                handout_name: handout_name.unwrap_or("unknown").to_string(),
                total_images: total,
            },
            summary,
            passed_validations: valid,
            failed_validations: failed,
            recommendations,
        }
    }
}

fn build_recommendations(valid: &[MediaImage], failed: &[MediaImage]) -> Recommendations {
    let mut items = Vec::new();

    // Recurring failure reasons, most common first
    let mut reason_counts: HashMap<String, usize> = HashMap::new();
    for record in failed {
        if !record.reason.is_empty() {
            *reason_counts.entry(record.reason.clone()).or_insert(0) += 1;
        }
    }
    let mut reasons: Vec<(String, usize)> = reason_counts.into_iter().collect();
    reasons.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (reason, count) in reasons.into_iter().take(3) {
        items.push(Recommendation {
            kind: "pattern".to_string(),
            frequency: Some(count),
            count: None,
            issue: Some(reason.clone()),
            files: Vec::new(),
            recommendation: recommendation_for_issue(&reason),
        });
    }

    // Diversity gap across the whole batch
    let low_diversity = valid
        .iter()
        .chain(failed.iter())
        .filter(|r| r.diversity_score < 60.0)
        .count();
    if low_diversity > 0 {
        items.push(Recommendation {
            kind: "improvement".to_string(),
            frequency: None,
            count: Some(low_diversity),
            issue: Some("Low diversity representation".to_string()),
            files: Vec::new(),
            recommendation: "Consider sourcing more diverse images showing different age groups, \
                             ethnicities, abilities, and family structures"
                .to_string(),
        });
    }

    // Near-threshold results worth a human look
    let review: Vec<&MediaImage> = valid
        .iter()
        .chain(failed.iter())
        .filter(|r| r.tags.iter().any(|t| t == "manual_review_recommended"))
        .collect();
    if !review.is_empty() {
        items.push(Recommendation {
            kind: "review".to_string(),
            frequency: None,
            count: Some(review.len()),
            issue: None,
            files: review.iter().take(5).map(|r| r.file_name.clone()).collect(),
            recommendation: "These images scored near the threshold and may benefit from manual \
                             review"
                .to_string(),
        });
    }

    Recommendations {
        total_recommendations: items.len(),
        items,
    }
}

fn recommendation_for_issue(issue: &str) -> String {
    let lower = issue.to_lowercase();
    let table: &[(&str, &str)] = &[
        (
            "resolution",
            "Source higher resolution images (at least 800x600, preferably 1280x720 or higher)",
        ),
        (
            "style",
            "Ensure downloaded images are cartoons/illustrations, not photographs",
        ),
        (
            "content",
            "Verify images are relevant to SLP, families, children, communication, or autism awareness",
        ),
        (
            "quality",
            "Check for compression artifacts and ensure good clarity",
        ),
        (
            "diversity",
            "Ensure diverse representation of ages, ethnicities, and abilities",
        ),
        (
            "appropriateness",
            "Verify images are respectful and positive for autism awareness context",
        ),
    ];
    for (key, rec) in table {
        if lower.contains(key) {
            return rec.to_string();
        }
    }
    "Review and resample this category of images".to_string()
}

/// Pretty-print a report to disk, creating parent directories as needed.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report dir {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("Report serialization failed")?;
    fs::write(path, json).with_context(|| format!("Failed to write report {:?}", path))?;
    info!("[REPORT] 📄 Report saved: {:?}", path);
    Ok(())
}

fn mean<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(field).sum::<f64>() / items.len() as f64
}
