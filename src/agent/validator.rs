// MEDIASCOUT Offline Validator — Pixel Heuristics & Pass Verdicts
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Second-pass quality gate over already-downloaded images. Cartoon-ness
// is estimated from color statistics; relevance, diversity and tone come
// from filename keywords. Every file gets exactly one terminal verdict:
// PASS, FAIL, REVIEW or BLOCKED. No network access, and an undecodable
// file becomes a BLOCKED record instead of an error.

use chrono::Utc;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Thresholds and weights for the validation pass.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    // Per-component minimums
    pub min_cartoon_confidence: f64,
    pub min_content_score: f64,
    pub min_quality_score: f64,
    pub min_diversity_score: f64,
    pub min_appropriateness_score: f64,

    // Hard resolution floor; below this the verdict is BLOCKED outright
    pub min_resolution_width: u32,
    pub min_resolution_height: u32,

    // Overall acceptance
    pub min_overall_score: f64,

    // Component weights for the overall score
    pub cartoon_weight: f64,
    pub content_weight: f64,
    pub quality_weight: f64,
    pub diversity_weight: f64,
    pub appropriateness_weight: f64,

    // Pixel analysis knobs
    pub max_color_variance: f64,
    pub vibrant_saturation_floor: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_cartoon_confidence: 0.6,
            min_content_score: 60.0,
            min_quality_score: 50.0,
            min_diversity_score: 40.0,
            min_appropriateness_score: 70.0,
            min_resolution_width: 400,
            min_resolution_height: 300,
            min_overall_score: 65.0,
            cartoon_weight: 0.15,
            content_weight: 0.25,
            quality_weight: 0.20,
            diversity_weight: 0.15,
            appropriateness_weight: 0.25,
            max_color_variance: 120.0,
            vibrant_saturation_floor: 150.0,
        }
    }
}

/// Terminal verdict for one validated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassStatus {
    Pass,
    Fail,
    Review,
    Blocked,
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PassStatus::Pass => "PASS",
            PassStatus::Fail => "FAIL",
            PassStatus::Review => "REVIEW",
            PassStatus::Blocked => "BLOCKED",
        };
        write!(f, "{}", label)
    }
}

/// Full validation record for one on-disk image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaImage {
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,

    pub cartoon_confidence: f64,
    pub cartoon_analysis: String,
    pub color_count: usize,
    pub avg_saturation: f64,

    pub content_score: f64,
    pub content_keywords_matched: Vec<String>,

    pub quality_score: f64,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub avg_brightness: f64,
    pub has_artifacts: bool,

    pub diversity_score: f64,
    pub diversity_flags: Vec<String>,

    pub appropriateness_score: f64,
    pub appropriateness_flags: Vec<String>,

    pub overall_score: f64,
    pub is_valid: bool,
    pub pass_status: PassStatus,
    pub reason: String,

    pub validated_at: String,
    pub validation_errors: Vec<String>,
    pub tags: Vec<String>,
}

/// Filename-derived content signal.
#[derive(Debug, Clone)]
pub struct ContentAssessment {
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

/// Content signals isolated behind a trait so a genuine vision-based
/// classifier can replace the filename heuristics without touching the
/// score aggregation or the verdict logic.
pub trait ContentClassifier: Send + Sync {
    fn content(&self, file_name: &str) -> ContentAssessment;
    fn diversity(&self, file_name: &str, min_score: f64) -> (f64, Vec<String>);
    fn appropriateness(&self, file_name: &str) -> (f64, Vec<String>);
}

/// Keyword categories for content relevance.
const CONTENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("children", &["child", "kid", "toddler", "baby", "boy", "girl", "play", "learn"]),
    ("families", &["family", "parent", "mother", "father", "caregiver", "together"]),
    ("learning", &["learn", "education", "school", "activity", "development", "growth"]),
    ("communication", &["talk", "speech", "language", "listen", "speak", "communicate"]),
    ("support", &["help", "support", "care", "therapy", "resource", "guide"]),
    ("positive", &["happy", "joy", "smile", "fun", "creative", "inclusive", "diverse"]),
];

const POSITIVE_INDICATORS: &[&str] = &["play", "learn", "joy", "happy", "support", "inclusive"];

const RED_FLAGS: &[&str] = &["negative", "struggle", "deficit", "broken", "sad", "sick"];

/// Default classifier: keyword-substring matching on the filename only.
pub struct FilenameClassifier;

impl ContentClassifier for FilenameClassifier {
    fn content(&self, file_name: &str) -> ContentAssessment {
        let name = file_name.to_lowercase();
        let mut matched: Vec<String> = Vec::new();
        let mut categories = 0usize;

        for (_category, keywords) in CONTENT_KEYWORDS {
            let mut category_hit = false;
            for keyword in *keywords {
                if name.contains(keyword) {
                    category_hit = true;
                    if !matched.iter().any(|m| m == keyword) {
                        matched.push(keyword.to_string());
                    }
                }
            }
            if category_hit {
                categories += 1;
            }
        }

        let score = if matched.is_empty() {
            // Nothing recognizable in the name; neutral default
            50.0
        } else {
            let match_score = (matched.len() as f64 * 15.0).min(100.0);
            (match_score + categories as f64 * 5.0).min(100.0)
        };

        ContentAssessment {
            score,
            matched_keywords: matched,
        }
    }

    fn diversity(&self, file_name: &str, min_score: f64) -> (f64, Vec<String>) {
        let name = file_name.to_lowercase();
        let mut flags = Vec::new();
        let mut score = 70.0;

        if name.contains("child") || name.contains("kid") {
            score += 10.0;
        }
        if name.contains("family") || name.contains("group") {
            score += 5.0;
        }
        if name.contains("adult") || name.contains("person") {
            flags.push("single_subject_detected".to_string());
        }
        if score < min_score {
            flags.push("low_diversity_indicator".to_string());
        }

        (score.min(100.0), flags)
    }

    fn appropriateness(&self, file_name: &str) -> (f64, Vec<String>) {
        let name = file_name.to_lowercase();
        let mut flags = Vec::new();
        let mut score: f64 = 85.0;

        for indicator in POSITIVE_INDICATORS {
            if name.contains(indicator) {
                score += 2.0;
            }
        }
        for flag in RED_FLAGS {
            if name.contains(flag) {
                score -= 10.0;
                flags.push(format!("potential_{}_content", flag));
            }
        }

        (score.clamp(0.0, 100.0), flags)
    }
}

struct CartoonAssessment {
    confidence: f64,
    color_count: usize,
    avg_saturation: f64,
    analysis: String,
}

struct QualityAssessment {
    score: f64,
    avg_brightness: f64,
    has_artifacts: bool,
}

/// Offline validator for downloaded media images.
pub struct MediaValidator {
    config: ValidatorConfig,
    classifier: Box<dyn ContentClassifier>,
}

impl MediaValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            classifier: Box::new(FilenameClassifier),
        }
    }

    pub fn with_classifier(config: ValidatorConfig, classifier: Box<dyn ContentClassifier>) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one image file and return its terminal record.
    pub fn validate_image(&self, path: &Path) -> MediaImage {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if !path.exists() {
            warn!("[VALIDATE] ⚠️ Image not found: {:?}", path);
            return self.blocked(
                path,
                &file_name,
                0,
                "File not found",
                vec![format!("Image not found: {}", path.display())],
            );
        }

        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let img = match image::open(path) {
            Ok(img) => img,
            Err(err) => {
                let msg = format!("Cannot open image: {}", err);
                error!("[VALIDATE] ❌ {}", msg);
                return self.blocked(path, &file_name, file_size, "Invalid image file", vec![msg]);
            }
        };

        info!("[VALIDATE] 🔍 Validating: {}", file_name);

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let cartoon = self.assess_cartoon_style(&rgb);
        let content = self.classifier.content(&file_name);
        let quality = self.assess_quality(&rgb, width, height);
        let (diversity_score, diversity_flags) = self
            .classifier
            .diversity(&file_name, self.config.min_diversity_score);
        let (appropriateness_score, appropriateness_flags) =
            self.classifier.appropriateness(&file_name);

        let overall = overall_score(
            cartoon.confidence,
            content.score,
            quality.score,
            diversity_score,
            appropriateness_score,
            &self.config,
        );

        let mut record = MediaImage {
            file_path: path.display().to_string(),
            file_name,
            file_size,
            cartoon_confidence: cartoon.confidence,
            cartoon_analysis: cartoon.analysis,
            color_count: cartoon.color_count,
            avg_saturation: cartoon.avg_saturation,
            content_score: content.score,
            content_keywords_matched: content.matched_keywords,
            quality_score: quality.score,
            resolution_width: width,
            resolution_height: height,
            avg_brightness: quality.avg_brightness,
            has_artifacts: quality.has_artifacts,
            diversity_score,
            diversity_flags,
            appropriateness_score,
            appropriateness_flags,
            overall_score: overall,
            is_valid: false,
            pass_status: PassStatus::Blocked,
            reason: String::new(),
            validated_at: Utc::now().to_rfc3339(),
            validation_errors: Vec::new(),
            tags: Vec::new(),
        };

        self.determine_pass_status(&mut record);
        self.log_verdict(&record);
        record
    }

    /// Validate many files; returns (valid records, failing records).
    pub fn validate_batch(
        &self,
        paths: &[PathBuf],
        handout_name: Option<&str>,
    ) -> (Vec<MediaImage>, Vec<MediaImage>) {
        info!("[VALIDATE] 🔄 Batch validating {} images", paths.len());
        if let Some(name) = handout_name {
            info!("[VALIDATE]    Handout: {}", name);
        }

        let mut valid = Vec::new();
        let mut failed = Vec::new();

        for (i, path) in paths.iter().enumerate() {
            debug!("[VALIDATE] [{}/{}] Processing...", i + 1, paths.len());
            let record = self.validate_image(path);
            if record.is_valid {
                valid.push(record);
            } else {
                failed.push(record);
            }
        }

        info!(
            "[VALIDATE] 📊 Batch results: ✅ {} valid, ❌ {} failed, average score {:.0}",
            valid.len(),
            failed.len(),
            average_overall(&valid)
        );

        (valid, failed)
    }

    /// Gate for gathering-pipeline integration: strict accepts only PASS,
    /// lenient lets REVIEW through for a human to arbitrate.
    pub fn accept(&self, path: &Path, strict: bool) -> bool {
        let record = self.validate_image(path);
        match record.pass_status {
            PassStatus::Pass => true,
            PassStatus::Review => !strict,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Pixel heuristics
    // -----------------------------------------------------------------------

    /// Estimate cartoon-ness from the color distribution. Flat-shaded
    /// illustrations use a small palette; photographs use hundreds of
    /// thousands of distinct colors.
    fn assess_cartoon_style(&self, rgb: &RgbImage) -> CartoonAssessment {
        let mut colors: HashSet<u32> = HashSet::new();
        let mut saturation_sum = 0.0f64;
        let pixel_count = (rgb.width() as f64) * (rgb.height() as f64);

        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            colors.insert(((r as u32) << 16) | ((g as u32) << 8) | b as u32);

            let max = r.max(g).max(b) as f64;
            let min = r.min(g).min(b) as f64;
            // HSV-style saturation on the 0-255 scale
            if max > 0.0 {
                saturation_sum += (max - min) / max * 255.0;
            }
        }

        let color_count = colors.len();
        let avg_saturation = if pixel_count > 0.0 {
            saturation_sum / pixel_count
        } else {
            128.0
        };

        let mut confidence: f64 = if color_count < 5_000 {
            0.9
        } else if color_count < 20_000 {
            0.7
        } else if color_count < 50_000 {
            0.5
        } else {
            // Almost certainly a photograph
            0.2
        };

        // Vibrant palettes lean cartoon
        if avg_saturation > self.config.vibrant_saturation_floor {
            confidence += 0.1;
        }
        let confidence = confidence.clamp(0.0, 1.0);

        CartoonAssessment {
            confidence,
            color_count,
            avg_saturation,
            analysis: format!(
                "Unique colors: {} | Avg saturation: {:.0} | Confidence: {:.0}%",
                color_count,
                avg_saturation,
                confidence * 100.0
            ),
        }
    }

    /// Resolution tier, brightness band, and a variance-based artifact
    /// penalty blended into one 0-100 quality score.
    fn assess_quality(&self, rgb: &RgbImage, width: u32, height: u32) -> QualityAssessment {
        let resolution_score = if width >= 1920 || height >= 1080 {
            100.0
        } else if width >= 1280 || height >= 720 {
            85.0
        } else if width >= 800 || height >= 600 {
            70.0
        } else if width >= 400 && height >= 300 {
            55.0
        } else {
            30.0
        };

        // Channel means and standard deviations in one pass
        let n = ((width as f64) * (height as f64)).max(1.0);
        let mut sum = [0.0f64; 3];
        let mut sum_sq = [0.0f64; 3];
        for pixel in rgb.pixels() {
            for channel in 0..3 {
                let value = pixel.0[channel] as f64;
                sum[channel] += value;
                sum_sq[channel] += value * value;
            }
        }
        let mut mean = [0.0f64; 3];
        let mut std_dev = [0.0f64; 3];
        for channel in 0..3 {
            mean[channel] = sum[channel] / n;
            std_dev[channel] =
                (sum_sq[channel] / n - mean[channel] * mean[channel]).max(0.0).sqrt();
        }

        let avg_brightness = (mean[0] + mean[1] + mean[2]) / 3.0;
        let brightness_score = if (60.0..=180.0).contains(&avg_brightness) {
            90.0
        } else if (40.0..=200.0).contains(&avg_brightness) {
            75.0
        } else {
            50.0
        };

        // Too flat reads as over-compression, too busy reads as noise
        let color_variance = (std_dev[0] + std_dev[1] + std_dev[2]) / 3.0;
        let (has_artifacts, artifact_penalty) = if color_variance < 20.0 {
            (true, 20.0)
        } else if color_variance > self.config.max_color_variance {
            (true, 15.0)
        } else {
            (false, 0.0)
        };

        let score = resolution_score * 0.4
            + brightness_score * 0.35
            + (100.0 - artifact_penalty) * 0.25;

        QualityAssessment {
            score,
            avg_brightness,
            has_artifacts,
        }
    }

    // -----------------------------------------------------------------------
    // Verdict
    // -----------------------------------------------------------------------

    /// Single transition to a terminal state. Precedence:
    /// BLOCKED (hard resolution floor) > FAIL (any component minimum) >
    /// REVIEW (overall minimum) > PASS.
    pub fn determine_pass_status(&self, record: &mut MediaImage) {
        let cfg = &self.config;
        let mut fails = Vec::new();

        if record.cartoon_confidence < cfg.min_cartoon_confidence {
            fails.push(format!("style ({:.0}%)", record.cartoon_confidence * 100.0));
        }
        if record.content_score < cfg.min_content_score {
            fails.push(format!("content ({:.0})", record.content_score));
        }
        if record.quality_score < cfg.min_quality_score {
            fails.push(format!("quality ({:.0})", record.quality_score));
        }
        if record.diversity_score < cfg.min_diversity_score {
            fails.push(format!("diversity ({:.0})", record.diversity_score));
        }
        if record.appropriateness_score < cfg.min_appropriateness_score {
            fails.push(format!(
                "appropriateness ({:.0})",
                record.appropriateness_score
            ));
        }

        if record.resolution_width < cfg.min_resolution_width
            || record.resolution_height < cfg.min_resolution_height
        {
            record.pass_status = PassStatus::Blocked;
            record.reason = format!(
                "Resolution too low: {}x{}",
                record.resolution_width, record.resolution_height
            );
            record.is_valid = false;
        } else if !fails.is_empty() {
            record.pass_status = PassStatus::Fail;
            record.reason = format!("Failed validation on: {}", fails.join(", "));
            record.is_valid = false;
        } else if record.overall_score < cfg.min_overall_score {
            record.pass_status = PassStatus::Review;
            record.reason = format!("Overall score below threshold: {:.0}", record.overall_score);
            record.is_valid = false;
            record.tags.push("manual_review_recommended".to_string());
        } else {
            record.pass_status = PassStatus::Pass;
            record.reason = "Passed all validation checks".to_string();
            record.is_valid = true;

            if record.overall_score >= 85.0 {
                record.tags.push("high_quality".to_string());
            }
            if record.cartoon_confidence >= 0.8 {
                record.tags.push("strong_cartoon_style".to_string());
            }
            if record.diversity_score >= 80.0 {
                record.tags.push("diverse_representation".to_string());
            }
        }
    }

    fn log_verdict(&self, record: &MediaImage) {
        let emoji = match record.pass_status {
            PassStatus::Pass => "✅",
            PassStatus::Fail => "❌",
            PassStatus::Review => "⚠️",
            PassStatus::Blocked => "🚫",
        };
        info!(
            "[VALIDATE] {} {} - Overall: {:.0} | Style: {:.0}% | Content: {:.0} | Quality: {:.0}",
            emoji,
            record.pass_status,
            record.overall_score,
            record.cartoon_confidence * 100.0,
            record.content_score,
            record.quality_score
        );
    }

    fn blocked(
        &self,
        path: &Path,
        file_name: &str,
        file_size: u64,
        reason: &str,
        errors: Vec<String>,
    ) -> MediaImage {
        MediaImage {
            file_path: path.display().to_string(),
            file_name: file_name.to_string(),
            file_size,
            cartoon_confidence: 0.0,
            cartoon_analysis: String::new(),
            color_count: 0,
            avg_saturation: 0.0,
            content_score: 0.0,
            content_keywords_matched: Vec::new(),
            quality_score: 0.0,
            resolution_width: 0,
            resolution_height: 0,
            avg_brightness: 0.0,
            has_artifacts: false,
            diversity_score: 0.0,
            diversity_flags: Vec::new(),
            appropriateness_score: 0.0,
            appropriateness_flags: Vec::new(),
            overall_score: 0.0,
            is_valid: false,
            pass_status: PassStatus::Blocked,
            reason: reason.to_string(),
            validated_at: Utc::now().to_rfc3339(),
            validation_errors: errors,
            tags: Vec::new(),
        }
    }
}

/// Weighted blend of the five component scores.
pub fn overall_score(
    cartoon_confidence: f64,
    content: f64,
    quality: f64,
    diversity: f64,
    appropriateness: f64,
    config: &ValidatorConfig,
) -> f64 {
    cartoon_confidence * 100.0 * config.cartoon_weight
        + content * config.content_weight
        + quality * config.quality_weight
        + diversity * config.diversity_weight
        + appropriateness * config.appropriateness_weight
}

/// Mean overall score across a result set; 0.0 when empty.
pub fn average_overall(results: &[MediaImage]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.overall_score).sum::<f64>() / results.len() as f64
}

/// Discover validatable images under a directory (recursive, sorted).
pub fn discover_images(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    matches!(
                        ext.to_lowercase().as_str(),
                        "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp"
                    )
                })
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}
