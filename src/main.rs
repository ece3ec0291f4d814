// MEDIASCOUT Main Entry Point
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{info, warn};

use mediascout_core::agent::core::{
    expand_query, AgentConfig, MediaAgent, MediaRequest, MediaType, QualityTier,
};
use mediascout_core::agent::handouts;
use mediascout_core::agent::report::{self, ValidationReport};
use mediascout_core::agent::validator::{discover_images, MediaValidator, ValidatorConfig};

#[derive(Parser)]
#[command(name = "mediascout-core")]
#[command(about = "MEDIASCOUT Media Gathering Kernel", long_about = None)]
struct Cli {
    /// Show detailed debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, score and download media for an ad-hoc query
    Gather {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Visual style constraint (cartoon, photo, watercolor)
        #[arg(short, long)]
        style: Option<String>,

        /// Media type to search for
        #[arg(long, value_enum, default_value_t = MediaType::Image)]
        media_type: MediaType,

        /// Number of assets to download
        #[arg(short = 'n', long, default_value_t = 5)]
        quantity: usize,

        /// Output directory for media
        #[arg(short, long, default_value = "media")]
        output: PathBuf,

        /// Context tag used for the output subdirectory
        #[arg(long)]
        context: Option<String>,

        /// Path for the JSON gathering report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Show queries without downloading
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a curated handout preset (cartoon-optimized scoring)
    Handout {
        /// Handout id: 1, 2, 3 or a full id like 1_slp_info
        #[arg(short, long)]
        id: String,

        /// Output directory for media
        #[arg(short, long, default_value = "media")]
        output: PathBuf,

        /// Path for the JSON gathering report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Show queries without downloading
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate downloaded images offline and write a verdict report
    Validate {
        /// Directory of downloaded images
        #[arg(short, long)]
        input: PathBuf,

        /// Handout name recorded in the report metadata
        #[arg(long)]
        handout: Option<String>,

        /// Path for the JSON validation report
        #[arg(long, default_value = "validation_report.json")]
        report: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", if args.verbose { "debug" } else { "info" });
    }
    tracing_subscriber::fmt::init();

    // Global panic handler: log panics instead of dying silently
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("🚨 [MEDIASCOUT PANIC] at {}: {}", location, message);
    }));

    info!("--- MEDIASCOUT GATHERING KERNEL v0.1.0 ---");

    match args.command {
        Commands::Gather {
            query,
            style,
            media_type,
            quantity,
            output,
            context,
            report: report_path,
            dry_run,
        } => {
            let mut request = MediaRequest::new(&query, media_type);
            request.quantity = quantity;
            if let Some(style) = style {
                request.constraints.insert("style".to_string(), style);
            }
            if let Some(tag) = context {
                request.context.insert("handout".to_string(), tag);
            }

            let config = AgentConfig::default();

            if dry_run {
                println!("Dry run — queries that would be searched:");
                for query in expand_query(&request.query, config.max_search_queries) {
                    println!("  - {}", query);
                }
                return Ok(());
            }

            let mut agent = MediaAgent::new(&output, config)?;
            let run_report = agent.process_request(&request).await;
            info!(
                "[MAIN] ✨ Retrieved {}/{} assets (avg final score {:.1})",
                run_report.summary.total_retrieved,
                run_report.summary.total_requested,
                run_report.summary.final_score_avg
            );
            if let Some(path) = report_path {
                report::save_json(&run_report, &path)?;
            }
        }

        Commands::Handout {
            id,
            output,
            report: report_path,
            dry_run,
        } => {
            let handout = handouts::find_handout(&id)
                .ok_or_else(|| anyhow::anyhow!("Unknown handout id: {}", id))?;

            info!("[MAIN] 📚 Handout: {}", handout.title);

            if dry_run {
                println!("Dry run — queries for '{}':", handout.title);
                for section in handout.sections {
                    println!("  [{}]", section.name);
                    for query in section.queries {
                        println!("    - {}", query);
                    }
                }
                return Ok(());
            }

            let mut agent = MediaAgent::new(&output, AgentConfig::cartoon_optimized())?;
            let mut reports = Vec::new();

            for section in handout.sections {
                info!(
                    "[MAIN] 📂 Section: {} — {}",
                    section.name, section.description
                );
                let mut retrieved = 0usize;

                for query in section.queries {
                    if retrieved >= section.target_quantity {
                        break;
                    }
                    let mut request = MediaRequest::new(query, MediaType::Image);
                    request.quantity = section.target_quantity - retrieved;
                    request.quality = QualityTier::Professional;
                    request
                        .constraints
                        .insert("style".to_string(), "cartoon".to_string());
                    request
                        .context
                        .insert("handout".to_string(), handout.id.to_string());

                    let section_report = agent.process_request(&request).await;
                    retrieved += section_report.summary.total_retrieved;
                    reports.push(section_report);
                }

                info!(
                    "[MAIN]    ✅ Section complete: {}/{}",
                    retrieved, section.target_quantity
                );
            }

            info!(
                "[MAIN] ✨ Handout retrieval complete: {} assets total",
                agent.results().len()
            );
            if let Some(path) = report_path {
                report::save_json(&reports, &path)?;
            }
        }

        Commands::Validate {
            input,
            handout,
            report: report_path,
        } => {
            let paths = discover_images(&input);
            if paths.is_empty() {
                warn!("[MAIN] No images found under {:?}", input);
                return Ok(());
            }

            let validator = MediaValidator::new(ValidatorConfig::default());
            let (valid, failed) = validator.validate_batch(&paths, handout.as_deref());
            let validation_report = ValidationReport::build(valid, failed, handout.as_deref());

            info!(
                "[MAIN] ✨ Validation complete: {}/{} passed ({:.0}%)",
                validation_report.summary.passed,
                validation_report.metadata.total_images,
                validation_report.summary.pass_rate
            );
            report::save_json(&validation_report, &report_path)?;
        }
    }

    Ok(())
}
