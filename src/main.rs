use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reelcap::config::{Config, OutputFormat};
use reelcap::export::payload::{estimate_payload_size, format_file_size, SizeCategory};
use reelcap::export::{
    orchestrator::write_fallback_srt, ExportOrchestrator, ExportRequest, HttpExportClient,
    OutputOptions,
};
use reelcap::segmenter::generate_captions;
use reelcap::subtitle::{
    create_formatter,
    srt::{captions_from_cues, parse_srt_content, validate_srt_file},
    CaptionSegment, CaptionStyle,
};
use reelcap::ReelcapError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "reelcap")]
#[command(version, about = "Caption timing and subtitle export for short-form video")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate timed captions from a transcript file
    Generate {
        /// Plain-text transcript file
        transcript: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Output subtitle file (defaults to transcript name with format extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: srt, ass
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Convert an SRT file to a styled ASS document
    Convert {
        /// Input SRT file
        input: PathBuf,

        /// Output ASS file (defaults to input name with .ass extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Submit a burn-in export job and poll it to completion
    Export {
        /// SRT file with the captions to burn in
        captions: PathBuf,

        /// Server-side id of the uploaded video
        #[arg(long)]
        video_id: String,

        /// Video duration in seconds, used to tune polling
        #[arg(short, long)]
        duration: f64,

        /// Directory for a locally saved artifact or fallback SRT
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path, format: &OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}.{}", stem.to_string_lossy(), format.extension()));
    output
}

fn load_srt_captions(path: &Path) -> Result<Vec<CaptionSegment>> {
    validate_srt_file(path).context("SRT validation failed")?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cues = parse_srt_content(&content);
    if cues.is_empty() {
        anyhow::bail!("No valid cues found in {}", path.display());
    }
    Ok(captions_from_cues(&cues))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    match cli.command {
        Commands::Generate {
            transcript,
            duration,
            output,
            format,
        } => {
            if !transcript.exists() {
                anyhow::bail!("Transcript file not found: {}", transcript.display());
            }

            let format: OutputFormat = match format {
                Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
                None => config.default_format,
            };
            let output = output.unwrap_or_else(|| derive_output_path(&transcript, &format));

            let text = std::fs::read_to_string(&transcript)
                .with_context(|| format!("Failed to read {}", transcript.display()))?;
            let captions = generate_captions(&text, duration, &config.segmenter_config());
            if captions.is_empty() {
                anyhow::bail!("Transcript is empty; nothing to generate");
            }

            let formatter = create_formatter(format, &CaptionStyle::default());
            std::fs::write(&output, formatter.format(&captions))
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!("Wrote {} captions to {}", captions.len(), output.display());
        }

        Commands::Convert { input, output } => {
            let captions = load_srt_captions(&input)?;
            let output = output.unwrap_or_else(|| derive_output_path(&input, &OutputFormat::Ass));

            let formatter = create_formatter(OutputFormat::Ass, &CaptionStyle::default());
            std::fs::write(&output, formatter.format(&captions))
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!("Converted {} cues to {}", captions.len(), output.display());
        }

        Commands::Export {
            captions,
            video_id,
            duration,
            output_dir,
        } => {
            let captions = load_srt_captions(&captions)?;

            let payload_hint = estimate_payload_size(duration);
            let category = SizeCategory::of(payload_hint);
            info!(
                "Estimated payload: {} ({}, typically {})",
                format_file_size(payload_hint),
                category.label(),
                category.estimated_time()
            );

            let request = ExportRequest {
                video_id,
                captions: captions.clone(),
                style: CaptionStyle::default(),
                options: OutputOptions::default(),
            };

            let api = Arc::new(HttpExportClient::new(config.backend_url.clone()));
            let orchestrator = ExportOrchestrator::new(api).with_output_dir(&output_dir);

            // Submission failure and polling timeout demand different
            // remediation, so the two phases report separately.
            let job_id = match orchestrator.submit(&request).await {
                Ok(job_id) => job_id,
                Err(ReelcapError::Unavailable(e)) => {
                    warn!("Export service unreachable ({}); falling back to local SRT", e);
                    let fallback = output_dir.join("captions.srt");
                    write_fallback_srt(&captions, &fallback)?;
                    info!("Captions saved to {}", fallback.display());
                    return Ok(());
                }
                Err(e) => {
                    anyhow::bail!(
                        "Export submission failed: {}. \
                         Check connectivity and backend availability, then resubmit.",
                        e
                    );
                }
            };

            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );

            let result = orchestrator
                .track(&job_id, payload_hint, |status| {
                    pb.set_position(status.progress as u64);
                    if let Some(ref message) = status.message {
                        pb.set_message(message.clone());
                    }
                })
                .await;

            match result {
                Ok(outcome) => {
                    pb.finish_with_message("Export complete");
                    match outcome.artifact {
                        reelcap::export::ExportArtifact::Remote { url } => {
                            info!("Rendered video available at {}", url);
                        }
                        reelcap::export::ExportArtifact::File { path } => {
                            info!("Rendered video saved to {}", path.display());
                        }
                    }
                }
                Err(e @ ReelcapError::PollingExhausted { .. }) => {
                    pb.abandon_with_message("Export timed out");
                    anyhow::bail!(
                        "Export timed out after extended polling: {}. \
                         The job may still finish on the server; try exporting again later.",
                        e
                    );
                }
                Err(e) => {
                    pb.abandon_with_message("Export failed");
                    anyhow::bail!("Export failed: {}", e);
                }
            }
        }
    }

    Ok(())
}
