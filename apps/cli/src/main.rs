use std::{path::PathBuf, time::Duration, time::Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use scenelens_core::{
    AnalysisService, HttpAnalysisService, PendingFile, ServiceConfig, SubmissionState, Workflow,
    format_duration, logging,
};

mod render;

const IN_FLIGHT_MESSAGE: &str =
    "Uploading and analyzing... Depending on the file size, it might take a few minutes to 1 hour.";

#[derive(Parser)]
#[command(name = "scenelens")]
#[command(about = "Upload a video and an analyzer schema, then print the analysis results")]
struct Cli {
    /// Video file to analyze
    video: Option<PathBuf>,

    /// Analyzer schema file (JSON)
    schema: Option<PathBuf>,

    /// Analysis service endpoint. Overrides SCENELENS_ENDPOINT and the config file.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Content block to show fields for, as numbered in the scene list
    #[arg(short, long, conflicts_with = "all", value_parser = clap::value_parser!(u64).range(1..))]
    block: Option<u64>,

    /// Show the fields of every content block
    #[arg(short, long)]
    all: bool,

    /// Print the analysis result as JSON
    #[arg(long)]
    json: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("{} {}", style("Warning:").yellow().bold(), e);
    }

    let config = ServiceConfig::resolve(cli.endpoint.as_deref()).unwrap_or_else(|e| fail(e));
    let service = HttpAnalysisService::new(&config)?;

    let mut workflow = Workflow::new();
    if let Some(video) = cli.video {
        workflow.select_video(PendingFile::new(video));
    }
    if let Some(schema) = cli.schema {
        workflow.select_schema(PendingFile::new(schema));
    }

    // Checked before anything is printed or sent
    let submission = workflow.begin_submit().unwrap_or_else(|e| fail(e));

    println!(
        "\n{}  {}\n",
        style("scenelens").cyan().bold(),
        style("Video Analyzer").dim()
    );
    println!(
        "{} {}",
        style("Endpoint:").dim(),
        style(service.endpoint()).cyan()
    );

    info!(
        id = %submission.id,
        endpoint = %service.endpoint(),
        video = %submission.request.video.path().display(),
        "submitting analysis"
    );
    let started = Instant::now();
    let spinner = create_spinner(IN_FLIGHT_MESSAGE);
    let outcome = service.analyze(submission.request).await;
    workflow.complete(submission.id, outcome);

    if let SubmissionState::Failed { message } = workflow.state() {
        warn!(error = %message, "analysis failed");
        spinner.finish_and_clear();
        fail(message);
    }

    let Some(session) = workflow.session() else {
        fail("the analysis finished without a result");
    };
    let result = session.result();
    info!(
        blocks = result.contents.len(),
        elapsed = %format_duration(started.elapsed()),
        "analysis finished"
    );

    let analyzer = result
        .analyzer_id
        .as_deref()
        .map(|id| format!(" by {}", style(id).yellow()))
        .unwrap_or_default();
    spinner.finish_with_message(format!(
        "{} Analyzed: {} content blocks{} {}",
        style("✓").green().bold(),
        result.contents.len(),
        analyzer,
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    ));
    if !result.warnings.is_empty() {
        println!(
            "{} {} warning(s) reported by the service",
            style("!").yellow().bold(),
            result.warnings.len()
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&**result)?);
        return Ok(());
    }

    println!("{}", render::divider());

    if cli.all {
        for index in 0..session.selection().len() {
            workflow.select(index)?;
            if let Some(view) = workflow.session().and_then(|s| s.selected_view()) {
                render::print_block(&view);
            }
        }
    } else {
        if let Some(block) = cli.block {
            let index = usize::try_from(block - 1).unwrap_or(usize::MAX);
            if let Err(e) = workflow.select(index) {
                fail(e);
            }
        }
        let Some(session) = workflow.session() else {
            return Ok(());
        };
        render::print_scene_list(session);
        match session.selected_view() {
            Some(view) => render::print_block(&view),
            None => println!("\n{}", style("The service returned no content blocks.").dim()),
        }
    }

    if let Some(session) = workflow.session() {
        render::print_transcripts(&session.transcripts());
    }

    Ok(())
}
