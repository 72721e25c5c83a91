use std::sync::Arc;

use anyhow::Context;
use ractor::Actor;
use shared_types::{Applicability, Run};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio::actor::{fetch_view, request_analysis, StudioActor, StudioArguments, StudioEvent};
use studio::analysis::HttpAnalysisGateway;
use studio::config::Config;
use studio::session::{Session, StudioView};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "studio=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: studio <essay.txt>")?;
    let essay = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read essay {path}"))?;

    let config = Config::from_env()?;
    info!(endpoint = %config.analysis_url, task = config.task_variant.as_str(), "studio starting");

    let gateway = HttpAnalysisGateway::from_config(&config)?;
    let session = Session::from_config(essay, &config).map_err(|e| anyhow::anyhow!(e))?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (actor, handle) = Actor::spawn(
        None,
        StudioActor,
        StudioArguments {
            session,
            gateway: Arc::new(gateway),
            events: Some(events_tx),
        },
    )
    .await
    .context("Failed to spawn studio actor")?;

    let request_id = request_analysis(&actor).await?;
    while let Some(event) = events_rx.recv().await {
        match event {
            StudioEvent::AnalysisInstalled { request_id: id, .. }
            | StudioEvent::AnalysisFailed { request_id: id, .. }
                if id == request_id =>
            {
                break;
            }
            _ => {}
        }
    }

    let view = fetch_view(&actor).await?;
    print_report(&view);

    actor.stop(None);
    handle.await.context("Studio actor panicked")?;
    Ok(())
}

fn print_report(view: &StudioView) {
    if let Some(error) = &view.error {
        eprintln!("{error}");
    }
    if let Some(score) = view.band_score {
        println!("Band score: {score:.1}");
    }
    if let Some(comment) = &view.general_comment {
        println!("\n{comment}");
    }

    println!("\n--- Annotated essay ---");
    let mut annotated = String::new();
    for run in &view.runs {
        match run {
            Run::Plain { text } | Run::Changed { text } => annotated.push_str(text),
            Run::Correction { text, correction } => {
                let replacement = view
                    .corrections
                    .get(*correction)
                    .map(|c| c.correction.replacement.as_str())
                    .unwrap_or_default();
                annotated.push_str(&format!("[[{text} -> {replacement}]]"));
            }
        }
    }
    println!("{annotated}");

    println!("\n--- Suggestions ---");
    for entry in &view.suggestions {
        let marker = match entry.status {
            Applicability::Open => "open",
            Applicability::Resolved => "done",
            Applicability::Informational => "info",
        };
        println!("[{marker}] {}", entry.suggestion.display_text);
        if !entry.suggestion.detail_text.is_empty() {
            println!("       {}", entry.suggestion.detail_text);
        }
    }

    let summary = &view.summary;
    println!(
        "\n{} corrections open, {} resolved; {} suggestions open, {} resolved",
        summary.corrections.open,
        summary.corrections.resolved,
        summary.suggestions.open,
        summary.suggestions.resolved
    );
}
