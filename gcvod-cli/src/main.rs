mod cli;
mod selection;

use std::future::Future;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use gamechanger_api::{Credentials, GameChangerClient};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use vod_engine::{
    FetchConfig, MediaClient, RenditionSink, clear_directory_files, download_rendition,
    resolve_media_playlist,
};

use crate::cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("Application error: {e:#}");
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let credentials = Credentials {
        username: args.username.clone(),
        password: args.password.clone(),
        token: args.token.clone(),
    }
    .or_env();

    let api = GameChangerClient::new(credentials).context("failed to build the API client")?;

    let mut teams = with_spinner("Fetching teams...", api.teams())
        .await
        .context("failed to list teams")?;
    teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let team = selection::pick_team(&teams)?;
    info!(team = %team.name, "selected team");

    let schedule = with_spinner("Fetching schedule...", api.team_schedule(&team.id))
        .await
        .context("failed to fetch the team schedule")?;
    let games = selection::scheduled_games(schedule);
    anyhow::ensure!(
        !games.is_empty(),
        "no scheduled games with a start time for {}",
        team.name
    );

    let (event, renditions) = selection::pick_event_with_videos(&api, &team.id, &games).await?;
    info!(event = %event.id, renditions = renditions.len(), "selected event");

    let event_dir = args.output_dir.join(&event.id);
    clear_directory_files(&event_dir)
        .with_context(|| format!("failed to prepare {}", event_dir.display()))?;

    let config = FetchConfig {
        timeout: args.timeout.map(Duration::from_secs),
        verify_tls: !args.insecure,
        ..FetchConfig::default()
    };

    let total = renditions.len();
    for (index, rendition) in renditions.iter().enumerate() {
        let number = index + 1;
        println!(
            "\n{}",
            format!("Fetching video {number} of {total}").green().bold()
        );

        let client = MediaClient::new(config.clone(), &rendition.cookies)
            .context("failed to build the stream client")?;
        let manifest = resolve_media_playlist(&client, &rendition.url)
            .await
            .with_context(|| format!("failed to resolve the manifest for rendition {number}"))?;

        let mut sink = RenditionSink::new(&event_dir, number);
        let summary = download_rendition(&client, &manifest, &mut sink)
            .await
            .with_context(|| format!("failed to download rendition {number}"))?;

        info!(
            rendition = number,
            segments = summary.segments,
            init_segments = summary.init_segments,
            bytes = summary.bytes_written,
            "rendition complete"
        );
    }

    println!(
        "\n{} saved {total} stream(s) under {}",
        "Done:".green().bold(),
        event_dir.display()
    );
    Ok(())
}

/// Runs a fetch behind a spinner so slow API calls stay visibly alive.
async fn with_spinner<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap());
    pb.set_message(message.to_string());

    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
