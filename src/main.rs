//! # newsfeed
//!
//! Command-line front end for the news ingestion, filtering, and archival
//! pipeline.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... newsfeed fetch --filter Election --archive
//! ```
//!
//! Progress and status go to the log; article listings go to stdout. Ctrl-C
//! cancels a running fetch or archive and leaves whatever was already written
//! on disk.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use newsfeed::catalog;
use newsfeed::config;
use newsfeed::models::ArticleRecord;
use newsfeed::{ChannelObserver, Event, HttpPageFetcher, NewsApiClient, RunState, Session};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsfeed starting up");

    let args = Cli::parse();
    debug!(config = %args.config.display(), command = ?args.command, "Parsed CLI arguments");

    if args.command == Command::Categories {
        for category in catalog::categories() {
            println!("{}: {}", category.label, category.sources.join(", "));
        }
        return Ok(());
    }

    let mut config = config::load_or_create(&args.config).await?;
    args.apply_overrides(&mut config);

    let (observer, events) = ChannelObserver::new();
    let printer = tokio::spawn(print_events(events));
    let mut session = Session::new(&config, Arc::new(observer));

    if let Some(category) = &args.category {
        session.select_category(category)?;
    }
    info!(
        sources = session.sources().len(),
        sort_mode = %session.sort_mode(),
        store = %session.store().root().display(),
        "Session ready"
    );

    let outcome = run_command(&mut session, args.command).await;

    drop(session);
    finish_printer(printer).await;
    info!(elapsed = ?start_time.elapsed(), "newsfeed finished");
    outcome
}

async fn run_command(session: &mut Session, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Fetch { filter, archive } => {
            session.start_fetch(Arc::new(NewsApiClient::new()?))?;
            if !run_to_completion(session).await {
                return Ok(());
            }
            if let Some(term) = filter {
                session.filter(&term).await?;
            }
            if archive {
                start_archive(session).await?;
            }
        }
        Command::Show => {
            session.refresh().await;
        }
        Command::Load { dir } => {
            session.load_from(&dir).await?;
        }
        Command::Filter { term, archive } => {
            session.filter(&term).await?;
            if archive {
                start_archive(session).await?;
            }
        }
        Command::Archive { filter } => {
            session.refresh().await;
            if let Some(term) = filter {
                session.filter(&term).await?;
            }
            start_archive(session).await?;
        }
        Command::Categories => {}
    }
    Ok(())
}

async fn start_archive(session: &mut Session) -> Result<(), Box<dyn Error>> {
    session.start_archive(Arc::new(HttpPageFetcher::new()?))?;
    run_to_completion(session).await;
    Ok(())
}

/// Wait for the background operation, cancelling it on Ctrl-C.
///
/// Returns `false` when the run did not complete.
async fn run_to_completion(session: &mut Session) -> bool {
    let ended = tokio::select! {
        ended = session.wait() => ended,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; terminating");
            Some(session.cancel())
        }
    };
    matches!(ended, Some(RunState::Completed(_)))
}

async fn print_events(mut events: UnboundedReceiver<Event>) {
    while let Some(event) = events.recv().await {
        match event {
            Event::Progress(percent) => debug!(percent, "Progress"),
            Event::Status(status) if !status.is_empty() => info!(%status),
            Event::Status(_) => {}
            Event::ArticlesReady(records) => print_records(&records),
            Event::NoConnection => warn!("No connection to News API"),
            Event::Terminated => debug!("Operation terminated"),
            Event::NoResults => println!("No Results."),
            Event::NoArticles => warn!("No articles selected to save"),
            Event::MissingApiKey => {
                warn!("No API key; set NEWS_API_KEY or api_key in the configuration file")
            }
        }
    }
}

fn print_records(records: &[ArticleRecord]) {
    for record in records {
        println!("[{}] {}", record.id, record.title);
        println!("    {} | {}", record.published_at, record.author.as_deref().unwrap_or("-"));
        if let Some(description) = &record.description {
            println!("    {description}");
        }
        println!("    {}", record.url);
    }
    info!(count = records.len(), "Articles listed");
}

async fn finish_printer(printer: JoinHandle<()>) {
    if let Err(e) = printer.await {
        warn!(error = %e, "Event printer stopped abnormally");
    }
}
