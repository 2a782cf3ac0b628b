use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use scopecrawl::analytics::Analytics;
use scopecrawl::cli::{Cli, Commands};
use scopecrawl::config::CrawlConfig;
use scopecrawl::store::StoreError;
use scopecrawl::{crawler, logging};

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

#[allow(clippy::too_many_arguments)]
async fn run_crawl_command(
    seeds: Vec<String>,
    domains: Vec<String>,
    data_dir: String,
    workers: usize,
    politeness: f64,
    user_agent: String,
    timeout: u64,
    save_interval: u64,
    restart: bool,
) -> Result<(), MainError> {
    let config = CrawlConfig {
        seed_urls: seeds,
        allowed_domains: domains,
        data_dir: PathBuf::from(data_dir),
        workers,
        politeness_delay: Duration::from_secs_f64(politeness.max(0.0)),
        user_agent,
        timeout_secs: timeout,
        save_interval_secs: save_interval,
    };

    logging::init(&config.data_dir).map_err(|e| MainError::Logging(e.to_string()))?;

    let crawler = crawler::build(config, restart)?;

    // Ctrl+C asks workers to wind down after their in-flight page; run()
    // still joins the pool and flushes the final analytics snapshot.
    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing in-flight work");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let report = crawler.run().await;

    println!(
        "Crawl finished: {} processed, {} admitted, {} discovered in {}s",
        report.pages_processed,
        report.pages_admitted,
        report.urls_discovered,
        report.duration.as_secs()
    );
    println!("{}", report.frontier);

    Ok(())
}

fn run_report_command(data_dir: String, top: usize) {
    let analytics = Analytics::open(PathBuf::from(&data_dir).join("analytics.json"));
    let report = analytics.snapshot();

    match &report.longest_page.url {
        Some(url) => println!("Longest page: {} ({} words)", url, report.longest_page.words),
        None => {
            println!("No analytics recorded yet in {}", data_dir);
            return;
        }
    }

    println!("\nPages per subdomain:");
    for (host, pages) in &report.subdomain_pages {
        println!("  {} - {} pages", host, pages.len());
    }

    println!("\nTop {} words:", top);
    for (word, count) in analytics.top_words(top) {
        println!("  {:<20} {}", word, count);
    }
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            seed,
            domain,
            data_dir,
            workers,
            politeness,
            user_agent,
            timeout,
            save_interval,
            restart,
        } => {
            run_crawl_command(
                seed,
                domain,
                data_dir,
                workers,
                politeness,
                user_agent,
                timeout,
                save_interval,
                restart,
            )
            .await?;
        }

        Commands::Report { data_dir, top } => {
            run_report_command(data_dir, top);
        }
    }

    Ok(())
}
