mod aggregate;
mod chart;
mod db;
mod fetch;
mod models;
mod normalize;
mod parser;
mod pipeline;
mod sentiment;
mod text;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use fetch::{ClientConfig, HttpPageSource};
use parser::ReviewSelectors;
use sentiment::LexiconScorer;
use text::StopWords;

#[derive(Parser)]
#[command(
    name = "review_sentiment",
    about = "Scrape a product's reviews and chart their sentiment month by month"
)]
struct Cli {
    /// Product identifier (ASIN), e.g. B00UCBJIG4
    product_id: String,

    /// Storefront to scrape
    #[arg(long, default_value = fetch::DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory for the monthly JSON series and SVG charts
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Also write reviews and the monthly series to this SQLite file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Stopword list, one word per line (default: built-in English list)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    if cli.product_id.is_empty() || !cli.product_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Product id must be alphanumeric, got '{}'", cli.product_id);
    }

    let config = ClientConfig::new(
        &cli.base_url,
        Duration::from_secs(cli.timeout_secs),
        Duration::from_millis(cli.delay_ms),
    );
    let stopwords = match &cli.stopwords {
        Some(path) => StopWords::from_file(path)?,
        None => StopWords::english(),
    };
    info!("Loaded {} stopwords", stopwords.len());
    let selectors = ReviewSelectors::amazon()?;
    let source = HttpPageSource::new(&config)?;

    // Phase 1: Scrape
    println!("Scraping reviews for {} from {}...", cli.product_id, config.base_url);
    let t_scrape = Instant::now();
    let scraped = fetch::extract_reviews(&source, &cli.product_id, &selectors, config.delay)
        .await
        .with_context(|| format!("Review extraction failed for {}", cli.product_id))?;
    println!(
        "Scraped {} reviews in {:.1}s",
        scraped.len(),
        t_scrape.elapsed().as_secs_f64()
    );

    // Phase 2: Normalize, classify, aggregate
    let analysis = pipeline::analyze(scraped, &stopwords, &LexiconScorer::new());
    print_report(&analysis);

    // Phase 3: Outputs
    let paths = chart::write_outputs(&cli.out_dir, &cli.product_id, &analysis.monthly)?;
    println!("Chart:  {}", paths.svg.display());
    println!("Counts: {}", paths.counts_svg.display());
    println!("Series: {}", paths.json.display());

    if let Some(db_path) = &cli.db {
        let conn = db::connect(db_path)?;
        db::init_schema(&conn)?;
        db::save_run(&conn, &cli.product_id, &analysis.reviews, &analysis.monthly)?;
        println!(
            "Saved {} reviews to {}",
            db::count_reviews(&conn, &cli.product_id)?,
            db_path.display()
        );
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn print_report(analysis: &pipeline::Analysis) {
    let s = &analysis.summary;
    if analysis.monthly.is_empty() {
        println!("No dated reviews to chart.");
    } else {
        println!(
            "\n{:<7} | {:>5} | {:>5} | {:>5} | {:>5} | {:>6} | {:>6} | {:>6}",
            "Month", "Pos", "Neg", "Neu", "Total", "Pos%", "Neg%", "Neu%"
        );
        println!("{}", "-".repeat(66));
        for m in &analysis.monthly {
            println!(
                "{:<7} | {:>5} | {:>5} | {:>5} | {:>5} | {:>6.1} | {:>6.1} | {:>6.1}",
                m.period.to_string(),
                m.positive_count,
                m.negative_count,
                m.neutral_count,
                m.total_reviews,
                m.pos_pct,
                m.neg_pct,
                m.neu_pct
            );
        }
    }

    println!(
        "\n{} reviews: {} positive, {} negative, {} neutral.",
        s.total, s.positive, s.negative, s.neutral
    );
    if s.malformed > 0 {
        println!(
            "{} reviews had malformed rating/date fields ({} without a date, not charted).",
            s.malformed, s.undated
        );
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
