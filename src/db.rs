use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::models::{MonthlyAggregate, Review};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reviews (
            product_id          TEXT NOT NULL,
            id                  INTEGER NOT NULL,
            profile_name        TEXT NOT NULL,
            title               TEXT NOT NULL,
            date_raw            TEXT NOT NULL,
            stars_raw           TEXT NOT NULL,
            review_text         TEXT NOT NULL,
            rating              REAL,
            location            TEXT,
            date_of_review      TEXT,
            review_date         TEXT,
            clean_review        TEXT NOT NULL,
            review_no_stopwords TEXT NOT NULL,
            polarity            REAL NOT NULL,
            sentiment_label     TEXT NOT NULL CHECK(sentiment_label IN ('positive','negative','neutral')),
            malformed           TEXT,
            PRIMARY KEY (product_id, id)
        );
        CREATE INDEX IF NOT EXISTS idx_reviews_date ON reviews(product_id, review_date);

        CREATE TABLE IF NOT EXISTS monthly_sentiment (
            product_id     TEXT NOT NULL,
            period         TEXT NOT NULL,
            positive_count INTEGER NOT NULL,
            negative_count INTEGER NOT NULL,
            neutral_count  INTEGER NOT NULL,
            total_reviews  INTEGER NOT NULL,
            pos_pct        REAL,
            neg_pct        REAL,
            neu_pct        REAL,
            PRIMARY KEY (product_id, period)
        );
        ",
    )?;
    Ok(())
}

/// Replace everything stored for `product_id` with this run's output.
pub fn save_run(
    conn: &Connection,
    product_id: &str,
    reviews: &[Review],
    monthly: &[MonthlyAggregate],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM reviews WHERE product_id = ?1", [product_id])?;
    tx.execute("DELETE FROM monthly_sentiment WHERE product_id = ?1", [product_id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO reviews
             (product_id, id, profile_name, title, date_raw, stars_raw, review_text, rating,
              location, date_of_review, review_date, clean_review, review_no_stopwords,
              polarity, sentiment_label, malformed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )?;
        for r in reviews {
            let n = &r.normalized;
            let malformed = if n.malformed.is_empty() {
                None
            } else {
                Some(
                    n.malformed
                        .iter()
                        .map(|f| f.to_string())
                        .collect::<Vec<_>>()
                        .join(","),
                )
            };
            stmt.execute(rusqlite::params![
                product_id,
                n.id as i64,
                n.raw.profile_name,
                n.raw.title,
                n.raw.date_raw,
                n.raw.stars_raw,
                n.raw.review_text,
                n.rating,
                n.location,
                n.date_of_review,
                n.review_date.map(|d| d.to_string()),
                n.clean_review,
                n.review_no_stopwords,
                r.polarity,
                r.sentiment_label.as_str(),
                malformed,
            ])?;
        }
    }
    {
        let mut stmt = tx.prepare(
            "INSERT INTO monthly_sentiment
             (product_id, period, positive_count, negative_count, neutral_count, total_reviews,
              pos_pct, neg_pct, neu_pct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for m in monthly {
            stmt.execute(rusqlite::params![
                product_id,
                m.period.to_string(),
                m.positive_count as i64,
                m.negative_count as i64,
                m.neutral_count as i64,
                m.total_reviews as i64,
                finite(m.pos_pct),
                finite(m.neg_pct),
                finite(m.neu_pct),
            ])?;
        }
    }
    tx.commit()?;
    info!(
        "Saved {} reviews and {} months for {}",
        reviews.len(),
        monthly.len(),
        product_id
    );
    Ok(())
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

pub fn count_reviews(conn: &Connection, product_id: &str) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE product_id = ?1",
        [product_id],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}
