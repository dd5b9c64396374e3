use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// One review as scraped, before any normalization. Missing sub-nodes are `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawReview {
    pub profile_name: String,
    pub title: String,
    pub date_raw: String,
    pub stars_raw: String,
    pub review_text: String,
}

/// A raw review with its position in the full collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedReview {
    pub id: usize,
    pub raw: RawReview,
}

/// Derived fields that could not be recovered from a composite string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedField {
    Rating,
    Location,
    DateOfReview,
    ReviewDate,
}

impl fmt::Display for MalformedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MalformedField::Rating => "rating",
            MalformedField::Location => "location",
            MalformedField::DateOfReview => "date_of_review",
            MalformedField::ReviewDate => "review_date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedReview {
    pub id: usize,
    #[serde(flatten)]
    pub raw: RawReview,
    pub rating: Option<f64>,
    pub location: Option<String>,
    pub date_of_review: Option<String>,
    pub review_date: Option<NaiveDate>,
    pub clean_review: String,
    pub review_no_stopwords: String,
    pub malformed: Vec<MalformedField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// A normalized review with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    #[serde(flatten)]
    pub normalized: NormalizedReview,
    pub polarity: f64,
    pub sentiment_label: SentimentLabel,
}

impl Review {
    pub fn is_positive(&self) -> bool {
        self.sentiment_label == SentimentLabel::Positive
    }

    pub fn is_negative(&self) -> bool {
        self.sentiment_label == SentimentLabel::Negative
    }

    pub fn is_neutral(&self) -> bool {
        self.sentiment_label == SentimentLabel::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sentiment counts for one calendar month. Percentages are NaN when `total_reviews` is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub period: YearMonth,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_reviews: usize,
    pub pos_pct: f64,
    pub neg_pct: f64,
    pub neu_pct: f64,
}
