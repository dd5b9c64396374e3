use tracing::{info, warn};

use crate::aggregate;
use crate::models::{MonthlyAggregate, Review, ScrapedReview};
use crate::normalize;
use crate::sentiment::{self, PolarityScorer};
use crate::text::StopWords;

pub struct Analysis {
    pub reviews: Vec<Review>,
    pub monthly: Vec<MonthlyAggregate>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Reviews with at least one malformed derived field.
    pub malformed: usize,
    /// Reviews left out of the monthly series for lack of a date.
    pub undated: usize,
}

impl RunSummary {
    fn from_reviews(reviews: &[Review]) -> Self {
        let mut s = RunSummary {
            total: reviews.len(),
            ..Default::default()
        };
        for r in reviews {
            if r.is_positive() {
                s.positive += 1;
            } else if r.is_negative() {
                s.negative += 1;
            } else {
                s.neutral += 1;
            }
            if !r.normalized.malformed.is_empty() {
                s.malformed += 1;
            }
            if r.normalized.review_date.is_none() {
                s.undated += 1;
            }
        }
        s
    }
}

/// Normalize, classify and aggregate one scraped collection.
pub fn analyze<S: PolarityScorer + ?Sized>(
    scraped: Vec<ScrapedReview>,
    stopwords: &StopWords,
    scorer: &S,
) -> Analysis {
    let normalized = normalize::normalize_all(scraped, stopwords);
    let reviews = sentiment::classify_all(normalized, scorer);
    let monthly = aggregate::monthly_series(&reviews);
    let summary = RunSummary::from_reviews(&reviews);

    info!(
        "Analyzed {} reviews: {} positive, {} negative, {} neutral across {} months",
        summary.total,
        summary.positive,
        summary.negative,
        summary.neutral,
        monthly.len()
    );
    if summary.malformed > 0 {
        warn!(
            "{} reviews had malformed fields; {} left out of the monthly series",
            summary.malformed, summary.undated
        );
    }

    Analysis {
        reviews,
        monthly,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use crate::parser::{harvest_page, ReviewSelectors};
    use crate::sentiment::LexiconScorer;

    fn fixture_reviews() -> Vec<ScrapedReview> {
        let html = std::fs::read_to_string("tests/fixtures/reviews_page.html").unwrap();
        let selectors = ReviewSelectors::amazon().unwrap();
        harvest_page(&html, &selectors)
            .into_iter()
            .enumerate()
            .map(|(id, raw)| ScrapedReview { id, raw })
            .collect()
    }

    #[test]
    fn fixture_page_end_to_end() {
        let analysis = analyze(fixture_reviews(), &StopWords::english(), &LexiconScorer::new());
        assert_eq!(analysis.reviews.len(), 3);

        let labels: Vec<SentimentLabel> =
            analysis.reviews.iter().map(|r| r.sentiment_label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Neutral
            ]
        );

        let first = &analysis.reviews[0].normalized;
        assert_eq!(first.rating, Some(5.0));
        assert_eq!(first.location.as_deref(), Some("the United States"));

        // third review has no star rating
        assert_eq!(analysis.reviews[2].normalized.rating, None);
        assert_eq!(analysis.summary.malformed, 1);
        assert_eq!(analysis.summary.undated, 0);

        let periods: Vec<String> = analysis.monthly.iter().map(|m| m.period.to_string()).collect();
        assert_eq!(periods, vec!["2021-01", "2021-03"]);
        let march = &analysis.monthly[1];
        assert_eq!(march.negative_count, 1);
        assert_eq!(march.neutral_count, 1);
        assert_eq!(march.total_reviews, 2);
    }

    #[test]
    fn every_review_has_exactly_one_label() {
        let analysis = analyze(fixture_reviews(), &StopWords::english(), &LexiconScorer::new());
        for r in &analysis.reviews {
            let flags = [r.is_positive(), r.is_negative(), r.is_neutral()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            assert_eq!(r.sentiment_label, sentiment::label_for(r.polarity));
        }
    }

    #[test]
    fn empty_collection() {
        let analysis = analyze(Vec::new(), &StopWords::english(), &LexiconScorer::new());
        assert!(analysis.reviews.is_empty());
        assert!(analysis.monthly.is_empty());
        assert_eq!(analysis.summary, RunSummary::default());
    }
}
