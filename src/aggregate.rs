use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{MonthlyAggregate, Review, SentimentLabel, YearMonth};

#[derive(Default)]
struct Counts {
    positive: usize,
    negative: usize,
    neutral: usize,
}

/// Group reviews by calendar month of `review_date`, oldest month first.
///
/// Reviews without a `review_date` are left out. Months with no reviews do not appear.
pub fn monthly_series(reviews: &[Review]) -> Vec<MonthlyAggregate> {
    let mut by_month: BTreeMap<YearMonth, Counts> = BTreeMap::new();

    for review in reviews {
        let Some(date) = review.normalized.review_date else {
            continue;
        };
        let period = YearMonth {
            year: date.year(),
            month: date.month(),
        };
        let counts = by_month.entry(period).or_default();
        match review.sentiment_label {
            SentimentLabel::Positive => counts.positive += 1,
            SentimentLabel::Negative => counts.negative += 1,
            SentimentLabel::Neutral => counts.neutral += 1,
        }
    }

    by_month
        .into_iter()
        .map(|(period, c)| {
            let total = c.positive + c.negative + c.neutral;
            MonthlyAggregate {
                period,
                positive_count: c.positive,
                negative_count: c.negative,
                neutral_count: c.neutral,
                total_reviews: total,
                pos_pct: percent(c.positive, total),
                neg_pct: percent(c.negative, total),
                neu_pct: percent(c.neutral, total),
            }
        })
        .collect()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return f64::NAN;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedReview, RawReview};
    use chrono::NaiveDate;

    fn review(id: usize, date: Option<(i32, u32, u32)>, label: SentimentLabel) -> Review {
        Review {
            normalized: NormalizedReview {
                id,
                raw: RawReview::default(),
                rating: Some(3.0),
                location: None,
                date_of_review: None,
                review_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                clean_review: String::new(),
                review_no_stopwords: String::new(),
                malformed: Vec::new(),
            },
            polarity: 0.0,
            sentiment_label: label,
        }
    }

    #[test]
    fn one_positive_one_negative_in_march() {
        let reviews = vec![
            review(0, Some((2021, 3, 2)), SentimentLabel::Positive),
            review(1, Some((2021, 3, 28)), SentimentLabel::Negative),
        ];
        let series = monthly_series(&reviews);
        assert_eq!(series.len(), 1);

        let m = &series[0];
        assert_eq!(m.period.to_string(), "2021-03");
        assert_eq!(m.positive_count, 1);
        assert_eq!(m.negative_count, 1);
        assert_eq!(m.neutral_count, 0);
        assert_eq!(m.total_reviews, 2);
        assert_eq!(m.pos_pct, 50.0);
        assert_eq!(m.neg_pct, 50.0);
        assert_eq!(m.neu_pct, 0.0);
    }

    #[test]
    fn months_sorted_without_gap_filling() {
        let reviews = vec![
            review(0, Some((2021, 5, 1)), SentimentLabel::Neutral),
            review(1, Some((2020, 12, 31)), SentimentLabel::Positive),
            review(2, Some((2021, 1, 15)), SentimentLabel::Positive),
            review(3, Some((2021, 5, 9)), SentimentLabel::Positive),
            review(4, None, SentimentLabel::Negative),
        ];
        let series = monthly_series(&reviews);
        let periods: Vec<String> = series.iter().map(|m| m.period.to_string()).collect();
        assert_eq!(periods, vec!["2020-12", "2021-01", "2021-05"]);

        for m in &series {
            assert_eq!(
                m.positive_count + m.negative_count + m.neutral_count,
                m.total_reviews
            );
            assert!((m.pos_pct + m.neg_pct + m.neu_pct - 100.0).abs() < 1e-9);
        }
        let total: usize = series.iter().map(|m| m.total_reviews).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn thirds_sum_to_hundred() {
        let reviews = vec![
            review(0, Some((2022, 7, 1)), SentimentLabel::Positive),
            review(1, Some((2022, 7, 2)), SentimentLabel::Negative),
            review(2, Some((2022, 7, 3)), SentimentLabel::Neutral),
        ];
        let m = &monthly_series(&reviews)[0];
        assert!((m.pos_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!((m.pos_pct + m.neg_pct + m.neu_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_empty_series() {
        assert!(monthly_series(&[]).is_empty());
        assert!(percent(0, 0).is_nan());
    }
}
