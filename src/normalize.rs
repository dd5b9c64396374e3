use chrono::NaiveDate;
use tracing::warn;

use crate::models::{MalformedField, NormalizedReview, ScrapedReview};
use crate::text::{self, StopWords};

const REVIEWED_IN: &str = "Reviewed in";
const ON: &str = " on ";

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%Y-%m-%d"];

/// Location and date pieces of a `"Reviewed in <location> on <date>"` string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateParts {
    pub location: Option<String>,
    pub date_of_review: Option<String>,
}

/// Leading numeric token of e.g. `"4.0 out of 5 stars"`. `None` when absent or outside 0..=5.
pub fn parse_rating(stars_raw: &str) -> Option<f64> {
    let token = stars_raw.split_whitespace().next()?;
    let rating = token.parse::<f64>().ok()?;
    (rating.is_finite() && (0.0..=5.0).contains(&rating)).then_some(rating)
}

/// Split the composite review-date string.
///
/// The date is whatever follows the last `" on "`; the location needs the
/// `"Reviewed in"` prefix as well and sits between the two markers.
pub fn split_date_raw(date_raw: &str) -> DateParts {
    let Some((head, date)) = date_raw.rsplit_once(ON) else {
        return DateParts::default();
    };

    let date_of_review = non_empty(date);
    let location = head
        .split_once(REVIEWED_IN)
        .and_then(|(_, location)| non_empty(location));

    DateParts {
        location,
        date_of_review,
    }
}

pub fn parse_review_date(date_of_review: &str) -> Option<NaiveDate> {
    let s = date_of_review.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

pub fn normalize_review(scraped: ScrapedReview, stopwords: &StopWords) -> NormalizedReview {
    let ScrapedReview { id, raw } = scraped;
    let mut malformed = Vec::new();

    let rating = parse_rating(&raw.stars_raw);
    if rating.is_none() {
        malformed.push(MalformedField::Rating);
    }

    let DateParts {
        location,
        date_of_review,
    } = split_date_raw(&raw.date_raw);
    if location.is_none() {
        malformed.push(MalformedField::Location);
    }
    if date_of_review.is_none() {
        malformed.push(MalformedField::DateOfReview);
    }

    let review_date = date_of_review.as_deref().and_then(parse_review_date);
    if review_date.is_none() {
        malformed.push(MalformedField::ReviewDate);
    }

    if !malformed.is_empty() {
        let fields: Vec<String> = malformed.iter().map(|f| f.to_string()).collect();
        warn!("Review {} has malformed fields: {}", id, fields.join(", "));
    }

    let clean_review = text::clean_review(&raw.review_text);
    let review_no_stopwords = text::remove_stopwords(&clean_review, stopwords);

    NormalizedReview {
        id,
        raw,
        rating,
        location,
        date_of_review,
        review_date,
        clean_review,
        review_no_stopwords,
        malformed,
    }
}

/// Normalize every review. Same order and count as the input.
pub fn normalize_all(scraped: Vec<ScrapedReview>, stopwords: &StopWords) -> Vec<NormalizedReview> {
    scraped
        .into_iter()
        .map(|s| normalize_review(s, stopwords))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawReview;

    fn scraped(id: usize, stars: &str, date: &str, body: &str) -> ScrapedReview {
        ScrapedReview {
            id,
            raw: RawReview {
                profile_name: "someone".into(),
                title: "a title".into(),
                date_raw: date.into(),
                stars_raw: stars.into(),
                review_text: body.into(),
            },
        }
    }

    #[test]
    fn rating_from_stars() {
        assert_eq!(parse_rating("5.0 out of 5 stars"), Some(5.0));
        assert_eq!(parse_rating("3.5 out of 5 stars"), Some(3.5));
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("five stars"), None);
        assert_eq!(parse_rating("7.0 out of 5 stars"), None);
        assert_eq!(parse_rating("NaN out of 5 stars"), None);
    }

    #[test]
    fn us_date_string() {
        let parts = split_date_raw("Reviewed in the United States on January 5, 2021");
        assert_eq!(parts.location.as_deref(), Some("the United States"));
        assert_eq!(parts.date_of_review.as_deref(), Some("January 5, 2021"));
        assert_eq!(
            parse_review_date("January 5, 2021"),
            NaiveDate::from_ymd_opt(2021, 1, 5)
        );
    }

    #[test]
    fn location_containing_on_is_not_split() {
        let parts = split_date_raw("Reviewed in London on 12 March 2021");
        assert_eq!(parts.location.as_deref(), Some("London"));
        assert_eq!(parts.date_of_review.as_deref(), Some("12 March 2021"));
        assert_eq!(
            parse_review_date("12 March 2021"),
            NaiveDate::from_ymd_opt(2021, 3, 12)
        );
    }

    #[test]
    fn missing_markers() {
        assert_eq!(split_date_raw(""), DateParts::default());
        assert_eq!(split_date_raw("January 5, 2021"), DateParts::default());

        let parts = split_date_raw("Posted on January 5, 2021");
        assert_eq!(parts.location, None);
        assert_eq!(parts.date_of_review.as_deref(), Some("January 5, 2021"));
    }

    #[test]
    fn other_date_formats() {
        assert_eq!(parse_review_date("Mar 3, 2020"), NaiveDate::from_ymd_opt(2020, 3, 3));
        assert_eq!(parse_review_date("2019-11-30"), NaiveDate::from_ymd_opt(2019, 11, 30));
        assert_eq!(parse_review_date("yesterday"), None);
        assert_eq!(parse_review_date("February 30, 2021"), None);
    }

    #[test]
    fn full_review() {
        let r = normalize_review(
            scraped(
                7,
                "4.0 out of 5 stars",
                "Reviewed in Canada on March 20, 2021",
                "Really GOOD!\nWorks with https://example.com too.",
            ),
            &StopWords::english(),
        );
        assert_eq!(r.id, 7);
        assert_eq!(r.rating, Some(4.0));
        assert_eq!(r.location.as_deref(), Some("Canada"));
        assert_eq!(r.review_date, NaiveDate::from_ymd_opt(2021, 3, 20));
        assert_eq!(r.clean_review, "really goodworks with  too");
        assert_eq!(r.review_no_stopwords, "really goodworks");
        assert!(r.malformed.is_empty());
    }

    #[test]
    fn malformed_fields_are_isolated_per_record() {
        let sw = StopWords::english();
        let batch = vec![
            scraped(0, "", "garbage", "fine"),
            scraped(1, "2.0 out of 5 stars", "Reviewed in Japan on 2021年3月1日", "ok"),
            scraped(2, "1.0 out of 5 stars", "Reviewed in India on April 2, 2022", "bad"),
        ];
        let out = normalize_all(batch, &sw);
        assert_eq!(out.len(), 3);

        assert_eq!(
            out[0].malformed,
            vec![
                MalformedField::Rating,
                MalformedField::Location,
                MalformedField::DateOfReview,
                MalformedField::ReviewDate
            ]
        );
        assert_eq!(out[0].clean_review, "fine");

        assert_eq!(out[1].location.as_deref(), Some("Japan"));
        assert_eq!(out[1].malformed, vec![MalformedField::ReviewDate]);

        assert!(out[2].malformed.is_empty());
        let ids: Vec<usize> = out.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
