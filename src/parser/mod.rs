pub mod fields;

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

use crate::models::RawReview;

const CONTAINER: &str = "div.a-section.review.aok-relative";
const PROFILE_NAME: &str = "span.a-profile-name";
const TITLE: &str = r#"a[data-hook="review-title"]"#;
const DATE: &str = r#"span[data-hook="review-date"]"#;
const STARS: &str = "span.a-icon-alt";
const BODY: &str = r#"span[data-hook="review-body"]"#;

/// Compiled selectors for a review listing page. Built once and reused for every page.
pub struct ReviewSelectors {
    pub container: Selector,
    pub profile_name: Selector,
    /// Anchor whose first child element holds the title.
    pub title: Selector,
    pub date: Selector,
    pub stars: Selector,
    /// Anchor whose first child element holds the body.
    pub body: Selector,
}

impl ReviewSelectors {
    pub fn amazon() -> Result<Self> {
        Ok(Self {
            container: compile(CONTAINER)?,
            profile_name: compile(PROFILE_NAME)?,
            title: compile(TITLE)?,
            date: compile(DATE)?,
            stars: compile(STARS)?,
            body: compile(BODY)?,
        })
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{}': {}", css, e))
}

/// Harvest every review on one page, in document order. Empty when the page has none.
pub fn harvest_page(html: &str, selectors: &ReviewSelectors) -> Vec<RawReview> {
    let doc = Html::parse_document(html);
    harvest_document(&doc, selectors)
}

pub fn harvest_document(doc: &Html, selectors: &ReviewSelectors) -> Vec<RawReview> {
    doc.select(&selectors.container)
        .map(|node| fields::extract(node, selectors))
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn page_with_three_reviews() {
        let selectors = ReviewSelectors::amazon().unwrap();
        let reviews = harvest_page(&fixture("reviews_page"), &selectors);
        assert_eq!(reviews.len(), 3);

        assert_eq!(reviews[0].profile_name, "Jane D.");
        assert_eq!(reviews[0].title, "Amazing sound for the price");
        assert_eq!(reviews[0].stars_raw, "5.0 out of 5 stars");
        assert_eq!(
            reviews[0].date_raw,
            "Reviewed in the United States on January 5, 2021"
        );
        assert!(reviews[0].review_text.contains('\n'));

        assert_eq!(reviews[1].profile_name, "Marcus");
        assert_eq!(reviews[1].stars_raw, "1.0 out of 5 stars");
    }

    #[test]
    fn review_without_stars_or_title_is_kept() {
        let selectors = ReviewSelectors::amazon().unwrap();
        let reviews = harvest_page(&fixture("reviews_page"), &selectors);
        let third = &reviews[2];
        assert_eq!(third.profile_name, "A. Customer");
        assert_eq!(third.title, "");
        assert_eq!(third.stars_raw, "");
        assert_eq!(third.date_raw, "Reviewed in Canada on March 20, 2021");
    }

    #[test]
    fn empty_listing_harvests_nothing() {
        let selectors = ReviewSelectors::amazon().unwrap();
        assert!(harvest_page(&fixture("reviews_empty"), &selectors).is_empty());
        assert!(harvest_page("", &selectors).is_empty());
    }
}
