use scraper::{ElementRef, Selector};
use tracing::debug;

use super::ReviewSelectors;
use crate::models::RawReview;

/// Pull the five raw fields out of one review container.
///
/// Each field is looked up independently; an absent sub-node yields `""`
/// and never affects the others.
pub fn extract(review: ElementRef<'_>, selectors: &ReviewSelectors) -> RawReview {
    RawReview {
        profile_name: or_empty(first_text(review, &selectors.profile_name), "profile_name"),
        title: or_empty(first_child_text(review, &selectors.title), "title"),
        date_raw: or_empty(first_text(review, &selectors.date), "date"),
        stars_raw: or_empty(first_text(review, &selectors.stars), "stars"),
        review_text: or_empty(first_child_text(review, &selectors.body), "review_text"),
    }
}

fn or_empty(value: Option<String>, field: &str) -> String {
    value.unwrap_or_else(|| {
        debug!("Review field '{}' missing, using empty string", field);
        String::new()
    })
}

/// Text of the first descendant matching `selector`.
fn first_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector).next().map(element_text)
}

/// Text of the first child element of the first descendant matching `selector`.
fn first_child_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let anchor = node.select(selector).next()?;
    let child = anchor.children().find_map(ElementRef::wrap)?;
    Some(element_text(child))
}

fn element_text(node: ElementRef<'_>) -> String {
    node.text().collect()
}
