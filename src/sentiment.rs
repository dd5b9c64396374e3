//! Lexical polarity scoring and three-way labeling.
//!
//! The default scorer follows the usual adjective-lexicon approach: each known
//! word carries a polarity, an intensifier scales the word right after it, and a
//! nearby negation flips and halves it. The text's polarity is the mean of the
//! scored words.

use std::collections::{HashMap, HashSet};

use crate::models::{NormalizedReview, Review, SentimentLabel};

pub const POSITIVE_THRESHOLD: f64 = 0.01;
pub const NEGATIVE_THRESHOLD: f64 = -0.01;

const NEGATION_FACTOR: f64 = -0.5;
/// How many tokens back a negation still applies.
const NEGATION_WINDOW: usize = 3;

const LEXICON: &[(&str, f64)] = &[
    ("good", 0.7), ("great", 0.8), ("amazing", 0.6), ("wonderful", 1.0), ("excellent", 1.0),
    ("perfect", 1.0), ("awesome", 1.0), ("best", 1.0), ("better", 0.5), ("fantastic", 0.4),
    ("superb", 1.0), ("outstanding", 0.5), ("brilliant", 0.9), ("love", 0.5), ("loved", 0.7),
    ("loves", 0.5), ("lovely", 0.5), ("beautiful", 0.85), ("nice", 0.6), ("happy", 0.8),
    ("pleased", 0.5), ("satisfied", 0.5), ("recommend", 0.3), ("recommended", 0.3),
    ("impressive", 1.0), ("impressed", 0.5), ("solid", 0.3), ("sturdy", 0.3), ("reliable", 0.5),
    ("comfortable", 0.4), ("easy", 0.43), ("fast", 0.2), ("quick", 0.33), ("clear", 0.1),
    ("fine", 0.42), ("ok", 0.5), ("okay", 0.5), ("decent", 0.17), ("cool", 0.35),
    ("fun", 0.3), ("worth", 0.3), ("useful", 0.3), ("helpful", 0.5), ("incredible", 0.9),
    ("favorite", 0.5), ("glad", 0.5), ("enjoy", 0.4), ("enjoyed", 0.4), ("cheap", 0.4),
    ("affordable", 0.3), ("quality", 0.1), ("works", 0.2), ("worked", 0.2), ("well", 0.2),
    ("bad", -0.7), ("terrible", -1.0), ("horrible", -1.0), ("awful", -1.0), ("worst", -1.0),
    ("worse", -0.4), ("poor", -0.4), ("poorly", -0.4), ("disappointing", -0.6),
    ("disappointed", -0.75), ("disappointment", -0.6), ("broken", -0.4), ("broke", -0.4),
    ("useless", -0.5), ("waste", -0.2), ("junk", -0.5), ("garbage", -0.5), ("trash", -0.5),
    ("cheaply", -0.3), ("flimsy", -0.5), ("defective", -0.7), ("faulty", -0.5),
    ("return", -0.1), ("returned", -0.2), ("refund", -0.2), ("hate", -0.8), ("hated", -0.9),
    ("annoying", -0.8), ("uncomfortable", -0.5), ("difficult", -0.5), ("hard", -0.29),
    ("slow", -0.3), ("noisy", -0.2), ("loud", -0.1), ("fake", -0.5), ("wrong", -0.5),
    ("sad", -0.5), ("angry", -0.5), ("stopped", -0.2), ("failed", -0.5), ("fails", -0.5),
    ("problem", -0.3), ("problems", -0.3), ("issue", -0.2), ("issues", -0.2),
    ("mediocre", -0.3), ("overpriced", -0.5), ("unreliable", -0.5), ("dead", -0.2),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3), ("really", 1.2), ("extremely", 1.5), ("super", 1.3), ("so", 1.3),
    ("absolutely", 1.3), ("incredibly", 1.4), ("highly", 1.3), ("totally", 1.3),
    ("quite", 1.1), ("most", 1.2), ("too", 1.2),
];

const NEGATIONS: &[&str] = &[
    "not", "never", "no", "nor", "neither", "dont", "didnt", "doesnt", "isnt", "wasnt",
    "arent", "werent", "cant", "cannot", "wont", "wouldnt", "shouldnt", "hardly",
];

/// A deterministic text → polarity function with values in [-1, 1].
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> f64;
}

pub struct LexiconScorer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut multiplier = 1.0;
        let mut negated_at: Option<usize> = None;

        for (i, token) in text.split_whitespace().enumerate() {
            if self.negations.contains(token) {
                negated_at = Some(i);
                multiplier = 1.0;
                continue;
            }
            if let Some(m) = self.intensifiers.get(token) {
                multiplier *= m;
                continue;
            }
            if let Some(p) = self.lexicon.get(token) {
                let mut score = p * multiplier;
                if negated_at.is_some_and(|at| i - at <= NEGATION_WINDOW) {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
                negated_at = None;
            }
            multiplier = 1.0;
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

/// `>= 0.01` positive, `<= -0.01` negative, anything else (NaN included) neutral.
pub fn label_for(polarity: f64) -> SentimentLabel {
    if polarity >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if polarity <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub fn classify<S: PolarityScorer + ?Sized>(normalized: NormalizedReview, scorer: &S) -> Review {
    let polarity = scorer.polarity(&normalized.clean_review);
    Review {
        sentiment_label: label_for(polarity),
        polarity,
        normalized,
    }
}

pub fn classify_all<S: PolarityScorer + ?Sized>(
    normalized: Vec<NormalizedReview>,
    scorer: &S,
) -> Vec<Review> {
    normalized.into_iter().map(|n| classify(n, scorer)).collect()
}
