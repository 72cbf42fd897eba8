// src/classify/mod.rs
//! Rule-based Order/Offer classifier.
//!
//! Tiers are evaluated in a fixed order and the first match wins:
//! 1) Order tier  -> `Order`
//! 2) Offer tier  -> `Offer`
//! 3) NonProduct  -> `unknown`
//! 4) nothing     -> `unknown`
//!
//! Request language is checked before sale language, so a text such as
//! "looking for someone selling a kelly" is an `Order`.

pub mod patterns;
pub mod product;

use serde::Serialize;
use std::sync::Arc;

use crate::message::Category;
use crate::devlog::dev_log_classification;

pub use patterns::{PatternSet, Tier, TierMatcher};
pub use product::ProductVocabulary;

/// How a prediction was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Perfect,
    Empty,
    Error,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Perfect => "perfect",
            Method::Empty => "empty",
            Method::Error => "error",
        }
    }
}

/// Service-level answer. Confidence is always 1.0: the rules are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub category: Category,
    pub confidence: f32,
    pub method: Method,
}

impl Prediction {
    pub fn error() -> Self {
        Self {
            category: Category::Unknown,
            confidence: 1.0,
            method: Method::Error,
        }
    }
}

/// Everything the tiers saw for one input.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub text: String,
    pub classification: Category,
    pub product_context: bool,
    pub order_indicators: Vec<String>,
    pub offer_indicators: Vec<String>,
    pub non_product_indicators: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    patterns: Arc<PatternSet>,
    vocabulary: Arc<ProductVocabulary>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PatternSet::builtin())
    }
}

impl Classifier {
    pub fn new(patterns: PatternSet) -> Self {
        Self::with_vocabulary(patterns, ProductVocabulary::builtin())
    }

    pub fn with_vocabulary(patterns: PatternSet, vocabulary: ProductVocabulary) -> Self {
        Self {
            patterns: Arc::new(patterns),
            vocabulary: Arc::new(vocabulary),
        }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn classify(&self, text: &str) -> Category {
        if text.trim().is_empty() {
            return Category::Unknown;
        }
        let lowered = text.to_lowercase();
        let lowered = lowered.trim();

        let (category, tier) = if self.is_order(lowered) {
            (Category::Order, Some(Tier::Order))
        } else if self.is_offer(lowered) {
            (Category::Offer, Some(Tier::Offer))
        } else if self.is_non_product(lowered) {
            (Category::Unknown, Some(Tier::NonProduct))
        } else {
            (Category::Unknown, None)
        };
        dev_log_classification(text, category, tier);
        category
    }

    pub fn predict(&self, text: &str) -> Prediction {
        if text.trim().is_empty() {
            return Prediction {
                category: Category::Unknown,
                confidence: 1.0,
                method: Method::Empty,
            };
        }
        Prediction {
            category: self.classify(text),
            confidence: 1.0,
            method: Method::Perfect,
        }
    }

    pub fn is_order(&self, text: &str) -> bool {
        self.patterns.order().is_match(text)
    }

    pub fn is_offer(&self, text: &str) -> bool {
        self.patterns.offer().is_match(text)
    }

    pub fn is_non_product(&self, text: &str) -> bool {
        self.patterns.non_product().is_match(text)
    }

    /// Informational only; never consulted by `classify`.
    pub fn has_product_context(&self, text: &str) -> bool {
        self.vocabulary.contains_any(text)
    }

    pub fn diagnose(&self, text: &str) -> Diagnosis {
        let lowered = text.to_lowercase();
        Diagnosis {
            text: text.to_string(),
            classification: self.classify(text),
            product_context: self.has_product_context(text),
            order_indicators: self.patterns.order().indicators(&lowered),
            offer_indicators: self.patterns.offer().indicators(&lowered),
            non_product_indicators: self.patterns.non_product().indicators(&lowered),
        }
    }
}
