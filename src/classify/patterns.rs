//! Layered regex tiers for Order / Offer / NonProduct detection.
//!
//! Each tier keeps its fragments individually compiled (for diagnostics) and as one
//! combined `RegexSet` (for the yes/no decision). All matching is case-insensitive.
//! The built-in tiers can be replaced by a TOML file:
//!
//! ```toml
//! [tiers]
//! order = ['\bneed\b', '\bwtb\b']
//! offer = ['\bselling\b']
//! non_product = ['\bhello\b']
//! ```

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_PATTERNS_PATH: &str = "config/patterns.toml";
pub const ENV_PATTERNS_PATH: &str = "PATTERNS_PATH";

/// Pattern tiers in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Order,
    Offer,
    NonProduct,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Order => "order",
            Tier::Offer => "offer",
            Tier::NonProduct => "non_product",
        }
    }
}

// Shared noun groups so tiers stay in sync.
const PRODUCTS: &str = "birkin|kelly|constance|hermes|bag|chanel|balenciaga|gucci|prada|dior|fendi|jewelry|jacket|shoes|ring|lipstick|watch|skincare|shirt";
const BAG_MODELS: &str = "birkin|kelly|constance|picotin|mini\\s+kelly";
const COLORS: &str = "black|white|gold|blue|green|craie|nata|etoupe|rose|bleu|vert|rouge|gris|mauve|brown|beige|cream|pink|purple|orange|yellow|red|grey|gray";
const HARDWARE: &str = "ghw|phw|shw|rghw|gold|palladium|silver";
/// What may follow "do you have" / "can i get": an optional article, then a product,
/// colour or size code. Small talk ("your address", "a nice weekend") does not qualify.
const ASKED_ITEM: &str = concat!(
    r"(?:any\s+|a\s+|an\s+|the\s+|this\s+|that\s+)?",
    r"(?:birkin|kelly|constance|picotin|hermes|bag|chanel|balenciaga|gucci|prada|dior|fendi|jewelry|jacket|shoes|ring|lipstick|watch|skincare|shirt",
    r"|black|white|gold|blue|green|craie|nata|etoupe|rose|bleu|vert|rouge|gris|mauve|brown|beige|cream|pink|purple|orange|yellow|red|grey|gray",
    r"|[kb]\d{2}|size|mini)\b",
);

static BUILTIN_ORDER: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        // bare intent
        r"\b(?:buying|buy|looking\s+for|searching(?:\s+for)?|want|wants|need|needs|seeking|hunting|interested|iso|wtb|require|requires|in\s+search\s+of)\b".to_string(),
        // intent + product noun
        format!(r"\b(?:want|need|looking\s+for|searching\s+for)\s+(?:a\s+|an\s+)?(?:{PRODUCTS})"),
        // intent + color + bag type
        format!(r"\b(?:interested\s+in|want\s+to\s+buy)\s+(?:{COLORS})\s+(?:bag|{BAG_MODELS})"),
        // intent + model + hardware
        format!(r"\b(?:interested\s+in|want\s+to\s+buy)\s+(?:{BAG_MODELS})\s+(?:{HARDWARE})"),
        // intent + size code + hardware
        format!(r"\b(?:interested\s+in|want\s+to\s+buy)\s+(?:k20|k25|k28|b20|b25|b30|mini\s+kelly)\s+(?:{HARDWARE})"),
        r"\b(?:urgent|urgently|desperate|desperately|immediately)\s+(?:need|want)\b".to_string(),
        // asking phrasing
        r"\b(?:anyone|anybody)\s+(?:has|have|got|selling)\b".to_string(),
        format!(r"\b(?:can|could)\s+i\s+(?:get|have)\s+(?:{ASKED_ITEM})"),
        format!(r"\bdo\s+you\s+have\s+(?:{ASKED_ITEM})"),
        r"\b(?:please\s+send|send\s+me)\b".to_string(),
        // fixed idioms
        r"\bi\s+need\s+(?:a\s+)?bag\b".to_string(),
        r"\blooking\s+for\s+(?:a\s+)?bag\b".to_string(),
        r"\bwant\s+(?:a\s+)?bag\b".to_string(),
        r"\bneed\s+a\s+(?:birkin|kelly|constance|picotin)\b".to_string(),
        r"\bsearching\s+for\s+(?:birkin|kelly|constance)\b".to_string(),
        r"\bhelp\s+me\s+(?:find|get)\s+(?:a\s+)?(?:bag|birkin|kelly|constance)\b".to_string(),
    ]
});

static BUILTIN_OFFER: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        // sale intent
        r"\b(?:selling|sell|available|ready|in\s+stock|limited\s+stock|for\s+sale|just\s+arrived|offering)\b".to_string(),
        // authenticity / condition next to a product
        format!(r"\b(?:authentic|genuine|original|100%\s+authentic)\s+(?:{PRODUCTS})"),
        format!(r"\bbrand\s+new\s+(?:{PRODUCTS})"),
        r"\b(?:birkin|kelly|constance|hermes|chanel|balenciaga|gucci|prada|dior|fendi)\s+(?:for\s+sale|available|ready|selling)".to_string(),
        // product + size code + hardware code
        r"\b(?:birkin|kelly|constance)\s+(?:b25|b30|b35|k25|k28|k32)\s+(?:ghw|phw|shw|rghw)".to_string(),
        r"\b(?:mini\s+)?(?:birkin|kelly|constance)\s+\d+(?:cm)?\s+(?:ghw|phw|shw|rghw)".to_string(),
        // price tokens
        r"[$€£¥]\s?\d+".to_string(),
        r"\b(?:price|cost)\s*:?\s*[$€£]?\d+".to_string(),
        r"\b\d+k\b".to_string(),
        r"\b\d+\.\d+k\b".to_string(),
        r"\b\d+\s+only\b".to_string(),
        // fixed idioms
        r"\bgrab\s+this\s+bag\s+now\b".to_string(),
        r"\bnew\s+bag\s+ready\b".to_string(),
        r"\bhere\s+is\s+a\s+bag\b".to_string(),
        r"\bbag\s+only\s+\d+\b".to_string(),
        r"\b(?:birkin|kelly|constance)\s+(?:ready|available|here)\b".to_string(),
        // product + currency-suffixed price
        r"\b(?:birkin|kelly|constance)\s+\d+\s*(?:€|euros?\b|eur\b)".to_string(),
        r"\b(?:mini\s+)?(?:birkin|kelly|constance)\s+\d+(?:cm)?\s+(?:available|ready)\b".to_string(),
    ]
});

static BUILTIN_NON_PRODUCT: Lazy<Vec<String>> = Lazy::new(|| {
    [
        r"\b(hi|hello|hey|good\s+(?:morning|afternoon|evening|night))\b",
        r"\b(how\s+are\s+you|how\s+you\s+doing)\b",
        r"\b(hope\s+you|have\s+a\s+good|nice\s+to\s+meet)\b",
        r"\b(weather|today|tomorrow|weekend|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        r"\b(thank\s+you|thanks|appreciate)\b",
        r"\b(good\s+day|bye|see\s+you|later)\b",
        r"\b(how\s+was\s+your|how\s+is\s+your)\b",
        r"\b(follow\s+up|following\s+up|checking\s+in)\b",
        r"\b(please|could|would)\s+you\s+(?:be\s+able\s+to|help)\b",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

static BUILTIN: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::new(
        BUILTIN_ORDER.clone(),
        BUILTIN_OFFER.clone(),
        BUILTIN_NON_PRODUCT.clone(),
    )
    .expect("built-in pattern tiers compile")
});

/// One tier: individual fragments plus their combined matcher.
#[derive(Debug, Clone)]
pub struct TierMatcher {
    tier: Tier,
    fragments: Vec<String>,
    compiled: Vec<Regex>,
    combined: RegexSet,
}

impl TierMatcher {
    pub fn compile(tier: Tier, fragments: Vec<String>) -> Result<Self> {
        let compiled = fragments
            .iter()
            .enumerate()
            .map(|(i, f)| {
                RegexBuilder::new(f)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow!("{} pattern #{i} `{f}` regex error: {e}", tier.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;
        let combined = RegexSetBuilder::new(&fragments)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("compiling combined {} tier", tier.as_str()))?;
        Ok(Self {
            tier,
            fragments,
            compiled,
            combined,
        })
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// True if any fragment matches. An empty tier never matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.combined.is_match(text)
    }

    /// Matched substrings of every fragment, in fragment order.
    pub fn indicators(&self, text: &str) -> Vec<String> {
        self.combined
            .matches(text)
            .into_iter()
            .flat_map(|i| {
                self.compiled[i]
                    .find_iter(text)
                    .map(|m| m.as_str().to_string())
            })
            .collect()
    }
}

/// The three tiers, immutable once built.
#[derive(Debug, Clone)]
pub struct PatternSet {
    order: TierMatcher,
    offer: TierMatcher,
    non_product: TierMatcher,
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    tiers: TierFragments,
}

#[derive(Debug, Deserialize)]
struct TierFragments {
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    offer: Vec<String>,
    #[serde(default)]
    non_product: Vec<String>,
}

impl PatternSet {
    pub fn new(order: Vec<String>, offer: Vec<String>, non_product: Vec<String>) -> Result<Self> {
        Ok(Self {
            order: TierMatcher::compile(Tier::Order, order)?,
            offer: TierMatcher::compile(Tier::Offer, offer)?,
            non_product: TierMatcher::compile(Tier::NonProduct, non_product)?,
        })
    }

    /// The compiled built-in rule set.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: PatternFile = toml::from_str(s).context("parsing pattern TOML")?;
        let t = file.tiers;
        Self::new(t.order, t.offer, t.non_product)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading patterns from {}", path.display()))?;
        let set = Self::from_toml_str(&content)
            .with_context(|| format!("loading patterns from {}", path.display()))?;
        info!(
            order = set.order.len(),
            offer = set.offer.len(),
            non_product = set.non_product.len(),
            path = %path.display(),
            "pattern tiers loaded"
        );
        Ok(set)
    }

    /// Use the override file when one is given (it must load), else the built-in tiers.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn tier(&self, tier: Tier) -> &TierMatcher {
        match tier {
            Tier::Order => &self.order,
            Tier::Offer => &self.offer,
            Tier::NonProduct => &self.non_product,
        }
    }

    pub fn order(&self) -> &TierMatcher {
        &self.order
    }

    pub fn offer(&self) -> &TierMatcher {
        &self.offer
    }

    pub fn non_product(&self) -> &TierMatcher {
        &self.non_product
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}
