//! Synthetic labeled chat messages built from templates and luxury-goods vocabulary.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::message::Category;

/// Probability that a generated text receives one surface mutation.
pub const MUTATION_PROBABILITY: f64 = 0.3;

const PRODUCTS: &[&str] = &[
    "birkin", "kelly", "constance", "bag", "handbag", "purse", "clutch", "tote", "shoulder bag",
    "crossbody", "backpack", "wallet", "belt", "scarf", "shoes", "sandals", "sneakers", "boots",
    "watch", "jewelry", "bracelet", "necklace", "earrings", "ring", "sunglasses", "perfume",
    "lipstick", "makeup", "skincare", "dress", "shirt", "jacket", "coat",
];

const BRANDS: &[&str] = &[
    "hermes", "chanel", "louis vuitton", "gucci", "prada", "dior", "bottega veneta",
    "saint laurent", "balenciaga", "celine", "fendi", "versace", "givenchy", "valentino",
    "cartier", "rolex", "tiffany",
];

const COLORS: &[&str] = &[
    "black", "white", "red", "blue", "green", "yellow", "pink", "purple", "orange", "brown",
    "gray", "grey", "gold", "silver", "rose gold", "etoupe", "etoup", "noir", "blanc", "rouge",
    "bleu", "vert", "jaune", "rose", "violet", "marron", "gris", "navy", "beige", "cream",
    "ivory", "burgundy", "emerald", "sapphire",
];

const SIZES: &[&str] = &[
    "25", "30", "35", "40", "20", "28", "32", "18", "24", "29", "mini", "small", "medium",
    "large", "xl", "xxl", "one size",
];

const MATERIALS: &[&str] = &[
    "epsom", "togo", "swift", "clemence", "box", "chevre", "ostrich", "crocodile", "alligator",
    "lizard", "snake", "canvas", "leather", "suede", "patent", "matte", "shiny", "textured",
    "smooth",
];

const HARDWARE: &[&str] = &[
    "gold hardware", "silver hardware", "palladium hardware", "rose gold hardware", "ghw", "shw",
    "phw", "rhw", "brushed", "polished", "matte hardware",
];

/// `{}` is replaced by the amount.
const PRICE_FORMATS: &[&str] = &[
    "${}", "${},000", "{}k", "{}.5k", "€{}", "£{}", "¥{}", "price: ${}", "cost: ${}",
    "asking ${}", "${} obo", "{} dollars", "{} euros", "{} pounds",
];

const ORDER_INTENTS: &[&str] = &[
    "want", "need", "looking for", "searching for", "interested in", "seeking", "hunting for",
    "in search of", "would like", "desire", "require", "must have", "hoping to find",
    "trying to find", "on the hunt for", "desperately need", "urgently need",
];

const BUDGET_EXPRESSIONS: &[&str] = &[
    "budget", "price range", "willing to pay", "can spend", "looking to spend", "budget of",
    "price limit", "max budget", "spending limit", "can afford", "price point", "cost range",
];

const ORDER_URGENCY: &[&str] = &["urgently", "desperately", "immediately", "asap"];
const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good evening"];

const OFFER_INTENTS: &[&str] = &[
    "selling", "for sale", "available", "have", "offering", "fs", "listing", "selling fast",
    "must sell", "quick sale", "urgent sale", "letting go", "parting with", "moving sale",
    "collection sale",
];

const CONDITIONS: &[&str] = &[
    "brand new", "new with tags", "never used", "pristine condition", "excellent condition",
    "very good condition", "good condition", "preloved", "gently used", "hardly used",
    "minimal wear", "authentic", "genuine", "original", "with receipt", "with box",
    "with dust bag", "complete set", "full packaging",
];

const OFFER_URGENCY: &[&str] = &[
    "urgent", "quick sale", "must go", "moving sale", "need gone", "price drop",
    "reduced price", "final price", "no lowballers", "serious buyers only", "cash only",
    "pickup only",
];

const AUTH_CLAIMS: &[&str] = &["authentic", "genuine", "original", "100% authentic"];

pub const ORDER_TEMPLATES: &[&str] = &[
    "simple_want", "specific_product", "with_budget", "with_specs", "urgent", "casual",
    "detailed", "brand_specific",
];

pub const OFFER_TEMPLATES: &[&str] = &[
    "simple_sale", "with_price", "with_condition", "with_specs", "urgent_sale", "detailed",
    "authentic_claim", "bundle_deal",
];

/// `(prefix, suffix)` wrapped around the text.
const ORDER_MUTATIONS: &[(&str, &str)] = &[
    ("", "."),
    ("", "!"),
    ("", "?"),
    ("", " please"),
    ("", " thanks"),
    ("do you have ", "?"),
    ("anyone selling ", "?"),
    ("iso ", ""),
    ("wtb ", ""),
];

const OFFER_MUTATIONS: &[(&str, &str)] = &[
    ("", "."),
    ("", "!"),
    ("", " dm me"),
    ("", " serious buyers only"),
    ("", " no lowballers"),
    ("", " cash ready"),
    ("", " pickup available"),
    ("", " shipping worldwide"),
];

/// One generated example with its ground-truth label and template name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub expected: Category,
    pub template: String,
}

/// Seeded generator; identical seeds yield identical corpora.
pub struct ExampleGenerator {
    rng: StdRng,
}

impl ExampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn price(&mut self, low: u32, high: u32) -> String {
        let amount = self.rng.random_range(low..=high);
        self.pick(PRICE_FORMATS)
            .replace("{}", &amount.to_string())
    }

    fn mutate(&mut self, text: String, mutations: &[(&str, &str)]) -> String {
        if !self.rng.random_bool(MUTATION_PROBABILITY) {
            return text;
        }
        match mutations.choose(&mut self.rng) {
            Some((pre, post)) => format!("{pre}{text}{post}"),
            None => text,
        }
    }

    pub fn order(&mut self) -> LabeledExample {
        let template = self.pick(ORDER_TEMPLATES);
        let text = match template {
            "simple_want" => format!("{} {}", self.pick(ORDER_INTENTS), self.pick(PRODUCTS)),
            "specific_product" => format!(
                "{} {} {}",
                self.pick(ORDER_INTENTS),
                self.pick(BRANDS),
                self.pick(PRODUCTS)
            ),
            "with_budget" => {
                let intent = self.pick(ORDER_INTENTS);
                let product = self.pick(PRODUCTS);
                let budget = self.pick(BUDGET_EXPRESSIONS);
                let price = self.price(100, 50_000);
                format!("{intent} {product} with {budget} {price}")
            }
            "with_specs" => {
                let intent = self.pick(ORDER_INTENTS);
                let product = self.pick(PRODUCTS);
                let color = self.pick(COLORS);
                let size = self.pick(SIZES);
                format!("{intent} {color} {product} size {size}")
            }
            "urgent" => format!(
                "{} {} {}",
                self.pick(ORDER_URGENCY),
                self.pick(ORDER_INTENTS),
                self.pick(PRODUCTS)
            ),
            "casual" => format!(
                "{}, {} {}",
                self.pick(GREETINGS),
                self.pick(ORDER_INTENTS),
                self.pick(PRODUCTS)
            ),
            "detailed" => {
                let intent = self.pick(ORDER_INTENTS);
                let brand = self.pick(BRANDS);
                let product = self.pick(PRODUCTS);
                let color = self.pick(COLORS);
                let material = self.pick(MATERIALS);
                let hardware = self.pick(HARDWARE);
                format!("{intent} {brand} {product} in {color} {material} with {hardware}")
            }
            _ => format!(
                "{} {} {} {}",
                self.pick(ORDER_INTENTS),
                self.pick(BRANDS),
                self.pick(PRODUCTS),
                self.pick(SIZES)
            ),
        };
        LabeledExample {
            text: self.mutate(text, ORDER_MUTATIONS),
            expected: Category::Order,
            template: template.to_string(),
        }
    }

    pub fn offer(&mut self) -> LabeledExample {
        let template = self.pick(OFFER_TEMPLATES);
        let text = match template {
            "simple_sale" => format!("{} {}", self.pick(OFFER_INTENTS), self.pick(PRODUCTS)),
            "with_price" => {
                let intent = self.pick(OFFER_INTENTS);
                let product = self.pick(PRODUCTS);
                let price = self.price(100, 50_000);
                format!("{intent} {product} {price}")
            }
            "with_condition" => format!(
                "{} {} {}",
                self.pick(OFFER_INTENTS),
                self.pick(CONDITIONS),
                self.pick(PRODUCTS)
            ),
            "with_specs" => {
                let intent = self.pick(OFFER_INTENTS);
                let brand = self.pick(BRANDS);
                let product = self.pick(PRODUCTS);
                let color = self.pick(COLORS);
                let size = self.pick(SIZES);
                format!("{intent} {brand} {product} {color} size {size}")
            }
            "urgent_sale" => {
                let urgency = self.pick(OFFER_URGENCY);
                let intent = self.pick(OFFER_INTENTS);
                let product = self.pick(PRODUCTS);
                let price = self.price(100, 50_000);
                format!("{urgency} {intent} {product} {price}")
            }
            "detailed" => {
                let intent = self.pick(OFFER_INTENTS);
                let brand = self.pick(BRANDS);
                let product = self.pick(PRODUCTS);
                let color = self.pick(COLORS);
                let material = self.pick(MATERIALS);
                let condition = self.pick(CONDITIONS);
                let price = self.price(100, 50_000);
                format!("{intent} {condition} {brand} {product} in {color} {material} {price}")
            }
            "authentic_claim" => {
                let claim = self.pick(AUTH_CLAIMS);
                let brand = self.pick(BRANDS);
                let product = self.pick(PRODUCTS);
                let intent = self.pick(OFFER_INTENTS);
                format!("{intent} {claim} {brand} {product}")
            }
            _ => {
                let intent = self.pick(OFFER_INTENTS);
                let first = self.pick(PRODUCTS);
                let second = self.pick(PRODUCTS);
                let price = self.price(200, 80_000);
                format!("{intent} {first} and {second} bundle {price}")
            }
        };
        LabeledExample {
            text: self.mutate(text, OFFER_MUTATIONS),
            expected: Category::Offer,
            template: template.to_string(),
        }
    }

    /// `count_per_class` orders followed by as many offers, then shuffled.
    pub fn corpus(&mut self, count_per_class: usize) -> Vec<LabeledExample> {
        let mut all = Vec::with_capacity(count_per_class * 2);
        for _ in 0..count_per_class {
            all.push(self.order());
        }
        for _ in 0..count_per_class {
            all.push(self.offer());
        }
        all.shuffle(&mut self.rng);
        all
    }
}
