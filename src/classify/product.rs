//! Product vocabulary used for the informational `has_product_context` signal.

use regex::{Regex, RegexBuilder};

const MODELS: &[&str] = &[
    "birkin", "kelly", "constance", "lindy", "picotin", "herbag", "garden party", "bolide",
    "evelyne", "jige", "cdc", "collier de chien", "kelly danse", "mini kelly", "kelly pochette",
    "kelly cut", "so kelly", "picnic kelly", "kelly doll", "teddy kelly", "kellywood",
    "kelly depeches", "shadow birkin", "ghillies birkin", "club birkin", "cargo birkin",
    "so black birkin", "3-in-1 birkin", "faubourg birkin", "tressage birkin",
    "inside out birkin", "birkin shoulder", "birkin picnic",
];

const SIZES: &[&str] = &[
    "b15", "b20", "b25", "b30", "b35", "b40", "b45", "b50", "k15", "k20", "k25", "k28", "k32",
    "k35", "k40", "15cm", "18cm", "20cm", "24cm", "25cm", "28cm", "29cm", "30cm", "32cm", "35cm",
    "40cm", "45cm", "50cm",
];

const COLORS: &[&str] = &[
    "noir", "black", "etoupe", "etain", "gold", "rose", "rose confetti", "confetti",
    "rose sakura", "rose scheherazade", "rose mexico", "rose ete", "rose tyrien", "bleu", "blue",
    "bleu de prusse", "bleu du nord", "bleu encre", "bleu glacier", "bleu orage", "blue navy",
    "blue nuit", "blue lin", "blue izmir", "bleu indigo", "vert", "green", "vert cactus",
    "vert criquet", "vert cypres", "vert de gris", "vert fence", "vert jade", "vert verone",
    "vert vertigo", "rouge", "red", "rouge casaque", "rouge sellier", "rouge 11", "craie", "beton",
    "nata", "trench", "cognac", "chai", "gris", "gris asphalte", "mauve sylvestre", "malachite",
    "lime", "jaune bourgeon", "jaune ambre", "jaune poussin", "jaune cheddar", "saffron",
    "sanguine", "the notorious pink", "thene", "gris perle", "graphite", "framboise", "foin",
    "curry", "bougainvillea", "blush", "ardoise", "deep blue", "concrete", "etian", "etaine",
    "grey", "gray", "bambou", "bamboo", "orange", "violet", "purple", "mauve", "pink", "white",
    "blanc", "brown", "marron", "tan", "beige", "cream", "ivory", "silver", "argent", "bronze",
    "copper", "cuivre", "anemone", "azalee", "capucines", "cyclamen", "fuchsia", "glycine",
    "jacinthe", "lilas", "magnolia", "menthe", "mint", "parme", "pivoine", "raisin", "sesame",
    "tilleul", "turquoise", "ultraviolet", "vermillon",
];

const LEATHERS: &[&str] = &[
    "togo", "epsom", "clemence", "swift", "chamonix", "barenia", "box calf", "vache liegee",
    "taurillon maurice", "negonda", "chevre mysore", "chevre coromandel", "grain d'h", "lizzard",
    "lizard", "crocodile", "croco", "ostrich", "evercolor",
];

const HARDWARE: &[&str] = &[
    "phw", "ghw", "shw", "rghw", "palladium", "rose gold", "permabrass", "brushed palladium",
    "brushed gold", "brushed phw", "brushed gghw", "guilloche palladium", "ruthenium hardware",
    "so black hardware", "shadow hardware", "horseshoe stamp", "hss",
];

const CONTEXT: &[&str] = &[
    "hermes", "authentic", "genuine", "original", "luxury", "designer", "bag", "purse",
    "handbag", "accessory", "leather goods",
];

/// Known product, material and luxury context terms, matched on word boundaries.
#[derive(Debug, Clone)]
pub struct ProductVocabulary {
    terms: Vec<String>,
    matcher: Option<Regex>,
}

impl ProductVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        let matcher = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            // escaped literals only; cannot fail to compile
            RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(true)
                .size_limit(1 << 24)
                .build()
                .ok()
        };
        Self { terms, matcher }
    }

    pub fn builtin() -> Self {
        Self::new(
            [MODELS, SIZES, COLORS, LEATHERS, HARDWARE, CONTEXT]
                .iter()
                .flat_map(|group| group.iter().copied()),
        )
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains_any(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(text))
    }
}

impl Default for ProductVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boundaries_not_substrings() {
        let v = ProductVocabulary::builtin();
        assert!(v.contains_any("Etoupe K20 RGHW"));
        assert!(v.contains_any("selling a Garden Party"));
        assert!(!v.contains_any("tangent thoughts about goldfish"));
        assert!(!v.contains_any("see you on monday"));
    }

    #[test]
    fn empty_vocabulary_matches_nothing() {
        let v = ProductVocabulary::new(Vec::<String>::new());
        assert!(v.is_empty());
        assert!(!v.contains_any("birkin"));
    }
}
