// src/vocabulary.rs
//! Vocabulary normalizer: folds colloquial brand/model shorthand onto canonical terms.
//!
//! The abbreviation table is loaded once (spreadsheet, TOML or JSON) and is immutable
//! afterwards. Chained mappings (`a -> b`, `b -> c`) are resolved at load time so that
//! normalizing an already normalized text is a no-op.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_VOCABULARY_PATH: &str = "config/abbreviations.toml";
pub const ENV_VOCABULARY_PATH: &str = "VOCABULARY_PATH";

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation regex"));

/// Lowercase, drop everything that is not a word character or whitespace, split.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Informal token -> canonical (lowercase) phrase.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationMap {
    entries: HashMap<String, String>,
}

impl AbbreviationMap {
    /// Build from raw (term, expansion) rows. Rows whose term is not a single token or
    /// whose expansion is empty after cleaning are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut raw: HashMap<String, String> = HashMap::new();
        let mut skipped = 0usize;
        for (k, v) in pairs {
            let key = tokenize(k.as_ref());
            let value = tokenize(v.as_ref()).join(" ");
            if key.len() != 1 || value.is_empty() {
                skipped += 1;
                continue;
            }
            let key = key.into_iter().next().unwrap_or_default();
            if key == value {
                continue;
            }
            raw.insert(key, value);
        }
        if skipped > 0 {
            debug!(skipped, "vocabulary rows skipped (empty or multi-token term)");
        }
        Self {
            entries: resolve_chains(raw),
        }
    }

    /// Load by file extension: spreadsheet (xlsx/xlsm/xls/ods), `.toml`, or `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let map = match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_pairs(read_spreadsheet(path)?),
            "toml" | "json" => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading vocabulary from {}", path.display()))?;
                if ext == "toml" {
                    Self::from_toml_str(&content)?
                } else {
                    Self::from_json_str(&content)?
                }
            }
            other => {
                return Err(anyhow!(
                    "unsupported vocabulary format `{other}` ({})",
                    path.display()
                ))
            }
        };
        info!(entries = map.len(), path = %path.display(), "vocabulary loaded");
        Ok(map)
    }

    /// `[abbreviations]` table of `term = "expansion"`.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct TomlVocab {
            #[serde(default)]
            abbreviations: BTreeMap<String, String>,
        }
        let v: TomlVocab = toml::from_str(s).context("parsing vocabulary TOML")?;
        Ok(Self::from_pairs(v.abbreviations))
    }

    /// Either `{"term": "expansion"}` or `[{"type": "term", "example": "expansion"}]`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(s).context("parsing vocabulary JSON")?;
        let pairs: Vec<(String, String)> = match v {
            Value::Object(obj) => obj
                .into_iter()
                .map(|(k, v)| (k, json_text(&v)))
                .collect(),
            Value::Array(rows) => rows
                .iter()
                .map(|r| (json_text(&r["type"]), json_text(&r["example"])))
                .collect(),
            _ => return Err(anyhow!("vocabulary JSON must be an object or an array")),
        };
        Ok(Self::from_pairs(pairs))
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Identity fallback on miss.
    pub fn lookup<'a>(&'a self, token: &'a str) -> &'a str {
        self.get(token).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn read_spreadsheet(path: &Path) -> Result<Vec<(String, String)>> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening vocabulary workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("vocabulary workbook {} has no sheets", path.display()))?
        .with_context(|| format!("reading first sheet of {}", path.display()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(cell_text).collect())
        .unwrap_or_default();
    let column = |name: &str, fallback: usize| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .unwrap_or(fallback)
    };
    let (term_col, example_col) = (column("type", 0), column("example", 1));

    Ok(rows
        .map(|r| {
            (
                r.get(term_col).map(cell_text).unwrap_or_default(),
                r.get(example_col).map(cell_text).unwrap_or_default(),
            )
        })
        .collect())
}

fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Pre-resolve chains so every token of every expansion is a fixed point of the map.
fn resolve_chains(raw: HashMap<String, String>) -> HashMap<String, String> {
    let mut memo: HashMap<String, String> = HashMap::with_capacity(raw.len());
    let mut stack: Vec<String> = Vec::new();
    let keys: Vec<String> = raw.keys().cloned().collect();
    for key in &keys {
        expand(key, &raw, &mut memo, &mut stack);
    }
    memo.retain(|k, v| k != v);

    // Cycles and self-references can leave expansions that still contain mapped tokens.
    loop {
        let offending: Vec<String> = memo
            .iter()
            .filter(|(_, v)| {
                v.split(' ')
                    .any(|t| memo.get(t).is_some_and(|mapped| mapped != t))
            })
            .map(|(k, _)| k.clone())
            .collect();
        if offending.is_empty() {
            break;
        }
        for k in offending {
            warn!(term = %k, "dropping vocabulary entry whose expansion is not stable");
            memo.remove(&k);
        }
    }
    memo
}

fn expand(
    token: &str,
    raw: &HashMap<String, String>,
    memo: &mut HashMap<String, String>,
    stack: &mut Vec<String>,
) -> String {
    if let Some(done) = memo.get(token) {
        return done.clone();
    }
    let Some(value) = raw.get(token) else {
        return token.to_string();
    };
    if stack.iter().any(|s| s == token) {
        return token.to_string();
    }
    stack.push(token.to_string());
    let out = value
        .split(' ')
        .map(|t| {
            if t == token {
                t.to_string()
            } else {
                expand(t, raw, memo, stack)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    stack.pop();
    memo.insert(token.to_string(), out.clone());
    out
}

/// Stateless text canonicalizer over a shared, read-only abbreviation map.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    map: Arc<AbbreviationMap>,
}

impl Normalizer {
    pub fn new(map: AbbreviationMap) -> Self {
        Self { map: Arc::new(map) }
    }

    pub fn from_shared(map: Arc<AbbreviationMap>) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &AbbreviationMap {
        &self.map
    }

    /// Lowercase, strip punctuation, replace each token via the map, rejoin with single spaces.
    pub fn normalize(&self, text: &str) -> String {
        tokenize(text)
            .iter()
            .map(|t| self.map.lookup(t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Normalizer {
        Normalizer::new(AbbreviationMap::from_pairs([
            ("k20", "kelly 20"),
            ("GHW", "gold hardware"),
            ("noir", "black"),
            ("bk", "birkin"),
            ("b25", "bk 25"),
        ]))
    }

    #[test]
    fn strips_punctuation_and_expands_tokens() {
        let n = sample();
        assert_eq!(
            n.normalize("NOIR K20, GHW!!  ready?"),
            "black kelly 20 gold hardware ready"
        );
    }

    #[test]
    fn empty_and_symbol_only_input() {
        let n = sample();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("👜 – !!"), "");
    }

    #[test]
    fn chains_are_resolved_at_load_time() {
        let n = sample();
        assert_eq!(n.map().get("b25"), Some("birkin 25"));
        let once = n.normalize("wtb b25 ghw");
        assert_eq!(once, "wtb birkin 25 gold hardware");
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn idempotent_even_with_cycles_and_self_references() {
        let n = Normalizer::new(AbbreviationMap::from_pairs([
            ("a1", "b1"),
            ("b1", "a1"),
            ("rghw", "rose gold rghw"),
            ("etoup", "etoupe"),
        ]));
        for text in ["a1 b1", "need RGHW etoup", "b1", "étoupe kelly"] {
            let once = n.normalize(text);
            assert_eq!(n.normalize(&once), once, "not idempotent for {text:?}");
        }
        assert_eq!(n.map().get("rghw"), None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let map = AbbreviationMap::from_pairs([
            ("", "kelly"),
            ("garden party", "garden party bag"),
            ("k25", "  "),
            ("cdc", "collier de chien"),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup("cdc"), "collier de chien");
        assert_eq!(map.lookup("kelly"), "kelly");
    }

    #[test]
    fn toml_and_json_sources() {
        let t = AbbreviationMap::from_toml_str("[abbreviations]\nphw = \"palladium hardware\"\n").unwrap();
        assert_eq!(t.get("phw"), Some("palladium hardware"));

        let j = AbbreviationMap::from_json_str(
            r#"[{"type":"LV","example":"Louis Vuitton"},{"type":"x","example":null}]"#,
        )
        .unwrap();
        assert_eq!(j.get("lv"), Some("louis vuitton"));
        assert_eq!(j.len(), 1);

        let o = AbbreviationMap::from_json_str(r#"{"ysl":"saint laurent"}"#).unwrap();
        assert_eq!(o.get("ysl"), Some("saint laurent"));
    }
}
