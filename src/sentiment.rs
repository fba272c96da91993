//! Lexicon-based sentiment and keyword extraction for the check-in free text.
//!
//! Polarity: each token is looked up in an embedded valence lexicon
//! (Portuguese + English, integer valences -4..=4). A negator in the preceding
//! 1..=3 tokens flips and damps the valence, a booster right before the word
//! amplifies it, and trailing `!` adds emphasis. The raw sum is normalized into
//! a compound score in [-1, 1].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

static EMBEDDED_LEXICON: Lazy<Arc<HashMap<String, i32>>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    Arc::new(serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon"))
});

/// Normalization constant for the compound score (approaches ±1 as |sum| grows).
const ALPHA: f64 = 15.0;
/// Valence multiplier when a negator precedes the word.
const NEGATION_SCALAR: f64 = -0.74;
/// Added to |valence| when a booster precedes the word.
const BOOSTER_INCR: f64 = 0.293;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const POSITIVE_THRESHOLD: f64 = 0.2;
const NEGATIVE_THRESHOLD: f64 = -0.2;

pub const MAX_KEYWORDS: usize = 10;
pub const MIN_KEYWORD_CHARS: usize = 4;

const STOPWORDS: &[&str] = &[
    "de", "da", "do", "das", "dos", "em", "no", "na", "nos", "nas", "um", "uma", "que", "pra",
    "para", "com", "sem", "por", "e", "ou", "mas", "muito", "pouco", "isso", "aquilo", "tudo",
    "nada", "ontem", "hoje", "amanha", "aqui", "ali", "tá", "ta", "to", "tô", "tava", "estou",
    "essa", "esse",
];

/// Polarity class of the free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentClass {
    #[serde(rename = "positivo")]
    Positive,
    #[serde(rename = "neutro")]
    Neutral,
    #[serde(rename = "negativo")]
    Negative,
}

impl SentimentClass {
    pub fn from_compound(compound: f64) -> Self {
        if compound > POSITIVE_THRESHOLD {
            SentimentClass::Positive
        } else if compound < NEGATIVE_THRESHOLD {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentClass::Positive => "positivo",
            SentimentClass::Neutral => "neutro",
            SentimentClass::Negative => "negativo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub class: SentimentClass,
    /// |compound|, 0.0..=1.0
    pub intensity: f64,
    pub keywords: Vec<String>,
}

impl SentimentResult {
    pub fn empty() -> Self {
        Self {
            class: SentimentClass::Neutral,
            intensity: 0.0,
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<HashMap<String, i32>>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    /// Analyzer over the embedded lexicon.
    pub fn new() -> Self {
        Self {
            lexicon: Arc::clone(&EMBEDDED_LEXICON),
        }
    }

    /// Analyzer over a caller-provided lexicon (keys must be lowercase).
    pub fn with_lexicon(lexicon: HashMap<String, i32>) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    /// Full analysis of an optional free text.
    pub fn analyze(&self, text: Option<&str>) -> SentimentResult {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return SentimentResult::empty(),
        };

        let (compound, _tokens) = self.compound(text);
        SentimentResult {
            class: SentimentClass::from_compound(compound),
            intensity: compound.abs(),
            keywords: extract_keywords(text),
        }
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *self.lexicon.get(w).unwrap_or(&0)
    }

    /// Returns (compound in [-1, 1], token count).
    pub fn compound(&self, text: &str) -> (f64, usize) {
        // Indexed access: negation looks back over previous tokens.
        let tokens = tokenize(text);
        let mut sum = 0.0f64;

        for i in 0..tokens.len() {
            let base = self.word_score(&tokens[i]);
            if base == 0 {
                continue;
            }

            let mut v = base as f64;
            if i >= 1 && is_booster(&tokens[i - 1]) {
                v += BOOSTER_INCR * v.signum();
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                v *= NEGATION_SCALAR;
            }
            sum += v;
        }

        if sum != 0.0 {
            let bangs = text.chars().filter(|&c| c == '!').count().min(MAX_EXCLAMATIONS);
            sum += bangs as f64 * EXCLAMATION_INCR * sum.signum();
        }

        (normalize(sum), tokens.len())
    }
}

/// Map an unbounded valence sum into [-1, 1], rounded to 4 decimals.
fn normalize(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    let c = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);
    (c * 10_000.0).round() / 10_000.0
}

/// Maximal runs of alphanumeric characters, lowercased. Everything else separates.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Distinct tokens with at least 4 chars that are not stopwords, first occurrence order, max 10.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for t in tokenize(text) {
        if t.chars().count() < MIN_KEYWORD_CHARS || is_stopword(&t) {
            continue;
        }
        if !keywords.contains(&t) {
            keywords.push(t);
        }
    }
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

fn is_stopword(tok: &str) -> bool {
    STOPWORDS.contains(&tok)
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "não"
            | "nao"
            | "nunca"
            | "nem"
            | "jamais"
            | "nenhum"
            | "nenhuma"
            | "sem"
            | "not"
            | "never"
            | "without"
            | "nothing"
            | "none"
            | "cannot"
            | "dont"
            | "didnt"
            | "isnt"
            | "wasnt"
            | "cant"
            | "wont"
    )
}

fn is_booster(tok: &str) -> bool {
    matches!(
        tok,
        "muito"
            | "muita"
            | "super"
            | "extremamente"
            | "totalmente"
            | "bastante"
            | "tão"
            | "tao"
            | "mega"
            | "very"
            | "really"
            | "so"
            | "extremely"
            | "totally"
    )
}
