//! Textual variants of a normalized query.
//!
//! Deterministic, catalog-free. The original query is always the first variant; the
//! rest follow in rule order and the list is capped at `max_variants`.

use crate::lexicon::Lexicon;
use crate::text::{collapse_whitespace, is_stopword};
use indexmap::IndexSet;

const INITIALISM_SUFFIXES: &[&str] = &["INSTITUTE", "COLLEGE", "MEDICAL", "DENTAL"];
const TOKEN_SUFFIXES: &[&str] = &["S", "ES", "ING", "ED"];

pub struct VariationGenerator<'a> {
    lexicon: &'a Lexicon,
    max_variants: usize,
}

impl<'a> VariationGenerator<'a> {
    pub fn new(lexicon: &'a Lexicon, max_variants: usize) -> Self {
        Self {
            lexicon,
            max_variants: max_variants.max(1),
        }
    }

    pub fn generate(&self, query: &str) -> Vec<String> {
        let mut out = IndexSet::new();
        self.expand_into(query, &mut out);
        out.into_iter().take(self.max_variants).collect()
    }

    /// Variants for several seeds, in seed order, sharing one cap.
    pub fn generate_all(&self, seeds: &[&str]) -> Vec<String> {
        let mut out = IndexSet::new();
        for seed in seeds {
            self.expand_into(seed, &mut out);
        }
        out.into_iter().take(self.max_variants).collect()
    }

    fn expand_into(&self, query: &str, out: &mut IndexSet<String>) {
        let query = collapse_whitespace(query);
        if query.is_empty() {
            return;
        }
        let mut push = |v: String| {
            let v = collapse_whitespace(&v);
            if !v.is_empty() {
                out.insert(v);
            }
        };

        push(query.clone());

        if let Some(expansions) = self.lexicon.expansions_of(&query) {
            for e in expansions {
                push(e.clone());
            }
        }
        for v in initialism_forms(&query) {
            push(v);
        }

        if let Some(abbrs) = self.lexicon.abbreviations_for(&query) {
            for a in abbrs {
                push(a.clone());
            }
        }

        if self.lexicon.is_state_synonym(&query) {
            if let Some(canonical) = self.lexicon.canonical_state(&query) {
                push(canonical.to_string());
            }
        }

        let chars: Vec<char> = query.chars().collect();
        if chars.len() > 2 {
            push(chars[1..].iter().collect());
            push(chars[..chars.len() - 1].iter().collect());
        }

        // "THE", "AND", "NEAR" alone would match nearly every name.
        for token in query.split_whitespace() {
            if token.chars().count() <= 2 || is_stopword(token) {
                continue;
            }
            push(token.to_string());
            for suffix in TOKEN_SUFFIXES {
                push(format!("{token}{suffix}"));
            }
        }

        if query.contains('.') {
            push(query.replace('.', ""));
            push(query.replace('.', " "));
        }
        if query.contains(' ') {
            push(query.split_whitespace().collect::<Vec<_>>().join("."));
        }
    }
}

/// Dotted, spaced and suffixed forms of a short alphabetic query: "AJ" -> "A.J.",
/// "A J", "AJ.", "AJ INSTITUTE", ...
fn initialism_forms(query: &str) -> Vec<String> {
    let len = query.chars().count();
    if !(2..=5).contains(&len) || !query.chars().all(|c| c.is_ascii_alphabetic()) {
        return Vec::new();
    }
    let letters: Vec<String> = query.chars().map(|c| c.to_string()).collect();
    let mut out = vec![
        format!("{}.", letters.join(".")),
        letters.join(" "),
        format!("{query}."),
    ];
    for suffix in INITIALISM_SUFFIXES {
        out.push(format!("{query} {suffix}"));
    }
    out
}
