//! Abbreviation and state-synonym dictionaries.
//!
//! Built once at start-up from the built-in tables (optionally merged with a TOML file)
//! and never mutated afterwards. The reverse expansion map is derived from the forward
//! one, so every expansion resolves back to its abbreviation(s).

use crate::text::normalize_query;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("AIIMS", &["ALL INDIA INSTITUTE OF MEDICAL SCIENCES"]),
    (
        "JIPMER",
        &["JAWAHARLAL INSTITUTE OF POSTGRADUATE MEDICAL EDUCATION AND RESEARCH"],
    ),
    (
        "PGIMER",
        &["POSTGRADUATE INSTITUTE OF MEDICAL EDUCATION AND RESEARCH"],
    ),
    ("KMC", &["KASTURBA MEDICAL COLLEGE", "KILPAUK MEDICAL COLLEGE"]),
    ("CMC", &["CHRISTIAN MEDICAL COLLEGE"]),
    ("AFMC", &["ARMED FORCES MEDICAL COLLEGE"]),
    ("MAMC", &["MAULANA AZAD MEDICAL COLLEGE"]),
    ("BMCRI", &["BANGALORE MEDICAL COLLEGE AND RESEARCH INSTITUTE"]),
    ("GMC", &["GOVERNMENT MEDICAL COLLEGE"]),
    ("GDC", &["GOVERNMENT DENTAL COLLEGE"]),
    ("ESIC", &["EMPLOYEES STATE INSURANCE CORPORATION"]),
    ("MBBS", &["BACHELOR OF MEDICINE AND BACHELOR OF SURGERY"]),
    ("BDS", &["BACHELOR OF DENTAL SURGERY"]),
    ("MDS", &["MASTER OF DENTAL SURGERY"]),
    ("MD", &["DOCTOR OF MEDICINE"]),
    ("MS", &["MASTER OF SURGERY"]),
    ("DM", &["DOCTORATE OF MEDICINE"]),
    ("MCH", &["MAGISTER CHIRURGIAE", "MASTER OF CHIRURGIAE"]),
    ("DNB", &["DIPLOMATE OF NATIONAL BOARD"]),
];

const STATES: &[&str] = &[
    "ANDHRA PRADESH",
    "ARUNACHAL PRADESH",
    "ASSAM",
    "BIHAR",
    "CHHATTISGARH",
    "GOA",
    "GUJARAT",
    "HARYANA",
    "HIMACHAL PRADESH",
    "JHARKHAND",
    "KARNATAKA",
    "KERALA",
    "MADHYA PRADESH",
    "MAHARASHTRA",
    "MANIPUR",
    "MEGHALAYA",
    "MIZORAM",
    "NAGALAND",
    "ODISHA",
    "PUNJAB",
    "RAJASTHAN",
    "SIKKIM",
    "TAMIL NADU",
    "TELANGANA",
    "TRIPURA",
    "UTTAR PRADESH",
    "UTTARAKHAND",
    "WEST BENGAL",
    "ANDAMAN AND NICOBAR ISLANDS",
    "CHANDIGARH",
    "DADRA AND NAGAR HAVELI AND DAMAN AND DIU",
    "DELHI",
    "JAMMU AND KASHMIR",
    "LADAKH",
    "LAKSHADWEEP",
    "PUDUCHERRY",
];

const STATE_SYNONYMS: &[(&str, &str)] = &[
    ("AP", "ANDHRA PRADESH"),
    ("KA", "KARNATAKA"),
    ("KAR", "KARNATAKA"),
    ("KL", "KERALA"),
    ("TN", "TAMIL NADU"),
    ("TS", "TELANGANA"),
    ("MH", "MAHARASHTRA"),
    ("MP", "MADHYA PRADESH"),
    ("UP", "UTTAR PRADESH"),
    ("UK", "UTTARAKHAND"),
    ("WB", "WEST BENGAL"),
    ("HP", "HIMACHAL PRADESH"),
    ("JK", "JAMMU AND KASHMIR"),
    ("J&K", "JAMMU AND KASHMIR"),
    ("J & K", "JAMMU AND KASHMIR"),
    ("NCT", "DELHI"),
    ("NEW DELHI", "DELHI"),
    ("ORISSA", "ODISHA"),
    ("PONDICHERRY", "PUDUCHERRY"),
    ("PONDY", "PUDUCHERRY"),
    ("UTTARANCHAL", "UTTARAKHAND"),
    ("CHATTISGARH", "CHHATTISGARH"),
    ("TAMILNADU", "TAMIL NADU"),
];

/// Extra entries merged over the built-in tables.
#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    abbreviations: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    state_synonyms: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    expansions: BTreeMap<String, BTreeSet<String>>,
    abbreviations: BTreeMap<String, BTreeSet<String>>,
    state_synonyms: BTreeMap<String, String>,
    states: BTreeSet<String>,
}

impl Lexicon {
    pub fn builtin() -> Self {
        let mut lexicon = Self::default();
        for (abbr, expansions) in ABBREVIATIONS {
            for expansion in *expansions {
                lexicon.register_abbreviation(abbr, expansion);
            }
        }
        for state in STATES {
            lexicon.states.insert(normalize_query(state));
        }
        for (synonym, canonical) in STATE_SYNONYMS {
            lexicon.register_state_synonym(synonym, canonical);
        }
        lexicon
    }

    /// Built-in tables, plus the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut lexicon = Self::builtin();
        let Some(path) = path else {
            return Ok(lexicon);
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;
        let file: LexiconFile = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse lexicon file: {}", path.display()))?;

        for (abbr, expansions) in &file.abbreviations {
            for expansion in expansions {
                lexicon.register_abbreviation(abbr, expansion);
            }
        }
        for (synonym, canonical) in &file.state_synonyms {
            lexicon.register_state_synonym(synonym, canonical);
        }
        tracing::info!(
            path = %path.display(),
            abbreviations = file.abbreviations.len(),
            state_synonyms = file.state_synonyms.len(),
            "Merged lexicon overrides"
        );
        Ok(lexicon)
    }

    fn register_abbreviation(&mut self, abbr: &str, expansion: &str) {
        let abbr = normalize_query(abbr);
        let expansion = normalize_query(expansion);
        if abbr.is_empty() || expansion.is_empty() || abbr == expansion {
            return;
        }
        self.expansions
            .entry(abbr.clone())
            .or_default()
            .insert(expansion.clone());
        self.abbreviations.entry(expansion).or_default().insert(abbr);
    }

    fn register_state_synonym(&mut self, synonym: &str, canonical: &str) {
        let canonical = normalize_query(canonical);
        let synonym = normalize_query(synonym);
        if synonym.is_empty() || canonical.is_empty() {
            return;
        }
        self.states.insert(canonical.clone());
        self.state_synonyms.insert(synonym, canonical);
    }

    pub fn expansions_of(&self, abbr: &str) -> Option<&BTreeSet<String>> {
        self.expansions.get(abbr)
    }

    pub fn abbreviations_for(&self, expansion: &str) -> Option<&BTreeSet<String>> {
        self.abbreviations.get(expansion)
    }

    /// Canonical state for a synonym or a canonical name itself.
    pub fn canonical_state(&self, value: &str) -> Option<&str> {
        if let Some(canonical) = self.state_synonyms.get(value) {
            return Some(canonical.as_str());
        }
        self.states.get(value).map(|s| s.as_str())
    }

    pub fn is_state_synonym(&self, value: &str) -> bool {
        self.state_synonyms.contains_key(value)
    }

    /// Find a state mentioned in a normalized query. Canonical names and long synonyms
    /// match anywhere on word boundaries; short synonyms ("KA", "UP") only when they are
    /// the whole query or follow IN/AT. The longest mention wins, then the earliest.
    pub fn find_state_in(&self, query: &str) -> Option<StateMention> {
        let padded = format!(" {query} ");
        let mut best: Option<(usize, StateMention)> = None;

        let mut consider = |surface: &str, canonical: &str, at: usize| {
            let better = match &best {
                None => true,
                Some((best_at, b)) => {
                    surface.len() > b.surface.len()
                        || (surface.len() == b.surface.len() && at < *best_at)
                }
            };
            if better {
                best = Some((
                    at,
                    StateMention {
                        surface: surface.to_string(),
                        canonical: canonical.to_string(),
                    },
                ));
            }
        };

        for state in &self.states {
            if let Some(at) = padded.find(&format!(" {state} ")) {
                consider(state, state, at);
            }
        }
        for (synonym, canonical) in &self.state_synonyms {
            let bounded = format!(" {synonym} ");
            let hit = if synonym.len() >= 4 {
                padded.find(&bounded)
            } else if query == synonym
                || padded.contains(&format!(" IN {synonym} "))
                || padded.contains(&format!(" AT {synonym} "))
            {
                padded.find(&bounded)
            } else {
                None
            };
            if let Some(at) = hit {
                consider(synonym, canonical, at);
            }
        }
        best.map(|(_, mention)| mention)
    }

    pub fn abbreviation_entries(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.expansions.iter()
    }

    pub fn states(&self) -> impl Iterator<Item = &String> {
        self.states.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMention {
    /// The text as it appears in the query.
    pub surface: String,
    pub canonical: String,
}
