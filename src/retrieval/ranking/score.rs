//! Composite relevance score.
//!
//! Additive, integer and non-negative: a base weight for the strategy that found the
//! row, one name-relationship bonus, attribute bonuses and a capped seats bonus.

use crate::retrieval::fanout::Candidate;
use crate::retrieval::query::CourseType;
use crate::retrieval::strategy::StrategyKind;
use crate::storage::Partition;
use crate::text::{collapse_whitespace, compact, is_stopword};
use serde::{Deserialize, Serialize};

pub const NAME_EXACT: u32 = 500;
pub const NAME_PREFIX: u32 = 300;
pub const QUERY_PREFIX: u32 = 200;
pub const NAME_CONTAINS: u32 = 150;
pub const WORD_MATCH: u32 = 40;

pub const STATE_MATCH: u32 = 50;
pub const COURSE_MATCH: u32 = 40;
pub const MANAGEMENT_MATCH: u32 = 20;
pub const CITY_MATCH: u32 = 30;
pub const SEATS_CAP: u32 = 15;

pub fn base_weight(kind: StrategyKind) -> u32 {
    match kind {
        StrategyKind::Exact => 100,
        StrategyKind::Abbreviation => 80,
        StrategyKind::Fuzzy => 60,
        StrategyKind::Semantic => 40,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub college_id: i64,
    pub course_id: i64,
    pub college_name: String,
    #[serde(rename = "type")]
    pub college_type: Partition,
    pub state: String,
    pub city: String,
    pub management_type: String,
    pub university: String,
    pub course_name: String,
    pub course_type: String,
    pub seats: u32,
    pub score: u32,
    pub strategy: StrategyKind,
    pub matched_variant: String,
}

/// What a candidate is scored against; built once per search.
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    /// Normalized query with dots stripped.
    query: String,
    /// `query` without spaces.
    query_compact: String,
    query_words: Vec<String>,
    state: Option<String>,
    course: Option<String>,
    course_type: Option<CourseType>,
}

impl ScoreContext {
    pub fn new(
        query: &str,
        state: Option<&str>,
        course: Option<&str>,
        course_type: Option<CourseType>,
    ) -> Self {
        let query = strip_dots(query);
        let query_compact = compact(&query);
        let query_words = query
            .split_whitespace()
            .filter(|w| w.len() > 1 && !is_stopword(w))
            .map(str::to_string)
            .collect();
        Self {
            query,
            query_compact,
            query_words,
            state: state.map(|s| s.trim().to_uppercase()),
            course: course.map(|c| c.trim().to_uppercase()),
            course_type,
        }
    }

    pub fn score(&self, candidate: &Candidate) -> ScoredResult {
        let row = &candidate.row;
        let mut score = base_weight(candidate.strategy);
        score += self.name_bonus(&row.college_name);
        score += self.attribute_bonus(candidate);
        score += seats_bonus(row.seats);

        ScoredResult {
            college_id: row.college_id,
            course_id: row.course_id,
            college_name: row.college_name.clone(),
            college_type: row.college_type,
            state: row.state.clone(),
            city: row.city.clone(),
            management_type: row.management_type.clone(),
            university: row.university.clone(),
            course_name: row.course_name.clone(),
            course_type: row.course_type.clone(),
            seats: row.seats,
            score,
            strategy: candidate.strategy,
            matched_variant: candidate.variant.clone(),
        }
    }

    /// Exactly one of equality / prefix / reverse prefix / contains / word overlap.
    /// Each relation also holds when the two sides only differ in separators, so
    /// "A J Institute" relates to "AJ" the way "A.J. Institute" does.
    fn name_bonus(&self, college_name: &str) -> u32 {
        let q = self.query.as_str();
        if q.is_empty() {
            return 0;
        }
        let name = strip_dots(college_name);
        let name_compact = compact(&name);
        let qc = self.query_compact.as_str();
        if name == q || name_compact == qc {
            return NAME_EXACT;
        }
        if starts_with_word(&name, q) || starts_with_compact_word(&name, qc) {
            return NAME_PREFIX;
        }
        if !name.is_empty()
            && (starts_with_word(q, &name) || starts_with_compact_word(q, &name_compact))
        {
            return QUERY_PREFIX;
        }
        if name.contains(q) || name_compact.contains(qc) {
            return NAME_CONTAINS;
        }
        let name_words: Vec<&str> = name.split_whitespace().collect();
        let overlap = self
            .query_words
            .iter()
            .filter(|w| name_words.contains(&w.as_str()))
            .count() as u32;
        overlap * WORD_MATCH
    }

    fn attribute_bonus(&self, candidate: &Candidate) -> u32 {
        let row = &candidate.row;
        let state = row.state.trim().to_uppercase();
        let city = row.city.trim().to_uppercase();
        let management = row.management_type.trim().to_uppercase();
        let course_name = row.course_name.trim().to_uppercase();

        let mut bonus = 0;
        let state_hit = match &self.state {
            Some(wanted) => !state.is_empty() && state == *wanted,
            None => self.mentions(&state),
        };
        if state_hit {
            bonus += STATE_MATCH;
        }

        let course_hit = match (&self.course, self.course_type) {
            (Some(wanted), _) => !course_name.is_empty() && course_name.contains(wanted.as_str()),
            (None, Some(ct)) => ct.matches_course(&course_name),
            (None, None) => self.mentions(&course_name),
        };
        if course_hit {
            bonus += COURSE_MATCH;
        }

        if self.mentions(&management) {
            bonus += MANAGEMENT_MATCH;
        }
        if self.mentions(&city) {
            bonus += CITY_MATCH;
        }
        bonus
    }

    /// Whether the query names `value` on word boundaries.
    fn mentions(&self, value: &str) -> bool {
        if value.is_empty() || self.query.is_empty() {
            return false;
        }
        format!(" {} ", self.query).contains(&format!(" {} ", strip_dots(value)))
    }
}

/// Diminishing with seat count, capped.
pub fn seats_bonus(seats: u32) -> u32 {
    ((seats as f64).sqrt().floor() as u32).min(SEATS_CAP)
}

fn strip_dots(s: &str) -> String {
    collapse_whitespace(&s.to_uppercase().replace('.', ""))
}

fn starts_with_word(haystack: &str, prefix: &str) -> bool {
    haystack.starts_with(prefix)
        && haystack[prefix.len()..]
            .chars()
            .next()
            .map(|c| c == ' ')
            .unwrap_or(true)
}

/// `haystack` begins with `needle` once spaces are ignored, and the match ends on
/// a word boundary: "A J INSTITUTE" starts with "AJ", "AJANTA" does not.
fn starts_with_compact_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut rest = haystack.chars().peekable();
    for wanted in needle.chars() {
        while rest.peek() == Some(&' ') {
            rest.next();
        }
        if rest.next() != Some(wanted) {
            return false;
        }
    }
    matches!(rest.next(), None | Some(' '))
}
