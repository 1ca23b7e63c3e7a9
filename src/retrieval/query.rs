//! Query intent: course type, location and college hints.
//!
//! Course-type detection walks a fixed priority order so that the more specific codes
//! are tested first ("MBBS" before "MD", "MDS" before "MD"). All patterns are compiled
//! once; unexpected input simply yields no course type.

use crate::lexicon::Lexicon;
use crate::storage::Partition;
use crate::text::{collapse_whitespace, is_stopword};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseType {
    #[serde(rename = "MBBS")]
    Mbbs,
    #[serde(rename = "MD")]
    Md,
    #[serde(rename = "MS")]
    Ms,
    #[serde(rename = "DM")]
    Dm,
    #[serde(rename = "MCh")]
    Mch,
    #[serde(rename = "BDS")]
    Bds,
    #[serde(rename = "MDS")]
    Mds,
    #[serde(rename = "DNB")]
    Dnb,
}

/// Most specific first.
const DETECTION_ORDER: [CourseType; 8] = [
    CourseType::Mbbs,
    CourseType::Mds,
    CourseType::Bds,
    CourseType::Dnb,
    CourseType::Mch,
    CourseType::Dm,
    CourseType::Md,
    CourseType::Ms,
];

static MBBS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bM\.?\s?B\.?\s?B\.?\s?S\b|BACHELOR OF MEDICINE").unwrap()
});
static MDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bM\.?\s?D\.?\s?S\b|MASTER OF DENTAL SURGERY").unwrap()
});
static BDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bB\.?\s?D\.?\s?S\b|BACHELOR OF DENTAL SURGERY").unwrap()
});
static DNB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bD\.?\s?N\.?\s?B\b|DIPLOMATE OF NATIONAL BOARD").unwrap()
});
static MCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bM\.?\s?CH\b|MAGISTER CHIRURGIAE|MASTER OF CHIRURGIAE").unwrap()
});
static DM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bD\.?\s?M\b|DOCTORATE OF MEDICINE").unwrap());
static MD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bM\.?\s?D\b|DOCTOR OF MEDICINE").unwrap());
static MS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bM\.?\s?S\b|MASTER OF SURGERY").unwrap());

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::Mbbs => "MBBS",
            CourseType::Md => "MD",
            CourseType::Ms => "MS",
            CourseType::Dm => "DM",
            CourseType::Mch => "MCh",
            CourseType::Bds => "BDS",
            CourseType::Mds => "MDS",
            CourseType::Dnb => "DNB",
        }
    }

    /// The catalog partition that carries this course family.
    pub fn partition(&self) -> Partition {
        match self {
            CourseType::Bds | CourseType::Mds => Partition::Dental,
            CourseType::Dnb => Partition::Dnb,
            _ => Partition::Medical,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            CourseType::Mbbs => &MBBS_RE,
            CourseType::Md => &MD_RE,
            CourseType::Ms => &MS_RE,
            CourseType::Dm => &DM_RE,
            CourseType::Mch => &MCH_RE,
            CourseType::Bds => &BDS_RE,
            CourseType::Mds => &MDS_RE,
            CourseType::Dnb => &DNB_RE,
        }
    }

    /// Overlapping families whose hits must be rejected for this type.
    fn excluded(&self) -> &'static [CourseType] {
        match self {
            CourseType::Md | CourseType::Ms | CourseType::Dm | CourseType::Mch => {
                &[CourseType::Mbbs, CourseType::Dnb]
            }
            CourseType::Mbbs | CourseType::Bds => &[CourseType::Dnb],
            CourseType::Mds => &[CourseType::Bds, CourseType::Dnb],
            CourseType::Dnb => &[],
        }
    }

    /// Whether a course name belongs to this family and to none of the overlapping ones.
    pub fn matches_course(&self, course_name: &str) -> bool {
        if !self.pattern().is_match(course_name) {
            return false;
        }
        !self
            .excluded()
            .iter()
            .any(|other| other.pattern().is_match(course_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Intent {
    pub course_type: Option<CourseType>,
    pub location_hint: bool,
    pub college_hint: bool,
    /// Canonical state named in the query.
    pub state: Option<String>,
    /// The query minus course-type, state, stopword and generic tokens.
    pub residual: String,
}

impl Intent {
    /// Nothing left to match textually, but the query still constrains the catalog
    /// ("DNB in Karnataka").
    pub fn is_broad(&self) -> bool {
        self.residual.is_empty() && (self.course_type.is_some() || self.state.is_some())
    }
}

const COLLEGE_WORDS: &[&str] = &[
    "COLLEGE",
    "COLLEGES",
    "INSTITUTE",
    "UNIVERSITY",
    "HOSPITAL",
    "MEDICAL",
    "DENTAL",
    "SCIENCES",
    "ACADEMY",
    "CENTRE",
    "CENTER",
];

const GENERIC_WORDS: &[&str] = &[
    "COLLEGE", "COLLEGES", "COURSE", "COURSES", "SEAT", "SEATS", "LIST", "ALL",
];

pub fn detect_course_type(query: &str) -> Option<CourseType> {
    DETECTION_ORDER
        .iter()
        .copied()
        .find(|ct| ct.pattern().is_match(query))
}

/// Analyze a normalized (upper-cased, trimmed) query.
pub fn analyze(query: &str, lexicon: &Lexicon) -> Intent {
    let course_type = detect_course_type(query);
    let state = lexicon.find_state_in(query);

    let tokens: Vec<&str> = query.split_whitespace().collect();
    let location_hint =
        state.is_some() || tokens.iter().any(|t| matches!(*t, "IN" | "NEAR" | "AT"));
    let college_hint = tokens.iter().any(|t| COLLEGE_WORDS.contains(t))
        || (course_type.is_none() && lexicon.expansions_of(query).is_some())
        || lexicon.abbreviations_for(query).is_some();

    let mut rest = query.to_string();
    if let Some(ct) = course_type {
        rest = ct.pattern().replace_all(&rest, " ").into_owned();
    }
    if let Some(mention) = &state {
        let padded = format!(" {} ", collapse_whitespace(&rest));
        rest = padded.replace(&format!(" {} ", mention.surface), " ");
    }
    let residual = rest
        .split_whitespace()
        .filter(|t| !is_stopword(t) && !GENERIC_WORDS.contains(t))
        .collect::<Vec<_>>()
        .join(" ");

    Intent {
        course_type,
        location_hint,
        college_hint,
        state: state.map(|m| m.canonical),
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("MBBS", Some(CourseType::Mbbs); "mbbs")]
    #[test_case("MD GENERAL MEDICINE", Some(CourseType::Md); "md")]
    #[test_case("M.D. PAEDIATRICS", Some(CourseType::Md); "dotted md")]
    #[test_case("MDS ORTHODONTICS", Some(CourseType::Mds); "mds is not md")]
    #[test_case("MBBS MD COLLEGES", Some(CourseType::Mbbs); "mbbs wins priority")]
    #[test_case("DNB IN KARNATAKA", Some(CourseType::Dnb); "dnb")]
    #[test_case("MCH NEUROSURGERY", Some(CourseType::Mch); "mch")]
    #[test_case("DM CARDIOLOGY", Some(CourseType::Dm); "dm")]
    #[test_case("MS ORTHOPAEDICS", Some(CourseType::Ms); "ms")]
    #[test_case("BDS", Some(CourseType::Bds); "bds")]
    #[test_case("DOCTOR OF MEDICINE", Some(CourseType::Md); "spelled out md")]
    #[test_case("AJ INSTITUTE", None; "plain name")]
    #[test_case("MDMA", None; "no partial token")]
    #[test_case("", None; "empty")]
    fn detects_course_type(query: &str, expected: Option<CourseType>) {
        assert_eq!(detect_course_type(query), expected);
    }

    #[test_case(CourseType::Md, "MD General Medicine", true; "md keeps md")]
    #[test_case(CourseType::Md, "MBBS", false; "md drops mbbs")]
    #[test_case(CourseType::Md, "MBBS and MD", false; "md drops mixed mbbs")]
    #[test_case(CourseType::Md, "DNB General Medicine", false; "md drops dnb")]
    #[test_case(CourseType::Md, "MDS Prosthodontics", false; "md drops mds")]
    #[test_case(CourseType::Mbbs, "MBBS", true; "mbbs keeps mbbs")]
    #[test_case(CourseType::Dnb, "DNB Anaesthesia", true; "dnb keeps dnb")]
    #[test_case(CourseType::Ms, "MS General Surgery", true; "ms keeps ms")]
    #[test_case(CourseType::Mds, "MDS", true; "mds keeps mds")]
    #[test_case(CourseType::Bds, "MDS", false; "bds drops mds")]
    fn course_type_filtering(ct: CourseType, course: &str, keep: bool) {
        assert_eq!(ct.matches_course(course), keep);
    }

    #[test]
    fn compound_query_is_broad() {
        let lex = Lexicon::builtin();
        let intent = analyze("DNB IN KARNATAKA", &lex);
        assert_eq!(intent.course_type, Some(CourseType::Dnb));
        assert_eq!(intent.state.as_deref(), Some("KARNATAKA"));
        assert!(intent.location_hint);
        assert_eq!(intent.residual, "");
        assert!(intent.is_broad());
    }

    #[test]
    fn residual_keeps_name_tokens() {
        let lex = Lexicon::builtin();
        let intent = analyze("AJ COLLEGES IN KARNATAKA", &lex);
        assert_eq!(intent.residual, "AJ");
        assert!(intent.college_hint);
        assert!(!intent.is_broad());
    }

    #[test]
    fn plain_query_has_no_constraints() {
        let lex = Lexicon::builtin();
        let intent = analyze("AJ", &lex);
        assert_eq!(intent.course_type, None);
        assert_eq!(intent.state, None);
        assert!(!intent.location_hint);
        assert_eq!(intent.residual, "AJ");
        assert!(!intent.is_broad());
    }

    #[test]
    fn abbreviation_sets_college_hint() {
        let lex = Lexicon::builtin();
        assert!(analyze("AIIMS", &lex).college_hint);
        assert!(analyze("ALL INDIA INSTITUTE OF MEDICAL SCIENCES", &lex).college_hint);
    }

    #[test]
    fn course_types_map_to_partitions() {
        assert_eq!(CourseType::Bds.partition(), Partition::Dental);
        assert_eq!(CourseType::Dnb.partition(), Partition::Dnb);
        assert_eq!(CourseType::Mch.partition(), Partition::Medical);
    }
}
