//! Read-only access to the college/course catalog.
//!
//! The catalog is populated by an external ingestion pipeline. The search engine only
//! sees it through [`CatalogSource`], which lets tests inject in-memory fixtures or
//! failing sources.

pub mod sqlite;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use sqlite::schema::{CatalogRow, CollegeRecord, CourseRecord};
pub use sqlite::SqliteCatalog;

/// One of the partitioned domain tables. Doubles as the college type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Medical,
    Dental,
    Dnb,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Medical, Partition::Dental, Partition::Dnb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Medical => "medical",
            Partition::Dental => "dental",
            Partition::Dnb => "dnb",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Partition::Medical => "medical_courses",
            Partition::Dental => "dental_courses",
            Partition::Dnb => "dnb_courses",
        }
    }

    pub fn parse(value: &str) -> Option<Partition> {
        match value.trim().to_lowercase().as_str() {
            "medical" => Some(Partition::Medical),
            "dental" => Some(Partition::Dental),
            "dnb" => Some(Partition::Dnb),
            _ => None,
        }
    }
}

/// Partition-table columns a strategy can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CollegeName,
    CourseName,
    CourseType,
    State,
    City,
    ManagementType,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::CollegeName => "college_name",
            Field::CourseName => "course_name",
            Field::CourseType => "course_type",
            Field::State => "state",
            Field::City => "city",
            Field::ManagementType => "management_type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// Case-insensitive substring.
    Contains(String),
    /// Separator-tolerant substring: dots and spaces on both sides count as one
    /// separator, and multi-letter tokens may be apart.
    Wildcarded(String),
    /// Substring after stripping dots and spaces from both sides.
    Compact(String),
    /// Case-insensitive equality after trimming.
    Equals(String),
    /// Initials of the significant words start with these letters, e.g. "AIIMS"
    /// against "All India Institute of Medical Sciences".
    Initials(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPredicate {
    pub field: Field,
    pub matcher: FieldMatch,
}

impl FieldPredicate {
    pub fn new(field: Field, matcher: FieldMatch) -> Self {
        Self { field, matcher }
    }
}

/// A partition read: any predicate may match (OR), every constraint must hold (AND).
/// An empty predicate list matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub any_of: Vec<FieldPredicate>,
    pub course: Option<String>,
    pub state: Option<String>,
    pub limit: usize,
}

impl RowQuery {
    pub fn is_constrained(&self) -> bool {
        self.course.is_some() || self.state.is_some()
    }

    pub fn unconstrained(&self) -> RowQuery {
        RowQuery {
            any_of: self.any_of.clone(),
            course: None,
            state: None,
            limit: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    College,
    Course,
    City,
    State,
}

impl SuggestionKind {
    pub const ALL: [SuggestionKind; 4] = [
        SuggestionKind::College,
        SuggestionKind::Course,
        SuggestionKind::City,
        SuggestionKind::State,
    ];

    /// Lower sorts first in suggestion lists.
    pub fn priority(&self) -> u8 {
        match self {
            SuggestionKind::College => 0,
            SuggestionKind::Course => 1,
            SuggestionKind::City => 2,
            SuggestionKind::State => 3,
        }
    }
}

pub trait CatalogSource: Send + Sync {
    fn query_partition(&self, partition: Partition, query: &RowQuery) -> Result<Vec<CatalogRow>>;

    fn partition_has_match(&self, partition: Partition, query: &RowQuery) -> Result<bool> {
        let probe = RowQuery {
            limit: 1,
            ..query.clone()
        };
        Ok(!self.query_partition(partition, &probe)?.is_empty())
    }

    fn suggest(
        &self,
        kind: SuggestionKind,
        needle: &str,
        stream: Option<Partition>,
        limit: usize,
    ) -> Result<Vec<String>>;

    fn distinct_states(&self) -> Result<Vec<String>>;

    fn partition_row_counts(&self) -> Result<Vec<(Partition, u64)>>;

    fn college_by_id(&self, id: i64) -> Result<Option<CollegeRecord>>;

    fn courses_for_college(&self, college_id: i64) -> Result<Vec<CourseRecord>>;
}
