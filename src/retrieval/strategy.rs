//! Retrieval strategies.
//!
//! Each strategy turns a variant into a set of OR-combined field predicates. The
//! catalog applies the caller's constraints on top, so adding a strategy never touches
//! the fan-out loop.

use crate::storage::{CatalogRow, CatalogSource, Field, FieldMatch, FieldPredicate, Partition, RowQuery};
use crate::text::{compact, initials_needle};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Exact,
    Fuzzy,
    Semantic,
    Abbreviation,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::Fuzzy => "fuzzy",
            StrategyKind::Semantic => "semantic",
            StrategyKind::Abbreviation => "abbreviation",
        }
    }
}

/// AND-constraints applied to every read of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub course: Option<String>,
    pub state: Option<String>,
    pub row_limit: usize,
}

impl Constraints {
    pub fn row_query(&self, any_of: Vec<FieldPredicate>) -> RowQuery {
        RowQuery {
            any_of,
            course: self.course.clone(),
            state: self.state.clone(),
            limit: self.row_limit,
        }
    }
}

pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// `None` when the strategy does not apply to this variant; an empty list matches
    /// every row.
    fn predicates(&self, variant: &str) -> Option<Vec<FieldPredicate>>;

    fn retrieve(
        &self,
        catalog: &dyn CatalogSource,
        partition: Partition,
        variant: &str,
        constraints: &Constraints,
    ) -> Result<Vec<CatalogRow>> {
        match self.predicates(variant) {
            Some(any_of) => catalog.query_partition(partition, &constraints.row_query(any_of)),
            None => Ok(Vec::new()),
        }
    }
}

fn contains(field: Field, variant: &str) -> FieldPredicate {
    FieldPredicate::new(field, FieldMatch::Contains(variant.to_string()))
}

pub struct ExactStrategy;

impl RetrievalStrategy for ExactStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn predicates(&self, variant: &str) -> Option<Vec<FieldPredicate>> {
        if variant.is_empty() {
            return Some(Vec::new());
        }
        Some(
            [Field::CollegeName, Field::CourseName, Field::State, Field::City]
                .into_iter()
                .map(|f| contains(f, variant))
                .collect(),
        )
    }
}

pub struct FuzzyStrategy;

impl RetrievalStrategy for FuzzyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fuzzy
    }

    fn predicates(&self, variant: &str) -> Option<Vec<FieldPredicate>> {
        if compact(variant).is_empty() {
            return None;
        }
        let mut out = Vec::new();
        for field in [Field::CollegeName, Field::CourseName] {
            out.push(FieldPredicate::new(field, FieldMatch::Wildcarded(variant.to_string())));
            out.push(FieldPredicate::new(field, FieldMatch::Compact(variant.to_string())));
        }
        Some(out)
    }
}

pub struct SemanticStrategy;

impl RetrievalStrategy for SemanticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Semantic
    }

    fn predicates(&self, variant: &str) -> Option<Vec<FieldPredicate>> {
        if variant.is_empty() {
            return None;
        }
        let equals = [Field::CourseType, Field::State, Field::ManagementType]
            .into_iter()
            .map(|f| FieldPredicate::new(f, FieldMatch::Equals(variant.to_string())));
        let substr = [Field::CourseName, Field::City]
            .into_iter()
            .map(|f| contains(f, variant));
        Some(equals.chain(substr).collect())
    }
}

pub struct AbbreviationStrategy;

impl RetrievalStrategy for AbbreviationStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Abbreviation
    }

    fn predicates(&self, variant: &str) -> Option<Vec<FieldPredicate>> {
        if variant.is_empty() {
            return None;
        }
        let mut out = vec![
            contains(Field::CollegeName, variant),
            contains(Field::City, variant),
        ];
        if let Some(letters) = initials_needle(variant) {
            out.push(FieldPredicate::new(Field::CollegeName, FieldMatch::Initials(letters)));
        }
        Some(out)
    }
}

/// Exact -> Fuzzy -> Semantic -> Abbreviation.
pub fn default_strategies() -> Vec<Box<dyn RetrievalStrategy>> {
    vec![
        Box::new(ExactStrategy),
        Box::new(FuzzyStrategy),
        Box::new(SemanticStrategy),
        Box::new(AbbreviationStrategy),
    ]
}
