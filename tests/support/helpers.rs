//! Test helper functions for integration tests
//!
//! Catalog wrappers that inject partition faults, plus small assertions over results.

use anyhow::{bail, Result};
use college_course_search::retrieval::ranking::ScoredResult;
use college_course_search::storage::{
    CatalogRow, CatalogSource, CollegeRecord, CourseRecord, Partition, RowQuery, SuggestionKind,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Every read of the partition errors.
    Fail,
    /// Every read of the partition sleeps before answering.
    Delay(Duration),
}

/// Delegates to `inner`, except for reads of the faulted partitions.
pub struct FaultyCatalog {
    inner: Arc<dyn CatalogSource>,
    faults: Vec<(Partition, Fault)>,
}

impl FaultyCatalog {
    pub fn new(inner: Arc<dyn CatalogSource>, faults: Vec<(Partition, Fault)>) -> Self {
        Self { inner, faults }
    }

    fn fault_for(&self, partition: Partition) -> Option<Fault> {
        self.faults
            .iter()
            .find(|(p, _)| *p == partition)
            .map(|(_, f)| *f)
    }
}

impl CatalogSource for FaultyCatalog {
    fn query_partition(&self, partition: Partition, query: &RowQuery) -> Result<Vec<CatalogRow>> {
        match self.fault_for(partition) {
            Some(Fault::Fail) => bail!("{} is unavailable", partition.table()),
            Some(Fault::Delay(d)) => std::thread::sleep(d),
            None => {}
        }
        self.inner.query_partition(partition, query)
    }

    fn suggest(
        &self,
        kind: SuggestionKind,
        needle: &str,
        stream: Option<Partition>,
        limit: usize,
    ) -> Result<Vec<String>> {
        self.inner.suggest(kind, needle, stream, limit)
    }

    fn distinct_states(&self) -> Result<Vec<String>> {
        self.inner.distinct_states()
    }

    fn partition_row_counts(&self) -> Result<Vec<(Partition, u64)>> {
        self.inner.partition_row_counts()
    }

    fn college_by_id(&self, id: i64) -> Result<Option<CollegeRecord>> {
        self.inner.college_by_id(id)
    }

    fn courses_for_college(&self, college_id: i64) -> Result<Vec<CourseRecord>> {
        self.inner.courses_for_college(college_id)
    }
}

/// (college id, course id) of every result.
pub fn keys(results: &[ScoredResult]) -> Vec<(i64, i64)> {
    results.iter().map(|r| (r.college_id, r.course_id)).collect()
}

pub fn key_set(results: &[ScoredResult]) -> BTreeSet<(i64, i64)> {
    keys(results).into_iter().collect()
}

/// College name with dots and spaces removed, upper-cased.
pub fn compact_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
