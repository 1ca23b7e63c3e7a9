pub mod operations;
pub mod queries;
pub mod schema;

use anyhow::Result;

pub use operations::SqliteCatalog;
pub use schema::*;

use crate::storage::{CatalogSource, Partition, RowQuery, SuggestionKind};

impl CatalogSource for SqliteCatalog {
    fn query_partition(&self, partition: Partition, query: &RowQuery) -> Result<Vec<CatalogRow>> {
        self.with_conn(|conn| queries::partitions::query_partition(conn, partition, query))
    }

    fn suggest(
        &self,
        kind: SuggestionKind,
        needle: &str,
        stream: Option<Partition>,
        limit: usize,
    ) -> Result<Vec<String>> {
        self.with_conn(|conn| queries::colleges::suggest(conn, kind, needle, stream, limit))
    }

    fn distinct_states(&self) -> Result<Vec<String>> {
        self.with_conn(queries::colleges::distinct_states)
    }

    fn partition_row_counts(&self) -> Result<Vec<(Partition, u64)>> {
        self.with_conn(|conn| {
            Partition::ALL
                .iter()
                .map(|p| Ok((*p, queries::partitions::count_rows(conn, *p)?)))
                .collect()
        })
    }

    fn college_by_id(&self, id: i64) -> Result<Option<CollegeRecord>> {
        self.with_conn(|conn| queries::colleges::college_by_id(conn, id))
    }

    fn courses_for_college(&self, college_id: i64) -> Result<Vec<CourseRecord>> {
        self.with_conn(|conn| queries::colleges::courses_for_college(conn, college_id))
    }
}
