use anyhow::{Context, Result};
use rusqlite::{params_from_iter, types::Value, Connection, Row};

use crate::storage::sqlite::operations::INITIALS_FN;
use crate::storage::sqlite::schema::{CatalogRow, PARTITION_COLUMNS};
use crate::storage::{FieldMatch, FieldPredicate, Partition, RowQuery};
use crate::text::{compact, escape_like, like_contains, like_wildcarded};

pub fn query_partition(
    conn: &Connection,
    partition: Partition,
    query: &RowQuery,
) -> Result<Vec<CatalogRow>> {
    let (where_sql, mut params) = render_where(query);
    params.push(Value::Integer(query.limit.max(1) as i64));

    let sql = format!(
        "SELECT {PARTITION_COLUMNS} FROM {table} WHERE {where_sql} \
         ORDER BY college_id ASC, course_id ASC LIMIT ?",
        table = partition.table(),
    );

    let mut stmt = conn
        .prepare_cached(&sql)
        .with_context(|| format!("Failed to prepare query on {}", partition.table()))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| map_row(row, partition))
        .with_context(|| format!("Failed to query {}", partition.table()))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn count_rows(conn: &Connection, partition: Partition) -> Result<u64> {
    let count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", partition.table()),
            [],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to count {}", partition.table()))?;
    Ok(count.max(0) as u64)
}

fn map_row(row: &Row<'_>, partition: Partition) -> rusqlite::Result<CatalogRow> {
    Ok(CatalogRow {
        college_id: row.get(0)?,
        course_id: row.get(1)?,
        college_name: row.get(2)?,
        college_type: partition,
        state: row.get(3)?,
        city: row.get(4)?,
        management_type: row.get(5)?,
        university: row.get(6)?,
        course_name: row.get(7)?,
        course_type: row.get(8)?,
        seats: row.get::<_, i64>(9)?.clamp(0, u32::MAX as i64) as u32,
    })
}

/// Render a row query into a WHERE clause plus positional parameters.
pub(crate) fn render_where(query: &RowQuery) -> (String, Vec<Value>) {
    let mut params = Vec::new();

    let match_sql = if query.any_of.is_empty() {
        "1 = 1".to_string()
    } else {
        let parts = query
            .any_of
            .iter()
            .map(|p| render_predicate(p, &mut params))
            .collect::<Vec<_>>();
        format!("({})", parts.join(" OR "))
    };

    let mut clauses = vec![match_sql];

    if let Some(course) = &query.course {
        clauses.push(
            r"(UPPER(TRIM(IFNULL(course_type, ''))) = ? OR IFNULL(course_name, '') LIKE ? ESCAPE '\')"
                .to_string(),
        );
        params.push(Value::Text(course.trim().to_uppercase()));
        params.push(Value::Text(like_contains(course.trim())));
    }

    if let Some(state) = &query.state {
        clauses.push("UPPER(TRIM(IFNULL(state, ''))) = ?".to_string());
        params.push(Value::Text(state.trim().to_uppercase()));
    }

    (clauses.join(" AND "), params)
}

fn render_predicate(predicate: &FieldPredicate, params: &mut Vec<Value>) -> String {
    let column = format!("IFNULL({}, '')", predicate.field.column());
    match &predicate.matcher {
        FieldMatch::Contains(v) => {
            params.push(Value::Text(like_contains(v)));
            format!(r"{column} LIKE ? ESCAPE '\'")
        }
        FieldMatch::Wildcarded(v) => {
            params.push(Value::Text(like_wildcarded(v)));
            format!(
                r"REPLACE(REPLACE(REPLACE({column}, '.', ' '), '  ', ' '), '  ', ' ') LIKE ? ESCAPE '\'"
            )
        }
        FieldMatch::Compact(v) => {
            params.push(Value::Text(like_contains(&compact(v))));
            format!(r"REPLACE(REPLACE({column}, '.', ''), ' ', '') LIKE ? ESCAPE '\'")
        }
        FieldMatch::Equals(v) => {
            params.push(Value::Text(v.trim().to_uppercase()));
            format!("UPPER(TRIM({column})) = ?")
        }
        FieldMatch::Initials(letters) => {
            params.push(Value::Text(format!("{}%", escape_like(letters))));
            format!(r"{INITIALS_FN}({column}) LIKE ? ESCAPE '\'")
        }
    }
}
