use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};

use crate::storage::sqlite::schema::{CollegeRecord, CourseRecord};
use crate::storage::{Partition, SuggestionKind};
use crate::text::like_contains;

pub fn suggest(
    conn: &Connection,
    kind: SuggestionKind,
    needle: &str,
    stream: Option<Partition>,
    limit: usize,
) -> Result<Vec<String>> {
    let (column, from) = match kind {
        SuggestionKind::College => ("g.name", "colleges g"),
        SuggestionKind::Course => ("c.name", "courses c JOIN colleges g ON g.id = c.college_id"),
        SuggestionKind::City => ("g.city", "colleges g"),
        SuggestionKind::State => ("g.state", "colleges g"),
    };

    let mut params = vec![Value::Text(like_contains(needle.trim()))];
    let stream_sql = match stream {
        Some(p) => {
            params.push(Value::Text(p.as_str().to_string()));
            " AND g.type = ?"
        }
        None => "",
    };
    params.push(Value::Integer(limit.max(1) as i64));

    let sql = format!(
        r"SELECT DISTINCT TRIM({column}) AS value FROM {from}
WHERE {column} IS NOT NULL AND TRIM({column}) <> ''
  AND {column} LIKE ? ESCAPE '\'{stream_sql}
ORDER BY value ASC
LIMIT ?"
    );

    let mut stmt = conn
        .prepare_cached(&sql)
        .with_context(|| format!("Failed to prepare {kind:?} suggestion query"))?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn distinct_states(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare_cached(
            r#"
SELECT DISTINCT TRIM(state) AS s FROM colleges
WHERE state IS NOT NULL AND TRIM(state) <> ''
ORDER BY s ASC
"#,
        )
        .context("Failed to prepare distinct_states")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn college_by_id(conn: &Connection, id: i64) -> Result<Option<CollegeRecord>> {
    conn.query_row(
        r#"
SELECT
  id, name, normalized_name, IFNULL(state, ''), IFNULL(city, ''), type,
  establishment_year, IFNULL(management_type, ''), IFNULL(university, ''),
  total_courses, total_seats
FROM colleges
WHERE id = ?1
"#,
        params![id],
        |row| {
            let raw_type: String = row.get(5)?;
            Ok(CollegeRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                normalized_name: row.get(2)?,
                state: row.get(3)?,
                city: row.get(4)?,
                college_type: Partition::parse(&raw_type).unwrap_or(Partition::Medical),
                establishment_year: row.get(6)?,
                management_type: row.get(7)?,
                university: row.get(8)?,
                total_courses: row.get::<_, i64>(9)?.max(0) as u32,
                total_seats: row.get::<_, i64>(10)?.max(0) as u32,
            })
        },
    )
    .optional()
    .with_context(|| format!("Failed to load college {id}"))
}

pub fn courses_for_college(conn: &Connection, college_id: i64) -> Result<Vec<CourseRecord>> {
    let mut stmt = conn
        .prepare_cached(
            r#"
SELECT
  id, college_id, IFNULL(name, ''), IFNULL(course_type, ''), IFNULL(seats, 0),
  quota_details, cutoff_ranks, fees_structure
FROM courses
WHERE college_id = ?1
ORDER BY id ASC
"#,
        )
        .context("Failed to prepare courses_for_college")?;

    let rows = stmt.query_map(params![college_id], |row| {
        Ok(CourseRecord {
            id: row.get(0)?,
            college_id: row.get(1)?,
            name: row.get(2)?,
            course_type: row.get(3)?,
            seats: row.get::<_, i64>(4)?.clamp(0, u32::MAX as i64) as u32,
            quota_details: json_column(row.get(5)?),
            cutoff_ranks: json_column(row.get(6)?),
            fees_structure: json_column(row.get(7)?),
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// JSON text columns; anything unparsable is surfaced as a plain string.
fn json_column(raw: Option<String>) -> serde_json::Value {
    match raw {
        None => serde_json::Value::Null,
        Some(s) if s.trim().is_empty() => serde_json::Value::Null,
        Some(s) => serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
    }
}
