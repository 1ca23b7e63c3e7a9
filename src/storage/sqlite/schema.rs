use crate::storage::Partition;
use serde::{Deserialize, Serialize};

/// A course-level row from one of the partition tables, college attributes inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub college_id: i64,
    pub course_id: i64,
    pub college_name: String,
    pub college_type: Partition,
    pub state: String,
    pub city: String,
    pub management_type: String,
    pub university: String,
    pub course_name: String,
    pub course_type: String,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegeRecord {
    pub id: i64,
    pub name: String,
    pub normalized_name: String,
    pub state: String,
    pub city: String,
    #[serde(rename = "type")]
    pub college_type: Partition,
    pub establishment_year: Option<i32>,
    pub management_type: String,
    pub university: String,
    pub total_courses: u32,
    pub total_seats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: i64,
    pub college_id: i64,
    pub name: String,
    pub course_type: String,
    pub seats: u32,
    pub quota_details: serde_json::Value,
    pub cutoff_ranks: serde_json::Value,
    pub fees_structure: serde_json::Value,
}

pub const PARTITION_COLUMNS: &str = r#"
  college_id, course_id, college_name,
  IFNULL(state, ''), IFNULL(city, ''), IFNULL(management_type, ''),
  IFNULL(university, ''), IFNULL(course_name, ''), IFNULL(course_type, ''),
  IFNULL(seats, 0)
"#;

pub const SCHEMA_SQL: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS colleges (
  id INTEGER PRIMARY KEY NOT NULL,
  name TEXT NOT NULL,
  normalized_name TEXT NOT NULL,
  state TEXT,
  city TEXT,
  type TEXT NOT NULL CHECK (type IN ('medical', 'dental', 'dnb')),
  establishment_year INTEGER,
  management_type TEXT,
  university TEXT,
  total_courses INTEGER NOT NULL DEFAULT 0,
  total_seats INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_colleges_name ON colleges(name);
CREATE INDEX IF NOT EXISTS idx_colleges_state ON colleges(state);

CREATE TABLE IF NOT EXISTS courses (
  id INTEGER PRIMARY KEY NOT NULL,
  college_id INTEGER NOT NULL REFERENCES colleges(id) ON DELETE CASCADE,
  name TEXT,
  course_type TEXT,
  seats INTEGER,
  quota_details TEXT,
  cutoff_ranks TEXT,
  fees_structure TEXT
);

CREATE INDEX IF NOT EXISTS idx_courses_college ON courses(college_id);

CREATE TABLE IF NOT EXISTS medical_courses (
  college_id INTEGER NOT NULL REFERENCES colleges(id),
  course_id INTEGER NOT NULL REFERENCES courses(id),
  college_name TEXT NOT NULL,
  state TEXT,
  city TEXT,
  management_type TEXT,
  university TEXT,
  course_name TEXT,
  course_type TEXT,
  seats INTEGER
);

CREATE TABLE IF NOT EXISTS dental_courses (
  college_id INTEGER NOT NULL REFERENCES colleges(id),
  course_id INTEGER NOT NULL REFERENCES courses(id),
  college_name TEXT NOT NULL,
  state TEXT,
  city TEXT,
  management_type TEXT,
  university TEXT,
  course_name TEXT,
  course_type TEXT,
  seats INTEGER
);

CREATE TABLE IF NOT EXISTS dnb_courses (
  college_id INTEGER NOT NULL REFERENCES colleges(id),
  course_id INTEGER NOT NULL REFERENCES courses(id),
  college_name TEXT NOT NULL,
  state TEXT,
  city TEXT,
  management_type TEXT,
  university TEXT,
  course_name TEXT,
  course_type TEXT,
  seats INTEGER
);

CREATE INDEX IF NOT EXISTS idx_medical_courses_college ON medical_courses(college_id, course_id);
CREATE INDEX IF NOT EXISTS idx_dental_courses_college ON dental_courses(college_id, course_id);
CREATE INDEX IF NOT EXISTS idx_dnb_courses_college ON dnb_courses(college_id, course_id);
"#;
