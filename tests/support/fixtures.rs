//! rstest fixtures for integration tests
//!
//! Every fixture builds its own in-memory catalog, so tests stay isolated when run
//! in parallel.
//!
//! # Usage
//!
//! ```rust
//! use crate::support::fixtures::*;
//!
//! #[rstest]
//! #[tokio::test]
//! async fn my_test(engine: SearchEngine) {
//!     let response = engine.search("AJ", &SearchFilters::default()).await;
//!     assert!(response.error.is_none());
//! }
//! ```

use college_course_search::{
    config::Config,
    lexicon::Lexicon,
    metrics::MetricsRegistry,
    retrieval::SearchEngine,
    storage::{CatalogSource, SqliteCatalog},
};
use rstest::*;
use std::sync::Arc;

/// Colleges 1 and 5 are the "AJ" initialism names, dotted and spaced.
pub const SEED_SQL: &str = r#"
INSERT INTO colleges (id, name, normalized_name, state, city, type, establishment_year, management_type, university, total_courses, total_seats)
VALUES
  (1, 'A.J. Institute of Medical Sciences', 'AJ INSTITUTE OF MEDICAL SCIENCES', 'Karnataka', 'Mangalore', 'medical', 2002, 'Private', 'RGUHS', 2, 250),
  (2, 'All India Institute of Medical Sciences', 'ALL INDIA INSTITUTE OF MEDICAL SCIENCES', 'Delhi', 'New Delhi', 'medical', 1956, 'Government', 'AIIMS', 3, 225),
  (3, 'Kasturba Medical College', 'KASTURBA MEDICAL COLLEGE', 'Karnataka', 'Manipal', 'medical', 1953, 'Private', 'MAHE', 2, 330),
  (4, 'Government Dental College', 'GOVERNMENT DENTAL COLLEGE', 'Kerala', 'Kozhikode', 'dental', 1971, 'Government', 'KUHS', 2, 110),
  (5, 'A J Institute of Dental Sciences', 'AJ INSTITUTE OF DENTAL SCIENCES', 'Karnataka', 'Mangalore', 'dental', 2005, 'Private', 'RGUHS', 1, 100),
  (6, 'Narayana Hospital', 'NARAYANA HOSPITAL', 'Karnataka', 'Bangalore', 'dnb', NULL, 'Private', NULL, 2, 4),
  (7, 'Apollo Hospital', 'APOLLO HOSPITAL', 'Tamil Nadu', 'Chennai', 'dnb', NULL, 'Private', NULL, 2, 6);

INSERT INTO courses (id, college_id, name, course_type, seats, quota_details, cutoff_ranks, fees_structure)
VALUES
  (101, 1, 'MBBS', 'MBBS', 150, '{"aiq": 23, "state": 65}', '[10234, 15400]', '{"annual": 1500000}'),
  (102, 1, 'MD General Medicine', 'MD', 100, NULL, NULL, NULL),
  (201, 2, 'MBBS', 'MBBS', 125, NULL, NULL, NULL),
  (202, 2, 'MD General Medicine', 'MD', 60, NULL, NULL, NULL),
  (203, 2, 'MS General Surgery', 'MS', 40, NULL, NULL, NULL),
  (301, 3, 'MBBS', 'MBBS', 250, NULL, NULL, NULL),
  (302, 3, 'MD General Medicine', 'MD', 80, NULL, NULL, NULL),
  (401, 4, 'BDS', 'BDS', 100, NULL, NULL, NULL),
  (402, 4, 'MDS Orthodontics', 'MDS', 10, NULL, NULL, NULL),
  (501, 5, 'BDS', 'BDS', 100, NULL, NULL, NULL),
  (601, 6, 'DNB General Medicine', 'DNB', 4, NULL, NULL, NULL),
  (602, 6, 'General Medicine', 'DNB', NULL, NULL, NULL, NULL),
  (701, 7, 'DNB Anaesthesia', 'DNB', 6, NULL, NULL, NULL),
  (702, 7, NULL, 'DNB', NULL, NULL, NULL, NULL);

INSERT INTO medical_courses (college_id, course_id, college_name, state, city, management_type, university, course_name, course_type, seats)
VALUES
  (1, 101, 'A.J. Institute of Medical Sciences', 'Karnataka', 'Mangalore', 'Private', 'RGUHS', 'MBBS', 'MBBS', 150),
  (1, 102, 'A.J. Institute of Medical Sciences', 'Karnataka', 'Mangalore', 'Private', 'RGUHS', 'MD General Medicine', 'MD', 100),
  (2, 201, 'All India Institute of Medical Sciences', 'Delhi', 'New Delhi', 'Government', 'AIIMS', 'MBBS', 'MBBS', 125),
  (2, 202, 'All India Institute of Medical Sciences', 'Delhi', 'New Delhi', 'Government', 'AIIMS', 'MD General Medicine', 'MD', 60),
  (2, 203, 'All India Institute of Medical Sciences', 'Delhi', 'New Delhi', 'Government', 'AIIMS', 'MS General Surgery', 'MS', 40),
  (3, 301, 'Kasturba Medical College', 'Karnataka', 'Manipal', 'Private', 'MAHE', 'MBBS', 'MBBS', 250),
  (3, 302, 'Kasturba Medical College', 'Karnataka', 'Manipal', 'Private', 'MAHE', 'MD General Medicine', 'MD', 80);

INSERT INTO dental_courses (college_id, course_id, college_name, state, city, management_type, university, course_name, course_type, seats)
VALUES
  (4, 401, 'Government Dental College', 'Kerala', 'Kozhikode', 'Government', 'KUHS', 'BDS', 'BDS', 100),
  (4, 402, 'Government Dental College', 'Kerala', 'Kozhikode', 'Government', 'KUHS', 'MDS Orthodontics', 'MDS', 10),
  (5, 501, 'A J Institute of Dental Sciences', 'Karnataka', 'Mangalore', 'Private', 'RGUHS', 'BDS', 'BDS', 100);

INSERT INTO dnb_courses (college_id, course_id, college_name, state, city, management_type, university, course_name, course_type, seats)
VALUES
  (6, 601, 'Narayana Hospital', 'Karnataka', 'Bangalore', 'Private', NULL, 'DNB General Medicine', 'DNB', 4),
  (6, 602, 'Narayana Hospital', 'Karnataka', 'Bangalore', 'Private', NULL, 'General Medicine', 'DNB', NULL),
  (7, 701, 'Apollo Hospital', 'Tamil Nadu', 'Chennai', 'Private', NULL, 'DNB Anaesthesia', 'DNB', 6),
  (7, 702, 'Apollo Hospital', 'Tamil Nadu', 'Chennai', 'Private', NULL, NULL, 'DNB', NULL);
"#;

/// Names that loose separator or initials matching would confuse with "AJ": an A
/// followed later by a J, an A-initial name with a J word after it, and "AJ" inside a
/// word.
pub const LOOKALIKE_SQL: &str = r#"
INSERT INTO colleges (id, name, normalized_name, state, city, type, establishment_year, management_type, university, total_courses, total_seats)
VALUES
  (8, 'Government Medical College Jammu', 'GOVERNMENT MEDICAL COLLEGE JAMMU', 'Jammu and Kashmir', 'Jammu', 'medical', 1973, 'Government', 'University of Jammu', 1, 180),
  (9, 'Apollo Jubilee Hospital', 'APOLLO JUBILEE HOSPITAL', 'Telangana', 'Hyderabad', 'dnb', NULL, 'Private', NULL, 1, 4),
  (10, 'Bajaj Hospital', 'BAJAJ HOSPITAL', 'Maharashtra', 'Pune', 'dnb', NULL, 'Private', NULL, 1, 2);

INSERT INTO courses (id, college_id, name, course_type, seats, quota_details, cutoff_ranks, fees_structure)
VALUES
  (801, 8, 'MBBS', 'MBBS', 180, NULL, NULL, NULL),
  (901, 9, 'DNB Orthopaedics', 'DNB', 4, NULL, NULL, NULL),
  (1001, 10, 'DNB Orthopaedics', 'DNB', 2, NULL, NULL, NULL);

INSERT INTO medical_courses (college_id, course_id, college_name, state, city, management_type, university, course_name, course_type, seats)
VALUES
  (8, 801, 'Government Medical College Jammu', 'Jammu and Kashmir', 'Jammu', 'Government', 'University of Jammu', 'MBBS', 'MBBS', 180);

INSERT INTO dnb_courses (college_id, course_id, college_name, state, city, management_type, university, course_name, course_type, seats)
VALUES
  (9, 901, 'Apollo Jubilee Hospital', 'Telangana', 'Hyderabad', 'Private', NULL, 'DNB Orthopaedics', 'DNB', 4),
  (10, 1001, 'Bajaj Hospital', 'Maharashtra', 'Pune', 'Private', NULL, 'DNB Orthopaedics', 'DNB', 2);
"#;

/// Seeded in-memory catalog.
#[fixture]
pub fn catalog() -> Arc<SqliteCatalog> {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    catalog
        .with_conn(|conn| {
            conn.execute_batch(SEED_SQL)?;
            Ok(())
        })
        .unwrap();
    Arc::new(catalog)
}

/// The seeded catalog plus `LOOKALIKE_SQL`.
#[fixture]
pub fn lookalike_catalog(catalog: Arc<SqliteCatalog>) -> Arc<SqliteCatalog> {
    catalog
        .with_conn(|conn| {
            conn.execute_batch(LOOKALIKE_SQL)?;
            Ok(())
        })
        .unwrap();
    catalog
}

/// Defaults, with a generous time budget so slow CI machines never see partial results.
#[fixture]
pub fn test_config() -> Config {
    Config {
        time_budget_ms: 30_000,
        ..Config::default()
    }
}

#[fixture]
pub fn metrics() -> Arc<MetricsRegistry> {
    Arc::new(MetricsRegistry::new().unwrap())
}

#[fixture]
pub fn engine(catalog: Arc<SqliteCatalog>, test_config: Config) -> SearchEngine {
    build_engine(catalog, test_config, None)
}

#[fixture]
pub fn engine_with_metrics(
    catalog: Arc<SqliteCatalog>,
    test_config: Config,
    metrics: Arc<MetricsRegistry>,
) -> (SearchEngine, Arc<MetricsRegistry>) {
    let engine = build_engine(catalog, test_config, Some(metrics.clone()));
    (engine, metrics)
}

pub fn build_engine(
    catalog: Arc<dyn CatalogSource>,
    config: Config,
    metrics: Option<Arc<MetricsRegistry>>,
) -> SearchEngine {
    SearchEngine::new(config, catalog, Lexicon::builtin(), metrics).unwrap()
}
