mod support;

use college_course_search::{
    metrics::MetricsRegistry,
    retrieval::{suggest::Suggestion, SearchEngine, SuggestFilters},
    storage::SuggestionKind,
};
use rstest::rstest;
use std::collections::HashSet;
use std::sync::Arc;
use support::fixtures::*;

fn s(kind: SuggestionKind, value: &str) -> Suggestion {
    Suggestion {
        kind,
        value: value.to_string(),
    }
}

#[rstest]
#[tokio::test]
async fn short_queries_return_nothing(engine: SearchEngine) {
    assert!(engine.suggest("m", &SuggestFilters::default()).await.is_empty());
    assert!(engine.suggest(" ", &SuggestFilters::default()).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn cities_are_deduplicated(engine: SearchEngine) {
    let out = engine.suggest("man", &SuggestFilters::default()).await;
    assert_eq!(
        out,
        vec![
            s(SuggestionKind::City, "Mangalore"),
            s(SuggestionKind::City, "Manipal"),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn colleges_come_before_courses(engine: SearchEngine) {
    let out = engine.suggest("med", &SuggestFilters::default()).await;
    assert_eq!(
        out,
        vec![
            s(SuggestionKind::College, "A.J. Institute of Medical Sciences"),
            s(SuggestionKind::College, "All India Institute of Medical Sciences"),
            s(SuggestionKind::College, "Kasturba Medical College"),
            s(SuggestionKind::Course, "DNB General Medicine"),
            s(SuggestionKind::Course, "General Medicine"),
            s(SuggestionKind::Course, "MD General Medicine"),
        ]
    );

    let capped = engine
        .suggest(
            "med",
            &SuggestFilters {
                limit: Some(4),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(capped.len(), 4);
    assert_eq!(capped[3], s(SuggestionKind::Course, "DNB General Medicine"));
}

#[rstest]
#[tokio::test]
async fn stream_filter_restricts_colleges(engine: SearchEngine) {
    let filters = SuggestFilters {
        stream: Some("dnb".into()),
        ..Default::default()
    };
    let out = engine.suggest("hosp", &filters).await;
    assert_eq!(
        out,
        vec![
            s(SuggestionKind::College, "Apollo Hospital"),
            s(SuggestionKind::College, "Narayana Hospital"),
        ]
    );

    let unknown = SuggestFilters {
        stream: Some("unani".into()),
        ..Default::default()
    };
    assert!(engine.suggest("hosp", &unknown).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn abbreviations_suggest_full_names(engine: SearchEngine) {
    let out = engine.suggest("aiims", &SuggestFilters::default()).await;
    assert!(out.contains(&s(
        SuggestionKind::College,
        "All India Institute of Medical Sciences"
    )));

    let kmc = engine.suggest("KMC", &SuggestFilters::default()).await;
    let unique: HashSet<_> = kmc.iter().collect();
    assert_eq!(unique.len(), kmc.len());
    assert!(kmc.contains(&s(SuggestionKind::College, "Kasturba Medical College")));
}

#[rstest]
#[tokio::test]
async fn ordering_is_by_category_then_value(engine: SearchEngine) {
    let out = engine
        .suggest(
            "ka",
            &SuggestFilters {
                limit: Some(50),
                ..Default::default()
            },
        )
        .await;
    assert!(!out.is_empty());
    for w in out.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        assert!(
            (a.kind.priority(), a.value.to_uppercase()) <= (b.kind.priority(), b.value.to_uppercase()),
            "{a:?} before {b:?}"
        );
    }
    assert!(out.contains(&s(SuggestionKind::State, "Karnataka")));
}

#[rstest]
#[tokio::test]
async fn suggest_duration_is_recorded(engine_with_metrics: (SearchEngine, Arc<MetricsRegistry>)) {
    let (engine, metrics) = engine_with_metrics;
    engine.suggest("man", &SuggestFilters::default()).await;
    assert_eq!(metrics.suggest_duration.get_sample_count(), 1);
}
