pub mod cache;
pub mod fanout;
pub mod query;
pub mod ranking;
pub mod strategy;
pub mod suggest;
pub mod variations;

use crate::{
    config::Config,
    lexicon::Lexicon,
    metrics::MetricsRegistry,
    retrieval::{
        cache::TtlCache,
        fanout::{fan_out, FanoutRequest},
        query::{analyze, Intent},
        ranking::{dedup, filter_by_course_type, group, rank, ResultGroup, ScoreContext, ScoredResult},
        strategy::{default_strategies, Constraints, RetrievalStrategy},
        suggest::{AutoCompleteSuggester, Suggestion},
        variations::VariationGenerator,
    },
    storage::{CatalogSource, CollegeRecord, CourseRecord, Partition, SqliteCatalog},
    text::normalize_query,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};

pub const ERR_QUERY_REQUIRED: &str = "Query parameter is required";
pub const ERR_SEARCH_FAILED: &str = "Search failed";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub stream: Option<String>,
    pub course: Option<String>,
    pub state: Option<String>,
    pub limit: Option<usize>,
}

impl SearchFilters {
    fn stream(&self) -> Option<&str> {
        non_blank(&self.stream)
    }

    fn course(&self) -> Option<&str> {
        non_blank(&self.course)
    }

    fn state(&self) -> Option<&str> {
        non_blank(&self.state)
    }

    fn has_constraints(&self) -> bool {
        self.stream().is_some() || self.course().is_some() || self.state().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestFilters {
    pub stream: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<ScoredResult>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub partial: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSearchResponse {
    pub grouped_results: Vec<ResultGroup>,
    pub total_groups: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    pub stream: Partition,
    pub courses: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeDetails {
    #[serde(flatten)]
    pub college: CollegeRecord,
    pub courses: Vec<CourseRecord>,
}

/// Everything a search needs, derived from the query and filters before any read.
#[derive(Debug)]
struct SearchPlan {
    query: String,
    intent: Intent,
    variants: Vec<String>,
    partitions: Vec<Partition>,
    constraints: Constraints,
    limit: usize,
    broad: bool,
}

/// Ranked, deduplicated results of one search before truncation.
struct Ranked {
    results: Vec<ScoredResult>,
    partial: bool,
    error: Option<String>,
}

pub struct SearchEngine {
    config: Arc<Config>,
    catalog: Arc<dyn CatalogSource>,
    lexicon: Arc<Lexicon>,
    strategies: Arc<Vec<Box<dyn RetrievalStrategy>>>,
    suggester: AutoCompleteSuggester,
    metrics: Option<Arc<MetricsRegistry>>,
    states: TtlCache<Vec<String>>,
    streams: TtlCache<Vec<StreamSummary>>,
}

impl SearchEngine {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogSource>,
        lexicon: Lexicon,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Result<Self> {
        config.validate()?;
        let lexicon = Arc::new(lexicon);
        let suggester = AutoCompleteSuggester::new(
            catalog.clone(),
            lexicon.clone(),
            config.suggest_category_limit,
        );
        let ttl = config.reference_cache_ttl();
        Ok(Self {
            config: Arc::new(config),
            catalog,
            lexicon,
            strategies: Arc::new(default_strategies()),
            suggester,
            metrics,
            states: TtlCache::new(ttl),
            streams: TtlCache::new(ttl),
        })
    }

    /// Open the configured catalog and lexicon.
    pub fn from_config(config: Config, metrics: Option<Arc<MetricsRegistry>>) -> Result<Self> {
        let catalog = SqliteCatalog::open(&config.catalog_db_path, config.catalog_pool_size)?;
        let lexicon = Lexicon::load(config.lexicon_path.as_deref())?;
        tracing::info!(
            db = %config.catalog_db_path.display(),
            pool = catalog.pool_size(),
            "Catalog opened"
        );
        Self::new(config, Arc::new(catalog), lexicon, metrics)
    }

    /// Replace the strategy list; order is the short-circuit order.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn RetrievalStrategy>>) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub async fn search(&self, query: &str, filters: &SearchFilters) -> SearchResponse {
        let started = Instant::now();
        let plan = match self.plan(query, filters) {
            Ok(plan) => plan,
            Err(message) => {
                self.record_error();
                return SearchResponse {
                    error: Some(message),
                    ..Default::default()
                };
            }
        };

        let ranked = self.run(&plan).await;
        let total = ranked.results.len();
        let mut data = ranked.results;
        data.truncate(plan.limit);

        self.record_search(started, data.len(), ranked.partial, ranked.error.is_some());
        tracing::info!(
            query = %plan.query,
            broad = plan.broad,
            variants = plan.variants.len(),
            total,
            returned = data.len(),
            partial = ranked.partial,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search completed"
        );

        SearchResponse {
            data,
            total,
            error: ranked.error,
            partial: ranked.partial,
        }
    }

    pub async fn search_grouped(&self, query: &str, filters: &SearchFilters) -> GroupedSearchResponse {
        let started = Instant::now();
        let plan = match self.plan(query, filters) {
            Ok(plan) => plan,
            Err(message) => {
                self.record_error();
                return GroupedSearchResponse {
                    error: Some(message),
                    ..Default::default()
                };
            }
        };

        let ranked = self.run(&plan).await;
        let mut groups = group(&ranked.results);
        let total_groups = groups.len();
        groups.truncate(plan.limit);

        let returned: usize = groups.iter().map(|g| g.courses.len()).sum();
        self.record_search(started, returned, ranked.partial, ranked.error.is_some());
        tracing::info!(
            query = %plan.query,
            broad = plan.broad,
            total_groups,
            returned = groups.len(),
            partial = ranked.partial,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Grouped search completed"
        );

        GroupedSearchResponse {
            grouped_results: groups,
            total_groups,
            error: ranked.error,
            partial: ranked.partial,
        }
    }

    pub async fn suggest(&self, query: &str, filters: &SuggestFilters) -> Vec<Suggestion> {
        let started = Instant::now();
        let stream = match non_blank(&filters.stream) {
            None => None,
            Some(raw) => match Partition::parse(raw) {
                Some(p) => Some(p),
                None => {
                    tracing::info!(stream = raw, "Unknown stream; no suggestions");
                    return Vec::new();
                }
            },
        };
        let limit = filters.limit.unwrap_or(self.config.suggest_default_limit);
        let out = self.suggester.suggest(query, stream, limit).await;
        if let Some(m) = &self.metrics {
            m.suggest_duration.observe(started.elapsed().as_secs_f64());
        }
        out
    }

    /// Distinct college states, from the reference cache when fresh.
    pub async fn available_states(&self) -> Result<Vec<String>> {
        if let Some(states) = self.states.get() {
            return Ok(states);
        }
        let catalog = self.catalog.clone();
        let states = tokio::task::spawn_blocking(move || catalog.distinct_states())
            .await
            .context("Join error loading states")??;
        self.states.insert(states.clone());
        self.record_cache_refresh();
        Ok(states)
    }

    /// Streams that have at least one course row.
    pub async fn available_streams(&self) -> Result<Vec<StreamSummary>> {
        if let Some(streams) = self.streams.get() {
            return Ok(streams);
        }
        let catalog = self.catalog.clone();
        let counts = tokio::task::spawn_blocking(move || catalog.partition_row_counts())
            .await
            .context("Join error loading streams")??;
        let streams: Vec<StreamSummary> = counts
            .into_iter()
            .filter(|(_, courses)| *courses > 0)
            .map(|(stream, courses)| StreamSummary { stream, courses })
            .collect();
        self.streams.insert(streams.clone());
        self.record_cache_refresh();
        Ok(streams)
    }

    pub async fn college_details(&self, id: i64) -> Result<Option<CollegeDetails>> {
        let catalog = self.catalog.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<CollegeDetails>> {
            let Some(college) = catalog.college_by_id(id)? else {
                return Ok(None);
            };
            let courses = catalog.courses_for_college(id)?;
            Ok(Some(CollegeDetails { college, courses }))
        })
        .await
        .context("Join error loading college details")?
    }

    fn plan(&self, query: &str, filters: &SearchFilters) -> std::result::Result<SearchPlan, String> {
        let normalized = normalize_query(query);
        if normalized.is_empty() && !filters.has_constraints() {
            return Err(ERR_QUERY_REQUIRED.to_string());
        }

        let intent = analyze(&normalized, &self.lexicon);
        let broad = normalized.is_empty() || intent.is_broad();

        let partitions = self.partitions_for(filters.stream(), &intent);
        let state = self.state_for(filters.state(), &intent);
        let course = filters.course().map(normalize_query);

        let limit = filters.limit.filter(|l| *l > 0).unwrap_or(if broad {
            self.config.broad_limit
        } else {
            self.config.default_limit
        });

        let variants = if broad {
            vec![String::new()]
        } else {
            let generator = VariationGenerator::new(&self.lexicon, self.config.max_variants);
            if intent.residual.is_empty() || intent.residual == normalized {
                generator.generate(&normalized)
            } else {
                generator.generate_all(&[normalized.as_str(), intent.residual.as_str()])
            }
        };

        let (partitions, state) = match state {
            StateConstraint::Conflict => (Vec::new(), None),
            StateConstraint::Some(s) => (partitions, Some(s)),
            StateConstraint::None => (partitions, None),
        };

        let row_limit = if broad {
            self.config.broad_limit.max(limit)
        } else {
            self.config.strategy_row_limit
        };

        Ok(SearchPlan {
            query: normalized,
            intent,
            variants,
            partitions,
            constraints: Constraints {
                course,
                state,
                row_limit,
            },
            limit,
            broad,
        })
    }

    /// Stream filter intersected with the partition implied by a detected course type.
    fn partitions_for(&self, stream: Option<&str>, intent: &Intent) -> Vec<Partition> {
        let wanted = match stream {
            None => None,
            Some(raw) => match Partition::parse(raw) {
                Some(p) => Some(p),
                None => {
                    tracing::info!(stream = raw, "Unknown stream; no partitions selected");
                    return Vec::new();
                }
            },
        };
        let implied = intent.course_type.map(|ct| ct.partition());
        Partition::ALL
            .into_iter()
            .filter(|p| wanted.map_or(true, |w| w == *p))
            .filter(|p| implied.map_or(true, |i| i == *p))
            .collect()
    }

    fn state_for(&self, filter: Option<&str>, intent: &Intent) -> StateConstraint {
        let filter = filter.map(|raw| {
            let normalized = normalize_query(raw);
            self.lexicon
                .canonical_state(&normalized)
                .map(str::to_string)
                .unwrap_or(normalized)
        });
        match (filter, &intent.state) {
            (Some(f), Some(i)) if f != *i => {
                tracing::info!(filter = %f, query_state = %i, "State filter contradicts query");
                StateConstraint::Conflict
            }
            (Some(f), _) => StateConstraint::Some(f),
            (None, Some(i)) => StateConstraint::Some(i.clone()),
            (None, None) => StateConstraint::None,
        }
    }

    async fn run(&self, plan: &SearchPlan) -> Ranked {
        if plan.partitions.is_empty() || plan.variants.is_empty() {
            return Ranked {
                results: Vec::new(),
                partial: false,
                error: None,
            };
        }

        let outcome = fan_out(
            self.catalog.clone(),
            self.strategies.clone(),
            FanoutRequest {
                variants: plan.variants.clone(),
                partitions: plan.partitions.clone(),
                constraints: plan.constraints.clone(),
                short_circuit: self.config.short_circuit,
                budget: self.config.time_budget(),
            },
        )
        .await;

        if let Some(m) = &self.metrics {
            m.catalog_unit_failures_total.inc_by(outcome.failed_units as f64);
        }
        if outcome.all_failed() {
            tracing::warn!(units = outcome.units, "Every catalog read failed");
            return Ranked {
                results: Vec::new(),
                partial: outcome.partial,
                error: Some(ERR_SEARCH_FAILED.to_string()),
            };
        }

        let candidates = filter_by_course_type(outcome.candidates, plan.intent.course_type);
        let ctx = ScoreContext::new(
            &plan.query,
            plan.constraints.state.as_deref(),
            plan.constraints.course.as_deref(),
            plan.intent.course_type,
        );
        let scored = candidates.iter().map(|c| ctx.score(c)).collect();
        let mut results = dedup(scored);
        rank(&mut results);

        Ranked {
            results,
            partial: outcome.partial,
            error: None,
        }
    }

    fn record_search(&self, started: Instant, returned: usize, partial: bool, failed: bool) {
        let Some(m) = &self.metrics else {
            return;
        };
        m.search_duration.observe(started.elapsed().as_secs_f64());
        m.search_results_total.inc_by(returned as f64);
        if partial {
            m.search_partial_total.inc();
        }
        if failed {
            m.search_errors_total.inc();
        }
    }

    fn record_error(&self) {
        if let Some(m) = &self.metrics {
            m.search_errors_total.inc();
        }
    }

    fn record_cache_refresh(&self) {
        if let Some(m) = &self.metrics {
            m.reference_cache_refreshes_total.inc();
        }
    }
}

enum StateConstraint {
    None,
    Some(String),
    Conflict,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
