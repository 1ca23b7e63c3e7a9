//! Scatter/gather over (variant, partition) units.
//!
//! Every unit is an independent blocking read sequence run on the blocking pool. Units
//! that fail are logged and skipped; when the time budget expires the outcome holds
//! whatever finished and is flagged partial. A read already in flight cannot be
//! interrupted, so expiry also raises a flag that stops units before their next read
//! and frees their pooled connection. Candidates are reassembled in unit order
//! so the merge is deterministic regardless of completion order.

use crate::retrieval::strategy::{Constraints, RetrievalStrategy, StrategyKind};
use crate::storage::{CatalogRow, CatalogSource, Partition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

/// A catalog row tagged with the strategy and variant that surfaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub row: CatalogRow,
    pub strategy: StrategyKind,
    pub variant: String,
}

#[derive(Debug, Clone)]
pub struct FanoutRequest {
    pub variants: Vec<String>,
    pub partitions: Vec<Partition>,
    pub constraints: Constraints,
    pub short_circuit: bool,
    pub budget: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct FanoutOutcome {
    pub candidates: Vec<Candidate>,
    pub units: usize,
    pub completed_units: usize,
    pub failed_units: usize,
    pub partial: bool,
}

impl FanoutOutcome {
    /// Every unit ran and none of them managed a single successful read.
    pub fn all_failed(&self) -> bool {
        self.units > 0 && self.failed_units == self.units
    }
}

struct UnitResult {
    candidates: Vec<Candidate>,
    failed: bool,
}

pub async fn fan_out(
    catalog: Arc<dyn CatalogSource>,
    strategies: Arc<Vec<Box<dyn RetrievalStrategy>>>,
    request: FanoutRequest,
) -> FanoutOutcome {
    let deadline = request.budget.map(|b| Instant::now() + b);
    let constraints = Arc::new(request.constraints);
    let short_circuit = request.short_circuit;
    let cancelled = Arc::new(AtomicBool::new(false));

    let mut set = JoinSet::new();
    let mut units = 0usize;
    for variant in &request.variants {
        for &partition in &request.partitions {
            let index = units;
            units += 1;
            let catalog = catalog.clone();
            let strategies = strategies.clone();
            let constraints = constraints.clone();
            let variant = variant.clone();
            let cancelled = cancelled.clone();
            set.spawn_blocking(move || {
                let result = run_unit(
                    catalog.as_ref(),
                    strategies.as_slice(),
                    partition,
                    &variant,
                    &constraints,
                    short_circuit,
                    &cancelled,
                );
                (index, result)
            });
        }
    }

    let mut finished: Vec<(usize, UnitResult)> = Vec::with_capacity(units);
    let mut failed_units = 0usize;
    let mut partial = false;
    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, set.join_next()).await {
                Ok(next) => next,
                Err(_) => {
                    partial = true;
                    cancelled.store(true, Ordering::Relaxed);
                    tracing::warn!(
                        units,
                        completed = finished.len(),
                        "Search time budget expired; returning partial results"
                    );
                    set.abort_all();
                    break;
                }
            },
            None => set.join_next().await,
        };
        let Some(joined) = next else {
            break;
        };
        match joined {
            Ok((index, result)) => {
                if result.failed {
                    failed_units += 1;
                }
                finished.push((index, result));
            }
            Err(err) => {
                failed_units += 1;
                tracing::warn!(error = %err, "Fan-out unit did not complete");
            }
        }
    }

    finished.sort_by_key(|(index, _)| *index);
    let completed_units = finished.len();
    let candidates = finished
        .into_iter()
        .flat_map(|(_, result)| result.candidates)
        .collect();

    FanoutOutcome {
        candidates,
        units,
        completed_units,
        failed_units,
        partial,
    }
}

/// Strategies run in order for one (variant, partition). With short-circuiting, the
/// first strategy that matches the partition ends the unit. Whether it "matches" is
/// decided without the constraints, so adding a filter never changes which strategies
/// run, only which of their rows survive.
fn run_unit(
    catalog: &dyn CatalogSource,
    strategies: &[Box<dyn RetrievalStrategy>],
    partition: Partition,
    variant: &str,
    constraints: &Constraints,
    short_circuit: bool,
    cancelled: &AtomicBool,
) -> UnitResult {
    let mut candidates = Vec::new();
    let mut attempted = 0usize;
    let mut failures = 0usize;

    for strategy in strategies {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        if strategy.predicates(variant).is_none() {
            continue;
        }
        attempted += 1;
        let kind = strategy.kind();
        let rows = match strategy.retrieve(catalog, partition, variant, constraints) {
            Ok(rows) => rows,
            Err(err) => {
                failures += 1;
                tracing::warn!(
                    partition = partition.as_str(),
                    strategy = kind.as_str(),
                    variant,
                    error = %err,
                    "Catalog read failed; skipping"
                );
                continue;
            }
        };
        tracing::debug!(
            partition = partition.as_str(),
            strategy = kind.as_str(),
            variant,
            rows = rows.len(),
            "Strategy read"
        );

        let matched = !rows.is_empty();
        candidates.extend(rows.into_iter().map(|row| Candidate {
            row,
            strategy: kind,
            variant: variant.to_string(),
        }));

        if !short_circuit {
            continue;
        }
        if matched || unconstrained_match(catalog, strategy.as_ref(), partition, variant, constraints) {
            break;
        }
    }

    UnitResult {
        candidates,
        failed: attempted > 0 && failures == attempted,
    }
}

fn unconstrained_match(
    catalog: &dyn CatalogSource,
    strategy: &dyn RetrievalStrategy,
    partition: Partition,
    variant: &str,
    constraints: &Constraints,
) -> bool {
    if constraints.course.is_none() && constraints.state.is_none() {
        return false;
    }
    let Some(any_of) = strategy.predicates(variant) else {
        return false;
    };
    let probe = constraints.row_query(any_of).unconstrained();
    match catalog.partition_has_match(partition, &probe) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(
                partition = partition.as_str(),
                error = %err,
                "Short-circuit probe failed"
            );
            false
        }
    }
}
