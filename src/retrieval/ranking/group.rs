use crate::retrieval::ranking::score::ScoredResult;
use crate::retrieval::strategy::StrategyKind;
use crate::storage::Partition;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    pub course_id: i64,
    pub course_name: String,
    pub course_type: String,
    pub seats: u32,
    pub score: u32,
    pub strategy: StrategyKind,
}

/// One college card. `total_seats` is always the sum over `courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultGroup {
    pub college_id: i64,
    pub college_name: String,
    #[serde(rename = "type")]
    pub college_type: Partition,
    pub state: String,
    pub city: String,
    pub management_type: String,
    pub university: String,
    pub courses: Vec<CourseEntry>,
    pub total_seats: u64,
    /// Highest course score in the group.
    pub score: u32,
}

/// Collapse duplicate (college, course) keys, keeping the highest score. On equal
/// scores the first occurrence wins; output keeps first-occurrence order.
pub fn dedup(results: Vec<ScoredResult>) -> Vec<ScoredResult> {
    let mut best: IndexMap<(i64, i64), ScoredResult> = IndexMap::new();
    for result in results {
        match best.entry((result.college_id, result.course_id)) {
            Entry::Occupied(mut slot) => {
                if result.score > slot.get().score {
                    slot.insert(result);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
        }
    }
    best.into_values().collect()
}

/// Score descending, then name and ids so equal scores still order deterministically.
pub fn rank(results: &mut [ScoredResult]) {
    results.sort_by(compare);
}

fn compare(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.college_name.cmp(&b.college_name))
        .then_with(|| a.college_id.cmp(&b.college_id))
        .then_with(|| a.course_id.cmp(&b.course_id))
}

/// Group by college in first-encountered order, then stable-sort groups by score.
pub fn group(results: &[ScoredResult]) -> Vec<ResultGroup> {
    let mut groups: IndexMap<i64, ResultGroup> = IndexMap::new();
    for r in results {
        let group = groups.entry(r.college_id).or_insert_with(|| ResultGroup {
            college_id: r.college_id,
            college_name: r.college_name.clone(),
            college_type: r.college_type,
            state: r.state.clone(),
            city: r.city.clone(),
            management_type: r.management_type.clone(),
            university: r.university.clone(),
            courses: Vec::new(),
            total_seats: 0,
            score: 0,
        });
        group.courses.push(CourseEntry {
            course_id: r.course_id,
            course_name: r.course_name.clone(),
            course_type: r.course_type.clone(),
            seats: r.seats,
            score: r.score,
            strategy: r.strategy,
        });
        group.total_seats += u64::from(r.seats);
        group.score = group.score.max(r.score);
    }

    let mut out: Vec<ResultGroup> = groups.into_values().collect();
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}
