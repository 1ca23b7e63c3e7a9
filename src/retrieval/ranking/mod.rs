pub mod filter;
pub mod group;
pub mod score;

pub use filter::filter_by_course_type;
pub use group::{dedup, group, rank, CourseEntry, ResultGroup};
pub use score::{ScoreContext, ScoredResult};
