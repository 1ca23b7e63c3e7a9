use crate::retrieval::fanout::Candidate;
use crate::retrieval::query::{detect_course_type, CourseType};

/// Keep only candidates whose course belongs to `course_type`. Course names that carry
/// no recognizable code ("General Medicine") are judged by their course-type column.
pub fn filter_by_course_type(
    candidates: Vec<Candidate>,
    course_type: Option<CourseType>,
) -> Vec<Candidate> {
    let Some(course_type) = course_type else {
        return candidates;
    };
    candidates
        .into_iter()
        .filter(|c| {
            let name = c.row.course_name.trim();
            if detect_course_type(name).is_some() {
                course_type.matches_course(name)
            } else {
                course_type.matches_course(c.row.course_type.trim())
            }
        })
        .collect()
}
