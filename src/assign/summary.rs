//! Matched / unmatched counts over an assignment run.

use serde::{Deserialize, Serialize};

use crate::domain::AssignmentResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matched points per candidate id, in order of first appearance.
    pub per_candidate: Vec<(String, usize)>,
}

pub fn summarize(results: &[AssignmentResult]) -> AssignmentSummary {
    let mut summary = AssignmentSummary {
        total: results.len(),
        ..AssignmentSummary::default()
    };

    for r in results {
        let Some(id) = r.matched_candidate_id.as_deref() else {
            summary.unmatched += 1;
            continue;
        };
        summary.matched += 1;
        match summary.per_candidate.iter_mut().find(|(c, _)| c == id) {
            Some((_, n)) => *n += 1,
            None => summary.per_candidate.push((id.to_string(), 1)),
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestPoint;

    fn matched(id: &str) -> AssignmentResult {
        AssignmentResult {
            x: 0.0,
            y: 0.0,
            matched_candidate_id: Some(id.to_string()),
            deviation: Some(0.0),
            score: Some(0.0),
        }
    }

    #[test]
    fn counts_per_candidate_in_first_seen_order() {
        let results = vec![
            matched("y42"),
            AssignmentResult::unmatched(TestPoint { x: 1.0, y: 1.0 }),
            matched("y11"),
            matched("y42"),
        ];

        let s = summarize(&results);
        assert_eq!(s.total, 4);
        assert_eq!(s.matched, 3);
        assert_eq!(s.unmatched, 1);
        assert_eq!(s.per_candidate, vec![("y42".to_string(), 2), ("y11".to_string(), 1)]);
    }

    #[test]
    fn empty_run() {
        assert_eq!(summarize(&[]), AssignmentSummary::default());
    }
}
