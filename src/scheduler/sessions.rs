//! Session generation.
//!
//! Expands every (batch, subject) pair into its weekly sessions and
//! orders them hardest-first: lab sessions before theory, and within
//! each kind larger batches before smaller ones. The sort is stable, so
//! equal sessions keep batch/subject input order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{Batch, Session, Subject};

/// Generates the ordered session list.
///
/// Subjects a batch lists but that are not in `subjects` are skipped
/// with a warning.
pub fn generate_sessions<'a>(
    batches: impl IntoIterator<Item = &'a Batch>,
    subjects: &BTreeMap<String, Subject>,
) -> Vec<Session> {
    let mut sessions = Vec::new();

    for batch in batches {
        for subject_id in &batch.subjects {
            let Some(subject) = subjects.get(subject_id) else {
                warn!(batch = %batch.id, subject = %subject_id, "unknown subject, skipping");
                continue;
            };
            let is_lab = subject.is_lab();
            for occurrence in 1..=subject.sessions_per_week() {
                sessions.push(Session {
                    batch_id: batch.id.clone(),
                    subject_id: subject.id.clone(),
                    semester: batch.semester,
                    duration: subject.duration_slots,
                    batch_size: batch.strength,
                    is_lab,
                    occurrence,
                });
            }
        }
    }

    sessions.sort_by_key(|s| (Reverse(s.is_lab), Reverse(s.batch_size)));
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects() -> BTreeMap<String, Subject> {
        [
            Subject::theory("MATH", 5).with_duration(2),
            Subject::theory("PHY", 3),
            Subject::lab("CHEM_LAB", 2).with_duration(2),
        ]
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect()
    }

    #[test]
    fn test_sessions_per_subject() {
        let batch = Batch::new("B1", 1, 30).with_subject("MATH");
        let sessions = generate_sessions([&batch], &subjects());
        assert_eq!(sessions.len(), 3);
        assert!(sessions.iter().all(|s| s.duration == 2 && s.semester == 1));
        let occurrences: Vec<u32> = sessions.iter().map(|s| s.occurrence).collect();
        assert_eq!(occurrences, vec![1, 2, 3]);
    }

    #[test]
    fn test_ordering_labs_then_size() {
        let small = Batch::new("B1", 1, 20).with_subject("PHY").with_subject("CHEM_LAB");
        let large = Batch::new("B2", 1, 60).with_subject("PHY");
        let sessions = generate_sessions([&small, &large], &subjects());

        assert_eq!(sessions.len(), 1 + 3 + 3);
        assert!(sessions[0].is_lab);
        assert_eq!(sessions[0].batch_id, "B1");
        assert!(sessions[1..4].iter().all(|s| s.batch_id == "B2" && !s.is_lab));
        assert!(sessions[4..].iter().all(|s| s.batch_id == "B1" && !s.is_lab));
    }

    #[test]
    fn test_unknown_subject_skipped() {
        let batch = Batch::new("B1", 1, 30).with_subject("NOPE").with_subject("PHY");
        let sessions = generate_sessions([&batch], &subjects());
        assert_eq!(sessions.len(), 3);
        assert!(sessions.iter().all(|s| s.subject_id == "PHY"));
    }
}
