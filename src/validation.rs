//! Input validation for timetabling problems.
//!
//! Checks structural integrity of rooms, faculty, batches, subjects and
//! solver configuration before any search runs. Detects:
//! - Duplicate IDs
//! - Dangling subject, faculty, room and parent-batch references
//! - Sub-batches in a different semester than their parent
//! - Circular parent chains
//! - Subjects with no hours, zero-length sessions or zero-length lab blocks
//! - Batches no room of the needed kind can seat
//! - Unusable solver configuration
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3 (Depth-First Search)

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::SolverConfig;
use crate::scheduler::TimetableProblem;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A batch or faculty member lists a subject that doesn't exist.
    UnknownSubject,
    /// A substitute or alternate faculty ID doesn't exist.
    UnknownFaculty,
    /// A pinned room doesn't exist.
    UnknownRoom,
    /// A sub-batch names a parent that doesn't exist.
    UnknownParentBatch,
    /// A sub-batch is in a different semester than its parent.
    SemesterMismatch,
    /// Parent-batch chain contains a cycle.
    CyclicParent,
    /// Subject with `duration_slots == 0`.
    InvalidDuration,
    /// Subject with `hours_per_week == 0`.
    InvalidHours,
    /// No room of the needed kind seats the batch.
    CapacityShortfall,
    /// A shift rule names a shift the configuration doesn't define.
    UnknownShift,
    /// Solver configuration cannot produce a timetable.
    InvalidConfig,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

fn check_duplicates<'a>(
    label: &str,
    ids: impl IntoIterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a problem and its configuration.
///
/// Checks:
/// 1. No duplicate room, faculty, batch or subject IDs
/// 2. Every subject a batch or faculty member lists exists
/// 3. Substitutes, alternates and pinned rooms exist
/// 4. Parent batches exist, share the semester, and form no cycle
/// 5. Subjects have positive hours and session length, and fixed lab
///    blocks have positive length
/// 6. Every batch fits in some room of each kind it needs
/// 7. Shift rules name defined shifts
/// 8. Configuration has days, slots, a positive time limit and
///    `1 ≤ top_k ≤ max_solutions`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(problem: &TimetableProblem, config: &SolverConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let room_ids = check_duplicates(
        "room",
        problem.rooms.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    let faculty_ids = check_duplicates(
        "faculty",
        problem.faculty.iter().map(|f| f.id.as_str()),
        &mut errors,
    );
    check_duplicates(
        "batch",
        problem.batches.iter().map(|b| b.id.as_str()),
        &mut errors,
    );
    let subject_ids = check_duplicates(
        "subject",
        problem.subjects.iter().map(|s| s.id.as_str()),
        &mut errors,
    );

    // Subject references
    for batch in &problem.batches {
        for subject in &batch.subjects {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Batch '{}' references unknown subject '{subject}'", batch.id),
                ));
            }
        }
    }
    for fac in &problem.faculty {
        for subject in &fac.subjects {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Faculty '{}' references unknown subject '{subject}'", fac.id),
                ));
            }
        }
        for stand_in in fac.substitutes.values().flatten() {
            if !faculty_ids.contains(stand_in.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownFaculty,
                    format!("Faculty '{}' lists unknown substitute '{stand_in}'", fac.id),
                ));
            }
        }
    }

    // Subjects
    for subject in &problem.subjects {
        if subject.hours_per_week == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHours,
                format!("Subject '{}' has no weekly hours", subject.id),
            ));
        }
        if subject.duration_slots == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Subject '{}' has zero-length sessions", subject.id),
            ));
        }
        for alt in &subject.alternate_faculty {
            if !faculty_ids.contains(alt.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownFaculty,
                    format!("Subject '{}' lists unknown alternate faculty '{alt}'", subject.id),
                ));
            }
        }
        if let Some(room) = &subject.fixed_room {
            if !room_ids.contains(room.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRoom,
                    format!("Subject '{}' is pinned to unknown room '{room}'", subject.id),
                ));
            }
        }
    }

    // Fixed lab blocks
    let blocks = problem
        .subjects
        .iter()
        .filter_map(|s| s.fixed_lab_slot.map(|b| (format!("Subject '{}'", s.id), b)))
        .chain(problem.rooms.iter().flat_map(|r| {
            r.lab_slots
                .values()
                .map(move |b| (format!("Room '{}'", r.id), *b))
        }))
        .chain(problem.faculty.iter().flat_map(|f| {
            f.lab_slots
                .values()
                .map(move |b| (format!("Faculty '{}'", f.id), *b))
        }));
    for (owner, block) in blocks {
        if block.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("{owner} declares a zero-length fixed lab block"),
            ));
        }
    }

    // Parent batches
    let semesters: HashMap<&str, u32> = problem
        .batches
        .iter()
        .map(|b| (b.id.as_str(), b.semester))
        .collect();
    for batch in &problem.batches {
        let Some(parent) = batch.parent_batch.as_deref() else {
            continue;
        };
        match semesters.get(parent) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownParentBatch,
                format!("Batch '{}' references unknown parent '{parent}'", batch.id),
            )),
            Some(&sem) if sem != batch.semester => errors.push(ValidationError::new(
                ValidationErrorKind::SemesterMismatch,
                format!(
                    "Batch '{}' is in semester {} but parent '{parent}' is in semester {sem}",
                    batch.id, batch.semester
                ),
            )),
            Some(_) => {}
        }
    }
    if let Some(cycle_err) = detect_parent_cycles(problem) {
        errors.push(cycle_err);
    }

    // Room capacity per kind
    let subjects_by_id: HashMap<&str, bool> = problem
        .subjects
        .iter()
        .map(|s| (s.id.as_str(), s.is_lab()))
        .collect();
    for batch in &problem.batches {
        let mut needs: Vec<bool> = batch
            .subjects
            .iter()
            .filter_map(|s| subjects_by_id.get(s.as_str()).copied())
            .collect();
        needs.sort_unstable();
        needs.dedup();
        for is_lab in needs {
            let fits = problem
                .rooms
                .iter()
                .any(|r| r.suits(is_lab) && r.fits(batch.strength));
            if !fits {
                let kind = if is_lab { "lab" } else { "lecture" };
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityShortfall,
                    format!(
                        "No {kind} room seats batch '{}' ({} students)",
                        batch.id, batch.strength
                    ),
                ));
            }
        }
    }

    // Shift rules
    for batch in &problem.batches {
        if let Some(rule) = &batch.shift_rule {
            for shift in [rule.lecture.as_str(), rule.lab.as_str()] {
                if !config.shifts.contains(shift) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownShift,
                        format!("Batch '{}' uses undefined shift '{shift}'", batch.id),
                    ));
                }
            }
        }
    }

    validate_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_config(config: &SolverConfig, errors: &mut Vec<ValidationError>) {
    let mut invalid = |message: &str| {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidConfig, message))
    };
    if config.working_days.is_empty() {
        invalid("No working days configured");
    }
    if config.slots.is_empty() {
        invalid("No slots configured");
    }
    if config.max_solutions == 0 {
        invalid("max_solutions must be at least 1");
    }
    if config.top_k == 0 || config.top_k > config.max_solutions {
        invalid("top_k must be between 1 and max_solutions");
    }
    if !(config.time_limit_secs.is_finite() && config.time_limit_secs > 0.0) {
        invalid("time_limit_secs must be positive");
    }
}

/// Detects cycles in the parent-batch graph using DFS.
///
/// # Algorithm
/// Follows `child → parent` edges. Reaching a node currently on the
/// recursion stack means a back-edge, i.e. a cycle.
fn detect_parent_cycles(problem: &TimetableProblem) -> Option<ValidationError> {
    let adj: HashMap<&str, &str> = problem
        .batches
        .iter()
        .filter_map(|b| b.parent_batch.as_deref().map(|p| (b.id.as_str(), p)))
        .collect();

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for batch in &problem.batches {
        let node = batch.id.as_str();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicParent,
                format!("Circular parent chain involving batch '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, &'a str>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(&next) = adj.get(node) {
        if in_stack.contains(next) {
            return true; // Back edge → cycle
        }
        if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
            return true;
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Batch, Faculty, FixedLabSlot, Room, ShiftRule, ShiftTable, Subject};

    fn sample_problem() -> TimetableProblem {
        TimetableProblem::new()
            .with_room(Room::lecture("R1", 60))
            .with_room(Room::lab("L1", 30))
            .with_faculty(Faculty::new("F1", 16).with_subject("MATH").with_subject("PHY_LAB"))
            .with_faculty(Faculty::new("F2", 16).with_subject("MATH"))
            .with_batch(Batch::new("B1", 1, 60).with_subject("MATH"))
            .with_batch(
                Batch::new("B1-A", 1, 30)
                    .with_parent("B1")
                    .with_subject("PHY_LAB"),
            )
            .with_subject(Subject::theory("MATH", 4))
            .with_subject(Subject::lab("PHY_LAB", 2).with_duration(2).with_alternate("F2"))
    }

    fn kinds(problem: &TimetableProblem, config: &SolverConfig) -> Vec<ValidationErrorKind> {
        validate_input(problem, config)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_problem(), &SolverConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let problem = sample_problem().with_room(Room::lecture("R1", 10));
        let errors = validate_input(&problem, &SolverConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("room")));
    }

    #[test]
    fn test_unknown_references() {
        let mut problem = sample_problem()
            .with_faculty(Faculty::new("F3", 10).with_subject("ART").with_substitute("ART", "F9"))
            .with_subject(Subject::theory("HIST", 2).with_fixed_room("R9").with_alternate("F8"));
        problem.batches[0].subjects.push("GEO".into());

        let found = kinds(&problem, &SolverConfig::default());
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::UnknownSubject)
                .count(),
            2
        );
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::UnknownFaculty)
                .count(),
            2
        );
        assert!(found.contains(&ValidationErrorKind::UnknownRoom));
    }

    #[test]
    fn test_parent_batch_rules() {
        let problem = sample_problem()
            .with_batch(Batch::new("B2-A", 1, 20).with_parent("B2"))
            .with_batch(Batch::new("B1-B", 3, 20).with_parent("B1"));
        let found = kinds(&problem, &SolverConfig::default());
        assert!(found.contains(&ValidationErrorKind::UnknownParentBatch));
        assert!(found.contains(&ValidationErrorKind::SemesterMismatch));
        assert!(!found.contains(&ValidationErrorKind::CyclicParent));
    }

    #[test]
    fn test_cyclic_parent_chain() {
        // X → Y → Z → X
        let problem = TimetableProblem::new()
            .with_batch(Batch::new("X", 1, 10).with_parent("Y"))
            .with_batch(Batch::new("Y", 1, 10).with_parent("Z"))
            .with_batch(Batch::new("Z", 1, 10).with_parent("X"));
        let found = kinds(&problem, &SolverConfig::default());
        assert!(found.contains(&ValidationErrorKind::CyclicParent));
    }

    #[test]
    fn test_subject_hours_and_duration() {
        let problem = sample_problem()
            .with_subject(Subject::theory("NOHOURS", 0))
            .with_subject(Subject::theory("NOLEN", 2).with_duration(0));
        let found = kinds(&problem, &SolverConfig::default());
        assert!(found.contains(&ValidationErrorKind::InvalidHours));
        assert!(found.contains(&ValidationErrorKind::InvalidDuration));
    }

    #[test]
    fn test_zero_length_fixed_lab_blocks() {
        let problem = sample_problem()
            .with_subject(
                Subject::lab("EMPTY_LAB", 2).with_fixed_lab_slot(FixedLabSlot::new(4, 0)),
            )
            .with_room(Room::lab("L9", 60).with_lab_slot(3, FixedLabSlot::new(1, 0)))
            .with_faculty(Faculty::new("F9", 10).with_lab_slot(3, FixedLabSlot::new(2, 0)));
        let errors = validate_input(&problem, &SolverConfig::default()).unwrap_err();
        let zero_blocks: Vec<&ValidationError> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidDuration)
            .collect();
        assert_eq!(zero_blocks.len(), 3);
        assert!(zero_blocks[0].message.contains("EMPTY_LAB"));

        let sane = sample_problem()
            .with_room(Room::lab("L9", 60).with_lab_slot(3, FixedLabSlot::new(4, 2)));
        assert!(validate_input(&sane, &SolverConfig::default()).is_ok());
    }

    #[test]
    fn test_capacity_shortfall_per_kind() {
        let problem = sample_problem().with_batch(
            Batch::new("B9", 2, 45)
                .with_subject("MATH")
                .with_subject("PHY_LAB"),
        );
        let errors = validate_input(&problem, &SolverConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::CapacityShortfall);
        assert!(errors[0].message.contains("lab"));
    }

    #[test]
    fn test_shift_rules_need_defined_shifts() {
        let mut problem = sample_problem();
        problem.batches[0].shift_rule = Some(ShiftRule::new("morning", "afternoon"));

        let found = kinds(&problem, &SolverConfig::default());
        assert_eq!(found, vec![ValidationErrorKind::UnknownShift; 2]);

        let config = SolverConfig::default().with_shifts(
            ShiftTable::new()
                .with_shift("morning", [1, 2, 3])
                .with_shift("afternoon", [4, 5, 6]),
        );
        assert!(validate_input(&problem, &config).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = SolverConfig::default()
            .with_working_days(Vec::<String>::new())
            .with_slots([])
            .with_top_k(9)
            .with_time_limit_secs(0.0);
        let errors = validate_input(&TimetableProblem::new(), &config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidConfig));
    }

    #[test]
    fn test_display() {
        let err = ValidationError::new(ValidationErrorKind::UnknownRoom, "room R9");
        assert_eq!(err.to_string(), "UnknownRoom: room R9");
    }
}
