//! Timetable search engine.
//!
//! Session generation, candidate domain enumeration, randomized
//! backtracking search and multi-solution ranking.
//!
//! # Algorithm
//!
//! 1. [`generate_sessions`] expands (batch, subject) pairs into weekly
//!    sessions, hardest first.
//! 2. Each attempt walks the sessions depth-first, enumerating a
//!    [`DomainEnumerator`] domain per session, shuffling it with the
//!    attempt seed, and committing/rolling back calendars.
//! 3. [`TimetableSolver`] repeats attempts with consecutive seeds,
//!    deduplicates by signature and ranks by soft-preference score.
//!
//! # References
//!
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod domain;
mod ranking;
mod search;
mod sessions;
mod solver;

pub use domain::{resolve_window, DomainEnumerator, DomainValue};
pub use ranking::{
    normalize_scores, score, Solution, SolutionPool, PREFERENCE_BONUS, UTILIZATION_BONUS,
    UTILIZATION_THRESHOLD,
};
pub use search::AttemptOutcome;
pub use sessions::generate_sessions;
pub use solver::{TimetableProblem, TimetableSolver};
