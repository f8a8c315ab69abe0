//! Academic timetabling engine for the U-Engine ecosystem.
//!
//! Assigns weekly teaching sessions (batch × subject, repeated to meet
//! the weekly load) to a room, a faculty member, a day and a start slot
//! so that no room, faculty member or batch is double-booked and every
//! hard constraint holds. Produces several distinct, ranked timetables
//! within a wall-clock budget.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Room`, `Faculty`, `Batch`, `Subject`,
//!   `Session`, `Assignment`, `Timetable`, `SlotCalendar`, `ResourceCalendar`
//! - **`evaluation`**: Placement rules and the `ConstraintEvaluator`
//! - **`scheduler`**: Session generation, domain enumeration, backtracking
//!   search, multi-solution driver and ranking
//! - **`validation`**: Input integrity checks (dangling references, parent
//!   cycles, capacity shortfall, configuration)
//! - **`config`**: `SolverConfig` (working week, budget, seeds)
//! - **`error`**: `CalendarError`, `SolverError`
//!
//! # Architecture
//!
//! Every room, faculty member and batch owns its calendar; an attempt
//! works on deep copies, so attempts share no mutable state and can run
//! in parallel. The timetable under construction is an aggregate view
//! kept in step with the calendars on every commit and rollback.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod scheduler;
pub mod validation;
