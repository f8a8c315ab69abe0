//! Constraint evaluator.
//!
//! Composes placement rules and answers feasibility queries for a
//! candidate. Rules are checked in insertion order; the first failing
//! rule short-circuits.

use std::sync::Arc;

use super::rules::{
    Blackout, DailyHourCap, FixedPinning, NoClash, RoomCapacity, RoomKindMatch, ShiftCompliance,
    SubjectEligibility, Target, WeeklyHourCap, WithinWindow, WorkingWeek,
};
use super::{EvaluationContext, Placement, PlacementRule, RuleScope};

/// A composable set of hard placement rules.
///
/// # Example
/// ```
/// use u_timetable::evaluation::ConstraintEvaluator;
///
/// let evaluator = ConstraintEvaluator::standard();
/// assert!(evaluator.rule_names().contains(&"NO_CLASH_ROOM"));
/// ```
#[derive(Clone, Default)]
pub struct ConstraintEvaluator {
    rules: Vec<Arc<dyn PlacementRule>>,
}

impl ConstraintEvaluator {
    /// Creates an empty evaluator (accepts everything).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Every built-in rule, cheap checks first.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(RoomKindMatch)
            .with_rule(RoomCapacity)
            .with_rule(WorkingWeek)
            .with_rule(FixedPinning)
            .with_rule(ShiftCompliance)
            .with_rule(WithinWindow(Target::Room))
            .with_rule(WithinWindow(Target::Batch))
            .with_rule(Blackout(Target::Room))
            .with_rule(Blackout(Target::Batch))
            .with_rule(NoClash(Target::Room))
            .with_rule(NoClash(Target::Batch))
            .with_rule(DailyHourCap(Target::Batch))
            .with_rule(WeeklyHourCap(Target::Batch))
            .with_rule(SubjectEligibility)
            .with_rule(WithinWindow(Target::Faculty))
            .with_rule(Blackout(Target::Faculty))
            .with_rule(NoClash(Target::Faculty))
            .with_rule(DailyHourCap(Target::Faculty))
            .with_rule(WeeklyHourCap(Target::Faculty))
    }

    /// Adds a rule.
    pub fn with_rule<R: PlacementRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Name of the first rule the placement breaks.
    pub fn first_violation(
        &self,
        placement: &Placement<'_>,
        context: &EvaluationContext,
    ) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| !r.check(placement, context))
            .map(|r| r.name())
    }

    /// Whether every rule passes.
    pub fn is_feasible(&self, placement: &Placement<'_>, context: &EvaluationContext) -> bool {
        self.first_violation(placement, context).is_none()
    }

    /// Whether every rule of `scope` passes.
    pub fn check_scope(
        &self,
        placement: &Placement<'_>,
        context: &EvaluationContext,
        scope: RuleScope,
    ) -> bool {
        self.rules
            .iter()
            .filter(|r| r.scope() == scope)
            .all(|r| r.check(placement, context))
    }

    /// Names of every rule the placement breaks.
    pub fn violations(
        &self,
        placement: &Placement<'_>,
        context: &EvaluationContext,
    ) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| !r.check(placement, context))
            .map(|r| r.name())
            .collect()
    }

    /// Names of the composed rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for ConstraintEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintEvaluator")
            .field("rules", &self.rule_names())
            .finish()
    }
}
