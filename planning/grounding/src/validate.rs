//! Replay of a plan against a ground problem.

use thiserror::Error;

use crate::ground::GroundProblem;
use crate::plan::Plan;

/// Reason for which a plan does not solve a problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The action at position `step` (starting at 1) is not applicable in the state reached by the
    /// previous actions.
    #[error("action {action} at step {step} is not applicable in state {state}")]
    Inapplicable { step: usize, action: String, state: String },
    #[error("the goal does not hold after the {steps} steps of the plan, final state: {state}")]
    GoalNotSatisfied { steps: usize, state: String },
}

/// Applies the actions of `plan` in sequence from the initial state and checks that each is
/// applicable and that the final state satisfies the goal.
pub fn validate(problem: &GroundProblem, plan: &Plan) -> Result<(), ValidationError> {
    let mut state = problem.initial_state().clone();
    for (i, action) in plan.iter().enumerate() {
        if !action.is_applicable(&state) {
            return Err(ValidationError::Inapplicable {
                step: i + 1,
                action: action.to_string(),
                state: problem.display_state(&state).to_string(),
            });
        }
        state = problem.successor(&state, action);
    }
    if problem.is_goal(&state) {
        Ok(())
    } else {
        Err(ValidationError::GoalNotSatisfied {
            steps: plan.len(),
            state: problem.display_state(&state).to_string(),
        })
    }
}

/// Returns true if `plan` solves `problem`. Otherwise, the reason is logged as a warning.
pub fn plan_is_valid(problem: &GroundProblem, plan: &Plan) -> bool {
    match validate(problem, plan) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("invalid plan: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroundingStrategy;
    use crate::ground::{ground, Action};
    use lifted::{Condition, Operator, Param, Problem};

    /// Switches `s1` and `s2` must both be on. Switching `s2` on requires `s1` to be on.
    fn switches() -> GroundProblem {
        let mut pb = Problem::new();
        pb.add_type("switch", None);
        pb.add_object("s1", "switch").unwrap();
        pb.add_object("s2", "switch").unwrap();
        let s = Param::new("s", "switch");
        pb.add_predicate("on", vec![s.clone()]).unwrap();
        let s1 = pb.object("s1").unwrap();
        let s2 = pb.object("s2").unwrap();
        let on_s1: Condition = pb.literal("on", vec![s1.clone()]).unwrap().into();
        let on_s2: Condition = pb.literal("on", vec![s2]).unwrap().into();
        pb.add_operator(Operator::new("first", vec![]).with_effect(on_s1.clone()))
            .unwrap();
        pb.add_operator(
            Operator::new("second", vec![])
                .with_precondition(on_s1.clone())
                .with_effect(on_s2.clone()),
        )
        .unwrap();
        pb.add_goal(Condition::And(vec![on_s1, on_s2])).unwrap();
        ground(&pb, GroundingStrategy::Naive).unwrap()
    }

    fn action<'a>(problem: &'a GroundProblem, name: &str) -> &'a Action {
        problem.actions.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn valid_plan() {
        let pb = switches();
        let plan = Plan::new(vec![action(&pb, "first").clone(), action(&pb, "second").clone()]);
        assert_eq!(validate(&pb, &plan), Ok(()));
        assert!(plan_is_valid(&pb, &plan));
    }

    #[test]
    fn inapplicable_action() {
        let pb = switches();
        let plan = Plan::new(vec![action(&pb, "second").clone(), action(&pb, "first").clone()]);
        assert!(matches!(
            validate(&pb, &plan),
            Err(ValidationError::Inapplicable { step: 1, ref action, .. }) if action == "(second)"
        ));
        assert!(!plan_is_valid(&pb, &plan));
    }

    #[test]
    fn unsatisfied_goal() {
        let pb = switches();
        let plan = Plan::new(vec![action(&pb, "first").clone()]);
        assert_eq!(
            validate(&pb, &plan),
            Err(ValidationError::GoalNotSatisfied {
                steps: 1,
                state: "{(on s1)}".to_string()
            })
        );
        assert!(matches!(
            validate(&pb, &Plan::default()),
            Err(ValidationError::GoalNotSatisfied { steps: 0, .. })
        ));
    }
}
