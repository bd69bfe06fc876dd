//! Compilation of the `total-cost` numeric fluent into constant operator costs.

use lifted::conditions::{EffectKind, IntValue};
use lifted::{Condition, Function, Problem, Recursion, Sym, TOTAL_COST};
use thiserror::Error;

/// A use of `total-cost` that prevents its compilation into operator costs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostPatternViolation {
    #[error("(total-cost) is used in the precondition of {0}")]
    InPrecondition(Sym),
    #[error("(total-cost) is modified with {kind} instead of increase in {operator}")]
    NotAnIncrease { operator: Sym, kind: EffectKind },
    #[error("(total-cost) is increased by a non-constant value in {0}")]
    NonConstantIncrease(Sym),
    #[error("(total-cost) appears in a conditional effect of {0}")]
    InConditionalEffect(Sym),
    #[error("(total-cost) appears in a quantified effect of {0}")]
    InQuantifiedEffect(Sym),
    #[error("(total-cost) is used to compute the value of another fluent in {0}")]
    InExpression(Sym),
    #[error("(total-cost) is used in {0}")]
    InCondition(Sym),
}

/// Replaces the constant increases of `total-cost` in operator effects by operator costs and
/// removes the function from the problem.
///
/// If `total-cost` is used in any other way, a warning is emitted for each violation and the
/// problem is returned unchanged: the function is kept as a regular numeric fluent.
pub fn extract_action_costs(mut problem: Problem) -> Problem {
    let Some(total_cost) = problem.functions.get(TOTAL_COST).cloned() else {
        return problem;
    };
    let costs = match operator_costs(&problem, &total_cost) {
        Ok(costs) => costs,
        Err(violations) => {
            for v in &violations {
                tracing::warn!("{v}");
            }
            tracing::warn!(
                "The ({TOTAL_COST}) function will be kept as a full-featured numeric fluent. This can affect performance."
            );
            return problem;
        }
    };

    let is_cost_effect = |c: &Condition| matches!(c, Condition::NumericEffect(e) if e.target.function == total_cost);
    for (op, cost) in problem.operators.iter_mut().zip(costs) {
        op.cost = cost;
        let effect = std::mem::replace(&mut op.effect, Condition::tautology());
        op.effect = effect
            .traverse(
                &mut |c| if is_cost_effect(&c) { None } else { Some(c) },
                Recursion::HeadFirst,
            )
            .unwrap_or_else(Condition::tautology);
    }
    problem.functions.remove(TOTAL_COST);
    problem.init_values.retain(|(fluent, _)| fluent.function != total_cost);
    tracing::debug!(operators = problem.operators.len(), "compiled ({TOTAL_COST}) into operator costs");
    problem
}

/// Cost of each operator, in order, or all violations of the supported pattern.
fn operator_costs(problem: &Problem, total_cost: &Function) -> Result<Vec<IntValue>, Vec<CostPatternViolation>> {
    let mut violations = Vec::new();
    let mut costs = Vec::with_capacity(problem.operators.len());
    for op in &problem.operators {
        if op.precondition.references_function(total_cost) {
            violations.push(CostPatternViolation::InPrecondition(op.name.clone()));
        }
        let mut cost = 0;
        accumulate(&op.effect, total_cost, &op.name, &mut cost, &mut violations);
        costs.push(cost);
    }
    for ax in &problem.axioms {
        if ax.condition.references_function(total_cost) {
            violations.push(CostPatternViolation::InCondition(ax.predicate.name.clone()));
        }
    }
    if problem.goals.iter().any(|g| g.references_function(total_cost)) {
        violations.push(CostPatternViolation::InCondition(Sym::from("goal")));
    }
    if violations.is_empty() {
        Ok(costs)
    } else {
        Err(violations)
    }
}

fn accumulate(
    effect: &Condition,
    total_cost: &Function,
    operator: &Sym,
    cost: &mut IntValue,
    violations: &mut Vec<CostPatternViolation>,
) {
    match effect {
        Condition::NumericEffect(e) if e.target.function.as_ref() == total_cost => {
            if e.kind != EffectKind::Increase {
                violations.push(CostPatternViolation::NotAnIncrease {
                    operator: operator.clone(),
                    kind: e.kind,
                })
            } else if let Some(amount) = e.value.as_constant() {
                *cost = cost.saturating_add(amount);
            } else {
                violations.push(CostPatternViolation::NonConstantIncrease(operator.clone()))
            }
        }
        Condition::NumericEffect(e) if e.references_function(total_cost) => {
            violations.push(CostPatternViolation::InExpression(operator.clone()))
        }
        Condition::And(cs) => {
            for c in cs {
                accumulate(c, total_cost, operator, cost, violations);
            }
        }
        Condition::When(_) if effect.references_function(total_cost) => {
            violations.push(CostPatternViolation::InConditionalEffect(operator.clone()))
        }
        Condition::Quantified(_) if effect.references_function(total_cost) => {
            violations.push(CostPatternViolation::InQuantifiedEffect(operator.clone()))
        }
        _ => {}
    }
}
