use lifted::{ArgumentCombinations, Condition, Problem, Quantifier, Recursion};
use streaming_iterator::StreamingIterator;

/// Replaces every quantification by the conjunction (`forall`) or disjunction (`exists`) of its
/// instances over the constants of the problem.
///
/// Nested quantifications are expanded from the inside out, so that each instance of an outer
/// quantification is already quantifier-free.
pub fn eliminate_quantifiers(condition: Condition, problem: &Problem) -> Condition {
    condition
        .traverse(
            &mut |c| match c {
                Condition::Quantified(q) => {
                    let mut instances = Vec::new();
                    let mut combinations = ArgumentCombinations::new(&q.variables, problem);
                    while let Some(args) = combinations.next() {
                        instances.push(q.condition.bind(&q.variables, args));
                    }
                    Some(match q.quantifier {
                        Quantifier::Forall => Condition::And(instances),
                        Quantifier::Exists => Condition::Or(instances),
                    })
                }
                other => Some(other),
            },
            Recursion::HeadFirst,
        )
        .unwrap_or_else(Condition::tautology)
}

/// Quantifier-free negation normal form of `condition`, in disjunctive normal form if `to_dnf` is set.
pub(crate) fn normalize(condition: Condition, problem: &Problem, to_dnf: bool) -> Condition {
    let simplified = eliminate_quantifiers(condition, problem).simplify(false);
    if to_dnf {
        simplified.dnf()
    } else {
        simplified
    }
}

/// Normalizes the preconditions and effects of operators, the conditions of derived predicates
/// and the goal. After this, the goal is stored as a single condition.
pub(crate) fn normalize_problem(mut problem: Problem, to_dnf: bool) -> Problem {
    let mut operators = std::mem::take(&mut problem.operators);
    for op in &mut operators {
        let precondition = std::mem::replace(&mut op.precondition, Condition::tautology());
        op.precondition = normalize(precondition, &problem, to_dnf);
        let effect = std::mem::replace(&mut op.effect, Condition::tautology());
        op.effect = normalize(effect, &problem, to_dnf);
    }
    let mut axioms = std::mem::take(&mut problem.axioms);
    for ax in &mut axioms {
        let condition = std::mem::replace(&mut ax.condition, Condition::tautology());
        ax.condition = normalize(condition, &problem, to_dnf);
    }
    let goal = Condition::And(std::mem::take(&mut problem.goals));
    problem.goals = vec![normalize(goal, &problem, to_dnf)];
    problem.operators = operators;
    problem.axioms = axioms;
    problem
}
