//! Rewritings of a lifted problem that prepare it for grounding.

mod costs;
mod quantifiers;
mod split;

pub use costs::{extract_action_costs, CostPatternViolation};
pub use quantifiers::eliminate_quantifiers;
pub use split::{split_operator, split_operators};

use lifted::Problem;

use crate::config::Config;

/// Applies, in order:
///  - the compilation of `total-cost` into operator costs,
///  - the elimination of quantifiers and the conversion of all conditions into negation normal
///    form (and disjunctive normal form unless disjunctions are kept),
///  - the splitting of disjunctive operators and conditional effects (in DNF only).
pub fn preprocess(problem: Problem, config: &Config) -> Problem {
    let _span = tracing::span!(tracing::Level::DEBUG, "PREPROCESSING").entered();
    let to_dnf = !config.keep_disjunctions;
    let problem = extract_action_costs(problem);
    let mut problem = quantifiers::normalize_problem(problem, to_dnf);
    if to_dnf {
        let num_lifted = problem.operators.len();
        problem.operators = split_operators(std::mem::take(&mut problem.operators));
        tracing::debug!(
            before = num_lifted,
            after = problem.operators.len(),
            "split disjunctive operators"
        );
    }
    tracing::debug!(
        operators = problem.operators.len(),
        axioms = problem.axioms.len(),
        "preprocessing done"
    );
    problem
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifted::conditions::NumericEffect;
    use lifted::{Condition, Operator, Param, TOTAL_COST};

    fn problem() -> Problem {
        let mut pb = Problem::new();
        pb.add_type("light", None);
        pb.add_object("l1", "light").unwrap();
        pb.add_object("l2", "light").unwrap();
        pb.add_predicate("on", vec![Param::new("l", "light")]).unwrap();
        pb.add_predicate("broken", vec![Param::new("l", "light")]).unwrap();
        pb.add_function(TOTAL_COST, vec![]).unwrap();

        let l = Param::new("l", "light");
        let on: Condition = pb.literal("on", vec![(&l).into()]).unwrap().into();
        let broken: Condition = pb.literal("broken", vec![(&l).into()]).unwrap().into();
        // toggle: (not (and (on ?l) (broken ?l))) -> (on ?l), costs 4
        let op = Operator::new("toggle", vec![l.clone()])
            .with_precondition(Condition::not(Condition::And(vec![on.clone(), broken])))
            .with_effect(Condition::And(vec![
                on,
                NumericEffect::increase(pb.fluent(TOTAL_COST, vec![]).unwrap(), 4).into(),
            ]));
        pb.add_operator(op).unwrap();
        pb
    }

    #[test]
    fn disjunctions_are_split() {
        let pb = preprocess(problem(), &Config::default().with_option("keep-disjunctions", "false").unwrap());
        assert_eq!(pb.operators.len(), 2);
        assert!(pb.operators.iter().all(|op| op.cost == 4));
        assert!(pb.functions.get(TOTAL_COST).is_none());
        assert_eq!(pb.operators[0].name, "toggle$1$");
        assert!(matches!(pb.operators[0].precondition, Condition::Literal(ref l) if l.negated));
    }

    #[test]
    fn disjunctions_are_kept() {
        let pb = preprocess(problem(), &Config::default().with_option("keep-disjunctions", "true").unwrap());
        assert_eq!(pb.operators.len(), 1);
        assert!(matches!(&pb.operators[0].precondition, Condition::Or(ds) if ds.len() == 2));
    }
}
