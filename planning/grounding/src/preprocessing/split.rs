//! Removal of disjunctions from operators in disjunctive normal form.

use lifted::conditions::ConditionalEffect;
use lifted::{Condition, Operator, Sym};

/// Splits every operator whose precondition is a disjunction into one operator per disjunct, and
/// every conditional effect whose prerequisite is a disjunction into one conditional effect per
/// disjunct.
///
/// The `i`-th operator obtained from `op` is named `op$i$` (starting at 1). Operators whose
/// precondition is not a disjunction keep their name.
pub fn split_operators(operators: Vec<Operator>) -> Vec<Operator> {
    operators.into_iter().flat_map(split_operator).collect()
}

pub fn split_operator(mut operator: Operator) -> Vec<Operator> {
    let effect = std::mem::replace(&mut operator.effect, Condition::tautology());
    operator.effect = split_effect(effect);
    match std::mem::replace(&mut operator.precondition, Condition::tautology()) {
        Condition::Or(disjuncts) => disjuncts
            .into_iter()
            .enumerate()
            .map(|(i, disjunct)| Operator {
                name: Sym::from(format!("{}${}$", operator.name, i + 1)),
                parameters: operator.parameters.clone(),
                precondition: disjunct,
                effect: operator.effect.clone(),
                cost: operator.cost,
            })
            .collect(),
        precondition => {
            operator.precondition = precondition;
            vec![operator]
        }
    }
}

/// Splits the disjunctive prerequisites of the conditional effects, either at the top-level of the
/// effect or directly under its top-level conjunction.
fn split_effect(effect: Condition) -> Condition {
    match effect {
        Condition::When(w) => {
            let mut parts = split_conditional(w);
            match parts.len() {
                1 => parts.swap_remove(0),
                _ => Condition::And(parts),
            }
        }
        Condition::And(cs) => Condition::And(
            cs.into_iter()
                .flat_map(|c| match c {
                    Condition::When(w) => split_conditional(w),
                    other => vec![other],
                })
                .collect(),
        ),
        other => other,
    }
}

fn split_conditional(w: ConditionalEffect) -> Vec<Condition> {
    let consequence = *w.consequence;
    match *w.prerequisite {
        Condition::Or(disjuncts) => disjuncts
            .into_iter()
            .map(|d| Condition::when(d, consequence.clone()))
            .collect(),
        prerequisite => vec![Condition::when(prerequisite, consequence)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifted::{Param, Problem};

    fn problem() -> Problem {
        let mut pb = Problem::new();
        pb.add_type("room", None);
        pb.add_object("r1", "room").unwrap();
        pb.add_object("r2", "room").unwrap();
        for p in ["lit", "dark", "open"] {
            pb.add_predicate(p, vec![Param::new("r", "room")]).unwrap();
        }
        pb
    }

    fn lit(pb: &Problem, pred: &str, room: &Param) -> Condition {
        pb.literal(pred, vec![room.into()]).unwrap().into()
    }

    #[test]
    fn disjunctive_precondition() {
        let pb = problem();
        let r = Param::new("r", "room");
        let op = Operator::new("enter", vec![r.clone()])
            .with_precondition(Condition::Or(vec![
                lit(&pb, "lit", &r),
                lit(&pb, "open", &r),
                lit(&pb, "dark", &r),
            ]))
            .with_effect(lit(&pb, "open", &r))
            .with_cost(2);
        let ops = split_operator(op);
        let names: Vec<String> = ops.iter().map(|o| o.name.to_string()).collect();
        assert_eq!(names, ["enter$1$", "enter$2$", "enter$3$"]);
        assert_eq!(ops[1].precondition, lit(&pb, "open", &r));
        assert!(ops.iter().all(|o| o.cost == 2 && o.effect == lit(&pb, "open", &r)));
    }

    #[test]
    fn conjunctive_precondition_is_kept() {
        let pb = problem();
        let r = Param::new("r", "room");
        let pre = Condition::And(vec![lit(&pb, "lit", &r), lit(&pb, "open", &r)]);
        let op = Operator::new("enter", vec![r.clone()]).with_precondition(pre.clone());
        let ops = split_operators(vec![op.clone()]);
        assert_eq!(ops, vec![op]);
    }

    #[test]
    fn contradictory_precondition_yields_no_operator() {
        let op = Operator::new("never", vec![]).with_precondition(Condition::contradiction());
        assert!(split_operator(op).is_empty());
    }

    #[test]
    fn disjunctive_conditional_effects() {
        let pb = problem();
        let r = Param::new("r", "room");
        let consequence = Condition::not(lit(&pb, "dark", &r));
        let prerequisite = Condition::Or(vec![lit(&pb, "lit", &r), lit(&pb, "open", &r)]);
        let expected = vec![
            Condition::when(lit(&pb, "lit", &r), consequence.clone()),
            Condition::when(lit(&pb, "open", &r), consequence.clone()),
        ];

        let top_level = Condition::when(prerequisite.clone(), consequence.clone());
        assert_eq!(split_effect(top_level), Condition::And(expected.clone()));

        let nested = Condition::And(vec![
            lit(&pb, "open", &r),
            Condition::when(prerequisite, consequence.clone()),
        ]);
        let mut with_literal = vec![lit(&pb, "open", &r)];
        with_literal.extend(expected);
        assert_eq!(split_effect(nested), Condition::And(with_literal));

        let simple = Condition::when(lit(&pb, "lit", &r), consequence);
        assert_eq!(split_effect(simple.clone()), simple);
    }
}
