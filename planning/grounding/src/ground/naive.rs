use lifted::{ArgumentCombinations, Problem};
use streaming_iterator::StreamingIterator;

use crate::ground::instantiate::Instantiator;
use crate::ground::*;

/// Grounds every type-consistent instance of every predicate, operator and axiom, regardless of
/// its reachability from the initial state.
pub(crate) fn ground_naive(problem: &Problem) -> Result<GroundProblem, GroundingError> {
    let mut inst = Instantiator::new(problem);

    for pred in problem.predicates.iter() {
        let mut combinations = ArgumentCombinations::new(&pred.parameters, problem);
        while let Some(args) = combinations.next() {
            inst.atoms
                .intern(GroundAtom::new(pred.name.clone(), args.iter().map(|a| a.name().clone())));
        }
    }
    tracing::debug!(atoms = inst.atoms.len(), "interned all atoms");

    let mut actions = Vec::new();
    for op in &problem.operators {
        let mut combinations = ArgumentCombinations::new(&op.parameters, problem);
        while let Some(args) = combinations.next() {
            if let Some(action) = inst.action(op, args)? {
                actions.push(action);
            }
        }
    }

    let mut axioms = Vec::new();
    for ax in &problem.axioms {
        let mut combinations = ArgumentCombinations::new(&ax.parameters, problem);
        while let Some(args) = combinations.next() {
            if let Some(axiom) = inst.axiom(ax, args)? {
                axioms.push(axiom);
            }
        }
    }

    inst.finish(actions, axioms)
}
