//! Grounding restricted to the instances reachable in the delete relaxation.
//!
//! Starting from the atoms of the initial state, the set of reached atoms is extended with the
//! positive effects of every instance whose positive preconditions are reached, until a fixed point.
//! Since ignoring delete effects can only enlarge the set of reachable atoms, no instance applicable
//! in a reachable state is missed.
//!
//! Joins are semi-naive: at each layer, only the bindings that match at least one atom of the
//! previous layer are enumerated.

use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};
use lifted::{Argument, ArgumentCombinations, Condition, Literal, Param, Problem, Sym};
use streaming_iterator::StreamingIterator;

use crate::ground::instantiate::Instantiator;
use crate::ground::*;

/// An operator or axiom instance, identified by the index of its schema and its arguments.
type InstanceKey = (usize, Vec<Sym>);

fn instance_key(schema: usize, args: &[Argument]) -> InstanceKey {
    (schema, args.iter().map(|a| a.name().clone()).collect())
}

pub(crate) fn ground_rpg(problem: &Problem) -> Result<GroundProblem, GroundingError> {
    let mut inst = Instantiator::new(problem);
    let init_context = Sym::from("init");
    let mut layer = State::default();
    let mut reached = ReachedAtoms::default();
    for lit in &problem.init {
        let atom = inst.atom(lit, &init_context)?;
        if !layer.is_set(atom) {
            layer.add(atom);
            reached.add(inst.atoms.atom(atom).clone());
        }
    }

    let mut seen_actions: HashSet<InstanceKey> = HashSet::new();
    let mut seen_axioms: HashSet<InstanceKey> = HashSet::new();
    let mut pending_actions: Vec<Action> = Vec::new();
    let mut pending_axioms: Vec<GroundAxiom> = Vec::new();
    let mut actions: Vec<Action> = Vec::new();
    let mut axioms: Vec<GroundAxiom> = Vec::new();

    let mut iteration = 0;
    loop {
        iteration += 1;
        let first_layer = iteration == 1;
        for (i, op) in problem.operators.iter().enumerate() {
            let mut instantiate = |args: &[Argument]| -> Result<(), GroundingError> {
                if seen_actions.insert(instance_key(i, args)) {
                    pending_actions.extend(inst.action(op, args)?);
                }
                Ok(())
            };
            new_bindings(problem, &op.parameters, &op.precondition, &reached, first_layer, &mut instantiate)?;
        }
        for (i, ax) in problem.axioms.iter().enumerate() {
            let mut instantiate = |args: &[Argument]| -> Result<(), GroundingError> {
                if seen_axioms.insert(instance_key(i, args)) {
                    pending_axioms.extend(inst.axiom(ax, args)?);
                }
                Ok(())
            };
            new_bindings(problem, &ax.parameters, &ax.condition, &reached, first_layer, &mut instantiate)?;
        }
        reached.next_layer();

        // instances whose relaxed precondition now holds are part of the ground problem
        let (ready, waiting): (Vec<_>, Vec<_>) = pending_actions
            .into_iter()
            .partition(|a| a.precondition.relaxed_holds(&layer));
        pending_actions = waiting;
        actions.extend(ready);
        let (ready, waiting): (Vec<_>, Vec<_>) = pending_axioms
            .into_iter()
            .partition(|ax| ax.guard.relaxed_holds(&layer));
        pending_axioms = waiting;
        axioms.extend(ready);

        let added: Vec<AtomId> = actions
            .iter()
            .flat_map(|a| a.relaxed_adds(&layer))
            .chain(axioms.iter().filter(|ax| ax.guard.relaxed_holds(&layer)).map(|ax| ax.atom))
            .filter(|&atom| !layer.is_set(atom))
            .collect();
        let mut new_atoms = 0;
        for atom in added {
            if !layer.is_set(atom) {
                layer.add(atom);
                reached.add(inst.atoms.atom(atom).clone());
                new_atoms += 1;
            }
        }

        tracing::trace!(
            iteration,
            new_atoms,
            atoms = layer.num_entailed(),
            actions = actions.len(),
            "relaxed planning graph layer"
        );
        if new_atoms == 0 {
            break;
        }
    }
    tracing::debug!(
        iterations = iteration,
        reachable_atoms = layer.num_entailed(),
        discarded_instances = pending_actions.len() + pending_axioms.len(),
        "relaxed planning graph fixpoint"
    );

    inst.finish(actions, axioms)
}

/// Portion of the reached atoms a literal is joined with.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Part {
    /// Atoms reached before the last layer.
    Old,
    /// Atoms of the last layer.
    New,
    All,
}

/// Reached atoms indexed by predicate, for joins.
/// The atoms of a predicate are stored in the order they were reached, so that the ones of the
/// last layer come after the older ones.
#[derive(Default)]
struct ReachedAtoms {
    by_predicate: HashMap<Sym, Vec<GroundAtom>>,
    /// Number of atoms of each predicate reached before the last layer.
    old: HashMap<Sym, usize>,
}

impl ReachedAtoms {
    fn add(&mut self, atom: GroundAtom) {
        self.by_predicate.entry(atom.predicate.clone()).or_default().push(atom);
    }

    /// Marks all atoms added so far as old: the atoms added afterwards form the next layer.
    fn next_layer(&mut self) {
        self.old = self
            .by_predicate
            .iter()
            .map(|(pred, atoms)| (pred.clone(), atoms.len()))
            .collect();
    }

    fn of(&self, predicate: &Sym, part: Part) -> &[GroundAtom] {
        let Some(atoms) = self.by_predicate.get(predicate) else {
            return &[];
        };
        let old = self.old.get(predicate).copied().unwrap_or(0);
        match part {
            Part::Old => &atoms[..old],
            Part::New => &atoms[old..],
            Part::All => atoms,
        }
    }
}

/// Positive literals that must hold for the condition to hold (top-level conjuncts).
fn required_literals(condition: &Condition) -> Vec<&Literal> {
    let conjuncts = match condition {
        Condition::And(cs) => cs.as_slice(),
        single => std::slice::from_ref(single),
    };
    conjuncts
        .iter()
        .filter_map(|c| match c {
            Condition::Literal(l) if !l.negated && !l.predicate.is_equality() => Some(l),
            _ => None,
        })
        .collect()
}

/// Calls `f` on each binding of `params` under which every required positive literal of `condition`
/// matches a reached atom, one of them at least matching an atom of the last layer.
/// Parameters that do not appear in these literals range over all constants of their type.
///
/// A condition without required literals only has bindings on the first layer.
fn new_bindings(
    problem: &Problem,
    params: &[Param],
    condition: &Condition,
    reached: &ReachedAtoms,
    first_layer: bool,
    f: &mut impl FnMut(&[Argument]) -> Result<(), GroundingError>,
) -> Result<(), GroundingError> {
    let literals = required_literals(condition);
    let mut partial: Vec<Option<Sym>> = vec![None; params.len()];
    if literals.is_empty() {
        return if first_layer {
            bind_remaining(problem, params, &partial, f)
        } else {
            Ok(())
        };
    }
    // the k-th literal matches a new atom, the ones before it an old one
    for k in 0..literals.len() {
        let parts: Vec<(&Literal, Part)> = literals
            .iter()
            .enumerate()
            .map(|(j, &lit)| {
                let part = match j.cmp(&k) {
                    Ordering::Less => Part::Old,
                    Ordering::Equal => Part::New,
                    Ordering::Greater => Part::All,
                };
                (lit, part)
            })
            .collect();
        join(
            problem,
            params,
            &parts,
            reached,
            &mut partial,
            &mut |assignment: &[Option<Sym>]| bind_remaining(problem, params, assignment, &mut *f),
        )?;
    }
    Ok(())
}

/// Streams the complete bindings extending `assignment`: unassigned parameters range over all
/// constants of their type.
fn bind_remaining(
    problem: &Problem,
    params: &[Param],
    assignment: &[Option<Sym>],
    f: &mut impl FnMut(&[Argument]) -> Result<(), GroundingError>,
) -> Result<(), GroundingError> {
    let candidates: Vec<Vec<Argument>> = params
        .iter()
        .zip(assignment)
        .map(|(p, value)| match value {
            Some(name) => problem
                .objects
                .get(name.canonical_str())
                .map(Argument::from)
                .into_iter()
                .collect::<Vec<_>>(),
            None => problem
                .objects
                .instances_of(&p.tpe, &problem.types)
                .map(Argument::from)
                .collect::<Vec<_>>(),
        })
        .collect();
    let mut combinations = ArgumentCombinations::from_candidates(candidates);
    while let Some(args) = combinations.next() {
        f(args)?;
    }
    Ok(())
}

/// Extends the partial assignment so that each literal matches a reached atom of its part, in all
/// possible ways.
fn join(
    problem: &Problem,
    params: &[Param],
    literals: &[(&Literal, Part)],
    reached: &ReachedAtoms,
    partial: &mut Vec<Option<Sym>>,
    emit: &mut impl FnMut(&[Option<Sym>]) -> Result<(), GroundingError>,
) -> Result<(), GroundingError> {
    let Some((&(lit, part), rest)) = literals.split_first() else {
        return emit(partial.as_slice());
    };
    for atom in reached.of(&lit.predicate.name, part) {
        let saved = partial.clone();
        if unify(problem, params, lit, atom, partial) {
            join(problem, params, rest, reached, partial, emit)?;
        }
        *partial = saved;
    }
    Ok(())
}

/// Binds the parameters appearing in `lit` so that it matches `atom`.
/// Returns false if this is not possible with the current partial assignment.
fn unify(problem: &Problem, params: &[Param], lit: &Literal, atom: &GroundAtom, partial: &mut [Option<Sym>]) -> bool {
    if lit.args.len() != atom.args.len() {
        return false;
    }
    for (arg, value) in lit.args.iter().zip(&atom.args) {
        match arg {
            Argument::Constant(o) => {
                if o.name() != value {
                    return false;
                }
            }
            Argument::Variable(v) => {
                let Some(i) = params.iter().position(|p| p.name == v.name) else {
                    // bound by a quantifier, not constrained here
                    continue;
                };
                match &partial[i] {
                    Some(bound) if bound != value => return false,
                    Some(_) => {}
                    None => {
                        let well_typed = problem
                            .objects
                            .get(value.canonical_str())
                            .is_ok_and(|o| problem.types.is_subtype_of(o.tpe(), &params[i].tpe));
                        if !well_typed {
                            return false;
                        }
                        partial[i] = Some(value.clone());
                    }
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Locations `a`, `b`, `c`, predicates `p(x)` and `q(x, y)`.
    fn problem() -> Problem {
        let mut pb = Problem::new();
        pb.add_type("loc", None);
        for o in ["a", "b", "c"] {
            pb.add_object(o, "loc").unwrap();
        }
        pb.add_predicate("p", vec![Param::new("x", "loc")]).unwrap();
        pb.add_predicate("q", vec![Param::new("x", "loc"), Param::new("y", "loc")])
            .unwrap();
        pb
    }

    fn atom(pred: &str, args: &[&str]) -> GroundAtom {
        GroundAtom::new(Sym::from(pred), args.iter().map(|&a| Sym::from(a)))
    }

    fn bindings(
        pb: &Problem,
        params: &[Param],
        condition: &Condition,
        reached: &ReachedAtoms,
        first: bool,
    ) -> Vec<String> {
        let mut found = Vec::new();
        let mut record = |args: &[Argument]| -> Result<(), GroundingError> {
            found.push(args.iter().map(|a| a.name().to_string()).collect::<Vec<_>>().join(" "));
            Ok(())
        };
        new_bindings(pb, params, condition, reached, first, &mut record).unwrap();
        found.sort();
        found
    }

    #[test]
    fn each_binding_is_found_on_a_single_layer() {
        let pb = problem();
        let (x, y, z) = (Param::new("x", "loc"), Param::new("y", "loc"), Param::new("z", "loc"));
        let params = [x.clone(), y.clone(), z];
        let pre = Condition::And(vec![
            pb.literal("p", vec![(&x).into()]).unwrap().into(),
            pb.literal("q", vec![(&x).into(), (&y).into()]).unwrap().into(),
        ]);

        let mut reached = ReachedAtoms::default();
        reached.add(atom("p", &["a"]));
        reached.add(atom("q", &["b", "c"]));
        assert!(bindings(&pb, &params, &pre, &reached, true).is_empty());

        reached.next_layer();
        reached.add(atom("q", &["a", "b"]));
        // `z` is not constrained by the precondition
        assert_eq!(bindings(&pb, &params, &pre, &reached, false), ["a b a", "a b b", "a b c"]);

        reached.next_layer();
        reached.add(atom("p", &["b"]));
        assert_eq!(bindings(&pb, &params, &pre, &reached, false), ["b c a", "b c b", "b c c"]);

        reached.next_layer();
        assert!(bindings(&pb, &params, &pre, &reached, false).is_empty());
    }

    #[test]
    fn unconstrained_schemas_are_bound_once() {
        let pb = problem();
        let x = Param::new("x", "loc");
        let mut reached = ReachedAtoms::default();
        reached.add(atom("p", &["a"]));
        let pre = Condition::not(pb.literal("p", vec![(&x).into()]).unwrap().into());
        let params = [x];
        assert_eq!(bindings(&pb, &params, &pre, &reached, true), ["a", "b", "c"]);
        reached.next_layer();
        reached.add(atom("p", &["b"]));
        assert!(bindings(&pb, &params, &pre, &reached, false).is_empty());
    }
}
