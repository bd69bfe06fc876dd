//! Instantiation of operators, axioms and goals with constants.

use lifted::conditions::Quantification;
use lifted::{Argument, ArgumentCombinations, Axiom, Condition, Literal, Operator, Problem, Quantifier, Sym};
use streaming_iterator::StreamingIterator;

use crate::ground::*;

/// Shared state of a grounding strategy: the atom pool and the conversion of closed lifted
/// conditions into ground guards and effects.
pub(crate) struct Instantiator<'a> {
    pub problem: &'a Problem,
    pub atoms: Atoms,
    dropped_numeric_effects: usize,
}

/// Unconditional and conditional effects of an action, before their conversion to atoms.
#[derive(Default)]
struct Effects {
    add: Vec<AtomId>,
    del: Vec<AtomId>,
    conditional: Vec<(Condition, Vec<AtomId>, Vec<AtomId>)>,
}

impl Effects {
    fn target(&mut self, prerequisite: Option<&Condition>) -> (&mut Vec<AtomId>, &mut Vec<AtomId>) {
        let Some(prerequisite) = prerequisite else {
            return (&mut self.add, &mut self.del);
        };
        let i = match self.conditional.iter().position(|(p, _, _)| p == prerequisite) {
            Some(i) => i,
            None => {
                self.conditional.push((prerequisite.clone(), Vec::new(), Vec::new()));
                self.conditional.len() - 1
            }
        };
        let (_, add, del) = &mut self.conditional[i];
        (add, del)
    }
}

fn normalized(mut atoms: Vec<AtomId>) -> Vec<AtomId> {
    atoms.sort();
    atoms.dedup();
    atoms
}

impl<'a> Instantiator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Instantiator {
            problem,
            atoms: Atoms::default(),
            dropped_numeric_effects: 0,
        }
    }

    /// Identifier of the atom of a ground literal.
    pub fn atom(&mut self, literal: &Literal, context: &Sym) -> Result<AtomId, GroundingError> {
        let atom = GroundAtom::of(literal).ok_or_else(|| GroundingError::Malformed {
            element: literal.to_string(),
            context: context.clone(),
        })?;
        Ok(self.atoms.intern(atom))
    }

    /// Instantiates `operator` with the given constants. Returns `None` if the precondition of the
    /// instance can never hold.
    pub fn action(&mut self, operator: &Operator, args: &[Argument]) -> Result<Option<Action>, GroundingError> {
        let context = &operator.name;
        let precondition = operator.precondition.bind(&operator.parameters, args);
        let Some(precondition) = self.guard(&precondition, context)? else {
            return Ok(None);
        };
        let effect = operator.effect.bind(&operator.parameters, args).simplify(false);
        let mut effects = Effects::default();
        self.collect_effects(&effect, None, &mut effects, context)?;

        let mut conditional = Vec::with_capacity(effects.conditional.len());
        for (prerequisite, add, del) in effects.conditional {
            match self.guard(&prerequisite, context)? {
                None => {}
                Some(guard) if guard.is_trivial() => {
                    effects.add.extend(add);
                    effects.del.extend(del);
                }
                Some(guard) => conditional.push(ConditionalEffect {
                    guard,
                    add: normalized(add),
                    del: normalized(del),
                }),
            }
        }
        Ok(Some(Action {
            name: operator.name.clone(),
            args: args.iter().map(|a| a.name().clone()).collect(),
            cost: operator.cost,
            precondition,
            add: normalized(effects.add),
            del: normalized(effects.del),
            conditional,
        }))
    }

    /// Instantiates the derived-predicate rule `axiom`. Returns `None` if its condition can never hold.
    pub fn axiom(&mut self, axiom: &Axiom, args: &[Argument]) -> Result<Option<GroundAxiom>, GroundingError> {
        let context = &axiom.predicate.name;
        let condition = axiom.condition.bind(&axiom.parameters, args);
        let Some(guard) = self.guard(&condition, context)? else {
            return Ok(None);
        };
        let head = Literal::new(axiom.predicate.clone(), args.iter().cloned());
        let atom = self.atom(&head, context)?;
        Ok(Some(GroundAxiom { atom, guard }))
    }

    /// Converts a closed condition into a guard, or `None` if it is a contradiction.
    pub fn guard(&mut self, condition: &Condition, context: &Sym) -> Result<Option<Guard>, GroundingError> {
        let condition = condition.simplify(false);
        let mut guard = Guard::default();
        let mut residual = Vec::new();
        let conjuncts = match &condition {
            Condition::And(cs) => cs.as_slice(),
            single => std::slice::from_ref(single),
        };
        for c in conjuncts {
            match c {
                Condition::Literal(l) if l.negated => guard.negative.push(self.atom(l, context)?),
                Condition::Literal(l) => guard.positive.push(self.atom(l, context)?),
                other => residual.push(self.formula(other, context)?),
            }
        }
        guard.positive = normalized(guard.positive);
        guard.negative = normalized(guard.negative);
        if guard.positive.iter().any(|a| guard.negative.contains(a)) {
            return Ok(None);
        }
        guard.formula = match residual.len() {
            0 => None,
            1 => residual.pop(),
            _ => Some(Formula::And(residual)),
        };
        if guard.formula == Some(Formula::Or(Vec::new())) {
            return Ok(None);
        }
        Ok(Some(guard))
    }

    /// Converts a closed condition in negation normal form into a formula.
    fn formula(&mut self, condition: &Condition, context: &Sym) -> Result<Formula, GroundingError> {
        Ok(match condition {
            Condition::Literal(l) => Formula::Lit {
                atom: self.atom(l, context)?,
                positive: !l.negated,
            },
            Condition::And(cs) => Formula::And(cs.iter().map(|c| self.formula(c, context)).collect::<Result<_, _>>()?),
            Condition::Or(cs) => Formula::Or(cs.iter().map(|c| self.formula(c, context)).collect::<Result<_, _>>()?),
            Condition::Quantified(q) => {
                let instances = self.expand(q);
                let fs = instances
                    .iter()
                    .map(|c| self.formula(c, context))
                    .collect::<Result<_, _>>()?;
                match q.quantifier {
                    Quantifier::Forall => Formula::And(fs),
                    Quantifier::Exists => Formula::Or(fs),
                }
            }
            Condition::Comparison(c) => {
                return Err(GroundingError::NumericCondition {
                    condition: c.to_string(),
                    context: context.clone(),
                })
            }
            Condition::Not(_) | Condition::When(_) | Condition::NumericEffect(_) => {
                return Err(GroundingError::Malformed {
                    element: condition.to_string(),
                    context: context.clone(),
                })
            }
        })
    }

    /// One simplified copy of the quantified condition per binding of its variables.
    fn expand(&self, q: &Quantification) -> Vec<Condition> {
        let mut instances = Vec::new();
        let mut combinations = ArgumentCombinations::new(&q.variables, self.problem);
        while let Some(args) = combinations.next() {
            instances.push(q.condition.bind(&q.variables, args).simplify(false));
        }
        instances
    }

    /// Sorts the literals of a closed effect in negation normal form into add and delete lists.
    /// Literals under conditional effects are grouped by their (conjoined) prerequisites.
    fn collect_effects(
        &mut self,
        effect: &Condition,
        prerequisite: Option<&Condition>,
        effects: &mut Effects,
        context: &Sym,
    ) -> Result<(), GroundingError> {
        match effect {
            Condition::Literal(l) => {
                let atom = self.atom(l, context)?;
                let (add, del) = effects.target(prerequisite);
                if l.negated {
                    del.push(atom)
                } else {
                    add.push(atom)
                }
            }
            Condition::And(cs) => {
                for c in cs {
                    self.collect_effects(c, prerequisite, effects, context)?;
                }
            }
            Condition::When(w) => {
                let combined = match prerequisite {
                    None => w.prerequisite.as_ref().clone(),
                    Some(outer) => Condition::And(vec![outer.clone(), w.prerequisite.as_ref().clone()]).simplify(false),
                };
                self.collect_effects(&w.consequence, Some(&combined), effects, context)?;
            }
            Condition::Quantified(q) if q.quantifier == Quantifier::Forall => {
                for instance in self.expand(q) {
                    self.collect_effects(&instance, prerequisite, effects, context)?;
                }
            }
            Condition::NumericEffect(_) => self.dropped_numeric_effects += 1,
            Condition::Or(_) | Condition::Quantified(_) => {
                return Err(GroundingError::DisjunctiveEffect {
                    effect: effect.to_string(),
                    context: context.clone(),
                })
            }
            Condition::Not(_) | Condition::Comparison(_) => {
                return Err(GroundingError::Malformed {
                    element: effect.to_string(),
                    context: context.clone(),
                })
            }
        }
        Ok(())
    }

    /// Builds the ground problem from the instances selected by a grounding strategy.
    pub fn finish(mut self, actions: Vec<Action>, axioms: Vec<GroundAxiom>) -> Result<GroundProblem, GroundingError> {
        let mut init_atoms = Vec::with_capacity(self.problem.init.len());
        for lit in &self.problem.init {
            init_atoms.push(self.atom(lit, &Sym::from("init"))?);
        }
        let goal = Condition::And(self.problem.goals.clone());
        let goal = self.guard(&goal, &Sym::from("goal"))?.unwrap_or_else(Guard::unsatisfiable);

        if self.dropped_numeric_effects > 0 {
            tracing::warn!(
                "{} numeric effects are not supported by the ground model and were ignored",
                self.dropped_numeric_effects
            );
        }
        let (axioms, strata) = super::stratify(&self.atoms, axioms)?;
        let mut init = State::new(self.atoms.len());
        for atom in init_atoms {
            init.add(atom);
        }
        let mut problem = GroundProblem {
            atoms: self.atoms,
            init,
            goal,
            actions,
            axioms,
            strata,
        };
        problem.init = problem.close(problem.init.clone());
        Ok(problem)
    }
}

