use streaming_iterator::StreamingIterator;

use crate::{Argument, Param, Problem};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Status {
    /// `next()` was not called since creation or the last reset.
    Fresh,
    /// `current` holds a valid combination.
    Valid,
    Exhausted,
}

/// Lazy enumeration of all well-typed bindings of a list of variables.
///
/// Each position ranges over the constants of the problem whose type is compatible with the
/// declared type of the variable at this position. Combinations are produced in lexicographic
/// order of the positions (the last position changes fastest) and lent as a slice that is only
/// valid until the next call to `next()`.
///
/// With no variable there is exactly one (empty) combination. If a variable has no candidate,
/// there is no combination at all.
///
/// ```
/// use lifted::*;
/// use streaming_iterator::StreamingIterator;
///
/// let mut pb = Problem::new();
/// pb.add_type("block", None);
/// pb.add_object("a", "block").unwrap();
/// pb.add_object("b", "block").unwrap();
/// let vars = [Param::new("x", "block"), Param::new("y", "block")];
/// let mut combinations = ArgumentCombinations::new(&vars, &pb);
/// assert_eq!(combinations.count_combinations(), 4);
/// let mut seen = Vec::new();
/// while let Some(args) = combinations.next() {
///     seen.push(format!("{} {}", args[0], args[1]));
/// }
/// assert_eq!(seen, vec!["a a", "a b", "b a", "b b"]);
/// ```
pub struct ArgumentCombinations {
    candidates: Vec<Vec<Argument>>,
    indices: Vec<usize>,
    current: Vec<Argument>,
    status: Status,
}

impl ArgumentCombinations {
    pub fn new(vars: &[Param], problem: &Problem) -> Self {
        let candidates = vars
            .iter()
            .map(|v| {
                problem
                    .objects
                    .instances_of(&v.tpe, &problem.types)
                    .map(Argument::from)
                    .collect()
            })
            .collect();
        Self::from_candidates(candidates)
    }

    /// Enumerates the cross product of the given candidate lists.
    pub fn from_candidates(candidates: Vec<Vec<Argument>>) -> Self {
        ArgumentCombinations {
            indices: vec![0; candidates.len()],
            current: Vec::with_capacity(candidates.len()),
            candidates,
            status: Status::Fresh,
        }
    }

    /// Number of combinations in a complete enumeration, saturating on overflow.
    pub fn count_combinations(&self) -> usize {
        self.candidates
            .iter()
            .fold(1usize, |acc, c| acc.saturating_mul(c.len()))
    }

    /// Restarts the enumeration from the first combination.
    pub fn reset(&mut self) {
        self.indices.iter_mut().for_each(|i| *i = 0);
        self.current.clear();
        self.status = Status::Fresh;
    }

    fn load_first(&mut self) {
        if self.candidates.iter().any(|c| c.is_empty()) {
            self.status = Status::Exhausted;
            return;
        }
        self.current.clear();
        self.current.extend(self.candidates.iter().map(|c| c[0].clone()));
        self.status = Status::Valid;
    }

    fn increment(&mut self) {
        // odometer: increment the last position, carrying over to the previous ones
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.candidates[pos].len() {
                self.current[pos] = self.candidates[pos][self.indices[pos]].clone();
                return;
            }
            self.indices[pos] = 0;
            self.current[pos] = self.candidates[pos][0].clone();
        }
        self.status = Status::Exhausted;
    }
}

impl StreamingIterator for ArgumentCombinations {
    type Item = [Argument];

    fn advance(&mut self) {
        match self.status {
            Status::Fresh => self.load_first(),
            Status::Valid => self.increment(),
            Status::Exhausted => {}
        }
    }

    fn get(&self) -> Option<&Self::Item> {
        match self.status {
            Status::Valid => Some(self.current.as_slice()),
            Status::Fresh | Status::Exhausted => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.status {
            Status::Fresh => {
                let n = self.count_combinations();
                (n, Some(n))
            }
            Status::Valid => (0, Some(self.count_combinations())),
            Status::Exhausted => (0, Some(0)),
        }
    }
}
