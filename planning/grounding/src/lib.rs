//! Grounding and forward-search planning for problems of the `lifted` crate.
//!
//! The pipeline is made of independent stages, each consuming the output of the previous one:
//!  - [`preprocessing::preprocess`] compiles action costs, removes quantifiers and (by default)
//!    disjunctions from the lifted problem,
//!  - [`ground::ground`] instantiates it into a [`GroundProblem`],
//!  - [`ForwardSearch`] looks for a [`Plan`] in its state space,
//!  - [`validate::validate`] checks a plan against the ground problem.
//!
//! [`solve`] chains all of them.

pub mod config;
pub mod ground;
pub mod plan;
pub mod preprocessing;
pub mod search;
pub mod validate;

use anyhow::{Context, Result};
use lifted::Problem;

pub use config::Config;
pub use ground::GroundProblem;
pub use plan::Plan;
pub use search::{ForwardSearch, SearchResult};

/// Result of the planning pipeline: the ground problem that was searched and the outcome of the search.
pub struct Solution {
    pub ground: GroundProblem,
    pub result: SearchResult,
}

impl Solution {
    pub fn plan(&self) -> Option<&Plan> {
        self.result.plan()
    }
}

/// Preprocesses, grounds and solves `problem`. A plan found by the search is validated before
/// being returned.
pub fn solve(problem: Problem, config: &Config) -> Result<Solution> {
    let _span = tracing::span!(tracing::Level::DEBUG, "SOLVE").entered();
    problem.check().context("Invalid lifted problem")?;
    let problem = preprocessing::preprocess(problem, config);
    let ground = ground::ground(&problem, config.grounding)
        .with_context(|| format!("Grounding with the {} strategy", config.grounding))?;
    let result = ForwardSearch::new(config).search(&ground);
    match &result {
        SearchResult::Solved(plan) => {
            validate::validate(&ground, plan).context("The plan found by the search is invalid")?;
            tracing::debug!(length = plan.len(), cost = plan.cost(), "validated plan");
        }
        SearchResult::Unsolvable => tracing::debug!("problem is unsolvable"),
        SearchResult::LimitReached => tracing::debug!("search stopped before a conclusion"),
    }
    Ok(Solution { ground, result })
}
