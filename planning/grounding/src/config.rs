use std::str::FromStr;
use std::time::Duration;

use derive_more::derive::Display;
use env_param::EnvParam;
use thiserror::Error;

/// If true, preconditions and goals are only put in negation normal form and disjunctions are kept
/// in the ground model. Otherwise they are converted to DNF and operators are split along their disjuncts.
pub static KEEP_DISJUNCTIONS: EnvParam<bool> = EnvParam::new("PLANNING_KEEP_DISJUNCTIONS", "false");

/// Grounding strategy: `naive` or `rpg`.
pub static GROUNDING: EnvParam<GroundingStrategy> = EnvParam::new("PLANNING_GROUNDING", "rpg");

/// Order in which the forward search explores states: `bfs` or `dfs`.
pub static SEARCH: EnvParam<SearchStrategy> = EnvParam::new("PLANNING_SEARCH", "bfs");

/// Maximal number of states expanded by the search, 0 for no limit.
pub static MAX_EXPANSIONS: EnvParam<usize> = EnvParam::new("PLANNING_MAX_EXPANSIONS", "0");

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum GroundingStrategy {
    /// All type-consistent atoms and operator instances.
    #[display("naive")]
    Naive,
    /// Only operator instances reachable in the delete relaxation.
    #[display("rpg")]
    RelaxedPlanningGraph,
}

impl FromStr for GroundingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(GroundingStrategy::Naive),
            "rpg" | "relaxed-graph" => Ok(GroundingStrategy::RelaxedPlanningGraph),
            _ => Err(format!("unknown grounding strategy \"{s}\" (expected naive or rpg)")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum SearchStrategy {
    #[display("bfs")]
    BreadthFirst,
    #[display("dfs")]
    DepthFirst,
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bfs" | "breadth-first" => Ok(SearchStrategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(SearchStrategy::DepthFirst),
            _ => Err(format!("unknown search strategy \"{s}\" (expected bfs or dfs)")),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("invalid value \"{value}\" for option {option}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
}

/// Options of the planning pipeline.
///
/// The default configuration is read from the environment (see the statics of this module).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub keep_disjunctions: bool,
    pub grounding: GroundingStrategy,
    pub search: SearchStrategy,
    pub max_expansions: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keep_disjunctions: KEEP_DISJUNCTIONS.get(),
            grounding: GROUNDING.get(),
            search: SEARCH.get(),
            max_expansions: Some(MAX_EXPANSIONS.get()).filter(|&n| n > 0),
            time_limit: None,
        }
    }
}

impl Config {
    /// Sets an option from its textual name and value, as given on a command line.
    ///
    /// Recognized options are `keep-disjunctions`, `grounding`, `search`, `max-expansions` and
    /// `time-limit` (in seconds). A limit of 0 disables the limit.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: FromStr>(option: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: ToString,
        {
            value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                option: option.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
        }
        match name {
            "keep-disjunctions" => self.keep_disjunctions = parse(name, value)?,
            "grounding" => self.grounding = parse(name, value)?,
            "search" => self.search = parse(name, value)?,
            "max-expansions" => self.max_expansions = Some(parse::<usize>(name, value)?).filter(|&n| n > 0),
            "time-limit" => {
                let secs: f64 = parse(name, value)?;
                if !secs.is_finite() || secs < 0. {
                    return Err(ConfigError::InvalidValue {
                        option: name.to_string(),
                        value: value.to_string(),
                        reason: "expected a non-negative number of seconds".to_string(),
                    });
                }
                self.time_limit = Some(Duration::from_secs_f64(secs)).filter(|d| !d.is_zero());
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    pub fn with_option(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        self.set_option(name, value)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options() {
        let mut config = Config::default();
        config.set_option("keep-disjunctions", "true").unwrap();
        assert!(config.keep_disjunctions);
        config.set_option("grounding", "naive").unwrap();
        assert_eq!(config.grounding, GroundingStrategy::Naive);
        config.set_option("search", "dfs").unwrap();
        assert_eq!(config.search, SearchStrategy::DepthFirst);
        config.set_option("max-expansions", "100").unwrap();
        assert_eq!(config.max_expansions, Some(100));
        config.set_option("max-expansions", "0").unwrap();
        assert_eq!(config.max_expansions, None);
        config.set_option("time-limit", "1.5").unwrap();
        assert_eq!(config.time_limit, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn invalid_options() {
        let mut config = Config::default();
        assert_eq!(
            config.set_option("heuristic", "hadd"),
            Err(ConfigError::UnknownOption("heuristic".to_string()))
        );
        assert!(matches!(
            config.set_option("grounding", "lazy"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.set_option("keep-disjunctions", "yes").is_err());
        assert!(config.set_option("time-limit", "-3").is_err());
    }

    #[test]
    fn strategies_round_trip_through_text() {
        for s in [GroundingStrategy::Naive, GroundingStrategy::RelaxedPlanningGraph] {
            assert_eq!(s.to_string().parse::<GroundingStrategy>(), Ok(s));
        }
        for s in [SearchStrategy::BreadthFirst, SearchStrategy::DepthFirst] {
            assert_eq!(s.to_string().parse::<SearchStrategy>(), Ok(s));
        }
    }
}
