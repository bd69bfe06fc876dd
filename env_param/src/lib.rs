//! Global parameters whose default value can be overridden from an environment variable.
//!
//! An `EnvParam` holds the name of an environment variable and the textual representation of
//! its default value. It is how the planner exposes tuning knobs (keeping disjunctions,
//! grounding strategy, search strategy, ...) that are not worth a dedicated command line flag.
//!
//! ```
//! use env_param::EnvParam;
//! static KEEP_DISJUNCTIONS: EnvParam<bool> = EnvParam::new("DOC_KEEP_DISJUNCTIONS", "false");
//!
//! fn main() {
//!   // environment variable not set, using default value
//!   assert!(!KEEP_DISJUNCTIONS.get());
//! }
//! ```
//!
//! The value is read once, on first access. Setting the environment variable afterwards has no effect.
//!
//! ```
//! use env_param::EnvParam;
//! static MAX_EXPANSIONS: EnvParam<u64> = EnvParam::new("DOC_MAX_EXPANSIONS", "0");
//!
//! fn main() {
//!   std::env::set_var("DOC_MAX_EXPANSIONS", "500");
//!   assert_eq!(MAX_EXPANSIONS.get(), 500);
//!   std::env::set_var("DOC_MAX_EXPANSIONS", "10"); // ignored, already initialized
//!   assert_eq!(MAX_EXPANSIONS.get(), 500);
//! }
//! ```
//!
//! Any type implementing `FromStr` can be used, which is how enumerated options are declared.

use std::fmt::Display;
use std::str::FromStr;

pub struct EnvParam<T> {
    value: once_cell::sync::OnceCell<T>,
    env: &'static str,
    default: &'static str,
}

impl<T> EnvParam<T> {
    /// Creates a new parameter that will be initialized from the environment variable `env`, or from
    /// `default` if the environment variable is not set.
    pub const fn new(env: &'static str, default: &'static str) -> EnvParam<T> {
        EnvParam {
            value: once_cell::sync::OnceCell::new(),
            env,
            default,
        }
    }
}

impl<T: FromStr> EnvParam<T>
where
    T::Err: Display,
{
    fn read_default(&self) -> T {
        match T::from_str(self.default) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(param = self.env, default = self.default, "invalid default value: {e}");
                panic!("[env_param] {}: invalid default value \"{}\".", self.env, self.default)
            }
        }
    }

    fn read(&self) -> T {
        match std::env::var(self.env) {
            Ok(param) => match T::from_str(&param) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        param = self.env,
                        "could not parse \"{param}\" ({e}), using default \"{}\"",
                        self.default
                    );
                    self.read_default()
                }
            },
            Err(std::env::VarError::NotPresent) => self.read_default(),
            Err(err) => {
                tracing::warn!(param = self.env, "{err}, using default \"{}\"", self.default);
                self.read_default()
            }
        }
    }

    /// Returns the value of the parameter, reading it from the environment on the first call.
    ///
    /// # Panic
    /// Panics if the default value cannot be parsed.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }

    /// Same as `get` for types that are not `Copy`.
    pub fn get_ref(&self) -> &T {
        self.value.get_or_init(|| self.read())
    }

    /// Forces the value of the parameter.
    ///
    /// # Panic
    /// Panics if the parameter has already been initialized (typically because it was already read).
    pub fn set(&self, value: T) {
        if self.value.set(value).is_err() {
            panic!("Parameter {} is already initialized (i.e. was previously accessed).", self.env);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Strategy {
        Fast,
        Slow,
    }

    impl FromStr for Strategy {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "fast" => Ok(Strategy::Fast),
                "slow" => Ok(Strategy::Slow),
                other => Err(format!("unknown strategy {other}")),
            }
        }
    }

    #[test]
    fn enumerated_default() {
        static STRATEGY: EnvParam<Strategy> = EnvParam::new("ENV_PARAM_TEST_STRATEGY", "slow");
        assert_eq!(STRATEGY.get(), Strategy::Slow);
    }

    #[test]
    fn invalid_value_falls_back_to_default() {
        static STRATEGY: EnvParam<Strategy> = EnvParam::new("ENV_PARAM_TEST_INVALID", "fast");
        std::env::set_var("ENV_PARAM_TEST_INVALID", "medium");
        assert_eq!(STRATEGY.get(), Strategy::Fast);
    }

    #[test]
    fn explicit_set() {
        static LIMIT: EnvParam<u32> = EnvParam::new("ENV_PARAM_TEST_LIMIT", "3");
        LIMIT.set(7);
        assert_eq!(LIMIT.get(), 7);
    }

    #[test]
    #[should_panic]
    fn set_after_read() {
        static LIMIT: EnvParam<u32> = EnvParam::new("ENV_PARAM_TEST_READ_LIMIT", "3");
        assert_eq!(LIMIT.get(), 3);
        LIMIT.set(7);
    }
}
