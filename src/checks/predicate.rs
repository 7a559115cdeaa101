//! Ad-hoc predicates wrapped as checks.

use crate::core::{Check, CheckContext, CheckError, Value};
use std::fmt;
use std::sync::Arc;

type PredicateFn = Arc<dyn Fn(&Value) -> Result<bool, CheckError> + Send + Sync>;

/// A `must` predicate over the member value.
#[derive(Clone)]
pub struct Predicate {
    predicate: PredicateFn,
}

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(move |value: &Value| Ok(predicate(value))),
        }
    }

    /// A predicate whose errors propagate out of validation.
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, CheckError> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl Check for Predicate {
    fn kind(&self) -> &'static str {
        "Must"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
