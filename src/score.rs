use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Passed and total test counts, stored as `passed<TAB>total`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub passed: usize,
    pub total: usize,
}

impl Score {
    pub fn new(passed: usize, total: usize) -> Self {
        Self { passed, total }
    }

    /// Score from a suite run; failures and errors both count against the total
    pub fn from_counts(total: usize, failures: usize, errors: usize) -> Self {
        Self {
            passed: total.saturating_sub(failures + errors),
            total,
        }
    }

    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.passed, self.total)
    }
}

impl FromStr for Score {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Score(format!("expected `passed<TAB>total`, got {:?}", s));

        let (passed, total) = s.trim_end().split_once('\t').ok_or_else(invalid)?;
        let passed: usize = passed.trim().parse().map_err(|_| invalid())?;
        let total: usize = total.trim().parse().map_err(|_| invalid())?;
        if passed > total {
            return Err(invalid());
        }
        Ok(Self { passed, total })
    }
}
