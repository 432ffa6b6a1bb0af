use std::{io, time::Duration};

use crate::outcome::Fault;

/// One entry of the run's ordered failure list.
///
/// `name` is the display name with the full group-path prefix; for a hook
/// failure it names the hook's position instead of a test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RunFailure {
    pub name: String,
    pub fault: Fault,
}

/// Everything a finished run produced.
///
/// The three counters track test outcomes only; hook failures appear solely
/// in `failures`. Formatter IO errors never unwind through the scheduler and
/// are collected in `fmt_errors` instead.
#[derive(Debug)]
#[non_exhaustive]
pub struct RunResult {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
    pub failures: Vec<RunFailure>,
    pub fmt_errors: Vec<io::Error>,
}

impl RunResult {
    /// Whether the run finished without test or hook failures.
    pub fn success(&self) -> bool {
        self.failed == 0 && self.failures.is_empty()
    }
}
