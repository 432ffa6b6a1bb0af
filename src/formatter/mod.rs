//! Reporting sinks for suite runs.
//!
//! The scheduler hands every event to a [`SuiteFormatter`]: the start of the
//! run, each group it enters, each test outcome, and the final summary. All
//! methods default to no-ops, so a sink implements only what it renders.
//! Formatter IO errors are collected by the scheduler and reported through
//! [`RunResult::fmt_errors`](crate::RunResult), never unwound through a run.

use std::io;

use crate::{outcome::TestStatus, report::RunResult};

pub mod color;

mod common;

mod list;
pub use list::*;

mod dot;
pub use dot::*;

mod no;
pub use no::*;

pub trait SuiteFormatter {
    fn fmt_run_start(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn fmt_group_start(&mut self, group: GroupLine<'_>) -> io::Result<()> {
        let _ = group;
        Ok(())
    }

    fn fmt_test_outcome(&mut self, test: TestLine<'_>) -> io::Result<()> {
        let _ = test;
        Ok(())
    }

    fn fmt_run_outcomes(&mut self, result: &RunResult) -> io::Result<()> {
        let _ = result;
        Ok(())
    }
}

/// A group the scheduler just entered.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct GroupLine<'t> {
    pub name: &'t str,
    /// Nesting depth below the unnamed root, starting at 1 for top-level
    /// groups.
    pub depth: usize,
}

/// A finished (or skipped) test.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct TestLine<'t> {
    pub name: &'t str,
    pub full_name: &'t str,
    /// Depth of the owning group.
    pub depth: usize,
    pub status: &'t TestStatus,
    /// 1-based position in the failure list when the test failed.
    pub failure_index: Option<usize>,
}

/// Built-in reporter selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReporterKind {
    #[default]
    List,
    Dot,
    None,
}

impl ReporterKind {
    pub(crate) fn into_formatter(self) -> Box<dyn SuiteFormatter> {
        match self {
            ReporterKind::List => Box::new(ListFormatter::default()),
            ReporterKind::Dot => Box::new(DotFormatter::default()),
            ReporterKind::None => Box::new(NoFormatter),
        }
    }
}
