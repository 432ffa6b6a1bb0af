use crate::formatter::SuiteFormatter;

/// A formatter that produces no output.
///
/// Every event is discarded. This is useful when a host handles its own
/// reporting and only cares about the returned [`RunResult`](crate::RunResult).
#[derive(Debug, Default, Clone)]
pub struct NoFormatter;

impl SuiteFormatter for NoFormatter {}
