use std::{any::Any, backtrace::Backtrace, fmt::Display, time::Duration};

use crate::capture;

/// A normalized failure value.
///
/// Every way a unit can fail (a panic, an error returned from the function,
/// a rejected [`Deferred`](crate::Deferred), an error passed to a
/// [`Done`](crate::Done) callback, or a timeout) ends up as a `Fault` so
/// downstream consumers can always read a message and a trace. Both fields
/// are non-empty, and the message is not repeated inside the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
    pub trace: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: normalize_message(message.into()),
            trace: normalize_trace(Backtrace::force_capture().to_string()),
        }
    }

    pub(crate) fn timed_out(limit: Duration) -> Self {
        Self::new(format!(
            "timeout of {}ms exceeded. Ensure the done() callback is being called in this test.",
            limit.as_millis()
        ))
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let trace = capture::take_panic_trace()
            .unwrap_or_else(|| Backtrace::force_capture().to_string());
        Self {
            message: normalize_message(payload_as_string(payload)),
            trace: normalize_trace(trace),
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Fault::new(message)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Fault::new(message)
    }
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str`
/// and `String`). Other payload types are formatted as a generic placeholder.
fn payload_as_string(payload: Box<dyn Any + Send + 'static>) -> String {
    payload
        .downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|payload| payload.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}

fn normalize_message(message: String) -> String {
    match message.is_empty() {
        true => String::from("unknown error"),
        false => message,
    }
}

fn normalize_trace(trace: String) -> String {
    match trace.trim().is_empty() {
        true => String::from("<trace unavailable>"),
        false => trace,
    }
}

/// State of a single test, `Pending` until the scheduler reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum TestStatus {
    #[default]
    Pending,
    Passed,
    Failed(Fault),
    Skipped,
}

impl TestStatus {
    pub fn pending(&self) -> bool {
        matches!(self, TestStatus::Pending)
    }

    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }

    pub fn skipped(&self) -> bool {
        matches!(self, TestStatus::Skipped)
    }
}

/// What the completion race produced for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitOutcome {
    Success,
    Failure(Fault),
    TimedOut(Duration),
}

impl UnitOutcome {
    /// The fault to record for this outcome, if any. Timeouts turn into a
    /// fault whose message names the configured bound.
    pub fn into_fault(self) -> Option<Fault> {
        match self {
            UnitOutcome::Success => None,
            UnitOutcome::Failure(fault) => Some(fault),
            UnitOutcome::TimedOut(limit) => Some(Fault::timed_out(limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_always_carry_a_message_and_trace() {
        let fault = Fault::new("");
        assert!(!fault.message.is_empty());
        assert!(!fault.trace.is_empty());

        let fault = Fault::new("boom");
        assert_eq!(fault.message, "boom");
        assert!(!fault.trace.contains("boom"));
    }

    #[test]
    fn timeout_fault_names_the_bound() {
        let fault = Fault::timed_out(Duration::from_millis(50));
        assert!(fault.message.contains("50ms"));
    }

    #[test]
    fn str_panic_payloads_keep_their_text() {
        let payload: Box<dyn Any + Send> = Box::new("went sideways");
        assert_eq!(Fault::from_panic(payload).message, "went sideways");

        let payload: Box<dyn Any + Send> = Box::new(String::from("went sideways"));
        assert_eq!(Fault::from_panic(payload).message, "went sideways");
    }

    #[test]
    fn opaque_panic_payloads_get_a_placeholder() {
        let payload: Box<dyn Any + Send> = Box::new(1234_i32);
        let fault = Fault::from_panic(payload);
        assert!(!fault.message.is_empty());
        assert!(!fault.trace.is_empty());
    }
}
