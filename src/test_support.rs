use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{Suite, formatter::NoFormatter};

/// A suite that reports nothing, for asserting on the returned result only.
pub(crate) fn quiet() -> Suite {
    Suite::new().with_formatter(NoFormatter)
}

/// Shared invocation counter for observing which unit bodies actually ran.
#[derive(Debug, Default, Clone)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
