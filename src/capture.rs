use std::{
    backtrace::Backtrace,
    cell::RefCell,
    panic::{self, PanicHookInfo},
};

thread_local! {
    static LAST_PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// The trace recorded by the run's panic hook for the most recent panic on
/// this thread. The hook and the consumer both run on the unit's worker
/// thread, so a thread local is enough to hand the trace over.
pub(crate) fn take_panic_trace() -> Option<String> {
    LAST_PANIC_TRACE.take()
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Replaces the process panic hook for the duration of a run.
///
/// The replacement records the panic site and a backtrace for
/// [`Fault::from_panic`](crate::Fault) instead of printing the default
/// "thread panicked" report between the formatter's lines. Dropping the guard
/// restores the previous hook.
pub(crate) struct PanicHookGuard(Option<PanicHook>);

impl PanicHookGuard {
    pub(crate) fn install() -> Self {
        let old_hook = panic::take_hook();

        panic::set_hook(Box::new(|info| {
            let backtrace = Backtrace::force_capture().to_string();
            let trace = match info.location() {
                Some(location) => format!("at {location}\n{backtrace}"),
                None => backtrace,
            };
            LAST_PANIC_TRACE.set(Some(trace));
        }));

        Self(Some(old_hook))
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        if let Some(old_hook) = self.0.take() {
            panic::set_hook(old_hook);
        }
    }
}
