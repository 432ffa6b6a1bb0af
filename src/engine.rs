//! The completion race for a single unit.
//!
//! A unit runs on its own worker thread and reports through a bounded
//! channel, while the engine waits on the other end with a deadline. The
//! channel doubles as the single-assignment outcome cell: whichever side is
//! first, the unit's signal or the deadline, decides the outcome, and the
//! loser's send lands in a dropped receiver where it is discarded. A unit
//! that outlives its deadline is abandoned, not cancelled; its side effects
//! may still happen, its late signal is ignored.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;

use crate::{
    outcome::{Fault, UnitOutcome},
    unit::{Deferred, UnitFn, UnitReturn, UnitSignal},
};

/// Runs one unit and races its completion signal against `timeout`.
pub(crate) fn run_unit(func: &UnitFn, timeout: Duration) -> UnitOutcome {
    let (tx, rx) = crossbeam_channel::bounded::<UnitSignal>(1);

    // An uncalled completion callback must run into the deadline, not into a
    // disconnect, so the channel stays open from this side while we wait.
    let _keep_open = tx.clone();

    match func {
        UnitFn::Direct(func) => {
            let func = Arc::clone(func);
            thread::spawn(move || match catch_unwind(AssertUnwindSafe(|| func())) {
                Ok(UnitReturn::Settled(signal)) => {
                    let _ = tx.send(signal);
                }
                Ok(UnitReturn::Deferred(deferred)) => forward_settlement(deferred, &tx),
                Err(payload) => {
                    let _ = tx.send(Err(Fault::from_panic(payload)));
                }
            });
        }
        UnitFn::Callback(func) => {
            let func = Arc::clone(func);
            thread::spawn(move || {
                let (deferred, done) = Deferred::pending();
                match catch_unwind(AssertUnwindSafe(|| func(done))) {
                    Ok(()) => forward_settlement(deferred, &tx),
                    // A completion signal sent before the panic wins over it.
                    Err(payload) => match deferred.rx.try_recv() {
                        Ok(signal) => {
                            let _ = tx.send(signal);
                        }
                        Err(_) => {
                            let _ = tx.send(Err(Fault::from_panic(payload)));
                        }
                    },
                }
            });
        }
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(())) => UnitOutcome::Success,
        Ok(Err(fault)) => UnitOutcome::Failure(fault),
        Err(_) => UnitOutcome::TimedOut(timeout),
    }
}

/// Blocks the worker until the deferred settles, then hands the signal on.
/// If the settling side was dropped there will never be a signal; the engine
/// times the unit out.
fn forward_settlement(deferred: Deferred, tx: &Sender<UnitSignal>) {
    if let Ok(signal) = deferred.rx.recv() {
        let _ = tx.send(signal);
    }
}
