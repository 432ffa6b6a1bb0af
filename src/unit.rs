use std::{fmt::Debug, sync::Arc};

use crossbeam_channel::{Receiver, Sender};

use crate::outcome::Fault;

pub(crate) type UnitSignal = Result<(), Fault>;

/// The work behind a test or hook, with its shape fixed at registration.
///
/// `Direct` units are plain functions whose return value settles them (or
/// hands back a [`Deferred`] to wait on). `Callback` units receive a [`Done`]
/// handle and settle whenever it is invoked.
pub(crate) enum UnitFn {
    Direct(Arc<dyn Fn() -> UnitReturn + Send + Sync + 'static>),
    Callback(Arc<dyn Fn(Done) + Send + Sync + 'static>),
}

impl Debug for UnitFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => write!(f, "Direct(...)"),
            Self::Callback(_) => write!(f, "Callback(...)"),
        }
    }
}

impl UnitFn {
    pub(crate) fn direct<F, R>(func: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<UnitReturn>,
    {
        Self::Direct(Arc::new(move || func().into()))
    }

    pub(crate) fn callback<F>(func: F) -> Self
    where
        F: Fn(Done) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(func))
    }
}

/// What invoking a direct unit produced.
///
/// Unit functions rarely name this type: `()`, `Result<(), E>`, and
/// [`Deferred`] all convert into it.
pub enum UnitReturn {
    /// The call itself was the completion signal.
    Settled(UnitSignal),
    /// The unit returned work that settles later.
    Deferred(Deferred),
}

impl From<()> for UnitReturn {
    fn from(_: ()) -> Self {
        Self::Settled(Ok(()))
    }
}

impl<E: Debug> From<Result<(), E>> for UnitReturn {
    fn from(value: Result<(), E>) -> Self {
        Self::Settled(value.map_err(|err| Fault::new(format!("{err:#?}"))))
    }
}

impl From<Deferred> for UnitReturn {
    fn from(value: Deferred) -> Self {
        Self::Deferred(value)
    }
}

/// A completion that will arrive later, the crate's stand-in for returning a
/// promise: hand the [`Done`] half to whatever finishes the work and return
/// the `Deferred` half from the unit.
#[derive(Debug)]
pub struct Deferred {
    pub(crate) rx: Receiver<UnitSignal>,
}

impl Deferred {
    /// A fresh unsettled pair.
    pub fn pending() -> (Deferred, Done) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (Deferred { rx }, Done { tx })
    }
}

/// Completion handle for callback-style units and for [`Deferred`] work.
///
/// Consuming `self` makes a second signal from the same handle
/// unrepresentable; a signal arriving after the unit's outcome was already
/// recorded (a timeout, usually) is silently discarded.
#[derive(Debug)]
pub struct Done {
    tx: Sender<UnitSignal>,
}

impl Done {
    pub fn success(self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn error(self, err: impl Into<Fault>) {
        let _ = self.tx.send(Err(err.into()));
    }
}
