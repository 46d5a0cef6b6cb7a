//! Error types for callback invocation and exit-time closures.

use thiserror::Error;

/// Errors from running a [`Callback`](crate::Callback).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// The callback holds no bound state
    #[error("callback is empty")]
    Empty,
}

/// Errors from registering or running exit-time closures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AtExitError {
    /// No [`AtExitManager`](crate::AtExitManager) is alive
    #[error("no exit manager exists")]
    NoManager,
    /// A manager already exists and this one is not a shadow
    #[error("an exit manager already exists")]
    ManagerExists,
    /// The closure holds no bound state
    #[error("cannot register an empty closure")]
    EmptyClosure,
}
