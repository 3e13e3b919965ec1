use parse_display::Display;
use serde::{Deserialize, Serialize};

use crate::LoadError;


/// The fetch status of a single value.
///
/// `Done` holds the outcome of the fetch and is never turned back into `Loading`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsyncStatus<T, E = LoadError> {
    NotAsked,
    Loading,
    Done(Result<T, E>),
}

/// `AsyncStatus` whose failure is a [`LoadError`].
pub type AsyncResult<T> = AsyncStatus<T, LoadError>;

/// Tag of an [`AsyncStatus`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[display(style = "snake_case")]
pub enum StatusKind {
    NotAsked,
    Loading,
    Ok,
    Error,
}

impl<T, E> AsyncStatus<T, E> {
    pub fn not_asked() -> Self {
        Self::NotAsked
    }
    pub fn loading() -> Self {
        Self::Loading
    }
    pub fn done(result: Result<T, E>) -> Self {
        Self::Done(result)
    }
    pub fn ok(value: T) -> Self {
        Self::Done(Ok(value))
    }
    pub fn error(error: E) -> Self {
        Self::Done(Err(error))
    }

    pub fn is_not_asked(&self) -> bool {
        matches!(self, Self::NotAsked)
    }
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Done(Ok(_)))
    }
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Done(Err(_)))
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            Self::NotAsked => StatusKind::NotAsked,
            Self::Loading => StatusKind::Loading,
            Self::Done(Ok(_)) => StatusKind::Ok,
            Self::Done(Err(_)) => StatusKind::Error,
        }
    }

    /// Consumes the status, calling exactly one of the given functions.
    pub fn fold<R>(
        self,
        not_asked: impl FnOnce() -> R,
        loading: impl FnOnce() -> R,
        ok: impl FnOnce(T) -> R,
        error: impl FnOnce(E) -> R,
    ) -> R {
        match self {
            Self::NotAsked => not_asked(),
            Self::Loading => loading(),
            Self::Done(Ok(value)) => ok(value),
            Self::Done(Err(e)) => error(e),
        }
    }

    pub fn as_ref(&self) -> AsyncStatus<&T, &E> {
        match self {
            Self::NotAsked => AsyncStatus::NotAsked,
            Self::Loading => AsyncStatus::Loading,
            Self::Done(result) => AsyncStatus::Done(result.as_ref()),
        }
    }

    /// Transforms the outcome of a finished fetch, keeping `NotAsked` and `Loading` as they are.
    pub fn map<U, F>(self, f: impl FnOnce(Result<T, E>) -> Result<U, F>) -> AsyncStatus<U, F> {
        match self {
            Self::NotAsked => AsyncStatus::NotAsked,
            Self::Loading => AsyncStatus::Loading,
            Self::Done(result) => AsyncStatus::Done(f(result)),
        }
    }

    pub fn map_ok<U>(self, f: impl FnOnce(T) -> U) -> AsyncStatus<U, E> {
        self.map(|result| result.map(f))
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> AsyncStatus<T, F> {
        self.map(|result| result.map_err(f))
    }

    /// Returns the value if the fetch has finished successfully.
    pub fn ok_value(self) -> Option<T> {
        match self {
            Self::Done(Ok(value)) => Some(value),
            _ => None,
        }
    }
    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Self::Done(Ok(value)) => Some(value),
            _ => None,
        }
    }
    pub fn as_err(&self) -> Option<&E> {
        match self {
            Self::Done(Err(e)) => Some(e),
            _ => None,
        }
    }
}

impl<T, E> Default for AsyncStatus<T, E> {
    fn default() -> Self {
        Self::NotAsked
    }
}
impl<T, E> From<Result<T, E>> for AsyncStatus<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::Done(result)
    }
}
