//! Editable targets and reversible actions.
//!
//! This module defines the core abstractions for the undo/redo engine:
//!
//! - [`Editable`]: marker trait for types that actions operate on
//! - [`Action`]: a reversible unit of work stored in the history
//! - [`ActionId`]: identity handle of an entry in the history
//! - [`NoOpAction`]: an action that does nothing
//! - [`UndoError`]: error type for transaction misuse

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used by
/// [`Action::merge`] to downcast `&dyn Action<T>` to the concrete
/// action type.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Actions never hold a reference to their target: the target is handed to
/// every `execute`, `undo` and `redo` call instead.
///
/// # Example
///
/// ```ignore
/// struct MySession { /* ... */ }
/// impl Editable for MySession {}
/// ```
pub trait Editable: 'static {}

/// Identity of an action recorded in the undo/redo history.
///
/// Ids are assigned by [`UndoManager`](super::UndoManager) when an action
/// reaches top-level history and stay attached to the action while it moves
/// between the undo and redo stacks. A manager never hands out the same id
/// twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

impl ActionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error type for undo manager operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoError {
    /// `commit_tx` or `rollback_tx` was called with no open transaction.
    NoTransaction,
}

impl fmt::Display for UndoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransaction => write!(f, "no current transaction"),
        }
    }
}

impl std::error::Error for UndoError {}

/// A reversible unit of work (Command pattern).
///
/// Actions are stored in the history as `Box<dyn Action<T>>`, so this trait
/// is dyn-compatible. Most application code does not implement it directly:
/// implement [`ExecutableAction`](super::ExecutableAction) and let the
/// manager adapt it.
///
/// # Merging
///
/// An action at the top of the undo history may absorb the next action
/// recorded after it. Override [`merge`](Self::merge) and use
/// [`AsAny::as_any`] on `other` to downcast it to the concrete type.
pub trait Action<T: Editable>: fmt::Debug + AsAny {
    /// Reverses the effect of the last [`redo`](Self::redo) (or the initial
    /// execution).
    fn undo(&mut self, target: &mut T);

    /// Reapplies the effect of the action after an [`undo`](Self::undo).
    fn redo(&mut self, target: &mut T);

    /// A short, human-readable description for display in a history list.
    fn description(&self) -> &str;

    /// Replaces the description. Has no effect on behavior.
    fn set_description(&mut self, description: String);

    /// Tries to merge `other` into `self`, taking ownership.
    ///
    /// Returns `None` when `other` was absorbed, or `Some(other)` back to
    /// the caller when the two actions are not compatible.
    ///
    /// Returns `Some(other)` by default (no merging).
    fn merge(&mut self, other: Box<dyn Action<T>>) -> Option<Box<dyn Action<T>>> {
        Some(other)
    }
}

/// An action with no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoOpAction {
    description: String,
}

impl NoOpAction {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl<T: Editable> Action<T> for NoOpAction {
    fn undo(&mut self, _target: &mut T) {}

    fn redo(&mut self, _target: &mut T) {}

    fn description(&self) -> &str {
        &self.description
    }

    fn set_description(&mut self, description: String) {
        self.description = description;
    }
}
