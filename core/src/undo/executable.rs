//! Actions that are executed once and replayed on redo.
//!
//! Application code implements [`ExecutableAction`]: `execute` performs the
//! work (and returns whatever the caller needs), `undo` reverts it. The
//! manager wraps the action in [`Executed`], whose `redo` simply calls
//! `execute` again and discards the output.

use std::fmt;

use super::action::{Action, Editable};

/// An operation that produces an output and can be reverted.
///
/// `execute` must be safe to call again after `undo`: redo is defined as a
/// second `execute`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct RemoveItem {
///     name: String,
///     removed: Option<Item>,
/// }
///
/// impl ExecutableAction<Document> for RemoveItem {
///     type Output = bool;
///
///     fn execute(&mut self, target: &mut Document) -> bool {
///         self.removed = target.remove(&self.name);
///         self.removed.is_some()
///     }
///
///     fn undo(&mut self, target: &mut Document) {
///         if let Some(item) = self.removed.clone() {
///             target.insert(item);
///         }
///     }
///
///     fn description(&self) -> String {
///         format!("Remove {}", self.name)
///     }
/// }
/// ```
pub trait ExecutableAction<T: Editable>: fmt::Debug + 'static {
    /// Value handed back to the caller of
    /// [`UndoManager::execute`](super::UndoManager::execute).
    type Output;

    /// Applies the action and returns its output.
    fn execute(&mut self, target: &mut T) -> Self::Output;

    /// Reverts what the last `execute` did.
    fn undo(&mut self, target: &mut T);

    /// Initial description, read once when the action enters the history.
    fn description(&self) -> String;

    /// Whether this instance is recorded after executing.
    ///
    /// Checked after `execute`, so an action can opt out once it knows it
    /// had no effect.
    ///
    /// Default: `true`.
    fn is_undo_enabled(&self) -> bool {
        true
    }

    /// Absorbs `next` (the action being recorded right after `self`).
    ///
    /// Returns `true` when merged. Default: `false`.
    fn merge(&mut self, _next: &Self) -> bool {
        false
    }
}

/// Constructs an action from its arguments.
///
/// Used by [`UndoManager::execute_action`](super::UndoManager::execute_action)
/// and [`UndoManager::create_action`](super::UndoManager::create_action).
pub trait CreateAction<T: Editable>: ExecutableAction<T> + Sized {
    type Args;

    fn create(args: Self::Args) -> Self;
}

/// Adapter storing an [`ExecutableAction`] in the history.
#[derive(Debug)]
pub struct Executed<A> {
    action: A,
    description: String,
}

impl<A> Executed<A> {
    pub fn new(action: A, description: String) -> Self {
        Self {
            action,
            description,
        }
    }
}

impl<T: Editable, A: ExecutableAction<T>> Action<T> for Executed<A> {
    fn undo(&mut self, target: &mut T) {
        self.action.undo(target);
    }

    fn redo(&mut self, target: &mut T) {
        let _ = self.action.execute(target);
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn set_description(&mut self, description: String) {
        self.description = description;
    }

    fn merge(&mut self, other: Box<dyn Action<T>>) -> Option<Box<dyn Action<T>>> {
        if let Some(next) = other.as_ref().as_any().downcast_ref::<Self>()
            && self.action.merge(&next.action)
        {
            return None;
        }
        Some(other)
    }
}
