//! Transactional undo/redo engine.
//!
//! This module provides the traits and types for recording reversible work
//! and replaying it backwards and forwards. It knows nothing about the
//! documents it edits: every action receives its target as an argument.
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`Action`]: a reversible unit of work stored in the history
//! - [`ExecutableAction`]: an operation with an output whose redo is a re-execution
//! - [`CompositeAction`] / [`UndoTx`]: ordered groups of actions
//! - [`UndoManager`]: undo/redo stacks, transactions and description overrides
//!
//! # Transactions
//!
//! Several actions can be grouped into one history step by wrapping them in
//! [`UndoManager::begin_tx`] / [`UndoManager::commit_tx`]. Transactions nest,
//! and [`UndoManager::rollback_tx`] reverts what a transaction did so far
//! without recording anything.
//!
//! # Merging
//!
//! An action on top of the undo stack may absorb the next recorded action
//! (see [`ExecutableAction::merge`]). A deliberate interruption can call
//! [`UndoManager::break_merge`] so that the next action starts a new entry.

mod action;
mod composite;
mod executable;
mod manager;

pub use action::{Action, ActionId, AsAny, Editable, NoOpAction, UndoError};
pub use composite::{CompositeAction, UndoTx};
pub use executable::{CreateAction, ExecutableAction, Executed};
pub use manager::{HistoryEntry, UndoManager};
