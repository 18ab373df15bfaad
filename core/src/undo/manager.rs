//! Undo/redo manager.
//!
//! [`UndoManager`] owns a linear undo stack and a linear redo stack of
//! [`Action`] trait objects, plus the stack of open transactions. Recording
//! a new action clears the redo stack (standard editor behavior).

use std::fmt;

use super::action::{Action, ActionId, Editable, UndoError};
use super::composite::UndoTx;
use super::executable::{CreateAction, ExecutableAction, Executed};

/// An action recorded in top-level history, tagged with its identity.
pub struct HistoryEntry<T: Editable> {
    id: ActionId,
    action: Box<dyn Action<T>>,
}

impl<T: Editable> HistoryEntry<T> {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn description(&self) -> &str {
        self.action.description()
    }

    pub fn action(&self) -> &dyn Action<T> {
        self.action.as_ref()
    }
}

impl<T: Editable> fmt::Debug for HistoryEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("id", &self.id)
            .field("action", &self.action)
            .finish()
    }
}

/// Executes undoable actions and manages their history.
///
/// # Transactions
///
/// Between [`begin_tx`](Self::begin_tx) and [`commit_tx`](Self::commit_tx)
/// every recorded action goes into the innermost open transaction instead of
/// the undo stack. Transactions nest: an inner commit records into the
/// enclosing transaction. On commit an empty transaction is dropped and a
/// transaction holding a single action is replaced by that action.
///
/// # Example
///
/// ```ignore
/// let mut undo = UndoManager::new();
/// let mut session = Session::default();
///
/// undo.execute_action::<AddItem>(item, &mut session);
///
/// undo.begin_tx("Rename item");
/// undo.execute_action::<RemoveItem>("old".into(), &mut session);
/// undo.execute_action::<AddItem>(renamed, &mut session);
/// undo.commit_tx();
///
/// undo.undo_last_action(&mut session); // reverts the rename as one step
/// ```
pub struct UndoManager<T: Editable> {
    enabled: bool,
    undo_tx: Option<UndoTx<T>>,
    nested_txs: Vec<UndoTx<T>>,
    next_description: Option<String>,
    undo_history: Vec<HistoryEntry<T>>,
    redo_history: Vec<HistoryEntry<T>>,
    next_id: u64,
    max_undo: Option<usize>,
    merge_broken: bool,
    /// Tracks distance from the saved state.
    ///
    /// - `Some(0)`: the current state matches the last save.
    /// - `Some(n)` where `n > 0`: `n` undos needed to reach the saved state.
    /// - `Some(n)` where `n < 0`: `|n|` redos needed to reach the saved state.
    /// - `None`: the save point is unreachable.
    save_distance: Option<i64>,
}

impl<T: Editable> UndoManager<T> {
    /// Creates an enabled manager with unbounded history.
    pub fn new() -> Self {
        Self {
            enabled: true,
            undo_tx: None,
            nested_txs: Vec::new(),
            next_description: None,
            undo_history: Vec::new(),
            redo_history: Vec::new(),
            next_id: 0,
            max_undo: None,
            merge_broken: false,
            save_distance: Some(0),
        }
    }

    /// Bounds the undo history. When it grows past `max_undo` entries, the
    /// oldest entry is dropped. `None` means unbounded.
    pub fn with_max_undo(mut self, max_undo: Option<usize>) -> Self {
        self.max_undo = max_undo;
        self
    }

    pub fn max_undo(&self) -> Option<usize> {
        self.max_undo
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stops recording. Existing history is kept.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Executes `action` and, if the manager is enabled and the action has
    /// [undo enabled](ExecutableAction::is_undo_enabled), records it.
    pub fn execute<A: ExecutableAction<T>>(&mut self, mut action: A, target: &mut T) -> A::Output {
        let output = action.execute(target);
        if self.is_enabled() && action.is_undo_enabled() {
            let description = action.description();
            self.add_or_merge(Box::new(Executed::new(action, description)));
        }
        output
    }

    /// Creates an `A` from `args` and [executes](Self::execute) it.
    pub fn execute_action<A: CreateAction<T>>(&mut self, args: A::Args, target: &mut T) -> A::Output {
        self.execute(Self::create_action::<A>(args), target)
    }

    /// Creates an `A` from `args` without executing it.
    pub fn create_action<A: CreateAction<T>>(args: A::Args) -> A {
        A::create(args)
    }

    /// Records an already applied action.
    ///
    /// Applies the pending description override, if any. Goes into the
    /// open transaction when there is one, otherwise onto the undo stack
    /// (clearing the redo stack). Does nothing while disabled.
    pub fn add_or_merge(&mut self, mut action: Box<dyn Action<T>>) {
        if !self.is_enabled() {
            return;
        }

        let described = match self.next_description.take() {
            Some(description) => {
                action.set_description(description);
                true
            }
            None => false,
        };

        match &mut self.undo_tx {
            Some(tx) => tx.add_action(action),
            None => {
                // A described step keeps its own entry.
                if described {
                    self.merge_broken = true;
                }
                self.add_action(action);
            }
        }
    }

    fn add_action(&mut self, mut action: Box<dyn Action<T>>) {
        // Clearing the redo stack invalidates a save point that was in redo.
        self.redo_history.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if !self.merge_broken
            && let Some(last) = self.undo_history.last_mut()
        {
            match last.action.merge(action) {
                None => {
                    log::trace!("Merged into {} ({})", last.id, last.action.description());
                    if self.save_distance == Some(0) {
                        self.save_distance = None;
                    }
                    return;
                }
                Some(returned) => action = returned,
            }
        }
        self.merge_broken = false;

        let id = ActionId::new(self.next_id);
        self.next_id += 1;
        log::trace!("Recorded {id} ({})", action.description());

        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.undo_history.push(HistoryEntry { id, action });
        self.enforce_max_undo();
    }

    fn enforce_max_undo(&mut self) {
        let Some(max_undo) = self.max_undo else {
            return;
        };
        while self.undo_history.len() > max_undo {
            let dropped = self.undo_history.remove(0);
            log::trace!("Dropped {} ({}) over capacity", dropped.id, dropped.description());
        }
        // The save point was beyond the oldest surviving entry.
        if let Some(d) = self.save_distance
            && d > self.undo_history.len() as i64
        {
            self.save_distance = None;
        }
    }

    /// Prevents the next recorded action from merging into the current top
    /// of the undo stack.
    pub fn break_merge(&mut self) {
        self.merge_broken = true;
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Opens a transaction, suspending the currently open one (if any).
    ///
    /// A pending description override replaces `description`.
    pub fn begin_tx(&mut self, description: impl Into<String>) {
        if let Some(current) = self.undo_tx.take() {
            self.nested_txs.push(current);
        }

        let mut tx = UndoTx::new(description);
        if let Some(description) = self.next_description.take() {
            tx.set_description(description);
        }
        log::trace!("Begin tx '{}' (depth {})", tx.description(), self.nested_txs.len() + 1);
        self.undo_tx = Some(tx);
    }

    /// Closes the innermost transaction and records its content.
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open. See [`try_commit_tx`](Self::try_commit_tx).
    pub fn commit_tx(&mut self) {
        if let Err(e) = self.try_commit_tx() {
            panic!("commit_tx: {e}");
        }
    }

    /// Closes the innermost transaction and records its content, or returns
    /// [`UndoError::NoTransaction`] if none is open.
    pub fn try_commit_tx(&mut self) -> Result<(), UndoError> {
        let mut tx = self.pop_tx()?;

        if !self.is_enabled() {
            return Ok(());
        }

        if tx.is_empty() {
            log::trace!("Dropped empty tx '{}'", tx.description());
            return Ok(());
        }

        // A committed transaction is a step of its own: it neither merges
        // into the entry below nor absorbs the next action.
        let top_level = self.undo_tx.is_none();
        if top_level {
            self.merge_broken = true;
        }
        match tx.single() {
            Some(single) => self.add_or_merge(single),
            None => {
                log::trace!("Commit tx '{}' ({} actions)", tx.description(), tx.len());
                self.add_or_merge(Box::new(tx));
            }
        }
        if top_level {
            self.merge_broken = true;
        }
        Ok(())
    }

    /// Closes the innermost transaction and undoes everything recorded in it.
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open. See [`try_rollback_tx`](Self::try_rollback_tx).
    pub fn rollback_tx(&mut self, target: &mut T) {
        if let Err(e) = self.try_rollback_tx(target) {
            panic!("rollback_tx: {e}");
        }
    }

    /// Closes the innermost transaction and undoes everything recorded in it,
    /// or returns [`UndoError::NoTransaction`] if none is open.
    pub fn try_rollback_tx(&mut self, target: &mut T) -> Result<(), UndoError> {
        let mut tx = self.pop_tx()?;
        log::debug!("Rollback tx '{}' ({} actions)", tx.description(), tx.len());
        tx.undo(target);
        Ok(())
    }

    /// Detaches the current transaction and resumes the enclosing one.
    fn pop_tx(&mut self) -> Result<UndoTx<T>, UndoError> {
        let tx = self.undo_tx.take().ok_or(UndoError::NoTransaction)?;
        self.undo_tx = self.nested_txs.pop();
        Ok(tx)
    }

    /// Returns `true` while a transaction is open.
    pub fn is_in_tx(&self) -> bool {
        self.undo_tx.is_some()
    }

    /// Number of open transactions (0 when none).
    pub fn tx_depth(&self) -> usize {
        match self.undo_tx {
            Some(_) => self.nested_txs.len() + 1,
            None => 0,
        }
    }

    /// Overrides the description of the next recorded action or begun
    /// transaction.
    ///
    /// Ignored while disabled or when an override is already pending.
    pub fn set_next_action_description(&mut self, description: impl Into<String>) {
        if self.is_enabled() && self.next_description.is_none() {
            self.next_description = Some(description.into());
        }
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    /// Undoes the most recent action and moves it to the redo stack.
    ///
    /// Returns `false` if nothing was undone (empty history or disabled).
    pub fn undo_last_action(&mut self, target: &mut T) -> bool {
        let Some(mut entry) = self.pop_undo_entry() else {
            return false;
        };
        log::debug!("Undo {} ({})", entry.id, entry.action.description());
        entry.action.undo(target);
        self.redo_history.push(entry);
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        self.merge_broken = true;
        true
    }

    /// Redoes the most recently undone action and moves it back to the undo
    /// stack. Works while disabled.
    ///
    /// Returns `false` if the redo stack is empty.
    pub fn redo_last_action(&mut self, target: &mut T) -> bool {
        let Some(mut entry) = self.redo_history.pop() else {
            return false;
        };
        log::debug!("Redo {} ({})", entry.id, entry.action.description());
        entry.action.redo(target);
        self.undo_history.push(entry);
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.merge_broken = true;
        self.enforce_max_undo();
        true
    }

    /// Undoes actions until `id` is the most recent one. `id` itself stays
    /// applied. If `id` is not in the undo history, undoes everything.
    pub fn undo_until(&mut self, id: ActionId, target: &mut T) {
        while self.last_undo_action_id().is_some_and(|last| last != id) {
            if !self.undo_last_action(target) {
                break;
            }
        }
    }

    /// Undoes every action in the undo history, most recent first.
    pub fn undo_all(&mut self, target: &mut T) {
        while self.undo_last_action(target) {}
    }

    /// Redoes actions up to and including `id`. If `id` is not in the redo
    /// history, redoes everything.
    pub fn redo_until(&mut self, id: ActionId, target: &mut T) {
        while self.last_redo_action_id().is_some_and(|last| last != id) {
            self.redo_last_action(target);
        }
        // one more for the target itself
        self.redo_last_action(target);
    }

    /// Removes the most recent action from the undo history without undoing
    /// it. Returns `None` while disabled or when the history is empty.
    pub fn pop_last_undo_action(&mut self) -> Option<Box<dyn Action<T>>> {
        let entry = self.pop_undo_entry()?;
        // The popped effect stays applied, so no save point behind it is
        // reachable anymore.
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
        Some(entry.action)
    }

    fn pop_undo_entry(&mut self) -> Option<HistoryEntry<T>> {
        if !self.is_enabled() {
            return None;
        }
        self.undo_history.pop()
    }

    /// Empties both stacks. Open transactions are left alone.
    pub fn clear(&mut self) {
        self.undo_history.clear();
        self.redo_history.clear();
        self.merge_broken = false;
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn has_undo_history(&self) -> bool {
        !self.undo_history.is_empty()
    }

    pub fn has_redo_history(&self) -> bool {
        !self.redo_history.is_empty()
    }

    pub fn has_history(&self) -> bool {
        self.has_undo_history() || self.has_redo_history()
    }

    pub fn last_undo_action(&self) -> Option<&dyn Action<T>> {
        self.undo_history.last().map(HistoryEntry::action)
    }

    pub fn last_redo_action(&self) -> Option<&dyn Action<T>> {
        self.redo_history.last().map(HistoryEntry::action)
    }

    pub fn last_undo_action_id(&self) -> Option<ActionId> {
        self.undo_history.last().map(HistoryEntry::id)
    }

    pub fn last_redo_action_id(&self) -> Option<ActionId> {
        self.redo_history.last().map(HistoryEntry::id)
    }

    /// Undo history, oldest first (the next action to undo is last).
    pub fn undo_history(&self) -> &[HistoryEntry<T>] {
        &self.undo_history
    }

    /// Redo history, oldest first (the next action to redo is last).
    pub fn redo_history(&self) -> &[HistoryEntry<T>] {
        &self.redo_history
    }

    pub fn undo_count(&self) -> usize {
        self.undo_history.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_history.len()
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// Returns `true` if the current state differs from the last saved state
    /// or the save point can no longer be reached through undo/redo.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }
}

impl<T: Editable> Default for UndoManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for UndoManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("enabled", &self.enabled)
            .field("undo_count", &self.undo_history.len())
            .field("redo_count", &self.redo_history.len())
            .field("tx_depth", &self.tx_depth())
            .field("next_description", &self.next_description)
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::NoOpAction;

    #[derive(Default)]
    struct Counter {
        value: i32,
        log: Vec<String>,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl ExecutableAction<Counter> for Add {
        type Output = i32;

        fn execute(&mut self, target: &mut Counter) -> i32 {
            target.value += self.amount;
            target.log.push(format!("+{}", self.amount));
            target.value
        }

        fn undo(&mut self, target: &mut Counter) {
            target.value -= self.amount;
            target.log.push(format!("-{}", self.amount));
        }

        fn description(&self) -> String {
            format!("Add {}", self.amount)
        }
    }

    impl CreateAction<Counter> for Add {
        type Args = i32;

        fn create(amount: i32) -> Self {
            Self { amount }
        }
    }

    /// Consecutive `SetValue` actions merge (keeps the first old value,
    /// takes the latest new value).
    #[derive(Debug)]
    struct SetValue {
        old_value: i32,
        new_value: i32,
    }

    impl ExecutableAction<Counter> for SetValue {
        type Output = ();

        fn execute(&mut self, target: &mut Counter) {
            self.old_value = target.value;
            target.value = self.new_value;
        }

        fn undo(&mut self, target: &mut Counter) {
            target.value = self.old_value;
        }

        fn description(&self) -> String {
            "Set value".into()
        }

        fn merge(&mut self, next: &Self) -> bool {
            self.new_value = next.new_value;
            true
        }
    }

    impl CreateAction<Counter> for SetValue {
        type Args = i32;

        fn create(new_value: i32) -> Self {
            Self {
                old_value: 0,
                new_value,
            }
        }
    }

    /// Runs but never records itself.
    #[derive(Debug)]
    struct Transient;

    impl ExecutableAction<Counter> for Transient {
        type Output = ();

        fn execute(&mut self, target: &mut Counter) {
            target.value += 100;
        }

        fn undo(&mut self, _target: &mut Counter) {
            unreachable!("transient actions should never be undone");
        }

        fn description(&self) -> String {
            "Transient".into()
        }

        fn is_undo_enabled(&self) -> bool {
            false
        }
    }

    fn add(undo: &mut UndoManager<Counter>, counter: &mut Counter, amount: i32) -> i32 {
        undo.execute_action::<Add>(amount, counter)
    }

    fn descriptions(entries: &[HistoryEntry<Counter>]) -> Vec<&str> {
        entries.iter().map(HistoryEntry::description).collect()
    }

    #[test]
    fn execute_returns_output_and_records() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        assert_eq!(add(&mut undo, &mut counter, 5), 5);
        assert_eq!(undo.undo_count(), 1);
        assert_eq!(undo.redo_count(), 0);
        assert_eq!(undo.last_undo_action().unwrap().description(), "Add 5");
    }

    #[test]
    fn undo_moves_to_redo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        add(&mut undo, &mut counter, 5);
        assert!(undo.undo_last_action(&mut counter));

        assert_eq!(counter.value, 0);
        assert!(!undo.has_undo_history());
        assert!(undo.has_redo_history());
        assert!(undo.has_history());
    }

    #[test]
    fn redo_moves_back_to_undo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        add(&mut undo, &mut counter, 5);
        undo.undo_last_action(&mut counter);
        assert!(undo.redo_last_action(&mut counter));

        assert_eq!(counter.value, 5);
        assert_eq!(undo.undo_count(), 1);
        assert_eq!(undo.redo_count(), 0);
    }

    #[test]
    fn empty_undo_and_redo_are_noops() {
        let mut undo = UndoManager::<Counter>::new();
        let mut counter = Counter::default();

        assert!(!undo.undo_last_action(&mut counter));
        assert!(!undo.redo_last_action(&mut counter));
        assert!(!undo.has_history());
        assert!(undo.last_undo_action().is_none());
        assert!(undo.last_redo_action_id().is_none());
    }

    #[test]
    fn new_action_clears_redo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        undo.undo_last_action(&mut counter);
        assert!(undo.has_redo_history());

        add(&mut undo, &mut counter, 3);
        assert!(!undo.has_redo_history());
        assert_eq!(counter.value, 4);
    }

    #[test]
    fn undo_not_enabled_action_is_not_recorded() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute(Transient, &mut counter);
        assert_eq!(counter.value, 100);
        assert!(!undo.has_undo_history());
    }

    #[test]
    fn disabled_executes_without_recording() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);

        undo.disable();
        assert!(!undo.is_enabled());
        add(&mut undo, &mut counter, 1);
        assert_eq!(counter.value, 2);
        assert_eq!(undo.undo_count(), 1);

        // history is kept but cannot be popped
        assert!(!undo.undo_last_action(&mut counter));
        assert!(undo.pop_last_undo_action().is_none());
        undo.undo_all(&mut counter);
        assert_eq!(undo.undo_count(), 1);

        undo.enable();
        add(&mut undo, &mut counter, 1);
        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn redo_works_while_disabled() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 4);
        undo.undo_last_action(&mut counter);

        undo.disable();
        assert!(undo.redo_last_action(&mut counter));
        assert_eq!(counter.value, 4);
    }

    #[test]
    fn next_description_applies_once() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.set_next_action_description("Custom");
        undo.set_next_action_description("Ignored");
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);

        assert_eq!(descriptions(undo.undo_history()), ["Custom", "Add 2"]);
    }

    #[test]
    fn next_description_is_not_merged_away() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute_action::<SetValue>(1, &mut counter);
        undo.set_next_action_description("Custom");
        undo.execute_action::<SetValue>(2, &mut counter);

        assert_eq!(descriptions(undo.undo_history()), ["Set value", "Custom"]);
        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn described_entry_still_absorbs_followers() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.set_next_action_description("Custom");
        undo.execute_action::<SetValue>(1, &mut counter);
        undo.execute_action::<SetValue>(2, &mut counter);

        assert_eq!(descriptions(undo.undo_history()), ["Custom"]);
        assert_eq!(counter.value, 2);
    }

    #[test]
    fn next_description_ignored_while_disabled() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.disable();
        undo.set_next_action_description("Custom");
        undo.enable();
        add(&mut undo, &mut counter, 1);

        assert_eq!(descriptions(undo.undo_history()), ["Add 1"]);
    }

    #[test]
    fn next_description_renames_begun_tx() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.set_next_action_description("Renamed tx");
        undo.begin_tx("Original");
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        undo.commit_tx();

        assert_eq!(descriptions(undo.undo_history()), ["Renamed tx"]);
    }

    #[test]
    fn empty_tx_is_dropped() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);

        undo.begin_tx("Nothing");
        undo.commit_tx();

        assert_eq!(undo.undo_count(), 1);
        assert!(!undo.is_in_tx());
    }

    #[test]
    fn single_action_tx_is_unwrapped() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("Wrapper");
        add(&mut undo, &mut counter, 3);
        undo.commit_tx();

        let last = undo.last_undo_action().unwrap();
        assert_eq!(last.description(), "Add 3");
        assert!(last.as_any().downcast_ref::<UndoTx<Counter>>().is_none());

        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn multi_action_tx_undoes_in_reverse() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("Pair");
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        assert!(!undo.has_undo_history());
        undo.commit_tx();

        assert_eq!(descriptions(undo.undo_history()), ["Pair"]);
        counter.log.clear();
        undo.undo_last_action(&mut counter);
        assert_eq!(counter.log, ["-2", "-1"]);
        undo.redo_last_action(&mut counter);
        assert_eq!(counter.log, ["-2", "-1", "+1", "+2"]);
    }

    #[test]
    fn nested_tx_records_into_outer() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("outer");
        add(&mut undo, &mut counter, 1);
        undo.begin_tx("inner");
        assert_eq!(undo.tx_depth(), 2);
        add(&mut undo, &mut counter, 2);
        undo.commit_tx();
        assert_eq!(undo.tx_depth(), 1);
        undo.commit_tx();
        assert_eq!(undo.tx_depth(), 0);

        assert_eq!(descriptions(undo.undo_history()), ["outer"]);
        let outer = undo.last_undo_action().unwrap();
        let outer = outer.as_any().downcast_ref::<UndoTx<Counter>>().unwrap();
        let children: Vec<_> = outer.actions().iter().map(|a| a.description()).collect();
        assert_eq!(children, ["Add 1", "Add 2"]);

        counter.log.clear();
        undo.undo_last_action(&mut counter);
        assert_eq!(counter.log, ["-2", "-1"]);
    }

    #[test]
    fn rollback_restores_and_records_nothing() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 10);

        undo.begin_tx("Doomed");
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        undo.rollback_tx(&mut counter);

        assert_eq!(counter.value, 10);
        assert_eq!(descriptions(undo.undo_history()), ["Add 10"]);
        assert!(!undo.is_in_tx());
    }

    #[test]
    fn inner_rollback_keeps_outer_open() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("outer");
        add(&mut undo, &mut counter, 1);
        undo.begin_tx("inner");
        add(&mut undo, &mut counter, 2);
        undo.rollback_tx(&mut counter);
        assert_eq!(counter.value, 1);
        assert!(undo.is_in_tx());
        undo.commit_tx();

        // single surviving action is unwrapped
        assert_eq!(descriptions(undo.undo_history()), ["Add 1"]);
    }

    #[test]
    fn commit_without_tx_is_an_error() {
        let mut undo = UndoManager::<Counter>::new();
        let mut counter = Counter::default();
        assert_eq!(undo.try_commit_tx(), Err(UndoError::NoTransaction));
        assert_eq!(
            undo.try_rollback_tx(&mut counter),
            Err(UndoError::NoTransaction)
        );
    }

    #[test]
    #[should_panic(expected = "no current transaction")]
    fn commit_without_tx_panics() {
        let mut undo = UndoManager::<Counter>::new();
        undo.commit_tx();
    }

    #[test]
    #[should_panic(expected = "no current transaction")]
    fn rollback_without_tx_panics() {
        let mut undo = UndoManager::<Counter>::new();
        undo.rollback_tx(&mut Counter::default());
    }

    #[test]
    fn commit_while_disabled_drops_tx() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("tx");
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 1);
        undo.disable();
        undo.commit_tx();
        undo.enable();

        assert!(!undo.has_undo_history());
        assert_eq!(counter.value, 2);
    }

    #[test]
    fn undo_until_stops_at_target() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        let target = undo.last_undo_action_id().unwrap();
        add(&mut undo, &mut counter, 2);
        add(&mut undo, &mut counter, 4);

        undo.undo_until(target, &mut counter);

        assert_eq!(counter.value, 1);
        assert_eq!(undo.last_undo_action_id(), Some(target));
        assert_eq!(undo.redo_count(), 2);
    }

    #[test]
    fn undo_until_absent_target_undoes_all() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        let stale = undo.last_undo_action_id().unwrap();
        undo.clear();
        add(&mut undo, &mut counter, 2);
        add(&mut undo, &mut counter, 4);

        undo.undo_until(stale, &mut counter);

        assert_eq!(counter.value, 1);
        assert!(!undo.has_undo_history());
    }

    #[test]
    fn redo_until_includes_target() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        let target = undo.last_undo_action_id().unwrap();
        add(&mut undo, &mut counter, 4);
        undo.undo_all(&mut counter);
        assert_eq!(counter.value, 0);

        undo.redo_until(target, &mut counter);

        assert_eq!(counter.value, 3);
        assert_eq!(undo.last_undo_action_id(), Some(target));
        assert_eq!(undo.redo_count(), 1);
    }

    #[test]
    fn redo_until_top_redoes_exactly_one() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        undo.undo_all(&mut counter);

        let top = undo.last_redo_action_id().unwrap();
        undo.redo_until(top, &mut counter);

        assert_eq!(counter.value, 1);
        assert_eq!(undo.redo_count(), 1);
    }

    #[test]
    fn redo_until_absent_target_redoes_all() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        let stale = undo.last_undo_action_id().unwrap();
        undo.clear();
        add(&mut undo, &mut counter, 2);
        add(&mut undo, &mut counter, 4);
        undo.undo_all(&mut counter);

        undo.redo_until(stale, &mut counter);

        assert_eq!(counter.value, 7);
        assert!(!undo.has_redo_history());
        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn ids_survive_undo_redo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        let id = undo.last_undo_action_id().unwrap();

        undo.undo_last_action(&mut counter);
        assert_eq!(undo.last_redo_action_id(), Some(id));
        undo.redo_last_action(&mut counter);
        assert_eq!(undo.last_undo_action_id(), Some(id));

        add(&mut undo, &mut counter, 1);
        assert_ne!(undo.last_undo_action_id(), Some(id));
    }

    #[test]
    fn pop_last_undo_action_transfers_ownership() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);

        let mut action = undo.pop_last_undo_action().unwrap();
        assert!(!undo.has_history());
        action.undo(&mut counter);
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn add_or_merge_accepts_plain_actions() {
        let mut undo = UndoManager::<Counter>::new();
        undo.add_or_merge(Box::new(NoOpAction::new("Marker")));
        assert_eq!(descriptions(undo.undo_history()), ["Marker"]);
    }

    #[test]
    fn consecutive_mergeable_actions_collapse() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute_action::<SetValue>(1, &mut counter);
        undo.execute_action::<SetValue>(2, &mut counter);
        undo.execute_action::<SetValue>(3, &mut counter);
        assert_eq!(undo.undo_count(), 1);

        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 0);
        undo.redo_last_action(&mut counter);
        assert_eq!(counter.value, 3);
    }

    #[test]
    fn break_merge_separates_entries() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute_action::<SetValue>(1, &mut counter);
        undo.break_merge();
        undo.execute_action::<SetValue>(2, &mut counter);
        undo.execute_action::<SetValue>(3, &mut counter);
        assert_eq!(undo.undo_count(), 2);

        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn no_merge_after_undo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute_action::<SetValue>(1, &mut counter);
        undo.execute_action::<Add>(1, &mut counter);
        undo.undo_last_action(&mut counter);
        undo.execute_action::<SetValue>(5, &mut counter);

        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn merging_does_not_happen_inside_tx() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("Drag");
        undo.execute_action::<SetValue>(1, &mut counter);
        undo.execute_action::<SetValue>(2, &mut counter);
        undo.commit_tx();

        let tx = undo.last_undo_action().unwrap();
        let tx = tx.as_any().downcast_ref::<UndoTx<Counter>>().unwrap();
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn single_action_tx_does_not_merge_into_previous() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.execute_action::<SetValue>(1, &mut counter);
        undo.begin_tx("Reset to 5");
        undo.execute_action::<SetValue>(5, &mut counter);
        undo.commit_tx();

        assert_eq!(undo.undo_count(), 2);
        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 1);
        assert_eq!(undo.undo_count(), 1);
    }

    #[test]
    fn committed_tx_does_not_absorb_next_action() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("Reset to 5");
        undo.execute_action::<SetValue>(5, &mut counter);
        undo.commit_tx();
        undo.execute_action::<SetValue>(7, &mut counter);

        assert_eq!(undo.undo_count(), 2);
        undo.undo_last_action(&mut counter);
        assert_eq!(counter.value, 5);
    }

    #[test]
    fn nested_commit_keeps_merging_off_inside_outer_tx() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();

        undo.begin_tx("outer");
        undo.execute_action::<SetValue>(1, &mut counter);
        undo.begin_tx("inner");
        undo.execute_action::<SetValue>(2, &mut counter);
        undo.commit_tx();
        undo.commit_tx();

        let outer = undo.last_undo_action().unwrap();
        let outer = outer.as_any().downcast_ref::<UndoTx<Counter>>().unwrap();
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn last_redo_action_is_next_to_redo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        assert!(undo.last_redo_action().is_none());

        undo.undo_last_action(&mut counter);
        assert_eq!(undo.last_redo_action().unwrap().description(), "Add 2");
        undo.undo_last_action(&mut counter);
        assert_eq!(undo.last_redo_action().unwrap().description(), "Add 1");
    }

    #[test]
    fn undo_until_while_disabled_stops() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        let target = undo.last_undo_action_id().unwrap();
        add(&mut undo, &mut counter, 2);

        undo.disable();
        undo.undo_until(target, &mut counter);

        assert_eq!(counter.value, 3);
        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut undo = UndoManager::new().with_max_undo(Some(2));
        let mut counter = Counter::default();
        assert_eq!(undo.max_undo(), Some(2));

        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        add(&mut undo, &mut counter, 4);
        assert_eq!(undo.undo_count(), 2);

        undo.undo_all(&mut counter);
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        add(&mut undo, &mut counter, 2);
        undo.undo_last_action(&mut counter);

        undo.clear();
        assert!(!undo.has_history());
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn save_tracking_follows_undo_redo() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        assert!(!undo.has_unsaved_changes());

        add(&mut undo, &mut counter, 1);
        assert!(undo.has_unsaved_changes());
        undo.mark_saved();
        assert!(!undo.has_unsaved_changes());

        add(&mut undo, &mut counter, 2);
        assert!(undo.has_unsaved_changes());
        undo.undo_last_action(&mut counter);
        assert!(!undo.has_unsaved_changes());
        undo.undo_last_action(&mut counter);
        assert!(undo.has_unsaved_changes());
        undo.redo_last_action(&mut counter);
        assert!(!undo.has_unsaved_changes());
    }

    #[test]
    fn save_point_in_redo_lost_on_new_action() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        undo.mark_saved();
        undo.undo_last_action(&mut counter);

        add(&mut undo, &mut counter, 2);
        undo.undo_last_action(&mut counter);
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn merge_into_saved_entry_is_unsaved() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        undo.execute_action::<SetValue>(1, &mut counter);
        undo.mark_saved();
        undo.execute_action::<SetValue>(2, &mut counter);
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn clear_at_save_point_stays_saved() {
        let mut undo = UndoManager::new();
        let mut counter = Counter::default();
        add(&mut undo, &mut counter, 1);
        undo.mark_saved();
        undo.clear();
        assert!(!undo.has_unsaved_changes());

        add(&mut undo, &mut counter, 1);
        undo.clear();
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn create_action_does_not_execute() {
        let action = UndoManager::<Counter>::create_action::<Add>(7);
        assert_eq!(action.amount, 7);
    }

    #[test]
    fn debug_impl() {
        let undo = UndoManager::<Counter>::new();
        let debug = format!("{undo:?}");
        assert!(debug.contains("UndoManager"));
        assert!(debug.contains("undo_count"));
    }
}
