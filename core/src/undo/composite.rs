//! Actions made of other actions.
//!
//! [`CompositeAction`] replays an ordered list of children: undo walks the
//! list backwards, redo walks it forwards. [`UndoTx`] is the composite the
//! manager fills while a transaction is open.

use std::fmt;

use super::action::{Action, Editable};

/// An ordered group of actions that undo and redo as one step.
pub struct CompositeAction<T: Editable> {
    actions: Vec<Box<dyn Action<T>>>,
    description: String,
}

impl<T: Editable> CompositeAction<T> {
    /// Creates an empty composite with the given description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            actions: Vec::new(),
            description: description.into(),
        }
    }

    /// Appends an already applied action.
    pub fn add_action(&mut self, action: Box<dyn Action<T>>) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Children in execution order.
    pub fn actions(&self) -> &[Box<dyn Action<T>>] {
        &self.actions
    }
}

impl<T: Editable> Action<T> for CompositeAction<T> {
    fn undo(&mut self, target: &mut T) {
        // reverse order
        for action in self.actions.iter_mut().rev() {
            action.undo(target);
        }
    }

    fn redo(&mut self, target: &mut T) {
        for action in &mut self.actions {
            action.redo(target);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn set_description(&mut self, description: String) {
        self.description = description;
    }
}

impl<T: Editable> fmt::Debug for CompositeAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAction")
            .field("description", &self.description)
            .field("actions", &self.actions)
            .finish()
    }
}

/// A transaction: the composite collecting actions between
/// [`begin_tx`](super::UndoManager::begin_tx) and
/// [`commit_tx`](super::UndoManager::commit_tx).
pub struct UndoTx<T: Editable> {
    inner: CompositeAction<T>,
}

impl<T: Editable> UndoTx<T> {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            inner: CompositeAction::new(description),
        }
    }

    /// Appends an already applied action.
    pub fn add_action(&mut self, action: Box<dyn Action<T>>) {
        self.inner.add_action(action);
    }

    /// Detaches and returns the only child if there is exactly one.
    ///
    /// Leaves the transaction empty in that case; otherwise returns `None`
    /// and leaves it untouched.
    pub fn single(&mut self) -> Option<Box<dyn Action<T>>> {
        if self.inner.actions.len() != 1 {
            return None;
        }
        self.inner.actions.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn actions(&self) -> &[Box<dyn Action<T>>] {
        self.inner.actions()
    }

}

impl<T: Editable> Action<T> for UndoTx<T> {
    fn undo(&mut self, target: &mut T) {
        self.inner.undo(target);
    }

    fn redo(&mut self, target: &mut T) {
        self.inner.redo(target);
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn set_description(&mut self, description: String) {
        self.inner.set_description(description);
    }
}

impl<T: Editable> fmt::Debug for UndoTx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoTx")
            .field("description", &self.inner.description)
            .field("actions", &self.inner.actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the order in which steps are applied and reverted.
    #[derive(Default)]
    struct Journal {
        entries: Vec<String>,
    }

    impl Editable for Journal {}

    #[derive(Debug)]
    struct Step {
        name: &'static str,
    }

    impl Action<Journal> for Step {
        fn undo(&mut self, target: &mut Journal) {
            target.entries.push(format!("undo {}", self.name));
        }

        fn redo(&mut self, target: &mut Journal) {
            target.entries.push(format!("redo {}", self.name));
        }

        fn description(&self) -> &str {
            self.name
        }

        fn set_description(&mut self, _description: String) {}
    }

    fn steps(names: &[&'static str]) -> Vec<Box<dyn Action<Journal>>> {
        names
            .iter()
            .map(|&name| Box::new(Step { name }) as Box<dyn Action<Journal>>)
            .collect()
    }

    fn group(names: &[&'static str]) -> CompositeAction<Journal> {
        let mut composite = CompositeAction::new("group");
        for action in steps(names) {
            composite.add_action(action);
        }
        composite
    }

    #[test]
    fn composite_undo_runs_in_reverse() {
        let mut journal = Journal::default();
        let mut composite = group(&["a", "b", "c"]);
        composite.undo(&mut journal);
        assert_eq!(journal.entries, ["undo c", "undo b", "undo a"]);
    }

    #[test]
    fn composite_redo_runs_in_order() {
        let mut journal = Journal::default();
        let mut composite = group(&["a", "b", "c"]);
        composite.redo(&mut journal);
        assert_eq!(journal.entries, ["redo a", "redo b", "redo c"]);
    }

    #[test]
    fn composite_len_and_description() {
        let mut composite = group(&["a", "b"]);
        assert_eq!(composite.len(), 2);
        assert!(!composite.is_empty());
        assert!(CompositeAction::<Journal>::new("empty").is_empty());

        composite.set_description("renamed".into());
        assert_eq!(composite.description(), "renamed");
        assert_eq!(composite.actions()[1].description(), "b");
    }

    #[test]
    fn tx_single_detaches_only_child() {
        let mut tx = UndoTx::<Journal>::new("tx");
        tx.add_action(Box::new(Step { name: "only" }));

        let single = tx.single().expect("one child");
        assert_eq!(single.description(), "only");
        assert!(tx.is_empty());
    }

    #[test]
    fn tx_single_is_none_for_zero_or_many() {
        let mut empty = UndoTx::<Journal>::new("empty");
        assert!(empty.single().is_none());

        let mut two = UndoTx::<Journal>::new("two");
        for action in steps(&["a", "b"]) {
            two.add_action(action);
        }
        assert!(two.single().is_none());
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn tx_replays_like_composite() {
        let mut journal = Journal::default();
        let mut tx = UndoTx::new("tx");
        for action in steps(&["a", "b"]) {
            tx.add_action(action);
        }
        tx.undo(&mut journal);
        tx.redo(&mut journal);
        assert_eq!(journal.entries, ["undo b", "undo a", "redo a", "redo b"]);
        assert_eq!(tx.len(), 2);
        assert_eq!(tx.description(), "tx");
    }

    #[test]
    fn debug_lists_children() {
        let tx = {
            let mut tx = UndoTx::<Journal>::new("tx");
            tx.add_action(Box::new(Step { name: "a" }));
            tx
        };
        let debug = format!("{tx:?}");
        assert!(debug.contains("UndoTx"));
        assert!(debug.contains("Step"));
    }
}
