use std::fmt::Write;

use shaderbox_core::undo::UndoManager;

use crate::session::Session;

/// Renders the undo/redo history as text.
///
/// Redo entries come first (the next one to redo closest to the marker),
/// then the current position marker, then the undo entries, most recent
/// first. Each entry carries the index `undo-until`/`redo-until` accept.
pub fn show_history(history: &UndoManager<Session>) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "Undo: {}  Redo: {}",
        history.undo_count(),
        history.redo_count()
    );
    if !history.is_enabled() {
        out.push_str("  (recording disabled)");
    }
    if history.has_unsaved_changes() {
        out.push_str("  *unsaved*");
    }
    out.push('\n');

    for (index, entry) in history.redo_history().iter().enumerate() {
        let _ = writeln!(out, "  REDO {index:>3}  {}", entry.description());
    }

    out.push_str("▸ current\n");

    for (index, entry) in history.undo_history().iter().enumerate().rev() {
        let _ = writeln!(out, "  UNDO {index:>3}  {}", entry.description());
    }

    out
}
