//! Transaction log: linear undo/redo command stack with nested, named
//! transactions.
//!
//! `submit` executes the command's apply step immediately and pushes it onto
//! the undo stack (or the innermost open transaction), clearing the redo
//! stack. Undo inverts a whole entry; groups invert innermost-first. Only
//! the outermost commit publishes a transaction as one externally undoable
//! step. Undo/redo with an empty stack is a no-op, not an error.

use crate::document::DocState;
use crate::error::DocError;
use crate::events::DocEvent;

/// A reversible primitive edit. Commands address document state by
/// identifier (symbol/node/slot name), never by live handle, so they stay
/// valid across undo/redo of surrounding structure.
pub trait EditCommand {
    fn title(&self) -> &str;
    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent>;
    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent>;
}

enum HistoryEntry {
    Single(Box<dyn EditCommand>),
    Group {
        title: String,
        commands: Vec<Box<dyn EditCommand>>,
    },
}

impl HistoryEntry {
    fn title(&self) -> &str {
        match self {
            HistoryEntry::Single(cmd) => cmd.title(),
            HistoryEntry::Group { title, .. } => title,
        }
    }

    fn apply_all(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        match self {
            HistoryEntry::Single(cmd) => cmd.apply(state),
            HistoryEntry::Group { commands, .. } => {
                let mut events = Vec::new();
                for cmd in commands.iter_mut() {
                    events.extend(cmd.apply(state));
                }
                events
            }
        }
    }

    fn invert_all(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        match self {
            HistoryEntry::Single(cmd) => cmd.invert(state),
            HistoryEntry::Group { commands, .. } => {
                let mut events = Vec::new();
                for cmd in commands.iter_mut().rev() {
                    events.extend(cmd.invert(state));
                }
                events
            }
        }
    }
}

#[derive(Default)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    open: Vec<(String, Vec<Box<dyn EditCommand>>)>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `cmd` immediately and record it. Returns the events the apply
    /// step produced.
    pub fn submit(&mut self, state: &mut DocState, mut cmd: Box<dyn EditCommand>) -> Vec<DocEvent> {
        let events = cmd.apply(state);
        self.redo.clear();
        if let Some((_, commands)) = self.open.last_mut() {
            commands.push(cmd);
        } else {
            self.undo.push(HistoryEntry::Single(cmd));
        }
        events
    }

    pub fn begin_transaction(&mut self, title: &str) {
        self.open.push((title.to_string(), Vec::new()));
    }

    /// Close the innermost transaction. The outermost commit publishes the
    /// group; nested commits fold into their parent.
    pub fn commit_transaction(&mut self) -> Result<(), DocError> {
        let (title, commands) = self.open.pop().ok_or(DocError::NoOpenTransaction)?;
        if let Some((_, parent)) = self.open.last_mut() {
            parent.extend(commands);
        } else if !commands.is_empty() {
            self.undo.push(HistoryEntry::Group { title, commands });
        }
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        !self.open.is_empty()
    }

    /// Invert the most recent entry. No-op while a transaction is open or
    /// when the stack is empty.
    pub fn undo(&mut self, state: &mut DocState) -> Option<Vec<DocEvent>> {
        if self.in_transaction() {
            return None;
        }
        let mut entry = self.undo.pop()?;
        let events = entry.invert_all(state);
        self.redo.push(entry);
        Some(events)
    }

    /// Re-apply the most recently undone entry in original order.
    pub fn redo(&mut self, state: &mut DocState) -> Option<Vec<DocEvent>> {
        if self.in_transaction() {
            return None;
        }
        let mut entry = self.redo.pop()?;
        let events = entry.apply_all(state);
        self.undo.push(entry);
        Some(events)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_title(&self) -> Option<&str> {
        self.undo.last().map(HistoryEntry::title)
    }

    pub fn redo_title(&self) -> Option<&str> {
        self.redo.last().map(HistoryEntry::title)
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open.clear();
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("open", &self.open.len())
            .finish()
    }
}
