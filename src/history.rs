//! Snapshot-based undo/redo.
//!
//! `entries[0..=index]` is the undo trail, `entries[index + 1..]` the redo
//! branch, and `entries[index]` is always the funnel currently shown. Funnels
//! share unchanged pages and components, so a snapshot costs one clone of the
//! page list rather than a deep copy of the document.

use crate::{EventType, Funnel, FunnelEvent};

/// Default maximum number of snapshots kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A funnel snapshot and the edit that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub funnel: Funnel,

    /// `None` for the initial snapshot
    pub event: Option<FunnelEvent>,
}

/// Undo/redo stack over funnel snapshots
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl History {
    /// Create a history whose only snapshot is `initial`
    pub fn new(initial: Funnel) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Create with a custom depth; a limit below 2 keeps one undo step
    pub fn with_limit(initial: Funnel, limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                funnel: initial,
                event: None,
            }],
            index: 0,
            limit: limit.max(2),
        }
    }

    /// Record the funnel produced by an accepted edit
    ///
    /// Discards the redo branch, then drops the oldest snapshots once the
    /// depth limit is exceeded.
    pub fn record(&mut self, funnel: Funnel, event: FunnelEvent) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            funnel,
            event: Some(event),
        });

        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one snapshot; returns the funnel to show
    pub fn undo(&mut self) -> Option<&Funnel> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index].funnel)
    }

    /// Step forward one snapshot; returns the funnel to show
    pub fn redo(&mut self) -> Option<&Funnel> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index].funnel)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot at the history pointer
    pub fn current(&self) -> &Funnel {
        &self.entries[self.index].funnel
    }

    /// Entry at the history pointer
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// Event that undo would revert
    pub fn undo_event(&self) -> Option<&EventType> {
        if !self.can_undo() {
            return None;
        }
        self.entries[self.index].event.as_ref().map(|e| &e.event)
    }

    /// Event that redo would reapply
    pub fn redo_event(&self) -> Option<&EventType> {
        self.entries
            .get(self.index + 1)
            .and_then(|entry| entry.event.as_ref())
            .map(|e| &e.event)
    }

    /// Menu label such as "Undo Add button"
    pub fn undo_label(&self) -> Option<String> {
        self.undo_event().map(|e| format!("Undo {}", e.describe()))
    }

    pub fn redo_label(&self) -> Option<String> {
        self.redo_event().map(|e| format!("Redo {}", e.describe()))
    }

    /// Replace the whole history with a single snapshot
    pub fn reset(&mut self, funnel: Funnel) {
        self.entries.clear();
        self.entries.push(HistoryEntry {
            funnel,
            event: None,
        });
        self.index = 0;
    }

    /// Number of snapshots kept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
