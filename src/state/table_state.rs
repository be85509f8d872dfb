use std::collections::VecDeque;
use std::fmt;

use crate::error::TableError;
use crate::state::aggregate;
use crate::state::command::{AppliedCommand, Command, ExecContext};
use crate::state::data_model::{TableDocument, TableModel};
use crate::state::view::{self, ViewOptions};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Source of "now" in unix milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Everything the store needs from its host, passed in explicitly.
pub struct StoreContext {
    pub history_limit: usize,
    pub clock: Box<dyn Clock>,
}

impl Default for StoreContext {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            clock: Box::new(SystemClock),
        }
    }
}

impl StoreContext {
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            ..Self::default()
        }
    }
}

type Observer = Box<dyn FnMut(&TableDocument)>;

/// Owns the current document and its undo/redo history. The document only
/// changes through [`TableState::do_command`], [`TableState::undo`] and
/// [`TableState::redo`].
pub struct TableState {
    document: TableDocument,
    context: StoreContext,
    undo_stack: VecDeque<AppliedCommand>,
    redo_stack: Vec<AppliedCommand>,
    observers: Vec<Observer>,
}

impl fmt::Debug for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("document", &self.document)
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .finish()
    }
}

impl TableState {
    pub fn new(document: TableDocument, context: StoreContext) -> Self {
        Self {
            document,
            context,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn document(&self) -> &TableDocument {
        &self.document
    }

    pub fn model(&self) -> &TableModel {
        &self.document.model
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Registers a callback invoked with every new snapshot.
    pub fn subscribe(&mut self, observer: impl FnMut(&TableDocument) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Executes `command`, records it for undo and publishes the result.
    ///
    /// On error the document and history are unchanged. A command that
    /// changes nothing is not recorded.
    pub fn do_command(&mut self, command: Command) -> Result<&TableDocument, TableError> {
        let ctx = ExecContext {
            now: self.context.clock.now_ms(),
        };
        let (next, applied) = command.execute(&self.document, &ctx).map_err(|err| {
            tracing::warn!(command = command.name(), error = %err, "command failed");
            err
        })?;

        tracing::debug!(
            command = command.name(),
            edits = applied.journal.len(),
            "executed command"
        );

        if applied.journal.is_empty() {
            return Ok(&self.document);
        }

        self.undo_stack.push_back(applied);
        while self.undo_stack.len() > self.context.history_limit {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        self.replace(next);
        Ok(&self.document)
    }

    pub fn undo(&mut self) -> bool {
        let Some(applied) = self.undo_stack.pop_back() else {
            return false;
        };
        tracing::debug!(command = applied.command.name(), "undo");
        let previous = applied.undo(&self.document);
        self.redo_stack.push(applied);
        self.replace(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(applied) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!(command = applied.command.name(), "redo");
        let next = applied.redo(&self.document);
        self.undo_stack.push_back(applied);
        self.replace(next);
        true
    }

    /// Visible body row ids for the current document.
    pub fn visible_row_ids(&self, options: &ViewOptions) -> Vec<String> {
        view::derive_view(&self.document.model, options)
    }

    pub fn footer_value(&self, column_id: &str, options: &ViewOptions) -> Result<Option<String>, TableError> {
        let rows = self.visible_row_ids(options);
        aggregate::footer_value(&self.document.model, column_id, &rows)
    }

    fn replace(&mut self, document: TableDocument) {
        self.document = document;
        for observer in &mut self.observers {
            observer(&self.document);
        }
    }
}
