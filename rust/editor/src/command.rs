// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Undo/redo command log.
//!
//! Executing a new command always clears the redo history, so there are no
//! redo branches. Undo and redo on an empty history are silent no-ops.

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::Result;

/// A reversible scene mutation.
///
/// Everything needed to invert the action is captured when the command is
/// built, not when it is undone.
pub trait Command: std::fmt::Debug {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn execute(&mut self, doc: &mut Document) -> Result<()>;

    fn undo(&mut self, doc: &mut Document) -> Result<()>;

    /// Called once when the stack drops the command for good. Commands free
    /// the arena nodes that can no longer come back into the scene.
    fn discard(&mut self, _doc: &mut Document, _state: Discarded) {}
}

/// State a command is in when the stack drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discarded {
    /// Cleared from the redo history after being undone
    Undone,
    /// Trimmed from the front of the undo history after being executed
    Executed,
}

/// Undo and redo histories, most recent last.
#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    /// Oldest entries are dropped beyond this; 0 keeps everything
    max_history: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CommandStack {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Run a command and record it. A command whose execute fails is not
    /// recorded and the redo history is kept.
    pub fn execute(&mut self, mut command: Box<dyn Command>, doc: &mut Document) -> Result<()> {
        command.execute(doc)?;
        debug!(command = command.name(), "execute");

        self.undo_stack.push(command);
        for mut dropped in self.redo_stack.drain(..).rev() {
            dropped.discard(doc, Discarded::Undone);
        }

        if self.max_history > 0 && self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            for mut dropped in self.undo_stack.drain(..excess) {
                debug!(command = dropped.name(), "history limit reached");
                dropped.discard(doc, Discarded::Executed);
            }
        }
        Ok(())
    }

    /// Undo the most recent command. Returns false when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = command.undo(doc) {
            warn!(command = command.name(), error = %e, "undo failed");
            self.undo_stack.push(command);
            return Err(e);
        }
        debug!(command = command.name(), "undo");
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-execute the most recently undone command. Returns false when there
    /// is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = command.execute(doc) {
            warn!(command = command.name(), error = %e, "redo failed");
            self.redo_stack.push(command);
            return Err(e);
        }
        debug!(command = command.name(), "redo");
        self.undo_stack.push(command);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both histories without discarding, for when the document they
    /// refer to is replaced.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
