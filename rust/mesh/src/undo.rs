// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded undo history over a piece of state.
//!
//! The [`UndoExecutor`] owns the state and is the only way to change it.
//! Commands are evaluated against the state and, when they succeed, pushed on
//! a history stack of fixed maximum depth. Observers are notified
//! synchronously after every change to the stack.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use serde::Serialize;

/// A reversible operation on state `S`.
pub trait UndoCommand<S> {
    type Output;
    type Error;

    /// Human-readable label, shown next to the undo action.
    fn description(&self) -> String;

    /// Applies the command. On error the state must be left as it was.
    fn evaluate(&mut self, state: &mut S) -> Result<Self::Output, Self::Error>;

    /// Reverts a successful [`evaluate`](Self::evaluate).
    fn undo(&mut self, state: &mut S) -> Result<(), Self::Error>;
}

/// Snapshot of the undo stack sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoAvailability {
    pub undo_stack_size: usize,
    /// Description of the command [`UndoExecutor::undo`] would revert.
    pub undo_description: Option<String>,
}

impl UndoAvailability {
    pub fn undo_available(&self) -> bool {
        self.undo_description.is_some()
    }
}

/// Handle returned by [`UndoExecutor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&UndoAvailability)>;

/// Owns state `S` and a bounded history of commands applied to it.
pub struct UndoExecutor<S, C> {
    state: S,
    stack: VecDeque<C>,
    max_depth: NonZeroUsize,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: u64,
}

impl<S, C> UndoExecutor<S, C>
where
    C: UndoCommand<S>,
{
    pub fn new(state: S, max_depth: NonZeroUsize) -> Self {
        Self {
            state,
            stack: VecDeque::with_capacity(max_depth.get()),
            max_depth,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Read-only view of the state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Runs a change on the state that bypasses the history. Only for
    /// housekeeping that no recorded command depends on.
    pub(crate) fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.state)
    }

    pub fn max_depth(&self) -> NonZeroUsize {
        self.max_depth
    }

    pub fn undo_stack_size(&self) -> usize {
        self.stack.len()
    }

    pub fn undo_available(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn availability(&self) -> UndoAvailability {
        UndoAvailability {
            undo_stack_size: self.stack.len(),
            undo_description: self.stack.back().map(C::description),
        }
    }

    /// Evaluates `command` and records it for undo.
    ///
    /// When the history is full the oldest command is dropped and can no
    /// longer be undone. A failing command is not recorded.
    pub fn evaluate(&mut self, mut command: C) -> Result<C::Output, C::Error> {
        let output = command.evaluate(&mut self.state)?;

        if self.stack.len() == self.max_depth.get() {
            if let Some(evicted) = self.stack.pop_front() {
                tracing::trace!(
                    description = %evicted.description(),
                    max_depth = self.max_depth.get(),
                    "Evicted oldest undo entry"
                );
            }
        }
        self.stack.push_back(command);
        self.notify();
        Ok(output)
    }

    /// Reverts the most recent command. Returns `Ok(false)` if there was
    /// nothing to undo.
    ///
    /// If the command fails to revert it stays on the stack.
    pub fn undo(&mut self) -> Result<bool, C::Error> {
        let Some(command) = self.stack.back_mut() else {
            return Ok(false);
        };

        command.undo(&mut self.state)?;
        self.stack.pop_back();
        self.notify();
        Ok(true)
    }

    /// Drops the whole history without touching the state.
    pub fn clear(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        self.stack.clear();
        self.notify();
    }

    /// Registers a callback invoked after every change to the history.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&UndoAvailability) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        let availability = self.availability();
        for (_, callback) in &mut self.subscribers {
            callback(&availability);
        }
    }
}

impl<S: std::fmt::Debug, C> std::fmt::Debug for UndoExecutor<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoExecutor")
            .field("state", &self.state)
            .field("undo_stack_size", &self.stack.len())
            .field("max_depth", &self.max_depth)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
