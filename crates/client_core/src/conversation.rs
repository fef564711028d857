//! Ordered transcript of the session plus the in-flight query gate.

use shared::domain::Turn;

/// Why a submission never reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    Busy,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    pending: bool,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `turn` and returns its index, which is always the latest.
    pub fn append(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Admission gate for a new query. On success the user turn is appended
    /// and `pending` is set in the same mutable borrow.
    pub fn begin_exchange(&mut self, query: &str) -> Result<usize, RejectReason> {
        if query.trim().is_empty() {
            return Err(RejectReason::Empty);
        }
        if self.pending {
            return Err(RejectReason::Busy);
        }

        let index = self.append(Turn::user(query));
        self.set_pending(true);
        Ok(index)
    }

    /// Appends the assistant side of the outstanding exchange and releases the gate.
    pub fn finish_exchange(&mut self, reply: Turn) -> usize {
        let index = self.append(reply);
        self.set_pending(false);
        index
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
