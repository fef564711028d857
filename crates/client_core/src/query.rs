//! Submitting a query and reconciling its answer into the conversation.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use shared::domain::Turn;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    backend::RagBackend,
    conversation::{ConversationLog, RejectReason},
    error::QueryFailure,
    events::SessionEvent,
    lock,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Answered { turn_index: usize, sources: usize },
    Failed { turn_index: usize, failure: QueryFailure },
    Rejected(RejectReason),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Holds the conversation's pending gate open for one exchange. Dropping it
/// without `complete` appends the failure turn and releases the gate.
struct PendingExchange<'a> {
    conversation: &'a Mutex<ConversationLog>,
    events: &'a broadcast::Sender<SessionEvent>,
    armed: bool,
}

impl<'a> PendingExchange<'a> {
    fn complete(mut self, reply: Turn) -> usize {
        self.armed = false;
        settle(self.conversation, self.events, reply)
    }
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(error = %QueryFailure::Aborted, "rag: query abandoned before reconciliation");
            settle(self.conversation, self.events, Turn::failure());
        }
    }
}

fn settle(
    conversation: &Mutex<ConversationLog>,
    events: &broadcast::Sender<SessionEvent>,
    reply: Turn,
) -> usize {
    let index = lock(conversation).finish_exchange(reply);
    let _ = events.send(SessionEvent::TurnAppended { index });
    let _ = events.send(SessionEvent::PendingChanged(false));
    index
}

pub struct QueryOrchestrator {
    session_id: Uuid,
    backend: Arc<dyn RagBackend>,
    conversation: Arc<Mutex<ConversationLog>>,
    events: broadcast::Sender<SessionEvent>,
    query_timeout: Duration,
}

impl QueryOrchestrator {
    pub fn new(
        session_id: Uuid,
        backend: Arc<dyn RagBackend>,
        conversation: Arc<Mutex<ConversationLog>>,
        events: broadcast::Sender<SessionEvent>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            session_id,
            backend,
            conversation,
            events,
            query_timeout,
        }
    }

    /// Runs one exchange. Blank queries and queries issued while another is
    /// pending are ignored; every accepted query ends with exactly one
    /// assistant turn, and backend failures never escape as errors.
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        let admitted = lock(&self.conversation).begin_exchange(query);
        let user_index = match admitted {
            Ok(index) => index,
            Err(reason) => {
                debug!(session_id = %self.session_id, ?reason, "rag: query not admitted");
                return SubmitOutcome::Rejected(reason);
            }
        };
        let _ = self.events.send(SessionEvent::TurnAppended { index: user_index });
        let _ = self.events.send(SessionEvent::PendingChanged(true));
        info!(session_id = %self.session_id, turn_index = user_index, "rag: query submitted");

        let exchange = PendingExchange {
            conversation: &self.conversation,
            events: &self.events,
            armed: true,
        };

        let result = match tokio::time::timeout(self.query_timeout, self.backend.submit_query(query))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(QueryFailure::Timeout(self.query_timeout)),
        };

        match result {
            Ok(response) => {
                let sources = response.sources.len();
                let turn_index = exchange.complete(Turn::assistant(response.answer, response.sources));
                info!(session_id = %self.session_id, turn_index, sources, "rag: answer received");
                SubmitOutcome::Answered {
                    turn_index,
                    sources,
                }
            }
            Err(failure) => {
                warn!(session_id = %self.session_id, error = %failure, "rag: query failed");
                let turn_index = exchange.complete(Turn::failure());
                SubmitOutcome::Failed {
                    turn_index,
                    failure,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
