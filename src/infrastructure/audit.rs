//! Activity and audit trail
//!
//! Request handlers only enqueue events; a background worker drains the
//! queue and writes them out through `tracing`. A full or closed queue drops
//! the event with a warning rather than holding up the response.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::domain::EntityKind;

#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// Something happened (e.g. `GET_LECTURER`)
    Activity {
        action: String,
        actor: String,
        at: DateTime<Utc>,
    },
    /// An entity was changed
    Audit {
        action: String,
        entity: EntityKind,
        entity_id: i32,
        actor: String,
        at: DateTime<Utc>,
    },
}

impl AuditEvent {
    pub fn action(&self) -> &str {
        match self {
            AuditEvent::Activity { action, .. } | AuditEvent::Audit { action, .. } => action,
        }
    }
}

/// Sending half, cloned into every request
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditSink {
    pub fn channel(capacity: usize) -> (AuditSink, AuditWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (AuditSink { tx }, AuditWorker { rx })
    }

    pub fn activity(&self, action: &str, actor: &str) {
        self.dispatch(AuditEvent::Activity {
            action: action.to_string(),
            actor: actor.to_string(),
            at: Utc::now(),
        });
    }

    pub fn audit(&self, action: &str, entity: EntityKind, entity_id: i32, actor: &str) {
        self.dispatch(AuditEvent::Audit {
            action: action.to_string(),
            entity,
            entity_id,
            actor: actor.to_string(),
            at: Utc::now(),
        });
    }

    fn dispatch(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(action = event.action(), "audit queue full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(action = event.action(), "audit worker gone, dropping event");
            }
        }
    }
}

/// Receiving half; owns the queue until every sink is dropped
pub struct AuditWorker {
    rx: mpsc::Receiver<AuditEvent>,
}

impl AuditWorker {
    /// Run the worker on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            emit(&event);
        }
        tracing::debug!("audit queue closed, worker exiting");
    }

    /// Next queued event without blocking, for inspection
    pub fn try_recv(&mut self) -> Option<AuditEvent> {
        self.rx.try_recv().ok()
    }
}

fn emit(event: &AuditEvent) {
    match event {
        AuditEvent::Activity { action, actor, at } => {
            tracing::info!(target: "activity", %action, %actor, at = %at.to_rfc3339(), "activity");
        }
        AuditEvent::Audit {
            action,
            entity,
            entity_id,
            actor,
            at,
        } => {
            tracing::info!(
                target: "audit",
                %action,
                entity = entity.as_str(),
                entity_id,
                %actor,
                at = %at.to_rfc3339(),
                "audit"
            );
        }
    }
}
