//! In-memory session state — the only shared mutable state in the
//! service. A session holds one ranking run's inputs and outputs for the
//! report download and assessment endpoints. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ranking::pipeline::FinalizeOutcome;
use crate::ranking::weights::MatchWeights;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub weights: MatchWeights,
    pub job_text: String,
    pub report_markdown: String,
    pub outcome: FinalizeOutcome,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .insert(session.id, session);
    }

    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.inner
            .read()
            .expect("session store lock poisoned")
            .get(id)
            .cloned()
    }
}
