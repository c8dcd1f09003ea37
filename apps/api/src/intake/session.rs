//! Session registry: one isolated `Conversation` per session id, with idle eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::intake::conversation::Conversation;
use crate::intake::translator::Presenter;

pub struct SessionEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub presenter: Presenter,
    /// Turns for one session run one at a time.
    pub conversation: Mutex<Conversation>,
    last_active: std::sync::Mutex<DateTime<Utc>>,
}

impl SessionEntry {
    pub fn last_active(&self) -> DateTime<Utc> {
        *self
            .last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn touch(&self) {
        let mut last = self
            .last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Utc::now();
    }
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionEntry>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, conversation: Conversation, presenter: Presenter) -> Arc<SessionEntry> {
        let now = Utc::now();
        let entry = Arc::new(SessionEntry {
            id: Uuid::new_v4(),
            created_at: now,
            presenter,
            conversation: Mutex::new(conversation),
            last_active: std::sync::Mutex::new(now),
        });
        self.sessions.write().await.insert(entry.id, entry.clone());
        info!("Session {} created", entry.id);
        entry
    }

    /// Looks up a session and marks it active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionEntry>> {
        let entry = self.sessions.read().await.get(&id).cloned()?;
        entry.touch();
        Some(entry)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were evicted.
    pub async fn evict_idle(&self, ttl: chrono::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active() >= cutoff);
        before - sessions.len()
    }

    /// Spawns the periodic eviction task.
    pub fn spawn_sweeper(
        &self,
        ttl: chrono::Duration,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = registry.evict_idle(ttl).await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle sessions ({} still active)",
                        registry.len().await
                    );
                }
            }
        })
    }
}
