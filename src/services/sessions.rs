// src/services/sessions.rs

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::models::session::Session;

// Fluxo parado há mais tempo que isso é descartado
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Entry {
    session: Session,
    touched_at: Instant,
}

// Fluxos em andamento, por usuário. Vivem só em memória: um restart zera tudo.
pub struct SessionTable {
    inner: Mutex<HashMap<i64, Entry>>,
    ttl: Duration,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl SessionTable {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Mutex::new(HashMap::new()), ttl }
    }

    fn expired(&self, entry: &Entry) -> bool {
        entry.touched_at.elapsed() >= self.ttl
    }

    pub async fn get(&self, user_id: i64) -> Option<Session> {
        let mut map = self.inner.lock().await;
        if self.expired(map.get(&user_id)?) {
            map.remove(&user_id);
            return None;
        }
        map.get(&user_id).map(|entry| entry.session.clone())
    }

    /// Grava o passo e aproveita a travada para varrer fluxos abandonados.
    pub async fn set(&self, user_id: i64, session: Session) {
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, entry| !self.expired(entry));
        let evicted = before - map.len();
        if evicted > 0 {
            tracing::debug!("{} fluxos abandonados descartados.", evicted);
        }
        map.insert(user_id, Entry { session, touched_at: Instant::now() });
    }

    pub async fn clear(&self, user_id: i64) {
        self.inner.lock().await.remove(&user_id);
    }

    /// Remove e devolve, numa única travada.
    pub async fn take(&self, user_id: i64) -> Option<Session> {
        let entry = self.inner.lock().await.remove(&user_id)?;
        (!self.expired(&entry)).then_some(entry.session)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{RegistrationStep, SubmissionStep};

    #[tokio::test]
    async fn take_empties_the_slot() {
        let table = SessionTable::default();
        table.set(1, Session::Submission(SubmissionStep::AwaitingName)).await;
        table.set(2, Session::Registration(RegistrationStep::AwaitingFullName)).await;

        assert_eq!(table.take(1).await, Some(Session::Submission(SubmissionStep::AwaitingName)));
        assert_eq!(table.get(1).await, None);
        assert!(table.get(2).await.is_some());

        table.clear(2).await;
        assert_eq!(table.get(2).await, None);
    }

    #[tokio::test]
    async fn abandoned_flows_expire_and_are_evicted() {
        let table = SessionTable::with_ttl(Duration::ZERO);
        table.set(1, Session::Submission(SubmissionStep::AwaitingName)).await;

        assert_eq!(table.get(1).await, None);

        table.set(2, Session::Registration(RegistrationStep::AwaitingFullName)).await;
        table.set(3, Session::Registration(RegistrationStep::AwaitingFullName)).await;

        // O 2 expirou e saiu na gravação do 3
        assert_eq!(table.len().await, 1);
        assert_eq!(table.take(3).await, None);
    }
}
