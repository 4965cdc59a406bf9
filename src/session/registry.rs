use std::{sync::Arc, time::Duration};

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::{
    countdown::Countdown,
    machine::{QuizSession, SessionError},
    models::{QuizResult, SessionView},
};

const CLEANUP_INTERVAL_SECS: u64 = 600;
const FINISHED_TTL_MINUTES: i64 = 30;
const ACTIVE_TTL_HOURS: i64 = 24;

/// A session owned by one user, with its countdown if the quiz is timed.
pub struct LiveSession {
    id: Uuid,
    owner: String,
    session: Arc<Mutex<QuizSession>>,
    countdown: Option<Countdown>,
}

impl LiveSession {
    pub fn begin<F>(owner: impl Into<String>, session: QuizSession, on_expiry: F) -> Self
    where
        F: FnOnce(QuizResult) + Send + 'static,
    {
        let timed = session.is_timed();
        let session = Arc::new(Mutex::new(session));
        let countdown = timed.then(|| Countdown::start(session.clone(), on_expiry));

        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            session,
            countdown,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[cfg(test)]
    pub fn has_countdown(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| c.is_running())
    }

    pub async fn view(&self) -> SessionView {
        let session = self.session.lock().await;
        SessionView::from_session(self.id, &session)
    }

    pub async fn select_answer(&self, option_index: i64) -> Result<SessionView, SessionError> {
        let mut session = self.session.lock().await;
        session.select_answer(option_index)?;
        Ok(SessionView::from_session(self.id, &session))
    }

    pub async fn advance(&self) -> Result<SessionView, SessionError> {
        let mut session = self.session.lock().await;
        session.advance()?;
        Ok(SessionView::from_session(self.id, &session))
    }

    /// Finishes the session and stops the countdown. The result is returned
    /// only when this call did the transition.
    pub async fn finish(&self) -> (Option<QuizResult>, SessionView) {
        let mut session = self.session.lock().await;
        let finished = session.finish();
        self.stop_countdown();

        (finished, SessionView::from_session(self.id, &session))
    }

    pub fn stop_countdown(&self) {
        if let Some(countdown) = &self.countdown {
            countdown.cancel();
        }
    }

    fn is_stale(&self) -> bool {
        let Ok(session) = self.session.try_lock() else {
            return false;
        };

        let now = Utc::now();
        match session.result() {
            Some(result) => {
                now - result.completed_at > chrono::Duration::minutes(FINISHED_TTL_MINUTES)
            }
            None => now - session.started_at() > chrono::Duration::hours(ACTIVE_TTL_HOURS),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<LiveSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, live: LiveSession) -> Arc<LiveSession> {
        let live = Arc::new(live);
        self.sessions.insert(live.id(), live.clone());
        live
    }

    /// Sessions are only visible to the user that started them.
    pub fn get(&self, id: &Uuid, owner: &str) -> Option<Arc<LiveSession>> {
        self.sessions
            .get(id)
            .filter(|entry| entry.owner() == owner)
            .map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &Uuid, owner: &str) -> Option<Arc<LiveSession>> {
        let (_, live) = self
            .sessions
            .remove_if(id, |_, live| live.owner() == owner)?;

        live.stop_countdown();
        Some(live)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn remove_stale(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, live| !live.is_stale());
        before.saturating_sub(self.sessions.len())
    }

    pub fn spawn_cleanup(&self) {
        let registry = self.clone();
        let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

        tokio::spawn(async move {
            loop {
                interval.tick().await;
                debug!("SessionRegistry is cleaning up its sessions");
                let removed = registry.remove_stale();
                if removed > 0 {
                    info!("Removed {} stale quiz sessions", removed);
                }
            }
        });
    }
}
