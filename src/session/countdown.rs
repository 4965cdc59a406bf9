use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info};

use crate::session::{
    machine::{QuizSession, Tick},
    models::QuizResult,
};

/// Handle to the one-second ticker of a timed session. The task stops by
/// itself once the session is finished, and is aborted on `cancel` or drop.
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn start<F>(session: Arc<Mutex<QuizSession>>, on_expiry: F) -> Self
    where
        F: FnOnce(QuizResult) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                let tick = session.lock().await.tick();
                match tick {
                    Tick::Remaining(seconds) => {
                        if seconds % 60 == 0 {
                            debug!("Countdown has {} seconds left", seconds);
                        }
                    }
                    Tick::Expired(result) => {
                        info!(
                            "Countdown expired, session submitted with score {}/{}",
                            result.score, result.total_questions
                        );
                        on_expiry(result);
                        break;
                    }
                    Tick::Untimed | Tick::Stopped => break,
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
