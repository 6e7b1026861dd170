//! One-shot credential expiry timer.
//!
//! Arming replaces any previous timer, so at most one is live per guard.
//! Timers run on the ambient tokio runtime; arming outside a runtime panics,
//! like any `tokio::spawn`.

use super::clock::Clock;
use super::credential::decode_expiry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Expired,
}

/// What arming a watch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryWatch {
    /// Expiry could not be read; no timer was scheduled.
    Undetermined,
    /// Expiry was already in the past; `Expired` was sent immediately.
    AlreadyExpired,
    Armed { remaining: Duration },
}

pub struct SessionGuard {
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedSender<SessionEvent>,
    timer: Option<JoinHandle<()>>,
}

impl SessionGuard {
    pub fn new(clock: Arc<dyn Clock>) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                clock,
                events,
                timer: None,
            },
            rx,
        )
    }

    pub fn arm_expiry_watch(&mut self, credential: &str) -> ExpiryWatch {
        self.disarm();

        let expires_at = match decode_expiry(credential) {
            Ok(at) => at,
            Err(e) => {
                // Fail open: the session stays usable until the backend rejects it.
                warn!(error = %e, "could not read credential expiry, no timer armed");
                return ExpiryWatch::Undetermined;
            }
        };

        let now = self.clock.now_millis();
        if expires_at <= now {
            debug!(expires_at, now, "credential already expired");
            let _ = self.events.send(SessionEvent::Expired);
            return ExpiryWatch::AlreadyExpired;
        }

        let remaining = Duration::from_millis((expires_at - now) as u64);
        let deadline = tokio::time::Instant::now() + remaining;
        let events = self.events.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(SessionEvent::Expired);
        }));

        debug!(remaining_ms = remaining.as_millis() as u64, "expiry watch armed");
        ExpiryWatch::Armed { remaining }
    }

    /// Cancel the live timer, if any.
    pub fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::FixedClock;
    use crate::session::credential::token_with_claims;
    use tokio::sync::mpsc::error::TryRecvError;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn guard() -> (SessionGuard, mpsc::UnboundedReceiver<SessionEvent>) {
        SessionGuard::new(Arc::new(FixedClock::new(NOW_MS)))
    }

    fn token_expiring_in(secs: i64) -> String {
        token_with_claims(&format!(r#"{{"exp":{}}}"#, NOW_MS / 1000 + secs))
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_at_expiry() {
        let (mut guard, mut rx) = guard();
        let start = tokio::time::Instant::now();

        let watch = guard.arm_expiry_watch(&token_expiring_in(10));
        assert_eq!(
            watch,
            ExpiryWatch::Armed {
                remaining: Duration::from_secs(10)
            }
        );

        tokio::time::advance(Duration::from_secs(9)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        assert_eq!(rx.recv().await, Some(SessionEvent::Expired));
        assert!(start.elapsed() >= Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert!(!guard.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn past_expiry_fires_immediately() {
        let (mut guard, mut rx) = guard();
        assert_eq!(
            guard.arm_expiry_watch(&token_expiring_in(-5)),
            ExpiryWatch::AlreadyExpired
        );
        assert_eq!(rx.try_recv(), Ok(SessionEvent::Expired));
        assert!(!guard.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_credential_arms_nothing() {
        let (mut guard, mut rx) = guard();
        assert_eq!(
            guard.arm_expiry_watch("not-a-jwt"),
            ExpiryWatch::Undetermined
        );
        assert!(!guard.is_armed());

        tokio::time::advance(Duration::from_secs(3600)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_previous_timer() {
        let (mut guard, mut rx) = guard();
        guard.arm_expiry_watch(&token_expiring_in(5));
        guard.arm_expiry_watch(&token_expiring_in(20));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Ok(SessionEvent::Expired));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_cancels_timer() {
        let (mut guard, mut rx) = guard();
        guard.arm_expiry_watch(&token_expiring_in(5));
        assert!(guard.is_armed());
        guard.disarm();

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
