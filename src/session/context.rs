//! Session context injected at the application root.
//!
//! Owns the current [`SessionRecord`], persists it through a
//! [`SessionStore`], and tracks the expiry prompt state.

use super::store::SessionStore;
use crate::error::SessionError;
use beeconnect_policy::UserCapabilities;
use beeconnect_types::SessionRecord;
use std::sync::Arc;
use tracing::{info, warn};

use super::guard::SessionEvent;

pub const LOGIN_ROUTE: &str = "/login";

/// Route guard outcome for protected screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    RedirectToLogin,
}

pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    record: Option<SessionRecord>,
    expired: bool,
    prompt_visible: bool,
}

impl SessionContext {
    /// Restore whatever session the store holds. A corrupt record is
    /// discarded and treated as no session.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let record = match store.load() {
            Ok(record) => record.filter(SessionRecord::has_session),
            Err(SessionError::Record(e)) => {
                warn!(error = %e, "discarding unreadable session record");
                store.clear()?;
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            record,
            expired: false,
            prompt_visible: false,
        })
    }

    pub fn login(&mut self, record: SessionRecord) -> Result<(), SessionError> {
        self.store.save(&record)?;
        info!(
            session_id = record.session_id.as_deref().unwrap_or(""),
            "session started"
        );
        self.record = Some(record);
        self.expired = false;
        self.prompt_visible = false;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        if self.record.take().is_some() {
            info!("session cleared");
        }
        self.expired = false;
        self.prompt_visible = false;
        Ok(())
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.record.as_ref().map(|r| r.token.as_str())
    }

    pub fn capabilities(&self) -> UserCapabilities {
        self.record
            .as_ref()
            .map(UserCapabilities::from)
            .unwrap_or_else(UserCapabilities::anonymous)
    }

    /// Protected screens need a stored session identifier.
    pub fn check_access(&self) -> GuardDecision {
        match &self.record {
            Some(record) if record.has_session() => GuardDecision::Proceed,
            _ => GuardDecision::RedirectToLogin,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Expired => self.on_expired(),
        }
    }

    pub fn on_expired(&mut self) {
        if self.record.is_none() {
            return;
        }
        warn!("session credential expired");
        self.expired = true;
        self.prompt_visible = true;
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn expiry_prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    /// User confirmed the expiry prompt: end the session and return the
    /// route to navigate to.
    pub fn acknowledge_expiry(&mut self) -> Result<&'static str, SessionError> {
        self.logout()?;
        Ok(LOGIN_ROUTE)
    }

    /// User declined the prompt. The session stays expired.
    pub fn dismiss_expiry_prompt(&mut self) {
        self.prompt_visible = false;
    }
}
