//! Session handling for the admin client
//!
//! - `credential`: reads the expiry claim out of the bearer credential
//! - `clock`: wall-clock source (swappable in tests)
//! - `store`: durable session record storage behind one encode/decode boundary
//! - `guard`: one-shot expiry timer that reports `SessionEvent::Expired`
//! - `context`: the session object injected at the application root
//!
//! ```text
//! login ──► SessionContext::login ──► SessionStore::save
//!                 │
//!                 └──► SessionGuard::arm_expiry_watch(token)
//!                               │ (timer fires)
//!                               ▼
//!                      SessionEvent::Expired ──► SessionContext::on_expired
//!                                                   │
//!                          acknowledge_expiry ◄─────┴────► dismiss_expiry_prompt
//!                          (clear + /login)                (prompt hidden only)
//! ```

pub mod clock;
pub mod context;
pub mod credential;
pub mod guard;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{GuardDecision, SessionContext, LOGIN_ROUTE};
pub use credential::{decode_expiry, CredentialError};
pub use guard::{ExpiryWatch, SessionEvent, SessionGuard};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
