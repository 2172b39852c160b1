//! Session lifecycle management.
//!
//! [`SessionManager`] runs the OAuth authorization-code flow and hands out
//! valid access tokens. It keeps its state in two [`SessionStore`]s: short
//! lived pending authorizations keyed by state token, and authenticated
//! sessions keyed by user id. [`MemoryStore`] backs both in a single-process
//! deployment.

mod session;
mod store;

pub use session::{
    AuthSettings, EXPIRY_MARGIN_SECS, MAX_TOKEN_LIFETIME_SECS, SessionManager, expiry_from,
};
pub use store::{MemoryStore, SessionStore};
