//! Session-token lifecycle: claims decoding and proactive renewal.

mod claims;
mod monitor;
mod session;

pub use claims::{is_expired, parse_claims, Claims};
pub use monitor::{needs_renewal, TokenMonitor, TokenRefresher, CHECK_INTERVAL, RENEWAL_THRESHOLD};
pub use session::{Session, SessionStore};
