//! Session state and registry

mod registry;
#[allow(clippy::module_inception)]
mod session;

pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SessionState};

pub(crate) use session::{
    close_locked, evict_disconnected, PairingReply, PendingSubscriber, SessionInner,
};
