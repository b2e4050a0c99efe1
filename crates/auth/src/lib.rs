//! `grocerdesk-auth`: the signed-in operator's session.
//!
//! Sessions are issued elsewhere; this crate only holds one for the lifetime
//! of a login and hands out read-only views of it.

pub mod permissions;
pub mod roles;
pub mod session;

pub use permissions::Permission;
pub use roles::Role;
pub use session::{Session, SessionHandle, SessionStore};
