//! Session identity.
//!
//! The active user is a bare, user-chosen identifier that lives only for the
//! process lifetime. It is passed explicitly to the gateway and the
//! synchronizer rather than read from global state.

pub mod identity;

pub use identity::{Identity, IdentityError, ANONYMOUS};
