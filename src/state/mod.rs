//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Only the session lives here today; it is the one piece of state the
//! bootstrap components share.

pub mod session;
