//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration; the landing page drives the
//! bootstrap and renders only once it has decided.

pub mod landing;
