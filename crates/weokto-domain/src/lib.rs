//! Tenant domain types shared by every Weokto crate.
//!
//! Pure functions and types only: no I/O, no framework dependencies.
//! Host resolution and path rewriting live here so they can be tested
//! without an HTTP stack.

pub mod host;
pub mod path;
pub mod tenant;
