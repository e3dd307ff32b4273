//! Shared runtime plumbing for Weokto services: tracing setup, HTTP middleware,
//! health handlers and the row-level-security context helper.

pub mod health;
pub mod middleware;
pub mod rls;
pub mod tracing;
