//! Session types shared by every Weokto service that authenticates requests.
//!
//! Provides per-tenant session cookie builders and session JWT validation.
//! Token issuance is feature-gated to the auth service.

pub mod cookie;
pub mod token;
