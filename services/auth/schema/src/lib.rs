//! sea-orm entities for the auth tables.
//!
//! Each tenant owns its own user and session tables; the magic-link table is
//! shared and discriminated by its `tenant` column.

pub mod magic_link_tokens;
pub mod stam_sessions;
pub mod stam_users;
pub mod weokto_sessions;
pub mod weokto_users;
