pub mod magic_link;
pub mod session;
pub mod sign_in;
