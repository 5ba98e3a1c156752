pub mod authentication;
pub mod code;
pub mod errors;
pub mod session;
pub mod user;
