pub mod code;
pub mod memory;
pub mod session;
pub mod user;
