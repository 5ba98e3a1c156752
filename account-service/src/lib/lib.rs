//! Account service core.
//!
//! Sign-up, activation, sign-in, token refresh, password reset and profile
//! updates over pluggable storage. Transport layers drive the flows through
//! [`authentication::ports::AuthServicePort`] and map
//! [`authentication::errors::ErrorKind`] onto their own status codes.

pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::authentication;
pub use domain::code;
pub use domain::session;
pub use domain::user;
pub use outbound::repositories;
