pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use claims::TokenType;
pub use codec::TokenCodec;
pub use codec::TokenPair;
pub use codec::TokenSettings;
pub use errors::TokenError;
pub use handler::JwtHandler;
