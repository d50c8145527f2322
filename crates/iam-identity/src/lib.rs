pub mod claims;
pub mod error;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod provider;

pub use claims::{IdentityClaims, SessionHandle, SessionMode};
pub use error::IdentityError;
pub use jwt::{decode_token, encode_token, DecodedToken, JwtConfig};
pub use memory::MemoryIdentityProvider;
pub use provider::IdentityProvider;
