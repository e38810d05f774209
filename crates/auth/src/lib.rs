//! `stockpile-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{MIN_PASSWORD_LEN, PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenCodec, TokenError};
pub use user::{Approval, Registration, User, validate_new_password};
