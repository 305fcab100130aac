//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `JwtSessionValidator` - HS256 shared-secret tokens
//! - `MockSessionValidator` - Token table for tests

mod jwt;
mod mock;

pub use jwt::JwtSessionValidator;
pub use mock::MockSessionValidator;
