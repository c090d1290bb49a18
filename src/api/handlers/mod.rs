//! Route handlers and the shared request/response/error plumbing.

pub mod error;
pub mod health;
pub mod signup;
pub mod state;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::health::health;
pub use self::signup::signup;
pub use self::state::{EnrollConfig, EnrollState};
pub use self::verify::verify;
