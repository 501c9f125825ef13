pub mod errors;

pub use errors::{AuthError, AuthResult};
