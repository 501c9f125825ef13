pub mod request;
pub mod response;

pub use request::{LoginRequest, RefreshTokenRequest, SignupRequest};
pub use response::{LoginResponse, UserResponse};
