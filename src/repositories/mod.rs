//! 데이터 접근 계층

pub mod user_repo;

pub use user_repo::{MongoUserStore, UserStore};
