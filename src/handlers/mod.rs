//! HTTP 요청 핸들러

pub mod auth;
