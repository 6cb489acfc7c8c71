pub mod access;
pub mod auth;
pub mod preferences;
pub mod subscription;
