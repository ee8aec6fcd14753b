//! CLI command implementations

pub mod context;
pub mod init;
pub mod remove;
pub mod repair;
pub mod retention;
pub mod rotate;
pub mod validate;
