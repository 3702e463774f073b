//! Command implementations for the wikiwym CLI.

pub mod build;
pub mod config;
pub mod init;
pub mod render;
pub mod toc;
